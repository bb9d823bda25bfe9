// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Collider handles, shapes, and flags.

use kurbo::{Circle, Point, Rect};
use understory_interaction::SurfaceId;

/// Identifier for a collider in a [`Scene`](crate::Scene) (generational).
///
/// Stale handles never alias a newer collider in the same slot.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ColliderId(pub(crate) u32, pub(crate) u32);

impl ColliderId {
    pub(crate) fn idx(self) -> usize {
        self.0 as usize
    }

    /// The surface identifier this collider reports in casts and overlaps.
    ///
    /// Slot and generation are packed, so distinct live or stale handles never
    /// share a surface.
    pub fn surface(self) -> SurfaceId {
        SurfaceId((u64::from(self.0) << 32) | u64::from(self.1))
    }

    /// Recover the handle encoded by [`ColliderId::surface`].
    pub fn from_surface(surface: SurfaceId) -> Self {
        #[allow(
            clippy::cast_possible_truncation,
            reason = "Surface ids pack two 32-bit halves."
        )]
        let (idx, generation) = ((surface.0 >> 32) as u32, surface.0 as u32);
        Self(idx, generation)
    }
}

bitflags::bitflags! {
    /// Collider participation flags.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ColliderFlags: u8 {
        /// Collider exists in the simulation.
        const ENABLED   = 0b0000_0001;
        /// Collider is reported by casts and overlap queries.
        const QUERYABLE = 0b0000_0010;
    }
}

impl Default for ColliderFlags {
    fn default() -> Self {
        Self::ENABLED | Self::QUERYABLE
    }
}

/// Collider geometry in world space.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ColliderShape {
    /// A disc.
    Circle(Circle),
    /// An axis-aligned box.
    Rect(Rect),
}

impl ColliderShape {
    /// Reference point: the circle center or the rectangle center.
    pub fn center(&self) -> Point {
        match self {
            Self::Circle(c) => c.center,
            Self::Rect(r) => r.center(),
        }
    }

    /// Grow the shape by `radius` on every side.
    ///
    /// Rectangles grow to a larger rectangle, which is conservative at the corners.
    pub fn inflate(&self, radius: f64) -> Self {
        match self {
            Self::Circle(c) => Self::Circle(Circle::new(c.center, c.radius + radius)),
            Self::Rect(r) => Self::Rect(r.inflate(radius, radius)),
        }
    }

    /// Whether two shapes touch or overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Circle(a), Self::Circle(b)) => {
                let reach = a.radius + b.radius;
                a.center.distance_squared(b.center) <= reach * reach
            }
            (Self::Circle(c), Self::Rect(r)) | (Self::Rect(r), Self::Circle(c)) => {
                let nearest = Point::new(
                    c.center.x.clamp(r.min_x(), r.max_x()),
                    c.center.y.clamp(r.min_y(), r.max_y()),
                );
                nearest.distance_squared(c.center) <= c.radius * c.radius
            }
            (Self::Rect(a), Self::Rect(b)) => {
                a.min_x() <= b.max_x()
                    && b.min_x() <= a.max_x()
                    && a.min_y() <= b.max_y()
                    && b.min_y() <= a.max_y()
            }
        }
    }
}

impl From<Circle> for ColliderShape {
    fn from(c: Circle) -> Self {
        Self::Circle(c)
    }
}

impl From<Rect> for ColliderShape {
    fn from(r: Rect) -> Self {
        Self::Rect(r)
    }
}
