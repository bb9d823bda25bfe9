// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Geometric query interface consumed by discovery strategies.
//!
//! The engine does not own colliders or perform geometry.
//! A host scene implements [`Substrate`] and passes it to
//! [`Engine::tick`](crate::Engine::tick); queries are treated as pure reads for the
//! duration of one pass. Volume overlaps are not queried: the host reports them
//! through [`Engine::overlap_enter`](crate::Engine::overlap_enter) and
//! [`Engine::overlap_exit`](crate::Engine::overlap_exit).

use alloc::vec::Vec;
use kurbo::{Point, Vec2};

use crate::types::SurfaceId;

/// Probe shape swept along a cast.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum CastShape {
    /// Infinitely thin ray.
    Ray,
    /// Sphere (disc in 2D) of the given radius.
    ///
    /// A radius `<= 0` is treated as [`CastShape::Ray`].
    Sphere {
        /// Radius of the swept probe.
        radius: f64,
    },
}

impl CastShape {
    /// Collapse degenerate spheres to rays.
    pub fn normalized(self) -> Self {
        match self {
            Self::Sphere { radius } if radius > 0.0 => self,
            _ => Self::Ray,
        }
    }
}

/// A directed probe.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RayQuery {
    /// Start of the probe.
    pub origin: Point,
    /// Direction of travel; need not be normalized.
    pub direction: Vec2,
    /// Hits beyond this distance from `origin` are not reported.
    pub max_distance: f64,
    /// Swept shape.
    pub shape: CastShape,
}

/// One surface intersected by a cast.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RayHit {
    /// The intersected surface.
    pub surface: SurfaceId,
    /// Distance from the query origin along the direction.
    pub distance: f64,
    /// World-space contact point.
    pub point: Point,
    /// Surface normal at the contact point.
    pub normal: Vec2,
}

/// Scene queries used by discovery.
///
/// Implementations must be deterministic for a fixed scene: the same query
/// yields the same hits in the same order. Ordering by distance is not required;
/// the ray strategy sorts stably, so equal distances keep the order returned here.
/// A failing or empty scene returns no hits.
pub trait Substrate {
    /// Every surface intersected by `query` within its maximum distance.
    fn cast(&self, query: &RayQuery) -> Vec<RayHit>;
}

/// A substrate with nothing in it.
#[derive(Copy, Clone, Debug, Default)]
pub struct EmptySubstrate;

impl Substrate for EmptySubstrate {
    fn cast(&self, _query: &RayQuery) -> Vec<RayHit> {
        Vec::new()
    }
}

/// Squared distance between two reference points.
#[inline]
pub fn distance_squared(a: Point, b: Point) -> f64 {
    a.distance_squared(b)
}
