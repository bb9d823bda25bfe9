// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Target discovery strategies.
//!
//! ## Overview
//!
//! Each actor owns one [`Discovery`] strategy which, once per pass, produces the
//! actor's ordered candidate targets. Order is priority: the first candidate that
//! passes the select predicate is the one the engine tries to select.
//!
//! Two strategies are provided:
//!
//! - [`RayDiscovery`]: casts a probe along the actor's forward axis. Hits are
//!   sorted by distance (stable, so equal distances keep substrate order) and
//!   resolved to targets in order. The first surface that does not resolve to a
//!   target is a blocker: scanning stops there, so targets behind a
//!   non-interactable occluder are never reported.
//! - [`VolumeDiscovery`]: keeps a membership set fed by overlap enter/exit
//!   notifications and reports its resolved members sorted by squared distance
//!   from the actor, recomputed on every call.
//!
//! Strategies may keep any internal state they like; the engine only relies on
//! [`Discovery::discover`] being deterministic for a fixed scene.

use alloc::vec::Vec;
use core::cmp::Ordering;
use kurbo::{Point, Vec2};

use crate::arena::Arena;
use crate::substrate::{CastShape, RayHit, RayQuery, Substrate, distance_squared};
use crate::surface::SurfaceIndex;
use crate::target::Target;
use crate::types::{ActorId, SurfaceId, TargetId, UpdatePhase};

/// Read-only view of the engine handed to a strategy.
///
/// Surface resolution only sees registered targets of the strategy's own engine.
pub struct DiscoveryContext<'a> {
    pub(crate) actor: ActorId,
    pub(crate) origin: Point,
    pub(crate) direction: Vec2,
    pub(crate) substrate: &'a dyn Substrate,
    pub(crate) surfaces: &'a SurfaceIndex,
    pub(crate) targets: &'a Arena<TargetId, Target>,
}

impl core::fmt::Debug for DiscoveryContext<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DiscoveryContext")
            .field("actor", &self.actor)
            .field("origin", &self.origin)
            .field("direction", &self.direction)
            .finish_non_exhaustive()
    }
}

impl<'a> DiscoveryContext<'a> {
    /// The actor being processed.
    pub fn actor(&self) -> ActorId {
        self.actor
    }

    /// The actor's reference point.
    pub fn origin(&self) -> Point {
        self.origin
    }

    /// The actor's forward axis.
    pub fn direction(&self) -> Vec2 {
        self.direction
    }

    /// Scene queries for this pass.
    pub fn substrate(&self) -> &'a dyn Substrate {
        self.substrate
    }

    /// Resolve a surface to its registered target, if any.
    pub fn resolve(&self, surface: SurfaceId) -> Option<TargetId> {
        self.surfaces.resolve(surface)
    }

    /// Reference point of a live target.
    pub fn target_position(&self, target: TargetId) -> Option<Point> {
        self.targets.get(target).map(|t| t.position)
    }
}

/// A pluggable target discovery strategy.
pub trait Discovery: core::fmt::Debug {
    /// Append this pass's candidates to `out`, highest priority first.
    ///
    /// `out` is empty on entry. Duplicates and unregistered targets are filtered
    /// by the engine afterwards, preserving order.
    fn discover(&mut self, ctx: &DiscoveryContext<'_>, out: &mut Vec<TargetId>);

    /// Per-phase refresh, delivered with the actor's phase hooks.
    fn on_phase(&mut self, phase: UpdatePhase, ctx: &DiscoveryContext<'_>) {
        let _ = (phase, ctx);
    }

    /// The substrate reports that the actor's volume started overlapping `surface`.
    fn overlap_enter(&mut self, surface: SurfaceId) {
        let _ = surface;
    }

    /// The substrate reports that the actor's volume stopped overlapping `surface`.
    fn overlap_exit(&mut self, surface: SurfaceId) {
        let _ = surface;
    }

    /// Drop any state about `surfaces` (their target was removed).
    fn forget(&mut self, surfaces: &[SurfaceId]) {
        let _ = surfaces;
    }

    /// Nearest hit of the most recent cast, for strategies that cast.
    fn last_hit(&self) -> Option<RayHit> {
        None
    }
}

/// Default reach of a ray actor.
pub const DEFAULT_MAX_DISTANCE: f64 = 30.0;

/// Default number of sorted hits considered per cast.
pub const DEFAULT_MAX_HITS: usize = 10;

/// Occlusion-ordered discovery by casting along the actor's forward axis.
#[derive(Clone, Debug)]
pub struct RayDiscovery {
    /// Hits beyond this distance are ignored.
    pub max_distance: f64,
    /// Swept probe shape.
    pub shape: CastShape,
    /// Only the nearest `max_hits` hits are scanned.
    pub max_hits: usize,
    hits: Vec<RayHit>,
}

impl Default for RayDiscovery {
    fn default() -> Self {
        Self {
            max_distance: DEFAULT_MAX_DISTANCE,
            shape: CastShape::Ray,
            max_hits: DEFAULT_MAX_HITS,
            hits: Vec::new(),
        }
    }
}

impl RayDiscovery {
    /// A ray strategy with the given reach.
    pub fn new(max_distance: f64) -> Self {
        Self {
            max_distance,
            ..Self::default()
        }
    }

    /// Sweep a sphere of `radius` instead of a thin ray.
    pub fn with_sphere(mut self, radius: f64) -> Self {
        self.shape = CastShape::Sphere { radius };
        self
    }

    /// Limit how many sorted hits are scanned.
    pub fn with_max_hits(mut self, max_hits: usize) -> Self {
        self.max_hits = max_hits;
        self
    }

    /// Hits of the most recent cast, nearest first.
    pub fn hits(&self) -> &[RayHit] {
        &self.hits
    }
}

impl Discovery for RayDiscovery {
    fn discover(&mut self, ctx: &DiscoveryContext<'_>, out: &mut Vec<TargetId>) {
        self.hits.clear();
        if ctx.direction.hypot2() == 0.0 || self.max_distance.is_nan() || self.max_distance <= 0.0 {
            return;
        }
        let query = RayQuery {
            origin: ctx.origin,
            direction: ctx.direction,
            max_distance: self.max_distance,
            shape: self.shape.normalized(),
        };
        self.hits = ctx.substrate.cast(&query);
        let max_distance = self.max_distance;
        self.hits
            .retain(|h| h.distance.is_finite() && h.distance <= max_distance);
        // Stable: equal distances keep the substrate's order.
        self.hits.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(Ordering::Equal)
        });
        self.hits.truncate(self.max_hits);

        for hit in &self.hits {
            let Some(target) = ctx.resolve(hit.surface) else {
                // Blocker: nothing behind a non-interactable surface is reported.
                break;
            };
            if !out.contains(&target) {
                out.push(target);
            }
        }
    }

    fn last_hit(&self) -> Option<RayHit> {
        self.hits.first().copied()
    }
}

/// Distance-sorted discovery over an overlap membership set.
#[derive(Clone, Debug, Default)]
pub struct VolumeDiscovery {
    // Insertion order; ties in distance keep this order.
    members: Vec<SurfaceId>,
    scratch: Vec<(TargetId, f64)>,
}

impl VolumeDiscovery {
    /// An empty volume.
    pub fn new() -> Self {
        Self::default()
    }

    /// Surfaces currently overlapping the volume, in the order they entered.
    pub fn members(&self) -> &[SurfaceId] {
        &self.members
    }
}

impl Discovery for VolumeDiscovery {
    fn discover(&mut self, ctx: &DiscoveryContext<'_>, out: &mut Vec<TargetId>) {
        self.scratch.clear();
        for &surface in &self.members {
            let Some(target) = ctx.resolve(surface) else {
                continue;
            };
            if self.scratch.iter().any(|(t, _)| *t == target) {
                continue;
            }
            let Some(position) = ctx.target_position(target) else {
                continue;
            };
            self.scratch
                .push((target, distance_squared(ctx.origin, position)));
        }
        // Stable: ties keep membership order.
        self.scratch
            .sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
        out.extend(self.scratch.iter().map(|(t, _)| *t));
    }

    fn overlap_enter(&mut self, surface: SurfaceId) {
        if !self.members.contains(&surface) {
            self.members.push(surface);
        }
    }

    fn overlap_exit(&mut self, surface: SurfaceId) {
        self.members.retain(|s| *s != surface);
    }

    fn forget(&mut self, surfaces: &[SurfaceId]) {
        self.members.retain(|s| !surfaces.contains(s));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::TargetDesc;
    use alloc::vec;

    struct Fixed(Vec<RayHit>);

    impl Substrate for Fixed {
        fn cast(&self, _query: &RayQuery) -> Vec<RayHit> {
            self.0.clone()
        }
    }

    fn hit(surface: u64, distance: f64) -> RayHit {
        RayHit {
            surface: SurfaceId(surface),
            distance,
            point: Point::new(distance, 0.0),
            normal: Vec2::new(-1.0, 0.0),
        }
    }

    struct World {
        targets: Arena<TargetId, Target>,
        surfaces: SurfaceIndex,
    }

    impl World {
        fn new() -> Self {
            Self {
                targets: Arena::default(),
                surfaces: SurfaceIndex::default(),
            }
        }

        fn target(&mut self, surfaces: &[u64], position: Point) -> TargetId {
            let desc = TargetDesc {
                surfaces: surfaces.iter().copied().map(SurfaceId).collect(),
                position,
                ..Default::default()
            };
            let id = self.targets.insert(Target::new(desc));
            for &s in surfaces {
                assert!(self.surfaces.map(SurfaceId(s), id));
            }
            id
        }

        fn ctx<'a>(&'a self, substrate: &'a dyn Substrate) -> DiscoveryContext<'a> {
            DiscoveryContext {
                actor: ActorId(0, 1),
                origin: Point::ORIGIN,
                direction: Vec2::new(1.0, 0.0),
                substrate,
                surfaces: &self.surfaces,
                targets: &self.targets,
            }
        }
    }

    #[test]
    fn ray_stops_at_first_blocker() {
        let mut world = World::new();
        let t1 = world.target(&[1], Point::new(1.0, 0.0));
        let _t2 = world.target(&[3], Point::new(3.0, 0.0));
        // Surface 2 resolves to nothing: it occludes t2.
        let scene = Fixed(vec![hit(3, 3.0), hit(1, 1.0), hit(2, 2.0)]);
        let mut ray = RayDiscovery::default();
        let mut out = Vec::new();
        ray.discover(&world.ctx(&scene), &mut out);
        assert_eq!(out, vec![t1]);
        assert_eq!(ray.last_hit().map(|h| h.surface), Some(SurfaceId(1)));
    }

    #[test]
    fn ray_dedups_targets_with_several_surfaces() {
        let mut world = World::new();
        let t1 = world.target(&[1, 2], Point::new(1.0, 0.0));
        let t2 = world.target(&[3], Point::new(3.0, 0.0));
        let scene = Fixed(vec![hit(1, 1.0), hit(2, 1.5), hit(3, 3.0)]);
        let mut ray = RayDiscovery::default();
        let mut out = Vec::new();
        ray.discover(&world.ctx(&scene), &mut out);
        assert_eq!(out, vec![t1, t2]);
    }

    #[test]
    fn ray_equal_distance_keeps_substrate_order() {
        let mut world = World::new();
        let a = world.target(&[1], Point::new(2.0, 0.0));
        let b = world.target(&[2], Point::new(2.0, 0.0));
        let scene = Fixed(vec![hit(2, 2.0), hit(1, 2.0)]);
        let mut ray = RayDiscovery::default();
        let mut out = Vec::new();
        ray.discover(&world.ctx(&scene), &mut out);
        assert_eq!(out, vec![b, a]);
    }

    #[test]
    fn ray_respects_reach_and_hit_limit() {
        let mut world = World::new();
        let t1 = world.target(&[1], Point::new(1.0, 0.0));
        let _t2 = world.target(&[2], Point::new(2.0, 0.0));
        let _far = world.target(&[3], Point::new(50.0, 0.0));
        let scene = Fixed(vec![hit(1, 1.0), hit(2, 2.0), hit(3, 50.0)]);

        let mut ray = RayDiscovery::default().with_max_hits(1);
        let mut out = Vec::new();
        ray.discover(&world.ctx(&scene), &mut out);
        assert_eq!(out, vec![t1]);

        let mut short = RayDiscovery::new(1.5);
        out.clear();
        short.discover(&world.ctx(&scene), &mut out);
        assert_eq!(out, vec![t1]);
        assert_eq!(short.hits().len(), 1);
    }

    #[test]
    fn ray_with_zero_direction_reports_nothing() {
        let mut world = World::new();
        let _t1 = world.target(&[1], Point::new(1.0, 0.0));
        let scene = Fixed(vec![hit(1, 1.0)]);
        let mut ctx = world.ctx(&scene);
        ctx.direction = Vec2::ZERO;
        let mut ray = RayDiscovery::default();
        let mut out = Vec::new();
        ray.discover(&ctx, &mut out);
        assert!(out.is_empty());
        assert!(ray.last_hit().is_none());
    }

    #[test]
    fn volume_sorts_by_squared_distance() {
        let mut world = World::new();
        let t1 = world.target(&[1], Point::new(2.0, 0.0)); // dist² = 4
        let t2 = world.target(&[2], Point::new(1.0, 0.0)); // dist² = 1
        let mut vol = VolumeDiscovery::new();
        vol.overlap_enter(SurfaceId(1));
        vol.overlap_enter(SurfaceId(2));
        let mut out = Vec::new();
        vol.discover(&world.ctx(&crate::substrate::EmptySubstrate), &mut out);
        assert_eq!(out, vec![t2, t1]);
    }

    #[test]
    fn volume_ties_keep_membership_order() {
        let mut world = World::new();
        let a = world.target(&[1], Point::new(0.0, 1.0));
        let b = world.target(&[2], Point::new(1.0, 0.0));
        let mut vol = VolumeDiscovery::new();
        vol.overlap_enter(SurfaceId(2));
        vol.overlap_enter(SurfaceId(1));
        let mut out = Vec::new();
        vol.discover(&world.ctx(&crate::substrate::EmptySubstrate), &mut out);
        assert_eq!(out, vec![b, a]);
    }

    #[test]
    fn volume_membership_tracks_enter_exit_per_surface() {
        let mut world = World::new();
        let t = world.target(&[1, 2], Point::new(1.0, 0.0));
        let mut vol = VolumeDiscovery::new();
        vol.overlap_enter(SurfaceId(1));
        vol.overlap_enter(SurfaceId(2));
        vol.overlap_enter(SurfaceId(2));
        assert_eq!(vol.members(), &[SurfaceId(1), SurfaceId(2)]);

        // Still overlapping through surface 2.
        vol.overlap_exit(SurfaceId(1));
        let mut out = Vec::new();
        vol.discover(&world.ctx(&crate::substrate::EmptySubstrate), &mut out);
        assert_eq!(out, vec![t]);

        vol.forget(&[SurfaceId(2)]);
        assert!(vol.members().is_empty());
    }

    #[test]
    fn volume_skips_unresolved_surfaces() {
        let world = World::new();
        let mut vol = VolumeDiscovery::new();
        vol.overlap_enter(SurfaceId(9));
        let mut out = Vec::new();
        vol.discover(&world.ctx(&crate::substrate::EmptySubstrate), &mut out);
        assert!(out.is_empty());
    }
}
