// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Collider storage and geometric queries.

use kurbo::{Circle, Point, Rect, Vec2};
use tracing::debug;
use understory_interaction::{CastShape, RayHit, RayQuery, Substrate, SurfaceId};

use crate::types::{ColliderFlags, ColliderId, ColliderShape};

#[derive(Clone, Debug)]
struct Entry {
    generation: u32,
    shape: ColliderShape,
    flags: ColliderFlags,
}

/// A flat 2D collider scene.
///
/// Casts and overlap queries scan every queryable collider; results are
/// deterministic, with ties reported in slot order.
#[derive(Clone, Default)]
pub struct Scene {
    entries: Vec<Option<Entry>>,
    generations: Vec<u32>,
    free_list: Vec<usize>,
}

impl core::fmt::Debug for Scene {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Scene")
            .field("colliders", &self.len())
            .field("free_list", &self.free_list.len())
            .finish_non_exhaustive()
    }
}

impl Scene {
    /// Create an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a collider.
    pub fn insert(&mut self, shape: impl Into<ColliderShape>, flags: ColliderFlags) -> ColliderId {
        let shape = shape.into();
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            (idx, generation)
        } else {
            self.entries.push(None);
            self.generations.push(1);
            (self.entries.len() - 1, 1)
        };
        self.entries[idx] = Some(Entry {
            generation,
            shape,
            flags,
        });
        #[allow(
            clippy::cast_possible_truncation,
            reason = "ColliderId uses 32-bit indices by design."
        )]
        let id = ColliderId(idx as u32, generation);
        debug!(collider = ?id, "collider inserted");
        id
    }

    /// Remove a collider; stale handles are ignored.
    pub fn remove(&mut self, id: ColliderId) {
        if !self.is_alive(id) {
            return;
        }
        self.entries[id.idx()] = None;
        self.free_list.push(id.idx());
        debug!(collider = ?id, "collider removed");
    }

    /// Whether `id` refers to a live collider.
    pub fn is_alive(&self, id: ColliderId) -> bool {
        self.entry(id).is_some()
    }

    /// Number of live colliders.
    pub fn len(&self) -> usize {
        self.entries.len() - self.free_list.len()
    }

    /// Whether the scene has no colliders.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Shape of a live collider.
    pub fn shape(&self, id: ColliderId) -> Option<ColliderShape> {
        self.entry(id).map(|e| e.shape)
    }

    /// Flags of a live collider.
    pub fn flags(&self, id: ColliderId) -> Option<ColliderFlags> {
        self.entry(id).map(|e| e.flags)
    }

    /// Move or reshape a collider.
    pub fn set_shape(&mut self, id: ColliderId, shape: impl Into<ColliderShape>) {
        if let Some(e) = self.entry_mut(id) {
            e.shape = shape.into();
        }
    }

    /// Replace a collider's flags.
    pub fn set_flags(&mut self, id: ColliderId, flags: ColliderFlags) {
        if let Some(e) = self.entry_mut(id) {
            e.flags = flags;
        }
    }

    /// Surfaces of queryable colliders overlapping `volume`, in slot order.
    ///
    /// `exclude` is skipped, so a volume collider can query around itself.
    pub fn overlapping(&self, volume: &ColliderShape, exclude: Option<ColliderId>) -> Vec<SurfaceId> {
        self.queryable()
            .filter(|(id, _)| Some(*id) != exclude)
            .filter(|(_, e)| e.shape.overlaps(volume))
            .map(|(id, _)| id.surface())
            .collect()
    }

    fn queryable(&self) -> impl Iterator<Item = (ColliderId, &Entry)> + '_ {
        let wanted = ColliderFlags::ENABLED | ColliderFlags::QUERYABLE;
        self.entries.iter().enumerate().filter_map(move |(i, slot)| {
            let e = slot.as_ref()?;
            #[allow(
                clippy::cast_possible_truncation,
                reason = "ColliderId uses 32-bit indices by design."
            )]
            let id = ColliderId(i as u32, e.generation);
            e.flags.contains(wanted).then_some((id, e))
        })
    }

    fn entry(&self, id: ColliderId) -> Option<&Entry> {
        self.entries
            .get(id.idx())?
            .as_ref()
            .filter(|e| e.generation == id.1)
    }

    fn entry_mut(&mut self, id: ColliderId) -> Option<&mut Entry> {
        self.entries
            .get_mut(id.idx())?
            .as_mut()
            .filter(|e| e.generation == id.1)
    }
}

impl Substrate for Scene {
    fn cast(&self, query: &RayQuery) -> Vec<RayHit> {
        let length = query.direction.hypot();
        if length <= 0.0 || !length.is_finite() {
            return Vec::new();
        }
        let dir = query.direction / length;
        let radius = match query.shape.normalized() {
            CastShape::Sphere { radius } => radius,
            CastShape::Ray => 0.0,
        };
        let mut hits: Vec<RayHit> = self
            .queryable()
            .filter_map(|(id, e)| {
                let (distance, normal) = match e.shape.inflate(radius) {
                    ColliderShape::Circle(c) => ray_circle(query.origin, dir, c)?,
                    ColliderShape::Rect(r) => ray_rect(query.origin, dir, r)?,
                };
                (distance <= query.max_distance).then(|| RayHit {
                    surface: id.surface(),
                    distance,
                    // Contact on the original shape, not the inflated one.
                    point: query.origin + dir * distance - normal * radius,
                    normal,
                })
            })
            .collect();
        // Stable: ties stay in slot order.
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }
}

/// Entry distance and normal of a unit ray against a circle. Inside counts as 0.
fn ray_circle(origin: Point, dir: Vec2, circle: Circle) -> Option<(f64, Vec2)> {
    let m = origin - circle.center;
    let b = m.dot(dir);
    let c = m.hypot2() - circle.radius * circle.radius;
    if c <= 0.0 {
        return Some((0.0, -dir));
    }
    if b > 0.0 {
        return None;
    }
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let t = -b - disc.sqrt();
    let normal = (origin + dir * t - circle.center).normalize();
    Some((t.max(0.0), normal))
}

/// Slab test of a unit ray against an axis-aligned rectangle. Inside counts as 0.
fn ray_rect(origin: Point, dir: Vec2, rect: Rect) -> Option<(f64, Vec2)> {
    let mut t_min = 0.0_f64;
    let mut t_max = f64::INFINITY;
    let mut normal = -dir;
    let axes = [
        (origin.x, dir.x, rect.min_x(), rect.max_x(), Vec2::new(1.0, 0.0)),
        (origin.y, dir.y, rect.min_y(), rect.max_y(), Vec2::new(0.0, 1.0)),
    ];
    for (o, d, lo, hi, axis) in axes {
        if d == 0.0 {
            if o < lo || o > hi {
                return None;
            }
            continue;
        }
        let (mut t1, mut t2) = ((lo - o) / d, (hi - o) / d);
        let mut entry_normal = -axis;
        if t1 > t2 {
            core::mem::swap(&mut t1, &mut t2);
            entry_normal = axis;
        }
        if t1 > t_min {
            t_min = t1;
            normal = entry_normal;
        }
        t_max = t_max.min(t2);
        if t_min > t_max {
            return None;
        }
    }
    Some((t_min, normal))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(origin: (f64, f64), direction: (f64, f64)) -> RayQuery {
        RayQuery {
            origin: origin.into(),
            direction: direction.into(),
            max_distance: 100.0,
            shape: CastShape::Ray,
        }
    }

    #[test]
    fn hits_are_sorted_with_contact_data() {
        let mut scene = Scene::new();
        let far = scene.insert(Circle::new((10.0, 0.0), 1.0), ColliderFlags::default());
        let near = scene.insert(Rect::new(4.0, -1.0, 5.0, 1.0), ColliderFlags::default());
        let _off_axis = scene.insert(Circle::new((5.0, 5.0), 1.0), ColliderFlags::default());

        let hits = scene.cast(&query((0.0, 0.0), (2.0, 0.0)));
        let surfaces: Vec<_> = hits.iter().map(|h| h.surface).collect();
        assert_eq!(surfaces, vec![near.surface(), far.surface()]);
        assert_eq!(hits[0].distance, 4.0);
        assert_eq!(hits[0].normal, Vec2::new(-1.0, 0.0));
        assert_eq!(hits[1].distance, 9.0);
        assert_eq!(hits[1].point, Point::new(9.0, 0.0));
    }

    #[test]
    fn max_distance_and_flags_filter_hits() {
        let mut scene = Scene::new();
        let a = scene.insert(Circle::new((3.0, 0.0), 1.0), ColliderFlags::default());
        let hidden = scene.insert(Circle::new((1.5, 0.0), 0.1), ColliderFlags::ENABLED);
        let _beyond = scene.insert(Circle::new((50.0, 0.0), 1.0), ColliderFlags::default());
        let mut q = query((0.0, 0.0), (1.0, 0.0));
        q.max_distance = 10.0;
        let hits = scene.cast(&q);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].surface, a.surface());

        scene.set_flags(hidden, ColliderFlags::default());
        assert_eq!(scene.cast(&q)[0].surface, hidden.surface());
    }

    #[test]
    fn sphere_cast_widens_the_probe() {
        let mut scene = Scene::new();
        let c = scene.insert(Circle::new((5.0, 1.5), 1.0), ColliderFlags::default());
        let mut q = query((0.0, 0.0), (1.0, 0.0));
        assert!(scene.cast(&q).is_empty());
        q.shape = CastShape::Sphere { radius: 0.75 };
        let hits = scene.cast(&q);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].surface, c.surface());
        assert!(hits[0].distance < 5.0);
    }

    #[test]
    fn origin_inside_reports_zero_distance() {
        let mut scene = Scene::new();
        scene.insert(Rect::new(-1.0, -1.0, 1.0, 1.0), ColliderFlags::default());
        scene.insert(Circle::new((0.0, 0.0), 2.0), ColliderFlags::default());
        let hits = scene.cast(&query((0.0, 0.0), (0.0, 1.0)));
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|h| h.distance == 0.0));
    }

    #[test]
    fn equal_distances_keep_slot_order() {
        let mut scene = Scene::new();
        let a = scene.insert(Rect::new(2.0, 0.0, 3.0, 1.0), ColliderFlags::default());
        let b = scene.insert(Rect::new(2.0, -1.0, 3.0, 0.0), ColliderFlags::default());
        let hits = scene.cast(&query((0.0, 0.0), (1.0, 0.0)));
        let surfaces: Vec<_> = hits.iter().map(|h| h.surface).collect();
        assert_eq!(surfaces, vec![a.surface(), b.surface()]);
    }

    #[test]
    fn zero_direction_casts_nothing() {
        let mut scene = Scene::new();
        scene.insert(Circle::new((0.0, 0.0), 1.0), ColliderFlags::default());
        assert!(scene.cast(&query((0.0, 0.0), (0.0, 0.0))).is_empty());
    }

    #[test]
    fn stale_handles_are_ignored() {
        let mut scene = Scene::new();
        let a = scene.insert(Circle::new((0.0, 0.0), 1.0), ColliderFlags::default());
        scene.remove(a);
        assert!(!scene.is_alive(a));
        let b = scene.insert(Circle::new((0.0, 0.0), 1.0), ColliderFlags::default());
        assert_ne!(a.surface(), b.surface());
        scene.set_flags(a, ColliderFlags::empty());
        assert_eq!(scene.flags(b), Some(ColliderFlags::default()));
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn overlap_query_skips_self_and_disabled() {
        let mut scene = Scene::new();
        let me = scene.insert(Circle::new((0.0, 0.0), 1.0), ColliderFlags::default());
        let touching = scene.insert(Circle::new((1.5, 0.0), 1.0), ColliderFlags::default());
        let _off = scene.insert(Circle::new((1.0, 0.0), 0.5), ColliderFlags::QUERYABLE);
        let volume = scene.shape(me).unwrap();
        assert_eq!(scene.overlapping(&volume, Some(me)), vec![touching.surface()]);
    }
}
