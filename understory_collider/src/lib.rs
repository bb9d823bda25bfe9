// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Collider: a small 2D collider scene for driving `understory_interaction`.
//!
//! - [`Scene`] stores circles and axis-aligned rectangles behind generational
//!   [`ColliderId`] handles and implements [`Substrate`](understory_interaction::Substrate):
//!   ray and sphere casts report every queryable collider within reach, sorted by
//!   distance with ties in slot order.
//! - Each collider reports itself as [`ColliderId::surface`]; map those surfaces
//!   to targets with `TargetDesc::surfaces`. Colliders with no target act as
//!   blockers for ray actors.
//! - [`OverlapTracker`] turns per-frame overlap sets into enter/exit transitions
//!   for volume actors; [`forward`] hands them to the engine.
//!
//! Sphere casts against rectangles are conservative at the corners.
//!
//! ## Example
//!
//! ```
//! use kurbo::{Circle, Point, Rect, Vec2};
//! use understory_collider::{ColliderFlags, Scene};
//! use understory_interaction::{ActorDesc, Engine, TargetDesc};
//!
//! let mut scene = Scene::new();
//! let _wall = scene.insert(Rect::new(4.0, -1.0, 5.0, 1.0), ColliderFlags::default());
//! let ball = scene.insert(Circle::new((2.0, 0.0), 0.5), ColliderFlags::default());
//!
//! let mut engine = Engine::new();
//! let target = engine.insert_target(TargetDesc {
//!     surfaces: vec![ball.surface()],
//!     position: Point::new(2.0, 0.0),
//!     ..Default::default()
//! });
//! engine.register_target(target).unwrap();
//! let ray = engine.insert_actor(ActorDesc::ray(Point::ORIGIN, Vec2::new(1.0, 0.0)));
//! engine.register_actor(ray).unwrap();
//!
//! engine.tick(&scene, 0.0);
//! assert_eq!(engine.selected_target(ray), Some(target));
//!
//! // Move the ball behind the wall: the wall blocks it.
//! scene.set_shape(ball, Circle::new((8.0, 0.0), 0.5));
//! engine.tick(&scene, 0.1);
//! assert!(engine.hovered_targets(ray).is_empty());
//! ```

mod overlap;
mod scene;
mod types;

pub use overlap::{OverlapEvent, OverlapTracker, forward};
pub use scene::Scene;
pub use types::{ColliderFlags, ColliderId, ColliderShape};
