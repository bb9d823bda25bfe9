// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Interaction: hover and select arbitration between actors and targets.
//!
//! Actors (pointers, rays, proximity volumes) look for targets (grabbable or
//! selectable objects). Every frame the [`Engine`] decides which actor hovers
//! which target and which actor holds select on which target, and fires paired
//! enter/exit notifications on both sides as those relationships change.
//!
//! - Actors and targets live in generational arenas owned by the engine and refer
//!   to each other only through [`ActorId`] / [`TargetId`] handles.
//! - Each actor owns a [`Discovery`] strategy producing its ordered candidates:
//!   [`RayDiscovery`] (occlusion-ordered; the first non-interactable surface
//!   blocks everything behind it) or [`VolumeDiscovery`] (overlap membership
//!   sorted by squared distance).
//! - Geometry belongs to the host: a [`Substrate`] answers casts and the host
//!   reports volume overlaps. Surfaces map back to targets through the engine's
//!   surface index ([`Engine::resolve_target_for_surface`]).
//! - [`Engine::tick`] delivers the four [`UpdatePhase`]s; reconciliation runs
//!   during [`UpdatePhase::Dynamic`].
//!
//! ## Guarantees
//!
//! After every completed operation:
//! - `t ∈ hovered_targets(a)` exactly when `a ∈ hovering_actors(t)`, and likewise
//!   for select.
//! - A target has at most one selecting actor unless it carries
//!   [`TargetFlags::CONCURRENT_SELECT`].
//! - Each surface resolves to at most one registered target.
//! - No enter is issued twice for a pair without an exit in between, and objects
//!   leaving service (unregister, remove, detach) first exit every relationship.
//!
//! [`Engine::is_consistent`] checks these; debug builds assert it after every pass.
//!
//! ## Listeners and deferred mutation
//!
//! Callbacks registered with [`Engine::subscribe_actor`] and
//! [`Engine::subscribe_target`] run synchronously, in subscription order, and may
//! request mutations through [`Commands`]. Requests are applied after the current
//! operation or phase finishes, never in the middle of a pass.
//!
//! ## Minimal example
//!
//! ```
//! use kurbo::{Point, Vec2};
//! use understory_interaction::{
//!     ActorDesc, Engine, RayHit, RayQuery, Substrate, SurfaceId, TargetDesc,
//! };
//!
//! // A scene with one surface, 2 units along +x.
//! struct OneWall;
//! impl Substrate for OneWall {
//!     fn cast(&self, q: &RayQuery) -> Vec<RayHit> {
//!         vec![RayHit {
//!             surface: SurfaceId(1),
//!             distance: 2.0,
//!             point: q.origin + Vec2::new(2.0, 0.0),
//!             normal: Vec2::new(-1.0, 0.0),
//!         }]
//!     }
//! }
//!
//! let mut engine = Engine::new();
//! let pointer = engine.insert_actor(ActorDesc::ray(Point::ORIGIN, Vec2::new(1.0, 0.0)));
//! let button = engine.insert_target(TargetDesc {
//!     surfaces: vec![SurfaceId(1)],
//!     position: Point::new(2.0, 0.0),
//!     ..Default::default()
//! });
//! engine.register_actor(pointer).unwrap();
//! engine.register_target(button).unwrap();
//!
//! engine.tick(&OneWall, 0.0);
//! assert_eq!(engine.hovered_targets(pointer), &[button]);
//! assert_eq!(engine.selected_target(pointer), Some(button));
//!
//! // Leaving service exits every relationship first.
//! engine.unregister_target(button).unwrap();
//! assert_eq!(engine.selected_target(pointer), None);
//! assert!(engine.is_consistent());
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod actor;
mod arena;
mod commands;
pub mod discovery;
mod engine;
mod error;
pub mod events;
mod reconcile;
mod scheduler;
pub mod substrate;
mod surface;
mod target;
mod types;

pub use actor::{ActorDesc, ActorHook, TargetFilter};
pub use commands::Commands;
pub use discovery::{Discovery, DiscoveryContext, RayDiscovery, VolumeDiscovery};
pub use engine::{Engine, EngineConfig, RayHitInfo};
pub use error::InteractionError;
pub use events::{ActorEventKind, Callback, InteractionEvent, TargetEventKind};
pub use substrate::{CastShape, EmptySubstrate, RayHit, RayQuery, Substrate, distance_squared};
pub use target::{TargetDesc, TargetHook};
pub use types::{
    ActorFlags, ActorId, InteractionLayers, SurfaceId, TargetFlags, TargetId, UpdatePhase,
};
