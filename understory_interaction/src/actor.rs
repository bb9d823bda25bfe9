// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Actor (interactor) description and registry record.

use alloc::boxed::Box;
use alloc::vec::Vec;
use kurbo::{Point, Vec2};

use crate::commands::Commands;
use crate::discovery::{Discovery, RayDiscovery, VolumeDiscovery};
use crate::events::{ActorEventKind, Listeners};
use crate::types::{ActorFlags, ActorId, InteractionLayers, TargetId, UpdatePhase};

/// Actor-specific hover or select predicate.
pub type TargetFilter = fn(TargetId) -> bool;

/// Per-phase callback for an actor.
pub type ActorHook = Box<dyn FnMut(ActorId, UpdatePhase, &mut Commands)>;

/// Description of an actor, used to insert it into an [`Engine`](crate::Engine).
///
/// The default is a ray actor pointing along +x from the origin that may hover
/// and select anything.
///
/// ```
/// use kurbo::Point;
/// use understory_interaction::{ActorDesc, ActorFlags, VolumeDiscovery};
///
/// let desc = ActorDesc {
///     origin: Point::new(0.0, 1.0),
///     flags: ActorFlags::default() | ActorFlags::SELECT_EXCLUSIVE,
///     ..ActorDesc::new(VolumeDiscovery::new())
/// };
/// assert!(desc.flags.contains(ActorFlags::ALLOW_SELECT));
/// ```
pub struct ActorDesc {
    /// Capability mask; must intersect a target's layers for any interaction.
    pub layers: InteractionLayers,
    /// Hover/select gates.
    pub flags: ActorFlags,
    /// Candidate discovery strategy.
    pub discovery: Box<dyn Discovery>,
    /// Target to force-select once, at the first pass after first registration.
    pub starting_target: Option<TargetId>,
    /// Seconds the nearest candidate must stay nearest before it can be selected.
    pub hover_to_select: Option<f64>,
    /// Extra hover predicate.
    pub hover_filter: Option<TargetFilter>,
    /// Extra select predicate.
    pub select_filter: Option<TargetFilter>,
    /// Reference point (ray origin, volume center).
    pub origin: Point,
    /// Forward axis.
    pub direction: Vec2,
    /// Optional per-phase hook.
    pub phase_hook: Option<ActorHook>,
}

impl ActorDesc {
    /// Description with the given discovery strategy and default everything else.
    pub fn new(discovery: impl Discovery + 'static) -> Self {
        Self {
            layers: InteractionLayers::default(),
            flags: ActorFlags::default(),
            discovery: Box::new(discovery),
            starting_target: None,
            hover_to_select: None,
            hover_filter: None,
            select_filter: None,
            origin: Point::ORIGIN,
            direction: Vec2::new(1.0, 0.0),
            phase_hook: None,
        }
    }

    /// A ray actor at `origin` looking along `direction`.
    pub fn ray(origin: Point, direction: Vec2) -> Self {
        Self {
            origin,
            direction,
            ..Self::new(RayDiscovery::default())
        }
    }

    /// A volume actor centered on `origin`.
    pub fn volume(origin: Point) -> Self {
        Self {
            origin,
            ..Self::new(VolumeDiscovery::new())
        }
    }
}

impl Default for ActorDesc {
    fn default() -> Self {
        Self::new(RayDiscovery::default())
    }
}

impl core::fmt::Debug for ActorDesc {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ActorDesc")
            .field("layers", &self.layers)
            .field("flags", &self.flags)
            .field("discovery", &self.discovery)
            .field("starting_target", &self.starting_target)
            .field("hover_to_select", &self.hover_to_select)
            .field("origin", &self.origin)
            .field("direction", &self.direction)
            .finish_non_exhaustive()
    }
}

pub(crate) struct Actor {
    pub(crate) layers: InteractionLayers,
    pub(crate) flags: ActorFlags,
    pub(crate) discovery: Box<dyn Discovery>,
    pub(crate) hover_to_select: Option<f64>,
    pub(crate) hover_filter: Option<TargetFilter>,
    pub(crate) select_filter: Option<TargetFilter>,
    pub(crate) origin: Point,
    pub(crate) direction: Vec2,
    pub(crate) phase_hook: Option<ActorHook>,
    pub(crate) registered: bool,
    // Consumed by the first pass that sees the actor registered.
    pub(crate) pending_start: Option<TargetId>,
    pub(crate) hover: Vec<TargetId>,
    pub(crate) select: Option<TargetId>,
    // Not re-claimed until it leaves the candidates or the select gate clears.
    pub(crate) displaced_from: Option<TargetId>,
    pub(crate) nearest: Option<TargetId>,
    pub(crate) nearest_since: f64,
    pub(crate) listeners: Listeners<ActorEventKind, TargetId>,
}

impl Actor {
    pub(crate) fn new(desc: ActorDesc) -> Self {
        Self {
            layers: desc.layers,
            flags: desc.flags,
            discovery: desc.discovery,
            hover_to_select: desc.hover_to_select,
            hover_filter: desc.hover_filter,
            select_filter: desc.select_filter,
            origin: desc.origin,
            direction: desc.direction,
            phase_hook: desc.phase_hook,
            registered: false,
            pending_start: desc.starting_target,
            hover: Vec::new(),
            select: None,
            displaced_from: None,
            nearest: None,
            nearest_since: 0.0,
            listeners: Listeners::default(),
        }
    }

    /// Back to a description; relationships and listeners are not carried.
    pub(crate) fn into_desc(self) -> ActorDesc {
        ActorDesc {
            layers: self.layers,
            flags: self.flags,
            discovery: self.discovery,
            starting_target: None,
            hover_to_select: self.hover_to_select,
            hover_filter: self.hover_filter,
            select_filter: self.select_filter,
            origin: self.origin,
            direction: self.direction,
            phase_hook: self.phase_hook,
        }
    }
}

impl core::fmt::Debug for Actor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Actor")
            .field("layers", &self.layers)
            .field("flags", &self.flags)
            .field("registered", &self.registered)
            .field("hover", &self.hover)
            .field("select", &self.select)
            .finish_non_exhaustive()
    }
}
