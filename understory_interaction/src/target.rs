// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Target (interactable) description and registry record.

use alloc::boxed::Box;
use alloc::vec::Vec;
use kurbo::Point;

use crate::commands::Commands;
use crate::events::{Listeners, TargetEventKind};
use crate::types::{ActorId, InteractionLayers, SurfaceId, TargetFlags, TargetId, UpdatePhase};

/// Per-phase callback for a target.
pub type TargetHook = Box<dyn FnMut(TargetId, UpdatePhase, &mut Commands)>;

/// Description of a target, used to insert it into an [`Engine`](crate::Engine).
///
/// ```
/// use kurbo::Point;
/// use understory_interaction::{SurfaceId, TargetDesc, TargetFlags};
///
/// let desc = TargetDesc {
///     surfaces: vec![SurfaceId(7)],
///     position: Point::new(2.0, 0.0),
///     flags: TargetFlags::default() | TargetFlags::CONCURRENT_SELECT,
///     ..Default::default()
/// };
/// assert!(desc.flags.contains(TargetFlags::SELECTABLE));
/// ```
pub struct TargetDesc {
    /// Capability mask; must intersect an actor's layers for any interaction.
    pub layers: InteractionLayers,
    /// Hover/select gates.
    pub flags: TargetFlags,
    /// Collision surfaces that resolve to this target while it is registered.
    pub surfaces: Vec<SurfaceId>,
    /// Reference point used for distance sorting.
    pub position: Point,
    /// Optional per-phase hook.
    pub phase_hook: Option<TargetHook>,
}

impl Default for TargetDesc {
    fn default() -> Self {
        Self {
            layers: InteractionLayers::default(),
            flags: TargetFlags::default(),
            surfaces: Vec::new(),
            position: Point::ORIGIN,
            phase_hook: None,
        }
    }
}

impl core::fmt::Debug for TargetDesc {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TargetDesc")
            .field("layers", &self.layers)
            .field("flags", &self.flags)
            .field("surfaces", &self.surfaces)
            .field("position", &self.position)
            .field("phase_hook", &self.phase_hook.is_some())
            .finish()
    }
}

pub(crate) struct Target {
    pub(crate) layers: InteractionLayers,
    pub(crate) flags: TargetFlags,
    pub(crate) surfaces: Vec<SurfaceId>,
    pub(crate) position: Point,
    pub(crate) phase_hook: Option<TargetHook>,
    pub(crate) registered: bool,
    // Surfaces actually mapped at registration (a subset of `surfaces`).
    pub(crate) mapped: Vec<SurfaceId>,
    pub(crate) hovering: Vec<ActorId>,
    pub(crate) selecting: Vec<ActorId>,
    pub(crate) listeners: Listeners<TargetEventKind, ActorId>,
}

impl Target {
    pub(crate) fn new(desc: TargetDesc) -> Self {
        Self {
            layers: desc.layers,
            flags: desc.flags,
            surfaces: desc.surfaces,
            position: desc.position,
            phase_hook: desc.phase_hook,
            registered: false,
            mapped: Vec::new(),
            hovering: Vec::new(),
            selecting: Vec::new(),
            listeners: Listeners::default(),
        }
    }
}

impl core::fmt::Debug for Target {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Target")
            .field("layers", &self.layers)
            .field("flags", &self.flags)
            .field("registered", &self.registered)
            .field("hovering", &self.hovering)
            .field("selecting", &self.selecting)
            .finish_non_exhaustive()
    }
}
