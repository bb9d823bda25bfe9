// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types: actor/target handles, surface identifiers, flags, and update phases.

use crate::arena::Handle;

/// Identifier for an actor (interactor) in an [`Engine`](crate::Engine).
///
/// This is a small, copyable handle that stays stable while the actor exists and
/// becomes stale once the actor is removed.
/// It consists of a slot index and a generation counter.
///
/// ## Semantics
///
/// - On insert, a fresh slot is allocated with generation `1`.
/// - On remove (or detach), the slot is freed; any existing `ActorId` that pointed to that slot is now stale.
/// - On reuse of a freed slot, its generation is incremented, producing a new, distinct `ActorId`.
///
/// Stale handles never alias a different live actor because the generation must match.
/// Handles are only meaningful for the engine that issued them.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ActorId(pub(crate) u32, pub(crate) u32);

/// Identifier for a target (interactable) in an [`Engine`](crate::Engine).
///
/// Same generational semantics as [`ActorId`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct TargetId(pub(crate) u32, pub(crate) u32);

impl Handle for ActorId {
    fn from_parts(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    fn index(self) -> usize {
        self.0 as usize
    }

    fn generation(self) -> u32 {
        self.1
    }
}

impl Handle for TargetId {
    fn from_parts(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    fn index(self) -> usize {
        self.0 as usize
    }

    fn generation(self) -> u32 {
        self.1
    }
}

/// Opaque identifier of a collision surface owned by the substrate.
///
/// Several surfaces may map to one target; each surface maps to at most one
/// target at a time (see [`Engine::resolve_target_for_surface`](crate::Engine::resolve_target_for_surface)).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(pub u64);

bitflags::bitflags! {
    /// Capability mask used for actor/target compatibility.
    ///
    /// An actor and a target are compatible when their layers intersect.
    /// Every bit is a valid layer; the named constant is only a convenience.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct InteractionLayers: u32 {
        /// The first layer.
        const DEFAULT = 0b0000_0001;
        const _ = !0;
    }
}

impl Default for InteractionLayers {
    fn default() -> Self {
        Self::all()
    }
}

bitflags::bitflags! {
    /// Per-actor gates.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ActorFlags: u8 {
        /// Actor may hover targets.
        const ALLOW_HOVER         = 0b0000_0001;
        /// Actor may select targets.
        const ALLOW_SELECT        = 0b0000_0010;
        /// Actor's select attempt fails whenever another actor already selects the target.
        ///
        /// An actor holding a target with this flag is never displaced by other claims.
        const SELECT_EXCLUSIVE    = 0b0000_0100;
        /// While selecting, the actor only hovers its selected target.
        const HOVER_SELECTED_ONLY = 0b0000_1000;
    }
}

impl Default for ActorFlags {
    fn default() -> Self {
        Self::ALLOW_HOVER | Self::ALLOW_SELECT
    }
}

bitflags::bitflags! {
    /// Per-target gates.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct TargetFlags: u8 {
        /// Target accepts hover.
        const HOVERABLE         = 0b0000_0001;
        /// Target accepts select.
        const SELECTABLE        = 0b0000_0010;
        /// Several actors may select the target at once.
        const CONCURRENT_SELECT = 0b0000_0100;
    }
}

impl Default for TargetFlags {
    fn default() -> Self {
        Self::HOVERABLE | Self::SELECTABLE
    }
}

/// Update phases delivered once per simulation tick, in declaration order.
///
/// See [`Engine::tick`](crate::Engine::tick).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum UpdatePhase {
    /// Physics-rate step.
    FixedStep,
    /// Once per frame; reconciliation runs here, after actor hooks and before target hooks.
    Dynamic,
    /// After the dynamic phase.
    Late,
    /// Just before frame submission (camera-relative adjustments).
    PreRender,
}

impl UpdatePhase {
    /// All phases in delivery order.
    pub const ALL: [Self; 4] = [Self::FixedStep, Self::Dynamic, Self::Late, Self::PreRender];
}
