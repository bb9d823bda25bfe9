// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Interaction notifications and listener lists.
//!
//! Every relationship change produces a paired enter/exit notification on both
//! sides. For a hover enter the order is:
//!
//! 1. actor [`ActorEventKind::HoverEnter`],
//! 2. target [`TargetEventKind::FirstHoverEnter`] (only on the 0 → 1 transition),
//! 3. target [`TargetEventKind::HoverEnter`].
//!
//! For a hover exit: actor [`ActorEventKind::HoverExit`], target
//! [`TargetEventKind::LastHoverExit`] (only on 1 → 0), target
//! [`TargetEventKind::HoverExit`]. Select transitions notify the actor, then the
//! target.
//!
//! Listeners run synchronously in subscription order and receive the counterpart
//! handle plus a [`Commands`] queue for mutations, which are applied once the
//! current operation completes.

use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::commands::Commands;
use crate::types::{ActorId, TargetId};

/// Actor-scoped notification kinds.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ActorEventKind {
    /// The actor started hovering a target.
    HoverEnter,
    /// The actor stopped hovering a target.
    HoverExit,
    /// The actor was granted select on a target.
    SelectEnter,
    /// The actor lost select on a target.
    SelectExit,
}

/// Target-scoped notification kinds.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum TargetEventKind {
    /// The target went from zero hovering actors to one.
    FirstHoverEnter,
    /// An actor started hovering the target.
    HoverEnter,
    /// An actor stopped hovering the target.
    HoverExit,
    /// The target lost its last hovering actor.
    LastHoverExit,
    /// An actor was granted select on the target.
    SelectEnter,
    /// An actor lost select on the target.
    SelectExit,
}

/// One recorded notification, as returned by [`Engine::drain_events`](crate::Engine::drain_events).
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum InteractionEvent {
    /// Delivered to `actor`, naming `target` as the counterpart.
    Actor {
        /// Receiving actor.
        actor: ActorId,
        /// Counterpart.
        target: TargetId,
        /// What happened.
        kind: ActorEventKind,
    },
    /// Delivered to `target`, naming `actor` as the counterpart.
    Target {
        /// Receiving target.
        target: TargetId,
        /// Counterpart.
        actor: ActorId,
        /// What happened.
        kind: TargetEventKind,
    },
}

/// A listener callback receiving the counterpart handle.
pub type Callback<H> = Box<dyn FnMut(H, &mut Commands)>;

/// Ordered listener list keyed by event kind.
pub(crate) struct Listeners<K, H> {
    entries: Vec<(K, Callback<H>)>,
}

impl<K, H> Default for Listeners<K, H> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<K: core::fmt::Debug, H> core::fmt::Debug for Listeners<K, H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|(k, _)| k))
            .finish()
    }
}

impl<K: Copy + Eq, H: Copy> Listeners<K, H> {
    pub(crate) fn push(&mut self, kind: K, callback: Callback<H>) {
        self.entries.push((kind, callback));
    }

    pub(crate) fn emit(&mut self, kind: K, counterpart: H, commands: &mut Commands) {
        for (k, cb) in &mut self.entries {
            if *k == kind {
                cb(counterpart, commands);
            }
        }
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}
