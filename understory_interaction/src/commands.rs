// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deferred mutations requested from listeners and phase hooks.
//!
//! Callbacks never see the engine itself. They push requests into a
//! [`Commands`] queue which the engine applies, in order, after the operation
//! or phase that invoked them has finished. Requests against stale handles are
//! dropped with a warning.

use alloc::vec::Vec;

use crate::types::{ActorFlags, ActorId, TargetId};

#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) enum Command {
    RegisterActor(ActorId),
    UnregisterActor(ActorId),
    RemoveActor(ActorId),
    RegisterTarget(TargetId),
    UnregisterTarget(TargetId),
    RemoveTarget(TargetId),
    ForceSelect(ActorId, TargetId),
    ReleaseSelect(ActorId),
    SetActorFlags(ActorId, ActorFlags),
    SetInteractionsEnabled(ActorId, bool),
}

/// Queue of engine mutations.
#[derive(Clone, Debug, Default)]
pub struct Commands {
    queue: Vec<Command>,
}

impl Commands {
    /// Put an actor into service.
    pub fn register_actor(&mut self, actor: ActorId) {
        self.queue.push(Command::RegisterActor(actor));
    }

    /// Take an actor out of service (with exits).
    pub fn unregister_actor(&mut self, actor: ActorId) {
        self.queue.push(Command::UnregisterActor(actor));
    }

    /// Unregister and free an actor.
    pub fn remove_actor(&mut self, actor: ActorId) {
        self.queue.push(Command::RemoveActor(actor));
    }

    /// Put a target into service.
    pub fn register_target(&mut self, target: TargetId) {
        self.queue.push(Command::RegisterTarget(target));
    }

    /// Take a target out of service (with exits).
    pub fn unregister_target(&mut self, target: TargetId) {
        self.queue.push(Command::UnregisterTarget(target));
    }

    /// Unregister and free a target.
    pub fn remove_target(&mut self, target: TargetId) {
        self.queue.push(Command::RemoveTarget(target));
    }

    /// See [`Engine::force_select`](crate::Engine::force_select).
    pub fn force_select(&mut self, actor: ActorId, target: TargetId) {
        self.queue.push(Command::ForceSelect(actor, target));
    }

    /// See [`Engine::release_select`](crate::Engine::release_select).
    pub fn release_select(&mut self, actor: ActorId) {
        self.queue.push(Command::ReleaseSelect(actor));
    }

    /// See [`Engine::set_actor_flags`](crate::Engine::set_actor_flags).
    pub fn set_actor_flags(&mut self, actor: ActorId, flags: ActorFlags) {
        self.queue.push(Command::SetActorFlags(actor, flags));
    }

    /// See [`Engine::set_interactions_enabled`](crate::Engine::set_interactions_enabled).
    pub fn set_interactions_enabled(&mut self, actor: ActorId, enabled: bool) {
        self.queue.push(Command::SetInteractionsEnabled(actor, enabled));
    }

    /// Number of pending requests.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// True when nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub(crate) fn take(&mut self) -> Vec<Command> {
        core::mem::take(&mut self.queue)
    }
}
