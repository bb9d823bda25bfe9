// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors reported by [`Engine`](crate::Engine) operations.

use crate::types::{ActorId, TargetId};

/// Failure of an engine operation.
///
/// None of these leave the registry modified; the failed call is a no-op.
#[derive(Copy, Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum InteractionError {
    /// The actor handle is stale or was never issued by this engine.
    #[error("actor {0:?} not found")]
    ActorNotFound(ActorId),
    /// The target handle is stale or was never issued by this engine.
    #[error("target {0:?} not found")]
    TargetNotFound(TargetId),
    /// The actor exists but is not registered (not in service).
    #[error("actor {0:?} is not registered")]
    ActorNotRegistered(ActorId),
    /// The target exists but is not registered (not in service).
    #[error("target {0:?} is not registered")]
    TargetNotRegistered(TargetId),
    /// A forced selection was refused by an exclusivity rule.
    #[error("select of {target:?} by {actor:?} rejected by an exclusive holder")]
    SelectRejected {
        /// The actor that asked for the selection.
        actor: ActorId,
        /// The target it asked for.
        target: TargetId,
    },
}

impl InteractionError {
    /// True for the not-found family (stale or foreign handles).
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ActorNotFound(_) | Self::TargetNotFound(_))
    }
}
