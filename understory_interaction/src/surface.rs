// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Surface → target index.

use hashbrown::HashMap;

use crate::types::{SurfaceId, TargetId};

/// Maps collision surfaces to the registered target that owns them.
///
/// Each surface resolves to at most one target. Only registered targets have
/// entries, so a lookup never yields a target that is out of service.
#[derive(Clone, Debug, Default)]
pub(crate) struct SurfaceIndex {
    map: HashMap<SurfaceId, TargetId>,
}

impl SurfaceIndex {
    pub(crate) fn resolve(&self, surface: SurfaceId) -> Option<TargetId> {
        self.map.get(&surface).copied()
    }

    /// Map `surface` to `target`.
    ///
    /// Returns `false` (and leaves the index untouched) if the surface already
    /// belongs to a different target.
    pub(crate) fn map(&mut self, surface: SurfaceId, target: TargetId) -> bool {
        match self.map.get(&surface) {
            Some(owner) => *owner == target,
            None => {
                self.map.insert(surface, target);
                true
            }
        }
    }

    /// Remove `surface` if it is owned by `target`.
    pub(crate) fn unmap(&mut self, surface: SurfaceId, target: TargetId) {
        if self.map.get(&surface) == Some(&target) {
            self.map.remove(&surface);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.map.len()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (SurfaceId, TargetId)> + '_ {
        self.map.iter().map(|(s, t)| (*s, *t))
    }
}
