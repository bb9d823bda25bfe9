// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Generational slot storage backing the actor and target registries.

use alloc::vec::Vec;
use core::marker::PhantomData;

/// A generational handle into an [`Arena`].
pub(crate) trait Handle: Copy + Eq {
    fn from_parts(idx: u32, generation: u32) -> Self;
    fn index(self) -> usize;
    fn generation(self) -> u32;
}

/// Slot storage keyed by generational handles.
///
/// Freed slots are reused with an incremented generation so stale handles never
/// alias a newer entry.
pub(crate) struct Arena<H, T> {
    slots: Vec<Option<T>>,
    generations: Vec<u32>, // last generation per slot (persists across frees)
    free_list: Vec<usize>,
    _handle: PhantomData<fn() -> H>,
}

impl<H, T> Default for Arena<H, T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            _handle: PhantomData,
        }
    }
}

impl<H, T> Arena<H, T> {
    pub(crate) fn len(&self) -> usize {
        self.slots.len() - self.free_list.len()
    }
}

impl<H, T> core::fmt::Debug for Arena<H, T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Arena")
            .field("slots_total", &self.slots.len())
            .field("alive", &self.len())
            .field("free_list", &self.free_list.len())
            .finish_non_exhaustive()
    }
}

impl<H: Handle, T> Arena<H, T> {
    pub(crate) fn insert(&mut self, value: T) -> H {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.slots[idx] = Some(value);
            (idx, generation)
        } else {
            let generation = 1_u32;
            self.slots.push(Some(value));
            self.generations.push(generation);
            (self.slots.len() - 1, generation)
        };
        handle_at(idx, generation)
    }

    pub(crate) fn remove(&mut self, id: H) -> Option<T> {
        if !self.contains(id) {
            return None;
        }
        let value = self.slots[id.index()].take();
        self.free_list.push(id.index());
        value
    }

    pub(crate) fn contains(&self, id: H) -> bool {
        matches!(self.slots.get(id.index()), Some(Some(_)))
            && self.generations[id.index()] == id.generation()
    }

    pub(crate) fn get(&self, id: H) -> Option<&T> {
        if self.generations.get(id.index()).copied() != Some(id.generation()) {
            return None;
        }
        self.slots.get(id.index())?.as_ref()
    }

    pub(crate) fn get_mut(&mut self, id: H) -> Option<&mut T> {
        if self.generations.get(id.index()).copied() != Some(id.generation()) {
            return None;
        }
        self.slots.get_mut(id.index())?.as_mut()
    }

    /// Live entries in slot order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (H, &T)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|v| (handle_at(i, self.generations[i]), v)))
    }

    /// Live entries in slot order, mutably.
    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = (H, &mut T)> + '_ {
        let generations = &self.generations;
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(move |(i, slot)| slot.as_mut().map(|v| (handle_at(i, generations[i]), v)))
    }
}

fn handle_at<H: Handle>(idx: usize, generation: u32) -> H {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Handles use 32-bit indices by design."
    )]
    let idx = idx as u32;
    H::from_parts(idx, generation)
}
