// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Overlap transitions for volume actors.
//!
//! ## Usage
//!
//! 1) Each frame, query the scene with [`Scene::overlapping`](crate::Scene::overlapping)
//!    for the volume's shape.
//! 2) Pass the result to [`OverlapTracker::update`] to get `Exit(..)` / `Enter(..)`
//!    transitions relative to the previous frame.
//! 3) Forward them to the engine with [`forward`].
//!
//! ```
//! use understory_collider::{OverlapEvent, OverlapTracker};
//! use understory_interaction::SurfaceId;
//!
//! let mut t = OverlapTracker::new();
//! assert_eq!(t.update(&[SurfaceId(1)]), vec![OverlapEvent::Enter(SurfaceId(1))]);
//! assert_eq!(
//!     t.update(&[SurfaceId(2)]),
//!     vec![OverlapEvent::Exit(SurfaceId(1)), OverlapEvent::Enter(SurfaceId(2))]
//! );
//! ```

use understory_interaction::{ActorId, Engine, InteractionError, SurfaceId};

/// An overlap transition.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OverlapEvent {
    /// The volume started overlapping the surface.
    Enter(SurfaceId),
    /// The volume stopped overlapping the surface.
    Exit(SurfaceId),
}

/// Tracks one volume's overlap set across frames.
///
/// Ordering: exits first, in the order the surfaces entered; then enters, in the
/// order given to [`OverlapTracker::update`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OverlapTracker {
    current: Vec<SurfaceId>,
}

impl OverlapTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Surfaces currently overlapping, in the order they entered.
    pub fn current(&self) -> &[SurfaceId] {
        &self.current
    }

    /// Forget everything, returning an exit per current surface.
    pub fn clear(&mut self) -> Vec<OverlapEvent> {
        self.current.drain(..).map(OverlapEvent::Exit).collect()
    }

    /// Replace the overlap set and return the transitions.
    pub fn update(&mut self, overlapping: &[SurfaceId]) -> Vec<OverlapEvent> {
        let mut out = Vec::new();
        self.current.retain(|s| {
            let keep = overlapping.contains(s);
            if !keep {
                out.push(OverlapEvent::Exit(*s));
            }
            keep
        });
        for &s in overlapping {
            if !self.current.contains(&s) {
                self.current.push(s);
                out.push(OverlapEvent::Enter(s));
            }
        }
        out
    }
}

/// Deliver overlap transitions to `actor`'s discovery strategy.
pub fn forward(
    engine: &mut Engine,
    actor: ActorId,
    events: &[OverlapEvent],
) -> Result<(), InteractionError> {
    for event in events {
        match *event {
            OverlapEvent::Enter(s) => engine.overlap_enter(actor, s)?,
            OverlapEvent::Exit(s) => engine.overlap_exit(actor, s)?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exits_precede_enters() {
        let (a, b, c) = (SurfaceId(1), SurfaceId(2), SurfaceId(3));
        let mut t = OverlapTracker::new();
        t.update(&[a, b]);
        assert_eq!(
            t.update(&[c, b]),
            vec![OverlapEvent::Exit(a), OverlapEvent::Enter(c)]
        );
        assert_eq!(t.current(), &[b, c]);
        assert!(t.update(&[b, c]).is_empty());
        assert_eq!(
            t.clear(),
            vec![OverlapEvent::Exit(b), OverlapEvent::Exit(c)]
        );
    }

    #[test]
    fn duplicates_enter_once() {
        let s = SurfaceId(4);
        let mut t = OverlapTracker::new();
        assert_eq!(t.update(&[s, s]), vec![OverlapEvent::Enter(s)]);
    }
}
