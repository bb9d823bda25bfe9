// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The reconciliation pass and select arbitration.
//!
//! For each registered actor, in registration order:
//!
//! 1. A pending starting target is force-selected.
//! 2. Candidates are discovered and filtered to registered targets.
//! 3. Select clearing: the held target is released if the actor's select gate,
//!    the layer intersection, the target's select gate or the actor's select
//!    filter no longer pass.
//! 4. Hover clearing: hovered targets that left the candidates or fail the hover
//!    predicate are exited.
//! 5. Select granting: the first candidate that passes the select predicate and
//!    can be claimed is selected.
//! 6. Hover granting: every remaining candidate passing the hover predicate is
//!    entered.
//!
//! Selection is not tied to candidacy: a held target stays selected after it
//! leaves the actor's candidates.
//!
//! ## Claims
//!
//! A claim by `a` on `t` is rejected if any other holder of `t` is exclusive,
//! or if `a` is exclusive and `t` has any other holder. Otherwise targets with
//! [`TargetFlags::CONCURRENT_SELECT`] simply gain a holder, and other targets
//! evict their current holder first. An evicted actor does not claim the same
//! target again until the target leaves its candidates or its select gate is
//! turned off.

use alloc::vec::Vec;
use tracing::{debug, trace, warn};

use crate::engine::Engine;
use crate::error::InteractionError;
use crate::substrate::Substrate;
use crate::types::{ActorFlags, ActorId, TargetFlags, TargetId};

impl Engine {
    /// Run one reconciliation pass outside the scheduler, then apply queued commands.
    ///
    /// [`Engine::tick`] runs this during [`UpdatePhase::Dynamic`](crate::UpdatePhase::Dynamic).
    pub fn reconcile(&mut self, substrate: &dyn Substrate) {
        self.reconcile_pass(substrate);
        self.flush();
    }

    /// Select `target` for `actor` now, bypassing discovery and the select predicate.
    ///
    /// The actor's current selection, if different, is exited first. The claim
    /// rules still apply: if an exclusive holder keeps the target (or the actor
    /// is exclusive and the target is held), nothing changes and
    /// [`InteractionError::SelectRejected`] is returned. Otherwise other holders
    /// are evicted unless the target accepts concurrent select.
    ///
    /// The next pass still runs select clearing, so a selection the actor's
    /// gates do not allow is released there.
    pub fn force_select(&mut self, actor: ActorId, target: TargetId) -> Result<(), InteractionError> {
        let r = self.force_select_now(actor, target);
        self.flush();
        r
    }

    /// Release `actor`'s selection, if any.
    ///
    /// The released target is not claimed again by this actor until it leaves
    /// the actor's candidates.
    pub fn release_select(&mut self, actor: ActorId) -> Result<(), InteractionError> {
        let r = self.release_select_now(actor);
        self.flush();
        r
    }

    pub(crate) fn force_select_now(
        &mut self,
        actor: ActorId,
        target: TargetId,
    ) -> Result<(), InteractionError> {
        self.ensure_actor_registered(actor)?;
        self.ensure_target_registered(target)?;
        let current = self.actors.get(actor).and_then(|a| a.select);
        if current == Some(target) {
            return Ok(());
        }
        self.check_claim(actor, target)?;
        if let Some(current) = current {
            self.select_exit(actor, current);
        }
        if let Some(a) = self.actors.get_mut(actor) {
            a.displaced_from = None;
        }
        debug!(actor = ?actor, target_id = ?target, "forced select");
        self.claim(actor, target)?;
        self.drop_unselected_hovers(actor);
        Ok(())
    }

    pub(crate) fn release_select_now(&mut self, actor: ActorId) -> Result<(), InteractionError> {
        self.ensure_actor_registered(actor)?;
        if let Some(t) = self.actors.get(actor).and_then(|a| a.select) {
            self.select_exit(actor, t);
            if let Some(a) = self.actors.get_mut(actor) {
                a.displaced_from = Some(t);
            }
        }
        Ok(())
    }

    pub(crate) fn reconcile_pass(&mut self, substrate: &dyn Substrate) {
        for i in 0..self.actor_order.len() {
            let id = self.actor_order[i];
            self.reconcile_actor(id, substrate);
        }
        debug_assert!(self.is_consistent(), "registry inconsistent after pass");
        trace!(
            actors = self.actor_order.len(),
            targets = self.target_order.len(),
            "reconciliation pass"
        );
    }

    fn reconcile_actor(&mut self, id: ActorId, substrate: &dyn Substrate) {
        if let Some(t) = self.actors.get_mut(id).and_then(|a| a.pending_start.take())
            && let Err(err) = self.force_select_now(id, t)
        {
            warn!(actor = ?id, target_id = ?t, %err, "starting target dropped");
        }

        let mut candidates = core::mem::take(&mut self.candidates);
        self.collect_candidates(id, substrate, &mut candidates);
        let now = self.now;
        if let Some(a) = self.actors.get_mut(id) {
            let first = candidates.first().copied();
            if a.nearest != first {
                a.nearest = first;
                a.nearest_since = now;
            }
            if !a.flags.contains(ActorFlags::ALLOW_SELECT) {
                a.displaced_from = None;
            }
            if a.displaced_from.is_some_and(|t| !candidates.contains(&t)) {
                a.displaced_from = None;
            }
        }

        // Select clearing.
        if let Some(t) = self.actors.get(id).and_then(|a| a.select)
            && !self.select_holds(id, t)
        {
            // Lost a share that is no longer concurrent: treat as displaced.
            let outnumbered = self.targets.get(t).is_some_and(|x| {
                !x.flags.contains(TargetFlags::CONCURRENT_SELECT)
                    && x.selecting.first() != Some(&id)
            });
            self.select_exit(id, t);
            if outnumbered && let Some(a) = self.actors.get_mut(id) {
                a.displaced_from = Some(t);
            }
        }

        // Hover clearing.
        let hovered: Vec<TargetId> = self.hovered_targets(id).to_vec();
        for t in hovered {
            if !candidates.contains(&t) || !self.can_hover(id, t) {
                self.hover_exit(id, t);
            }
        }

        // Select granting.
        let wants_select = self
            .actors
            .get(id)
            .is_some_and(|a| a.flags.contains(ActorFlags::ALLOW_SELECT) && a.select.is_none());
        if wants_select {
            for &t in &candidates {
                let displaced = self
                    .actors
                    .get(id)
                    .is_some_and(|a| a.displaced_from == Some(t));
                if displaced || !self.can_select(id, t) {
                    continue;
                }
                if self.claim(id, t).is_ok() {
                    break;
                }
            }
        }
        self.drop_unselected_hovers(id);

        // Hover granting.
        if self
            .actors
            .get(id)
            .is_some_and(|a| a.flags.contains(ActorFlags::ALLOW_HOVER))
        {
            for &t in &candidates {
                if !self.hovered_targets(id).contains(&t) && self.can_hover(id, t) {
                    self.hover_enter(id, t);
                }
            }
        }

        self.candidates = candidates;
    }

    /// With [`ActorFlags::HOVER_SELECTED_ONLY`], exit every hover but the selection.
    fn drop_unselected_hovers(&mut self, actor: ActorId) {
        let Some(a) = self.actors.get(actor) else {
            return;
        };
        let Some(selected) = a.select else {
            return;
        };
        if !a.flags.contains(ActorFlags::HOVER_SELECTED_ONLY) {
            return;
        }
        let stale: Vec<TargetId> = a.hover.iter().copied().filter(|t| *t != selected).collect();
        for t in stale {
            self.hover_exit(actor, t);
        }
    }

    /// Whether a held selection survives select clearing.
    fn select_holds(&self, actor: ActorId, target: TargetId) -> bool {
        let (Some(a), Some(t)) = (self.actors.get(actor), self.targets.get(target)) else {
            return false;
        };
        a.flags.contains(ActorFlags::ALLOW_SELECT)
            && t.registered
            && t.flags.contains(TargetFlags::SELECTABLE)
            && a.layers.intersects(t.layers)
            && a.select_filter.is_none_or(|f| f(target))
            // Concurrency was turned off: only the earliest holder keeps it.
            && (t.flags.contains(TargetFlags::CONCURRENT_SELECT)
                || t.selecting.first() == Some(&actor))
    }

    pub(crate) fn can_hover(&self, actor: ActorId, target: TargetId) -> bool {
        let (Some(a), Some(t)) = (self.actors.get(actor), self.targets.get(target)) else {
            return false;
        };
        a.flags.contains(ActorFlags::ALLOW_HOVER)
            && t.registered
            && t.flags.contains(TargetFlags::HOVERABLE)
            && a.layers.intersects(t.layers)
            && a.hover_filter.is_none_or(|f| f(target))
            && (!a.flags.contains(ActorFlags::HOVER_SELECTED_ONLY)
                || a.select.is_none_or(|s| s == target))
    }

    pub(crate) fn can_select(&self, actor: ActorId, target: TargetId) -> bool {
        let (Some(a), Some(t)) = (self.actors.get(actor), self.targets.get(target)) else {
            return false;
        };
        let dwell = match a.hover_to_select {
            Some(delay) => a.nearest == Some(target) && self.now - a.nearest_since >= delay,
            None => true,
        };
        a.flags.contains(ActorFlags::ALLOW_SELECT)
            && t.registered
            && t.flags.contains(TargetFlags::SELECTABLE)
            && a.layers.intersects(t.layers)
            && a.select_filter.is_none_or(|f| f(target))
            && dwell
    }

    fn check_claim(&self, actor: ActorId, target: TargetId) -> Result<(), InteractionError> {
        let a = self
            .actors
            .get(actor)
            .ok_or(InteractionError::ActorNotFound(actor))?;
        let t = self
            .targets
            .get(target)
            .ok_or(InteractionError::TargetNotFound(target))?;
        let mut others = t.selecting.iter().copied().filter(|h| *h != actor).peekable();
        let held = others.peek().is_some();
        let exclusive_holder = others.any(|h| {
            self.actors
                .get(h)
                .is_some_and(|x| x.flags.contains(ActorFlags::SELECT_EXCLUSIVE))
        });
        if exclusive_holder || (held && a.flags.contains(ActorFlags::SELECT_EXCLUSIVE)) {
            return Err(InteractionError::SelectRejected { actor, target });
        }
        Ok(())
    }

    /// Grant `target` to `actor` under the claim rules, evicting as needed.
    fn claim(&mut self, actor: ActorId, target: TargetId) -> Result<(), InteractionError> {
        self.check_claim(actor, target)?;
        let Some(t) = self.targets.get(target) else {
            return Err(InteractionError::TargetNotFound(target));
        };
        if !t.flags.contains(TargetFlags::CONCURRENT_SELECT) {
            let holders: Vec<ActorId> = t.selecting.iter().copied().filter(|h| *h != actor).collect();
            for h in holders {
                self.select_exit(h, target);
                if let Some(x) = self.actors.get_mut(h) {
                    x.displaced_from = Some(target);
                }
                debug!(holder = ?h, claimant = ?actor, target_id = ?target, "select displaced");
            }
        }
        self.select_enter(actor, target);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::ActorDesc;
    use crate::discovery::{Discovery, DiscoveryContext};
    use crate::events::{ActorEventKind, InteractionEvent, TargetEventKind};
    use crate::engine::EngineConfig;
    use crate::substrate::EmptySubstrate;
    use crate::target::TargetDesc;
    use alloc::rc::Rc;
    use alloc::vec;
    use core::cell::RefCell;

    /// Reports whatever the test put in the shared list.
    #[derive(Debug, Clone, Default)]
    struct Scripted(Rc<RefCell<Vec<TargetId>>>);

    impl Discovery for Scripted {
        fn discover(&mut self, _ctx: &DiscoveryContext<'_>, out: &mut Vec<TargetId>) {
            out.extend(self.0.borrow().iter().copied());
        }
    }

    struct Rig {
        engine: Engine,
    }

    impl Rig {
        fn new() -> Self {
            Self {
                engine: Engine::with_config(EngineConfig {
                    record_events: true,
                }),
            }
        }

        fn actor(&mut self, flags: ActorFlags) -> (ActorId, Rc<RefCell<Vec<TargetId>>>) {
            let script = Scripted::default();
            let handle = Rc::clone(&script.0);
            let id = self.engine.insert_actor(ActorDesc {
                flags,
                ..ActorDesc::new(script)
            });
            self.engine.register_actor(id).unwrap();
            (id, handle)
        }

        fn target(&mut self, flags: TargetFlags) -> TargetId {
            let id = self.engine.insert_target(TargetDesc {
                flags,
                ..Default::default()
            });
            self.engine.register_target(id).unwrap();
            id
        }

        fn pass(&mut self) -> Vec<InteractionEvent> {
            self.engine.drain_events();
            self.engine.reconcile(&EmptySubstrate);
            assert!(self.engine.is_consistent());
            self.engine.drain_events()
        }
    }

    fn set(script: &Rc<RefCell<Vec<TargetId>>>, targets: &[TargetId]) {
        *script.borrow_mut() = targets.to_vec();
    }

    #[test]
    fn grants_first_candidate_and_hovers_all() {
        let mut rig = Rig::new();
        let (a, script) = rig.actor(ActorFlags::default());
        let t1 = rig.target(TargetFlags::default());
        let t2 = rig.target(TargetFlags::default());
        set(&script, &[t2, t1]);
        rig.pass();
        assert_eq!(rig.engine.selected_target(a), Some(t2));
        assert_eq!(rig.engine.hovered_targets(a), &[t2, t1]);
        assert_eq!(rig.engine.hovering_actors(t1), &[a]);

        // A second pass with the same candidates is silent.
        assert!(rig.pass().is_empty());
    }

    #[test]
    fn select_events_precede_hover_events() {
        let mut rig = Rig::new();
        let (a, script) = rig.actor(ActorFlags::default());
        let t = rig.target(TargetFlags::default());
        set(&script, &[t]);
        let events = rig.pass();
        assert_eq!(
            events,
            vec![
                InteractionEvent::Actor {
                    actor: a,
                    target: t,
                    kind: ActorEventKind::SelectEnter
                },
                InteractionEvent::Target {
                    target: t,
                    actor: a,
                    kind: TargetEventKind::SelectEnter
                },
                InteractionEvent::Actor {
                    actor: a,
                    target: t,
                    kind: ActorEventKind::HoverEnter
                },
                InteractionEvent::Target {
                    target: t,
                    actor: a,
                    kind: TargetEventKind::FirstHoverEnter
                },
                InteractionEvent::Target {
                    target: t,
                    actor: a,
                    kind: TargetEventKind::HoverEnter
                },
            ]
        );
    }

    #[test]
    fn selection_survives_leaving_candidates_but_hover_does_not() {
        let mut rig = Rig::new();
        let (a, script) = rig.actor(ActorFlags::default());
        let t = rig.target(TargetFlags::default());
        set(&script, &[t]);
        rig.pass();
        set(&script, &[]);
        rig.pass();
        assert_eq!(rig.engine.selected_target(a), Some(t));
        assert!(rig.engine.hovered_targets(a).is_empty());
        assert!(!rig.engine.is_hovered(t));
    }

    #[test]
    fn disabling_select_clears_selection() {
        let mut rig = Rig::new();
        let (a, script) = rig.actor(ActorFlags::default());
        let t = rig.target(TargetFlags::default());
        set(&script, &[t]);
        rig.pass();
        rig.engine.set_actor_flags(a, ActorFlags::ALLOW_HOVER);
        rig.pass();
        assert_eq!(rig.engine.selected_target(a), None);
        assert_eq!(rig.engine.hovered_targets(a), &[t]);

        rig.engine.set_interactions_enabled(a, false);
        rig.pass();
        assert!(rig.engine.hovered_targets(a).is_empty());
    }

    #[test]
    fn layer_mismatch_blocks_everything() {
        let mut rig = Rig::new();
        let (a, script) = rig.actor(ActorFlags::default());
        let t = rig.target(TargetFlags::default());
        rig.engine
            .set_actor_layers(a, crate::InteractionLayers::from_bits_retain(0b01));
        rig.engine
            .set_target_layers(t, crate::InteractionLayers::from_bits_retain(0b10));
        set(&script, &[t]);
        assert!(rig.pass().is_empty());
        assert_eq!(rig.engine.selected_target(a), None);
    }

    #[test]
    fn later_claim_displaces_earlier_holder() {
        let mut rig = Rig::new();
        let (a1, s1) = rig.actor(ActorFlags::default());
        let (a2, s2) = rig.actor(ActorFlags::default());
        let t = rig.target(TargetFlags::default());
        set(&s1, &[t]);
        rig.pass();
        assert_eq!(rig.engine.selected_target(a1), Some(t));

        // a1 is processed first and keeps it; a2 then displaces it.
        set(&s2, &[t]);
        let events = rig.pass();
        assert_eq!(rig.engine.selected_target(a1), None);
        assert_eq!(rig.engine.selected_target(a2), Some(t));
        assert_eq!(rig.engine.selecting_actors(t), &[a2]);
        let exit = events.iter().position(|e| {
            *e == InteractionEvent::Actor {
                actor: a1,
                target: t,
                kind: ActorEventKind::SelectExit,
            }
        });
        let enter = events.iter().position(|e| {
            *e == InteractionEvent::Actor {
                actor: a2,
                target: t,
                kind: ActorEventKind::SelectEnter,
            }
        });
        assert!(exit.unwrap() < enter.unwrap());

        // No ping-pong: a1 does not take it back while t stays a candidate.
        assert!(rig.pass().is_empty());
        assert_eq!(rig.engine.selected_target(a2), Some(t));

        // Once t leaves a1's candidates and returns, a1 may claim again.
        set(&s1, &[]);
        rig.pass();
        set(&s1, &[t]);
        rig.pass();
        assert_eq!(rig.engine.selected_target(a1), Some(t));
    }

    #[test]
    fn exclusive_holder_is_never_displaced() {
        let mut rig = Rig::new();
        let exclusive = ActorFlags::default() | ActorFlags::SELECT_EXCLUSIVE;
        let (a1, s1) = rig.actor(exclusive);
        let (a2, s2) = rig.actor(ActorFlags::default());
        let t = rig.target(TargetFlags::default());
        let other = rig.target(TargetFlags::default());
        set(&s1, &[t]);
        rig.pass();
        set(&s2, &[t, other]);
        rig.pass();
        assert_eq!(rig.engine.selected_target(a1), Some(t));
        // a2 skipped t and took the next available target.
        assert_eq!(rig.engine.selected_target(a2), Some(other));
        assert_eq!(
            rig.engine.force_select(a2, t),
            Err(InteractionError::SelectRejected {
                actor: a2,
                target: t
            })
        );
        assert_eq!(rig.engine.selected_target(a2), Some(other));
    }

    #[test]
    fn exclusive_claimant_skips_held_targets() {
        let mut rig = Rig::new();
        let (a1, s1) = rig.actor(ActorFlags::default());
        let (a2, s2) =
            rig.actor(ActorFlags::default() | ActorFlags::SELECT_EXCLUSIVE);
        let t = rig.target(TargetFlags::default());
        set(&s1, &[t]);
        rig.pass();
        set(&s2, &[t]);
        rig.pass();
        assert_eq!(rig.engine.selected_target(a1), Some(t));
        assert_eq!(rig.engine.selected_target(a2), None);
        // Hover is non-exclusive.
        assert_eq!(rig.engine.hovering_actors(t), &[a1, a2]);

        // Vacated by a1: the exclusive actor can take it in the same pass.
        set(&s1, &[]);
        rig.engine.set_actor_flags(a1, ActorFlags::ALLOW_HOVER);
        rig.pass();
        assert_eq!(rig.engine.selected_target(a2), Some(t));
    }

    #[test]
    fn concurrent_targets_gain_holders() {
        let mut rig = Rig::new();
        let (a1, s1) = rig.actor(ActorFlags::default());
        let (a2, s2) = rig.actor(ActorFlags::default());
        let t = rig.target(TargetFlags::default() | TargetFlags::CONCURRENT_SELECT);
        set(&s1, &[t]);
        set(&s2, &[t]);
        rig.pass();
        assert_eq!(rig.engine.selecting_actors(t), &[a1, a2]);

        // Turning concurrency off keeps only the earliest holder.
        rig.engine.set_target_flags(t, TargetFlags::default());
        rig.pass();
        assert_eq!(rig.engine.selecting_actors(t), &[a1]);
    }

    #[test]
    fn force_select_bypasses_discovery_and_exits_current() {
        let mut rig = Rig::new();
        let (a, script) = rig.actor(ActorFlags::default());
        let t1 = rig.target(TargetFlags::default());
        let t2 = rig.target(TargetFlags::default());
        set(&script, &[t1]);
        rig.pass();
        rig.engine.drain_events();
        rig.engine.force_select(a, t2).unwrap();
        assert_eq!(rig.engine.selected_target(a), Some(t2));
        let events = rig.engine.drain_events();
        assert_eq!(
            events[0],
            InteractionEvent::Actor {
                actor: a,
                target: t1,
                kind: ActorEventKind::SelectExit
            }
        );
        // Forcing the held target again is a no-op.
        rig.engine.force_select(a, t2).unwrap();
        assert!(rig.engine.drain_events().is_empty());
    }

    #[test]
    fn force_select_reports_unknown_handles() {
        let mut rig = Rig::new();
        let (a, _) = rig.actor(ActorFlags::default());
        let t = rig.engine.insert_target(TargetDesc::default());
        assert_eq!(
            rig.engine.force_select(a, t),
            Err(InteractionError::TargetNotRegistered(t))
        );
        rig.engine.remove_target(t).unwrap();
        assert_eq!(
            rig.engine.force_select(a, t),
            Err(InteractionError::TargetNotFound(t))
        );
        assert_eq!(rig.engine.selected_target(a), None);
    }

    #[test]
    fn release_is_not_immediately_reclaimed() {
        let mut rig = Rig::new();
        let (a, script) = rig.actor(ActorFlags::default());
        let t = rig.target(TargetFlags::default());
        set(&script, &[t]);
        rig.pass();
        rig.engine.release_select(a).unwrap();
        assert_eq!(rig.engine.selected_target(a), None);
        rig.pass();
        assert_eq!(rig.engine.selected_target(a), None);
        set(&script, &[]);
        rig.pass();
        set(&script, &[t]);
        rig.pass();
        assert_eq!(rig.engine.selected_target(a), Some(t));
    }

    #[test]
    fn hover_selected_only_limits_hover() {
        let mut rig = Rig::new();
        let (a, script) =
            rig.actor(ActorFlags::default() | ActorFlags::HOVER_SELECTED_ONLY);
        let t1 = rig.target(TargetFlags::default());
        let t2 = rig.target(TargetFlags::default());
        set(&script, &[t1, t2]);
        rig.pass();
        assert_eq!(rig.engine.selected_target(a), Some(t1));
        assert_eq!(rig.engine.hovered_targets(a), &[t1]);
    }

    #[test]
    fn hover_selected_only_trims_existing_hovers() {
        let mut rig = Rig::new();
        let (a, script) = rig.actor(ActorFlags::ALLOW_HOVER);
        let t1 = rig.target(TargetFlags::default());
        let t2 = rig.target(TargetFlags::default());
        let t3 = rig.target(TargetFlags::default());
        set(&script, &[t1, t2]);
        rig.pass();
        assert_eq!(rig.engine.hovered_targets(a), &[t1, t2]);

        // The grant and the trim happen in the same pass.
        rig.engine.set_actor_flags(
            a,
            ActorFlags::ALLOW_HOVER | ActorFlags::ALLOW_SELECT | ActorFlags::HOVER_SELECTED_ONLY,
        );
        rig.pass();
        assert_eq!(rig.engine.selected_target(a), Some(t1));
        assert_eq!(rig.engine.hovered_targets(a), &[t1]);

        // A forced select trims immediately too.
        set(&script, &[t2, t3]);
        rig.engine.force_select(a, t3).unwrap();
        assert_eq!(rig.engine.selected_target(a), Some(t3));
        assert!(rig.engine.hovered_targets(a).is_empty());
        rig.pass();
        assert_eq!(rig.engine.hovered_targets(a), &[t3]);
        assert!(rig.engine.is_consistent());
    }

    #[test]
    fn filters_and_target_gates_apply() {
        fn never(_: TargetId) -> bool {
            false
        }
        let mut rig = Rig::new();
        let script = Scripted::default();
        let handle = Rc::clone(&script.0);
        let a = rig.engine.insert_actor(ActorDesc {
            select_filter: Some(never),
            ..ActorDesc::new(script)
        });
        rig.engine.register_actor(a).unwrap();
        let t = rig.target(TargetFlags::default());
        let unhoverable = rig.target(TargetFlags::SELECTABLE);
        set(&handle, &[t, unhoverable]);
        rig.pass();
        assert_eq!(rig.engine.selected_target(a), None);
        assert_eq!(rig.engine.hovered_targets(a), &[t]);
    }

    #[test]
    fn hover_to_select_waits_for_dwell() {
        let mut rig = Rig::new();
        let script = Scripted::default();
        let handle = Rc::clone(&script.0);
        let a = rig.engine.insert_actor(ActorDesc {
            hover_to_select: Some(0.5),
            ..ActorDesc::new(script)
        });
        rig.engine.register_actor(a).unwrap();
        let t1 = rig.target(TargetFlags::default());
        let t2 = rig.target(TargetFlags::default());
        set(&handle, &[t1, t2]);

        rig.engine.tick(&EmptySubstrate, 0.0);
        assert_eq!(rig.engine.selected_target(a), None);
        assert_eq!(rig.engine.hovered_targets(a), &[t1, t2]);
        rig.engine.tick(&EmptySubstrate, 0.3);
        assert_eq!(rig.engine.selected_target(a), None);

        // The nearest changes: the timer restarts.
        set(&handle, &[t2, t1]);
        rig.engine.tick(&EmptySubstrate, 0.6);
        assert_eq!(rig.engine.selected_target(a), None);
        rig.engine.tick(&EmptySubstrate, 1.0);
        assert_eq!(rig.engine.selected_target(a), None);
        rig.engine.tick(&EmptySubstrate, 1.2);
        assert_eq!(rig.engine.selected_target(a), Some(t2));
    }

    #[test]
    fn starting_target_is_forced_on_first_pass() {
        let mut rig = Rig::new();
        let t = rig.target(TargetFlags::default());
        let a = rig.engine.insert_actor(ActorDesc {
            starting_target: Some(t),
            ..ActorDesc::new(Scripted::default())
        });
        rig.engine.register_actor(a).unwrap();
        assert_eq!(rig.engine.selected_target(a), None);
        rig.pass();
        assert_eq!(rig.engine.selected_target(a), Some(t));

        // Only once: after a release it is not forced again.
        rig.engine.release_select(a).unwrap();
        rig.pass();
        assert_eq!(rig.engine.selected_target(a), None);
    }

    #[test]
    fn missing_starting_target_is_dropped() {
        let mut rig = Rig::new();
        let t = rig.engine.insert_target(TargetDesc::default());
        let a = rig.engine.insert_actor(ActorDesc {
            starting_target: Some(t),
            ..ActorDesc::new(Scripted::default())
        });
        rig.engine.register_actor(a).unwrap();
        rig.pass();
        rig.engine.register_target(t).unwrap();
        rig.pass();
        assert_eq!(rig.engine.selected_target(a), None);
    }
}
