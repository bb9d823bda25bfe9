// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-tick phase dispatch.

use tracing::trace;

use crate::discovery::DiscoveryContext;
use crate::engine::Engine;
use crate::substrate::Substrate;
use crate::types::UpdatePhase;

impl Engine {
    /// Run one simulation tick at time `now` (seconds): every [`UpdatePhase`] in order.
    ///
    /// `now` drives hover-to-select timers and should not decrease between ticks.
    pub fn tick(&mut self, substrate: &dyn Substrate, now: f64) {
        self.now = now;
        for phase in UpdatePhase::ALL {
            self.run_phase(phase, substrate);
        }
    }

    /// Deliver a single phase.
    ///
    /// Registered actors get their phase hook and [`Discovery::on_phase`](crate::Discovery::on_phase)
    /// in registration order. During [`UpdatePhase::Dynamic`] the reconciliation
    /// pass runs next. Registered targets then get their phase hook. Commands
    /// queued by hooks or listeners are applied at the end of the phase.
    pub fn run_phase(&mut self, phase: UpdatePhase, substrate: &dyn Substrate) {
        for i in 0..self.actor_order.len() {
            let id = self.actor_order[i];
            let Some(actor) = self.actors.get_mut(id) else {
                continue;
            };
            if let Some(hook) = actor.phase_hook.as_mut() {
                hook(id, phase, &mut self.commands);
            }
            let ctx = DiscoveryContext {
                actor: id,
                origin: actor.origin,
                direction: actor.direction,
                substrate,
                surfaces: &self.surfaces,
                targets: &self.targets,
            };
            actor.discovery.on_phase(phase, &ctx);
        }

        if phase == UpdatePhase::Dynamic {
            self.reconcile_pass(substrate);
        }

        for i in 0..self.target_order.len() {
            let id = self.target_order[i];
            if let Some(hook) = self
                .targets
                .get_mut(id)
                .and_then(|t| t.phase_hook.as_mut())
            {
                hook(id, phase, &mut self.commands);
            }
        }

        self.flush();
        trace!(?phase, "phase delivered");
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        ActorDesc, ActorId, Commands, Engine, TargetDesc, TargetId, UpdatePhase,
        substrate::EmptySubstrate,
    };
    use alloc::boxed::Box;
    use alloc::rc::Rc;
    use alloc::string::{String, ToString};
    use alloc::vec::Vec;
    use core::cell::RefCell;

    #[test]
    fn phases_reach_actors_then_targets() {
        let log: Rc<RefCell<Vec<String>>> = Rc::default();
        let mut engine = Engine::new();

        let actor_log = Rc::clone(&log);
        let a = engine.insert_actor(ActorDesc {
            phase_hook: Some(Box::new(move |_: ActorId, phase: UpdatePhase, _: &mut Commands| {
                actor_log.borrow_mut().push(alloc::format!("actor {phase:?}"));
            })),
            ..Default::default()
        });
        let target_log = Rc::clone(&log);
        let t = engine.insert_target(TargetDesc {
            phase_hook: Some(Box::new(move |_: TargetId, phase: UpdatePhase, _: &mut Commands| {
                target_log.borrow_mut().push(alloc::format!("target {phase:?}"));
            })),
            ..Default::default()
        });

        // Not registered yet: no hooks.
        engine.tick(&EmptySubstrate, 0.0);
        assert!(log.borrow().is_empty());

        engine.register_target(t).unwrap();
        engine.register_actor(a).unwrap();
        engine.tick(&EmptySubstrate, 0.016);
        let expected: Vec<String> = [
            "actor FixedStep",
            "target FixedStep",
            "actor Dynamic",
            "target Dynamic",
            "actor Late",
            "target Late",
            "actor PreRender",
            "target PreRender",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        assert_eq!(*log.borrow(), expected);
        assert_eq!(engine.now(), 0.016);
    }

    #[test]
    fn hook_commands_apply_after_the_phase() {
        let mut engine = Engine::new();
        let a = engine.insert_actor(ActorDesc {
            phase_hook: Some(Box::new(|id: ActorId, phase: UpdatePhase, commands: &mut Commands| {
                if phase == UpdatePhase::Late {
                    commands.unregister_actor(id);
                }
            })),
            ..Default::default()
        });
        engine.register_actor(a).unwrap();
        engine.run_phase(UpdatePhase::FixedStep, &EmptySubstrate);
        assert!(engine.is_actor_registered(a));
        engine.run_phase(UpdatePhase::Late, &EmptySubstrate);
        assert!(!engine.is_actor_registered(a));
    }
}
