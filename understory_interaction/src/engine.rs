// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The arbitration engine: registries, surface index, transitions, and accessors.

use alloc::vec::Vec;
use kurbo::{Point, Vec2};
use tracing::{debug, warn};

use crate::actor::{Actor, ActorDesc};
use crate::arena::Arena;
use crate::commands::{Command, Commands};
use crate::discovery::DiscoveryContext;
use crate::error::InteractionError;
use crate::events::{ActorEventKind, InteractionEvent, TargetEventKind};
use crate::substrate::{RayHit, Substrate};
use crate::surface::SurfaceIndex;
use crate::target::{Target, TargetDesc};
use crate::types::{
    ActorFlags, ActorId, InteractionLayers, SurfaceId, TargetFlags, TargetId,
};

// Listeners that keep re-queueing work are cut off after this many rounds.
const MAX_FLUSH_ROUNDS: usize = 64;

/// Engine-wide options.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct EngineConfig {
    /// Also append every notification to a log drained by [`Engine::drain_events`].
    pub record_events: bool,
}

/// Nearest hit of an actor's last cast.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RayHitInfo {
    /// The hit itself.
    pub hit: RayHit,
    /// Registered target owning the hit surface, if any.
    pub target: Option<TargetId>,
    /// Whether the actor currently hovers that target.
    pub hovered: bool,
}

/// Owns actors and targets and arbitrates hover and select between them.
///
/// Objects are inserted from a description, then put into service with
/// `register_*`. Only registered objects take part in discovery, reconciliation
/// and phase hooks. Every public mutation issues its exit transitions
/// synchronously and then applies any [`Commands`] queued by listeners.
pub struct Engine {
    config: EngineConfig,
    pub(crate) actors: Arena<ActorId, Actor>,
    pub(crate) targets: Arena<TargetId, Target>,
    // Registered objects in registration order.
    pub(crate) actor_order: Vec<ActorId>,
    pub(crate) target_order: Vec<TargetId>,
    pub(crate) surfaces: SurfaceIndex,
    pub(crate) commands: Commands,
    events: Vec<InteractionEvent>,
    pub(crate) now: f64,
    pub(crate) candidates: Vec<TargetId>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for Engine {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("actors", &self.actors)
            .field("targets", &self.targets)
            .field("registered_actors", &self.actor_order.len())
            .field("registered_targets", &self.target_order.len())
            .field("surfaces", &self.surfaces.len())
            .field("pending_commands", &self.commands.len())
            .field("now", &self.now)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Create an empty engine with default options.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Create an empty engine.
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            config,
            actors: Arena::default(),
            targets: Arena::default(),
            actor_order: Vec::new(),
            target_order: Vec::new(),
            surfaces: SurfaceIndex::default(),
            commands: Commands::default(),
            events: Vec::new(),
            now: 0.0,
            candidates: Vec::new(),
        }
    }

    /// Engine options.
    pub fn config(&self) -> EngineConfig {
        self.config
    }

    /// Time passed to the last [`Engine::tick`], in seconds.
    pub fn now(&self) -> f64 {
        self.now
    }

    // --- lifecycle ---

    /// Store an actor. It does not take part in anything until registered.
    pub fn insert_actor(&mut self, desc: ActorDesc) -> ActorId {
        let id = self.actors.insert(Actor::new(desc));
        debug!(actor = ?id, "actor inserted");
        id
    }

    /// Store a target. Its surfaces are mapped when it is registered.
    pub fn insert_target(&mut self, desc: TargetDesc) -> TargetId {
        let id = self.targets.insert(Target::new(desc));
        debug!(target_id = ?id, "target inserted");
        id
    }

    /// Put an actor into service. Registering twice is a no-op.
    pub fn register_actor(&mut self, id: ActorId) -> Result<(), InteractionError> {
        let r = self.register_actor_now(id);
        self.flush();
        r
    }

    /// Take an actor out of service, issuing hover exits then its select exit.
    ///
    /// Unregistering an actor that is not in service is a no-op.
    pub fn unregister_actor(&mut self, id: ActorId) -> Result<(), InteractionError> {
        let r = self.unregister_actor_now(id);
        self.flush();
        r
    }

    /// Unregister (with exits) and free an actor; `id` becomes stale.
    pub fn remove_actor(&mut self, id: ActorId) -> Result<(), InteractionError> {
        let r = self.remove_actor_now(id).map(drop);
        self.flush();
        r
    }

    /// Unregister (with exits) and free an actor, handing back its description.
    ///
    /// The returned description keeps the discovery strategy (including volume
    /// membership), gates, filters, pose and phase hook, so it can be inserted
    /// into another engine. Listeners and the starting target are engine-specific
    /// and are not carried over. All exits are issued here, before the other
    /// engine can issue any enter.
    pub fn detach_actor(&mut self, id: ActorId) -> Result<ActorDesc, InteractionError> {
        let r = self.remove_actor_now(id).map(Actor::into_desc);
        self.flush();
        r
    }

    /// Put a target into service and map its surfaces. Registering twice is a no-op.
    ///
    /// A surface already owned by another registered target is skipped with a
    /// warning.
    pub fn register_target(&mut self, id: TargetId) -> Result<(), InteractionError> {
        let r = self.register_target_now(id);
        self.flush();
        r
    }

    /// Take a target out of service.
    ///
    /// Every actor hovering it gets a hover exit, every actor selecting it gets a
    /// select exit, and then its surfaces are unmapped.
    pub fn unregister_target(&mut self, id: TargetId) -> Result<(), InteractionError> {
        let r = self.unregister_target_now(id);
        self.flush();
        r
    }

    /// Unregister (with exits) and free a target; `id` becomes stale.
    ///
    /// Its surfaces are also purged from every actor's discovery state.
    pub fn remove_target(&mut self, id: TargetId) -> Result<(), InteractionError> {
        let r = self.remove_target_now(id);
        self.flush();
        r
    }

    pub(crate) fn register_actor_now(&mut self, id: ActorId) -> Result<(), InteractionError> {
        let actor = self
            .actors
            .get_mut(id)
            .ok_or(InteractionError::ActorNotFound(id))?;
        if actor.registered {
            return Ok(());
        }
        actor.registered = true;
        self.actor_order.push(id);
        debug!(actor = ?id, "actor registered");
        Ok(())
    }

    pub(crate) fn unregister_actor_now(&mut self, id: ActorId) -> Result<(), InteractionError> {
        let actor = self
            .actors
            .get(id)
            .ok_or(InteractionError::ActorNotFound(id))?;
        if !actor.registered {
            return Ok(());
        }
        let hovered = actor.hover.clone();
        let selected = actor.select;
        for t in hovered {
            self.hover_exit(id, t);
        }
        if let Some(t) = selected {
            self.select_exit(id, t);
        }
        if let Some(actor) = self.actors.get_mut(id) {
            actor.registered = false;
            actor.displaced_from = None;
            actor.nearest = None;
        }
        self.actor_order.retain(|a| *a != id);
        debug!(actor = ?id, "actor unregistered");
        Ok(())
    }

    fn remove_actor_now(&mut self, id: ActorId) -> Result<Actor, InteractionError> {
        self.unregister_actor_now(id)?;
        let actor = self
            .actors
            .remove(id)
            .ok_or(InteractionError::ActorNotFound(id))?;
        debug!(actor = ?id, "actor removed");
        Ok(actor)
    }

    pub(crate) fn register_target_now(&mut self, id: TargetId) -> Result<(), InteractionError> {
        let target = self
            .targets
            .get(id)
            .ok_or(InteractionError::TargetNotFound(id))?;
        if target.registered {
            return Ok(());
        }
        let surfaces = target.surfaces.clone();
        let mut mapped = Vec::with_capacity(surfaces.len());
        for s in surfaces {
            if self.surfaces.map(s, id) {
                if !mapped.contains(&s) {
                    mapped.push(s);
                }
            } else {
                warn!(
                    target_id = ?id,
                    surface = ?s,
                    owner = ?self.surfaces.resolve(s),
                    "surface already mapped to another target; skipped"
                );
            }
        }
        if let Some(target) = self.targets.get_mut(id) {
            target.mapped = mapped;
            target.registered = true;
        }
        self.target_order.push(id);
        debug!(target_id = ?id, "target registered");
        Ok(())
    }

    pub(crate) fn unregister_target_now(&mut self, id: TargetId) -> Result<(), InteractionError> {
        let target = self
            .targets
            .get(id)
            .ok_or(InteractionError::TargetNotFound(id))?;
        if !target.registered {
            return Ok(());
        }
        let hovering = target.hovering.clone();
        let selecting = target.selecting.clone();
        for a in hovering {
            self.hover_exit(a, id);
        }
        for a in selecting {
            self.select_exit(a, id);
        }
        if let Some(target) = self.targets.get_mut(id) {
            for s in target.mapped.drain(..) {
                self.surfaces.unmap(s, id);
            }
            target.registered = false;
        }
        self.target_order.retain(|t| *t != id);
        debug!(target_id = ?id, "target unregistered");
        Ok(())
    }

    pub(crate) fn remove_target_now(&mut self, id: TargetId) -> Result<(), InteractionError> {
        self.unregister_target_now(id)?;
        let target = self
            .targets
            .remove(id)
            .ok_or(InteractionError::TargetNotFound(id))?;
        // Surfaces still owned by another target keep their overlaps.
        let orphaned: Vec<SurfaceId> = target
            .surfaces
            .iter()
            .copied()
            .filter(|s| self.surfaces.resolve(*s).is_none())
            .collect();
        for (_, actor) in self.actors.iter_mut() {
            actor.discovery.forget(&orphaned);
            if actor.displaced_from == Some(id) {
                actor.displaced_from = None;
            }
            if actor.pending_start == Some(id) {
                actor.pending_start = None;
            }
            if actor.nearest == Some(id) {
                actor.nearest = None;
            }
        }
        debug!(target_id = ?id, "target removed");
        Ok(())
    }

    // --- surfaces and candidates ---

    /// The registered target owning `surface`, if any.
    pub fn resolve_target_for_surface(&self, surface: SurfaceId) -> Option<TargetId> {
        self.surfaces.resolve(surface)
    }

    /// Filter `candidates` to registered targets of this engine, keeping order
    /// and dropping duplicates.
    ///
    /// Returns nothing if `actor` is not a registered actor of this engine.
    pub fn valid_targets_for(&self, actor: ActorId, candidates: &[TargetId]) -> Vec<TargetId> {
        if !self.is_actor_registered(actor) {
            return Vec::new();
        }
        let mut out = candidates.to_vec();
        self.retain_valid(&mut out);
        out
    }

    /// Run `actor`'s discovery against `substrate` and return its valid candidates.
    ///
    /// This does not reconcile; relationships are left untouched.
    pub fn discover(
        &mut self,
        actor: ActorId,
        substrate: &dyn Substrate,
    ) -> Result<Vec<TargetId>, InteractionError> {
        self.ensure_actor_registered(actor)?;
        let mut out = Vec::new();
        self.collect_candidates(actor, substrate, &mut out);
        Ok(out)
    }

    pub(crate) fn retain_valid(&self, candidates: &mut Vec<TargetId>) {
        let mut i = 0;
        while i < candidates.len() {
            let t = candidates[i];
            let live = self.targets.get(t).is_some_and(|x| x.registered);
            if live && !candidates[..i].contains(&t) {
                i += 1;
            } else {
                candidates.remove(i);
            }
        }
    }

    pub(crate) fn collect_candidates(
        &mut self,
        id: ActorId,
        substrate: &dyn Substrate,
        out: &mut Vec<TargetId>,
    ) {
        out.clear();
        let Some(actor) = self.actors.get_mut(id) else {
            return;
        };
        let ctx = DiscoveryContext {
            actor: id,
            origin: actor.origin,
            direction: actor.direction,
            substrate,
            surfaces: &self.surfaces,
            targets: &self.targets,
        };
        actor.discovery.discover(&ctx, out);
        self.retain_valid(out);
    }

    /// Report that `actor`'s volume started overlapping `surface`.
    pub fn overlap_enter(&mut self, actor: ActorId, surface: SurfaceId) -> Result<(), InteractionError> {
        let a = self
            .actors
            .get_mut(actor)
            .ok_or(InteractionError::ActorNotFound(actor))?;
        a.discovery.overlap_enter(surface);
        Ok(())
    }

    /// Report that `actor`'s volume stopped overlapping `surface`.
    pub fn overlap_exit(&mut self, actor: ActorId, surface: SurfaceId) -> Result<(), InteractionError> {
        let a = self
            .actors
            .get_mut(actor)
            .ok_or(InteractionError::ActorNotFound(actor))?;
        a.discovery.overlap_exit(surface);
        Ok(())
    }

    // --- setters (take effect at the next pass; stale handles are ignored) ---

    /// Turn hover and select on or off together.
    pub fn set_interactions_enabled(&mut self, actor: ActorId, enabled: bool) {
        if let Some(a) = self.actors.get_mut(actor) {
            a.flags.set(ActorFlags::ALLOW_HOVER | ActorFlags::ALLOW_SELECT, enabled);
        }
    }

    /// Replace an actor's gates.
    pub fn set_actor_flags(&mut self, actor: ActorId, flags: ActorFlags) {
        if let Some(a) = self.actors.get_mut(actor) {
            a.flags = flags;
        }
    }

    /// Replace an actor's capability mask.
    pub fn set_actor_layers(&mut self, actor: ActorId, layers: InteractionLayers) {
        if let Some(a) = self.actors.get_mut(actor) {
            a.layers = layers;
        }
    }

    /// Move an actor.
    pub fn set_actor_pose(&mut self, actor: ActorId, origin: Point, direction: Vec2) {
        if let Some(a) = self.actors.get_mut(actor) {
            a.origin = origin;
            a.direction = direction;
        }
    }

    /// Replace a target's gates.
    pub fn set_target_flags(&mut self, target: TargetId, flags: TargetFlags) {
        if let Some(t) = self.targets.get_mut(target) {
            t.flags = flags;
        }
    }

    /// Replace a target's capability mask.
    pub fn set_target_layers(&mut self, target: TargetId, layers: InteractionLayers) {
        if let Some(t) = self.targets.get_mut(target) {
            t.layers = layers;
        }
    }

    /// Move a target's reference point.
    pub fn set_target_position(&mut self, target: TargetId, position: Point) {
        if let Some(t) = self.targets.get_mut(target) {
            t.position = position;
        }
    }

    // --- listeners and events ---

    /// Call `callback` with the target handle whenever `actor` receives `kind`.
    pub fn subscribe_actor(
        &mut self,
        actor: ActorId,
        kind: ActorEventKind,
        callback: impl FnMut(TargetId, &mut Commands) + 'static,
    ) -> Result<(), InteractionError> {
        let a = self
            .actors
            .get_mut(actor)
            .ok_or(InteractionError::ActorNotFound(actor))?;
        a.listeners.push(kind, alloc::boxed::Box::new(callback));
        Ok(())
    }

    /// Call `callback` with the actor handle whenever `target` receives `kind`.
    pub fn subscribe_target(
        &mut self,
        target: TargetId,
        kind: TargetEventKind,
        callback: impl FnMut(ActorId, &mut Commands) + 'static,
    ) -> Result<(), InteractionError> {
        let t = self
            .targets
            .get_mut(target)
            .ok_or(InteractionError::TargetNotFound(target))?;
        t.listeners.push(kind, alloc::boxed::Box::new(callback));
        Ok(())
    }

    /// Drop every listener of `actor`.
    pub fn clear_actor_listeners(&mut self, actor: ActorId) {
        if let Some(a) = self.actors.get_mut(actor) {
            a.listeners.clear();
        }
    }

    /// Drop every listener of `target`.
    pub fn clear_target_listeners(&mut self, target: TargetId) {
        if let Some(t) = self.targets.get_mut(target) {
            t.listeners.clear();
        }
    }

    /// Take the recorded notifications, oldest first.
    ///
    /// Always empty unless [`EngineConfig::record_events`] is set.
    pub fn drain_events(&mut self) -> Vec<InteractionEvent> {
        core::mem::take(&mut self.events)
    }

    // --- accessors ---

    /// Registered actors in registration order.
    pub fn actors(&self) -> &[ActorId] {
        &self.actor_order
    }

    /// Registered targets in registration order.
    pub fn targets(&self) -> &[TargetId] {
        &self.target_order
    }

    /// Whether `actor` is live (registered or not).
    pub fn contains_actor(&self, actor: ActorId) -> bool {
        self.actors.contains(actor)
    }

    /// Whether `target` is live (registered or not).
    pub fn contains_target(&self, target: TargetId) -> bool {
        self.targets.contains(target)
    }

    /// Whether `actor` is live and in service.
    pub fn is_actor_registered(&self, actor: ActorId) -> bool {
        self.actors.get(actor).is_some_and(|a| a.registered)
    }

    /// Whether `target` is live and in service.
    pub fn is_target_registered(&self, target: TargetId) -> bool {
        self.targets.get(target).is_some_and(|t| t.registered)
    }

    /// Targets hovered by `actor`, in the order hover was granted.
    pub fn hovered_targets(&self, actor: ActorId) -> &[TargetId] {
        self.actors.get(actor).map_or(&[], |a| &a.hover)
    }

    /// The target `actor` selects, if any.
    pub fn selected_target(&self, actor: ActorId) -> Option<TargetId> {
        self.actors.get(actor)?.select
    }

    /// Actors hovering `target`, in the order hover was granted.
    pub fn hovering_actors(&self, target: TargetId) -> &[ActorId] {
        self.targets.get(target).map_or(&[], |t| &t.hovering)
    }

    /// Actors selecting `target`, in the order select was granted.
    pub fn selecting_actors(&self, target: TargetId) -> &[ActorId] {
        self.targets.get(target).map_or(&[], |t| &t.selecting)
    }

    /// Whether any actor hovers `target`.
    pub fn is_hovered(&self, target: TargetId) -> bool {
        !self.hovering_actors(target).is_empty()
    }

    /// Whether any actor selects `target`.
    pub fn is_selected(&self, target: TargetId) -> bool {
        !self.selecting_actors(target).is_empty()
    }

    /// Gates of a live actor.
    pub fn actor_flags(&self, actor: ActorId) -> Option<ActorFlags> {
        self.actors.get(actor).map(|a| a.flags)
    }

    /// Capability mask of a live actor.
    pub fn actor_layers(&self, actor: ActorId) -> Option<InteractionLayers> {
        self.actors.get(actor).map(|a| a.layers)
    }

    /// Gates of a live target.
    pub fn target_flags(&self, target: TargetId) -> Option<TargetFlags> {
        self.targets.get(target).map(|t| t.flags)
    }

    /// Capability mask of a live target.
    pub fn target_layers(&self, target: TargetId) -> Option<InteractionLayers> {
        self.targets.get(target).map(|t| t.layers)
    }

    /// Reference point of a live target.
    pub fn target_position(&self, target: TargetId) -> Option<Point> {
        self.targets.get(target).map(|t| t.position)
    }

    /// Reference point and forward axis of a live actor.
    pub fn actor_pose(&self, actor: ActorId) -> Option<(Point, Vec2)> {
        self.actors.get(actor).map(|a| (a.origin, a.direction))
    }

    /// Nearest hit of a registered actor's last cast.
    ///
    /// `None` for actors whose strategy does not cast, or whose last cast hit nothing.
    pub fn ray_hit_info(&self, actor: ActorId) -> Option<RayHitInfo> {
        let a = self.actors.get(actor).filter(|a| a.registered)?;
        let hit = a.discovery.last_hit()?;
        let target = self.surfaces.resolve(hit.surface);
        Some(RayHitInfo {
            hit,
            target,
            hovered: target.is_some_and(|t| a.hover.contains(&t)),
        })
    }

    /// Check the registry invariants.
    ///
    /// - Hover is mirrored on both sides, and select likewise.
    /// - Out-of-service objects hold no relationships and no surfaces.
    /// - A target without [`TargetFlags::CONCURRENT_SELECT`] has at most one selector.
    /// - Each surface resolves to the registered target that mapped it.
    pub fn is_consistent(&self) -> bool {
        for (aid, a) in self.actors.iter() {
            if !a.registered && (!a.hover.is_empty() || a.select.is_some()) {
                return false;
            }
            for (i, &t) in a.hover.iter().enumerate() {
                if a.hover[..i].contains(&t) {
                    return false;
                }
                let mirrored = self
                    .targets
                    .get(t)
                    .is_some_and(|x| x.registered && x.hovering.contains(&aid));
                if !mirrored {
                    return false;
                }
            }
            if let Some(t) = a.select {
                let mirrored = self
                    .targets
                    .get(t)
                    .is_some_and(|x| x.registered && x.selecting.contains(&aid));
                if !mirrored {
                    return false;
                }
            }
        }
        for (tid, t) in self.targets.iter() {
            if !t.registered
                && (!t.hovering.is_empty() || !t.selecting.is_empty() || !t.mapped.is_empty())
            {
                return false;
            }
            if t.selecting.len() > 1 && !t.flags.contains(TargetFlags::CONCURRENT_SELECT) {
                return false;
            }
            if !t
                .hovering
                .iter()
                .all(|a| self.actors.get(*a).is_some_and(|x| x.hover.contains(&tid)))
            {
                return false;
            }
            if !t
                .selecting
                .iter()
                .all(|a| self.actors.get(*a).is_some_and(|x| x.select == Some(tid)))
            {
                return false;
            }
            if !t.mapped.iter().all(|s| self.surfaces.resolve(*s) == Some(tid)) {
                return false;
            }
        }
        self.surfaces.iter().all(|(s, t)| {
            self.targets
                .get(t)
                .is_some_and(|x| x.registered && x.mapped.contains(&s))
        })
    }

    // --- transitions ---

    pub(crate) fn ensure_actor_registered(&self, id: ActorId) -> Result<(), InteractionError> {
        let a = self
            .actors
            .get(id)
            .ok_or(InteractionError::ActorNotFound(id))?;
        if a.registered {
            Ok(())
        } else {
            Err(InteractionError::ActorNotRegistered(id))
        }
    }

    pub(crate) fn ensure_target_registered(&self, id: TargetId) -> Result<(), InteractionError> {
        let t = self
            .targets
            .get(id)
            .ok_or(InteractionError::TargetNotFound(id))?;
        if t.registered {
            Ok(())
        } else {
            Err(InteractionError::TargetNotRegistered(id))
        }
    }

    pub(crate) fn hover_enter(&mut self, a: ActorId, t: TargetId) {
        let (Some(actor), Some(target)) = (self.actors.get_mut(a), self.targets.get_mut(t)) else {
            return;
        };
        let duplicate = actor.hover.contains(&t);
        debug_assert!(!duplicate, "hover enter issued twice for {a:?} / {t:?}");
        if duplicate {
            return;
        }
        actor.hover.push(t);
        target.hovering.push(a);
        let first = target.hovering.len() == 1;
        self.notify_actor(a, ActorEventKind::HoverEnter, t);
        if first {
            self.notify_target(t, TargetEventKind::FirstHoverEnter, a);
        }
        self.notify_target(t, TargetEventKind::HoverEnter, a);
    }

    pub(crate) fn hover_exit(&mut self, a: ActorId, t: TargetId) {
        let (Some(actor), Some(target)) = (self.actors.get_mut(a), self.targets.get_mut(t)) else {
            return;
        };
        let entered = actor.hover.contains(&t);
        debug_assert!(entered, "hover exit without enter for {a:?} / {t:?}");
        if !entered {
            return;
        }
        actor.hover.retain(|x| *x != t);
        target.hovering.retain(|x| *x != a);
        let last = target.hovering.is_empty();
        self.notify_actor(a, ActorEventKind::HoverExit, t);
        if last {
            self.notify_target(t, TargetEventKind::LastHoverExit, a);
        }
        self.notify_target(t, TargetEventKind::HoverExit, a);
    }

    pub(crate) fn select_enter(&mut self, a: ActorId, t: TargetId) {
        let (Some(actor), Some(target)) = (self.actors.get_mut(a), self.targets.get_mut(t)) else {
            return;
        };
        let busy = actor.select.is_some();
        debug_assert!(!busy, "select enter while {a:?} already selects");
        if busy {
            return;
        }
        actor.select = Some(t);
        target.selecting.push(a);
        debug!(actor = ?a, target_id = ?t, "select granted");
        self.notify_actor(a, ActorEventKind::SelectEnter, t);
        self.notify_target(t, TargetEventKind::SelectEnter, a);
    }

    pub(crate) fn select_exit(&mut self, a: ActorId, t: TargetId) {
        let (Some(actor), Some(target)) = (self.actors.get_mut(a), self.targets.get_mut(t)) else {
            return;
        };
        let entered = actor.select == Some(t);
        debug_assert!(entered, "select exit without enter for {a:?} / {t:?}");
        if !entered {
            return;
        }
        actor.select = None;
        target.selecting.retain(|x| *x != a);
        debug!(actor = ?a, target_id = ?t, "select released");
        self.notify_actor(a, ActorEventKind::SelectExit, t);
        self.notify_target(t, TargetEventKind::SelectExit, a);
    }

    fn notify_actor(&mut self, actor: ActorId, kind: ActorEventKind, target: TargetId) {
        if self.config.record_events {
            self.events.push(InteractionEvent::Actor {
                actor,
                target,
                kind,
            });
        }
        if let Some(a) = self.actors.get_mut(actor) {
            a.listeners.emit(kind, target, &mut self.commands);
        }
    }

    fn notify_target(&mut self, target: TargetId, kind: TargetEventKind, actor: ActorId) {
        if self.config.record_events {
            self.events.push(InteractionEvent::Target {
                target,
                actor,
                kind,
            });
        }
        if let Some(t) = self.targets.get_mut(target) {
            t.listeners.emit(kind, actor, &mut self.commands);
        }
    }

    // --- deferred commands ---

    /// Apply queued commands until none are left.
    pub(crate) fn flush(&mut self) {
        let mut rounds = 0;
        while !self.commands.is_empty() {
            if rounds == MAX_FLUSH_ROUNDS {
                warn!(
                    dropped = self.commands.len(),
                    "listeners keep queueing commands; dropping the rest"
                );
                drop(self.commands.take());
                break;
            }
            rounds += 1;
            for command in self.commands.take() {
                if let Err(err) = self.apply(command) {
                    warn!(?command, %err, "deferred command dropped");
                }
            }
        }
    }

    fn apply(&mut self, command: Command) -> Result<(), InteractionError> {
        match command {
            Command::RegisterActor(a) => self.register_actor_now(a),
            Command::UnregisterActor(a) => self.unregister_actor_now(a),
            Command::RemoveActor(a) => self.remove_actor_now(a).map(drop),
            Command::RegisterTarget(t) => self.register_target_now(t),
            Command::UnregisterTarget(t) => self.unregister_target_now(t),
            Command::RemoveTarget(t) => self.remove_target_now(t),
            Command::ForceSelect(a, t) => self.force_select_now(a, t),
            Command::ReleaseSelect(a) => self.release_select_now(a),
            Command::SetActorFlags(a, flags) => {
                self.ensure_actor_live(a)?;
                self.set_actor_flags(a, flags);
                Ok(())
            }
            Command::SetInteractionsEnabled(a, enabled) => {
                self.ensure_actor_live(a)?;
                self.set_interactions_enabled(a, enabled);
                Ok(())
            }
        }
    }

    fn ensure_actor_live(&self, id: ActorId) -> Result<(), InteractionError> {
        if self.actors.contains(id) {
            Ok(())
        } else {
            Err(InteractionError::ActorNotFound(id))
        }
    }
}
