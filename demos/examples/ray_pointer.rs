// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A ray pointer sweeping across a row of buttons.
//!
//! The pointer hovers every button along its ray up to the first piece of
//! scenery, and keeps the first button it selects. A second, exclusive pointer
//! then grabs the middle button, which the first one can hover but not take.
//!
//! Run:
//! - `RUST_LOG=understory_interaction=trace cargo run -p understory_demos --example ray_pointer`

use kurbo::{Circle, Point, Rect, Vec2};
use tracing_subscriber::EnvFilter;
use understory_collider::{ColliderFlags, Scene};
use understory_interaction::{
    ActorDesc, ActorFlags, Engine, EngineConfig, InteractionEvent, TargetDesc, TargetEventKind,
};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let mut scene = Scene::new();
    let mut engine = Engine::with_config(EngineConfig {
        record_events: true,
    });

    let mut buttons = Vec::new();
    for (i, y) in [-2.0, 0.0, 2.0].into_iter().enumerate() {
        let collider = scene.insert(Circle::new((5.0, y), 0.75), ColliderFlags::default());
        let id = engine.insert_target(TargetDesc {
            surfaces: vec![collider.surface()],
            position: Point::new(5.0, y),
            ..Default::default()
        });
        engine
            .register_target(id)
            .expect("freshly inserted target");
        engine
            .subscribe_target(id, TargetEventKind::FirstHoverEnter, move |actor, _| {
                println!("  button {i} lit by {actor:?}");
            })
            .expect("freshly inserted target");
        buttons.push(id);
    }
    // A wall behind the buttons: anything past it is out of sight.
    scene.insert(Rect::new(8.0, -4.0, 8.5, 4.0), ColliderFlags::default());

    let pointer = engine.insert_actor(ActorDesc::ray(Point::new(0.0, -3.0), Vec2::new(1.0, 0.0)));
    engine
        .register_actor(pointer)
        .expect("freshly inserted actor");

    println!("== Sweep ==");
    for step in 0..=6 {
        let y = -3.0 + f64::from(step);
        engine.set_actor_pose(pointer, Point::new(0.0, y), Vec2::new(1.0, 0.0));
        engine.tick(&scene, f64::from(step) * 0.1);
        println!(
            "y={y:+.1} hovered={:?} selected={:?}",
            engine.hovered_targets(pointer),
            engine.selected_target(pointer)
        );
    }

    println!("== Exclusive grab ==");
    let middle = buttons[1];
    let grabber = engine.insert_actor(ActorDesc {
        flags: ActorFlags::default() | ActorFlags::SELECT_EXCLUSIVE,
        ..ActorDesc::ray(Point::new(0.0, 0.0), Vec2::new(1.0, 0.0))
    });
    engine
        .register_actor(grabber)
        .expect("freshly inserted actor");
    engine
        .force_select(grabber, middle)
        .expect("middle button is free");

    // The pointer lets go and aims at the grabbed button.
    engine
        .release_select(pointer)
        .expect("pointer is registered");
    engine.set_actor_pose(pointer, Point::new(0.0, 0.0), Vec2::new(1.0, 0.0));
    engine.tick(&scene, 1.0);
    println!(
        "pointer selected={:?} grabber selected={:?}",
        engine.selected_target(pointer),
        engine.selected_target(grabber)
    );
    assert_eq!(engine.selected_target(grabber), Some(middle));
    assert_eq!(engine.selected_target(pointer), None);
    assert!(engine.is_hovered(middle));

    let selects = engine
        .drain_events()
        .into_iter()
        .filter(|e| {
            matches!(
                e,
                InteractionEvent::Target {
                    kind: TargetEventKind::SelectEnter | TargetEventKind::SelectExit,
                    ..
                }
            )
        })
        .count();
    println!("{selects} target select transitions recorded");
    assert!(engine.is_consistent());
}
