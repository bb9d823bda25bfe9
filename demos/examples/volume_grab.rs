// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A hand volume reaching for objects on a table.
//!
//! Overlaps are computed by the collider scene and forwarded to the engine.
//! The hand only grabs after the nearest object has stayed nearest for a
//! short dwell, and a listener releases the grab when a cup is dropped.
//!
//! Run:
//! - `RUST_LOG=debug cargo run -p understory_demos --example volume_grab`

use kurbo::{Circle, Point, Rect, Vec2};
use tracing_subscriber::EnvFilter;
use understory_collider::{ColliderFlags, ColliderShape, OverlapTracker, Scene, forward};
use understory_interaction::{
    ActorDesc, ActorEventKind, Commands, Engine, TargetDesc, TargetFlags, TargetId,
};

const HAND_RADIUS: f64 = 1.0;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let mut scene = Scene::new();
    let mut engine = Engine::new();

    let cup_shape = Circle::new((3.0, 0.0), 0.4);
    let cup_collider = scene.insert(cup_shape, ColliderFlags::default());
    let cup = engine.insert_target(TargetDesc {
        surfaces: vec![cup_collider.surface()],
        position: cup_shape.center,
        ..Default::default()
    });
    let tray_shape = Rect::new(4.0, -0.5, 6.0, 0.5);
    let tray_collider = scene.insert(tray_shape, ColliderFlags::default());
    let tray = engine.insert_target(TargetDesc {
        surfaces: vec![tray_collider.surface()],
        position: tray_shape.center(),
        // Two hands may carry the tray together.
        flags: TargetFlags::default() | TargetFlags::CONCURRENT_SELECT,
        ..Default::default()
    });
    for t in [cup, tray] {
        engine.register_target(t).expect("freshly inserted target");
    }

    let hand = engine.insert_actor(ActorDesc {
        hover_to_select: Some(0.25),
        ..ActorDesc::volume(Point::ORIGIN)
    });
    engine.register_actor(hand).expect("freshly inserted actor");
    engine
        .subscribe_actor(
            hand,
            ActorEventKind::SelectEnter,
            move |target: TargetId, commands: &mut Commands| {
                println!("  grabbed {target:?}");
                if target == cup {
                    // The cup slips straight out of the hand.
                    commands.release_select(hand);
                }
            },
        )
        .expect("freshly inserted actor");

    let mut tracker = OverlapTracker::new();
    let mut now = 0.0;
    for x in [0.0, 1.5, 2.5, 2.6, 2.7, 2.8, 3.5, 4.5, 4.6, 4.7, 4.8] {
        let center = Point::new(x, 0.0);
        engine.set_actor_pose(hand, center, Vec2::new(1.0, 0.0));
        let reach = ColliderShape::Circle(Circle::new(center, HAND_RADIUS));
        let events = tracker.update(&scene.overlapping(&reach, None));
        forward(&mut engine, hand, &events).expect("hand stays registered");
        engine.tick(&scene, now);
        println!(
            "t={now:.1} x={x:.1} hovered={:?} selected={:?}",
            engine.hovered_targets(hand),
            engine.selected_target(hand)
        );
        now += 0.1;
    }
    assert!(engine.is_consistent());
}
