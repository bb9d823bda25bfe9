// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use kurbo::{Circle, Point, Vec2};
use understory_collider::{ColliderFlags, ColliderShape, OverlapTracker, Scene, forward};
use understory_interaction::{ActorDesc, Engine, TargetDesc, TargetFlags};

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f64(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) / ((1u64 << 53) as f64)
    }
}

/// A scene of `count` small discs scattered over a square, each backed by a target.
fn populate(engine: &mut Engine, count: usize, extent: f64, concurrent: bool) -> Scene {
    let mut scene = Scene::new();
    let mut rng = Rng::new(0xCAFE_F00D_DEAD_BEEF);
    for _ in 0..count {
        let center = Point::new(rng.next_f64() * extent, rng.next_f64() * extent);
        let collider = scene.insert(Circle::new(center, 0.5), ColliderFlags::default());
        let mut flags = TargetFlags::default();
        if concurrent {
            flags |= TargetFlags::CONCURRENT_SELECT;
        }
        let id = engine.insert_target(TargetDesc {
            surfaces: vec![collider.surface()],
            position: center,
            flags,
            ..Default::default()
        });
        engine.register_target(id).unwrap();
    }
    scene
}

fn bench_rays(c: &mut Criterion) {
    let mut group = c.benchmark_group("ray_actors");
    for &actors in &[1usize, 8, 64] {
        let mut engine = Engine::new();
        let scene = populate(&mut engine, 1024, 100.0, false);
        let mut rng = Rng::new(0xBADC_F00D_1234_5678);
        let ids: Vec<_> = (0..actors)
            .map(|_| {
                let origin = Point::new(0.0, rng.next_f64() * 100.0);
                let id = engine.insert_actor(ActorDesc::ray(origin, Vec2::new(1.0, 0.0)));
                engine.register_actor(id).unwrap();
                id
            })
            .collect();
        group.throughput(Throughput::Elements(actors as u64));
        let mut now = 0.0;
        group.bench_function(format!("tick_sweep_a{actors}"), |b| {
            b.iter(|| {
                now += 0.016;
                for (i, &id) in ids.iter().enumerate() {
                    let angle = now + i as f64;
                    let dir = Vec2::new(1.0, 0.25 * angle.sin());
                    engine.set_actor_pose(id, Point::new(0.0, (i as f64 * 7.0) % 100.0), dir);
                }
                engine.tick(&scene, now);
                black_box(engine.selected_target(ids[0]));
            });
        });
    }
    group.finish();
}

fn bench_volumes(c: &mut Criterion) {
    let mut group = c.benchmark_group("volume_actors");
    for &concurrent in &[false, true] {
        group.bench_function(format!("walk_concurrent_{concurrent}"), |b| {
            b.iter_batched(
                || {
                    let mut engine = Engine::new();
                    let scene = populate(&mut engine, 512, 50.0, concurrent);
                    let hands: Vec<_> = (0..4)
                        .map(|i| {
                            let id = engine.insert_actor(ActorDesc::volume(Point::new(
                                0.0,
                                f64::from(i) * 12.0,
                            )));
                            engine.register_actor(id).unwrap();
                            (id, OverlapTracker::new())
                        })
                        .collect();
                    (engine, scene, hands)
                },
                |(mut engine, scene, mut hands)| {
                    for step in 0..50 {
                        let x = f64::from(step);
                        for (i, (id, tracker)) in hands.iter_mut().enumerate() {
                            let center = Point::new(x, i as f64 * 12.0);
                            engine.set_actor_pose(*id, center, Vec2::new(1.0, 0.0));
                            let reach = ColliderShape::Circle(Circle::new(center, 2.0));
                            let events = tracker.update(&scene.overlapping(&reach, None));
                            forward(&mut engine, *id, &events).unwrap();
                        }
                        engine.tick(&scene, x * 0.016);
                    }
                    black_box(engine.is_consistent());
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_rays, bench_volumes);
criterion_main!(benches);
