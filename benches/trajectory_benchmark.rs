//! Benchmark for trajectory integration and impact resolution.

use bevy::prelude::*;
use bevy_tank_battle::resources::BallisticsEnvironment;
use bevy_tank_battle::systems::impact::{resolve_impact, ImpactSnapshot};
use bevy_tank_battle::systems::kinematics::{advance, predict_trajectory, FlightState};
use bevy_tank_battle::types::{BodyTag, FlightPhase, PlayerId, ProjectileKind};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

fn benchmark_flight_integration(c: &mut Criterion) {
    let env = BallisticsEnvironment::default();
    let mut group = c.benchmark_group("Flight Integration");

    for kind in [ProjectileKind::Standard, ProjectileKind::Missile] {
        let profile = kind.profile();
        let states: Vec<FlightState> = (0..1000)
            .map(|i| {
                let direction = Vec3::new((i as f32 * 0.01).sin(), 0.3, -1.0).normalize();
                FlightState {
                    position: Vec3::new(0.0, 2.0, 0.0),
                    velocity: direction * profile.initial_speed,
                    direction,
                    age: (i % 10) as f32 * 0.1,
                    phase: FlightPhase::Launching,
                }
            })
            .collect();

        group.bench_with_input(BenchmarkId::from_parameter(format!("{kind:?}")), &states, |b, states| {
            b.iter(|| {
                let dt = 1.0 / 64.0;
                for state in states {
                    std::hint::black_box(advance(*state, &profile, &env, dt));
                }
            });
        });
    }

    group.finish();
}

fn benchmark_prediction(c: &mut Criterion) {
    c.bench_function("Trajectory Prediction", |b| {
        b.iter(|| {
            predict_trajectory(
                std::hint::black_box(Vec3::new(0.0, 2.0, -2.5)),
                Vec3::new(0.0, 0.4, -1.0),
                50,
                3.0,
                9.8,
            )
        });
    });
}

fn benchmark_missile_impact(c: &mut Criterion) {
    let snapshot = ImpactSnapshot {
        kind: ProjectileKind::Missile,
        owner: PlayerId(1),
        direction: Vec3::new(0.0, 0.2, -1.0).normalize(),
        point: Vec3::new(4.0, 0.0, -20.0),
    };

    c.bench_function("Missile Impact Resolution", |b| {
        b.iter(|| resolve_impact(&snapshot, BodyTag::Tank { owner: PlayerId(2) }, 10));
    });
}

criterion_group!(
    benches,
    benchmark_flight_integration,
    benchmark_prediction,
    benchmark_missile_impact
);
criterion_main!(benches);
