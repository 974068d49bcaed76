use std::time::Duration;

use bevy::app::ScheduleRunnerPlugin;
use bevy::ecs::message::{MessageReader, MessageWriter};
use bevy::prelude::*;
use bevy_tank_battle::prelude::*;

fn main() {
    println!("Starting headless score attack round...");
    println!("The round lasts 15 seconds of simulated time.");
    for kind in BulletKind::ALL {
        println!("  loaded: {}", kind.display_name());
    }

    App::new()
        .add_plugins(MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(1.0 / 60.0))))
        // Keyboard and debug plugins need a window
        .add_plugins(TankBattlePluginGroup.build().disable::<KeyboardControlsPlugin>())
        .insert_resource(GameRules::score_attack().with_duration(Some(15.0)).with_fire_cooldown(0.5))
        .insert_resource(Time::<Fixed>::from_hz(60.0))
        .add_systems(Startup, request_start)
        .add_systems(Update, (scripted_gunner, report_events, exit_on_match_over))
        .add_systems(
            FixedUpdate,
            fake_physics_contacts
                .after(BallisticsSet::Integrate)
                .before(BallisticsSet::ResolveImpacts),
        )
        .run();
}

fn request_start(mut start: MessageWriter<StartMatchRequest>) {
    start.write(StartMatchRequest::new("headless"));
}

/// Sweeps the turret and fires every ammunition kind in turn.
fn scripted_gunner(time: Res<Time>, mut controls: ResMut<TankControls>, mut shots: Local<u32>, mut timer: Local<f32>) {
    *timer += time.delta_secs();
    controls.fire = false;
    if *timer < 0.6 {
        return;
    }
    *timer = 0.0;
    *shots += 1;

    controls.turret_yaw = (*shots as f32 * 0.7).sin() * 1.2;
    controls.set_elevation(0.35 + (*shots % 4) as f32 * 0.1);
    let kind = match *shots % 5 {
        0 => BulletKind::SuperBomb,
        2 => BulletKind::Missile,
        _ => BulletKind::Standard,
    };
    controls.select(kind);
    controls.fire = true;
    println!("[FIRE] {}", kind.display_name());
}

/// Stands in for a physics engine: ground contacts below y = 0 and balloon
/// contacts within 1.5 units.
fn fake_physics_contacts(
    projectiles: Query<(Entity, &Transform, &Projectile)>,
    balloons: Query<(&Transform, &Balloon)>,
    mut contacts: MessageWriter<ProjectileContact>,
) {
    for (entity, transform, projectile) in projectiles.iter() {
        if !projectile.active {
            continue;
        }
        let position = transform.translation;

        let balloon = balloons
            .iter()
            .find(|(b, _)| b.translation.distance(position) < 1.5)
            .map(|(_, b)| b.id);

        let tag = match balloon {
            Some(id) => BodyTag::Balloon { id },
            None if position.y < 0.0 => BodyTag::Terrain,
            None => continue,
        };
        contacts.write(ProjectileContact {
            projectile: entity,
            tag,
            point: position,
        });
    }
}

fn report_events(
    mut spawned: MessageReader<ProjectileSpawned>,
    mut bursts: MessageReader<BalloonBurst>,
    mut blasts: MessageReader<BlastDetonated>,
) {
    for shot in spawned.read() {
        println!("[SPAWN] {:?} {:?} from {:.1}", shot.kind, shot.id, shot.origin);
    }
    for burst in bursts.read() {
        println!("[BURST] {:?} for {} points", burst.balloon, burst.points);
    }
    for blast in blasts.read() {
        println!("[BLAST] at {:.1} (scale {})", blast.position, blast.scale);
    }
}

fn exit_on_match_over(
    mut over: MessageReader<MatchOver>,
    match_state: Res<MatchState>,
    mut exit: MessageWriter<AppExit>,
) {
    for result in over.read() {
        println!(
            "[FINISHED] {:?}: {} scored {}",
            result.reason, result.player_name, result.final_score
        );
        if let Some(hud) = match_state.hud(PlayerId(1)) {
            println!(
                "[HUD] missiles left {}, super bombs left {}",
                hud.ammo.missiles, hud.ammo.super_bombs
            );
        }
        exit.write(AppExit::Success);
    }
}
