//! Firing system - control sampling, aiming, cooldowns and projectile spawning.

use bevy::ecs::message::{MessageReader, MessageWriter};
use bevy::prelude::*;

use crate::components::{MatchScoped, Projectile, Tank};
use crate::events::{FireRequest, ProjectileSpawned};
use crate::match_state::{FireError, MatchState};
use crate::resources::{Battlefield, ProjectileIdAllocator, TankControls};
use crate::systems::kinematics::orientation_for;
use crate::types::{BulletKind, PlayerId, ProjectileKind};

/// Barrel length from turret pivot to muzzle.
pub const BARREL_LENGTH: f32 = 2.5;
/// Turret pivot height above the tank origin.
pub const TURRET_HEIGHT: f32 = 1.5;
/// Turret and barrel step per key press (radians).
pub const AIM_STEP: f32 = 2.0 * std::f32::consts::PI / 180.0;

/// Hull speed driving forward (units/s).
pub const FORWARD_SPEED: f32 = 20.0;
/// Hull speed reversing (units/s).
pub const BACKWARD_SPEED: f32 = 16.0;
/// Hull turn rate (radians/s).
pub const TURN_RATE: f32 = 2.0;

/// Everything needed to put a projectile into the world.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectileLaunch {
    pub kind: ProjectileKind,
    pub origin: Vec3,
    /// Launch direction, normalized on spawn
    pub direction: Vec3,
    pub owner: PlayerId,
}

/// Horizontal unit vector a heading of `yaw` faces. Zero yaw faces -Z.
pub fn heading(yaw: f32) -> Vec3 {
    Vec3::new(-yaw.sin(), 0.0, -yaw.cos())
}

/// Launch direction for a combined hull and turret yaw and a barrel elevation.
///
/// # Example
/// ```
/// use bevy_tank_battle::systems::firing::aim_direction;
///
/// let dir = aim_direction(0.0, 0.0);
/// assert!((dir.z + 1.0).abs() < 1e-6);
/// ```
pub fn aim_direction(yaw: f32, elevation: f32) -> Vec3 {
    Vec3::new(-yaw.sin(), elevation.sin(), -yaw.cos()).normalize()
}

/// Muzzle position of a tank at `tank_position` aiming with `yaw` and `elevation`.
pub fn muzzle_position(tank_position: Vec3, yaw: f32, elevation: f32) -> Vec3 {
    tank_position
        + heading(yaw) * BARREL_LENGTH
        + Vec3::Y * (TURRET_HEIGHT + BARREL_LENGTH * elevation.sin())
}

/// Map keyboard state onto [`TankControls`].
///
/// Space fires, 1/2/3 select the ammunition, arrows drive, W/S raise and
/// lower the barrel and A/D turn the turret.
pub fn sample_keyboard_controls(keys: Res<ButtonInput<KeyCode>>, mut controls: ResMut<TankControls>) {
    controls.fire = keys.pressed(KeyCode::Space);
    controls.forward = keys.pressed(KeyCode::ArrowUp);
    controls.backward = keys.pressed(KeyCode::ArrowDown);
    controls.turn_left = keys.pressed(KeyCode::ArrowLeft);
    controls.turn_right = keys.pressed(KeyCode::ArrowRight);

    if keys.just_pressed(KeyCode::Digit1) {
        controls.select(BulletKind::Standard);
    }
    if keys.just_pressed(KeyCode::Digit2) {
        controls.select(BulletKind::Missile);
    }
    if keys.just_pressed(KeyCode::Digit3) {
        controls.select(BulletKind::SuperBomb);
    }

    if keys.just_pressed(KeyCode::KeyW) {
        let elevation = controls.turret_elevation + AIM_STEP;
        controls.set_elevation(elevation);
    }
    if keys.just_pressed(KeyCode::KeyS) {
        let elevation = controls.turret_elevation - AIM_STEP;
        controls.set_elevation(elevation);
    }
    if keys.just_pressed(KeyCode::KeyA) {
        controls.turret_yaw += AIM_STEP;
    }
    if keys.just_pressed(KeyCode::KeyD) {
        controls.turret_yaw -= AIM_STEP;
    }
}

/// Drive the tank of the active player and mirror its pose into the match.
///
/// # Arguments
/// * `time` - Frame time
/// * `controls` - Drive flags
/// * `battlefield` - Drivable area
/// * `match_state` - Receives the new pose
/// * `tanks` - Tank entities
pub fn drive_active_tank(
    time: Res<Time>,
    controls: Res<TankControls>,
    battlefield: Res<Battlefield>,
    mut match_state: ResMut<MatchState>,
    mut tanks: Query<(&mut Tank, &mut Transform)>,
) {
    if !match_state.is_running() {
        return;
    }
    let Some(active) = match_state.active_player_id() else {
        return;
    };

    let dt = time.delta_secs();
    let mut turn = 0.0;
    if controls.turn_left {
        turn += TURN_RATE * dt;
    }
    if controls.turn_right {
        turn -= TURN_RATE * dt;
    }
    let mut travel = 0.0;
    if controls.forward {
        travel += FORWARD_SPEED * dt;
    }
    if controls.backward {
        travel -= BACKWARD_SPEED * dt;
    }
    if turn == 0.0 && travel == 0.0 {
        return;
    }

    for (mut tank, mut transform) in tanks.iter_mut() {
        if tank.owner != active {
            continue;
        }
        tank.yaw += turn;
        let moved = transform.translation + heading(tank.yaw) * travel;
        transform.translation = battlefield.clamp_drivable(moved);
        transform.rotation = Quat::from_rotation_y(tank.yaw);
        match_state.update_player_pose(active, transform.translation, tank.yaw);
    }
}

/// Turn a rising edge of the fire control into a [`FireRequest`].
///
/// Holding the button fires once; it must be released before the next shot.
/// The selected ammunition is mirrored into the match for the HUD.
pub fn emit_fire_requests(
    controls: Res<TankControls>,
    mut match_state: ResMut<MatchState>,
    tanks: Query<(&Tank, &Transform)>,
    mut fire_was_down: Local<bool>,
    mut requests: MessageWriter<FireRequest>,
) {
    let rising = controls.fire && !*fire_was_down;
    *fire_was_down = controls.fire;

    if !match_state.is_running() {
        return;
    }
    let Some(active) = match_state.active_player_id() else {
        return;
    };
    if match_state.player(active).is_some_and(|p| p.selected != controls.selected) {
        match_state.select_bullet(active, controls.selected);
    }
    if !rising {
        return;
    }

    let Some((tank, transform)) = tanks.iter().find(|(tank, _)| tank.owner == active) else {
        debug!("no tank for player {:?}, fire ignored", active);
        return;
    };

    let yaw = tank.yaw + controls.turret_yaw;
    let elevation = controls.turret_elevation;
    requests.write(
        FireRequest::new(
            active,
            muzzle_position(transform.translation, yaw, elevation),
            aim_direction(yaw, elevation),
        )
        .with_kind(controls.selected),
    );
}

/// Validate fire requests against the match and spawn the projectiles.
///
/// Refused requests are dropped without any state change.
pub fn spawn_requested_projectiles(
    mut commands: Commands,
    mut requests: MessageReader<FireRequest>,
    mut match_state: ResMut<MatchState>,
    mut ids: ResMut<ProjectileIdAllocator>,
    mut spawned: MessageWriter<ProjectileSpawned>,
) {
    for request in requests.read() {
        let result = validate_request(&mut match_state, request);
        if let Err(err) = result {
            debug!("fire request from {:?} refused: {err}", request.player);
            continue;
        }

        let epoch = match_state.epoch;
        spawn_projectile(
            &mut commands,
            &mut ids,
            &mut spawned,
            ProjectileLaunch {
                kind: request.kind.projectile_kind(),
                origin: request.origin,
                direction: request.direction,
                owner: request.player,
            },
            epoch,
        );
    }
}

fn validate_request(match_state: &mut MatchState, request: &FireRequest) -> Result<(), FireError> {
    if !request.origin.is_finite() {
        return Err(FireError::InvalidOrigin);
    }
    if request.direction.try_normalize().is_none() {
        return Err(FireError::InvalidDirection);
    }
    match_state.try_fire(request.player, request.kind)
}

/// Spawn a projectile entity and announce it to physics hosts.
///
/// # Arguments
/// * `commands` - Bevy Commands used for the spawn
/// * `ids` - Id allocator
/// * `spawned` - Writer for [`ProjectileSpawned`]
/// * `launch` - Kind, origin, direction and owner
/// * `epoch` - Match the projectile belongs to
///
/// # Returns
/// The new entity
pub fn spawn_projectile(
    commands: &mut Commands,
    ids: &mut ProjectileIdAllocator,
    spawned: &mut MessageWriter<ProjectileSpawned>,
    launch: ProjectileLaunch,
    epoch: u32,
) -> Entity {
    let id = ids.allocate();
    let projectile = Projectile::launch(id, launch.kind, launch.direction, launch.owner)
        .with_previous_position(launch.origin);
    let body = launch.kind.profile().body;
    let velocity = projectile.velocity;

    let entity = commands
        .spawn((
            Transform::from_translation(launch.origin)
                .with_rotation(orientation_for(velocity, Quat::IDENTITY)),
            projectile,
            body,
            MatchScoped { epoch },
        ))
        .id();

    spawned.write(ProjectileSpawned {
        entity,
        id,
        kind: launch.kind,
        owner: launch.owner,
        origin: launch.origin,
        velocity,
        body,
    });
    entity
}
