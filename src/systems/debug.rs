use bevy::prelude::*;

use crate::components::{Projectile, Tank};
use crate::match_state::MatchState;
use crate::resources::{BallisticsConfig, BallisticsEnvironment, TankControls};
use crate::systems::firing::{aim_direction, muzzle_position};
use crate::systems::kinematics::predict_trajectory;

/// Draw debug gizmos for projectiles.
///
/// Draws velocity vectors and positions for active projectiles.
pub fn draw_projectile_debug(
    mut gizmos: Gizmos,
    query: Query<(&Transform, &Projectile)>,
    config: Res<BallisticsConfig>,
) {
    if !config.debug_draw {
        return;
    }

    for (transform, projectile) in query.iter() {
        if !projectile.active {
            continue;
        }
        let radius = projectile.kind.profile().body.radius;
        gizmos.sphere(transform.translation, radius, Color::srgb(1.0, 0.0, 0.0));

        // Scaled down for visibility
        let end = transform.translation + projectile.velocity * 0.1;
        gizmos.line(transform.translation, end, Color::srgb(0.0, 1.0, 0.0));
    }
}

/// Draw the predicted path of a shot from the active tank.
pub fn draw_aim_prediction(
    mut gizmos: Gizmos,
    config: Res<BallisticsConfig>,
    env: Res<BallisticsEnvironment>,
    controls: Res<TankControls>,
    match_state: Res<MatchState>,
    tanks: Query<(&Tank, &Transform)>,
) {
    if !config.draw_aim_prediction || !match_state.is_running() {
        return;
    }
    let Some(active) = match_state.active_player_id() else {
        return;
    };
    let Some((tank, transform)) = tanks.iter().find(|(tank, _)| tank.owner == active) else {
        return;
    };

    let yaw = tank.yaw + controls.turret_yaw;
    let points = predict_trajectory(
        muzzle_position(transform.translation, yaw, controls.turret_elevation),
        aim_direction(yaw, controls.turret_elevation),
        config.prediction_steps,
        config.prediction_time,
        env.gravity,
    );
    gizmos.linestrip(points, Color::srgba(1.0, 1.0, 0.0, 0.6));
}
