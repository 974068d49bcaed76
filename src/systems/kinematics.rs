//! Kinematics system - trajectory integration for projectile flight.
//!
//! The integrator is a pure function of (state, dt, profile, environment).
//! The ECS system only feeds entity state through it and applies the
//! lifetime, bounds and sanity checks afterwards.

use bevy::prelude::*;

use crate::components::Projectile;
use crate::resources::{Battlefield, BallisticsEnvironment};
use crate::types::{FlightModel, FlightPhase, FlightProfile};

/// Speed used for the aiming preview, matching a standard shell.
pub const PREDICTION_SPEED: f32 = 30.0;

/// Kinematic snapshot of a projectile fed into [`advance`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlightState {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Unit launch direction
    pub direction: Vec3,
    /// Seconds since launch
    pub age: f32,
    pub phase: FlightPhase,
}

/// Update projectile positions using the flight model of each kind.
///
/// Runs in FixedUpdate for deterministic simulation. Within one tick the
/// order is velocity, position, orientation, then the lifetime, bounds and
/// finite-value checks, so a projectile leaving the battlefield is inactive
/// before contact resolution runs.
///
/// # Arguments
/// * `time` - Bevy FixedTime resource to get delta time
/// * `env` - Gravity and air resistance
/// * `battlefield` - Volume projectiles must stay inside
/// * `query` - Transforms and projectiles to advance
pub fn update_projectiles_kinematics(
    time: Res<Time<Fixed>>,
    env: Res<BallisticsEnvironment>,
    battlefield: Res<Battlefield>,
    mut query: Query<(&mut Transform, &mut Projectile)>,
) {
    let dt = time.delta_secs();
    if dt <= 0.0 {
        return;
    }

    for (mut transform, mut projectile) in query.iter_mut() {
        if !projectile.active {
            continue;
        }

        // Store previous position for collision detection
        projectile.previous_position = transform.translation;

        let profile = projectile.kind.profile();
        let next = advance(
            FlightState {
                position: transform.translation,
                velocity: projectile.velocity,
                direction: projectile.direction,
                age: projectile.age,
                phase: projectile.phase,
            },
            &profile,
            &env,
            dt,
        );

        if !next.position.is_finite() || !next.velocity.is_finite() {
            warn!(
                "projectile {:?} produced non-finite state, deactivating",
                projectile.id
            );
            projectile.expire();
            continue;
        }

        transform.translation = next.position;
        transform.rotation = orientation_for(next.velocity, transform.rotation);
        projectile.velocity = next.velocity;
        projectile.age = next.age;
        projectile.phase = next.phase;

        if projectile.age >= profile.lifetime {
            debug!("projectile {:?} timed out", projectile.id);
            projectile.expire();
        } else if !battlefield.contains(next.position) {
            debug!("projectile {:?} left the battlefield", projectile.id);
            projectile.expire();
        }
    }
}

/// Advance a flight state by `dt` seconds.
///
/// Position uses the average of the velocities before and after the step,
/// which is exact for the constant accelerations of both flight models.
///
/// # Arguments
/// * `state` - Current kinematic state
/// * `profile` - Flight constants of the projectile kind
/// * `env` - Gravity and air resistance
/// * `dt` - Time step (seconds)
///
/// # Returns
/// The state after the step, with `age` advanced and `phase` updated
pub fn advance(
    state: FlightState,
    profile: &FlightProfile,
    env: &BallisticsEnvironment,
    dt: f32,
) -> FlightState {
    let velocity = integrate_velocity(state.velocity, state.direction, state.age, profile, env, dt);
    let age = state.age + dt;

    let phase = match profile.model {
        FlightModel::Powered { launch_duration, .. } if age < launch_duration => {
            FlightPhase::Launching
        }
        _ => FlightPhase::FreeFlight,
    };

    FlightState {
        position: state.position + (state.velocity + velocity) * 0.5 * dt,
        velocity,
        direction: state.direction,
        age,
        phase,
    }
}

/// Velocity after one step of the kind's force model.
///
/// # Arguments
/// * `velocity` - Velocity at the start of the step
/// * `direction` - Unit launch direction
/// * `age` - Projectile age at the start of the step
/// * `profile` - Flight constants
/// * `env` - Gravity and air resistance
/// * `dt` - Time step (seconds)
///
/// # Returns
/// The new velocity vector
pub fn integrate_velocity(
    velocity: Vec3,
    direction: Vec3,
    age: f32,
    profile: &FlightProfile,
    env: &BallisticsEnvironment,
    dt: f32,
) -> Vec3 {
    let mut v = velocity;
    match profile.model {
        FlightModel::Powered {
            launch_duration,
            launch_acceleration,
            launch_boost,
        } => {
            if age < launch_duration {
                v += direction * launch_acceleration * dt;
                v.y += launch_boost * dt;
            } else {
                v.y -= env.gravity * dt;
                let drag = (1.0 - env.air_resistance * dt).max(0.0);
                v.x *= drag;
                v.z *= drag;
            }
        }
        FlightModel::Ballistic { linear_damping } => {
            // Same damping law as the rigid-body engine: v *= (1 - d)^dt
            v.y -= env.gravity * dt;
            v *= (1.0 - linear_damping).clamp(0.0, 1.0).powf(dt);
        }
    }
    v
}

/// Rotation that points the projectile's local up axis along its velocity.
///
/// Built as an axis-angle rotation from world up. When the velocity is almost
/// vertical the cross product with up degenerates, so the X axis is used as
/// the reference instead. A zero velocity keeps `previous`.
pub fn orientation_for(velocity: Vec3, previous: Quat) -> Quat {
    let Some(dir) = velocity.try_normalize() else {
        return previous;
    };

    let axis = if dir.y.abs() > 0.99 {
        Vec3::X.cross(dir)
    } else {
        Vec3::Y.cross(dir)
    };
    let angle = Vec3::Y.dot(dir).clamp(-1.0, 1.0).acos();

    match axis.try_normalize() {
        Some(axis) => Quat::from_axis_angle(axis, angle),
        None => previous,
    }
}

/// Closed-form parabolic preview of a shot, used while aiming.
///
/// Samples `steps` points over `max_time` seconds in addition to the start
/// point, with muzzle speed [`PREDICTION_SPEED`] and no drag.
///
/// # Arguments
/// * `origin` - Muzzle position
/// * `direction` - Aim direction, normalized here
/// * `steps` - Number of samples after the start point
/// * `max_time` - Time covered by the preview (seconds)
/// * `gravity` - Gravity magnitude
///
/// # Returns
/// `steps + 1` points starting at `origin`
///
/// # Example
/// ```
/// use bevy::prelude::*;
/// use bevy_tank_battle::systems::kinematics::predict_trajectory;
///
/// let points = predict_trajectory(Vec3::ZERO, Vec3::NEG_Z, 50, 3.0, 9.8);
/// assert_eq!(points.len(), 51);
/// assert_eq!(points[0], Vec3::ZERO);
/// ```
pub fn predict_trajectory(
    origin: Vec3,
    direction: Vec3,
    steps: usize,
    max_time: f32,
    gravity: f32,
) -> Vec<Vec3> {
    let v0 = direction.normalize_or_zero() * PREDICTION_SPEED;
    let steps = steps.max(1);
    let step_time = max_time / steps as f32;

    (0..=steps)
        .map(|i| {
            let t = i as f32 * step_time;
            origin + v0 * t - Vec3::Y * (0.5 * gravity * t * t)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProjectileKind;

    const DT: f32 = 1.0 / 64.0;

    fn fly(kind: ProjectileKind, position: Vec3, direction: Vec3, seconds: f32) -> FlightState {
        let profile = kind.profile();
        let env = BallisticsEnvironment::default();
        let mut state = FlightState {
            position,
            velocity: direction * profile.initial_speed,
            direction,
            age: 0.0,
            phase: FlightPhase::FreeFlight,
        };
        let steps = (seconds / DT).round() as usize;
        for _ in 0..steps {
            state = advance(state, &profile, &env, DT);
        }
        state
    }

    #[test]
    fn test_free_fall_without_drag_is_exact() {
        let mut profile = ProjectileKind::Standard.profile();
        profile.model = FlightModel::Ballistic { linear_damping: 0.0 };
        let env = BallisticsEnvironment::default();
        let mut state = FlightState {
            position: Vec3::new(0.0, 1.0, 0.0),
            velocity: Vec3::new(0.0, 0.0, -30.0),
            direction: Vec3::NEG_Z,
            age: 0.0,
            phase: FlightPhase::FreeFlight,
        };
        for _ in 0..64 {
            state = advance(state, &profile, &env, DT);
        }
        assert!((state.position.y - (-3.9)).abs() < 1e-3);
        assert!((state.position.z - (-30.0)).abs() < 1e-3);
    }

    #[test]
    fn test_standard_shell_drops_about_half_g() {
        let state = fly(ProjectileKind::Standard, Vec3::new(0.0, 1.0, 0.0), Vec3::NEG_Z, 1.0);
        // Engine damping slows the fall slightly
        assert!((state.position.y - (-3.9)).abs() < 0.2);
        assert_eq!(state.phase, FlightPhase::FreeFlight);
    }

    #[test]
    fn test_vertical_velocity_decreases_at_gravity_rate() {
        let profile = ProjectileKind::Missile.profile();
        let env = BallisticsEnvironment::default();
        let mut v = Vec3::new(5.0, 10.0, 5.0);
        for _ in 0..30 {
            let next = integrate_velocity(v, Vec3::NEG_Z, 1.0, &profile, &env, DT);
            assert!((v.y - next.y - env.gravity * DT).abs() < 1e-4);
            let h = Vec2::new(v.x, v.z).length();
            let h_next = Vec2::new(next.x, next.z).length();
            assert!(h_next <= h);
            v = next;
        }
    }

    #[test]
    fn test_launch_phase_accelerates_along_direction() {
        let profile = ProjectileKind::Missile.profile();
        let env = BallisticsEnvironment::default();
        let v0 = Vec3::NEG_Z * 20.0;
        let v1 = integrate_velocity(v0, Vec3::NEG_Z, 0.0, &profile, &env, 0.1);
        assert!((v1.z - (-24.0)).abs() < 1e-4);
        assert!((v1.y - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_phase_switches_after_launch_duration() {
        let profile = ProjectileKind::Submissile.profile();
        let env = BallisticsEnvironment::default();
        let mut state = FlightState {
            position: Vec3::ZERO,
            velocity: Vec3::NEG_Z * 25.0,
            direction: Vec3::NEG_Z,
            age: 0.0,
            phase: FlightPhase::Launching,
        };
        state = advance(state, &profile, &env, 0.1);
        assert_eq!(state.phase, FlightPhase::Launching);
        state = advance(state, &profile, &env, 0.15);
        assert_eq!(state.phase, FlightPhase::FreeFlight);
    }

    #[test]
    fn test_orientation_follows_velocity() {
        let rotation = orientation_for(Vec3::new(0.0, 0.0, -10.0), Quat::IDENTITY);
        let up = rotation * Vec3::Y;
        assert!((up - Vec3::NEG_Z).length() < 1e-5);
    }

    #[test]
    fn test_orientation_near_vertical_uses_fallback_axis() {
        let rotation = orientation_for(Vec3::new(0.0, -5.0, 0.01), Quat::IDENTITY);
        assert!(rotation.is_finite());
        let up = rotation * Vec3::Y;
        assert!(up.y < -0.99);

        let straight_up = orientation_for(Vec3::Y * 3.0, Quat::IDENTITY);
        assert!((straight_up * Vec3::Y - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn test_zero_velocity_keeps_previous_rotation() {
        let previous = Quat::from_rotation_x(0.3);
        assert_eq!(orientation_for(Vec3::ZERO, previous), previous);
    }

    #[test]
    fn test_prediction_matches_drag_free_integrator() {
        let direction = Vec3::new(0.0, 0.5, -1.0).normalize();
        let points = predict_trajectory(Vec3::ZERO, direction, 50, 3.0, 9.8);
        assert_eq!(points.len(), 51);

        let mut profile = ProjectileKind::Standard.profile();
        profile.model = FlightModel::Ballistic { linear_damping: 0.0 };
        let env = BallisticsEnvironment::default();
        let mut state = FlightState {
            position: Vec3::ZERO,
            velocity: direction * PREDICTION_SPEED,
            direction,
            age: 0.0,
            phase: FlightPhase::FreeFlight,
        };
        // 3.0 s / 50 steps = 0.06 s per sample
        for point in points.iter().skip(1) {
            state = advance(state, &profile, &env, 0.06);
            assert!((state.position - *point).length() < 1e-3);
        }
    }
}
