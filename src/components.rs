//! ECS components for projectiles, tanks, balloons and match-scoped effects.

use bevy::prelude::*;

use crate::types::{
    BalloonId, FlightModel, FlightPhase, PlayerId, ProjectileId, ProjectileKind,
};

/// Core projectile component containing the kinematic state of a munition.
///
/// The position lives in the entity's `Transform::translation`; the rotation is
/// derived from `velocity` every tick. `previous_position` is the translation
/// at the start of the last tick and is used for swept collision checks.
///
/// # Fields
/// * `id` - Unique, monotonically increasing identifier
/// * `kind` - Munition variant, selects the flight profile
/// * `velocity` - Current velocity (units/s)
/// * `direction` - Unit launch direction, drives the powered phase and submissile fan-out
/// * `owner` - Player who fired it, never damaged by it
/// * `phase` - Which force model currently applies
/// * `age` - Seconds since creation
/// * `active` - Once `false` the projectile ignores contacts and is despawned
///
/// # Example
/// ```
/// use bevy::prelude::*;
/// use bevy_tank_battle::components::Projectile;
/// use bevy_tank_battle::types::{FlightPhase, PlayerId, ProjectileId, ProjectileKind};
///
/// let shell = Projectile::launch(ProjectileId(1), ProjectileKind::Standard, Vec3::NEG_Z, PlayerId(1));
/// assert_eq!(shell.velocity, Vec3::new(0.0, 0.0, -30.0));
/// assert_eq!(shell.phase, FlightPhase::FreeFlight);
/// ```
#[derive(Component, Reflect, Clone, Debug, PartialEq)]
#[reflect(Component)]
pub struct Projectile {
    pub id: ProjectileId,
    pub kind: ProjectileKind,
    pub velocity: Vec3,
    pub direction: Vec3,
    pub owner: PlayerId,
    pub phase: FlightPhase,
    pub age: f32,
    pub active: bool,
    /// Translation at the start of the last tick
    pub previous_position: Vec3,
}

impl Default for Projectile {
    fn default() -> Self {
        Self {
            id: ProjectileId::default(),
            kind: ProjectileKind::Standard,
            velocity: Vec3::ZERO,
            direction: Vec3::NEG_Z,
            owner: PlayerId::default(),
            phase: FlightPhase::FreeFlight,
            age: 0.0,
            active: true,
            previous_position: Vec3::ZERO,
        }
    }
}

impl Projectile {
    /// Creates a freshly fired projectile.
    ///
    /// `direction` is normalized on entry; callers reject zero directions
    /// before getting here. The initial velocity is the kind's muzzle speed
    /// along `direction`. Powered kinds start in `Launching`, ballistic kinds
    /// go straight to `FreeFlight`.
    pub fn launch(id: ProjectileId, kind: ProjectileKind, direction: Vec3, owner: PlayerId) -> Self {
        let direction = direction.normalize_or(Vec3::Y);
        let profile = kind.profile();
        let phase = match profile.model {
            FlightModel::Powered { .. } => FlightPhase::Launching,
            FlightModel::Ballistic { .. } => FlightPhase::FreeFlight,
        };

        Self {
            id,
            kind,
            velocity: direction * profile.initial_speed,
            direction,
            owner,
            phase,
            age: 0.0,
            active: true,
            previous_position: Vec3::ZERO,
        }
    }

    pub fn with_previous_position(mut self, position: Vec3) -> Self {
        self.previous_position = position;
        self
    }

    /// Marks the projectile as finished. Idempotent.
    pub fn expire(&mut self) {
        self.active = false;
        self.phase = FlightPhase::Expired;
    }
}

/// A player's tank on the battlefield.
///
/// The host attaches meshes and colliders; the simulation only moves the
/// transform and reads it for muzzle placement.
#[derive(Component, Reflect, Clone, Copy, Debug, PartialEq)]
#[reflect(Component)]
pub struct Tank {
    pub owner: PlayerId,
    /// Hull heading (radians, 0 faces -Z)
    pub yaw: f32,
}

/// Scoring target floating above the battlefield.
#[derive(Component, Reflect, Clone, Copy, Debug, PartialEq)]
#[reflect(Component)]
pub struct Balloon {
    pub id: BalloonId,
    pub points: u32,
    pub burst: bool,
}

impl Balloon {
    pub fn new(id: BalloonId, points: u32) -> Self {
        Self {
            id,
            points,
            burst: false,
        }
    }

    /// Bursts the balloon and returns its point value, or `None` if it had
    /// already burst.
    pub fn burst(&mut self) -> Option<u32> {
        if self.burst {
            return None;
        }
        self.burst = true;
        Some(self.points)
    }
}

/// Tags an entity with the match it belongs to.
///
/// Entities from an older epoch are despawned when the next match starts and
/// are ignored by deferred effect systems in the meantime.
#[derive(Component, Reflect, Clone, Copy, Debug, PartialEq, Eq)]
#[reflect(Component)]
pub struct MatchScoped {
    pub epoch: u32,
}

/// Fire and smoke left at an impact point.
#[derive(Component, Reflect, Clone, Copy, Debug)]
#[reflect(Component)]
pub struct ImpactFire {
    pub scale: f32,
    /// Seconds left before the effect is removed
    pub remaining: f32,
}

/// Cosmetic secondary explosion of a super bomb, waiting for its delay.
#[derive(Component, Reflect, Clone, Copy, Debug)]
#[reflect(Component)]
pub struct SecondaryBlast {
    /// Seconds left before detonation
    pub delay: f32,
    pub scale: f32,
}

/// Floating "+points" label left by a burst balloon.
#[derive(Component, Reflect, Clone, Copy, Debug)]
#[reflect(Component)]
pub struct BurstLabel {
    pub points: u32,
    pub remaining: f32,
}

impl BurstLabel {
    /// Seconds a label stays visible
    pub const LIFETIME: f32 = 1.5;

    pub fn new(points: u32) -> Self {
        Self {
            points,
            remaining: Self::LIFETIME,
        }
    }
}
