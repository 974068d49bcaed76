//! Common types and enums for the tank battle core.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Identifier of a player taking part in a match.
///
/// Player ids are small integers handed out by [`crate::match_state::MatchState`]
/// when a match starts (`1` for the local player, `2` for the opponent in
/// elimination mode).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Reflect, Serialize, Deserialize)]
pub struct PlayerId(pub u32);

/// Unique, monotonically increasing projectile identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Reflect)]
pub struct ProjectileId(pub u64);

/// Identifier of a balloon target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect, Serialize, Deserialize)]
pub struct BalloonId(pub u32);

/// Ammunition category a player can select and fire.
///
/// Each kind has its own ammo accounting in [`AmmoInventory`].
///
/// # Variants
/// * `Standard` - Heavy cannonball, unlimited ammo
/// * `Missile` - Cluster missile that splits into submissiles on impact
/// * `SuperBomb` - Heavy bomb followed by a cross of secondary blasts
///
/// # Example
/// ```
/// use bevy_tank_battle::types::{BulletKind, ProjectileKind};
///
/// assert_eq!(BulletKind::Missile.projectile_kind(), ProjectileKind::Missile);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect, Serialize, Deserialize)]
pub enum BulletKind {
    #[default]
    /// Unlimited cannonball
    Standard,
    /// Cluster missile
    Missile,
    /// Super bomb
    SuperBomb,
}

impl BulletKind {
    /// All selectable kinds in selector order.
    pub const ALL: [BulletKind; 3] = [BulletKind::Standard, BulletKind::Missile, BulletKind::SuperBomb];

    /// The projectile variant spawned when this kind is fired.
    pub fn projectile_kind(self) -> ProjectileKind {
        match self {
            BulletKind::Standard => ProjectileKind::Standard,
            BulletKind::Missile => ProjectileKind::Missile,
            BulletKind::SuperBomb => ProjectileKind::SuperBomb,
        }
    }

    /// Human readable name shown by selector widgets.
    pub fn display_name(self) -> &'static str {
        match self {
            BulletKind::Standard => "Standard Shell",
            BulletKind::Missile => "Cluster Missile",
            BulletKind::SuperBomb => "Super Bomb",
        }
    }
}

/// In-flight munition variant.
///
/// `Submissile` is never fired directly: it only appears as the fan-out of a
/// missile impact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect)]
pub enum ProjectileKind {
    #[default]
    Standard,
    Missile,
    SuperBomb,
    Submissile,
}

impl ProjectileKind {
    /// Flight and body constants for this kind.
    pub fn profile(self) -> FlightProfile {
        match self {
            ProjectileKind::Standard => FlightProfile {
                initial_speed: 30.0,
                model: FlightModel::Ballistic { linear_damping: 0.1 },
                lifetime: 10.0,
                body: ProjectileBody {
                    mass: 50.0,
                    radius: 0.5,
                    collision_group: 1,
                    collision_mask: 7,
                },
            },
            ProjectileKind::Missile => FlightProfile {
                initial_speed: 20.0,
                model: FlightModel::Powered {
                    launch_duration: 0.5,
                    launch_acceleration: 40.0,
                    launch_boost: 5.0,
                },
                lifetime: 6.0,
                body: ProjectileBody {
                    mass: 20.0,
                    radius: 0.25,
                    collision_group: 2,
                    collision_mask: 7,
                },
            },
            ProjectileKind::SuperBomb => FlightProfile {
                initial_speed: 25.0,
                model: FlightModel::Ballistic { linear_damping: 0.1 },
                lifetime: 10.0,
                body: ProjectileBody {
                    mass: 80.0,
                    radius: 0.6,
                    collision_group: 2,
                    collision_mask: 7,
                },
            },
            ProjectileKind::Submissile => FlightProfile {
                initial_speed: 25.0,
                model: FlightModel::Powered {
                    launch_duration: 0.2,
                    launch_acceleration: 60.0,
                    launch_boost: 10.0,
                },
                lifetime: 3.0,
                body: ProjectileBody {
                    mass: 10.0,
                    radius: 0.15,
                    collision_group: 2,
                    collision_mask: 7,
                },
            },
        }
    }

    /// Scale and duration (seconds) of the fire effect left at the impact point.
    pub fn impact_effect(self) -> (f32, f32) {
        match self {
            ProjectileKind::Standard => (2.0, 1.5),
            ProjectileKind::Missile => (1.5, 1.2),
            ProjectileKind::Submissile => (1.0, 0.8),
            ProjectileKind::SuperBomb => (3.0, 1.5),
        }
    }
}

/// Force model applied by the trajectory integrator.
///
/// # Variants
/// * `Powered` - Accelerated along the launch direction for `launch_duration`
///   seconds, then free flight with gravity and horizontal air resistance
/// * `Ballistic` - Launched with a single impulse and left to gravity and the
///   physics engine's linear damping law
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub enum FlightModel {
    Powered {
        /// Length of the powered phase (seconds)
        launch_duration: f32,
        /// Acceleration along the launch direction (units/s²)
        launch_acceleration: f32,
        /// Extra upward acceleration during launch (units/s²)
        launch_boost: f32,
    },
    Ballistic {
        /// Fraction of velocity lost per second
        linear_damping: f32,
    },
}

/// Collision description sent to the physics collaborator on spawn.
///
/// Inserted on every projectile entity so the host can build a matching
/// collider and filter. Projectile flight writes `Transform` itself, so the
/// host attaches a kinematic or sensor body, never a dynamic one.
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct ProjectileBody {
    pub mass: f32,
    pub radius: f32,
    /// Collision filter group bits
    pub collision_group: u32,
    /// Collision filter mask bits (tanks 1, balloons 2, houses 4)
    pub collision_mask: u32,
}

/// Kind-dependent constants for a projectile.
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct FlightProfile {
    /// Muzzle speed along the launch direction (units/s)
    pub initial_speed: f32,
    pub model: FlightModel,
    /// Seconds before the projectile times out
    pub lifetime: f32,
    pub body: ProjectileBody,
}

impl FlightProfile {
    /// Duration of the powered launch phase, zero for ballistic bodies.
    pub fn launch_duration(&self) -> f32 {
        match self.model {
            FlightModel::Powered { launch_duration, .. } => launch_duration,
            FlightModel::Ballistic { .. } => 0.0,
        }
    }
}

/// Lifecycle phase of a projectile.
///
/// # Variants
/// * `Launching` - Powered phase, velocity grows along the launch direction
/// * `FreeFlight` - Gravity and drag only
/// * `Expired` - Collided, timed out or left the battlefield
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum FlightPhase {
    #[default]
    Launching,
    FreeFlight,
    Expired,
}

/// Gameplay tag of a body a projectile collided with.
///
/// Tags are resolved once when a contact is ingested from the physics
/// collaborator; untagged bodies count as terrain.
///
/// # Example
/// ```
/// use bevy_tank_battle::types::{BodyTag, PlayerId};
///
/// let tag = BodyTag::Tank { owner: PlayerId(2) };
/// assert!(tag.is_tank());
/// ```
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
#[reflect(Component)]
pub enum BodyTag {
    /// A tank owned by a player
    Tank { owner: PlayerId },
    /// A scoring balloon
    Balloon { id: BalloonId },
    House,
    Bunker,
    Barrier,
    #[default]
    Terrain,
}

impl BodyTag {
    pub fn is_tank(&self) -> bool {
        matches!(self, BodyTag::Tank { .. })
    }
}

/// Win condition / rule set of a match.
///
/// # Variants
/// * `ScoreAttack` - Single player pops balloons against a countdown
/// * `Elimination` - Two players take turns; reaching zero health loses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect, Serialize, Deserialize)]
pub enum GameMode {
    #[default]
    ScoreAttack,
    Elimination,
}

/// Lifecycle phase of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect, Serialize, Deserialize)]
pub enum MatchPhase {
    #[default]
    NotStarted,
    Running,
    Over,
}

/// Why a match ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect, Serialize, Deserialize)]
pub enum MatchEndReason {
    /// Countdown reached zero
    TimeUp,
    /// A player's health reached zero
    Eliminated,
}

/// Per-player ammunition counts.
///
/// `Standard` is unlimited and never tracked. Counts are never replenished
/// while a match is running.
///
/// # Example
/// ```
/// use bevy_tank_battle::types::{AmmoInventory, BulletKind};
///
/// let mut ammo = AmmoInventory::new(5, 3);
/// assert!(ammo.try_consume(BulletKind::Missile));
/// assert_eq!(ammo.remaining(BulletKind::Missile), Some(4));
/// assert_eq!(ammo.remaining(BulletKind::Standard), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect, Serialize, Deserialize)]
pub struct AmmoInventory {
    pub missiles: u32,
    pub super_bombs: u32,
}

impl AmmoInventory {
    pub fn new(missiles: u32, super_bombs: u32) -> Self {
        Self {
            missiles,
            super_bombs,
        }
    }

    /// Remaining rounds, `None` for unlimited kinds.
    pub fn remaining(&self, kind: BulletKind) -> Option<u32> {
        match kind {
            BulletKind::Standard => None,
            BulletKind::Missile => Some(self.missiles),
            BulletKind::SuperBomb => Some(self.super_bombs),
        }
    }

    /// Takes one round of `kind`. Returns `false` and leaves counts untouched
    /// when the kind is exhausted.
    pub fn try_consume(&mut self, kind: BulletKind) -> bool {
        let slot = match kind {
            BulletKind::Standard => return true,
            BulletKind::Missile => &mut self.missiles,
            BulletKind::SuperBomb => &mut self.super_bombs,
        };
        if *slot == 0 {
            return false;
        }
        *slot -= 1;
        true
    }
}
