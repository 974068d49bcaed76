//! Global resources for the tank battle simulation.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::types::{BulletKind, GameMode, ProjectileId};

/// Global environment settings affecting powered projectiles.
///
/// Ballistic (engine model) bodies only use `gravity`; the horizontal
/// `air_resistance` term applies to powered bodies in free flight.
///
/// # Fields
/// * `gravity` - Downward acceleration in units per second squared
/// * `air_resistance` - Fraction of horizontal velocity lost per second
///
/// # Example
/// ```
/// use bevy_tank_battle::resources::BallisticsEnvironment;
///
/// let moon = BallisticsEnvironment {
///     gravity: 1.62,
///     air_resistance: 0.0,
/// };
/// assert!(moon.gravity < BallisticsEnvironment::default().gravity);
/// ```
#[derive(Resource, Reflect, Clone, Debug)]
#[reflect(Resource)]
pub struct BallisticsEnvironment {
    /// Gravity magnitude (units/s²)
    pub gravity: f32,
    /// Horizontal damping factor for powered free flight (1/s)
    pub air_resistance: f32,
}

impl Default for BallisticsEnvironment {
    /// Default values:
    /// - Gravity: 9.8 units/s² downward
    /// - Air resistance: 0.05 per second
    fn default() -> Self {
        Self {
            gravity: 9.8,
            air_resistance: 0.05,
        }
    }
}

/// Playable volume of the battlefield.
///
/// Projectiles leaving this volume are deactivated in the tick that carries
/// them out; tanks are kept `drive_margin` units away from the edge.
#[derive(Resource, Reflect, Clone, Debug)]
#[reflect(Resource)]
pub struct Battlefield {
    /// Edge length of the square ground plane
    pub size: f32,
    /// Lowest allowed projectile height
    pub floor: f32,
    /// Highest allowed projectile height
    pub ceiling: f32,
    /// Distance tanks and balloons keep from the edge
    pub drive_margin: f32,
}

impl Default for Battlefield {
    fn default() -> Self {
        Self {
            size: 100.0,
            floor: -5.0,
            ceiling: 50.0,
            drive_margin: 10.0,
        }
    }
}

impl Battlefield {
    pub fn half_size(&self) -> f32 {
        self.size * 0.5
    }

    /// Returns `true` while `position` is inside the projectile volume.
    ///
    /// # Example
    /// ```
    /// use bevy::prelude::*;
    /// use bevy_tank_battle::resources::Battlefield;
    ///
    /// let field = Battlefield::default();
    /// assert!(field.contains(Vec3::new(49.0, 0.0, -49.0)));
    /// assert!(!field.contains(Vec3::new(0.0, -5.1, 0.0)));
    /// ```
    pub fn contains(&self, position: Vec3) -> bool {
        let half = self.half_size();
        position.x.abs() <= half
            && position.z.abs() <= half
            && position.y >= self.floor
            && position.y <= self.ceiling
    }

    /// Clamps a ground position into the drivable area.
    pub fn clamp_drivable(&self, position: Vec3) -> Vec3 {
        let limit = (self.half_size() - self.drive_margin).max(0.0);
        Vec3::new(
            position.x.clamp(-limit, limit),
            position.y,
            position.z.clamp(-limit, limit),
        )
    }
}

/// Rule set applied when a match starts.
///
/// Changing this resource mid-match has no effect on the running match:
/// [`crate::match_state::MatchState`] keeps its own copy from the start.
///
/// # Example
/// ```
/// use bevy_tank_battle::resources::GameRules;
/// use bevy_tank_battle::types::GameMode;
///
/// let rules = GameRules::elimination();
/// assert_eq!(rules.mode, GameMode::Elimination);
/// assert_eq!(rules.damage_per_hit, 20);
/// assert!(rules.match_duration.is_none());
/// ```
#[derive(Resource, Reflect, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[reflect(Resource)]
pub struct GameRules {
    pub mode: GameMode,
    /// Countdown length in seconds, `None` for untimed matches
    pub match_duration: Option<f32>,
    /// Health removed from a tank per hit
    pub damage_per_hit: u32,
    pub starting_health: u32,
    pub missile_ammo: u32,
    pub super_bomb_ammo: u32,
    /// Seconds between two shots of the same player
    pub fire_cooldown: f32,
    pub balloon_count: u32,
    /// Base seed for balloon placement, mixed with the match epoch
    pub balloon_seed: u64,
    /// Point values a balloon can carry
    pub balloon_points: Vec<u32>,
}

impl Default for GameRules {
    fn default() -> Self {
        Self::score_attack()
    }
}

impl GameRules {
    /// Single player, 120 second countdown, 10 damage per hit.
    pub fn score_attack() -> Self {
        Self {
            mode: GameMode::ScoreAttack,
            match_duration: Some(120.0),
            damage_per_hit: 10,
            starting_health: 100,
            missile_ammo: 5,
            super_bomb_ammo: 3,
            fire_cooldown: 2.0,
            balloon_count: 20,
            balloon_seed: 0x7a6b_2024,
            balloon_points: vec![10, 15, 20, 25, 30, 50],
        }
    }

    /// Two players taking turns, untimed, 20 damage per hit.
    pub fn elimination() -> Self {
        Self {
            mode: GameMode::Elimination,
            match_duration: None,
            damage_per_hit: 20,
            ..Self::score_attack()
        }
    }

    pub fn with_duration(mut self, seconds: Option<f32>) -> Self {
        self.match_duration = seconds;
        self
    }

    pub fn with_damage_per_hit(mut self, damage: u32) -> Self {
        self.damage_per_hit = damage;
        self
    }

    pub fn with_fire_cooldown(mut self, seconds: f32) -> Self {
        self.fire_cooldown = seconds;
        self
    }

    pub fn with_balloons(mut self, count: u32, seed: u64) -> Self {
        self.balloon_count = count;
        self.balloon_seed = seed;
        self
    }
}

/// Input state for the tank currently under local control.
///
/// Filled by the host input layer (or by
/// [`crate::systems::firing::sample_keyboard_controls`]) and sampled once per
/// frame. `fire` is a level: a shot is requested on its rising edge only.
///
/// # Example
/// ```
/// use bevy_tank_battle::resources::TankControls;
///
/// let mut controls = TankControls::default();
/// controls.set_elevation(2.0);
/// assert_eq!(controls.turret_elevation, TankControls::MAX_ELEVATION);
/// ```
#[derive(Resource, Reflect, Clone, Debug, Default, PartialEq)]
#[reflect(Resource)]
pub struct TankControls {
    /// Fire button held
    pub fire: bool,
    /// Turret yaw relative to the hull (radians)
    pub turret_yaw: f32,
    /// Barrel elevation (radians)
    pub turret_elevation: f32,
    pub selected: BulletKind,
    pub forward: bool,
    pub backward: bool,
    pub turn_left: bool,
    pub turn_right: bool,
}

impl TankControls {
    /// Lowest barrel elevation (-20°)
    pub const MIN_ELEVATION: f32 = -20.0 * std::f32::consts::PI / 180.0;
    /// Highest barrel elevation (90°)
    pub const MAX_ELEVATION: f32 = std::f32::consts::FRAC_PI_2;

    pub fn set_elevation(&mut self, radians: f32) {
        self.turret_elevation = radians.clamp(Self::MIN_ELEVATION, Self::MAX_ELEVATION);
    }

    pub fn select(&mut self, kind: BulletKind) {
        self.selected = kind;
    }
}

/// Debug drawing and aim prediction settings.
#[derive(Resource, Reflect, Clone, Debug)]
#[reflect(Resource)]
pub struct BallisticsConfig {
    /// Draw projectile gizmos
    pub debug_draw: bool,
    /// Draw the predicted trajectory of the active tank
    pub draw_aim_prediction: bool,
    /// Number of prediction samples after the start point
    pub prediction_steps: usize,
    /// Time span covered by the prediction (seconds)
    pub prediction_time: f32,
}

impl Default for BallisticsConfig {
    fn default() -> Self {
        Self {
            debug_draw: true,
            draw_aim_prediction: true,
            prediction_steps: 50,
            prediction_time: 3.0,
        }
    }
}

/// Hands out monotonically increasing projectile ids.
#[derive(Resource, Debug, Default)]
pub struct ProjectileIdAllocator {
    next: u64,
}

impl ProjectileIdAllocator {
    pub fn allocate(&mut self) -> ProjectileId {
        self.next += 1;
        ProjectileId(self.next)
    }
}
