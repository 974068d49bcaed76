//! # Bevy Tank Battle
//!
//! Gameplay core of a 3D tank battle for Bevy 0.18.
//!
//! ## Features
//! - Powered missiles and ballistic shells with velocity-aligned orientation
//! - Cluster missiles that split into submissiles on impact
//! - Super bombs with staggered cosmetic secondary blasts
//! - Impact resolution against tanks, balloons and static scenery
//! - Score attack (timed) and elimination (turn based) matches
//! - Exactly-once final score reporting
//! - Analytic trajectory prediction for aiming
//!
//! ## Quick Start
//! ```rust,no_run
//! use bevy::ecs::message::MessageWriter;
//! use bevy::prelude::*;
//! use bevy_tank_battle::prelude::*;
//!
//! fn main() {
//!     App::new()
//!         .add_plugins(DefaultPlugins)
//!         .add_plugins(TankBattlePluginGroup)
//!         .add_systems(Startup, |mut start: MessageWriter<StartMatchRequest>| {
//!             start.write(StartMatchRequest::new("player"));
//!         })
//!         .run();
//! }
//! ```

pub mod components;
pub mod events;
pub mod match_state;
pub mod resources;
pub mod scoring;
pub mod systems;
pub mod types;

pub mod prelude {
    pub use crate::components::*;
    pub use crate::events::*;
    pub use crate::match_state::{FireError, HudSnapshot, MatchError, MatchState, Player};
    pub use crate::resources::*;
    pub use crate::scoring::{LogScoreSink, ScoreReporter, ScoreSink, ScoreSubmission, SubmitError};
    pub use crate::types::*;
    pub use crate::{
        BallisticsCorePlugin, BallisticsDebugPlugin, BallisticsSet, EffectsPlugin,
        KeyboardControlsPlugin, MatchPlugin, TankBattlePluginGroup,
    };
}

use bevy::prelude::*;

/// Ordering of the fixed-step projectile pipeline.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum BallisticsSet {
    /// Velocity, position, orientation, lifetime and bounds
    Integrate,
    /// Ray casts producing [`events::ProjectileContact`]
    DetectContacts,
    /// Contacts turned into damage, scores and secondary spawns
    ResolveImpacts,
    /// Removal of deactivated projectiles
    Cleanup,
}

/// Main plugin group that includes all gameplay subsystems.
///
/// This plugin group bundles together:
/// - Projectile flight, contact detection and impact resolution
/// - Match lifecycle, firing and balloon scoring
/// - Keyboard sampling into [`resources::TankControls`]
/// - Effect timers
///
/// Hosts that fill `TankControls` themselves disable the keyboard plugin:
/// ```
/// use bevy::prelude::*;
/// use bevy_tank_battle::prelude::*;
///
/// App::new()
///     .add_plugins(MinimalPlugins)
///     .add_plugins(TankBattlePluginGroup.build().disable::<KeyboardControlsPlugin>());
/// ```
#[derive(Default)]
pub struct TankBattlePluginGroup;

impl PluginGroup for TankBattlePluginGroup {
    /// Builds the plugin group by adding all gameplay plugins.
    ///
    /// # Returns
    /// A PluginGroupBuilder with the core, match, keyboard and effects plugins
    fn build(self) -> bevy::app::PluginGroupBuilder {
        bevy::app::PluginGroupBuilder::start::<Self>()
            .add(BallisticsCorePlugin)
            .add(MatchPlugin)
            .add(KeyboardControlsPlugin)
            .add(EffectsPlugin)
    }
}

/// Projectile flight and impact plugin.
///
/// # Systems
/// - `update_projectiles_kinematics` - Advances every live projectile
/// - `detect_projectile_contacts` - Ray casts between frames (`dim3` only)
/// - `resolve_projectile_impacts` - Applies damage, balloon strikes and secondary spawns
/// - `despawn_inactive_projectiles` - Removes finished projectiles
pub struct BallisticsCorePlugin;

impl Plugin for BallisticsCorePlugin {
    /// Registers components, resources and messages and schedules the
    /// fixed-step pipeline.
    ///
    /// # Arguments
    /// * `app` - Mutable reference to the Bevy App
    fn build(&self, app: &mut App) {
        app.register_type::<components::Projectile>()
            .register_type::<components::MatchScoped>()
            .register_type::<components::ImpactFire>()
            .register_type::<components::SecondaryBlast>()
            .register_type::<types::BodyTag>()
            .register_type::<types::ProjectileBody>()
            .register_type::<resources::BallisticsEnvironment>()
            .register_type::<resources::Battlefield>()
            .init_resource::<resources::BallisticsEnvironment>()
            .init_resource::<resources::Battlefield>()
            .init_resource::<resources::ProjectileIdAllocator>()
            .init_resource::<match_state::MatchState>()
            .add_message::<events::ProjectileSpawned>()
            .add_message::<events::ProjectileContact>()
            .add_message::<events::ImpactEffect>()
            .add_message::<events::TankHit>()
            .add_message::<events::BalloonStruck>()
            .add_message::<events::MatchOver>()
            .configure_sets(
                FixedUpdate,
                (
                    BallisticsSet::Integrate,
                    BallisticsSet::DetectContacts,
                    BallisticsSet::ResolveImpacts,
                    BallisticsSet::Cleanup,
                )
                    .chain(),
            )
            .add_systems(
                FixedUpdate,
                (
                    systems::kinematics::update_projectiles_kinematics.in_set(BallisticsSet::Integrate),
                    systems::impact::resolve_projectile_impacts.in_set(BallisticsSet::ResolveImpacts),
                    systems::impact::despawn_inactive_projectiles.in_set(BallisticsSet::Cleanup),
                ),
            );

        // 3D Physics Systems
        #[cfg(feature = "dim3")]
        {
            use avian3d::prelude::SpatialQueryPipeline;
            app.add_systems(
                FixedUpdate,
                systems::collision::detect_projectile_contacts
                    .in_set(BallisticsSet::DetectContacts)
                    .run_if(resource_exists::<SpatialQueryPipeline>),
            );
        }
    }
}

/// Match lifecycle, firing and balloon plugin.
///
/// # Systems
/// - `handle_start_requests` - Starts and restarts matches
/// - `despawn_stale_match_entities` - Clears the previous match
/// - `spawn_match_tanks` / `spawn_balloon_field` - Populates a new match
/// - `tick_match_clock` - Countdown and fire cooldowns
/// - `drive_active_tank` - Moves the controlled tank
/// - `emit_fire_requests` / `spawn_requested_projectiles` - Shooting
/// - `submit_final_score` - Exactly-once score reporting
/// - `burst_struck_balloons` - Balloon scoring (fixed step)
pub struct MatchPlugin;

impl Plugin for MatchPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<components::Tank>()
            .register_type::<components::Balloon>()
            .register_type::<components::BurstLabel>()
            .register_type::<resources::GameRules>()
            .register_type::<resources::TankControls>()
            .init_resource::<resources::GameRules>()
            .init_resource::<resources::TankControls>()
            .init_resource::<resources::ProjectileIdAllocator>()
            .init_resource::<match_state::MatchState>()
            .init_resource::<scoring::ScoreReporter>()
            .add_message::<events::StartMatchRequest>()
            .add_message::<events::MatchStarted>()
            .add_message::<events::MatchOver>()
            .add_message::<events::FireRequest>()
            .add_message::<events::ProjectileSpawned>()
            .add_message::<events::BalloonStruck>()
            .add_message::<events::BalloonBurst>()
            .add_systems(
                Update,
                (
                    systems::match_flow::handle_start_requests,
                    systems::match_flow::despawn_stale_match_entities,
                    systems::match_flow::spawn_match_tanks,
                    systems::balloons::spawn_balloon_field,
                    systems::match_flow::tick_match_clock,
                    systems::firing::drive_active_tank,
                    systems::firing::emit_fire_requests,
                    systems::firing::spawn_requested_projectiles,
                    systems::match_flow::submit_final_score,
                )
                    .chain(),
            )
            .add_systems(
                FixedUpdate,
                systems::balloons::burst_struck_balloons
                    .in_set(BallisticsSet::ResolveImpacts)
                    .after(systems::impact::resolve_projectile_impacts),
            );
    }
}

/// Keyboard sampling into [`resources::TankControls`].
///
/// Only runs when the host provides `ButtonInput<KeyCode>`.
pub struct KeyboardControlsPlugin;

impl Plugin for KeyboardControlsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<resources::TankControls>().add_systems(
            Update,
            systems::firing::sample_keyboard_controls
                .run_if(resource_exists::<ButtonInput<KeyCode>>)
                .before(systems::firing::drive_active_tank),
        );
    }
}

/// Effect timer plugin (impact fires, secondary blasts, burst labels).
pub struct EffectsPlugin;

impl Plugin for EffectsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<match_state::MatchState>()
            .add_message::<events::BlastDetonated>()
            .add_systems(
                Update,
                (
                    systems::effects::update_impact_fires,
                    systems::effects::detonate_secondary_blasts,
                    systems::effects::fade_burst_labels,
                )
                    .after(systems::match_flow::despawn_stale_match_entities),
            );
    }
}

/// Debug plugin drawing projectiles and the aim prediction with gizmos.
///
/// Not part of [`TankBattlePluginGroup`]; needs the gizmo plugin from
/// `DefaultPlugins`.
pub struct BallisticsDebugPlugin;

impl Plugin for BallisticsDebugPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<resources::BallisticsConfig>()
            .register_type::<resources::BallisticsConfig>()
            .add_systems(
                Update,
                (
                    systems::debug::draw_projectile_debug,
                    systems::debug::draw_aim_prediction,
                ),
            );
    }
}
