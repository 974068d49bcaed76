//! Effect timers - impact fires, staggered super bomb blasts and burst labels.
//!
//! Only lifetimes live here. Hosts render the entities or listen to the
//! messages; nothing in this module touches health or score.

use bevy::ecs::message::MessageWriter;
use bevy::prelude::*;

use crate::components::{BurstLabel, ImpactFire, MatchScoped, SecondaryBlast};
use crate::events::BlastDetonated;
use crate::match_state::MatchState;

/// Count down impact fires and remove the burnt-out ones.
pub fn update_impact_fires(
    mut commands: Commands,
    time: Res<Time>,
    mut fires: Query<(Entity, &mut ImpactFire)>,
) {
    let dt = time.delta_secs();
    for (entity, mut fire) in fires.iter_mut() {
        fire.remaining -= dt;
        if fire.remaining <= 0.0 {
            commands.entity(entity).despawn();
        }
    }
}

/// Detonate secondary blasts whose delay elapsed.
///
/// Blasts belonging to an older match are dropped without detonating.
///
/// # Arguments
/// * `commands` - Bevy Commands for despawning
/// * `time` - Frame time
/// * `match_state` - Current match epoch
/// * `blasts` - Pending blasts
/// * `detonated` - Writer for [`BlastDetonated`]
pub fn detonate_secondary_blasts(
    mut commands: Commands,
    time: Res<Time>,
    match_state: Res<MatchState>,
    mut blasts: Query<(Entity, &mut SecondaryBlast, &Transform, &MatchScoped)>,
    mut detonated: MessageWriter<BlastDetonated>,
) {
    let dt = time.delta_secs();
    for (entity, mut blast, transform, scope) in blasts.iter_mut() {
        if scope.epoch != match_state.epoch {
            commands.entity(entity).despawn();
            continue;
        }

        blast.delay -= dt;
        if blast.delay > 0.0 {
            continue;
        }

        detonated.write(BlastDetonated {
            position: transform.translation,
            scale: blast.scale,
        });
        commands.spawn((
            ImpactFire {
                scale: blast.scale,
                remaining: 1.5,
            },
            Transform::from_translation(transform.translation),
            *scope,
        ));
        commands.entity(entity).despawn();
    }
}

/// Fade out "+points" labels.
pub fn fade_burst_labels(
    mut commands: Commands,
    time: Res<Time>,
    match_state: Res<MatchState>,
    mut labels: Query<(Entity, &mut BurstLabel, &MatchScoped)>,
) {
    let dt = time.delta_secs();
    for (entity, mut label, scope) in labels.iter_mut() {
        label.remaining -= dt;
        if label.remaining <= 0.0 || scope.epoch != match_state.epoch {
            commands.entity(entity).despawn();
        }
    }
}
