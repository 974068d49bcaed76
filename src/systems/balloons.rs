//! Balloon field generation and burst scoring.

use bevy::ecs::message::{MessageReader, MessageWriter};
use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::components::{Balloon, BurstLabel, MatchScoped};
use crate::events::{BalloonBurst, BalloonStruck, MatchStarted};
use crate::match_state::MatchState;
use crate::resources::{Battlefield, GameRules};
use crate::types::{BalloonId, BodyTag};

/// Lowest balloon height.
pub const MIN_HEIGHT: f32 = 15.0;
/// Highest balloon height.
pub const MAX_HEIGHT: f32 = 25.0;

/// Placement of one balloon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BalloonPlacement {
    pub id: BalloonId,
    pub position: Vec3,
    pub points: u32,
}

/// Lay out the balloons for a match.
///
/// Balloons sit on a square grid covering the drivable area, each jittered
/// within its cell, floating between [`MIN_HEIGHT`] and [`MAX_HEIGHT`]. The
/// layout only depends on the rules, the battlefield and `epoch`.
///
/// # Arguments
/// * `rules` - Balloon count, seed and point values
/// * `battlefield` - Area to cover
/// * `epoch` - Match number, mixed into the seed
///
/// # Returns
/// One placement per balloon, ids starting at 1
pub fn generate_balloon_field(rules: &GameRules, battlefield: &Battlefield, epoch: u32) -> Vec<BalloonPlacement> {
    let count = rules.balloon_count as usize;
    if count == 0 {
        return Vec::new();
    }

    let mut rng = StdRng::seed_from_u64(rules.balloon_seed.wrapping_add(u64::from(epoch)));
    let columns = (count as f32).sqrt().ceil() as usize;
    let rows = count.div_ceil(columns);
    let extent = (battlefield.half_size() - battlefield.drive_margin).max(1.0);
    let cell_w = 2.0 * extent / columns as f32;
    let cell_d = 2.0 * extent / rows as f32;

    (0..count)
        .map(|i| {
            let (col, row) = (i % columns, i / columns);
            let x = -extent + cell_w * (col as f32 + rng.random_range(0.2..0.8));
            let z = -extent + cell_d * (row as f32 + rng.random_range(0.2..0.8));
            let y = rng.random_range(MIN_HEIGHT..=MAX_HEIGHT);
            let points = if rules.balloon_points.is_empty() {
                10
            } else {
                rules.balloon_points[rng.random_range(0..rules.balloon_points.len())]
            };
            BalloonPlacement {
                id: BalloonId(i as u32 + 1),
                position: Vec3::new(x, y, z),
                points,
            }
        })
        .collect()
}

/// Populate the battlefield with balloons when a match starts.
pub fn spawn_balloon_field(
    mut commands: Commands,
    mut started: MessageReader<MatchStarted>,
    rules: Res<GameRules>,
    battlefield: Res<Battlefield>,
) {
    let Some(epoch) = started.read().map(|s| s.epoch).last() else {
        return;
    };

    let field = generate_balloon_field(&rules, &battlefield, epoch);
    debug!("spawning {} balloons for match {epoch}", field.len());
    for placement in field {
        commands.spawn((
            Balloon::new(placement.id, placement.points),
            BodyTag::Balloon { id: placement.id },
            Transform::from_translation(placement.position),
            MatchScoped { epoch },
        ));
    }
}

/// Burst struck balloons and award their points to the shooter.
///
/// A balloon bursts once; later strikes on the same id are no-ops, and so
/// are strikes that land after the match is over.
pub fn burst_struck_balloons(
    mut commands: Commands,
    mut struck: MessageReader<BalloonStruck>,
    mut balloons: Query<(Entity, &mut Balloon, &Transform, &MatchScoped)>,
    mut match_state: ResMut<MatchState>,
    mut bursts: MessageWriter<BalloonBurst>,
) {
    for strike in struck.read() {
        if !match_state.is_running() {
            debug!("{:?} struck after the match ended, ignored", strike.balloon);
            continue;
        }
        let epoch = match_state.epoch;
        let Some((entity, mut balloon, transform, _)) = balloons
            .iter_mut()
            .find(|(_, b, _, scope)| b.id == strike.balloon && scope.epoch == epoch)
        else {
            continue;
        };
        let Some(points) = balloon.burst() else {
            continue;
        };

        if !match_state.award_points(strike.by, points) {
            continue;
        }
        debug!("{:?} popped {:?} for {points}", strike.by, strike.balloon);

        let position = transform.translation;
        commands.entity(entity).despawn();
        commands.spawn((
            BurstLabel::new(points),
            Transform::from_translation(position),
            MatchScoped { epoch },
        ));

        bursts.write(BalloonBurst {
            balloon: strike.balloon,
            player: strike.by,
            points,
            position,
        });
    }
}
