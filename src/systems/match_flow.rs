//! Match flow - start and restart, countdown, completion and cleanup.

use bevy::ecs::message::{MessageReader, MessageWriter};
use bevy::prelude::*;

use crate::components::{MatchScoped, Tank};
use crate::events::{MatchOver, MatchStarted, StartMatchRequest};
use crate::match_state::MatchState;
use crate::resources::GameRules;
use crate::scoring::ScoreReporter;
use crate::types::BodyTag;

/// Start a match for every [`StartMatchRequest`].
///
/// A request while a match is running is rejected and logged; the running
/// match is untouched.
pub fn handle_start_requests(
    mut requests: MessageReader<StartMatchRequest>,
    rules: Res<GameRules>,
    mut match_state: ResMut<MatchState>,
    mut started: MessageWriter<MatchStarted>,
) {
    for request in requests.read() {
        match match_state.start(&request.player_name, &rules) {
            Ok(epoch) => {
                info!(
                    "match {epoch} started for {} ({:?})",
                    request.player_name, rules.mode
                );
                started.write(MatchStarted {
                    epoch,
                    mode: rules.mode,
                });
            }
            Err(err) => warn!("start request from {} ignored: {err}", request.player_name),
        }
    }
}

/// Despawn everything left over from previous matches.
///
/// Runs on [`MatchStarted`], so pending effects of an old match can never
/// reach the new one.
pub fn despawn_stale_match_entities(
    mut commands: Commands,
    mut started: MessageReader<MatchStarted>,
    scoped: Query<(Entity, &MatchScoped)>,
) {
    let Some(current) = started.read().map(|s| s.epoch).last() else {
        return;
    };

    let mut removed = 0;
    for (entity, scope) in scoped.iter() {
        if scope.epoch != current {
            commands.entity(entity).despawn();
            removed += 1;
        }
    }
    if removed > 0 {
        debug!("removed {removed} entities from earlier matches");
    }
}

/// Spawn one tank per player at its starting pose.
pub fn spawn_match_tanks(
    mut commands: Commands,
    mut started: MessageReader<MatchStarted>,
    match_state: Res<MatchState>,
) {
    if started.read().last().is_none() {
        return;
    }

    for player in &match_state.players {
        commands.spawn((
            Tank {
                owner: player.id,
                yaw: player.yaw,
            },
            BodyTag::Tank { owner: player.id },
            Transform::from_translation(player.position).with_rotation(player.rotation),
            MatchScoped {
                epoch: match_state.epoch,
            },
        ));
    }
}

/// Count down the match timer and every fire cooldown.
pub fn tick_match_clock(
    time: Res<Time>,
    mut match_state: ResMut<MatchState>,
    mut over: MessageWriter<MatchOver>,
) {
    if !match_state.is_running() {
        return;
    }
    let dt = time.delta_secs();
    match_state.tick_cooldowns(dt);

    if let Some(result) = match_state.advance_clock(dt) {
        info!(
            "match {} over: time up, final score {}",
            result.epoch, result.final_score
        );
        over.write(result);
    }
}

/// Hand the final score of a finished match to the reporter, once.
///
/// Extra completion messages for the same match are no-ops; so are
/// messages from a match that has since been restarted.
pub fn submit_final_score(
    mut over: MessageReader<MatchOver>,
    mut match_state: ResMut<MatchState>,
    mut reporter: Option<ResMut<ScoreReporter>>,
) {
    for result in over.read() {
        if result.epoch != match_state.epoch {
            continue;
        }
        let Some(submission) = match_state.take_submission() else {
            continue;
        };
        match reporter.as_deref_mut() {
            Some(reporter) => {
                reporter.report(submission);
            }
            None => warn!("no score reporter installed, dropping {submission:?}"),
        }
    }
}
