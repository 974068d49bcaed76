//! Match lifecycle, players, ammunition and scoring.
//!
//! [`MatchState`] is the single owner of player health and score. Every
//! mutation goes through its methods, which enforce the gameplay rules:
//! no self-damage, health floored at zero, score only grows while running,
//! and a match completes exactly once.

use std::f32::consts::FRAC_PI_2;

use bevy::prelude::*;
use serde::Serialize;
use thiserror::Error;

use crate::events::MatchOver;
use crate::resources::GameRules;
use crate::scoring::ScoreSubmission;
use crate::types::{AmmoInventory, BulletKind, GameMode, MatchEndReason, MatchPhase, PlayerId};

/// Reasons a fire request is refused.
///
/// Refused requests spawn nothing and change nothing.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireError {
    #[error("no match is running")]
    MatchNotRunning,
    #[error("out of {0:?} ammunition")]
    OutOfAmmo(BulletKind),
    #[error("weapon is cooling down")]
    CoolingDown,
    #[error("fire direction has zero length or is not finite")]
    InvalidDirection,
    #[error("fire origin is not finite")]
    InvalidOrigin,
    #[error("unknown player")]
    UnknownPlayer,
    #[error("it is not this player's turn")]
    NotYourTurn,
}

/// Reasons a match transition is refused.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchError {
    #[error("a match is already running")]
    AlreadyRunning,
}

/// A participant in the current match.
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub position: Vec3,
    /// Hull heading in radians
    pub yaw: f32,
    pub rotation: Quat,
    /// 0..=100
    pub health: u32,
    pub score: u32,
    pub ammo: AmmoInventory,
    pub selected: BulletKind,
    /// Seconds until the next shot is allowed
    pub fire_cooldown: f32,
}

impl Player {
    fn new(id: PlayerId, name: impl Into<String>, position: Vec3, yaw: f32, rules: &GameRules) -> Self {
        Self {
            id,
            name: name.into(),
            position,
            yaw,
            rotation: Quat::from_rotation_y(yaw),
            health: rules.starting_health,
            score: 0,
            ammo: AmmoInventory::new(rules.missile_ammo, rules.super_bomb_ammo),
            selected: BulletKind::Standard,
            fire_cooldown: 0.0,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }
}

/// Read-only view of one player for UI collaborators.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HudSnapshot {
    pub player: PlayerId,
    pub name: String,
    pub phase: MatchPhase,
    pub health: u32,
    pub score: u32,
    /// `None` in untimed matches
    pub time_remaining: Option<f32>,
    pub ammo: AmmoInventory,
    pub selected: BulletKind,
}

/// Result of a damage application that changed health.
#[derive(Debug, Clone, PartialEq)]
pub struct DamageReport {
    pub target: PlayerId,
    pub amount: u32,
    pub health: u32,
    /// Set when the hit ended the match
    pub match_over: Option<MatchOver>,
}

/// The match controller state.
///
/// # Example
/// ```
/// use bevy_tank_battle::match_state::MatchState;
/// use bevy_tank_battle::resources::GameRules;
/// use bevy_tank_battle::types::{BulletKind, MatchPhase};
///
/// let mut state = MatchState::default();
/// state.start("ada", &GameRules::score_attack()).unwrap();
/// assert_eq!(state.phase, MatchPhase::Running);
///
/// let me = state.local_player_id().unwrap();
/// state.try_fire(me, BulletKind::Missile).unwrap();
/// assert_eq!(state.player(me).unwrap().ammo.missiles, 4);
/// ```
#[derive(Resource, Debug, Clone, Default)]
pub struct MatchState {
    pub phase: MatchPhase,
    pub mode: GameMode,
    pub players: Vec<Player>,
    /// Countdown in seconds, `None` when untimed
    pub time_remaining: Option<f32>,
    /// Player whose turn it is (elimination mode)
    pub current_player: PlayerId,
    pub winner: Option<PlayerId>,
    /// Incremented on every start; tags everything the match spawns
    pub epoch: u32,
    /// Set once the final score has been handed to the reporter
    pub score_submitted: bool,
    /// Rules captured at start
    pub rules: GameRules,
}

impl MatchState {
    /// Spawn point of the red tank in elimination mode
    pub const RED_SPAWN: Vec3 = Vec3::new(0.0, 0.5, 5.0);
    /// Spawn point of the blue tank in elimination mode
    pub const BLUE_SPAWN: Vec3 = Vec3::new(5.0, 0.5, 0.0);
    /// Spawn point of the single tank in score attack
    pub const SOLO_SPAWN: Vec3 = Vec3::new(0.0, 0.5, 0.0);

    /// Starts (or restarts) a match and returns its epoch.
    ///
    /// Resets every player, the countdown and the completion guard, and
    /// clears all pending cooldowns. Rejected while a match is running.
    pub fn start(&mut self, player_name: &str, rules: &GameRules) -> Result<u32, MatchError> {
        if self.phase == MatchPhase::Running {
            return Err(MatchError::AlreadyRunning);
        }

        let local = PlayerId(1);
        self.players = match rules.mode {
            GameMode::ScoreAttack => {
                vec![Player::new(local, player_name, Self::SOLO_SPAWN, 0.0, rules)]
            }
            GameMode::Elimination => vec![
                Player::new(local, player_name, Self::RED_SPAWN, 0.0, rules),
                Player::new(PlayerId(2), "Blue", Self::BLUE_SPAWN, -FRAC_PI_2, rules),
            ],
        };

        self.phase = MatchPhase::Running;
        self.mode = rules.mode;
        self.time_remaining = rules.match_duration;
        self.current_player = local;
        self.winner = None;
        self.epoch = self.epoch.wrapping_add(1);
        self.score_submitted = false;
        self.rules = rules.clone();
        Ok(self.epoch)
    }

    pub fn is_running(&self) -> bool {
        self.phase == MatchPhase::Running
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    /// The player at this machine's keyboard, whose score gets submitted.
    pub fn local_player_id(&self) -> Option<PlayerId> {
        self.players.first().map(|p| p.id)
    }

    /// The player the shared controls currently drive.
    pub fn active_player_id(&self) -> Option<PlayerId> {
        match self.mode {
            GameMode::ScoreAttack => self.local_player_id(),
            GameMode::Elimination => self.player(self.current_player).map(|p| p.id),
        }
    }

    /// Validates a shot and, on success, consumes one round and starts the
    /// cooldown.
    pub fn try_fire(&mut self, player: PlayerId, kind: BulletKind) -> Result<(), FireError> {
        if !self.is_running() {
            return Err(FireError::MatchNotRunning);
        }
        if self.mode == GameMode::Elimination && player != self.current_player {
            return Err(FireError::NotYourTurn);
        }

        let cooldown = self.rules.fire_cooldown;
        let shooter = self.player_mut(player).ok_or(FireError::UnknownPlayer)?;
        if shooter.fire_cooldown > 0.0 {
            return Err(FireError::CoolingDown);
        }
        if !shooter.ammo.try_consume(kind) {
            return Err(FireError::OutOfAmmo(kind));
        }
        shooter.fire_cooldown = cooldown;
        Ok(())
    }

    pub fn select_bullet(&mut self, player: PlayerId, kind: BulletKind) {
        if let Some(p) = self.player_mut(player) {
            p.selected = kind;
        }
    }

    /// Applies one hit of `amount` damage from `attacker` to `target`.
    ///
    /// Returns `None` when nothing changed: the match is not running, the
    /// target is unknown, or the attacker hit their own tank. In elimination
    /// mode a hit that empties the target's health ends the match with the
    /// attacker as winner; any other hit passes the turn.
    pub fn apply_damage(&mut self, target: PlayerId, attacker: PlayerId, amount: u32) -> Option<DamageReport> {
        if !self.is_running() || target == attacker {
            return None;
        }

        let victim = self.player_mut(target)?;
        victim.health = victim.health.saturating_sub(amount);
        let health = victim.health;
        let alive = victim.is_alive();

        let match_over = match self.mode {
            GameMode::Elimination if !alive => {
                let winner = self.other_player(target);
                self.finish(MatchEndReason::Eliminated, winner)
            }
            GameMode::Elimination => {
                self.pass_turn();
                None
            }
            GameMode::ScoreAttack => None,
        };

        Some(DamageReport {
            target,
            amount,
            health,
            match_over,
        })
    }

    /// Adds balloon points to a player's score. Only while running.
    pub fn award_points(&mut self, player: PlayerId, points: u32) -> bool {
        if !self.is_running() {
            return false;
        }
        match self.player_mut(player) {
            Some(p) => {
                p.score = p.score.saturating_add(points);
                true
            }
            None => false,
        }
    }

    /// Counts the match timer down and ends a timed match at zero.
    pub fn advance_clock(&mut self, dt: f32) -> Option<MatchOver> {
        if !self.is_running() {
            return None;
        }
        let remaining = self.time_remaining.as_mut()?;
        *remaining = (*remaining - dt).max(0.0);
        if *remaining > 0.0 {
            return None;
        }
        self.finish(MatchEndReason::TimeUp, None)
    }

    pub fn tick_cooldowns(&mut self, dt: f32) {
        for player in &mut self.players {
            player.fire_cooldown = (player.fire_cooldown - dt).max(0.0);
        }
    }

    /// Ends the running match. Returns `None` if it was not running, so a
    /// second completion trigger in the same tick is a no-op.
    pub fn finish(&mut self, reason: MatchEndReason, winner: Option<PlayerId>) -> Option<MatchOver> {
        if !self.is_running() {
            return None;
        }
        self.phase = MatchPhase::Over;
        self.winner = winner;

        let local = self.players.first();
        Some(MatchOver {
            epoch: self.epoch,
            reason,
            winner,
            player_name: local.map(|p| p.name.clone()).unwrap_or_default(),
            final_score: local.map_or(0, |p| p.score),
        })
    }

    /// Hands out the final score exactly once per finished match.
    pub fn take_submission(&mut self) -> Option<ScoreSubmission> {
        if self.phase != MatchPhase::Over || self.score_submitted {
            return None;
        }
        let local = self.players.first()?;
        self.score_submitted = true;
        Some(ScoreSubmission::new(local.name.clone(), local.score))
    }

    pub fn update_player_pose(&mut self, player: PlayerId, position: Vec3, yaw: f32) {
        if let Some(p) = self.player_mut(player) {
            p.position = position;
            p.yaw = yaw;
            p.rotation = Quat::from_rotation_y(yaw);
        }
    }

    pub fn hud(&self, player: PlayerId) -> Option<HudSnapshot> {
        let p = self.player(player)?;
        Some(HudSnapshot {
            player: p.id,
            name: p.name.clone(),
            phase: self.phase,
            health: p.health,
            score: p.score,
            time_remaining: self.time_remaining,
            ammo: p.ammo,
            selected: p.selected,
        })
    }

    fn other_player(&self, id: PlayerId) -> Option<PlayerId> {
        self.players.iter().map(|p| p.id).find(|&other| other != id)
    }

    fn pass_turn(&mut self) {
        if let Some(next) = self.other_player(self.current_player) {
            self.current_player = next;
        }
    }
}
