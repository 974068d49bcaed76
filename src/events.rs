//! Messages exchanged between the simulation and its collaborators.
//!
//! Note: In Bevy 0.18, buffered events use the `Message` trait instead of `Event`.

use bevy::ecs::message::Message;
use bevy::prelude::*;

use crate::types::{
    BalloonId, BodyTag, BulletKind, GameMode, MatchEndReason, PlayerId, ProjectileBody,
    ProjectileId, ProjectileKind,
};

/// Request to fire a shot, produced from the rising edge of the fire control.
///
/// The request is validated against the match state before anything spawns:
/// an exhausted ammo kind, an active cooldown or a zero direction drop it.
///
/// # Example
/// ```
/// use bevy::prelude::*;
/// use bevy_tank_battle::events::FireRequest;
/// use bevy_tank_battle::types::{BulletKind, PlayerId};
///
/// let request = FireRequest::new(PlayerId(1), Vec3::new(0.0, 2.0, -2.5), Vec3::NEG_Z)
///     .with_kind(BulletKind::Missile);
/// assert_eq!(request.kind, BulletKind::Missile);
/// ```
#[derive(Message, Clone, Debug)]
pub struct FireRequest {
    pub player: PlayerId,
    pub kind: BulletKind,
    /// Muzzle position
    pub origin: Vec3,
    /// Launch direction, normalized when the projectile is created
    pub direction: Vec3,
}

impl FireRequest {
    pub fn new(player: PlayerId, origin: Vec3, direction: Vec3) -> Self {
        Self {
            player,
            kind: BulletKind::Standard,
            origin,
            direction,
        }
    }

    pub fn with_kind(mut self, kind: BulletKind) -> Self {
        self.kind = kind;
        self
    }
}

/// Emitted for every projectile entity created, including submissiles.
///
/// Physics hosts use `body` to attach a collider with the right radius and
/// collision filter on a kinematic or sensor body. The crate moves the
/// projectile every fixed step, so a dynamic body would integrate it twice.
#[derive(Message, Clone, Debug)]
pub struct ProjectileSpawned {
    pub entity: Entity,
    pub id: ProjectileId,
    pub kind: ProjectileKind,
    pub owner: PlayerId,
    pub origin: Vec3,
    pub velocity: Vec3,
    pub body: ProjectileBody,
}

/// Contact between a projectile and another body.
///
/// Written by the built-in ray cast detection or by a host physics engine.
/// The tag is resolved once, here; untagged bodies are reported as
/// [`BodyTag::Terrain`].
#[derive(Message, Clone, Copy, Debug)]
pub struct ProjectileContact {
    pub projectile: Entity,
    pub tag: BodyTag,
    /// World-space contact point
    pub point: Vec3,
}

/// Fire and smoke shown at an impact point.
#[derive(Message, Clone, Copy, Debug, PartialEq)]
pub struct ImpactEffect {
    pub point: Vec3,
    pub kind: ProjectileKind,
    pub scale: f32,
    /// Seconds the effect stays alive
    pub duration: f32,
}

/// A tank took damage from another player's projectile.
#[derive(Message, Clone, Copy, Debug)]
pub struct TankHit {
    pub target: PlayerId,
    pub attacker: PlayerId,
    pub amount: u32,
    /// Health after the hit
    pub health: u32,
}

/// A projectile struck a balloon; the balloon system decides the outcome.
#[derive(Message, Clone, Copy, Debug)]
pub struct BalloonStruck {
    pub balloon: BalloonId,
    /// Owner of the projectile
    pub by: PlayerId,
}

/// A balloon burst and its points were awarded.
#[derive(Message, Clone, Copy, Debug)]
pub struct BalloonBurst {
    pub balloon: BalloonId,
    pub player: PlayerId,
    pub points: u32,
    pub position: Vec3,
}

/// A super bomb secondary blast went off. Purely cosmetic.
#[derive(Message, Clone, Copy, Debug)]
pub struct BlastDetonated {
    pub position: Vec3,
    pub scale: f32,
}

/// Host request to start or restart a match.
#[derive(Message, Clone, Debug)]
pub struct StartMatchRequest {
    pub player_name: String,
}

impl StartMatchRequest {
    pub fn new(player_name: impl Into<String>) -> Self {
        Self {
            player_name: player_name.into(),
        }
    }
}

/// A match entered the running phase.
#[derive(Message, Clone, Copy, Debug)]
pub struct MatchStarted {
    pub epoch: u32,
    pub mode: GameMode,
}

/// A match ended. Written exactly once per match.
#[derive(Message, Clone, Debug, PartialEq)]
pub struct MatchOver {
    pub epoch: u32,
    pub reason: MatchEndReason,
    pub winner: Option<PlayerId>,
    /// Local player's name
    pub player_name: String,
    /// Local player's final score
    pub final_score: u32,
}
