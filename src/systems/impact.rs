//! Impact resolution - turns projectile contacts into gameplay effects.

use bevy::ecs::message::{MessageReader, MessageWriter};
use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use crate::components::{ImpactFire, MatchScoped, Projectile, SecondaryBlast};
use crate::events::{BalloonStruck, ImpactEffect, MatchOver, ProjectileContact, ProjectileSpawned, TankHit};
use crate::match_state::MatchState;
use crate::resources::ProjectileIdAllocator;
use crate::systems::firing::{spawn_projectile, ProjectileLaunch};
use crate::types::{BalloonId, BodyTag, PlayerId, ProjectileKind};

/// Direction offsets added to a missile's launch direction for its submissiles.
pub const SUBMISSILE_OFFSETS: [Vec3; 5] = [
    Vec3::new(0.2, 0.1, 0.2),
    Vec3::new(-0.2, 0.1, -0.2),
    Vec3::new(0.3, -0.1, -0.1),
    Vec3::new(-0.3, -0.1, 0.1),
    Vec3::new(0.0, 0.3, 0.0),
];

/// Distance of the outer super bomb blasts from the impact point.
pub const BLAST_SPACING: f32 = 5.0;
/// Delay between consecutive super bomb blasts (seconds).
pub const BLAST_STAGGER: f32 = 0.2;

/// What the resolver needs to know about the projectile that hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImpactSnapshot {
    pub kind: ProjectileKind,
    pub owner: PlayerId,
    /// Unit launch direction
    pub direction: Vec3,
    /// World-space contact point
    pub point: Vec3,
}

impl ImpactSnapshot {
    pub fn of(projectile: &Projectile, point: Vec3) -> Self {
        Self {
            kind: projectile.kind,
            owner: projectile.owner,
            direction: projectile.direction,
            point,
        }
    }
}

/// Health removal requested by an impact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Damage {
    pub target: PlayerId,
    pub attacker: PlayerId,
    pub amount: u32,
}

/// One cosmetic secondary blast of a super bomb.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlastPlan {
    pub position: Vec3,
    /// Seconds after the impact
    pub delay: f32,
    pub scale: f32,
}

/// Everything an impact causes. The projectile always deactivates.
#[derive(Debug, Clone, PartialEq)]
pub struct ImpactOutcome {
    pub damage: Option<Damage>,
    pub balloon: Option<BalloonId>,
    pub effect: ImpactEffect,
    /// Launch directions of submissiles to spawn at the impact point
    pub submissiles: Vec<Vec3>,
    pub blasts: Vec<BlastPlan>,
}

/// Decide what a contact between a projectile and a tagged body does.
///
/// Tanks take `damage_per_hit` unless they belong to the shooter. Balloons
/// are reported so the balloon system can burst and score them. Houses,
/// bunkers, barriers and terrain have no gameplay effect. Every impact leaves
/// a fire effect sized by projectile kind; missiles additionally fan out into
/// submissiles and super bombs schedule their secondary blasts.
///
/// # Arguments
/// * `snapshot` - The projectile at the moment of impact
/// * `tag` - Gameplay tag of the other body
/// * `damage_per_hit` - Damage a tank takes from one hit
///
/// # Returns
/// The complete outcome to apply
///
/// # Example
/// ```
/// use bevy::prelude::*;
/// use bevy_tank_battle::systems::impact::{resolve_impact, ImpactSnapshot};
/// use bevy_tank_battle::types::{BodyTag, PlayerId, ProjectileKind};
///
/// let shot = ImpactSnapshot {
///     kind: ProjectileKind::Standard,
///     owner: PlayerId(1),
///     direction: Vec3::NEG_Z,
///     point: Vec3::ZERO,
/// };
/// let own = resolve_impact(&shot, BodyTag::Tank { owner: PlayerId(1) }, 10);
/// assert!(own.damage.is_none());
/// let enemy = resolve_impact(&shot, BodyTag::Tank { owner: PlayerId(2) }, 10);
/// assert_eq!(enemy.damage.unwrap().amount, 10);
/// ```
pub fn resolve_impact(snapshot: &ImpactSnapshot, tag: BodyTag, damage_per_hit: u32) -> ImpactOutcome {
    let damage = match tag {
        BodyTag::Tank { owner } if owner != snapshot.owner => Some(Damage {
            target: owner,
            attacker: snapshot.owner,
            amount: damage_per_hit,
        }),
        _ => None,
    };

    let balloon = match tag {
        BodyTag::Balloon { id } => Some(id),
        _ => None,
    };

    let (scale, duration) = snapshot.kind.impact_effect();
    let effect = ImpactEffect {
        point: snapshot.point,
        kind: snapshot.kind,
        scale,
        duration,
    };

    let submissiles = match snapshot.kind {
        ProjectileKind::Missile => submissile_directions(snapshot.direction).to_vec(),
        _ => Vec::new(),
    };

    let blasts = match snapshot.kind {
        ProjectileKind::SuperBomb => secondary_blast_pattern(snapshot.point).to_vec(),
        _ => Vec::new(),
    };

    ImpactOutcome {
        damage,
        balloon,
        effect,
        submissiles,
        blasts,
    }
}

/// Unit directions of the five submissiles released by a missile.
///
/// A perturbed direction that sums to zero falls back to world up.
pub fn submissile_directions(direction: Vec3) -> [Vec3; 5] {
    SUBMISSILE_OFFSETS.map(|offset| (direction + offset).normalize_or(Vec3::Y))
}

/// The cross of secondary blasts around a super bomb impact.
///
/// Center first, then ±X and ±Z at [`BLAST_SPACING`], each delayed by
/// `index * BLAST_STAGGER`.
pub fn secondary_blast_pattern(center: Vec3) -> [BlastPlan; 5] {
    let offsets = [
        Vec3::ZERO,
        Vec3::X * BLAST_SPACING,
        Vec3::NEG_X * BLAST_SPACING,
        Vec3::Z * BLAST_SPACING,
        Vec3::NEG_Z * BLAST_SPACING,
    ];

    let mut index = 0;
    offsets.map(|offset| {
        let blast = BlastPlan {
            position: center + offset,
            delay: index as f32 * BLAST_STAGGER,
            scale: if index == 0 { 3.0 } else { 2.5 },
        };
        index += 1;
        blast
    })
}

/// Message writers touched while applying impacts.
#[derive(SystemParam)]
pub struct ImpactMessages<'w> {
    spawned: MessageWriter<'w, ProjectileSpawned>,
    effects: MessageWriter<'w, ImpactEffect>,
    hits: MessageWriter<'w, TankHit>,
    struck: MessageWriter<'w, BalloonStruck>,
    over: MessageWriter<'w, MatchOver>,
}

/// Apply every projectile contact reported this tick.
///
/// The first contact of a projectile deactivates it; later contacts of the
/// same projectile in the same tick are ignored. Projectiles from an older
/// match only deactivate.
///
/// # Arguments
/// * `commands` - Bevy Commands for spawning submissiles and effects
/// * `contacts` - Contacts from ray casts or the host physics engine
/// * `projectiles` - Query for projectile state and match tag
/// * `match_state` - Receives damage
/// * `ids` - Id source for submissiles
/// * `messages` - Outgoing gameplay messages
pub fn resolve_projectile_impacts(
    mut commands: Commands,
    mut contacts: MessageReader<ProjectileContact>,
    mut projectiles: Query<(&mut Projectile, Option<&MatchScoped>)>,
    mut match_state: ResMut<MatchState>,
    mut ids: ResMut<ProjectileIdAllocator>,
    mut messages: ImpactMessages,
) {
    for contact in contacts.read() {
        let Ok((mut projectile, scope)) = projectiles.get_mut(contact.projectile) else {
            continue;
        };
        if !projectile.active {
            continue;
        }
        projectile.expire();

        let epoch = match_state.epoch;
        if scope.is_some_and(|s| s.epoch != epoch) {
            continue;
        }

        let snapshot = ImpactSnapshot::of(&projectile, contact.point);
        let outcome = resolve_impact(&snapshot, contact.tag, match_state.rules.damage_per_hit);
        debug!(
            "{:?} {:?} hit {:?} at {}",
            projectile.kind, projectile.id, contact.tag, contact.point
        );

        if let Some(damage) = outcome.damage {
            if let Some(report) = match_state.apply_damage(damage.target, damage.attacker, damage.amount) {
                messages.hits.write(TankHit {
                    target: report.target,
                    attacker: damage.attacker,
                    amount: report.amount,
                    health: report.health,
                });
                if let Some(over) = report.match_over {
                    info!("match {} over, winner {:?}", over.epoch, over.winner);
                    messages.over.write(over);
                }
            }
        }

        if let Some(balloon) = outcome.balloon {
            messages.struck.write(BalloonStruck {
                balloon,
                by: snapshot.owner,
            });
        }

        commands.spawn((
            ImpactFire {
                scale: outcome.effect.scale,
                remaining: outcome.effect.duration,
            },
            Transform::from_translation(outcome.effect.point),
            MatchScoped { epoch },
        ));
        messages.effects.write(outcome.effect);

        for direction in outcome.submissiles {
            spawn_projectile(
                &mut commands,
                &mut ids,
                &mut messages.spawned,
                ProjectileLaunch {
                    kind: ProjectileKind::Submissile,
                    origin: snapshot.point,
                    direction,
                    owner: snapshot.owner,
                },
                epoch,
            );
        }

        for blast in outcome.blasts {
            commands.spawn((
                SecondaryBlast {
                    delay: blast.delay,
                    scale: blast.scale,
                },
                Transform::from_translation(blast.position),
                MatchScoped { epoch },
            ));
        }
    }
}

/// Despawn projectiles that deactivated this tick.
pub fn despawn_inactive_projectiles(mut commands: Commands, projectiles: Query<(Entity, &Projectile)>) {
    for (entity, projectile) in projectiles.iter() {
        if !projectile.active {
            commands.entity(entity).despawn();
        }
    }
}
