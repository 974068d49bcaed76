//! Collision system - raycast-based contact detection.
//!
//! Only compiled with the `dim3` feature. Hosts running their own physics
//! engine can skip it and write [`ProjectileContact`] messages directly.

use avian3d::prelude::*;
use bevy::ecs::message::MessageWriter;
use bevy::prelude::*;

use crate::components::Projectile;
use crate::events::ProjectileContact;
use crate::types::BodyTag;

/// Detect projectile contacts by raycasting between frames.
///
/// Casts a ray from `previous_position` to the current position so fast
/// projectiles cannot tunnel through thin colliders. The body tag is read
/// from the hit entity; bodies without a [`BodyTag`] count as terrain.
///
/// # Arguments
/// * `spatial_query` - Avian3D spatial query for physics-based collision detection
/// * `contacts` - Writer for the resulting contacts
/// * `projectiles` - Query for projectile entities and their components
/// * `tags` - Gameplay tags of collidable bodies
pub fn detect_projectile_contacts(
    spatial_query: SpatialQuery,
    mut contacts: MessageWriter<ProjectileContact>,
    projectiles: Query<(Entity, &Transform, &Projectile)>,
    tags: Query<&BodyTag>,
) {
    for (entity, transform, projectile) in projectiles.iter() {
        if !projectile.active {
            continue;
        }

        let ray_origin = projectile.previous_position;
        let ray = transform.translation - ray_origin;
        let ray_length = ray.length();

        // Skip if projectile hasn't moved enough
        if ray_length < 0.001 {
            continue;
        }

        let Ok(direction) = Dir3::new(ray / ray_length) else {
            continue;
        };

        // Create filter excluding the projectile itself
        let filter = SpatialQueryFilter::default().with_excluded_entities([entity]);

        if let Some(hit) = spatial_query.cast_ray(ray_origin, direction, ray_length, true, &filter) {
            let tag = tags.get(hit.entity).copied().unwrap_or_default();
            contacts.write(ProjectileContact {
                projectile: entity,
                tag,
                point: ray_origin + *direction * hit.distance,
            });
        }
    }
}
