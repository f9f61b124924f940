//! Cleanup system: removes destroyed ships and spent shots.

use hecs::{Entity, World};

use skirmish_core::components::Ship;

use crate::shot::Shot;

/// Despawn dead ships and shots that hit something or ran out of life.
/// Uses a pre-allocated buffer to avoid per-tick allocation.
pub fn run(world: &mut World, despawn_buffer: &mut Vec<Entity>) {
    despawn_buffer.clear();

    for (entity, ship) in world.query_mut::<&Ship>() {
        if !ship.is_alive() {
            despawn_buffer.push(entity);
        }
    }

    for (entity, shot) in world.query_mut::<&Shot>() {
        if shot.spent || shot.life <= 0.0 {
            despawn_buffer.push(entity);
        }
    }

    for entity in despawn_buffer.drain(..) {
        let _ = world.despawn(entity);
    }
}
