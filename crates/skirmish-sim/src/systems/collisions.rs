//! Hull-to-hull collisions.
//!
//! Overlapping ships that are still closing take collision damage in
//! proportion to the closing speed, the lighter hull taking the larger
//! share, and lose their closing velocity along the contact normal.

use hecs::{Entity, World};

use skirmish_core::components::Ship;
use skirmish_core::constants::COLLISION_DAMAGE_PER_MPS;
use skirmish_core::types::{Point, RegionId, ShipId};

use crate::damage::{inflict_collision_damage, DamageContext};

struct Body {
    entity: Entity,
    id: ShipId,
    region: RegionId,
    location: Point,
    velocity: Point,
    radius: f64,
    mass: f64,
}

pub fn run(world: &mut World, ctx: &mut DamageContext) {
    let mut bodies: Vec<Body> = world
        .query::<&Ship>()
        .iter()
        .filter(|(_, s)| s.is_alive() && !s.in_transition && !s.net_observer)
        .map(|(entity, s)| Body {
            entity,
            id: s.id,
            region: s.region,
            location: s.location,
            velocity: s.velocity,
            radius: s.radius(),
            mass: s.design.mass.max(1.0),
        })
        .collect();
    bodies.sort_by_key(|b| b.id);

    let mut contacts = Vec::new();
    for (i, a) in bodies.iter().enumerate() {
        for (j, b) in bodies.iter().enumerate().skip(i + 1) {
            if a.region != b.region {
                continue;
            }
            let offset = b.location - a.location;
            let dist = offset.length();
            if dist >= a.radius + b.radius || dist <= 0.0 {
                continue;
            }
            let normal = offset / dist;
            let closing = (a.velocity - b.velocity).dot(normal);
            if closing > 0.0 {
                contacts.push((i, j, normal, closing));
            }
        }
    }

    for (i, j, normal, closing) in contacts {
        let (ma, mb) = (bodies[i].mass, bodies[j].mass);
        let total = ma + mb;
        let impulse = closing * COLLISION_DAMAGE_PER_MPS;

        // both hulls end up moving together along the normal
        let va = bodies[i].velocity.dot(normal);
        let vb = bodies[j].velocity.dot(normal);
        let common = (ma * va + mb * vb) / total;
        bodies[i].velocity += normal * (common - va);
        bodies[j].velocity += normal * (common - vb);

        for (k, share) in [(i, mb / total), (j, ma / total)] {
            let Ok(mut ship) = world.get::<&mut Ship>(bodies[k].entity) else {
                continue;
            };
            ship.velocity = bodies[k].velocity;
            inflict_collision_damage(&mut ship, impulse * share, ctx);
        }
    }
}
