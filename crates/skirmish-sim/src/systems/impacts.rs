//! Shot flight and impact resolution.
//!
//! Moves every live shot, steers guided missiles onto their target, then
//! tests each shot's travel this tick against the ships in its region,
//! nearest first. A shot is spent by its first hit.

use std::collections::HashMap;

use hecs::{Entity, World};

use skirmish_core::components::Ship;
use skirmish_core::types::{Point, RegionId, ShipId};

use crate::damage::{hit_by, DamageContext};
use crate::shot::Shot;

pub fn run(world: &mut World, dt: f64, ctx: &mut DamageContext) {
    let ships: HashMap<ShipId, (Entity, RegionId, Point)> = world
        .query::<&Ship>()
        .iter()
        .filter(|(_, s)| s.is_alive())
        .map(|(e, s)| (s.id, (e, s.region, s.location)))
        .collect();

    for (_entity, shot) in world.query_mut::<&mut Shot>() {
        if shot.spent {
            continue;
        }
        fly(shot, &ships, dt);
    }

    let mut live: Vec<(Entity, Shot)> = world
        .query::<&Shot>()
        .iter()
        .filter(|(_, s)| !s.spent)
        .map(|(e, s)| (e, s.clone()))
        .collect();
    live.sort_by_key(|(_, s)| s.id);

    for (entity, mut shot) in live {
        let mut candidates: Vec<(f64, ShipId, Entity)> = ships
            .iter()
            .filter(|(id, (_, region, _))| **id != shot.owner && *region == shot.region)
            .map(|(id, (e, _, loc))| (loc.distance(shot.origin), *id, *e))
            .collect();
        candidates.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

        for (_, _, ship_entity) in candidates {
            let Ok(mut ship) = world.get::<&mut Ship>(ship_entity) else {
                continue;
            };
            let impact = hit_by(&mut ship, &shot, ctx);
            if impact.hit.is_hit() {
                if let Some(end) = impact.beam_end {
                    shot.location = end;
                }
                shot.spent = true;
                break;
            }
        }

        // beams last one tick; a missile past its target does not come back
        if shot.beam || shot.overshot {
            shot.spent = true;
        }

        if let Ok(mut stored) = world.get::<&mut Shot>(entity) {
            *stored = shot;
        }
    }
}

fn fly(shot: &mut Shot, ships: &HashMap<ShipId, (Entity, RegionId, Point)>, dt: f64) {
    shot.life -= dt;
    if shot.beam {
        return;
    }

    if shot.missile {
        if let Some(&(_, region, target)) = shot.target.and_then(|id| ships.get(&id)) {
            if region == shot.region {
                let speed = shot.velocity.length();
                let dir = (target - shot.location).normalize_or_zero();
                if dir != Point::ZERO {
                    shot.velocity = dir * speed;
                }
                let range = shot.location.distance(target);
                if shot.last_range > 0.0 && range > shot.last_range {
                    shot.overshot = true;
                }
                shot.last_range = range;
            }
        }
    }

    shot.origin = shot.location;
    shot.location += shot.velocity * dt;
}
