//! Damage control tick: power distribution, shield ramp, repairs.

use hecs::World;

use skirmish_core::components::Ship;
use skirmish_core::config::CombatTuning;
use skirmish_core::events::CombatEvent;

use crate::{damage, repair};

pub fn run(world: &mut World, now: f64, dt: f64, tuning: &CombatTuning, events: &mut Vec<CombatEvent>) {
    for (_entity, ship) in world.query_mut::<&mut Ship>() {
        if !ship.is_alive() {
            continue;
        }
        repair::distribute_power(ship, dt);
        damage::shield_frame(ship, dt);
        repair::exec_maint_frame(ship, now, dt, tuning, events);
    }
}
