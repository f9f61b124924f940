//! Pilot step: every engaged pilot reads the roster snapshot and answers
//! with actuator commands for its own ship.

use hecs::{Entity, World};

use skirmish_ai::{step_ai, AiOutput, AiWorld, Pilot};
use skirmish_core::components::Ship;
use skirmish_core::config::CombatTuning;
use skirmish_core::roster::{Roster, StarSystem};
use skirmish_core::types::ShipId;

/// Clone every ship into a read-only roster.
pub fn snapshot(world: &World, star_system: &StarSystem) -> Roster {
    let mut roster = Roster::new(star_system.clone());
    for (_entity, ship) in world.query::<&Ship>().iter() {
        roster.insert(ship.clone());
    }
    roster
}

/// Step every pilot. Outputs come back in ship-id order.
pub fn run(
    world: &mut World,
    roster: &Roster,
    tuning: &CombatTuning,
    now: f64,
    dt: f64,
) -> Vec<(Entity, ShipId, AiOutput)> {
    let ai_world = AiWorld::new(roster, tuning, now);
    let mut outputs = Vec::new();

    for (entity, (ship, pilot)) in world.query_mut::<(&Ship, &mut Pilot)>() {
        let output = step_ai(pilot, ship, &ai_world, dt);
        if !output.commands.is_empty() || !output.events.is_empty() {
            outputs.push((entity, ship.id, output));
        }
    }

    outputs.sort_by_key(|(_, id, _)| *id);
    outputs
}
