//! Dropship pilot: climb out of airspace, or run for the nearest planet's
//! orbit at full throttle.

use skirmish_core::components::Ship;
use skirmish_core::constants::*;
use skirmish_core::types::Point;

use crate::command::{ActuatorCommand, AiOutput};
use crate::navigator::{self, blend_for, stick_helm};
use crate::objective::transform;
use crate::pilot::{NavState, Pilot};
use crate::steer::Accumulator;
use crate::step::AiWorld;

pub fn exec_frame(pilot: &mut Pilot, ship: &Ship, world: &AiWorld, out: &mut AiOutput) {
    find_objective(&mut pilot.nav, ship, world);
    navigator(pilot, ship, world, out);
}

pub fn find_objective(nav: &mut NavState, ship: &Ship, world: &AiWorld) {
    nav.distance = 0.0;
    let system = &world.roster.star_system;

    if system.region(ship.region).is_none() {
        return;
    }

    if system.is_airspace(ship.region) {
        nav.obj_w = ship.location + Point::new(0.0, DROPSHIP_CLIMB, 0.0);
    } else {
        let Some(dest) = system.nearest_terrain(ship.region) else {
            return;
        };
        let dest_orbit = system.orbital_of(dest.id).map_or(Point::ZERO, |r| r.location);
        let own_orbit = system.orbital_of(ship.region).map_or(Point::ZERO, |r| r.location);
        nav.obj_w = dest_orbit - own_orbit + Point::new(0.0, 0.0, -DROPSHIP_ORBIT_OFFSET);
    }

    nav.distance = nav.obj_w.distance(ship.location);
    nav.objective = transform(ship, nav.obj_w).normalize_or_zero();
}

pub fn navigator(pilot: &mut Pilot, ship: &Ship, world: &AiWorld, out: &mut AiOutput) {
    let mut acc = Accumulator::new(blend_for(ship));

    navigator::accumulate(&mut acc, navigator::avoid_collision(&mut pilot.nav, ship, world));
    let seek = navigator::seek(&mut pilot.memory, ship, pilot.nav.objective);
    navigator::accumulate_seek(&mut acc, &mut pilot.memory, Some(seek));

    let steer = acc.steer();
    pilot.nav.last_steer = steer;
    out.steer = steer;

    stick_helm(ship, steer, out);

    pilot.nav.throttle = 100.0;
    pilot.nav.old_throttle = 100.0;
    out.push(ActuatorCommand::SetThrottle { throttle: 100.0 });
}
