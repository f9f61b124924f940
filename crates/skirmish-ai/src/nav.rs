//! Navigation autopilot: flies the flight plan, crosses regions, and hands
//! dropships between orbit and airspace. No tactical layer.

use skirmish_core::components::{FlightModel, Ship};
use skirmish_core::constants::*;
use skirmish_core::enums::{FlightPhase, QuantumState, ShipClass};

use crate::command::{ActuatorCommand, AiOutput};
use crate::navigator::{self, blend_for, holding, stick_helm};
use crate::objective::{complete_navpoint, farcaster_exit, find_objective_farcaster, transform};
use crate::pilot::{NavState, Pilot};
use crate::steer::{Accumulator, Steer};
use crate::step::AiWorld;

pub fn exec_frame(pilot: &mut Pilot, ship: &Ship, world: &AiWorld, out: &mut AiOutput) {
    if ship.flight_phase == FlightPhase::Takeoff {
        pilot.nav.takeoff = true;
    } else if pilot.nav.takeoff && ship.mission_clock > TAKEOFF_DURATION_SECS {
        pilot.nav.takeoff = false;
    }

    find_objective(&mut pilot.nav, ship, world);
    navigator(pilot, ship, world, out);

    // an orbit transition replaces the ship's region; it is requested once
    match pilot.nav.drop_state {
        s if s < 0 => {
            pilot.nav.drop_state = 0;
            out.push(ActuatorCommand::DropOrbit);
        }
        s if s > 0 => {
            pilot.nav.drop_state = 0;
            out.push(ActuatorCommand::MakeOrbit);
        }
        _ => {}
    }
}

fn set_objective(nav: &mut NavState, ship: &Ship, normalize: bool) {
    nav.distance = nav.obj_w.distance(ship.location);
    nav.objective = transform(ship, nav.obj_w);
    if normalize && !ship.is_starship() {
        nav.objective = nav.objective.normalize_or_zero();
    }
}

pub fn find_objective(nav: &mut NavState, ship: &Ship, world: &AiWorld) {
    nav.navpt = None;
    nav.distance = 0.0;

    if nav.takeoff {
        nav.obj_w = ship.location + ship.basis.forward * TAKEOFF_RUN;
        nav.obj_w.y = ship.location.y + TAKEOFF_CLIMB;
        nav.objective = transform(ship, nav.obj_w);
        return;
    }

    nav.navpt = ship.next_navpoint();
    let Some(navpt) = nav.navpt.and_then(|i| ship.navpoints.get(i)) else {
        nav.objective = Default::default();
        return;
    };

    let system = &world.roster.star_system;
    let nav_region = navpt.region.unwrap_or(ship.region);

    if system.region(ship.region).is_none() || system.region(nav_region).is_none() {
        nav.obj_w = navpt.location;
        set_objective(nav, ship, true);
        return;
    }

    if nav_region == ship.region {
        nav.obj_w = farcaster_exit(nav, ship, world).unwrap_or(navpt.location);
        set_objective(nav, ship, true);
        if nav.farcaster.is_some() && nav.distance < ARRIVAL_RADIUS {
            nav.farcaster = None;
        }
    } else if ship.is_dropship() {
        if system.share_primary(ship.region, nav_region) {
            nav.obj_w = system.offset(ship.region, nav_region).unwrap_or_default();
            set_objective(nav, ship, false);
            if system.is_airspace(nav_region) {
                nav.drop_state = -1;
            } else if system.is_orbital(nav_region) {
                nav.drop_state = 1;
            }
        } else if system.is_orbital(nav_region) && system.is_orbital(ship.region) {
            find_objective_farcaster(nav, ship, world, nav_region);
        }
    } else if ship.is_starship() {
        nav.quantum_state = 1;
        nav.obj_w = system.offset(ship.region, nav_region).unwrap_or_default() + navpt.location;
        set_objective(nav, ship, false);
    }
}

pub fn navigator(pilot: &mut Pilot, ship: &Ship, world: &AiWorld, out: &mut AiOutput) {
    let mut acc = Accumulator::new(blend_for(ship));
    pilot.nav.brakes = 0.0;
    pilot.nav.hold = pilot.nav.navpt.is_some() && holding(&pilot.nav, ship);

    navigator::accumulate(&mut acc, navigator::avoid_terrain(&mut pilot.nav, ship));
    navigator::accumulate(&mut acc, navigator::avoid_collision(&mut pilot.nav, ship, world));
    if !pilot.nav.hold {
        let s = seek_target(pilot, ship, out);
        navigator::accumulate_seek(&mut acc, &mut pilot.memory, s);
    }

    let steer = acc.steer();
    pilot.nav.last_steer = steer;
    out.steer = steer;

    helm(&pilot.nav, ship, world, steer, out);
    throttle_control(&mut pilot.nav, ship, out);
}

/// Seek the navpoint, lighting the quantum drive on the way when it lies in
/// another region. Arrival marks the navpoint complete.
pub fn seek_target(pilot: &mut Pilot, ship: &Ship, out: &mut AiOutput) -> Option<Steer> {
    let nav = &mut pilot.nav;
    if nav.takeoff {
        return Some(navigator::seek(&mut pilot.memory, ship, nav.objective));
    }

    let index = nav.navpt?;
    let navpt = ship.navpoints.get(index)?;

    if nav.quantum_state == 1 {
        if let Some(drive) = ship.quantum_drive.as_ref() {
            match drive.state {
                QuantumState::Ready => out.push(ActuatorCommand::EngageQuantum {
                    region: navpt.region.unwrap_or(ship.region),
                    location: navpt.location,
                }),
                QuantumState::PostWarp => nav.quantum_state = 0,
                QuantumState::Countdown | QuantumState::Jump => {}
            }
        }
    }

    if nav.distance < 2.0 * ship.radius() {
        complete_navpoint(ship, index, out);
        return None;
    }
    Some(navigator::seek(&mut pilot.memory, ship, nav.objective))
}

fn helm(nav: &NavState, ship: &Ship, world: &AiWorld, steer: Steer, out: &mut AiOutput) {
    if !ship.is_starship() {
        stick_helm(ship, steer, out);
        return;
    }

    out.push(ActuatorCommand::SetHelmMode { helm: true });
    if nav.navpt.is_some() || nav.takeoff {
        let limit = world.tuning.nav_pitch_limit;
        out.push(ActuatorCommand::SetHelmHeading { heading: steer.yaw });
        out.push(ActuatorCommand::SetHelmPitch {
            pitch: steer.pitch.clamp(-limit, limit),
        });
    } else {
        out.push(ActuatorCommand::SetHelmPitch { pitch: 0.0 });
    }
    out.push(ActuatorCommand::SetTransX { thrust: 0.0 });
    out.push(ActuatorCommand::SetTransY { thrust: 0.0 });
    out.push(ActuatorCommand::SetTransZ { thrust: 0.0 });
}

/// Navpoint speed keeping. The relaxed and arcade flight models trim the
/// throttle in small steps; the standard model uses fixed set-points.
pub fn throttle_control(nav: &mut NavState, ship: &Ship, out: &mut AiOutput) {
    let ship_speed = ship.forward_speed();
    let mut augmenter = false;
    let mut brakes: f64 = 0.0;
    let mut throttle = 0.0;

    if nav.hold {
        brakes = 1.0;
    } else if let Some(navpt) = nav.navpt.and_then(|i| ship.navpoints.get(i)) {
        let desired = if navpt.speed < 10.0 {
            NAV_NAVPT_SPEED
        } else {
            navpt.speed
        };
        match ship.design.flight_model {
            FlightModel::Relaxed | FlightModel::Arcade => {
                throttle = if ship_speed > desired + 10.0 {
                    nav.old_throttle - 0.25
                } else if ship_speed < desired - 10.0 {
                    nav.old_throttle + 0.25
                } else {
                    nav.old_throttle
                };
            }
            FlightModel::Standard => {
                if ship_speed > desired + 5.0 {
                    brakes = 0.25;
                } else if ship_speed < desired - 5.0 {
                    throttle = 50.0;
                }
            }
        }
    } else {
        brakes = 0.25;
    }

    // airborne fighters must keep flying speed
    if ship.airborne && ship.class() < ShipClass::Lca {
        if ship_speed < STALL_SPEED {
            throttle = 100.0;
            brakes = 0.0;
            augmenter = ship_speed < AFTERBURNER_SPEED;
        } else if throttle < AIRBORNE_MIN_THROTTLE {
            throttle = AIRBORNE_MIN_THROTTLE;
        }
    }

    let throttle = throttle.clamp(0.0, 100.0);
    let brakes = brakes.clamp(0.0, 1.0);
    nav.throttle = throttle;
    nav.old_throttle = throttle;
    nav.brakes = brakes;

    out.push(ActuatorCommand::SetThrottle { throttle });
    out.push(ActuatorCommand::SetAugmenter { on: augmenter });
    if ship_speed > 1.0 && brakes > 0.0 {
        out.push(ActuatorCommand::SetTransZ {
            thrust: -brakes * ship.design.trans_thrust,
        });
    }
}
