//! Capital-ship pilot: heading helm, speed-matching throttle, and the
//! threat-gated objective.

use skirmish_core::components::Ship;
use skirmish_core::constants::*;
use skirmish_core::enums::{NavAction, OrderAction, QuantumState, Roe};
use skirmish_core::types::Point;

use crate::command::{ActuatorCommand, AiOutput};
use crate::navigator::{self, adjust_defenses, blend_for, holding};
use crate::objective::{
    farcaster_exit, find_objective_formation, find_objective_navpoint, find_objective_patrol,
    find_objective_quantum, find_objective_target, pursue_standard, transform,
    uses_farcaster,
};
use crate::pilot::{NavState, Pilot};
use crate::steer::{Accumulator, Steer};
use crate::step::AiWorld;
use crate::targeting;

pub fn find_objective(pilot: &mut Pilot, ship: &Ship, world: &AiWorld, out: &mut AiOutput) {
    let (directed, threat_level, support_level) = match pilot.tactical.as_ref() {
        Some(tac) => (tac.roe == Roe::Directed, tac.threat_level, tac.support_level),
        None => (false, 0.0, 1.0),
    };
    let nav = &mut pilot.nav;
    nav.distance = 0.0;

    let order = ship.order_action();
    if matches!(order, OrderAction::QuantumTo | OrderAction::FarcastTo) {
        find_objective_quantum(nav, ship, world, out);
        nav.objective = transform(ship, nav.obj_w);
        return;
    }

    let hold_order = matches!(order, OrderAction::WepHold | OrderAction::FormUp);
    let form = hold_order
        || (order == OrderAction::None && nav.target.is_none())
        || nav.farcaster.is_some();

    if form && ship.element.index > 1 {
        let launching = nav
            .navpt
            .and_then(|i| ship.navpoints.get(i))
            .is_some_and(|n| n.action == NavAction::Launch);
        if launching {
            find_objective_navpoint(nav, ship, world, out);
        } else {
            nav.navpt = None;
            find_objective_formation(nav, ship, world);
        }
        nav.objective = transform(ship, nav.obj_w);
        return;
    }

    // a ship holding on its flight plan keeps flying it, threatened or not
    let threatened = !directed && threat_level >= 2.0 * support_level;
    if (hold_order && nav.navpt.is_none()) || (threatened && !(hold_order && nav.navpt.is_some()))
    {
        if let Some(support) = world.roster.live(nav.support) {
            if support.location.distance(ship.location) > REGROUP_RANGE {
                find_objective_target(nav, ship, support);
                nav.objective = transform(ship, nav.obj_w);
                return;
            }
        } else if let Some(threat) = world.roster.live(nav.threat) {
            if nav.target != Some(threat.id) {
                nav.obj_w = ship.location + (ship.location - threat.location) * RETREAT_SCALE;
                nav.objective = transform(ship, nav.obj_w);
                return;
            }
        }
    }

    if hold_order {
        if nav.navpt.is_some() {
            find_objective_navpoint(nav, ship, world, out);
        } else if nav.patrol.is_some() {
            find_objective_patrol(nav, ship, out);
        } else {
            nav.obj_w = Point::ZERO;
        }
    } else if !pursue_standard(nav, ship, world, out, true) {
        nav.obj_w = Point::ZERO;
    }

    nav.objective = transform(ship, nav.obj_w);
}

pub fn navigator(pilot: &mut Pilot, ship: &Ship, world: &AiWorld, dt: f64, out: &mut AiOutput) {
    let mut acc = Accumulator::new(blend_for(ship));
    pilot.nav.hold = holding(&pilot.nav, ship);

    if pilot.nav.farcaster.is_some() && pilot.nav.distance < FARCASTER_SEEK_RANGE {
        navigator::accumulate(&mut acc, seek_target(pilot, ship, world, out));
    } else {
        navigator::accumulate(&mut acc, avoid_collision(&mut pilot.nav, ship, world));
        if pilot.nav.other.is_none() && !pilot.nav.hold {
            navigator::accumulate(&mut acc, seek_target(pilot, ship, world, out));
        }
    }

    let mut steer = acc.steer();
    helm(&pilot.nav, ship, world, &mut steer, out);
    pilot.nav.last_steer = steer;
    out.steer = steer;

    throttle_control(&mut pilot.nav, ship, world, steer, dt, out);
    targeting::fire_control(&mut pilot.nav, &mut pilot.fire, ship, world, out);
    adjust_defenses(&pilot.nav, ship, out);
}

/// Capital ships barely moving don't steer around anything.
pub fn avoid_collision(nav: &mut NavState, ship: &Ship, world: &AiWorld) -> Option<Steer> {
    if ship.velocity.length() < 25.0 {
        return None;
    }
    navigator::avoid_collision(nav, ship, world)
}

/// Commit to a farcaster or light the quantum drive when the navpoint is in
/// another region, then seek as usual.
pub fn seek_target(
    pilot: &mut Pilot,
    ship: &Ship,
    world: &AiWorld,
    out: &mut AiOutput,
) -> Option<Steer> {
    if let Some(navpt) = pilot.nav.navpt.and_then(|i| ship.navpoints.get(i)) {
        let nav_region = navpt.region.unwrap_or(ship.region);

        if uses_farcaster(ship, nav_region, navpt.farcast) {
            let nav = &mut pilot.nav;
            if nav.farcaster.is_none() {
                nav.farcaster = world.roster.find_farcaster(ship.region, nav_region);
            }
            if let Some(end) = farcaster_exit(nav, ship, world) {
                nav.obj_w = end;
                nav.distance = end.distance(ship.location);
                if nav.distance < ARRIVAL_RADIUS {
                    nav.farcaster = None;
                }
            }
        } else if nav_region != ship.region {
            let ready = ship
                .quantum_drive
                .as_ref()
                .is_some_and(|q| q.state == QuantumState::Ready);
            if ready {
                out.push(ActuatorCommand::EngageQuantum {
                    region: nav_region,
                    location: navpt.location,
                });
            }
        }
    }

    navigator::seek_target(pilot, ship, world)
}

/// Helm heading and pitch straight from the steer, or a full stop while
/// station keeping.
pub fn helm(nav: &NavState, ship: &Ship, world: &AiWorld, steer: &mut Steer, out: &mut AiOutput) {
    out.push(ActuatorCommand::SetHelmMode { helm: true });

    if nav.distance < 0.0 {
        steer.brake = 1.0;
        steer.stop = true;
        out.push(ActuatorCommand::SetHelmPitch { pitch: 0.0 });
    } else {
        let bigger_threat = world
            .roster
            .live(nav.threat)
            .is_some_and(|t| t.class() >= ship.class());
        let purpose = nav.other.is_some()
            || nav.target.is_some()
            || nav.ward.is_some()
            || bigger_threat
            || nav.navpt.is_some()
            || nav.patrol.is_some()
            || nav.farcaster.is_some()
            || ship.element.index > 1;

        if purpose {
            let limit = world.tuning.starship_pitch_limit;
            out.push(ActuatorCommand::SetHelmHeading { heading: steer.yaw });
            out.push(ActuatorCommand::SetHelmPitch {
                pitch: steer.pitch.clamp(-limit, limit),
            });
        } else {
            out.push(ActuatorCommand::SetHelmPitch { pitch: 0.0 });
        }
    }

    out.push(ActuatorCommand::SetTransX { thrust: 0.0 });
    out.push(ActuatorCommand::SetTransY { thrust: 0.0 });
    out.push(ActuatorCommand::SetTransZ { thrust: 0.0 });
}

pub fn throttle_control(
    nav: &mut NavState,
    ship: &Ship,
    world: &AiWorld,
    steer: Steer,
    dt: f64,
    out: &mut AiOutput,
) {
    if nav.distance < 0.0 {
        nav.throttle = 0.0;
        nav.old_throttle = 0.0;
        out.push(ActuatorCommand::SetThrottle { throttle: 0.0 });
        out.push(ActuatorCommand::SetFullStop);
        return;
    }

    let roster = world.roster;
    let ship_speed = ship.forward_speed();
    let mut brakes = 0.0;
    let mut full_stop = false;

    let target = roster.live(nav.target);
    let bigger_threat = roster
        .live(nav.threat)
        .filter(|t| t.class() >= ship.class());

    let throttle = if target.is_some() || bigger_threat.is_some() {
        let mut throttle = 100.0;
        if let Some(tgt) = target {
            if nav.distance < ATTACK_SLOW_RANGE {
                let dir = (tgt.location - ship.location).normalize_or_zero();
                if ship.velocity.dot(dir) > ATTACK_CLOSING_LIMIT {
                    throttle = 30.0;
                    brakes = 0.25;
                }
            }
        }
        throttle *= 1.0 - steer.brake.clamp(0.0, 1.0);
        full_stop = throttle < 1.0;
        throttle
    } else if let Some(ward) = roster.live(nav.ward) {
        let speed = ward.velocity.length();
        if speed > 0.0 {
            if ship_speed > speed {
                brakes = 0.2;
                nav.old_throttle - 1.0
            } else if ship_speed < speed - 10.0 {
                nav.old_throttle + 1.0
            } else {
                nav.old_throttle
            }
        } else {
            brakes = 0.5;
            0.0
        }
    } else if nav.patrol.is_some() || nav.farcaster.is_some() {
        if nav.distance < PATROL_SLOW_TIME_SECS * ship_speed.abs() {
            if ship.velocity.length() > PATROL_SLOW_SPEED {
                5.0
            } else {
                ESCORT_THROTTLE
            }
        } else {
            100.0
        }
    } else if let Some(navpt) = nav.navpt.and_then(|i| ship.navpoints.get(i)) {
        if nav.hold {
            brakes = 1.0;
            0.0
        } else {
            let speed = if navpt.speed > 0.0 {
                navpt.speed
            } else {
                STARSHIP_NAVPT_SPEED
            };
            if ship_speed > speed {
                brakes = 0.25;
                if nav.old_throttle > 1.0 {
                    nav.old_throttle - 1.0
                } else {
                    nav.old_throttle
                }
            } else if ship_speed < speed - 10.0 {
                nav.old_throttle + 1.0
            } else {
                nav.old_throttle
            }
        }
    } else if ship.element.index > 1 {
        let lead_speed = roster
            .live(ship.element.lead)
            .map_or(0.0, |lead| lead.velocity.length());
        nav.old_throttle + (lead_speed - ship_speed) * WINGMAN_THROTTLE_GAIN * dt
    } else {
        0.0
    };

    let throttle = throttle.clamp(0.0, 100.0);
    nav.throttle = throttle;
    nav.old_throttle = throttle;
    nav.brakes = brakes;
    out.push(ActuatorCommand::SetThrottle { throttle });
    if full_stop {
        out.push(ActuatorCommand::SetFullStop);
    }

    if ship_speed > 1.0 && brakes > 0.0 {
        out.push(ActuatorCommand::SetTransZ {
            thrust: -brakes * ship.design.trans_thrust,
        });
    }
}
