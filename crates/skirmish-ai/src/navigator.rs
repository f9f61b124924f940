//! Shared navigator: steering behaviours, helm, throttle and defenses.
//!
//! A navigator pass builds a fresh `Accumulator`, feeds it collision
//! avoidance, terrain avoidance and the seek toward the objective, then turns
//! the blended steer into actuator commands. Steering primitives dispatch on
//! the hull: starship hulls steer by heading, small craft by stick.

use rand::Rng;

use skirmish_core::components::{FlightModel, Ship};
use skirmish_core::constants::*;
use skirmish_core::enums::{FlightPhase, NavAction, NavStatus, OrderAction, ShipClass};
use skirmish_core::types::Point;

use crate::command::{ActuatorCommand, AiOutput};
use crate::objective::transform;
use crate::pilot::{NavState, Pilot};
use crate::steer::{
    avoid_heading, avoid_relative, evade_pattern, flee_heading, flee_relative, seek_heading,
    seek_relative, Accumulator, Blend, SeekMemory, Steer, EVADE_PATTERNS,
};
use crate::step::AiWorld;

// --- Hull dispatch ---

pub fn blend_for(ship: &Ship) -> Blend {
    if ship.is_starship() {
        Blend::Priority
    } else {
        Blend::Budget
    }
}

pub fn seek(memory: &mut SeekMemory, ship: &Ship, point: Point) -> Steer {
    if ship.is_starship() {
        seek_heading(point, ship.radius())
    } else {
        seek_relative(memory, point)
    }
}

pub fn flee(ship: &Ship, point: Point) -> Steer {
    if ship.is_starship() {
        flee_heading(point, ship.radius())
    } else {
        flee_relative(point)
    }
}

pub fn avoid(ship: &Ship, point: Point, radius: f64) -> Steer {
    if ship.is_starship() {
        avoid_heading(point, ship.radius(), ship.basis.right)
    } else {
        avoid_relative(point, radius)
    }
}

/// Add a seek contribution, shrinking the seek memory if the budget cut it.
pub fn accumulate_seek(acc: &mut Accumulator, memory: &mut SeekMemory, steer: Option<Steer>) {
    if let Some(steer) = steer {
        let scale = acc.accumulate(steer);
        if scale < 1.0 {
            memory.scale_latest(scale);
        }
    }
}

pub fn accumulate(acc: &mut Accumulator, steer: Option<Steer>) {
    if let Some(steer) = steer {
        acc.accumulate(steer);
    }
}

/// Holding at a completed navpoint or on element orders.
pub fn holding(nav: &NavState, ship: &Ship) -> bool {
    ship.element.hold_time > 0.0
        || nav
            .navpt
            .and_then(|i| ship.navpoints.get(i))
            .is_some_and(|n| n.status == NavStatus::Complete && n.hold_time > 0.0)
}

// --- Small-craft navigator ---

pub fn navigator(pilot: &mut Pilot, ship: &Ship, world: &AiWorld, dt: f64, out: &mut AiOutput) {
    let mut acc = Accumulator::new(blend_for(ship));
    pilot.nav.hold = holding(&pilot.nav, ship);
    pilot.nav.evading = false;

    if pilot.nav.takeoff || ship.mission_clock < TAKEOFF_DURATION_SECS {
        if ship.airborne || pilot.nav.takeoff {
            let s = seek_target(pilot, ship, world);
            accumulate_seek(&mut acc, &mut pilot.memory, s);
        }
    } else if pilot.nav.farcaster.is_some() && pilot.nav.distance < FARCASTER_SEEK_RANGE {
        let s = seek_target(pilot, ship, world);
        accumulate_seek(&mut acc, &mut pilot.memory, s);
    } else {
        accumulate(&mut acc, avoid_terrain(&mut pilot.nav, ship));
        accumulate(&mut acc, avoid_collision(&mut pilot.nav, ship, world));

        if pilot.nav.too_close.is_none() && !pilot.nav.hold {
            let s = seek_target(pilot, ship, world);
            accumulate_seek(&mut acc, &mut pilot.memory, s);
            let evade = evade_threat(pilot, ship, world);
            pilot.nav.evading = evade.is_some();
            accumulate(&mut acc, evade);
        }
    }

    let steer = acc.steer();
    pilot.nav.last_steer = steer;
    out.steer = steer;

    stick_helm(ship, steer, out);
    throttle_control(&mut pilot.nav, ship, world, steer, dt, out);
    fire_control(&pilot.nav, ship, world, out);
    adjust_defenses(&pilot.nav, ship, out);
}

// --- Behaviours ---

/// Time of closest approach between two constant-velocity points.
pub fn closest_approach_time(p1: Point, v1: Point, p2: Point, v2: Point) -> f64 {
    let dv = v1 - v2;
    let denom = dv.length_squared();
    if denom < 1.0e-9 {
        return 0.0;
    }
    -(p1 - p2).dot(dv) / denom
}

/// Steer around the soonest predicted collision with a starship contact.
pub fn avoid_collision(nav: &mut NavState, ship: &Ship, world: &AiWorld) -> Option<Steer> {
    let roster = world.roster;
    roster.star_system.region(ship.region)?;

    if nav.other.is_some() && roster.live(nav.other).is_none() {
        nav.other = None;
        nav.last_avoid_time = f64::NEG_INFINITY;
    }

    if nav.other.is_none() && world.now - nav.last_avoid_time < AVOID_RECHECK_SECS {
        return None;
    }

    let mut lookahead = Lookahead {
        bearing: ship.velocity.normalize_or_zero(),
        avoid_dist: (AVOID_DIST_FACTOR * ship.radius()).clamp(AVOID_DIST_MIN, AVOID_DIST_MAX),
        avoid_time: if ship.design.avoid_time > 0.0 {
            ship.design.avoid_time
        } else if ship.is_starship() {
            AVOID_TIME_SECS * STARSHIP_AVOID_TIME_SCALE
        } else {
            AVOID_TIME_SECS
        },
        brake: 0.0,
    };

    let mut found = roster
        .live(nav.other)
        .and_then(|other| lookahead.test(nav, ship, other));

    if found.is_none() {
        for (_, c) in world.contacts(ship) {
            if c.is_starship() {
                found = lookahead.test(nav, ship, c);
                if found.is_some() {
                    break;
                }
            }
        }

        if found.is_none() {
            if let Some(other) = roster.live(nav.other) {
                let radius = ship.radius() + other.radius() + lookahead.avoid_dist * 0.9;
                found = Some(avoid(ship, nav.obstacle, radius).with_brake(lookahead.brake));
            }
        }
    }

    nav.last_avoid_time = world.now;
    found
}

struct Lookahead {
    bearing: Point,
    avoid_dist: f64,
    avoid_time: f64,
    brake: f64,
}

impl Lookahead {
    /// Returns a steer only when the obstacle is close enough to flee from;
    /// otherwise records it as `nav.other` for the caller to steer around.
    fn test(&mut self, nav: &mut NavState, ship: &Ship, obj: &Ship) -> Option<Steer> {
        let closure = (ship.velocity - obj.velocity).dot(self.bearing);

        if nav.too_close == Some(obj.id) {
            let dist = ship.location.distance(obj.location);
            if closure > 1.0 && dist < self.avoid_dist {
                return Some(avoid_close(nav, ship, obj));
            }
            nav.too_close = None;
        }

        let time = closest_approach_time(ship.location, ship.velocity, obj.location, obj.velocity);
        if time <= 0.0 {
            self.release(nav, obj);
            return None;
        }

        let current_distance = ship.location.distance(obj.location) - ship.radius() - obj.radius();
        if current_distance > AVOID_IGNORE_RANGE {
            self.release(nav, obj);
            return None;
        }

        // a farcaster lined up for transit is not an obstacle
        if obj.farcaster.is_some() {
            let dir = ship.velocity.normalize_or_zero();
            let mut angle_off = dir.dot(obj.basis.forward).clamp(-1.0, 1.0).acos().abs();
            if angle_off > std::f64::consts::FRAC_PI_2 {
                angle_off = std::f64::consts::PI - angle_off;
            }
            if angle_off < 35.0_f64.to_radians() {
                let d = ship.location + dir * (current_distance + ship.radius() + obj.radius());
                if obj.location.distance(d) < 0.667 * obj.radius() {
                    return None;
                }
            }
        }

        if current_distance < self.avoid_dist * 0.35
            && (closure > 1.0 || current_distance < ship.radius())
        {
            return Some(avoid_close(nav, ship, obj));
        }

        let separation = self.avoid_dist + obj.radius();
        if (current_distance - separation) / closure > self.avoid_time {
            self.release(nav, obj);
            return None;
        }

        let self_pt = ship.location + ship.velocity * time;
        let test_pt = obj.location + obj.velocity * time;
        let dist = self_pt.distance(test_pt) - ship.radius() - obj.radius();

        if dist < self.avoid_dist {
            if dist < self.avoid_dist * 0.25 && time < self.avoid_time * 0.5 {
                return Some(avoid_close(nav, ship, obj));
            }
            nav.obstacle = transform(ship, test_pt);
            if ship.basis.to_local(test_pt - ship.location).z > 0.0 {
                nav.other = Some(obj.id);
                self.avoid_time = time;
                self.brake = AVOID_BRAKE;
            }
        } else if nav.other == Some(obj.id) && dist > self.avoid_dist * 1.25 {
            nav.other = None;
        }

        None
    }

    fn release(&self, nav: &mut NavState, obj: &Ship) {
        if nav.other == Some(obj.id) {
            nav.other = None;
        }
    }
}

fn avoid_close(nav: &mut NavState, ship: &Ship, obj: &Ship) -> Steer {
    nav.too_close = Some(obj.id);
    nav.other = Some(obj.id);
    nav.obstacle = transform(ship, obj.location);
    flee(ship, nav.obstacle).with_brake(CLOSE_FLEE_BRAKE)
}

/// Climb away from the ground when flying low in atmosphere.
pub fn avoid_terrain(nav: &mut NavState, ship: &Ship) -> Option<Steer> {
    if !ship.airborne || ship.flight_phase != FlightPhase::Active || nav.takeoff {
        return None;
    }
    let launching = nav
        .navpt
        .and_then(|i| ship.navpoints.get(i))
        .is_some_and(|n| n.action == NavAction::Launch);
    if launching || ship.altitude_agl >= TERRAIN_FLOOR_AGL {
        return None;
    }

    let climb = ship.location + ship.velocity + Point::new(0.0, TERRAIN_CLIMB, 0.0);
    let mut memory = SeekMemory::default();
    Some(seek(&mut memory, ship, transform(ship, climb)))
}

/// Seek the objective, braking near patrol points and backing off a target
/// we are too close to.
pub fn seek_target(pilot: &mut Pilot, ship: &Ship, world: &AiWorld) -> Option<Steer> {
    let nav = &mut pilot.nav;
    let has_ward = world.roster.live(nav.ward).is_some();

    if nav.target.is_none() && !has_ward && nav.navpt.is_none() && nav.patrol.is_none() {
        let wanted = ship.element.index > 1 || nav.farcaster.is_some() || nav.rumor.is_some();
        return wanted.then(|| seek(&mut pilot.memory, ship, nav.objective));
    }

    if nav.patrol.is_some() {
        let mut result = seek(&mut pilot.memory, ship, nav.objective);
        if nav.distance < PATROL_BRAKE_RANGE {
            result.brake = 1.0;
        }
        return Some(result);
    }

    if nav.target.is_some() && nav.too_close == nav.target {
        nav.drop_time = TOO_CLOSE_DROP_SECS;
        return Some(avoid(ship, nav.objective, 0.0));
    }
    if nav.drop_time > 0.0 {
        return None;
    }

    Some(seek(&mut pilot.memory, ship, nav.objective))
}

/// Break away from a nearby threat: beam it in atmosphere, or run from a
/// starship with a jink every fourth second.
pub fn evade_threat(pilot: &mut Pilot, ship: &Ship, world: &AiWorld) -> Option<Steer> {
    if ship.order_action() == OrderAction::FormUp {
        return None;
    }
    let threat = world.roster.live(pilot.nav.threat)?;
    let threat_range = if threat.is_starship() {
        threat
            .weapons
            .iter()
            .map(|g| g.max_range())
            .fold(EVADE_RANGE, f64::max)
    } else {
        EVADE_RANGE
    };
    let threat_dist = threat.location.distance(ship.location);
    if threat_dist > threat_range {
        return None;
    }

    if ship.airborne {
        let beam = threat.velocity.cross(Point::Y).normalize_or_zero() * threat_range;
        let point = transform(ship, threat.location + beam);
        return Some(seek(&mut pilot.memory, ship, point));
    }

    if !threat.is_starship() {
        return None;
    }

    if pilot.nav.target == Some(threat.id) && threat_dist < threat_range / 4.0 {
        pilot.drop_target(5.0);
    }
    if pilot.nav.target.is_some() {
        return None;
    }

    if (ship.mission_clock as i64) & 3 != 3 {
        return Some(flee(ship, transform(ship, threat.location)));
    }

    if world.now - pilot.nav.evade_time > EVADE_INTERVAL_SECS {
        pilot.nav.evade_time = world.now;
        let index = pilot.rng.gen_range(0..EVADE_PATTERNS.len());
        pilot.nav.evade = evade_pattern(index);
    }
    Some(pilot.nav.evade)
}

// --- Actuation ---

/// Small-craft stick inputs from the blended steer.
pub fn stick_helm(ship: &Ship, steer: Steer, out: &mut AiOutput) {
    let mut yaw = steer.yaw;
    let mut pitch = steer.pitch;

    out.push(ActuatorCommand::SetHelmMode { helm: false });

    // saturated yaw with no pitch is a flee: pull up hard instead
    if (yaw.abs() - 1.0).abs() < FLEE_TOLERANCE && pitch.abs() < FLEE_TOLERANCE {
        pitch = 0.7;
        yaw *= 0.25;
    }

    out.push(ActuatorCommand::ApplyRoll { roll: yaw * 0.4 });
    out.push(ActuatorCommand::ApplyYaw { yaw: yaw * 0.2 });

    if yaw.abs() > 0.5 && pitch.abs() < 0.1 {
        pitch += 0.1;
    }
    if pitch != 0.0 {
        out.push(ActuatorCommand::ApplyPitch { pitch });
    }

    // not turning: roll wings level
    if yaw.abs() < 0.1 {
        let deflection = ship.basis.right.y;
        if deflection != 0.0 {
            out.push(ActuatorCommand::ApplyRoll {
                roll: deflection.clamp(-1.0, 1.0).asin(),
            });
        }
    }

    out.push(ActuatorCommand::SetTransX { thrust: 0.0 });
    out.push(ActuatorCommand::SetTransY { thrust: 0.0 });
    out.push(ActuatorCommand::SetTransZ { thrust: 0.0 });
}

/// Small-craft throttle. Launch, station keeping and stall recovery come
/// first, then transit home or through a farcaster, evasion, patrol and
/// formation flying, and finally the chase toward a target, ward or
/// navpoint. Airborne fighters never drop below the minimum throttle.
pub fn throttle_control(
    nav: &mut NavState,
    ship: &Ship,
    world: &AiWorld,
    steer: Steer,
    dt: f64,
    out: &mut AiOutput,
) {
    let ship_speed = ship.forward_speed();
    let old = nav.old_throttle;
    let stepped = ship.design.flight_model != FlightModel::Standard;
    let fighter_airborne = ship.airborne && ship.class() < ShipClass::Lca;
    let navpt = nav.navpt.and_then(|i| ship.navpoints.get(i));
    let lead = world
        .roster
        .live(ship.element.lead)
        .filter(|l| l.id != ship.id && ship.element.index > 1);

    let mut throttle: f64 = 0.0;
    let mut brakes: f64 = 0.0;
    let mut augmenter = false;

    if ship.mission_clock < TAKEOFF_DURATION_SECS {
        throttle = 100.0;
    } else if nav.distance < 0.0 {
        // station keeping: slow orbit if we cannot hover
        if fighter_airborne {
            throttle = STATION_KEEPING_THROTTLE;
        } else {
            brakes = 1.0;
        }
    } else if fighter_airborne && ship_speed < STALL_SPEED {
        throttle = 100.0;
        augmenter = ship_speed < AFTERBURNER_SPEED;
    } else if ship.order_action() == OrderAction::Rtb || nav.farcaster.is_some() {
        if nav.threat.is_some() {
            throttle = 100.0;
            augmenter = true;
        } else {
            let desired = FIGHTER_TRANSIT_SPEED;
            if ship_speed > desired + 5.0 {
                brakes = 0.25;
            } else if stepped {
                throttle = old + 1.0;
            } else if ship_speed < 0.85 * desired {
                throttle = 100.0;
            } else if ship_speed < desired - 5.0 {
                throttle = STATION_KEEPING_THROTTLE;
            }
        }
    } else if nav.evading {
        throttle = 100.0;
        augmenter = true;
    } else if navpt.is_none() && nav.target.is_none() && nav.ward.is_none() {
        match lead {
            None => match nav.patrol {
                Some(_) => {
                    let desired = if nav.distance > FIGHTER_PATROL_FAST_RANGE {
                        FIGHTER_PATROL_FAST_SPEED
                    } else {
                        FIGHTER_PATROL_SPEED
                    };
                    if ship_speed > desired + 5.0 {
                        brakes = 0.25;
                        throttle = old - 5.0;
                    } else if ship_speed < 0.85 * desired {
                        throttle = 100.0;
                    } else if ship_speed < desired - 5.0 {
                        throttle = old + 5.0;
                    } else {
                        throttle = old;
                    }
                }
                None => {
                    throttle = if nav.threat.is_some() {
                        100.0
                    } else {
                        LEAD_CRUISE_THROTTLE
                    };
                    brakes = steer.brake;
                    if brakes > 0.1 {
                        throttle = 0.0;
                    }
                }
            },
            Some(lead) => {
                (throttle, brakes, augmenter) = wingman_throttle(nav, ship, lead, dt);
            }
        }
    } else if nav.target.is_some() {
        throttle = 100.0;
        let range = nav.objective.z;
        if ship.ai_level < 1 {
            throttle = FIGHTER_NOVICE_THROTTLE;
        } else if ship.airborne {
            augmenter = range.abs() > FIGHTER_AIRBORNE_BURN_RANGE;
        } else if range > FIGHTER_BURN_RANGE && ship_speed < FIGHTER_ATTACK_SPEED {
            augmenter = true;
        } else if range > 0.0 && range < FIGHTER_CLOSING_RANGE {
            throttle = 50.0;
        }
    } else if let Some(ward) = world.roster.live(nav.ward) {
        throttle = old;
        if ward.location.distance(ship.location) > WARD_CLOSE_RANGE {
            throttle = if ship.ai_level < 1 { 50.0 } else { 80.0 };
        } else {
            let speed = ward.velocity.length();
            if speed > 0.0 {
                if ship_speed > speed {
                    throttle = old - 5.0;
                    brakes = 0.25;
                } else if ship_speed < speed - 10.0 {
                    throttle = old + 1.0;
                }
            }
        }
    } else if let Some(navpt) = navpt {
        let desired = navpt.speed;
        throttle = old;
        if nav.hold {
            if fighter_airborne {
                throttle = NAV_HOLD_THROTTLE;
            } else {
                throttle = 0.0;
                brakes = 1.0;
            }
        } else if desired > 0.0 {
            if ship_speed > desired {
                throttle = old - 5.0;
                brakes = 0.25;
            } else if ship_speed < 0.85 * desired {
                throttle = 100.0;
                augmenter = ship.airborne || ship_speed < 0.35 * desired;
            } else if ship_speed < desired - 10.0 {
                throttle = old + 1.0;
            }
        }
    } else {
        brakes = 1.0;
    }

    if fighter_airborne {
        throttle = throttle.max(AIRBORNE_MIN_THROTTLE);
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

/// Hold the formation slot: sprint when it is far ahead, brake when we
/// overshoot it, and trim toward the lead's speed once inside the zone.
fn wingman_throttle(nav: &NavState, ship: &Ship, lead: &Ship, dt: f64) -> (f64, f64, bool) {
    let old = nav.old_throttle;
    let zone = ship.radius() * WINGMAN_ZONE_RADII;
    let slot = nav.slot_dist;

    // no porpoising while the slot is mostly off to the side
    if slot.abs() < nav.distance / 4.0 {
        (old, 0.0, false)
    } else if slot > zone * 2.0 {
        let burn =
            nav.objective.z > WINGMAN_BURN_RANGE && ship.forward_speed() < lead.forward_speed();
        (100.0, 0.0, burn)
    } else if slot > zone {
        (lead.helm.throttle + 10.0, 0.0, false)
    } else if slot < -zone * 2.0 {
        (old - 10.0, 1.0, false)
    } else if slot < -zone {
        (old, 0.5, false)
    } else {
        let dv = lead.velocity.length() - ship.forward_speed();
        let gain = if dv > 0.0 {
            WINGMAN_CATCH_UP_GAIN
        } else {
            WINGMAN_THROTTLE_GAIN
        };
        (old + dv * gain * dt, 0.0, false)
    }
}

/// Fire the primary group when the target sits in the gun basket.
pub fn fire_control(nav: &NavState, ship: &Ship, world: &AiWorld, out: &mut AiOutput) {
    let Some(target) = world.roster.live(nav.target) else {
        return;
    };
    if target.in_transition || nav.farcaster.is_some() {
        return;
    }
    let flying_plan = nav
        .navpt
        .and_then(|i| ship.navpoints.get(i))
        .is_some_and(|n| !n.action.is_combat());
    if flying_plan {
        return;
    }

    let Some(primary) = ship.weapons.get(ship.primary_group) else {
        return;
    };
    if !primary.has_ammo() {
        return;
    }

    let local = ship.basis.to_local(target.location - ship.location);
    let distance = local.length();
    if local.z < 0.0 || distance < GUN_MIN_RANGE_RADII * ship.radius() || distance <= 0.0 {
        return;
    }

    let cross_section = 2.0 * target.radius() / distance;
    let basket = cross_section * GUN_BASKET_FACTOR * f64::from(3 - ship.ai_level.min(2));
    let dx = (local.x / distance).abs();
    let dy = (local.y / distance).abs();

    if dx < basket && dy < basket && distance < primary.max_range() {
        out.push(ActuatorCommand::FireGroup {
            group: ship.primary_group,
        });
    }
}

/// Full shield power while threatened, half otherwise.
pub fn adjust_defenses(nav: &NavState, ship: &Ship, out: &mut AiOutput) {
    let Some(shield) = ship.shield.as_ref() else {
        return;
    };
    let level = if nav.threat.is_some() {
        SHIELD_POWER_THREATENED
    } else {
        SHIELD_POWER_CALM
    };
    if shield.requested_power != level {
        out.push(ActuatorCommand::SetShieldPower { level });
    }
}
