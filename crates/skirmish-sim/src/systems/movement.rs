//! Flight integration and region transit.
//!
//! Turns each hull toward its helm or stick demand at the design turn rate,
//! drives forward speed toward the throttle set-point, then moves the ship.
//! Also runs the quantum drive state machine, farcaster transits and the
//! hold timers on completed navpoints.

use hecs::World;
use tracing::info;

use skirmish_ai::Pilot;
use skirmish_core::components::Ship;
use skirmish_core::constants::*;
use skirmish_core::enums::{NavStatus, QuantumState};
use skirmish_core::events::CombatEvent;
use skirmish_core::types::{wrap_angle, Point, RegionId, ShipId};

/// Afterburner multiplier on thrust and top speed.
const AUGMENTER_BOOST: f64 = 1.5;

/// A farcaster gate resolved to world coordinates.
#[derive(Debug, Clone, Copy)]
struct Gate {
    carrier: ShipId,
    region: RegionId,
    start: Point,
    end: Point,
    dest: Option<ShipId>,
}

pub fn run(world: &mut World, dt: f64, events: &mut Vec<CombatEvent>) {
    let gates: Vec<Gate> = world
        .query::<&Ship>()
        .iter()
        .filter_map(|(_, s)| {
            let gate = s.farcaster.as_ref()?;
            Some(Gate {
                carrier: s.id,
                region: s.region,
                start: s.location + gate.start,
                end: s.location + gate.end,
                dest: gate.dest,
            })
        })
        .collect();

    for (_entity, (ship, pilot)) in world.query_mut::<(&mut Ship, Option<&Pilot>)>() {
        if !ship.is_alive() {
            continue;
        }
        ship.mission_clock += dt;

        quantum_frame(ship, dt, events);
        if ship.in_transition {
            continue;
        }

        steer(ship, dt);
        propel(ship, dt);
        ship.location += ship.velocity * dt;

        if let Some(locked) = pilot.and_then(|p| p.nav.farcaster) {
            farcast(ship, locked, &gates, events);
        }
        hold_timers(ship, dt);
    }
}

/// Wrap an angle difference into (-π, π].
fn angle_diff(target: f64, current: f64) -> f64 {
    let d = wrap_angle(target - current);
    if d > std::f64::consts::PI {
        d - std::f64::consts::TAU
    } else {
        d
    }
}

fn steer(ship: &mut Ship, dt: f64) {
    let rate = ship.design.turn_rate * dt;

    if ship.helm.helm_mode {
        let yaw = angle_diff(ship.helm.heading, ship.basis.heading()).clamp(-rate, rate);
        let pitch = (ship.helm.pitch - ship.basis.pitch()).clamp(-rate, rate);
        // capital hulls stay wings-level
        let roll = ship.basis.right.y.clamp(-1.0, 1.0).asin().clamp(-rate, rate);
        ship.basis.turn(yaw, pitch, roll);
    } else {
        let stick = ship.helm.stick;
        ship.basis.turn(stick.y * rate, stick.x * rate, stick.z * rate);
    }
}

fn propel(ship: &mut Ship, dt: f64) {
    let design = &ship.design;
    let forward = ship.basis.forward;
    let speed = ship.velocity.dot(forward);
    let lateral = ship.velocity - forward * speed;

    if ship.helm.full_stop {
        let v = ship.velocity.length();
        let slowed = (v - design.trans_thrust * dt).max(0.0);
        ship.velocity = ship.velocity.normalize_or_zero() * slowed;
        return;
    }

    let boost = if ship.helm.augmenter { AUGMENTER_BOOST } else { 1.0 };
    let set_point = design.vlimit * boost * ship.helm.throttle / 100.0;
    let accel = design.thrust * boost * dt;
    let speed = speed + (set_point - speed).clamp(-accel, accel);

    // lateral drift bleeds off; translation thrusters act in the ship frame
    let trans = ship.basis.to_world(ship.helm.trans) * dt;
    let lateral = lateral * (1.0 - dt).max(0.0);

    ship.velocity = forward * speed + lateral + trans;
    let limit = design.vlimit * boost;
    if ship.velocity.length() > limit {
        ship.velocity = ship.velocity.normalize_or_zero() * limit;
    }
}

fn quantum_frame(ship: &mut Ship, dt: f64, events: &mut Vec<CombatEvent>) {
    let id = ship.id;
    let Some(drive) = ship.quantum_drive.as_mut() else {
        return;
    };

    match drive.state {
        QuantumState::Ready => {}
        QuantumState::Countdown => {
            drive.timer -= dt;
            if drive.timer <= 0.0 {
                drive.state = QuantumState::Jump;
                ship.in_transition = true;
            }
        }
        QuantumState::Jump => {
            if let Some((region, location)) = drive.destination.take() {
                ship.region = region;
                ship.location = location;
                ship.contacts.clear();
                info!(ship = id.0, region = region.0, "quantum arrival");
                events.push(CombatEvent::QuantumArrived { ship: id, region });
            }
            drive.state = QuantumState::PostWarp;
            drive.timer = QUANTUM_POST_WARP_SECS;
            ship.in_transition = false;
        }
        QuantumState::PostWarp => {
            drive.timer -= dt;
            if drive.timer <= 0.0 {
                drive.state = QuantumState::Ready;
                drive.timer = 0.0;
            }
        }
    }
}

/// Send a ship through the gate it is committed to once it reaches the
/// gate's far end. It comes out at the start of the paired gate.
fn farcast(ship: &mut Ship, locked: ShipId, gates: &[Gate], events: &mut Vec<CombatEvent>) {
    let Some(gate) = gates.iter().find(|g| g.carrier == locked) else {
        return;
    };
    if gate.carrier == ship.id || gate.region != ship.region {
        return;
    }
    if ship.location.distance(gate.end) > FARCASTER_TRIGGER_RANGE {
        return;
    }
    let Some(exit) = gate.dest.and_then(|d| gates.iter().find(|g| g.carrier == d)) else {
        return;
    };

    ship.region = exit.region;
    ship.location = exit.start;
    ship.contacts.clear();
    info!(
        ship = ship.id.0,
        region = exit.region.0,
        gate = gate.carrier.0,
        "farcaster transit"
    );
    events.push(CombatEvent::QuantumArrived {
        ship: ship.id,
        region: exit.region,
    });
}

fn hold_timers(ship: &mut Ship, dt: f64) {
    if ship.element.hold_time > 0.0 {
        ship.element.hold_time = (ship.element.hold_time - dt).max(0.0);
    }
    if let Some(index) = ship.next_navpoint() {
        let navpt = &mut ship.navpoints[index];
        if navpt.status == NavStatus::Complete && navpt.hold_time > 0.0 {
            navpt.hold_time = (navpt.hold_time - dt).max(0.0);
        }
    }
}
