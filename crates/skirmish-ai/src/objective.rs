//! Objective computation shared by the small-craft and starship pilots.
//!
//! Each tick the pilot picks one world-space point to steer toward: a target
//! (with lead), a patrol point, the ward or formation slot, a navpoint, a
//! farcaster gate, or nothing at all. `nav.obj_w` holds the world point and
//! `nav.objective` the same point in the hull's steering frame.

use skirmish_core::components::Ship;
use skirmish_core::constants::*;
use skirmish_core::enums::{NavAction, NavStatus, OrderAction, QuantumState, Roe, SystemStatus};
use skirmish_core::types::{Basis, Point, RegionId};

use crate::command::{ActuatorCommand, AiOutput};
use crate::pilot::{NavState, Pilot};
use crate::step::AiWorld;

/// Express a world point in the frame the hull steers in: a world-relative
/// offset for starships, the ship-local frame for small craft.
pub fn transform(ship: &Ship, obj_w: Point) -> Point {
    let rel = obj_w - ship.location;
    if ship.is_starship() {
        rel
    } else {
        ship.basis.to_local(rel)
    }
}

/// Orders that keep a wingman on the leader's wing.
fn keeps_formation(action: OrderAction) -> bool {
    matches!(
        action,
        OrderAction::WepHold
            | OrderAction::FormUp
            | OrderAction::MovePatrol
            | OrderAction::Rtb
            | OrderAction::DockWith
    )
}

/// Generic objective selection for small craft.
pub fn find_objective(pilot: &mut Pilot, ship: &Ship, world: &AiWorld, out: &mut AiOutput) {
    let directed = pilot.roe() == Roe::Directed;
    let nav = &mut pilot.nav;
    nav.distance = 0.0;

    let order = ship.order_action();
    if matches!(order, OrderAction::QuantumTo | OrderAction::FarcastTo) {
        find_objective_quantum(nav, ship, world, out);
        nav.objective = transform(ship, nav.obj_w);
        return;
    }

    let form = keeps_formation(order)
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

    if threat_response(nav, ship, world, directed) {
        return;
    }

    if !pursue_standard(nav, ship, world, out, form) {
        nav.obj_w = Point::ZERO;
        nav.objective = Point::ZERO;
    }
}

/// Regroup on support or run from the threat. Returns true when the
/// objective was set.
pub fn threat_response(nav: &mut NavState, ship: &Ship, world: &AiWorld, directed: bool) -> bool {
    if directed {
        return false;
    }
    let Some(threat) = world.roster.live(nav.threat) else {
        return false;
    };

    if let Some(support) = world.roster.live(nav.support) {
        if support.location.distance(ship.location) > REGROUP_RANGE {
            find_objective_target(nav, ship, support);
            nav.objective = transform(ship, nav.obj_w);
            return true;
        }
    } else if nav.target != Some(threat.id) {
        nav.obj_w = ship.location + (ship.location - threat.location) * RETREAT_SCALE;
        nav.objective = transform(ship, nav.obj_w);
        return true;
    }

    false
}

/// Target, patrol, ward, navpoint (when `use_navpt`), then rumor. Returns
/// false when none of them applies.
pub fn pursue_standard(
    nav: &mut NavState,
    ship: &Ship,
    world: &AiWorld,
    out: &mut AiOutput,
    use_navpt: bool,
) -> bool {
    let roster = world.roster;

    if let Some(target) = roster.live(nav.target) {
        find_objective_target(nav, ship, target);
    } else if nav.patrol.is_some() {
        find_objective_patrol(nav, ship, out);
    } else if roster.live(nav.ward).is_some() {
        find_objective_formation(nav, ship, world);
    } else if use_navpt && nav.navpt.is_some() {
        find_objective_navpoint(nav, ship, world, out);
    } else if let Some(rumor) = roster.live(nav.rumor) {
        find_objective_target(nav, ship, rumor);
    } else {
        return false;
    }

    nav.objective = transform(ship, nav.obj_w);
    true
}

/// Relative velocity we close on the target with.
pub fn closing_velocity(ship: &Ship, tgt: &Ship) -> Point {
    if ship.is_armed() {
        ship.velocity - tgt.velocity
    } else {
        ship.velocity
    }
}

/// Intercept point on a moving ship, with bracketing offsets for wingmen.
pub fn find_objective_target(nav: &mut NavState, ship: &Ship, tgt: &Ship) {
    // chasing a target, not flying the plan
    nav.navpt = None;

    let cv = closing_velocity(ship, tgt);
    let cvl = cv.length();
    nav.obj_w = tgt.location;

    if cvl > LEAD_MIN_CLOSING_SPEED {
        let time = tgt.location.distance(ship.location) / cvl;
        if time < LEAD_MAX_TIME_SECS {
            nav.obj_w = tgt.location + tgt.velocity * time;
        }

        let time = nav.obj_w.distance(ship.location) / cvl;
        if time < LEAD_MAX_TIME_SECS {
            // correct for where our own motion will carry us
            let self_dest = ship.location + cv * time;
            nav.obj_w += nav.obj_w - self_dest;
        }
    }

    let approach = nav.obj_w - ship.location;
    nav.distance = approach.length();

    if nav.bracket && nav.distance > BRACKET_RANGE {
        let offset = approach.cross(Point::Y).normalize_or_zero() * BRACKET_OFFSET;
        if ship.element.index & 1 == 1 {
            nav.obj_w -= offset;
        } else {
            nav.obj_w += offset;
        }
    }
}

pub fn find_objective_patrol(nav: &mut NavState, ship: &Ship, out: &mut AiOutput) {
    nav.navpt = None;
    let Some(patrol) = nav.patrol else {
        return;
    };
    nav.obj_w = patrol;
    nav.distance = patrol.distance(ship.location);

    if nav.distance < ARRIVAL_RADIUS {
        if ship.order_action() == OrderAction::MovePatrol {
            out.push(ActuatorCommand::ClearRadioOrders);
        }
        nav.patrol = None;
    }
}

/// True when a trip to `dest` has to go through a farcaster: the plan asks
/// for one, or the quantum drive can't make the jump.
pub fn uses_farcaster(ship: &Ship, dest: RegionId, farcast: bool) -> bool {
    if ship.region == dest {
        return false;
    }
    farcast
        || ship.quantum_drive.is_none()
        || !ship.quantum_powered()
        || ship
            .quantum_status()
            .map_or(true, |s| s < SystemStatus::Degraded)
}

/// Location inside `region` expressed in the ship's current region.
pub fn region_point(world: &AiWorld, ship: &Ship, region: RegionId, location: Point) -> Point {
    world
        .roster
        .star_system
        .offset(ship.region, region)
        .map_or(location, |offset| offset + location)
}

/// Follow the current farcaster through to its exit in our region.
/// Returns the gate's end point if one is still locked.
pub fn farcaster_exit(nav: &mut NavState, ship: &Ship, world: &AiWorld) -> Option<Point> {
    let roster = world.roster;
    let id = nav.farcaster?;
    match roster.get(id) {
        Some(carrier) if carrier.region != ship.region => {
            nav.farcaster = carrier.farcaster.as_ref().and_then(|f| f.dest);
        }
        None => nav.farcaster = None,
        _ => {}
    }
    let points = nav.farcaster.and_then(|id| roster.farcaster_points(id));
    if points.is_none() {
        nav.farcaster = None;
    }
    points.map(|p| p.end)
}

pub fn find_objective_navpoint(
    nav: &mut NavState,
    ship: &Ship,
    world: &AiWorld,
    out: &mut AiOutput,
) {
    let Some(index) = nav.navpt else {
        return;
    };
    let Some(navpt) = ship.navpoints.get(index) else {
        nav.navpt = None;
        return;
    };
    let nav_region = navpt.region.unwrap_or(ship.region);

    if uses_farcaster(ship, nav_region, navpt.farcast) {
        find_objective_farcaster(nav, ship, world, nav_region);
        return;
    }

    nav.obj_w = match farcaster_exit(nav, ship, world) {
        Some(end) => end,
        None => region_point(world, ship, nav_region, navpt.location),
    };

    nav.distance = nav.obj_w.distance(ship.location);

    // reaching the gate exit only releases the gate; the navpoint is still ahead
    if nav.farcaster.is_some() {
        if nav.distance < ARRIVAL_RADIUS {
            nav.farcaster = None;
        }
    } else if nav.distance < ARRIVAL_RADIUS
        || (navpt.action == NavAction::Launch && nav.distance > LAUNCH_COMPLETE_RANGE)
    {
        complete_navpoint(ship, index, out);
    }
}

pub fn complete_navpoint(ship: &Ship, index: usize, out: &mut AiOutput) {
    if ship.navpoints.get(index).is_some_and(|n| n.status != NavStatus::Complete) {
        out.push(ActuatorCommand::SetNavptStatus {
            index,
            status: NavStatus::Complete,
        });
    }
}

/// Objective for a quantum or farcast radio order.
pub fn find_objective_quantum(
    nav: &mut NavState,
    ship: &Ship,
    world: &AiWorld,
    out: &mut AiOutput,
) {
    let Some(order) = ship.orders.as_ref() else {
        return;
    };
    let Some(dest) = order.region else {
        return;
    };

    if uses_farcaster(ship, dest, order.farcast) {
        find_objective_farcaster(nav, ship, world, dest);
        return;
    }

    match farcaster_exit(nav, ship, world) {
        Some(end) => nav.obj_w = end,
        None => {
            nav.obj_w = region_point(world, ship, dest, order.location);
            let ready = ship
                .quantum_drive
                .as_ref()
                .is_some_and(|q| q.state == QuantumState::Ready);
            if ready && dest != ship.region {
                out.push(ActuatorCommand::EngageQuantum {
                    region: dest,
                    location: order.location,
                });
                return;
            }
        }
    }

    nav.distance = nav.obj_w.distance(ship.location);

    if nav.farcaster.is_some() {
        if nav.distance < ARRIVAL_RADIUS {
            nav.farcaster = None;
            out.push(ActuatorCommand::ClearRadioOrders);
        }
    } else if ship.region == dest {
        out.push(ActuatorCommand::ClearRadioOrders);
    }
}

/// Lock a farcaster toward `dest` and steer for its approach lane.
pub fn find_objective_farcaster(nav: &mut NavState, ship: &Ship, world: &AiWorld, dest: RegionId) {
    if nav.farcaster.is_none() {
        nav.farcaster = world.roster.find_farcaster(ship.region, dest);
    }
    let Some(points) = nav.farcaster.and_then(|id| world.roster.farcaster_points(id)) else {
        nav.farcaster = None;
        return;
    };

    let r1 = ship.location.distance(points.start);
    if r1 > FARCASTER_APPROACH_RANGE {
        nav.obj_w = points.approach;
        nav.distance = r1;
    } else {
        let r2 = ship.location.distance(points.approach);
        let r3 = points.start.distance(points.approach);
        // already in the lane: head for the gate itself
        if r1 + r2 < FARCASTER_APPROACH_RATIO * r3 {
            nav.obj_w = points.start;
            nav.distance = r1;
        } else {
            nav.obj_w = points.approach;
            nav.distance = r2;
        }
    }
    nav.objective = transform(ship, nav.obj_w);
}

/// Formation slot off the element lead, or station keeping on a slow ward.
pub fn find_objective_formation(nav: &mut NavState, ship: &Ship, world: &AiWorld) {
    let roster = world.roster;
    nav.slot_dist = 0.0;
    let lead = roster
        .live(ship.element.lead)
        .filter(|l| l.id != ship.id && ship.element.index > 1);

    let lead = match lead {
        Some(lead) => lead,
        None => {
            let Some(ward) = roster.live(nav.ward) else {
                nav.obj_w = Point::ZERO;
                return;
            };
            nav.distance = ward.location.distance(ship.location);
            if nav.distance < WARD_HOLD_RANGE && ward.velocity.length() < WARD_STATIONARY_SPEED {
                nav.obj_w = ship.location + ward.basis.forward * 1.0e6;
                nav.distance = -1.0;
                return;
            }
            ward
        }
    };

    let slot = Basis::from_heading(lead.basis.heading(), 0.0).to_world(nav.formation_delta);
    nav.obj_w = lead.location + lead.velocity * FORMATION_PREDICTION_SECS + slot;

    if ship.airborne
        && (ship.altitude_agl < FORMATION_LOW_AGL || lead.altitude_agl < FORMATION_LOW_AGL)
    {
        nav.obj_w.y += FORMATION_ALTITUDE_BUMP;
    }

    let predicted = ship.location + ship.velocity * FORMATION_PREDICTION_SECS;
    nav.distance = nav.obj_w.distance(predicted);
    nav.slot_dist = ship.basis.to_local(nav.obj_w - predicted).z;

    // follow the element's flight plan through a farcaster
    let Some(navpt) = ship.next_navpoint().and_then(|i| ship.navpoints.get(i)) else {
        nav.farcaster = None;
        return;
    };
    let nav_region = navpt.region.unwrap_or(ship.region);
    if uses_farcaster(ship, nav_region, navpt.farcast) {
        if nav.farcaster.is_none() {
            nav.farcaster = roster.find_farcaster(ship.region, nav_region);
        }
    } else if nav.farcaster.is_some() {
        if let Some(end) = farcaster_exit(nav, ship, world) {
            nav.obj_w = end;
            nav.distance = end.distance(ship.location);
            if nav.distance < ARRIVAL_RADIUS {
                nav.farcaster = None;
            }
        }
    }
}

/// Forget a target that died or turned friendly.
pub fn check_target(nav: &mut NavState, ship: &Ship, world: &AiWorld) {
    let Some(id) = nav.target else {
        return;
    };
    match world.roster.live(Some(id)) {
        None => nav.target = None,
        Some(tgt) if tgt.iff == ship.iff && !tgt.rogue => nav.target = None,
        _ => {}
    }
    if nav.target.is_none() {
        nav.subtarget = None;
    }
}
