//! Starship fire control: subtarget choice, point-defense assessment, and
//! per-group firing orders.
//!
//! Both assessments read the target's weapon fit and are throttled by their
//! own timers in `FireControlState`, returning the cached answer in between.

use skirmish_core::components::{Ship, Weapon};
use skirmish_core::constants::*;
use skirmish_core::enums::{FiringOrders, Sweep};
use skirmish_core::types::Point;

use crate::command::{ActuatorCommand, AiOutput};
use crate::pilot::{FireControlState, NavState};
use crate::step::AiWorld;

/// A weapon on `tgt` worth aiming at: healthy enough and pointed our way.
fn is_threatening(tgt: &Ship, weapon: &Weapon, svec: Point, floor: f64) -> bool {
    tgt.system_availability(weapon.system) >= floor && weapon.aim.dot(svec) >= 0.0
}

/// Pick the nearest threatening weapon system on the target, preferring
/// turrets. Returns a system index on the target.
pub fn select_subtarget(
    fire: &mut FireControlState,
    ship: &Ship,
    target: Option<&Ship>,
    world: &AiWorld,
) -> Option<usize> {
    if world.now < fire.next_subtarget_time {
        return fire.subtarget;
    }
    fire.subtarget = None;

    let Some(tgt) = target else {
        return None;
    };
    if ship.ai_level < 1 || !tgt.is_starship() {
        return None;
    }

    fire.next_subtarget_time = world.now + world.tuning.subtarget_interval;

    let floor = world.tuning.subtarget_min_availability;
    let svec = ship.location - tgt.location;
    let mut best = None;
    let mut best_dist = SUBTARGET_MAX_RANGE;

    // turrets first
    for weapon in tgt.weapons.iter().flat_map(|g| g.weapons.iter()) {
        let Some(pivot) = weapon.turret else {
            continue;
        };
        if !is_threatening(tgt, weapon, svec, floor) {
            continue;
        }
        let dist = tgt.local_to_world(pivot).distance(ship.location);
        if dist < best_dist {
            best = Some(weapon.system);
            best_dist = dist;
        }
    }

    if best.is_none() {
        for weapon in tgt.weapons.iter().flat_map(|g| g.weapons.iter()) {
            if weapon.is_turret() || !is_threatening(tgt, weapon, svec, floor) {
                continue;
            }
            let Some(system) = tgt.systems.get(weapon.system) else {
                continue;
            };
            let dist = tgt.local_to_world(system.mount).distance(ship.location);
            if dist < best_dist {
                best = Some(weapon.system);
                best_dist = dist;
            }
        }
    }

    fire.subtarget = best;
    best
}

/// Whether the target's point defense covers our approach.
pub fn assess_target_point_defense(
    fire: &mut FireControlState,
    ship: &Ship,
    target: Option<&Ship>,
    world: &AiWorld,
) -> bool {
    if world.now < fire.next_point_defense_time {
        return fire.target_point_defense;
    }
    fire.target_point_defense = false;

    let Some(tgt) = target else {
        return false;
    };
    if ship.ai_level < 2 || !tgt.is_starship() {
        return false;
    }

    fire.next_point_defense_time = world.now + world.tuning.point_defense_interval;

    let floor = world.tuning.subtarget_min_availability;
    let svec = ship.location - tgt.location;
    fire.target_point_defense = tgt
        .weapons
        .iter()
        .filter(|g| g.point_defense)
        .flat_map(|g| g.weapons.iter())
        .any(|w| tgt.system_availability(w.system) > floor && w.aim.dot(svec) > 0.0);

    fire.target_point_defense
}

/// Set firing orders for every weapon group on a starship.
pub fn fire_control(
    nav: &mut NavState,
    fire: &mut FireControlState,
    ship: &Ship,
    world: &AiWorld,
    out: &mut AiOutput,
) {
    if nav.identify {
        return;
    }

    let target = world.roster.live(nav.target);
    let target_id = target.map(|t| t.id);

    // anti-air escorts: forward arc engages, everything else covers the fleet
    if ship.class().is_anti_air_escort() {
        for (g, group) in ship.weapons.iter().enumerate() {
            for (w, weapon) in group.weapons.iter().enumerate() {
                if weapon.azimuth.abs() < FORWARD_ARC {
                    out.push(ActuatorCommand::SetWeaponOrders {
                        group: g,
                        weapon: w,
                        orders: FiringOrders::Auto,
                    });
                    out.push(ActuatorCommand::SetWeaponTarget {
                        group: g,
                        weapon: w,
                        target: target_id,
                    });
                } else {
                    out.push(ActuatorCommand::SetWeaponOrders {
                        group: g,
                        weapon: w,
                        orders: FiringOrders::PointDefense,
                    });
                }
            }
        }
        return;
    }

    let subtarget = select_subtarget(fire, ship, target, world);
    nav.subtarget = subtarget;

    for (g, group) in ship.weapons.iter().enumerate() {
        if group.point_defense {
            out.push(ActuatorCommand::SetGroupOrders {
                group: g,
                orders: FiringOrders::PointDefense,
            });
        } else if group.drone {
            let mut orders = FiringOrders::Manual;
            if let Some(tgt) = target.filter(|t| t.region == ship.region) {
                let range = tgt.location.distance(ship.location);
                let max_range = group.max_range();
                if range < max_range * DRONE_OPEN_RANGE_FRACTION
                    && !assess_target_point_defense(fire, ship, target, world)
                {
                    orders = FiringOrders::Auto;
                } else if range < max_range * DRONE_CLOSE_RANGE_FRACTION {
                    orders = FiringOrders::Auto;
                }
            }
            out.push(ActuatorCommand::SetGroupOrders { group: g, orders });
            out.push(ActuatorCommand::SetGroupTarget {
                group: g,
                target: target_id,
                subtarget: None,
                sweep: group.sweep,
            });
        } else {
            out.push(ActuatorCommand::SetGroupOrders {
                group: g,
                orders: FiringOrders::Auto,
            });
            out.push(ActuatorCommand::SetGroupTarget {
                group: g,
                target: target_id,
                subtarget,
                sweep: if subtarget.is_some() {
                    Sweep::None
                } else {
                    Sweep::Tight
                },
            });
        }
    }
}
