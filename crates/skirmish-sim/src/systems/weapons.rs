//! Weapons system: cooldowns, trigger logic and shot spawning.
//!
//! A weapon fires when its orders and target allow it, it is in range, its
//! mount system is powered and working, it has ammo and it has cooled down.
//! Bolts and missiles lead their target; beams reach out to max range and
//! live for a single tick.
//!
//! Every mount's aim is refreshed each tick before anything fires: turrets
//! track their assigned target, fixed mounts and idle turrets rest on their
//! bore line.

use hecs::World;
use tracing::debug;

use skirmish_core::components::{Ship, Weapon, WeaponGroup};
use skirmish_core::constants::*;
use skirmish_core::enums::FiringOrders;
use skirmish_core::events::CombatEvent;
use skirmish_core::roster::Roster;
use skirmish_core::types::{Point, ShipId, ShotId};

use crate::shot::Shot;

/// Run one weapons tick. `fire_requests` are manual trigger pulls issued
/// this tick as (ship, group).
pub fn run(
    world: &mut World,
    roster: &Roster,
    fire_requests: &[(ShipId, usize)],
    next_shot_id: &mut u32,
    dt: f64,
    events: &mut Vec<CombatEvent>,
) {
    let mut spawned = Vec::new();

    for (_entity, ship) in world.query_mut::<&mut Ship>() {
        if !ship.is_alive() || ship.in_transition {
            continue;
        }
        slew(ship, Some(roster));

        for g in 0..ship.weapons.len() {
            let pulled = fire_requests.contains(&(ship.id, g));
            for w in 0..ship.weapons[g].weapons.len() {
                let weapon = &mut ship.weapons[g].weapons[w];
                weapon.cooldown = (weapon.cooldown - dt).max(0.0);

                let Some(target) = pick_target(ship, g, w, pulled, roster) else {
                    continue;
                };
                if let Some(shot) = fire(ship, g, w, target, next_shot_id) {
                    debug!(shooter = ship.id.0, target = target.id.0, group = g, "shot fired");
                    events.push(CombatEvent::ShotFired {
                        shooter: ship.id,
                        target: target.id,
                        group: g,
                    });
                    spawned.push(shot);
                }
            }
        }

        cycle_primary_group(ship, events);
    }

    for shot in spawned {
        world.spawn((shot,));
    }
}

/// Refresh every mount's aim direction. Without a roster turrets cannot
/// see their target and rest on the bore line.
pub fn slew(ship: &mut Ship, roster: Option<&Roster>) {
    for g in 0..ship.weapons.len() {
        for w in 0..ship.weapons[g].weapons.len() {
            let group = &ship.weapons[g];
            let weapon = &group.weapons[w];
            let tracked = weapon
                .turret
                .and_then(|_| roster?.live(weapon.target.or(group.target).or(ship.target)))
                .filter(|tgt| tgt.region == ship.region && !tgt.in_transition)
                .map(|tgt| (tgt.location - muzzle(ship, weapon)).normalize_or_zero())
                .filter(|dir| *dir != Point::ZERO);
            let aim = tracked.unwrap_or_else(|| bore(ship, weapon));
            ship.weapons[g].weapons[w].aim = aim;
        }
    }
}

/// Work out what a weapon would shoot at this tick, if anything.
fn pick_target<'r>(
    ship: &Ship,
    group: usize,
    index: usize,
    pulled: bool,
    roster: &'r Roster,
) -> Option<&'r Ship> {
    let g = &ship.weapons[group];
    let weapon = &g.weapons[index];
    let assigned = weapon.target.or(g.target).or(ship.target);

    let target = match weapon.firing_orders {
        FiringOrders::Manual if pulled => roster.live(assigned),
        FiringOrders::Manual => None,
        FiringOrders::Auto => roster.live(assigned),
        FiringOrders::PointDefense => roster
            .live(assigned)
            .filter(|t| !t.is_starship())
            .or_else(|| nearest_small_craft(ship, weapon, roster)),
    }?;

    let usable = target.region == ship.region
        && !target.in_transition
        && target.is_hostile_to(ship)
        && target.location.distance(ship.location) <= weapon.max_range;
    usable.then_some(target)
}

fn nearest_small_craft<'r>(ship: &Ship, weapon: &Weapon, roster: &'r Roster) -> Option<&'r Ship> {
    ship.contacts
        .iter()
        .filter_map(|c| roster.live(Some(c.ship)))
        .filter(|t| !t.is_starship() && !t.is_static() && t.is_hostile_to(ship))
        .map(|t| (t.location.distance(ship.location), t))
        .filter(|(d, _)| *d <= weapon.max_range)
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, t)| t)
}

/// Point of the muzzle in world space.
fn muzzle(ship: &Ship, weapon: &Weapon) -> Point {
    match weapon.turret {
        Some(pivot) => ship.local_to_world(pivot),
        None => ship.location + ship.basis.forward * ship.radius(),
    }
}

/// Bore line of a fixed mount.
fn bore(ship: &Ship, weapon: &Weapon) -> Point {
    let (s, c) = weapon.azimuth.sin_cos();
    ship.basis.to_world(Point::new(s, 0.0, c))
}

/// Aim point with lead on the target's relative motion.
fn aim_point(ship: &Ship, weapon: &Weapon, from: Point, target: &Ship) -> Point {
    let mut point = weapon
        .subtarget
        .and_then(|i| target.systems.get(i))
        .map_or(target.location, |sys| target.local_to_world(sys.mount));

    if !weapon.beam && weapon.shot_speed > 0.0 {
        let t = (point.distance(from) / weapon.shot_speed).min(LEAD_MAX_TIME_SECS);
        point += (target.velocity - ship.velocity) * t;
    }
    point
}

fn fire(ship: &mut Ship, group: usize, index: usize, target: &Ship, next_id: &mut u32) -> Option<Shot> {
    let weapon = &ship.weapons[group].weapons[index];
    let mount_ok = ship
        .systems
        .get(weapon.system)
        .is_some_and(|s| s.availability > 0.0 && s.powered);
    if !mount_ok || !weapon.has_ammo() || weapon.cooldown > 0.0 {
        return None;
    }

    let origin = muzzle(ship, weapon);
    let dir = (aim_point(ship, weapon, origin, target) - origin).normalize_or_zero();
    if dir == Point::ZERO {
        return None;
    }
    // fixed mounts only fire inside their forward arc
    if !weapon.is_turret() && dir.dot(bore(ship, weapon)).clamp(-1.0, 1.0).acos() > FORWARD_ARC {
        return None;
    }

    let shot = build_shot(ship, weapon, origin, dir, target.id, ShotId(*next_id));
    *next_id += 1;

    let weapon = &mut ship.weapons[group].weapons[index];
    weapon.aim = dir;
    weapon.cooldown = weapon.refire_secs;
    if let Some(rounds) = weapon.ammo.as_mut() {
        *rounds = rounds.saturating_sub(1);
    }
    Some(shot)
}

fn build_shot(ship: &Ship, weapon: &Weapon, origin: Point, dir: Point, target: ShipId, id: ShotId) -> Shot {
    let (location, velocity, life) = if weapon.beam {
        (origin + dir * weapon.max_range, Point::ZERO, DT)
    } else {
        (origin, dir * weapon.shot_speed + ship.velocity, SHOT_LIFE_SECS)
    };

    Shot {
        id,
        owner: ship.id,
        target: Some(target),
        region: ship.region,
        origin,
        location,
        velocity,
        damage: weapon.damage,
        damage_type: weapon.damage_type,
        penetration: weapon.penetration,
        lethal_radius: weapon.lethal_radius,
        beam: weapon.beam,
        missile: weapon.guided,
        life,
        overshot: false,
        last_range: 0.0,
        spent: false,
    }
}

/// Select the next group with ammo once the primary group runs dry.
fn cycle_primary_group(ship: &mut Ship, events: &mut Vec<CombatEvent>) {
    let count = ship.weapons.len();
    if count < 2 || ship.weapons.get(ship.primary_group).map_or(true, WeaponGroup::has_ammo) {
        return;
    }
    let next = (1..count)
        .map(|step| (ship.primary_group + step) % count)
        .find(|&g| ship.weapons[g].has_ammo());
    if let Some(group) = next {
        ship.primary_group = group;
        debug!(ship = ship.id.0, group, "primary weapon group cycled");
        events.push(CombatEvent::WeaponGroupCycled { ship: ship.id, group });
    }
}
