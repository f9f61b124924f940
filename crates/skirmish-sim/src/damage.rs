//! Damage model: shield deflection, hull integrity and subsystem damage.
//!
//! Everything here works on one `&mut Ship`. Energy that gets past the
//! shield is split between the nearest subsystem and the hull, and the two
//! shares always add up to that energy.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use skirmish_core::components::{Shield, Ship, SimSystem, SystemPart};
use skirmish_core::config::CombatTuning;
use skirmish_core::constants::*;
use skirmish_core::enums::{DamageType, HitMask, PartStatus, SystemStatus};
use skirmish_core::events::CombatEvent;
use skirmish_core::types::{Point, ShipId};

use crate::shot::{check_shot_intersection, distance_to_segment, Impact, Shot};

/// Shared state for resolving damage on one tick.
pub struct DamageContext<'a> {
    pub tuning: &'a CombatTuning,
    pub rng: &'a mut ChaCha8Rng,
    pub events: &'a mut Vec<CombatEvent>,
    pub paused: bool,
}

/// The weapon properties a hit needs. Collisions carry no strike.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Strike {
    pub shooter: ShipId,
    pub damage_type: DamageType,
    pub penetration: f64,
    pub missile: bool,
    pub beam: bool,
}

impl Strike {
    pub fn from_shot(shot: &Shot) -> Self {
        Self {
            shooter: shot.owner,
            damage_type: shot.damage_type,
            penetration: shot.penetration,
            missile: shot.missile,
            beam: shot.beam,
        }
    }
}

/// How one hit's energy was divided between a subsystem and the hull.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DamageSplit {
    /// Subsystem struck, if one was in range.
    pub system: Option<usize>,
    pub system_share: f64,
    pub hull_share: f64,
}

impl DamageSplit {
    fn hull_only(amount: f64) -> Self {
        Self {
            system: None,
            system_share: 0.0,
            hull_share: amount,
        }
    }
}

// --- Hits ---

/// Resolve a shot against a ship: gate, intersect, then inflict damage.
pub fn hit_by(ship: &mut Ship, shot: &Shot, ctx: &mut DamageContext) -> Impact {
    let miss = Impact::miss(shot.location);
    if shot.owner == ship.id || ship.net_observer || ship.in_transition {
        return miss;
    }

    let mut scale = 1.0;
    let impact = if shot.missile {
        let dist = shot.location.distance(ship.location);
        let mut impact = miss;
        if dist < ship.radius() {
            impact = check_shot_intersection(ship, shot);
        }

        // an overshooting missile still hurts, less the farther it passed
        let reach = shot.lethal_radius + ship.radius();
        if !impact.hit.is_hit() && shot.overshot && dist < reach {
            scale = (1.0 - dist / reach).clamp(0.0, 1.0);
            impact.hit = if ship.shield_strength() > SHIELD_HIT_MIN_STRENGTH {
                HitMask::BOTH
            } else {
                HitMask::HULL
            };
        }
        impact
    } else {
        let pass = distance_to_segment(ship.location, shot.origin, shot.location);
        if !shot.beam && pass > ship.radius() * DIRECT_HIT_RADIUS_FACTOR {
            return miss;
        }
        check_shot_intersection(ship, shot)
    };

    if impact.hit.is_hit() {
        let amount = shot.damage * scale;
        if amount > 0.0 {
            let strike = Strike::from_shot(shot);
            let applied = inflict_damage(ship, amount, Some(&strike), impact.hit, impact.hull_point, ctx);
            ctx.events.push(CombatEvent::Hit {
                ship: ship.id,
                shooter: shot.owner,
                hit: impact.hit,
                damage: amount,
                hull_damage: applied,
            });
        }
    }
    impact
}

/// Apply `amount` of damage arriving through `hit`. Returns the damage
/// taken off hull integrity.
pub fn inflict_damage(
    ship: &mut Ship,
    amount: f64,
    strike: Option<&Strike>,
    hit: HitMask,
    impact: Point,
    ctx: &mut DamageContext,
) -> f64 {
    if ctx.paused || ship.net_observer || ship.invulnerable || !ship.is_alive() {
        return 0.0;
    }

    let mut hull_damage = amount;
    if hit.contains(HitMask::SHIELD) && ship.shield_strength() > 0.0 {
        let availability = ship
            .shield
            .as_ref()
            .map_or(0.0, |s| ship.system_availability(s.system));
        if let Some(shield) = ship.shield.as_mut() {
            hull_damage = deflect_damage(shield, availability, strike, amount);
        }
    }

    let normal = strike.map_or(true, |s| s.damage_type == DamageType::Normal);
    let mut applied = 0.0;

    if hit.contains(HitMask::HULL) {
        let split = inflict_system_damage(ship, hull_damage, strike, impact, ctx);
        if normal {
            applied = split.hull_share;
        }
    } else if hit.contains(HitMask::TURRET) {
        let split = inflict_system_damage(ship, hull_damage, strike, impact, ctx);
        if normal {
            applied = split.hull_share * TURRET_DAMAGE_SCALE;
        }
    }

    let before = ship.integrity;
    if applied > 0.0 {
        apply_hull_damage(ship, applied, ctx);
    }

    if ship.design.integrity > 0.0 {
        ship.shake = (ship.shake + SHAKE_GAIN * amount / ship.design.integrity).min(SHAKE_MAX);
    }

    let fires = ship.is_starship() || ship.is_static() || ctx.rng.gen_ratio(1, 3);
    if hit.contains(HitMask::HULL) && applied > 0.0 && fires {
        update_fire_band(ship, before, ctx);
    }

    applied
}

/// Collision damage. No subsystem is singled out; a random subset of
/// systems takes a knock instead.
pub fn inflict_collision_damage(ship: &mut Ship, amount: f64, ctx: &mut DamageContext) -> f64 {
    let location = ship.location;
    inflict_damage(ship, amount, None, HitMask::HULL, location, ctx)
}

/// Shield absorption. Returns the damage that leaks through.
pub fn deflect_damage(
    shield: &mut Shield,
    availability: f64,
    strike: Option<&Strike>,
    damage: f64,
) -> f64 {
    let penetration = strike.map_or(DEFAULT_PENETRATION, |s| s.penetration);
    let filter = (1.0 - shield.factor * penetration).clamp(0.0, 1.0);

    // a drained capacitor lets everything through
    if shield.capacitor && shield.cutoff > 0.0 && shield.level < 1e-6 {
        shield.energy = (shield.energy - damage * shield.deflection_cost).max(0.0);
        return damage;
    }

    let absorbed = shield.level.powf(shield.curve) * filter * (availability / 100.0);
    let leak = (damage * (1.0 - absorbed)).clamp(0.0, damage);

    if shield.capacitor {
        let deflected = damage - leak;
        shield.energy = (shield.energy - deflected * shield.deflection_cost).max(0.0);
    }
    leak
}

/// Route hull-bound damage to the nearest subsystem in range.
pub fn inflict_system_damage(
    ship: &mut Ship,
    damage: f64,
    strike: Option<&Strike>,
    impact: Point,
    ctx: &mut DamageContext,
) -> DamageSplit {
    if ship.net_observer {
        return DamageSplit::default();
    }
    let Some(strike) = strike else {
        return spread_collision_damage(ship, damage, ctx);
    };

    let emp = strike.damage_type == DamageType::Emp;
    if strike.damage_type == DamageType::Power {
        let to_level = (1.0 - damage / POWER_DRAIN_SCALE).max(0.0);
        for reactor in &mut ship.reactors {
            reactor.charge = reactor.charge.min(reactor.capacity * to_level);
        }
    }

    let blast = if strike.missile {
        ctx.tuning.missile_blast_radius
    } else {
        0.0
    };

    let mut nearest: Option<(usize, f64)> = None;
    for (index, sys) in ship.systems.iter().enumerate() {
        let emp_target = emp && sys.power_critical;
        if sys.radius <= 0.0 && !emp_target {
            continue;
        }
        let dist = impact.distance(ship.local_to_world(sys.mount));
        let in_range = dist - blast < sys.radius || emp_target;
        if in_range && nearest.map_or(true, |(_, best)| dist < best) {
            nearest = Some((index, dist));
        }
    }

    let Some((index, _)) = nearest else {
        return DamageSplit::hull_only(damage);
    };

    let sys = &ship.systems[index];
    let system_share = damage * (1.0 - sys.hull_protection.clamp(0.0, 1.0));
    let hull_share = damage - system_share;

    if strike.damage_type == DamageType::Normal || (emp && sys.power_critical) {
        damage_system(ship, index, system_share, ctx);
    }

    DamageSplit {
        system: Some(index),
        system_share,
        hull_share,
    }
}

fn spread_collision_damage(ship: &mut Ship, damage: f64, ctx: &mut DamageContext) -> DamageSplit {
    // ignore incidental bumps
    if damage < ctx.tuning.collision_damage_floor {
        return DamageSplit::hull_only(damage);
    }

    let mut remaining = damage;
    for index in 0..ship.systems.len() {
        if remaining <= 0.0 {
            break;
        }
        if !ctx.rng.gen_bool(COLLISION_SYSTEM_CHANCE) {
            continue;
        }
        let base = COLLISION_BASE_DAMAGE + ctx.rng.gen_range(0.0..COLLISION_DAMAGE_SPREAD);
        let protection = ship.systems[index].hull_protection.clamp(0.0, 1.0);
        let sys_damage = (base * (1.0 - protection)).min(remaining);
        damage_system(ship, index, sys_damage, ctx);
        remaining -= sys_damage;
    }

    DamageSplit {
        system: None,
        system_share: damage - remaining,
        hull_share: remaining,
    }
}

// --- Hull ---

fn apply_hull_damage(ship: &mut Ship, damage: f64, ctx: &mut DamageContext) {
    ship.integrity = (ship.integrity - damage).max(0.0);
    if ship.integrity <= 0.0 {
        info!(ship = ship.id.0, name = %ship.name, "ship destroyed");
        ctx.events.push(CombatEvent::ShipDestroyed { ship: ship.id });
    }
}

/// Integrity tenth, 0 (wrecked) to 10 (pristine).
pub fn fire_band(integrity: f64, max: f64) -> i32 {
    if max <= 0.0 {
        return 0;
    }
    (integrity / max * FIRE_BANDS).floor() as i32
}

fn update_fire_band(ship: &mut Ship, integrity_before: f64, ctx: &mut DamageContext) {
    let old = fire_band(integrity_before, ship.design.integrity);
    let new = fire_band(ship.integrity, ship.design.integrity);
    if new < FIRE_BAND_THRESHOLD && new < old {
        ship.fire_band = new;
        debug!(ship = ship.id.0, band = new, "hull fire");
        ctx.events.push(CombatEvent::HullFire {
            ship: ship.id,
            band: new,
        });
    }
}

// --- Subsystems ---

/// Damage one system, reporting the result.
pub fn damage_system(ship: &mut Ship, index: usize, damage: f64, ctx: &mut DamageContext) {
    let id = ship.id;
    let mount = match ship.systems.get(index) {
        Some(sys) => sys.mount,
        None => return,
    };
    let location = ship.local_to_world(mount);
    let Some(sys) = ship.systems.get_mut(index) else {
        return;
    };

    let before = sys.availability;
    let was_destroyed = sys.status == SystemStatus::Destroyed;
    apply_system_damage(sys, damage, ctx.rng);

    ctx.events.push(CombatEvent::SystemDamaged {
        ship: id,
        system: index,
        availability: sys.availability,
    });

    if sys.status == SystemStatus::Destroyed && !was_destroyed {
        info!(ship = id.0, system = %sys.name, "system destroyed");
        ctx.events.push(CombatEvent::SystemDestroyed { ship: id, system: index });
    }

    if before - sys.availability >= EXPLOSION_THRESHOLD {
        ctx.events.push(CombatEvent::Explosion {
            ship: id,
            system: index,
            location,
        });
    }
}

/// Take availability off a system, through its parts when it has any.
pub fn apply_system_damage(sys: &mut SimSystem, damage: f64, rng: &mut ChaCha8Rng) {
    let mut damage = damage.max(0.0);
    if !sys.powered {
        damage /= UNPOWERED_DAMAGE_DIVISOR;
    }

    if sys.parts.is_empty() {
        sys.availability -= damage;
        if sys.availability < 1.0 {
            sys.availability = 0.0;
        }
    } else {
        let n = sys.parts.len();
        let mut index = rng.gen_range(0..n);
        if damage > PART_SPLIT_THRESHOLD {
            damage /= 2.0;
            damage_part(&mut sys.parts[index], damage);
            index = rng.gen_range(0..n);
        }
        damage_part(&mut sys.parts[index], damage);
        sys.availability = parts_availability(&sys.parts);
    }

    sys.availability = sys.availability.clamp(0.0, 100.0);
    sys.status = calc_status(sys);
}

pub fn damage_part(part: &mut SystemPart, damage: f64) {
    part.availability -= damage;
    if part.availability < 1.0 {
        part.availability = 0.0;
    }
    part.availability = part.availability.min(100.0);

    // a replacement in progress is not interrupted
    if part.status != PartStatus::Replace {
        part.status = part_status(part.availability);
    }
}

pub fn part_status(availability: f64) -> PartStatus {
    if availability > NOMINAL_AVAILABILITY {
        PartStatus::Nominal
    } else if availability > PART_DEGRADED_AVAILABILITY {
        PartStatus::Degraded
    } else {
        PartStatus::Critical
    }
}

/// Product of the parts' reported availabilities, in percent.
pub fn parts_availability(parts: &[SystemPart]) -> f64 {
    parts
        .iter()
        .map(|p| p.reported_availability() / 100.0)
        .product::<f64>()
        * 100.0
}

/// Status implied by a system's availability and part work.
pub fn calc_status(sys: &SimSystem) -> SystemStatus {
    if sys.parts.iter().any(SystemPart::under_maintenance) {
        SystemStatus::Maint
    } else if sys.availability <= 0.0 {
        SystemStatus::Destroyed
    } else if sys.availability > NOMINAL_AVAILABILITY {
        SystemStatus::Nominal
    } else if sys.availability > sys.crit_level {
        SystemStatus::Degraded
    } else {
        SystemStatus::Critical
    }
}

// --- Shields ---

/// Ramp shield power toward the request and recompute the deflection level.
pub fn shield_frame(ship: &mut Ship, dt: f64) {
    let online = ship
        .shield
        .as_ref()
        .and_then(|s| ship.systems.get(s.system))
        .is_some_and(|sys| sys.powered && sys.status != SystemStatus::Destroyed);
    let Some(shield) = ship.shield.as_mut() else {
        return;
    };

    if shield.power < shield.requested_power {
        shield.power = (shield.power + SHIELD_CHARGE_RATE * dt).min(shield.requested_power);
    } else if shield.power > shield.requested_power {
        shield.power = (shield.power - SHIELD_DISCHARGE_RATE * dt).max(shield.requested_power);
    }

    let output = if online { shield.power / 100.0 } else { 0.0 };

    if shield.capacitor {
        shield.energy = (shield.energy + shield.recharge_rate * output * dt).min(shield.capacity);
        let capacity = shield.capacity.max(f64::EPSILON);
        shield.level = if shield.cutoff > 0.0 && shield.cutoff < 0.999 {
            let cutoff = shield.cutoff * capacity;
            if shield.energy > cutoff {
                (shield.energy - cutoff) / (capacity - cutoff)
            } else {
                0.0
            }
        } else {
            shield.energy / capacity
        };
    } else {
        shield.level = output;
    }
    shield.level = shield.level.clamp(0.0, 1.0);
}
