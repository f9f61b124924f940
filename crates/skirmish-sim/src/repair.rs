//! Damage control: periodic auto-repair, the repair queue, and emergency
//! power routing between reactors.

use tracing::{debug, info};

use skirmish_core::components::{Ship, SimSystem, SystemPart};
use skirmish_core::config::CombatTuning;
use skirmish_core::constants::*;
use skirmish_core::enums::{PartStatus, SystemCategory, SystemStatus};
use skirmish_core::events::CombatEvent;

use crate::damage::{calc_status, part_status, parts_availability};

/// One maintenance frame: the periodic repair pass when due, then the
/// repair queue. Returns how many queued systems were worked on.
pub fn exec_maint_frame(
    ship: &mut Ship,
    now: f64,
    dt: f64,
    tuning: &CombatTuning,
    events: &mut Vec<CombatEvent>,
) -> usize {
    if !ship.is_alive() {
        return 0;
    }

    if ship.auto_repair && now - ship.last_maint >= tuning.maint_interval {
        ship.last_maint = now;
        repair_pass(ship, tuning, events);
    }

    service_repair_queue(ship, dt, events)
}

fn repair_pass(ship: &mut Ship, tuning: &CombatTuning, events: &mut Vec<CombatEvent>) {
    for index in 0..ship.systems.len() {
        let sys = &ship.systems[index];
        if sys.is_nominal() {
            continue;
        }

        if sys.category == SystemCategory::PowerSource && sys.availability < tuning.reactor_failover {
            if let Some(reactor) = ship.reactors.iter().position(|r| r.system == index) {
                reroute_power(ship, reactor, events);
            }
        }

        if start_part_work(&mut ship.systems[index], tuning) {
            queue_repair(ship, index, events);
        }
    }
}

/// Start a replacement or a field repair on every worn part. Returns true
/// if any work began.
pub fn start_part_work(sys: &mut SimSystem, tuning: &CombatTuning) -> bool {
    let mut started = false;
    for part in &mut sys.parts {
        if !matches!(part.status, PartStatus::Critical | PartStatus::Degraded)
            || part.availability >= tuning.repair_start
        {
            continue;
        }

        let replace = part.spares > 0
            && part.replace_time <= REPLACE_MAX_SECS
            && (part.availability < JERRY_RIG_THRESHOLD || part.replace_time < part.repair_time);

        if replace {
            part.status = PartStatus::Replace;
            part.spares -= 1;
            part.time_remaining = part.replace_time;
            started = true;
        } else if part.availability >= JERRY_RIG_THRESHOLD || part.jerried < JERRY_RIG_LIMIT {
            part.status = PartStatus::Repair;
            part.time_remaining = part.repair_time;
            started = true;
        }
    }

    if started {
        sys.availability = parts_availability(&sys.parts);
        sys.status = calc_status(sys);
    }
    started
}

/// Advance a part's repair or replacement by `secs`.
pub fn maint_part(part: &mut SystemPart, secs: f64) {
    if !part.under_maintenance() {
        return;
    }
    part.time_remaining -= secs;
    if part.time_remaining > 0.0 {
        return;
    }

    if part.status == PartStatus::Repair {
        if part.availability < JERRY_RIG_THRESHOLD {
            part.jerried += 1;
        }
        if part.jerried < JERRY_RIG_LIMIT {
            part.availability += JERRY_RIG_RESTORE - JERRY_RIG_PENALTY * part.jerried as f64;
        }
        part.availability = part.availability.min(100.0);
    } else {
        part.availability = 100.0;
    }

    part.status = part_status(part.availability);
    part.time_remaining = 0.0;
}

fn queue_repair(ship: &mut Ship, system: usize, events: &mut Vec<CombatEvent>) {
    if ship.repair_queue.contains(&system) {
        return;
    }
    ship.repair_queue.push(system);
    debug!(ship = ship.id.0, system, "repair started");
    events.push(CombatEvent::RepairStarted {
        ship: ship.id,
        system,
    });
}

/// Work the head of the repair queue, one system per repair team.
pub fn service_repair_queue(ship: &mut Ship, dt: f64, events: &mut Vec<CombatEvent>) -> usize {
    let teams = ship.design.repair_teams.min(ship.repair_queue.len());
    if teams == 0 {
        return 0;
    }
    let secs = dt * ship.design.repair_speed;

    let mut finished = Vec::new();
    for &index in &ship.repair_queue[..teams] {
        let Some(sys) = ship.systems.get_mut(index) else {
            finished.push(index);
            continue;
        };
        for part in &mut sys.parts {
            maint_part(part, secs);
        }
        sys.availability = parts_availability(&sys.parts);
        sys.status = calc_status(sys);
        if sys.status != SystemStatus::Maint {
            finished.push(index);
        }
    }

    for index in finished {
        ship.repair_queue.retain(|&s| s != index);
        let Some(sys) = ship.systems.get(index) else {
            continue;
        };
        info!(ship = ship.id.0, system = %sys.name, availability = sys.availability, "repair complete");
        events.push(CombatEvent::RepairComplete {
            ship: ship.id,
            system: index,
        });

        if sys.category == SystemCategory::PowerSource && sys.status == SystemStatus::Nominal {
            if let Some(reactor) = ship.reactors.iter().position(|r| r.system == index) {
                restore_power(ship, reactor, events);
            }
        }
    }

    teams
}

// --- Power routing ---

/// Hand every client of a failing reactor to the healthiest other reactor.
/// Returns the reactor that took them.
pub fn reroute_power(ship: &mut Ship, from: usize, events: &mut Vec<CombatEvent>) -> Option<usize> {
    let src_avail = ship.system_availability(ship.reactors.get(from)?.system);

    let to = ship
        .reactors
        .iter()
        .enumerate()
        .filter(|(i, r)| *i != from && ship.system_availability(r.system) > src_avail)
        .max_by(|(_, a), (_, b)| {
            ship.system_availability(a.system)
                .total_cmp(&ship.system_availability(b.system))
                .then(a.charge.total_cmp(&b.charge))
        })
        .map(|(i, _)| i)?;

    let clients = std::mem::take(&mut ship.reactors[from].clients);
    if clients.is_empty() {
        return None;
    }
    for &c in &clients {
        if let Some(sys) = ship.systems.get_mut(c) {
            sys.source = Some(to);
        }
    }
    let moved = clients.len();
    ship.reactors[to].clients.extend(clients);

    info!(ship = ship.id.0, from, to, clients = moved, "power rerouted");
    events.push(CombatEvent::PowerRerouted {
        ship: ship.id,
        from,
        to,
        clients: moved,
    });
    Some(to)
}

/// Take back the clients wired to a recovered reactor. Returns how many moved.
pub fn restore_power(ship: &mut Ship, reactor: usize, events: &mut Vec<CombatEvent>) -> usize {
    let id = ship.id;
    let Ship {
        reactors, systems, ..
    } = ship;
    if reactor >= reactors.len() {
        return 0;
    }

    let mut returning = Vec::new();
    for (i, pwr) in reactors.iter_mut().enumerate() {
        if i == reactor {
            continue;
        }
        pwr.clients.retain(|&c| {
            let home = systems.get(c).and_then(|s| s.home_source) == Some(reactor);
            if home {
                returning.push(c);
            }
            !home
        });
    }

    for &c in &returning {
        if let Some(sys) = systems.get_mut(c) {
            sys.source = Some(reactor);
        }
    }
    let moved = returning.len();
    reactors[reactor].clients.extend(returning);

    if moved > 0 {
        info!(ship = id.0, reactor, clients = moved, "power restored");
        events.push(CombatEvent::PowerRestored {
            ship: id,
            reactor,
            clients: moved,
        });
    }
    moved
}

/// Recharge reactors and mark each client powered when its reactor is live.
pub fn distribute_power(ship: &mut Ship, dt: f64) {
    let Ship {
        reactors, systems, ..
    } = ship;
    for reactor in reactors.iter_mut() {
        let availability = systems.get(reactor.system).map_or(0.0, |s| s.availability);
        reactor.charge = (reactor.charge
            + reactor.capacity * (availability / 100.0) * REACTOR_RECHARGE_RATE * dt)
            .min(reactor.capacity);

        let live = availability > 0.0 && reactor.charge > 0.0;
        for &c in &reactor.clients {
            if let Some(sys) = systems.get_mut(c) {
                sys.powered = live;
            }
        }
    }
}

// --- Queue priority ---

/// Move a queued system one slot toward the front. Returns false if it is
/// not queued or already first.
pub fn increase_repair_priority(ship: &mut Ship, system: usize) -> bool {
    match ship.repair_queue.iter().position(|&s| s == system) {
        Some(pos) if pos > 0 => {
            ship.repair_queue.swap(pos - 1, pos);
            true
        }
        _ => false,
    }
}

/// Move a queued system one slot toward the back.
pub fn decrease_repair_priority(ship: &mut Ship, system: usize) -> bool {
    match ship.repair_queue.iter().position(|&s| s == system) {
        Some(pos) if pos + 1 < ship.repair_queue.len() => {
            ship.repair_queue.swap(pos, pos + 1);
            true
        }
        _ => false,
    }
}
