//! Actuators: apply each pilot's commands to its own ship.
//!
//! Commands are applied in the order the pilot issued them. Trigger pulls on
//! manually fired groups are handed on to the weapons system.

use hecs::{Entity, World};
use tracing::info;

use skirmish_ai::{ActuatorCommand, AiOutput};
use skirmish_core::components::Ship;
use skirmish_core::constants::QUANTUM_COUNTDOWN_SECS;
use skirmish_core::enums::{NavStatus, QuantumState, RegionKind};
use skirmish_core::events::CombatEvent;
use skirmish_core::roster::StarSystem;
use skirmish_core::types::ShipId;

pub fn run(
    world: &mut World,
    outputs: Vec<(Entity, ShipId, AiOutput)>,
    star_system: &StarSystem,
    fire_requests: &mut Vec<(ShipId, usize)>,
    events: &mut Vec<CombatEvent>,
) {
    for (entity, id, output) in outputs {
        events.extend(output.events);

        let Ok(mut ship) = world.get::<&mut Ship>(entity) else {
            continue;
        };
        ship.helm.full_stop = false;
        for command in output.commands {
            if let ActuatorCommand::FireGroup { group } = command {
                fire_requests.push((id, group));
                continue;
            }
            apply(&mut ship, command, star_system, events);
        }
    }
}

/// Apply a single command to a ship.
pub fn apply(
    ship: &mut Ship,
    command: ActuatorCommand,
    star_system: &StarSystem,
    events: &mut Vec<CombatEvent>,
) {
    match command {
        ActuatorCommand::SetThrottle { throttle } => ship.helm.throttle = throttle.clamp(0.0, 100.0),
        ActuatorCommand::SetHelmHeading { heading } => ship.helm.heading = heading,
        ActuatorCommand::SetHelmPitch { pitch } => ship.helm.pitch = pitch,
        ActuatorCommand::SetHelmMode { helm } => ship.helm.helm_mode = helm,
        ActuatorCommand::ApplyPitch { pitch } => ship.helm.stick.x = pitch.clamp(-1.0, 1.0),
        ActuatorCommand::ApplyYaw { yaw } => ship.helm.stick.y = yaw.clamp(-1.0, 1.0),
        ActuatorCommand::ApplyRoll { roll } => ship.helm.stick.z = roll.clamp(-1.0, 1.0),
        ActuatorCommand::SetTransX { thrust } => ship.helm.trans.x = thrust,
        ActuatorCommand::SetTransY { thrust } => ship.helm.trans.y = thrust,
        ActuatorCommand::SetTransZ { thrust } => ship.helm.trans.z = thrust,
        ActuatorCommand::SetAugmenter { on } => ship.helm.augmenter = on,
        ActuatorCommand::SetFullStop => ship.helm.full_stop = true,

        ActuatorCommand::SetNavptStatus { index, status } => {
            let Some(navpt) = ship.navpoints.get_mut(index) else {
                return;
            };
            if navpt.status == status {
                return;
            }
            navpt.status = status;
            if status == NavStatus::Complete {
                info!(ship = ship.id.0, index, "navpoint complete");
                events.push(CombatEvent::NavpointComplete {
                    ship: ship.id,
                    index,
                });
            }
        }
        ActuatorCommand::SetWard { ward } => ship.ward = ward,
        ActuatorCommand::ClearRadioOrders => ship.orders = None,

        ActuatorCommand::LockTarget { target } => ship.target = target,
        ActuatorCommand::SetSubtarget { subtarget } => {
            let primary = ship.primary_group;
            if let Some(group) = ship.weapons.get_mut(primary) {
                group.subtarget = subtarget;
            }
        }
        // trigger pulls are collected by `run`
        ActuatorCommand::FireGroup { .. } => {}
        ActuatorCommand::SetGroupOrders { group, orders } => {
            if let Some(g) = ship.weapons.get_mut(group) {
                g.firing_orders = orders;
                for weapon in &mut g.weapons {
                    weapon.firing_orders = orders;
                }
            }
        }
        ActuatorCommand::SetWeaponOrders {
            group,
            weapon,
            orders,
        } => {
            if let Some(w) = ship.weapons.get_mut(group).and_then(|g| g.weapons.get_mut(weapon)) {
                w.firing_orders = orders;
            }
        }
        ActuatorCommand::SetWeaponTarget {
            group,
            weapon,
            target,
        } => {
            if let Some(w) = ship.weapons.get_mut(group).and_then(|g| g.weapons.get_mut(weapon)) {
                w.target = target;
            }
        }
        ActuatorCommand::SetGroupTarget {
            group,
            target,
            subtarget,
            sweep,
        } => {
            if let Some(g) = ship.weapons.get_mut(group) {
                g.target = target;
                g.subtarget = subtarget;
                g.sweep = sweep;
                for weapon in &mut g.weapons {
                    weapon.target = target;
                    weapon.subtarget = subtarget;
                    weapon.sweep = sweep;
                }
            }
        }

        ActuatorCommand::SetShieldPower { level } => {
            if let Some(shield) = ship.shield.as_mut() {
                shield.requested_power = level.clamp(0.0, 100.0);
            }
        }

        ActuatorCommand::EngageQuantum { region, location } => {
            let id = ship.id;
            let Some(drive) = ship.quantum_drive.as_mut() else {
                return;
            };
            if drive.state != QuantumState::Ready {
                return;
            }
            drive.state = QuantumState::Countdown;
            drive.timer = QUANTUM_COUNTDOWN_SECS;
            drive.destination = Some((region, location));
            info!(ship = id.0, region = region.0, "quantum drive engaged");
            events.push(CombatEvent::QuantumEngaged { ship: id, region });
        }
        ActuatorCommand::DropOrbit => orbit_transition(ship, star_system, true, events),
        ActuatorCommand::MakeOrbit => orbit_transition(ship, star_system, false, events),
    }
}

/// Move a ship between an orbital region and the airspace below it.
/// Coordinates are rebased onto the new region's origin.
fn orbit_transition(
    ship: &mut Ship,
    star_system: &StarSystem,
    descending: bool,
    events: &mut Vec<CombatEvent>,
) {
    if ship.in_transition {
        return;
    }
    let Some(here) = star_system.region(ship.region) else {
        return;
    };
    let (from, to) = if descending {
        (RegionKind::Orbital, RegionKind::AirSpace)
    } else {
        (RegionKind::AirSpace, RegionKind::Orbital)
    };
    if here.kind != from {
        return;
    }
    let Some(dest) = star_system
        .regions
        .iter()
        .find(|r| r.kind == to && r.primary == here.primary)
    else {
        return;
    };

    ship.location -= dest.location - here.location;
    ship.region = dest.id;
    ship.airborne = descending;
    ship.contacts.clear();

    info!(ship = ship.id.0, region = dest.id.0, descending, "orbit transition");
    events.push(CombatEvent::OrbitTransition {
        ship: ship.id,
        descending,
    });
}
