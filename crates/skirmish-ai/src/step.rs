//! Per-tick entry point for every pilot.
//!
//! `step_ai` reads one ship and the roster snapshot, advances the pilot's
//! own state, and returns the commands and events for the engine to apply.

use tracing::{debug, info};

use skirmish_core::components::{Contact, Ship};
use skirmish_core::config::CombatTuning;
use skirmish_core::constants::*;
use skirmish_core::enums::{AiKind, FlightPhase, Roe};
use skirmish_core::events::CombatEvent;
use skirmish_core::roster::Roster;
use skirmish_core::types::ShipId;

use crate::command::{ActuatorCommand, AiOutput};
use crate::pilot::Pilot;
use crate::{dropship, nav, navigator, objective, starship, tactical};

/// Everything a pilot may look at besides its own ship.
#[derive(Debug, Clone, Copy)]
pub struct AiWorld<'a> {
    pub roster: &'a Roster,
    pub tuning: &'a CombatTuning,
    /// Simulation time in seconds.
    pub now: f64,
}

impl<'a> AiWorld<'a> {
    pub fn new(roster: &'a Roster, tuning: &'a CombatTuning, now: f64) -> Self {
        Self {
            roster,
            tuning,
            now,
        }
    }

    /// The ship's sensor contacts that are still alive, resolved.
    pub fn contacts(&self, ship: &'a Ship) -> impl Iterator<Item = (Contact, &'a Ship)> + 'a {
        let roster = self.roster;
        let own = ship.id;
        ship.contacts
            .iter()
            .filter(move |c| c.ship != own)
            .filter_map(move |c| roster.live(Some(c.ship)).map(|s| (*c, s)))
    }
}

/// Run one AI tick for `ship`.
pub fn step_ai(pilot: &mut Pilot, ship: &Ship, world: &AiWorld, dt: f64) -> AiOutput {
    let mut out = AiOutput::default();
    if pilot.idle || !pilot.engaged || !ship.is_alive() {
        return out;
    }

    let before = Transitions::capture(pilot);

    match pilot.kind {
        AiKind::Fighter | AiKind::Starship => exec_frame(pilot, ship, world, dt, &mut out),
        AiKind::Nav => nav::exec_frame(pilot, ship, world, &mut out),
        AiKind::Dropship => dropship::exec_frame(pilot, ship, world, &mut out),
    }

    before.report(pilot, ship, &mut out);
    out
}

/// Combat pilot frame shared by small craft and starships.
fn exec_frame(pilot: &mut Pilot, ship: &Ship, world: &AiWorld, dt: f64, out: &mut AiOutput) {
    if pilot.nav.drop_time > 0.0 {
        pilot.nav.drop_time -= dt;
    }
    pilot.nav.ward = ship.ward;
    if pilot.nav.navpt.is_some() {
        pilot.nav.navpt = ship.next_navpoint();
    }

    if matches!(ship.flight_phase, FlightPhase::Takeoff | FlightPhase::Launch) {
        pilot.nav.takeoff = true;
    }

    if pilot.nav.takeoff {
        fly(pilot, ship, world, dt, out);
        if ship.mission_clock > TAKEOFF_DURATION_SECS {
            pilot.nav.takeoff = false;
        }
        return;
    }

    // give sensors a moment before the first assessment
    if ship.mission_clock < INITIAL_ASSESSMENT_SECS {
        return;
    }

    let had_target = pilot.nav.target;
    objective::check_target(&mut pilot.nav, ship, world);

    if let Some(tac) = pilot.tactical.as_mut() {
        tactical::exec_frame(tac, &mut pilot.nav, &mut pilot.rng, ship, world, dt, out);
    }

    sync_target_lock(pilot, had_target, ship, world, out);
    fly(pilot, ship, world, dt, out);
}

fn fly(pilot: &mut Pilot, ship: &Ship, world: &AiWorld, dt: f64, out: &mut AiOutput) {
    if pilot.kind == AiKind::Starship {
        starship::find_objective(pilot, ship, world, out);
        starship::navigator(pilot, ship, world, dt, out);
    } else {
        objective::find_objective(pilot, ship, world, out);
        navigator::navigator(pilot, ship, world, dt, out);
    }
}

/// Keep the ship's weapons lock in step with the pilot's target.
fn sync_target_lock(
    pilot: &mut Pilot,
    had_target: Option<ShipId>,
    ship: &Ship,
    world: &AiWorld,
    out: &mut AiOutput,
) {
    match pilot.nav.target {
        Some(target) => {
            if ship.target != Some(target) {
                out.push(ActuatorCommand::LockTarget {
                    target: Some(target),
                });
            }
        }
        None if had_target.is_some() => {
            if ship.target.is_some() {
                out.push(ActuatorCommand::LockTarget { target: None });
            }
        }
        None => {
            // adopt a lock set from outside (player or script)
            if pilot.nav.drop_time <= 0.0 {
                pilot.nav.target = world
                    .roster
                    .live(ship.target)
                    .filter(|t| tactical::can_target(ship, t))
                    .map(|t| t.id);
            }
        }
    }
}

// --- Transition reporting ---

/// Pilot state compared before and after a tick to report what changed.
struct Transitions {
    target: Option<ShipId>,
    roe: Roe,
    farcaster: Option<ShipId>,
}

impl Transitions {
    fn capture(pilot: &Pilot) -> Self {
        Self {
            target: pilot.nav.target,
            roe: pilot.roe(),
            farcaster: pilot.nav.farcaster,
        }
    }

    fn report(self, pilot: &Pilot, ship: &Ship, out: &mut AiOutput) {
        let id = ship.id;

        if pilot.nav.target != self.target {
            match pilot.nav.target {
                Some(target) => {
                    debug!(ship = id.0, target = target.0, "target acquired");
                    out.events.push(CombatEvent::TargetAcquired { ship: id, target });
                }
                None => {
                    debug!(ship = id.0, "target dropped");
                    out.events.push(CombatEvent::TargetDropped { ship: id });
                }
            }
        }

        let roe = pilot.roe();
        if roe != self.roe {
            out.events.push(CombatEvent::RoeChanged { ship: id, roe });
        }

        if pilot.nav.farcaster != self.farcaster {
            match pilot.nav.farcaster {
                Some(farcaster) => {
                    info!(ship = id.0, farcaster = farcaster.0, "farcaster locked");
                    out.events.push(CombatEvent::FarcasterLocked { ship: id, farcaster });
                }
                None => {
                    info!(ship = id.0, "farcaster released");
                    out.events.push(CombatEvent::FarcasterReleased { ship: id });
                }
            }
        }
    }
}
