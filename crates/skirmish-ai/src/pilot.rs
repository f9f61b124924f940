//! Per-ship AI state.
//!
//! A `Pilot` is owned by its ship (the engine stores it as a component on the
//! ship entity). Everything that used to be a free-floating timer or a raw
//! back-pointer is a field here, so two pilots never share state.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use skirmish_core::components::Ship;
use skirmish_core::enums::{AiKind, Roe};
use skirmish_core::types::{Point, ShipId};

use crate::steer::{SeekMemory, Steer};
use crate::tactical::TacticalAi;

/// Navigation memory carried between ticks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NavState {
    // === REFERENCES ===
    pub target: Option<ShipId>,
    /// System index on the target to aim at.
    pub subtarget: Option<usize>,
    pub threat: Option<ShipId>,
    pub support: Option<ShipId>,
    /// Last known hostile to investigate.
    pub rumor: Option<ShipId>,
    /// Ship being escorted, mirrored from the hull each tick.
    pub ward: Option<ShipId>,
    /// Patrol point in world coordinates.
    pub patrol: Option<Point>,
    /// Navpoint index on the ship's flight plan.
    pub navpt: Option<usize>,
    /// Farcaster gate (carrier ship) this pilot is committed to.
    pub farcaster: Option<ShipId>,
    /// Current collision obstacle.
    pub other: Option<ShipId>,
    /// Obstacle we are fleeing from at close range.
    pub too_close: Option<ShipId>,

    // === OBJECTIVE ===
    /// World-space objective.
    pub obj_w: Point,
    /// Objective transformed into the steering frame.
    pub objective: Point,
    /// Distance to the objective; negative while station keeping.
    pub distance: f64,
    /// Obstacle prediction in the steering frame.
    pub obstacle: Point,
    pub formation_delta: Point,
    /// How far the formation slot sits ahead of us along our nose.
    pub slot_dist: f64,

    // === FLAGS ===
    /// -1 drop into airspace, +1 climb to orbit, 0 neither.
    pub drop_state: i8,
    /// 1 while a quantum jump toward the navpoint is wanted.
    pub quantum_state: u8,
    pub takeoff: bool,
    pub hold: bool,
    pub bracket: bool,
    pub identify: bool,
    /// Set while the last navigator pass was running from a threat.
    pub evading: bool,

    // === TIMERS ===
    /// Seconds left before a new target may be selected.
    pub drop_time: f64,
    pub last_avoid_time: f64,
    pub evade_time: f64,
    pub evade: Steer,

    // === ACTUATION ===
    pub throttle: f64,
    pub old_throttle: f64,
    pub brakes: f64,
    /// Accumulated steer from the most recent navigator pass.
    pub last_steer: Steer,
}

/// Subtarget and point-defense caches for starship fire control.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FireControlState {
    pub next_subtarget_time: f64,
    pub subtarget: Option<usize>,
    pub next_point_defense_time: f64,
    pub target_point_defense: bool,
}

/// AI controller owned by one ship.
#[derive(Debug, Clone)]
pub struct Pilot {
    pub kind: AiKind,
    /// False while a player (or script) has taken over.
    pub engaged: bool,
    /// Set when the ship's design could not be validated; an idle pilot
    /// never steers or issues commands.
    pub idle: bool,
    pub ship: ShipId,
    /// Mid-level loop; dropships and autopilots fly without one.
    pub tactical: Option<TacticalAi>,
    pub nav: NavState,
    pub fire: FireControlState,
    pub memory: SeekMemory,
    pub rng: ChaCha8Rng,
}

impl Pilot {
    /// Build the pilot a ship normally flies with.
    pub fn new(kind: AiKind, ship: &Ship, now: f64, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed ^ (ship.id.0 as u64).wrapping_mul(0x9E37_79B9));
        let tactical = match kind {
            AiKind::Fighter | AiKind::Starship => Some(TacticalAi::new(ship, now, &mut rng)),
            AiKind::Nav | AiKind::Dropship => None,
        };
        let fire = if kind == AiKind::Starship {
            FireControlState {
                next_subtarget_time: now + rng.gen_range(0.0..2.0),
                next_point_defense_time: now + rng.gen_range(0.0..2.0),
                ..Default::default()
            }
        } else {
            FireControlState::default()
        };
        Self {
            kind,
            engaged: true,
            idle: false,
            ship: ship.id,
            tactical,
            nav: NavState {
                ward: ship.ward,
                target: ship.target,
                ..Default::default()
            },
            fire,
            memory: SeekMemory::default(),
            rng,
        }
    }

    /// A pilot that never acts.
    pub fn idle(kind: AiKind, ship: ShipId) -> Self {
        Self {
            kind,
            engaged: false,
            idle: true,
            ship,
            tactical: None,
            nav: NavState::default(),
            fire: FireControlState::default(),
            memory: SeekMemory::default(),
            rng: ChaCha8Rng::seed_from_u64(ship.0 as u64),
        }
    }

    /// Default AI variant for a hull.
    pub fn kind_for(ship: &Ship) -> AiKind {
        if ship.is_starship() {
            AiKind::Starship
        } else {
            AiKind::Fighter
        }
    }

    pub fn disengage(&mut self) {
        self.engaged = false;
        self.nav.throttle = 0.0;
        self.nav.old_throttle = 0.0;
    }

    pub fn engage(&mut self) {
        if !self.idle {
            self.engaged = true;
        }
    }

    pub fn roe(&self) -> Roe {
        self.tactical.as_ref().map_or(Roe::Flexible, |t| t.roe)
    }

    /// Forget the current target and refuse a new one for `secs`.
    pub fn drop_target(&mut self, secs: f64) {
        self.nav.target = None;
        self.nav.subtarget = None;
        self.nav.drop_time = secs;
    }
}
