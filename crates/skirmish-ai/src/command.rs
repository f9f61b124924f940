//! What a pilot asks its ship to do.
//!
//! The AI never mutates a ship. Each tick it returns a list of actuator
//! commands that the engine applies in order.

use serde::{Deserialize, Serialize};

use skirmish_core::enums::{FiringOrders, NavStatus, Sweep};
use skirmish_core::events::CombatEvent;
use skirmish_core::types::{Point, RegionId, ShipId};

use crate::steer::Steer;

/// A single write to the ship's controls or mission state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ActuatorCommand {
    // --- Flight controls ---
    SetThrottle { throttle: f64 },
    /// Absolute helm heading (starship hulls).
    SetHelmHeading { heading: f64 },
    SetHelmPitch { pitch: f64 },
    /// True selects helm steering, false stick steering.
    SetHelmMode { helm: bool },
    ApplyRoll { roll: f64 },
    ApplyYaw { yaw: f64 },
    ApplyPitch { pitch: f64 },
    /// Translation thrust along the ship-local axes.
    SetTransX { thrust: f64 },
    SetTransY { thrust: f64 },
    SetTransZ { thrust: f64 },
    SetAugmenter { on: bool },
    SetFullStop,

    // --- Mission state ---
    SetNavptStatus { index: usize, status: NavStatus },
    SetWard { ward: Option<ShipId> },
    ClearRadioOrders,

    // --- Weapons ---
    LockTarget { target: Option<ShipId> },
    SetSubtarget { subtarget: Option<usize> },
    /// Pull the trigger on a manually fired group.
    FireGroup { group: usize },
    SetGroupOrders { group: usize, orders: FiringOrders },
    SetWeaponOrders {
        group: usize,
        weapon: usize,
        orders: FiringOrders,
    },
    SetWeaponTarget {
        group: usize,
        weapon: usize,
        target: Option<ShipId>,
    },
    SetGroupTarget {
        group: usize,
        target: Option<ShipId>,
        subtarget: Option<usize>,
        sweep: Sweep,
    },

    // --- Defenses ---
    /// Requested shield power, percent.
    SetShieldPower { level: f64 },

    // --- Transit ---
    EngageQuantum { region: RegionId, location: Point },
    DropOrbit,
    MakeOrbit,
}

/// Result of one AI step.
#[derive(Debug, Clone, Default)]
pub struct AiOutput {
    /// Blended steering from this tick's navigator pass.
    pub steer: Steer,
    pub commands: Vec<ActuatorCommand>,
    pub events: Vec<CombatEvent>,
}

impl AiOutput {
    pub fn push(&mut self, command: ActuatorCommand) {
        self.commands.push(command);
    }

    /// Commands of the given shape, for inspection in tests and logs.
    pub fn has(&self, pred: impl Fn(&ActuatorCommand) -> bool) -> bool {
        self.commands.iter().any(pred)
    }
}
