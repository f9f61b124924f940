//! Commands sent to the engine from outside the combat core.
//!
//! Commands are queued and processed at the next tick boundary.

use serde::{Deserialize, Serialize};

use crate::components::{Instruction, Order};
use crate::types::ShipId;

/// Externally issued actions: mission scripts, wingman radio, player input.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SimCommand {
    // --- Orders ---
    /// Replace a ship's radio orders.
    IssueOrder { ship: ShipId, order: Order },
    /// Cancel a ship's radio orders.
    ClearOrders { ship: ShipId },
    /// Replace a ship's flight plan.
    SetNavpoints {
        ship: ShipId,
        navpoints: Vec<Instruction>,
    },
    /// Assign or clear the ship this ship escorts.
    SetWard { ship: ShipId, ward: Option<ShipId> },

    // --- Pilot control ---
    /// Detach the AI (player takeover).
    Disengage { ship: ShipId },
    /// Reattach the AI.
    Engage { ship: ShipId },

    // --- Damage control ---
    SetAutoRepair { ship: ShipId, enabled: bool },
    /// Move a queued system one slot toward the front of the repair queue.
    IncreaseRepairPriority { ship: ShipId, system: usize },
    /// Move a queued system one slot toward the back of the repair queue.
    DecreaseRepairPriority { ship: ShipId, system: usize },

    // --- Simulation control ---
    Pause,
    Resume,
    SetTimeScale { scale: f64 },
}
