//! Events emitted by the simulation for logging, audio and UI feedback.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::types::{Point, RegionId, ShipId};

/// Something worth reporting happened this tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CombatEvent {
    // --- Weapons ---
    ShotFired {
        shooter: ShipId,
        target: ShipId,
        group: usize,
    },
    /// Primary weapon group ran dry and the next one was selected.
    WeaponGroupCycled { ship: ShipId, group: usize },
    Hit {
        ship: ShipId,
        shooter: ShipId,
        hit: HitMask,
        damage: f64,
        hull_damage: f64,
    },

    // --- Damage ---
    SystemDamaged {
        ship: ShipId,
        system: usize,
        availability: f64,
    },
    SystemDestroyed { ship: ShipId, system: usize },
    /// Local explosion at a subsystem that lost half its availability.
    Explosion {
        ship: ShipId,
        system: usize,
        location: Point,
    },
    /// Hull integrity dropped into a lower fire/smoke band.
    HullFire { ship: ShipId, band: i32 },
    ShipDestroyed { ship: ShipId },

    // --- Damage control ---
    PowerRerouted {
        ship: ShipId,
        from: usize,
        to: usize,
        clients: usize,
    },
    PowerRestored {
        ship: ShipId,
        reactor: usize,
        clients: usize,
    },
    RepairStarted { ship: ShipId, system: usize },
    RepairComplete { ship: ShipId, system: usize },

    // --- Navigation ---
    NavpointComplete { ship: ShipId, index: usize },
    FarcasterLocked { ship: ShipId, farcaster: ShipId },
    FarcasterReleased { ship: ShipId },
    QuantumEngaged { ship: ShipId, region: RegionId },
    QuantumArrived { ship: ShipId, region: RegionId },
    OrbitTransition { ship: ShipId, descending: bool },

    // --- Tactical ---
    RoeChanged { ship: ShipId, roe: Roe },
    TargetAcquired { ship: ShipId, target: ShipId },
    TargetDropped { ship: ShipId },
    /// Pilot could not be built and idles.
    PilotIdle { ship: ShipId },
}
