//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// Hull classification, ordered from the smallest craft up to ground installations.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum ShipClass {
    Drone,
    #[default]
    Fighter,
    Attack,
    Lca,
    Courier,
    Cargo,
    Corvette,
    Freighter,
    Frigate,
    Destroyer,
    Cruiser,
    Battleship,
    Carrier,
    Dreadnaught,
    Station,
    Farcaster,
    Mine,
    Comsat,
    Defsat,
    Swacs,
    Building,
    Factory,
    Sam,
    Ewr,
    C3i,
    Starbase,
}

impl ShipClass {
    /// Small craft that can fly in atmosphere.
    pub fn is_dropship(self) -> bool {
        self <= ShipClass::Lca
    }

    /// Capital hulls steered by helm heading rather than stick inputs.
    pub fn is_starship(self) -> bool {
        (ShipClass::Courier..=ShipClass::Farcaster).contains(&self)
    }

    /// Stations, satellites and ground installations.
    pub fn is_static(self) -> bool {
        self >= ShipClass::Station
    }

    /// Anti-air escorts whose forward arc engages the target directly.
    pub fn is_anti_air_escort(self) -> bool {
        matches!(self, ShipClass::Corvette | ShipClass::Frigate)
    }

    /// Relative combat worth used by threat/support estimates and targeting.
    pub fn value(self) -> f64 {
        match self {
            ShipClass::Drone => 10.0,
            ShipClass::Fighter | ShipClass::Mine => 20.0,
            ShipClass::Attack => 40.0,
            ShipClass::Lca => 50.0,
            ShipClass::Courier | ShipClass::Cargo | ShipClass::Corvette => 100.0,
            ShipClass::Building | ShipClass::Sam => 100.0,
            ShipClass::Frigate | ShipClass::Comsat | ShipClass::Ewr => 200.0,
            ShipClass::Freighter | ShipClass::Factory => 250.0,
            ShipClass::Defsat => 300.0,
            ShipClass::Destroyer | ShipClass::Swacs | ShipClass::C3i => 500.0,
            ShipClass::Cruiser => 800.0,
            ShipClass::Battleship => 1000.0,
            ShipClass::Carrier | ShipClass::Dreadnaught => 1500.0,
            ShipClass::Starbase => 2000.0,
            ShipClass::Station => 2500.0,
            ShipClass::Farcaster => 5000.0,
        }
    }
}

/// Which AI variant drives a ship.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AiKind {
    /// Generic combat pilot for small craft.
    #[default]
    Fighter,
    /// Navigation autopilot: navpoints, region transitions, terrain avoidance.
    Nav,
    /// Capital ship helm and fire control.
    Starship,
    /// Dropship transit between airspace and orbit.
    Dropship,
}

/// Tactical posture governing how aggressively a ship seeks targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Roe {
    None,
    SelfDefensive,
    Defensive,
    Directed,
    #[default]
    Flexible,
    Aggressive,
}

/// Flight phase of a ship.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlightPhase {
    Dock,
    Alert,
    Locked,
    Launch,
    Takeoff,
    #[default]
    Active,
    Approach,
    Recovery,
}

/// Kind of region a ship is flying in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegionKind {
    #[default]
    Orbital,
    AirSpace,
}

/// Operational status of a subsystem. Ordered worst to best for the
/// repairable states; `Maint` marks a system on the repair queue.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum SystemStatus {
    Destroyed,
    Critical,
    Degraded,
    #[default]
    Nominal,
    Maint,
}

/// Status of a replaceable part inside a subsystem.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PartStatus {
    Critical,
    Degraded,
    #[default]
    Nominal,
    Repair,
    Replace,
}

/// Functional category of a subsystem.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SystemCategory {
    #[default]
    Misc,
    PowerSource,
    Drive,
    QuantumDrive,
    Weapon,
    Shield,
    Sensor,
    Computer,
    FlightDeck,
}

/// Firing mode of a weapon or weapon group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FiringOrders {
    #[default]
    Manual,
    Auto,
    PointDefense,
}

/// Turret sweep pattern while auto-engaging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sweep {
    #[default]
    None,
    Tight,
    Wide,
}

/// How damage is delivered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageType {
    #[default]
    Normal,
    /// Disables power-critical systems, does no hull damage.
    Emp,
    /// Drains reactors, does no hull damage.
    Power,
}

/// Radio order actions a ship can be given.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderAction {
    #[default]
    None,
    Attack,
    Bracket,
    Identify,
    Escort,
    CoverMe,
    WepFree,
    WepHold,
    FormUp,
    MovePatrol,
    Rtb,
    DockWith,
    QuantumTo,
    FarcastTo,
}

/// Flight-plan navpoint actions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NavAction {
    #[default]
    Vector,
    Launch,
    Dock,
    Rtb,
    Defend,
    Escort,
    Patrol,
    Sweep,
    Intercept,
    Strike,
    Assault,
    Recon,
}

impl NavAction {
    /// Navpoints that send the element into a fight rather than a transit.
    pub fn is_combat(self) -> bool {
        matches!(
            self,
            NavAction::Defend
                | NavAction::Escort
                | NavAction::Patrol
                | NavAction::Sweep
                | NavAction::Intercept
                | NavAction::Strike
                | NavAction::Assault
                | NavAction::Recon
        )
    }
}

/// Progress of a navpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NavStatus {
    #[default]
    Pending,
    Active,
    Skipped,
    Aborted,
    Complete,
}

/// Element formation shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Formation {
    #[default]
    Diamond,
    Spread,
    Box,
    Trail,
}

/// Quantum drive readiness cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuantumState {
    #[default]
    Ready,
    Countdown,
    Jump,
    PostWarp,
}

/// What a shot's travel ray struck, as a bit set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HitMask(pub u8);

impl HitMask {
    pub const NOTHING: HitMask = HitMask(0);
    pub const HULL: HitMask = HitMask(1);
    pub const SHIELD: HitMask = HitMask(2);
    pub const TURRET: HitMask = HitMask(4);
    /// Penetrated the shield and struck the hull.
    pub const BOTH: HitMask = HitMask(1 | 2);

    pub fn contains(self, other: HitMask) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }

    pub fn is_hit(self) -> bool {
        self.0 != 0
    }
}

impl std::ops::BitOr for HitMask {
    type Output = HitMask;

    fn bitor(self, rhs: HitMask) -> HitMask {
        HitMask(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for HitMask {
    fn bitor_assign(&mut self, rhs: HitMask) {
        self.0 |= rhs.0;
    }
}
