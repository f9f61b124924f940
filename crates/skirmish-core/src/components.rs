//! Plain-data ship model.
//!
//! A `Ship` is stored as a single hecs component by the engine and cloned into
//! the per-tick `Roster` that AIs read. Cross-ship references are `ShipId`s,
//! never pointers. Systems, reactors and weapons address each other by index
//! into `Ship::systems`.

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::enums::*;
use crate::types::{Basis, Point, RegionId, ShipId};

/// One replaceable part inside a subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemPart {
    pub name: String,
    pub status: PartStatus,
    /// 0–100.
    pub availability: f64,
    /// Seconds left on the current repair or replacement.
    pub time_remaining: f64,
    /// Seconds for an in-place repair.
    pub repair_time: f64,
    /// Seconds to swap in a spare.
    pub replace_time: f64,
    pub spares: u32,
    /// Field repairs performed so far.
    pub jerried: u32,
}

impl SystemPart {
    pub fn new(name: &str, repair_time: f64, replace_time: f64, spares: u32) -> Self {
        Self {
            name: name.to_string(),
            status: PartStatus::Nominal,
            availability: 100.0,
            time_remaining: 0.0,
            repair_time,
            replace_time,
            spares,
            jerried: 0,
        }
    }

    pub fn under_maintenance(&self) -> bool {
        matches!(self.status, PartStatus::Repair | PartStatus::Replace)
    }

    /// Availability as seen by the owning system; capped while under repair.
    pub fn reported_availability(&self) -> f64 {
        if self.under_maintenance() {
            self.availability.min(REPAIR_AVAILABILITY_CAP)
        } else {
            self.availability
        }
    }
}

/// Addressable subsystem: weapon mount, reactor, drive, sensor, shield.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimSystem {
    pub name: String,
    pub category: SystemCategory,
    pub status: SystemStatus,
    /// 0–100.
    pub availability: f64,
    /// Availability (percent) below which the system is critical.
    pub crit_level: f64,
    /// Mount location in ship-local coordinates.
    pub mount: Point,
    pub radius: f64,
    /// Fraction of incoming damage absorbed by the hull before reaching this system.
    pub hull_protection: f64,
    /// Knocked out by EMP damage anywhere on the hull.
    pub power_critical: bool,
    pub powered: bool,
    /// Reactor index currently feeding this system.
    pub source: Option<usize>,
    /// Reactor index this system is wired to by design.
    pub home_source: Option<usize>,
    pub parts: Vec<SystemPart>,
}

impl SimSystem {
    pub fn new(name: &str, category: SystemCategory, mount: Point, radius: f64) -> Self {
        Self {
            name: name.to_string(),
            category,
            status: SystemStatus::Nominal,
            availability: 100.0,
            crit_level: DEFAULT_CRIT_LEVEL,
            mount,
            radius,
            hull_protection: DEFAULT_HULL_PROTECTION,
            power_critical: false,
            powered: true,
            source: None,
            home_source: None,
            parts: Vec::new(),
        }
    }

    pub fn with_parts(mut self, parts: Vec<SystemPart>) -> Self {
        self.parts = parts;
        self
    }

    pub fn with_hull_protection(mut self, hull_protection: f64) -> Self {
        self.hull_protection = hull_protection;
        self
    }

    pub fn is_nominal(&self) -> bool {
        self.status == SystemStatus::Nominal
    }
}

/// Reactor with a migratable set of client systems.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerSource {
    /// Index of the reactor's own `SimSystem`.
    pub system: usize,
    pub capacity: f64,
    pub charge: f64,
    /// Systems currently drawing from this reactor.
    pub clients: Vec<usize>,
}

/// Deflector shield.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shield {
    /// Index of the shield generator's `SimSystem`.
    pub system: usize,
    /// Current deflection level, 0–1.
    pub level: f64,
    /// Delivered power in percent, ramps toward `requested_power`.
    pub power: f64,
    /// Percent.
    pub requested_power: f64,
    /// Penetration sensitivity.
    pub factor: f64,
    /// Exponent applied to the level when deflecting.
    pub curve: f64,
    /// Capacitor shields store energy and drain as they deflect.
    pub capacitor: bool,
    /// Capacitor fraction below which the shield drops out entirely.
    pub cutoff: f64,
    pub energy: f64,
    pub capacity: f64,
    /// Energy spent per point of deflected damage.
    pub deflection_cost: f64,
    /// Energy recharged per second at full power.
    pub recharge_rate: f64,
    /// Radius of the shield bubble.
    pub radius: f64,
}

impl Shield {
    /// Shield strength in percent.
    pub fn strength(&self) -> f64 {
        self.level * 100.0
    }
}

/// A single weapon mount.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Weapon {
    pub name: String,
    /// Index of the weapon's `SimSystem`.
    pub system: usize,
    /// Mount bearing off the nose, positive to starboard.
    pub azimuth: f64,
    /// Current aim direction in world space, refreshed every tick by the
    /// weapons system.
    pub aim: Point,
    /// Turret pivot in ship-local coordinates for turret mounts.
    pub turret: Option<Point>,
    pub turret_radius: f64,
    pub firing_orders: FiringOrders,
    pub target: Option<ShipId>,
    /// System index on the target.
    pub subtarget: Option<usize>,
    pub sweep: Sweep,
    pub max_range: f64,
    pub damage: f64,
    pub damage_type: DamageType,
    pub penetration: f64,
    /// Blast radius for guided munitions; zero for direct fire.
    pub lethal_radius: f64,
    pub shot_speed: f64,
    pub refire_secs: f64,
    pub cooldown: f64,
    pub beam: bool,
    pub guided: bool,
    /// Remaining rounds; `None` for energy weapons.
    pub ammo: Option<u32>,
}

impl Weapon {
    /// Fixed forward-firing energy weapon on system `system`.
    pub fn new(name: &str, system: usize, max_range: f64, damage: f64) -> Self {
        Self {
            name: name.to_string(),
            system,
            azimuth: 0.0,
            aim: Point::NEG_Z,
            turret: None,
            turret_radius: 0.0,
            firing_orders: FiringOrders::Manual,
            target: None,
            subtarget: None,
            sweep: Sweep::None,
            max_range,
            damage,
            damage_type: DamageType::Normal,
            penetration: DEFAULT_PENETRATION,
            lethal_radius: 0.0,
            shot_speed: DEFAULT_SHOT_SPEED,
            refire_secs: 1.0,
            cooldown: 0.0,
            beam: false,
            guided: false,
            ammo: None,
        }
    }

    /// Turret mount pivoting at `pivot` (ship-local).
    pub fn on_turret(mut self, pivot: Point, radius: f64) -> Self {
        self.turret = Some(pivot);
        self.turret_radius = radius;
        self
    }

    pub fn is_turret(&self) -> bool {
        self.turret.is_some()
    }

    pub fn has_ammo(&self) -> bool {
        self.ammo.map_or(true, |rounds| rounds > 0)
    }
}

/// Named cluster of weapons that share firing orders and a target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeaponGroup {
    pub name: String,
    pub weapons: Vec<Weapon>,
    pub firing_orders: FiringOrders,
    pub target: Option<ShipId>,
    pub subtarget: Option<usize>,
    pub sweep: Sweep,
    /// Launches drones or torpedoes.
    pub drone: bool,
    /// Can engage small craft and incoming missiles.
    pub point_defense: bool,
}

impl WeaponGroup {
    pub fn new(name: &str, weapons: Vec<Weapon>) -> Self {
        Self {
            name: name.to_string(),
            weapons,
            firing_orders: FiringOrders::Manual,
            target: None,
            subtarget: None,
            sweep: Sweep::None,
            drone: false,
            point_defense: false,
        }
    }

    pub fn max_range(&self) -> f64 {
        self.weapons.iter().map(|w| w.max_range).fold(0.0, f64::max)
    }

    pub fn has_ammo(&self) -> bool {
        self.weapons.iter().any(Weapon::has_ammo)
    }
}

/// Flight-plan navpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instruction {
    pub action: NavAction,
    pub status: NavStatus,
    /// Location relative to the navpoint's region origin.
    pub location: Point,
    /// Region the location refers to; `None` means the ship's own region.
    pub region: Option<RegionId>,
    /// Desired speed; zero selects the default.
    pub speed: f64,
    /// Seconds to hold once reached.
    pub hold_time: f64,
    /// Travel by farcaster even when a quantum drive is available.
    pub farcast: bool,
    pub target: Option<ShipId>,
}

impl Instruction {
    pub fn new(action: NavAction, location: Point, region: Option<RegionId>) -> Self {
        Self {
            action,
            status: NavStatus::Pending,
            location,
            region,
            speed: 0.0,
            hold_time: 0.0,
            farcast: false,
            target: None,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self.status, NavStatus::Pending | NavStatus::Active)
    }
}

/// Radio order currently in force.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub action: OrderAction,
    pub target: Option<ShipId>,
    pub location: Point,
    pub region: Option<RegionId>,
    pub farcast: bool,
}

impl Order {
    pub fn new(action: OrderAction) -> Self {
        Self {
            action,
            target: None,
            location: Point::ZERO,
            region: None,
            farcast: false,
        }
    }
}

/// Quantum drive handle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuantumDrive {
    /// Index of the drive's `SimSystem`.
    pub system: usize,
    pub state: QuantumState,
    pub destination: Option<(RegionId, Point)>,
    /// Seconds left in the current countdown or post-warp phase.
    pub timer: f64,
}

/// Farcaster gate carried by a station ship. Offsets are world-frame,
/// relative to the carrying ship's location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Farcaster {
    pub start: Point,
    pub end: Point,
    pub approach: Point,
    /// Paired farcaster ship in the destination region.
    pub dest: Option<ShipId>,
}

/// Sensor contact.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Contact {
    pub ship: ShipId,
    /// Mission time at which the contact was first acquired.
    pub acquired_at: f64,
}

/// Membership in a flight element.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Element {
    /// 1-based slot; 1 is the leader.
    pub index: u32,
    pub lead: Option<ShipId>,
    /// Seconds the element is ordered to hold position.
    pub hold_time: f64,
    pub formation: Formation,
}

impl Default for Element {
    fn default() -> Self {
        Self {
            index: 1,
            lead: None,
            hold_time: 0.0,
            formation: Formation::Diamond,
        }
    }
}

/// Collision volume in ship-local coordinates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HullVolume {
    pub center: Point,
    pub radius: f64,
}

/// Flight model the hull is flown with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlightModel {
    #[default]
    Standard,
    Relaxed,
    Arcade,
}

/// Static per-design parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipDesign {
    pub name: String,
    pub class: ShipClass,
    pub radius: f64,
    pub mass: f64,
    /// Full hull integrity.
    pub integrity: f64,
    /// Top speed.
    pub vlimit: f64,
    /// Main-drive acceleration at full throttle.
    pub thrust: f64,
    /// Braking/translation acceleration.
    pub trans_thrust: f64,
    /// Maximum turn rate (rad/s).
    pub turn_rate: f64,
    pub commit_range: f64,
    pub sensor_range: f64,
    pub repair_teams: usize,
    pub repair_speed: f64,
    /// Collision look-ahead override; zero selects the default.
    pub avoid_time: f64,
    pub flight_model: FlightModel,
    /// Hull collision volumes per level of detail, finest first.
    pub hull_lods: Vec<Vec<HullVolume>>,
}

impl ShipDesign {
    pub fn new(name: &str, class: ShipClass, radius: f64) -> Self {
        Self {
            name: name.to_string(),
            class,
            radius,
            mass: radius * radius,
            integrity: 1_000.0,
            vlimit: if class.is_starship() { 600.0 } else { 1_000.0 },
            thrust: if class.is_starship() { 20.0 } else { 100.0 },
            trans_thrust: if class.is_starship() { 10.0 } else { 50.0 },
            turn_rate: if class.is_starship() { 0.1 } else { 1.5 },
            commit_range: DEFAULT_COMMIT_RANGE,
            sensor_range: DEFAULT_SENSOR_RANGE,
            repair_teams: 2,
            repair_speed: 1.0,
            avoid_time: 0.0,
            flight_model: FlightModel::Standard,
            hull_lods: vec![vec![HullVolume {
                center: Point::ZERO,
                radius,
            }]],
        }
    }

    /// Collision volumes at a level of detail, falling back to the coarsest
    /// the design carries.
    pub fn hull_volumes(&self, level: usize) -> &[HullVolume] {
        self.hull_lods
            .get(level)
            .or(self.hull_lods.last())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Actuator state written by the pilot and read by movement.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Helm {
    /// 0–100.
    pub throttle: f64,
    /// Helm heading for starship hulls.
    pub heading: f64,
    /// Helm pitch for starship hulls.
    pub pitch: f64,
    /// Stick inputs for small craft: (pitch, yaw, roll), each in [-1, 1].
    pub stick: Point,
    /// Translation thrust in ship-local axes.
    pub trans: Point,
    /// Starship hulls steer by helm heading, small craft by stick.
    pub helm_mode: bool,
    pub augmenter: bool,
    pub full_stop: bool,
}

/// A ship and everything the combat core needs to know about it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ship {
    pub id: ShipId,
    pub name: String,
    pub design: ShipDesign,
    /// Team code; ships with equal IFF are friendly.
    pub iff: u8,
    /// A rogue ship is hostile to everyone.
    pub rogue: bool,
    /// Pilot skill, 0–2.
    pub ai_level: u8,
    pub region: RegionId,
    pub location: Point,
    pub velocity: Point,
    pub basis: Basis,
    pub flight_phase: FlightPhase,
    pub airborne: bool,
    pub altitude_agl: f64,
    /// Hull level of detail shots are tested against; 0 is the finest.
    pub detail_level: usize,
    /// Seconds since the mission started for this ship.
    pub mission_clock: f64,
    /// Jumping or farcasting; untargetable and undamageable.
    pub in_transition: bool,
    pub invulnerable: bool,
    pub net_observer: bool,
    pub integrity: f64,
    /// Last reported fire/smoke band (integrity tenths).
    pub fire_band: i32,
    pub shake: f64,
    pub element: Element,
    pub ward: Option<ShipId>,
    /// Target locked by the fire-control computer.
    pub target: Option<ShipId>,
    pub orders: Option<Order>,
    pub navpoints: Vec<Instruction>,
    pub contacts: Vec<Contact>,
    pub systems: Vec<SimSystem>,
    pub reactors: Vec<PowerSource>,
    pub weapons: Vec<WeaponGroup>,
    /// Weapon group currently selected as primary.
    pub primary_group: usize,
    pub shield: Option<Shield>,
    pub quantum_drive: Option<QuantumDrive>,
    pub farcaster: Option<Farcaster>,
    pub auto_repair: bool,
    /// Systems under repair, in service order.
    pub repair_queue: Vec<usize>,
    /// Mission time of the last maintenance pass.
    pub last_maint: f64,
    pub helm: Helm,
}

impl Ship {
    pub fn new(id: ShipId, name: &str, design: ShipDesign, iff: u8, region: RegionId) -> Self {
        let integrity = design.integrity;
        let helm_mode = design.class.is_starship();
        Self {
            id,
            name: name.to_string(),
            design,
            iff,
            rogue: false,
            ai_level: 1,
            region,
            location: Point::ZERO,
            velocity: Point::ZERO,
            basis: Basis::default(),
            flight_phase: FlightPhase::Active,
            airborne: false,
            altitude_agl: 0.0,
            detail_level: 0,
            mission_clock: 0.0,
            in_transition: false,
            invulnerable: false,
            net_observer: false,
            integrity,
            fire_band: FIRE_BANDS as i32,
            shake: 0.0,
            element: Element::default(),
            ward: None,
            target: None,
            orders: None,
            navpoints: Vec::new(),
            contacts: Vec::new(),
            systems: Vec::new(),
            reactors: Vec::new(),
            weapons: Vec::new(),
            primary_group: 0,
            shield: None,
            quantum_drive: None,
            farcaster: None,
            auto_repair: true,
            repair_queue: Vec::new(),
            last_maint: 0.0,
            helm: Helm {
                helm_mode,
                ..Default::default()
            },
        }
    }

    pub fn class(&self) -> ShipClass {
        self.design.class
    }

    pub fn radius(&self) -> f64 {
        self.design.radius
    }

    pub fn is_starship(&self) -> bool {
        self.design.class.is_starship()
    }

    pub fn is_dropship(&self) -> bool {
        self.design.class.is_dropship()
    }

    pub fn is_static(&self) -> bool {
        self.design.class.is_static()
    }

    pub fn is_alive(&self) -> bool {
        self.integrity > 0.0
    }

    pub fn is_armed(&self) -> bool {
        !self.weapons.is_empty()
    }

    /// Hostile to `other` by team code or rogue status.
    pub fn is_hostile_to(&self, other: &Ship) -> bool {
        self.rogue || other.rogue || self.iff != other.iff
    }

    pub fn integrity_fraction(&self) -> f64 {
        if self.design.integrity > 0.0 {
            (self.integrity / self.design.integrity).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Combat worth used by threat/support estimates.
    pub fn ai_value(&self) -> f64 {
        self.design.class.value() * self.integrity_fraction()
    }

    /// Speed along the nose.
    pub fn forward_speed(&self) -> f64 {
        self.velocity.dot(self.basis.forward)
    }

    /// Shield strength in percent; zero when unshielded.
    pub fn shield_strength(&self) -> f64 {
        self.shield.as_ref().map_or(0.0, Shield::strength)
    }

    /// First navpoint still to fly, or a completed one the ship is still
    /// holding at.
    pub fn next_navpoint(&self) -> Option<usize> {
        self.navpoints
            .iter()
            .position(|n| n.is_open() || (n.status == NavStatus::Complete && n.hold_time > 0.0))
    }

    pub fn order_action(&self) -> OrderAction {
        self.orders.as_ref().map_or(OrderAction::None, |o| o.action)
    }

    /// World position of a ship-local offset.
    pub fn local_to_world(&self, local: Point) -> Point {
        self.location + self.basis.to_world(local)
    }

    pub fn system_availability(&self, index: usize) -> f64 {
        self.systems.get(index).map_or(0.0, |s| s.availability)
    }

    pub fn quantum_status(&self) -> Option<SystemStatus> {
        let drive = self.quantum_drive.as_ref()?;
        self.systems.get(drive.system).map(|s| s.status)
    }

    pub fn quantum_powered(&self) -> bool {
        self.quantum_drive
            .as_ref()
            .and_then(|d| self.systems.get(d.system))
            .is_some_and(|s| s.powered)
    }
}
