//! Ship factories and the demo engagement.
//!
//! Builds fully wired hulls: systems with parts, reactors feeding their
//! client systems, weapon groups, shields and drives. Ids are placeholders
//! until the engine spawns the ship.

use skirmish_core::components::*;
use skirmish_core::constants::*;
use skirmish_core::enums::*;
use skirmish_core::roster::{Region, StarSystem};
use skirmish_core::types::{Basis, Point, RegionId, ShipId};

pub const ORBIT: RegionId = RegionId(1);
pub const AIRSPACE: RegionId = RegionId(2);
pub const FAR_ORBIT: RegionId = RegionId(3);

/// Two worlds: one with an orbital volume over an airspace, one with an
/// orbital volume only.
pub fn demo_star_system() -> StarSystem {
    StarSystem {
        regions: vec![
            Region {
                id: ORBIT,
                name: "Ilon Orbit".to_string(),
                kind: RegionKind::Orbital,
                location: Point::ZERO,
                primary: 1,
            },
            Region {
                id: AIRSPACE,
                name: "Ilon Airspace".to_string(),
                kind: RegionKind::AirSpace,
                location: Point::new(0.0, -2.0e6, 0.0),
                primary: 1,
            },
            Region {
                id: FAR_ORBIT,
                name: "Borova Orbit".to_string(),
                kind: RegionKind::Orbital,
                location: Point::new(8.0e8, 0.0, 0.0),
                primary: 2,
            },
        ],
    }
}

/// A blue and a red destroyer group closing head-on.
pub fn demo_engagement() -> Vec<Ship> {
    let mut ships = Vec::new();

    ships.push(destroyer("Resolute", 1, ORBIT, Point::ZERO, 0.0));
    for (i, x) in [-2_000.0, 2_000.0].into_iter().enumerate() {
        ships.push(fighter(&format!("Blue {}", i + 1), 1, ORBIT, Point::new(x, 0.0, -3_000.0), 0.0));
    }

    let heading = std::f64::consts::PI;
    let mut red = destroyer("Korsak", 2, ORBIT, Point::new(0.0, 0.0, -45_000.0), heading);
    red.ai_level = 2;
    ships.push(red);
    for (i, x) in [-2_000.0, 2_000.0].into_iter().enumerate() {
        let mut f = fighter(&format!("Red {}", i + 1), 2, ORBIT, Point::new(x, 0.0, -42_000.0), heading);
        f.ai_level = 2;
        ships.push(f);
    }

    ships
}

fn part(name: &str, repair_time: f64, replace_time: f64, spares: u32) -> SystemPart {
    SystemPart::new(name, repair_time, replace_time, spares)
}

/// Destroyer with two reactors, a shield, a quantum drive, a turret battery
/// and a point-defense group.
pub fn destroyer(name: &str, iff: u8, region: RegionId, location: Point, heading: f64) -> Ship {
    let mut design = ShipDesign::new("Destroyer", ShipClass::Destroyer, 400.0);
    design.integrity = 20_000.0;
    design.hull_lods = vec![vec![
        HullVolume { center: Point::new(0.0, 0.0, 220.0), radius: 180.0 },
        HullVolume { center: Point::ZERO, radius: 240.0 },
        HullVolume { center: Point::new(0.0, 0.0, -220.0), radius: 180.0 },
    ]];

    let mut ship = Ship::new(ShipId(0), name, design, iff, region);
    ship.location = location;
    ship.basis = Basis::from_heading(heading, 0.0);
    ship.helm.heading = heading;

    let mut sensors = SimSystem::new("Sensor Array", SystemCategory::Sensor, Point::new(0.0, 60.0, 250.0), 40.0)
        .with_parts(vec![part("Antenna", 30.0, 60.0, 1), part("Processor", 45.0, 90.0, 1)]);
    sensors.power_critical = true;
    let mut shield_gen = SimSystem::new("Shield Generator", SystemCategory::Shield, Point::new(0.0, 40.0, 0.0), 50.0)
        .with_parts(vec![part("Emitter", 40.0, 120.0, 2), part("Capacitor Bank", 60.0, 150.0, 1)]);
    shield_gen.power_critical = true;

    ship.systems = vec![
        SimSystem::new("Main Reactor", SystemCategory::PowerSource, Point::new(0.0, 0.0, -120.0), 70.0)
            .with_parts(vec![part("Core", 90.0, 240.0, 1), part("Coolant Loop", 40.0, 120.0, 2)])
            .with_hull_protection(0.6),
        SimSystem::new("Aux Reactor", SystemCategory::PowerSource, Point::new(0.0, 0.0, 60.0), 50.0)
            .with_parts(vec![part("Core", 90.0, 240.0, 1)])
            .with_hull_protection(0.6),
        SimSystem::new("Main Drive", SystemCategory::Drive, Point::new(0.0, 0.0, -330.0), 90.0)
            .with_parts(vec![part("Thruster", 60.0, 180.0, 2), part("Fuel Feed", 30.0, 90.0, 2)]),
        SimSystem::new("Quantum Drive", SystemCategory::QuantumDrive, Point::new(0.0, -30.0, -250.0), 60.0)
            .with_parts(vec![part("Field Coil", 120.0, 300.0, 1)]),
        shield_gen,
        sensors,
        SimSystem::new("Forward Turret", SystemCategory::Weapon, Point::new(0.0, 50.0, 160.0), 25.0)
            .with_parts(vec![part("Barrel", 20.0, 60.0, 2)]),
        SimSystem::new("Aft Turret", SystemCategory::Weapon, Point::new(0.0, 50.0, -160.0), 25.0)
            .with_parts(vec![part("Barrel", 20.0, 60.0, 2)]),
        SimSystem::new("Point Defense", SystemCategory::Weapon, Point::new(40.0, 0.0, 0.0), 15.0)
            .with_parts(vec![part("Tracker", 15.0, 45.0, 3)]),
    ];

    ship.reactors = vec![
        PowerSource { system: 0, capacity: 1_000.0, charge: 1_000.0, clients: vec![2, 3, 4, 6] },
        PowerSource { system: 1, capacity: 600.0, charge: 600.0, clients: vec![5, 7, 8] },
    ];

    let turret = |name: &str, system: usize, pivot: Point| {
        let mut w = Weapon::new(name, system, 30_000.0, 250.0).on_turret(pivot, 20.0);
        w.refire_secs = 3.0;
        w.shot_speed = 6_000.0;
        w
    };
    let main = WeaponGroup::new(
        "Main Battery",
        vec![
            turret("Forward Cannon", 6, Point::new(0.0, 50.0, 160.0)),
            turret("Aft Cannon", 7, Point::new(0.0, 50.0, -160.0)),
        ],
    );

    let mut pd_gun = Weapon::new("Flak", 8, 6_000.0, 30.0).on_turret(Point::new(40.0, 0.0, 0.0), 8.0);
    pd_gun.refire_secs = 0.5;
    pd_gun.firing_orders = FiringOrders::PointDefense;
    let mut pd = WeaponGroup::new("Point Defense", vec![pd_gun]);
    pd.point_defense = true;
    pd.firing_orders = FiringOrders::PointDefense;

    ship.weapons = vec![main, pd];
    ship.shield = Some(Shield {
        system: 4,
        level: 0.0,
        power: 0.0,
        requested_power: SHIELD_POWER_CALM,
        factor: 0.05,
        curve: 1.0,
        capacitor: false,
        cutoff: 0.0,
        energy: 0.0,
        capacity: 0.0,
        deflection_cost: 0.0,
        recharge_rate: 0.0,
        radius: 500.0,
    });
    ship.quantum_drive = Some(QuantumDrive {
        system: 3,
        state: QuantumState::Ready,
        destination: None,
        timer: 0.0,
    });
    ship
}

/// Single-seat fighter with a fixed gun pair and a missile rack.
pub fn fighter(name: &str, iff: u8, region: RegionId, location: Point, heading: f64) -> Ship {
    let mut design = ShipDesign::new("Fighter", ShipClass::Fighter, 12.0);
    design.integrity = 400.0;
    design.repair_teams = 1;

    let mut ship = Ship::new(ShipId(0), name, design, iff, region);
    ship.location = location;
    ship.basis = Basis::from_heading(heading, 0.0);

    ship.systems = vec![
        SimSystem::new("Power Plant", SystemCategory::PowerSource, Point::new(0.0, 0.0, -4.0), 3.0)
            .with_parts(vec![part("Generator", 30.0, 90.0, 0)]),
        SimSystem::new("Guns", SystemCategory::Weapon, Point::new(0.0, 0.0, 6.0), 2.0),
        SimSystem::new("Missile Rack", SystemCategory::Weapon, Point::new(0.0, -2.0, 0.0), 2.0),
        SimSystem::new("Engine", SystemCategory::Drive, Point::new(0.0, 0.0, -8.0), 4.0),
    ];
    ship.reactors = vec![PowerSource { system: 0, capacity: 100.0, charge: 100.0, clients: vec![1, 2, 3] }];

    let mut gun = Weapon::new("Laser Cannon", 1, 8_000.0, 40.0);
    gun.refire_secs = 0.25;

    let mut missile = Weapon::new("Striker", 2, 20_000.0, 400.0);
    missile.guided = true;
    missile.lethal_radius = 150.0;
    missile.shot_speed = 1_500.0;
    missile.refire_secs = 4.0;
    missile.damage_type = DamageType::Normal;
    missile.ammo = Some(4);

    ship.weapons = vec![
        WeaponGroup::new("Guns", vec![gun]),
        WeaponGroup::new("Missiles", vec![missile]),
    ];
    ship
}

/// Farcaster gate station. `dest` is the paired gate, set once both are
/// spawned.
pub fn farcaster_station(name: &str, iff: u8, region: RegionId, location: Point) -> Ship {
    let design = ShipDesign::new("Farcaster", ShipClass::Farcaster, 300.0);
    let mut ship = Ship::new(ShipId(0), name, design, iff, region);
    ship.location = location;
    ship.farcaster = Some(Farcaster {
        start: Point::new(0.0, 0.0, 400.0),
        end: Point::new(0.0, 0.0, -400.0),
        approach: Point::new(0.0, 0.0, 20_000.0),
        dest: None,
    });
    ship
}
