//! Tests for the combat engine, shot resolution, damage and damage control.

use hecs::World;
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use skirmish_ai::pilot::FireControlState;
use skirmish_ai::{targeting, ActuatorCommand, AiWorld, Pilot};
use skirmish_core::commands::SimCommand;
use skirmish_core::components::{HullVolume, Ship, SystemPart};
use skirmish_core::config::CombatTuning;
use skirmish_core::constants::*;
use skirmish_core::enums::*;
use skirmish_core::events::CombatEvent;
use skirmish_core::roster::Roster;
use skirmish_core::types::{Basis, Point, ShipId, ShotId};
use skirmish_core::SkirmishError;

use crate::damage::{self, DamageContext, Strike};
use crate::engine::{CombatEngine, SimConfig};
use crate::repair;
use crate::shot::{self, Shot};
use crate::systems::{actuators, cleanup, collisions, movement, weapons};
use crate::world_setup::{self, AIRSPACE, FAR_ORBIT, ORBIT};

/// Owns what a `DamageContext` borrows.
struct Harness {
    tuning: CombatTuning,
    rng: ChaCha8Rng,
    events: Vec<CombatEvent>,
}

impl Harness {
    fn new() -> Self {
        Self {
            tuning: CombatTuning::default(),
            rng: ChaCha8Rng::seed_from_u64(7),
            events: Vec::new(),
        }
    }

    fn ctx(&mut self) -> DamageContext<'_> {
        DamageContext {
            tuning: &self.tuning,
            rng: &mut self.rng,
            events: &mut self.events,
            paused: false,
        }
    }
}

fn strike(damage_type: DamageType, missile: bool) -> Strike {
    Strike {
        shooter: ShipId(99),
        damage_type,
        penetration: DEFAULT_PENETRATION,
        missile,
        beam: false,
    }
}

fn destroyer() -> Ship {
    let mut ship = world_setup::destroyer("Test", 1, ORBIT, Point::ZERO, 0.0);
    ship.id = ShipId(1);
    ship
}

fn engine_with_system() -> CombatEngine {
    CombatEngine::new_with_system(SimConfig::default(), world_setup::demo_star_system())
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

// ---- Shot geometry ----

#[test]
fn test_ray_sphere_hits_when_closest_point_on_ray() {
    let q = Point::new(0.0, 0.0, -50.0);
    let w = Point::Z;
    assert!(shot::ray_sphere(Point::ZERO, 10.0, q, w, 100.0));
}

#[test]
fn test_ray_sphere_misses_short_ray() {
    let q = Point::new(0.0, 0.0, -50.0);
    let w = Point::Z;
    assert!(
        !shot::ray_sphere(Point::ZERO, 10.0, q, w, 20.0),
        "Ray ending 30 short of the sphere should miss"
    );
}

#[test]
fn test_ray_sphere_misses_wide() {
    let q = Point::new(0.0, 0.0, -50.0);
    assert!(!shot::ray_sphere(Point::new(20.0, 0.0, 0.0), 10.0, q, Point::Z, 100.0));
}

#[test]
fn test_ray_sphere_leading_edge_inside() {
    // closest point is behind the origin but the tip is inside the sphere
    let q = Point::new(0.0, 0.0, 5.0);
    assert!(shot::ray_sphere(Point::ZERO, 10.0, q, Point::Z, 1.0));
}

#[test]
fn test_sphere_entry_point() {
    let q = Point::new(0.0, 0.0, -50.0);
    let entry = shot::sphere_entry(Point::ZERO, 10.0, q, Point::Z, 100.0).unwrap();
    assert!(entry.distance(Point::new(0.0, 0.0, -10.0)) < 1e-9, "Entry at {entry:?}");
}

#[test]
fn test_shield_shortens_hull_ray() {
    let mut ship = destroyer();
    if let Some(shield) = ship.shield.as_mut() {
        shield.level = 1.0;
    }
    let origin = ship.local_to_world(Point::new(0.0, 0.0, 700.0));
    let shot = Shot {
        id: ShotId(0),
        owner: ShipId(99),
        target: Some(ship.id),
        region: ORBIT,
        origin,
        location: ship.location,
        velocity: Point::ZERO,
        damage: 100.0,
        damage_type: DamageType::Normal,
        penetration: DEFAULT_PENETRATION,
        lethal_radius: 0.0,
        beam: false,
        missile: false,
        life: 1.0,
        overshot: false,
        last_range: 0.0,
        spent: false,
    };

    let impact = shot::check_shot_intersection(&ship, &shot);
    assert!(impact.hit.contains(HitMask::SHIELD), "Expected shield hit, got {:?}", impact.hit);
    assert!(impact.hit.contains(HitMask::HULL), "Expected hull hit, got {:?}", impact.hit);
    let shield_radius = 500.0;
    assert!(
        (impact.point.distance(origin) - (700.0 - shield_radius)).abs() < 1e-6,
        "Shield impact should be on the bubble"
    );
}

#[test]
fn test_hit_test_uses_detail_level() {
    let mut ship = destroyer();
    ship.shield = None;
    ship.design.hull_lods.push(vec![HullVolume {
        center: Point::ZERO,
        radius: 400.0,
    }]);
    // grazes the bounding sphere but clears the fine hull
    let shot = Shot {
        id: ShotId(0),
        owner: ShipId(99),
        target: Some(ship.id),
        region: ORBIT,
        origin: ship.local_to_world(Point::new(300.0, 0.0, 700.0)),
        location: ship.local_to_world(Point::new(300.0, 0.0, -700.0)),
        velocity: Point::ZERO,
        damage: 100.0,
        damage_type: DamageType::Normal,
        penetration: DEFAULT_PENETRATION,
        lethal_radius: 0.0,
        beam: false,
        missile: false,
        life: 1.0,
        overshot: false,
        last_range: 0.0,
        spent: false,
    };

    let impact = shot::check_shot_intersection(&ship, &shot);
    assert!(!impact.hit.contains(HitMask::HULL), "Fine hull should be missed, got {:?}", impact.hit);

    ship.detail_level = 1;
    let impact = shot::check_shot_intersection(&ship, &shot);
    assert!(impact.hit.contains(HitMask::HULL), "Coarse hull should be hit, got {:?}", impact.hit);

    // levels past the last fall back to the coarsest
    ship.detail_level = 5;
    assert!(shot::check_shot_intersection(&ship, &shot).hit.contains(HitMask::HULL));
}

// ---- Damage model ----

#[test]
fn test_shield_deflection_leak() {
    let mut ship = destroyer();
    let shield = ship.shield.as_mut().unwrap();
    shield.level = 1.0;

    // filter = 1 - 0.05 * 5 = 0.75 at full level and availability
    let leak = damage::deflect_damage(shield, 100.0, Some(&strike(DamageType::Normal, false)), 100.0);
    assert!(approx(leak, 25.0), "Leak should be 25, got {leak}");
}

#[test]
fn test_shield_hit_routes_through_deflection() {
    let mut h = Harness::new();
    let mut ship = destroyer();
    ship.shield.as_mut().unwrap().level = 1.0;
    let s = strike(DamageType::Normal, false);
    // clear of every subsystem
    let impact = ship.local_to_world(Point::new(0.0, 0.0, 400.0));

    let applied = damage::inflict_damage(&mut ship, 100.0, Some(&s), HitMask::SHIELD, impact, &mut h.ctx());
    assert_eq!(applied, 0.0, "A shield-only hit never reaches the hull");
    assert_eq!(ship.integrity, 20_000.0);

    let applied = damage::inflict_damage(&mut ship, 100.0, Some(&s), HitMask::BOTH, impact, &mut h.ctx());
    assert!(approx(applied, 25.0), "Only the leak reaches the hull, got {applied}");
    assert!(approx(ship.integrity, 20_000.0 - 25.0));
}

#[test]
fn test_unshielded_hull_hit_lands_on_nearest_system() {
    let mut h = Harness::new();
    let mut ship = destroyer();
    ship.shield = None;
    ship.systems[5].hull_protection = 0.0;
    let impact = ship.local_to_world(ship.systems[5].mount);

    let split = damage::inflict_system_damage(
        &mut ship,
        30.0,
        Some(&strike(DamageType::Normal, false)),
        impact,
        &mut h.ctx(),
    );
    assert_eq!(split.system, Some(5), "Sensor array is the nearest system");
    assert!(approx(split.system_share, 30.0));
    assert!(approx(split.hull_share, 0.0));
    assert!(
        approx(ship.systems[5].availability, 70.0),
        "Sensor array availability {}",
        ship.systems[5].availability
    );
}

#[test]
fn test_no_damage_to_invulnerable_or_observer() {
    let mut h = Harness::new();
    let s = strike(DamageType::Normal, false);

    let mut ship = destroyer();
    ship.invulnerable = true;
    let at = ship.location;
    assert_eq!(damage::inflict_damage(&mut ship, 500.0, Some(&s), HitMask::HULL, at, &mut h.ctx()), 0.0);

    let mut ship = destroyer();
    ship.net_observer = true;
    assert_eq!(damage::inflict_damage(&mut ship, 500.0, Some(&s), HitMask::HULL, at, &mut h.ctx()), 0.0);
    assert_eq!(ship.integrity, 20_000.0);
}

#[test]
fn test_unpowered_system_takes_tenth() {
    let mut h = Harness::new();
    let mut sys = destroyer().systems[2].clone();
    sys.parts.clear();
    sys.powered = false;
    damage::apply_system_damage(&mut sys, 40.0, &mut h.rng);
    assert!(approx(sys.availability, 96.0), "Availability {}", sys.availability);
    assert_eq!(sys.status, SystemStatus::Degraded);
}

#[test]
fn test_explosion_on_large_drop() {
    let mut h = Harness::new();
    let mut ship = destroyer();
    ship.systems[2].parts.clear();
    damage::damage_system(&mut ship, 2, 60.0, &mut h.ctx());
    assert!(
        h.events.iter().any(|e| matches!(e, CombatEvent::Explosion { system: 2, .. })),
        "Expected an explosion event, got {:?}",
        h.events
    );
}

#[test]
fn test_fire_band() {
    assert_eq!(damage::fire_band(1_000.0, 1_000.0), 10);
    assert_eq!(damage::fire_band(449.0, 1_000.0), 4);
    assert_eq!(damage::fire_band(0.0, 1_000.0), 0);
}

#[test]
fn test_emp_hits_power_critical_system() {
    let mut h = Harness::new();
    let mut ship = destroyer();
    ship.shield = None;
    // far from every mount; only the EMP rule can find a system
    let impact = ship.local_to_world(Point::new(0.0, 0.0, 5_000.0));
    let split = damage::inflict_system_damage(
        &mut ship,
        40.0,
        Some(&strike(DamageType::Emp, false)),
        impact,
        &mut h.ctx(),
    );
    let hit = split.system.expect("EMP should find a power-critical system");
    assert!(ship.systems[hit].power_critical);
}

proptest! {
    #[test]
    fn prop_damage_split_conserved(
        amount in 0.0f64..5_000.0,
        x in -400.0f64..400.0,
        y in -100.0f64..100.0,
        z in -400.0f64..400.0,
        kind in 0u8..4,
        missile in any::<bool>(),
    ) {
        let mut h = Harness::new();
        let mut ship = destroyer();
        let impact = ship.local_to_world(Point::new(x, y, z));
        let s = match kind {
            0 => Some(strike(DamageType::Normal, missile)),
            1 => Some(strike(DamageType::Emp, missile)),
            2 => Some(strike(DamageType::Power, missile)),
            _ => None,
        };

        let split = damage::inflict_system_damage(&mut ship, amount, s.as_ref(), impact, &mut h.ctx());
        prop_assert!(
            (split.system_share + split.hull_share - amount).abs() < 1e-6,
            "system {} + hull {} != {}", split.system_share, split.hull_share, amount
        );
        for sys in &ship.systems {
            prop_assert!((0.0..=100.0).contains(&sys.availability), "{} at {}", sys.name, sys.availability);
        }
    }

    #[test]
    fn prop_availability_bounded(hits in proptest::collection::vec(-50.0f64..500.0, 1..20), powered in any::<bool>()) {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut sys = destroyer().systems[0].clone();
        sys.powered = powered;
        for dmg in hits {
            damage::apply_system_damage(&mut sys, dmg, &mut rng);
            prop_assert!((0.0..=100.0).contains(&sys.availability));
            for part in &sys.parts {
                prop_assert!((0.0..=100.0).contains(&part.availability));
            }
        }
    }
}

// ---- Shields ----

#[test]
fn test_shield_power_ramps() {
    let mut ship = destroyer();
    for _ in 0..30 {
        damage::shield_frame(&mut ship, DT);
    }
    let shield = ship.shield.as_ref().unwrap();
    assert!((shield.power - SHIELD_CHARGE_RATE).abs() < 1e-6, "Power {}", shield.power);
    assert!((shield.level - SHIELD_CHARGE_RATE / 100.0).abs() < 1e-6);

    ship.shield.as_mut().unwrap().requested_power = 0.0;
    for _ in 0..30 {
        damage::shield_frame(&mut ship, DT);
    }
    assert_eq!(ship.shield.as_ref().unwrap().power, 0.0, "Discharge is faster than charge");
}

// ---- Repair and power ----

#[test]
fn test_field_repair_restores_with_jerry_rig_penalty() {
    let mut part = SystemPart::new("Coil", 10.0, 60.0, 0);
    part.availability = 30.0;
    part.status = PartStatus::Repair;
    part.time_remaining = 1.0;

    repair::maint_part(&mut part, 2.0);
    assert_eq!(part.jerried, 1);
    assert!(approx(part.availability, 70.0), "Availability {}", part.availability);
    assert_eq!(part.status, PartStatus::Degraded);
}

#[test]
fn test_reported_availability_capped_under_repair() {
    let mut part = SystemPart::new("Coil", 10.0, 60.0, 0);
    part.availability = 90.0;
    part.status = PartStatus::Repair;
    assert!(approx(damage::parts_availability(&[part]), REPAIR_AVAILABILITY_CAP));
}

#[test]
fn test_replace_preferred_when_badly_damaged() {
    let tuning = CombatTuning::default();
    let mut sys = destroyer().systems[2].clone();
    sys.parts[0].availability = 20.0;
    sys.parts[0].status = PartStatus::Critical;

    assert!(repair::start_part_work(&mut sys, &tuning));
    assert_eq!(sys.parts[0].status, PartStatus::Replace);
    assert_eq!(sys.parts[0].spares, 1);
    assert_eq!(sys.status, SystemStatus::Maint);
}

#[test]
fn test_repair_teams_bound_queue_service() {
    let mut ship = destroyer();
    for index in [2, 3, 4, 5] {
        let sys = &mut ship.systems[index];
        for part in &mut sys.parts {
            part.status = PartStatus::Repair;
            part.time_remaining = 100.0;
        }
        sys.status = SystemStatus::Maint;
    }
    ship.repair_queue = vec![2, 3, 4, 5];
    let mut events = Vec::new();

    let serviced = repair::service_repair_queue(&mut ship, 1.0, &mut events);
    assert_eq!(serviced, ship.design.repair_teams);
    assert!(approx(ship.systems[2].parts[0].time_remaining, 99.0));
    assert!(approx(ship.systems[3].parts[0].time_remaining, 99.0));
    assert!(approx(ship.systems[4].parts[0].time_remaining, 100.0), "Third queued system must wait");
    assert!(approx(ship.systems[5].parts[0].time_remaining, 100.0));
}

#[test]
fn test_reactor_failover_and_restore() {
    let mut engine = engine_with_system();
    let mut ship = destroyer();
    ship.systems[0].parts[0].replace_time = 10.0;
    let id = engine.spawn_ship_as(ship, None);

    engine
        .with_ship_mut(id, |s| {
            let sys = &mut s.systems[0];
            sys.parts[0].availability = 20.0;
            sys.parts[0].status = PartStatus::Critical;
            sys.availability = damage::parts_availability(&sys.parts);
            sys.status = damage::calc_status(sys);
        })
        .unwrap();

    let mut events = Vec::new();
    for _ in 0..160 {
        events.extend(engine.tick());
    }
    assert!(
        events
            .iter()
            .any(|e| matches!(e, CombatEvent::PowerRerouted { from: 0, to: 1, clients: 4, .. })),
        "Clients should move off the failing reactor within one pass"
    );
    let ship = engine.ship(id).unwrap();
    assert!(ship.reactors[0].clients.is_empty());
    assert_eq!(ship.systems[2].source, Some(1));

    for _ in 0..600 {
        events.extend(engine.tick());
    }
    assert!(
        events.iter().any(|e| matches!(e, CombatEvent::PowerRestored { reactor: 0, clients: 4, .. })),
        "Clients should return once the reactor is nominal"
    );
    let ship = engine.ship(id).unwrap();
    assert_eq!(ship.systems[0].status, SystemStatus::Nominal);
    let mut home = ship.reactors[0].clients.clone();
    home.sort_unstable();
    assert_eq!(home, vec![2, 3, 4, 6]);
    assert_eq!(ship.systems[2].source, Some(0));
}

// ---- Engine commands ----

#[test]
fn test_repair_priority_swaps_adjacent() {
    let mut engine = engine_with_system();
    let id = engine.spawn_ship_as(destroyer(), None);
    engine.with_ship_mut(id, |s| s.repair_queue = vec![2, 5, 7]).unwrap();

    engine
        .handle_command(SimCommand::IncreaseRepairPriority { ship: id, system: 5 })
        .unwrap();
    assert_eq!(engine.ship(id).unwrap().repair_queue, vec![5, 2, 7]);

    engine
        .handle_command(SimCommand::DecreaseRepairPriority { ship: id, system: 5 })
        .unwrap();
    engine
        .handle_command(SimCommand::DecreaseRepairPriority { ship: id, system: 7 })
        .unwrap();
    assert_eq!(engine.ship(id).unwrap().repair_queue, vec![2, 5, 7], "Last entry cannot move back");
}

#[test]
fn test_unknown_ship_command_rejected() {
    let mut engine = engine_with_system();
    let result = engine.handle_command(SimCommand::ClearOrders { ship: ShipId(99) });
    assert!(matches!(result, Err(SkirmishError::ShipNotFound(ShipId(99)))));

    // queued, the same command is logged and dropped
    engine.queue_command(SimCommand::ClearOrders { ship: ShipId(99) });
    engine.tick();
    assert_eq!(engine.time().tick, 1);
}

#[test]
fn test_invalid_design_idles_pilot() {
    let mut engine = engine_with_system();
    let mut ship = world_setup::fighter("Broken", 1, ORBIT, Point::ZERO, 0.0);
    ship.reactors[0].clients.push(40);
    let id = engine.spawn_ship(ship);

    let events = engine.tick();
    assert!(events.contains(&CombatEvent::PilotIdle { ship: id }));
    let pilot = engine.pilot(id).unwrap();
    assert!(pilot.idle && !pilot.engaged);

    engine.queue_command(SimCommand::Engage { ship: id });
    engine.tick();
    assert!(!engine.pilot(id).unwrap().engaged, "An idle pilot cannot be engaged");
}

#[test]
fn test_disengage_and_engage() {
    let mut engine = engine_with_system();
    let id = engine.spawn_ship(world_setup::fighter("Blue", 1, ORBIT, Point::ZERO, 0.0));
    engine.queue_command(SimCommand::Disengage { ship: id });
    engine.tick();
    assert!(!engine.pilot(id).unwrap().engaged);

    engine.queue_command(SimCommand::Engage { ship: id });
    engine.tick();
    assert!(engine.pilot(id).unwrap().engaged);
}

#[test]
fn test_pause_resume() {
    let mut engine = engine_with_system();
    engine.setup_demo();
    engine.tick();
    let before = engine.time().tick;

    engine.queue_command(SimCommand::Pause);
    engine.tick();
    engine.tick();
    assert!(engine.is_paused());
    assert_eq!(engine.time().tick, before, "Paused engine must not advance");

    engine.queue_command(SimCommand::Resume);
    engine.tick();
    assert_eq!(engine.time().tick, before + 1);
}

#[test]
fn test_time_scale_clamped() {
    let mut engine = engine_with_system();
    engine.queue_command(SimCommand::SetTimeScale { scale: 10.0 });
    engine.tick();
    assert_eq!(engine.time_scale(), 4.0);
}

// ---- Determinism ----

#[test]
fn test_determinism_same_seed() {
    let run = || {
        let mut engine = CombatEngine::new(SimConfig {
            seed: 12345,
            ..Default::default()
        });
        engine.setup_demo();
        let mut log = Vec::new();
        for _ in 0..300 {
            for event in engine.tick() {
                log.push(serde_json::to_string(&event).unwrap());
            }
        }
        let ships: Vec<String> = engine
            .world()
            .query::<&Ship>()
            .iter()
            .map(|(_, s)| format!("{}:{:?}:{}", s.id.0, s.location, s.integrity))
            .collect();
        (log, ships)
    };

    let (log_a, ships_a) = run();
    let (log_b, ships_b) = run();
    assert_eq!(log_a, log_b, "Event logs diverged with same seed");
    assert_eq!(ships_a, ships_b, "Ship state diverged with same seed");
}

// ---- Weapons and impacts ----

#[test]
fn test_auto_turrets_kill_fighter() {
    let mut engine = engine_with_system();
    let shooter = destroyer();
    let spot = shooter.local_to_world(Point::new(0.0, 0.0, 10_000.0));
    let shooter = engine.spawn_ship_as(shooter, None);
    let victim = engine.spawn_ship_as(world_setup::fighter("Red", 2, ORBIT, spot, 0.0), None);

    engine
        .with_ship_mut(shooter, |s| {
            let group = &mut s.weapons[0];
            group.firing_orders = FiringOrders::Auto;
            group.target = Some(victim);
            for w in &mut group.weapons {
                w.firing_orders = FiringOrders::Auto;
            }
        })
        .unwrap();

    let mut events = engine.tick();
    let fired = events
        .iter()
        .filter(|e| matches!(e, CombatEvent::ShotFired { shooter: s, group: 0, .. } if *s == shooter))
        .count();
    assert_eq!(fired, 2, "Both turrets should fire on the first tick");
    assert_eq!(engine.shot_count(), 2);

    for _ in 0..300 {
        events.extend(engine.tick());
    }
    assert!(
        events.iter().any(|e| matches!(e, CombatEvent::Hit { ship, .. } if *ship == victim)),
        "Fighter should be hit"
    );
    assert!(events.contains(&CombatEvent::ShipDestroyed { ship: victim }));
    assert!(engine.ship(victim).is_none(), "Destroyed ship is despawned");
}

#[test]
fn test_manual_group_needs_trigger() {
    let mut engine = engine_with_system();
    let shooter = destroyer();
    let spot = shooter.local_to_world(Point::new(0.0, 0.0, 10_000.0));
    let shooter = engine.spawn_ship_as(shooter, None);
    let victim = engine.spawn_ship_as(world_setup::fighter("Red", 2, ORBIT, spot, 0.0), None);
    engine.with_ship_mut(shooter, |s| s.target = Some(victim)).unwrap();

    let events = engine.tick();
    assert!(
        !events.iter().any(|e| matches!(e, CombatEvent::ShotFired { .. })),
        "Manual weapons hold fire without a trigger pull"
    );
}

#[test]
fn test_primary_group_cycles_when_dry() {
    let mut engine = engine_with_system();
    let mut ship = world_setup::fighter("Blue", 1, ORBIT, Point::ZERO, 0.0);
    ship.weapons[0].weapons[0].ammo = Some(0);
    let id = engine.spawn_ship_as(ship, None);

    let events = engine.tick();
    assert!(events.contains(&CombatEvent::WeaponGroupCycled { ship: id, group: 1 }));
    assert_eq!(engine.ship(id).unwrap().primary_group, 1);
}

/// Subtarget a fresh fire-control state would pick on `target`.
fn subtarget_seen_by(shooter: &Ship, target: &Ship) -> Option<usize> {
    let mut roster = Roster::new(world_setup::demo_star_system());
    roster.insert(shooter.clone());
    roster.insert(target.clone());
    let tuning = CombatTuning::default();
    let world = AiWorld::new(&roster, &tuning, 0.0);
    targeting::select_subtarget(&mut FireControlState::default(), shooter, Some(target), &world)
}

#[test]
fn test_turret_aim_follows_bore_and_target() {
    let mut target = destroyer();
    let spot = target.local_to_world(Point::new(0.0, 0.0, 10_000.0));
    let mut shooter = world_setup::destroyer("Red", 2, ORBIT, spot, 0.0);
    shooter.id = ShipId(2);

    weapons::slew(&mut target, None);
    for w in &target.weapons[0].weapons {
        assert!(w.aim.distance(target.basis.forward) < 1e-9, "idle turret rests on its bore");
    }
    assert_eq!(subtarget_seen_by(&shooter, &target), Some(6), "nearest bow turret faces us");

    // swing the hull around: idle turrets now point away
    target.basis = Basis::from_heading(std::f64::consts::PI, 0.0);
    weapons::slew(&mut target, None);
    assert_eq!(subtarget_seen_by(&shooter, &target), None);

    // a turret tracking us is a threat whatever way the hull faces
    target.target = Some(shooter.id);
    let mut roster = Roster::new(world_setup::demo_star_system());
    roster.insert(shooter.clone());
    weapons::slew(&mut target, Some(&roster));
    let to_shooter = (shooter.location - target.location).normalize();
    assert!(target.weapons[0].weapons.iter().all(|w| w.aim.dot(to_shooter) > 0.99));
    assert_eq!(subtarget_seen_by(&shooter, &target), Some(7), "aft turret is now nearest");
}

#[test]
fn test_starship_pilot_subtargets_turret_facing_it() {
    let mut engine = engine_with_system();
    let blue = engine.spawn_ship(world_setup::destroyer("Blue", 1, ORBIT, Point::ZERO, 0.0));
    // unpiloted and holding fire, bow toward blue
    let red = world_setup::destroyer("Red", 2, ORBIT, Point::new(0.0, 0.0, -40_000.0), std::f64::consts::PI);
    engine.spawn_ship_as(red, None);

    let mut subtarget = None;
    for _ in 0..300 {
        engine.tick();
        subtarget = engine.pilot(blue).and_then(|p| p.nav.subtarget);
        if subtarget.is_some() {
            break;
        }
    }
    assert_eq!(subtarget, Some(6), "bow turret should be picked as subtarget");
}

#[test]
fn test_cleanup_despawns_spent_shots() {
    let mut world = World::new();
    let ship = destroyer();
    let shot = Shot {
        id: ShotId(1),
        owner: ship.id,
        target: None,
        region: ORBIT,
        origin: Point::ZERO,
        location: Point::ZERO,
        velocity: Point::ZERO,
        damage: 1.0,
        damage_type: DamageType::Normal,
        penetration: DEFAULT_PENETRATION,
        lethal_radius: 0.0,
        beam: false,
        missile: false,
        life: 0.0,
        overshot: false,
        last_range: 0.0,
        spent: false,
    };
    world.spawn((ship,));
    world.spawn((shot,));

    let mut buffer = Vec::new();
    cleanup::run(&mut world, &mut buffer);
    assert_eq!(world.query::<&Shot>().iter().count(), 0);
    assert_eq!(world.query::<&Ship>().iter().count(), 1);
}

#[test]
fn test_collision_damages_both_hulls() {
    let mut h = Harness::new();
    let mut world = World::new();
    let mut a = world_setup::fighter("A", 1, ORBIT, Point::ZERO, 0.0);
    a.id = ShipId(1);
    a.velocity = Point::new(0.0, 0.0, -300.0);
    let mut b = world_setup::fighter("B", 2, ORBIT, Point::new(0.0, 0.0, -20.0), 0.0);
    b.id = ShipId(2);
    b.velocity = Point::new(0.0, 0.0, 300.0);
    world.spawn((a,));
    world.spawn((b,));

    collisions::run(&mut world, &mut h.ctx());

    for (_, ship) in world.query::<&Ship>().iter() {
        assert!(ship.integrity < 400.0, "{} should be damaged", ship.name);
        assert!(ship.velocity.length() < 1e-9, "{} should stop, moving {:?}", ship.name, ship.velocity);
    }
}

// ---- Transit ----

#[test]
fn test_quantum_jump_cycle() {
    let mut engine = engine_with_system();
    let id = engine.spawn_ship_as(destroyer(), None);
    let system = engine.star_system().clone();
    let dest = Point::new(5_000.0, 0.0, 0.0);

    let mut events = Vec::new();
    engine
        .with_ship_mut(id, |s| {
            actuators::apply(
                s,
                ActuatorCommand::EngageQuantum {
                    region: FAR_ORBIT,
                    location: dest,
                },
                &system,
                &mut events,
            )
        })
        .unwrap();
    assert!(events.contains(&CombatEvent::QuantumEngaged { ship: id, region: FAR_ORBIT }));

    for _ in 0..200 {
        events.extend(engine.tick());
    }
    assert!(events.contains(&CombatEvent::QuantumArrived { ship: id, region: FAR_ORBIT }));
    let ship = engine.ship(id).unwrap();
    assert_eq!(ship.region, FAR_ORBIT);
    assert!(!ship.in_transition);

    for _ in 0..100 {
        engine.tick();
    }
    let state = engine.ship(id).unwrap().quantum_drive.unwrap().state;
    assert_eq!(state, QuantumState::Ready, "Drive should cool down after arrival");
}

#[test]
fn test_drop_orbit_rebases_location() {
    let system = world_setup::demo_star_system();
    let mut ship = world_setup::fighter("Lander", 1, ORBIT, Point::new(100.0, 0.0, 0.0), 0.0);
    let mut events = Vec::new();

    actuators::apply(&mut ship, ActuatorCommand::DropOrbit, &system, &mut events);
    assert_eq!(ship.region, AIRSPACE);
    assert!(ship.airborne);
    assert!(ship.location.distance(Point::new(100.0, 2.0e6, 0.0)) < 1e-6, "Location {:?}", ship.location);

    actuators::apply(&mut ship, ActuatorCommand::MakeOrbit, &system, &mut events);
    assert_eq!(ship.region, ORBIT);
    assert!(ship.location.distance(Point::new(100.0, 0.0, 0.0)) < 1e-6);
    assert_eq!(
        events.iter().filter(|e| matches!(e, CombatEvent::OrbitTransition { .. })).count(),
        2
    );
}

#[test]
fn test_farcaster_transit() {
    let mut world = World::new();
    let mut gate_a = world_setup::farcaster_station("Gate A", 1, ORBIT, Point::ZERO);
    gate_a.id = ShipId(1);
    if let Some(f) = gate_a.farcaster.as_mut() {
        f.dest = Some(ShipId(2));
    }
    let mut gate_b = world_setup::farcaster_station("Gate B", 1, FAR_ORBIT, Point::new(1_000.0, 0.0, 0.0));
    gate_b.id = ShipId(2);
    gate_b.farcaster.as_mut().unwrap().dest = Some(ShipId(1));

    let mut traveller = world_setup::fighter("Courier", 1, ORBIT, Point::new(0.0, 0.0, -400.0), 0.0);
    traveller.id = ShipId(3);
    let mut pilot = Pilot::new(AiKind::Fighter, &traveller, 0.0, 7);
    pilot.nav.farcaster = Some(ShipId(1));

    world.spawn((gate_a,));
    world.spawn((gate_b,));
    world.spawn((traveller, pilot));

    let mut events = Vec::new();
    movement::run(&mut world, DT, &mut events);

    let moved = world
        .query::<&Ship>()
        .iter()
        .map(|(_, s)| s.clone())
        .find(|s| s.id == ShipId(3))
        .unwrap();
    assert_eq!(moved.region, FAR_ORBIT);
    assert!(moved.location.distance(Point::new(1_000.0, 0.0, 400.0)) < 1e-6, "Exit at {:?}", moved.location);
    assert!(events.contains(&CombatEvent::QuantumArrived { ship: ShipId(3), region: FAR_ORBIT }));
}

#[test]
fn test_helm_turns_toward_heading() {
    let mut world = World::new();
    let mut ship = destroyer();
    ship.helm.heading = std::f64::consts::FRAC_PI_2;
    world.spawn((ship,));

    let mut events = Vec::new();
    movement::run(&mut world, 1.0, &mut events);

    let heading = world.query::<&Ship>().iter().next().map(|(_, s)| s.basis.heading()).unwrap();
    assert!(
        (heading - 0.1).abs() < 1e-6,
        "Turn is limited to the design rate, heading {heading}"
    );
}

#[test]
fn test_throttle_accelerates_along_nose() {
    let mut world = World::new();
    let mut ship = world_setup::fighter("Blue", 1, ORBIT, Point::ZERO, 0.0);
    ship.helm.throttle = 100.0;
    world.spawn((ship,));

    let mut events = Vec::new();
    movement::run(&mut world, 1.0, &mut events);

    let ship = world.query::<&Ship>().iter().next().map(|(_, s)| s.clone()).unwrap();
    assert!(approx(ship.forward_speed(), ship.design.thrust), "Speed {}", ship.forward_speed());
    assert!(ship.location.z < 0.0, "Heading 0 flies north (-z)");
}
