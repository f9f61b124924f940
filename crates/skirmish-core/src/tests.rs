#[cfg(test)]
mod tests {
    use std::f64::consts::{FRAC_PI_2, PI, TAU};

    use crate::commands::SimCommand;
    use crate::components::*;
    use crate::config::{validate_ship, CombatTuning};
    use crate::enums::*;
    use crate::events::CombatEvent;
    use crate::roster::{Region, Roster, StarSystem};
    use crate::types::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn two_region_system() -> StarSystem {
        StarSystem {
            regions: vec![
                Region {
                    id: RegionId(1),
                    name: "Orbit".into(),
                    kind: RegionKind::Orbital,
                    location: Point::new(0.0, 0.0, 0.0),
                    primary: 1,
                },
                Region {
                    id: RegionId(2),
                    name: "Surface".into(),
                    kind: RegionKind::AirSpace,
                    location: Point::new(0.0, 0.0, 5.0e6),
                    primary: 1,
                },
            ],
        }
    }

    // ---- Geometry ----

    #[test]
    fn test_basis_heading_is_compass() {
        for (heading, expected_forward) in [
            (0.0, Point::new(0.0, 0.0, -1.0)),
            (FRAC_PI_2, Point::new(-1.0, 0.0, 0.0)),
            (PI, Point::new(0.0, 0.0, 1.0)),
        ] {
            let basis = Basis::from_heading(heading, 0.0);
            assert!(
                basis.forward.distance(expected_forward) < 1e-9,
                "heading {heading:.3} gave forward {:?}",
                basis.forward
            );
            assert!(approx(basis.heading(), heading));
        }
    }

    #[test]
    fn test_basis_is_orthonormal_after_turns() {
        let mut basis = Basis::from_heading(1.0, 0.2);
        for _ in 0..100 {
            basis.turn(0.03, -0.01, 0.02);
        }
        assert!(approx(basis.forward.length(), 1.0));
        assert!(approx(basis.right.length(), 1.0));
        assert!(basis.forward.dot(basis.right).abs() < 1e-9);
        assert!(basis.forward.dot(basis.up).abs() < 1e-9);
    }

    #[test]
    fn test_turn_to_starboard_increases_heading() {
        let mut basis = Basis::from_heading(0.0, 0.0);
        basis.turn(0.1, 0.0, 0.0);
        assert!(approx(basis.heading(), 0.1), "heading {:.4}", basis.heading());
    }

    #[test]
    fn test_local_world_round_trip() {
        let basis = Basis::from_heading(2.1, -0.3);
        let v = Point::new(10.0, -4.0, 7.5);
        let back = basis.to_world(basis.to_local(v));
        assert!(back.distance(v) < 1e-9);
    }

    #[test]
    fn test_wrap_angle_range() {
        for angle in [-1e-18, -PI, 0.0, TAU, 3.0 * TAU + 0.5, -7.0] {
            let w = wrap_angle(angle);
            assert!((0.0..TAU).contains(&w), "wrap({angle}) = {w}");
        }
    }

    #[test]
    fn test_sim_time_advance() {
        let mut t = SimTime::default();
        for _ in 0..30 {
            t.advance();
        }
        assert_eq!(t.tick, 30);
        assert!((t.elapsed_secs - 1.0).abs() < 1e-9);
    }

    // ---- Classification ----

    #[test]
    fn test_class_families() {
        assert!(ShipClass::Fighter.is_dropship());
        assert!(!ShipClass::Fighter.is_starship());
        assert!(ShipClass::Destroyer.is_starship());
        assert!(ShipClass::Farcaster.is_starship());
        assert!(ShipClass::Station.is_static());
        assert!(!ShipClass::Mine.is_starship());
        assert!(ShipClass::Frigate.is_anti_air_escort());
        assert!(ShipClass::Carrier > ShipClass::Destroyer);
    }

    #[test]
    fn test_hit_mask_bits() {
        let both = HitMask::SHIELD | HitMask::HULL;
        assert_eq!(both, HitMask::BOTH);
        assert!(both.contains(HitMask::HULL));
        assert!(!both.contains(HitMask::TURRET));
        assert!(!HitMask::NOTHING.is_hit());
        assert!(!both.contains(HitMask::NOTHING));
    }

    // ---- Ship model ----

    #[test]
    fn test_next_navpoint_skips_complete() {
        let mut ship = Ship::new(
            ShipId(1),
            "Test",
            ShipDesign::new("Cutter", ShipClass::Corvette, 100.0),
            1,
            RegionId(1),
        );
        let mut first = Instruction::new(NavAction::Vector, Point::ZERO, None);
        first.status = NavStatus::Complete;
        ship.navpoints = vec![
            first,
            Instruction::new(NavAction::Patrol, Point::new(1.0, 0.0, 0.0), None),
        ];
        assert_eq!(ship.next_navpoint(), Some(1));
    }

    #[test]
    fn test_part_availability_capped_under_repair() {
        let mut part = SystemPart::new("coil", 60.0, 120.0, 1);
        part.availability = 90.0;
        part.status = PartStatus::Repair;
        assert_eq!(part.reported_availability(), 50.0);
        part.status = PartStatus::Degraded;
        assert_eq!(part.reported_availability(), 90.0);
    }

    #[test]
    fn test_hostility() {
        let design = ShipDesign::new("Viper", ShipClass::Fighter, 10.0);
        let a = Ship::new(ShipId(1), "A", design.clone(), 1, RegionId(1));
        let mut b = Ship::new(ShipId(2), "B", design.clone(), 1, RegionId(1));
        let c = Ship::new(ShipId(3), "C", design, 2, RegionId(1));
        assert!(!a.is_hostile_to(&b));
        assert!(a.is_hostile_to(&c));
        b.rogue = true;
        assert!(a.is_hostile_to(&b));
    }

    // ---- Roster ----

    #[test]
    fn test_roster_lookup_and_liveness() {
        let mut roster = Roster::new(two_region_system());
        let design = ShipDesign::new("Viper", ShipClass::Fighter, 10.0);
        let mut dead = Ship::new(ShipId(2), "Dead", design.clone(), 1, RegionId(1));
        dead.integrity = 0.0;
        roster.insert(Ship::new(ShipId(1), "Alive", design, 1, RegionId(1)));
        roster.insert(dead);

        assert!(roster.live(Some(ShipId(1))).is_some());
        assert!(roster.live(Some(ShipId(2))).is_none());
        assert!(roster.live(Some(ShipId(99))).is_none());
        assert!(roster.live(None).is_none());
    }

    #[test]
    fn test_find_farcaster_by_destination_region() {
        let mut roster = Roster::new(two_region_system());
        let design = ShipDesign::new("Gate", ShipClass::Farcaster, 500.0);
        let mut near = Ship::new(ShipId(1), "Gate A", design.clone(), 0, RegionId(1));
        near.farcaster = Some(Farcaster {
            start: Point::new(0.0, 0.0, -1000.0),
            end: Point::new(0.0, 0.0, 1000.0),
            approach: Point::new(0.0, 0.0, -20_000.0),
            dest: Some(ShipId(2)),
        });
        let mut far = Ship::new(ShipId(2), "Gate B", design, 0, RegionId(2));
        far.farcaster = Some(Farcaster {
            start: Point::ZERO,
            end: Point::ZERO,
            approach: Point::ZERO,
            dest: Some(ShipId(1)),
        });
        roster.insert(near);
        roster.insert(far);

        assert_eq!(roster.find_farcaster(RegionId(1), RegionId(2)), Some(ShipId(1)));
        assert_eq!(roster.find_farcaster(RegionId(2), RegionId(1)), Some(ShipId(2)));
        assert_eq!(roster.find_farcaster(RegionId(1), RegionId(3)), None);

        let points = roster.farcaster_points(ShipId(1)).unwrap();
        assert_eq!(points.end, Point::new(0.0, 0.0, 1000.0));
    }

    #[test]
    fn test_star_system_queries() {
        let system = two_region_system();
        assert!(system.is_airspace(RegionId(2)));
        assert!(system.is_orbital(RegionId(1)));
        assert!(system.share_primary(RegionId(1), RegionId(2)));
        assert_eq!(system.nearest_terrain(RegionId(1)).map(|r| r.id), Some(RegionId(2)));
        assert_eq!(
            system.offset(RegionId(1), RegionId(2)),
            Some(Point::new(0.0, 0.0, 5.0e6))
        );
    }

    // ---- Config ----

    #[test]
    fn test_tuning_partial_json_uses_defaults() {
        let tuning = CombatTuning::from_json_str(r#"{ "maint_interval": 2.5 }"#).unwrap();
        assert_eq!(tuning.maint_interval, 2.5);
        assert_eq!(tuning.subtarget_interval, CombatTuning::default().subtarget_interval);
    }

    #[test]
    fn test_tuning_rejects_bad_values() {
        assert!(CombatTuning::from_json_str(r#"{ "maint_interval": 0.0 }"#).is_err());
        assert!(CombatTuning::from_json_str(r#"{ "reactor_failover": 140.0 }"#).is_err());
        assert!(CombatTuning::from_json_str("not json").is_err());
    }

    #[test]
    fn test_validate_ship_catches_dangling_system_index() {
        let mut ship = Ship::new(
            ShipId(1),
            "Broken",
            ShipDesign::new("Cutter", ShipClass::Corvette, 100.0),
            1,
            RegionId(1),
        );
        assert!(validate_ship(&ship).is_ok());
        ship.reactors.push(PowerSource {
            system: 4,
            capacity: 100.0,
            charge: 100.0,
            clients: vec![],
        });
        let err = validate_ship(&ship).unwrap_err();
        assert!(err.to_string().contains("Cutter"), "{err}");
    }

    // ---- Serde ----

    #[test]
    fn test_command_and_event_tags() {
        let cmd = SimCommand::Disengage { ship: ShipId(3) };
        let json = serde_json::to_string(&cmd).unwrap();
        assert!(json.contains("\"type\":\"Disengage\""), "{json}");

        let event = CombatEvent::Hit {
            ship: ShipId(1),
            shooter: ShipId(2),
            hit: HitMask::BOTH,
            damage: 10.0,
            hull_damage: 4.0,
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: CombatEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, back);
    }
}
