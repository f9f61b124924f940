//! Tunable combat parameters and design validation.
//!
//! `CombatTuning` collects the thresholds most likely to be adjusted during
//! balancing. Everything else lives in `constants`. Tuning can be loaded from
//! JSON; missing fields fall back to the defaults.

use serde::{Deserialize, Serialize};

use crate::components::Ship;
use crate::constants::*;
use crate::error::{Result, SkirmishError};

/// Combat tuning shared by the AI and the damage model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatTuning {
    // === CADENCES ===
    /// Seconds between tactical re-evaluations.
    pub tactical_period: f64,
    /// Seconds between subtarget re-selections.
    pub subtarget_interval: f64,
    /// Seconds between point-defense assessments.
    pub point_defense_interval: f64,
    /// Seconds between maintenance passes.
    pub maint_interval: f64,

    // === THRESHOLDS (percent availability) ===
    /// Reactors below this hand their clients to a healthier reactor.
    pub reactor_failover: f64,
    /// Parts below this start repair.
    pub repair_start: f64,
    /// Weapons below this are ignored by subtarget and point-defense checks.
    pub subtarget_min_availability: f64,

    // === DAMAGE ===
    /// Collision damage below this is ignored.
    pub collision_damage_floor: f64,
    /// Subsystem search radius around a missile impact.
    pub missile_blast_radius: f64,

    // === HELM ===
    /// Starship helm pitch limit (radians).
    pub starship_pitch_limit: f64,
    /// Autopilot helm pitch limit (radians).
    pub nav_pitch_limit: f64,
}

impl Default for CombatTuning {
    fn default() -> Self {
        Self {
            tactical_period: TACTICAL_PERIOD_SECS,
            subtarget_interval: SUBTARGET_INTERVAL_SECS,
            point_defense_interval: POINT_DEFENSE_INTERVAL_SECS,
            maint_interval: MAINT_INTERVAL_SECS,
            reactor_failover: REACTOR_FAILOVER_AVAILABILITY,
            repair_start: REPAIR_START_AVAILABILITY,
            subtarget_min_availability: SUBTARGET_MIN_AVAILABILITY,
            collision_damage_floor: COLLISION_DAMAGE_FLOOR,
            missile_blast_radius: MISSILE_BLAST_RADIUS,
            starship_pitch_limit: STARSHIP_PITCH_LIMIT,
            nav_pitch_limit: NAV_PITCH_LIMIT,
        }
    }
}

impl CombatTuning {
    /// Parse and validate tuning from JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let tuning: CombatTuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn validate(&self) -> Result<()> {
        let intervals = [
            ("tactical_period", self.tactical_period),
            ("subtarget_interval", self.subtarget_interval),
            ("point_defense_interval", self.point_defense_interval),
            ("maint_interval", self.maint_interval),
        ];
        for (field, value) in intervals {
            if !(value.is_finite() && value > 0.0) {
                return Err(SkirmishError::InvalidConfig {
                    field,
                    reason: format!("must be a positive number of seconds, got {value}"),
                });
            }
        }

        let percents = [
            ("reactor_failover", self.reactor_failover),
            ("repair_start", self.repair_start),
            ("subtarget_min_availability", self.subtarget_min_availability),
        ];
        for (field, value) in percents {
            if !(0.0..=100.0).contains(&value) {
                return Err(SkirmishError::InvalidConfig {
                    field,
                    reason: format!("must be within 0..=100, got {value}"),
                });
            }
        }

        let limits = [
            ("starship_pitch_limit", self.starship_pitch_limit),
            ("nav_pitch_limit", self.nav_pitch_limit),
        ];
        for (field, value) in limits {
            if !(value > 0.0 && value <= std::f64::consts::FRAC_PI_2) {
                return Err(SkirmishError::InvalidConfig {
                    field,
                    reason: format!("must be within (0, pi/2], got {value}"),
                });
            }
        }

        if self.collision_damage_floor < 0.0 || self.missile_blast_radius < 0.0 {
            return Err(SkirmishError::InvalidConfig {
                field: "damage",
                reason: "damage thresholds must not be negative".to_string(),
            });
        }

        Ok(())
    }
}

/// Check that a ship's design and internal wiring are usable by the AI.
pub fn validate_ship(ship: &Ship) -> Result<()> {
    let invalid = |reason: String| SkirmishError::InvalidDesign {
        design: ship.design.name.clone(),
        reason,
    };
    let design = &ship.design;

    if !(design.radius.is_finite() && design.radius > 0.0) {
        return Err(invalid(format!("radius {} is not positive", design.radius)));
    }
    if !(design.integrity > 0.0) {
        return Err(invalid("hull integrity is not positive".to_string()));
    }
    if !(design.vlimit > 0.0) {
        return Err(invalid("velocity limit is not positive".to_string()));
    }
    if design
        .hull_lods
        .iter()
        .flatten()
        .any(|v| !(v.radius > 0.0) || !v.center.is_finite())
    {
        return Err(invalid("hull volume with bad radius or center".to_string()));
    }

    let n = ship.systems.len();
    let bad_index = |i: usize| i >= n;
    if ship.reactors.iter().any(|r| bad_index(r.system) || r.clients.iter().any(|&c| bad_index(c))) {
        return Err(invalid("reactor refers to a missing system".to_string()));
    }
    if ship
        .weapons
        .iter()
        .flat_map(|g| g.weapons.iter())
        .any(|w| bad_index(w.system))
    {
        return Err(invalid("weapon refers to a missing system".to_string()));
    }
    if ship.shield.as_ref().is_some_and(|s| bad_index(s.system)) {
        return Err(invalid("shield refers to a missing system".to_string()));
    }
    if ship.quantum_drive.as_ref().is_some_and(|q| bad_index(q.system)) {
        return Err(invalid("quantum drive refers to a missing system".to_string()));
    }
    let reactors = ship.reactors.len();
    if ship
        .systems
        .iter()
        .any(|s| s.source.is_some_and(|r| r >= reactors) || s.home_source.is_some_and(|r| r >= reactors))
    {
        return Err(invalid("system wired to a missing reactor".to_string()));
    }

    Ok(())
}
