//! Steering primitives and the per-tick accumulator.
//!
//! Two families live here. Starship hulls steer by absolute helm heading, so
//! their primitives take a world-relative offset (`target - own location`)
//! and return a compass heading in `yaw` plus an elevation in `pitch`.
//! Small craft steer by stick deflection, so their primitives take a point in
//! the ship-local frame (x starboard, y up, z nose) and return normalized
//! inputs: positive yaw turns to starboard, positive pitch raises the nose.

use std::f64::consts::{FRAC_PI_2, PI};
use std::ops::{Add, AddAssign, Mul};

use serde::{Deserialize, Serialize};

use skirmish_core::constants::{SEEK_DAMP, SEEK_GAIN};
use skirmish_core::types::{wrap_angle, Point};

/// One steering contribution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Steer {
    pub yaw: f64,
    pub pitch: f64,
    /// 0–1 braking request.
    pub brake: f64,
    /// Request a full stop.
    pub stop: bool,
}

impl Steer {
    pub fn new(yaw: f64, pitch: f64) -> Self {
        Self {
            yaw,
            pitch,
            ..Default::default()
        }
    }

    pub fn with_brake(mut self, brake: f64) -> Self {
        self.brake = brake;
        self
    }

    pub fn magnitude(&self) -> f64 {
        (self.yaw * self.yaw + self.pitch * self.pitch).sqrt()
    }

    pub fn is_zero(&self) -> bool {
        self.yaw == 0.0 && self.pitch == 0.0 && self.brake == 0.0 && !self.stop
    }
}

impl AddAssign for Steer {
    fn add_assign(&mut self, rhs: Steer) {
        self.yaw += rhs.yaw;
        self.pitch += rhs.pitch;
        self.brake = self.brake.max(rhs.brake);
        self.stop |= rhs.stop;
    }
}

impl Add for Steer {
    type Output = Steer;

    fn add(mut self, rhs: Steer) -> Steer {
        self += rhs;
        self
    }
}

impl Mul<f64> for Steer {
    type Output = Steer;

    fn mul(self, scale: f64) -> Steer {
        Steer {
            yaw: self.yaw * scale,
            pitch: self.pitch * scale,
            ..self
        }
    }
}

// --- Accumulator ---

/// How contributions combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Blend {
    /// Stick inputs: summed until their combined magnitude reaches 1.
    Budget,
    /// Absolute headings cannot be summed; the first contribution wins.
    Priority,
}

/// Running sum of one tick's steering contributions. Always built fresh by
/// the navigator and dropped once helm and throttle have read it.
#[derive(Debug, Clone, Copy)]
pub struct Accumulator {
    blend: Blend,
    steer: Steer,
    magnitude: f64,
    filled: bool,
}

impl Accumulator {
    pub fn new(blend: Blend) -> Self {
        Self {
            blend,
            steer: Steer::default(),
            magnitude: 0.0,
            filled: false,
        }
    }

    /// Add a contribution. Returns the scale applied to it (1 when it fit the
    /// budget, 0 when a priority accumulator was already filled).
    pub fn accumulate(&mut self, steer: Steer) -> f64 {
        match self.blend {
            Blend::Priority => {
                if self.filled {
                    self.steer.brake = self.steer.brake.max(steer.brake);
                    self.steer.stop |= steer.stop;
                    return 0.0;
                }
                self.steer = steer;
                self.filled = true;
                1.0
            }
            Blend::Budget => {
                self.filled = true;
                let mag = steer.magnitude();
                if mag > 0.0 && self.magnitude + mag > 1.0 {
                    let scale = (1.0 - self.magnitude).max(0.0) / mag;
                    self.steer += steer * scale;
                    self.magnitude = 1.0;
                    scale
                } else {
                    self.steer += steer;
                    self.magnitude += mag;
                    1.0
                }
            }
        }
    }

    pub fn is_filled(&self) -> bool {
        self.filled
    }

    pub fn steer(&self) -> Steer {
        self.steer
    }
}

// --- Starship (absolute heading) primitives ---

/// Heading and elevation toward a world-relative offset. Elevation is only
/// commanded when the offset clears the hull radius both vertically and
/// horizontally.
pub fn seek_heading(rel: Point, own_radius: f64) -> Steer {
    let mut yaw = wrap_angle(rel.x.atan2(rel.z) + PI);
    let adjacent = (rel.x * rel.x + rel.z * rel.z).sqrt();
    let mut pitch = 0.0;
    if rel.y.abs() > own_radius && adjacent > own_radius {
        pitch = (rel.y / adjacent).atan();
    }
    if !yaw.is_finite() {
        yaw = 0.0;
    }
    if !pitch.is_finite() {
        pitch = 0.0;
    }
    Steer::new(yaw, pitch)
}

/// Reciprocal of `seek_heading`.
pub fn flee_heading(rel: Point, own_radius: f64) -> Steer {
    let seek = seek_heading(rel, own_radius);
    Steer::new(wrap_angle(seek.yaw + PI), -seek.pitch)
}

/// Turn broadside to the obstacle: a quarter turn away from whichever side
/// of the beam line it lies on.
pub fn avoid_heading(rel: Point, own_radius: f64, beam_line: Point) -> Steer {
    let seek = seek_heading(rel, own_radius);
    let yaw = if rel.dot(beam_line) > 0.0 {
        seek.yaw - FRAC_PI_2
    } else {
        seek.yaw + FRAC_PI_2
    };
    Steer::new(wrap_angle(yaw), seek.pitch)
}

// --- Small craft (stick) primitives ---

/// Three-sample azimuth/elevation history that damps the relative seek.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SeekMemory {
    az: [f64; 3],
    el: [f64; 3],
}

impl SeekMemory {
    /// Shrink the newest sample after the accumulator scaled the seek down.
    pub fn scale_latest(&mut self, scale: f64) {
        self.az[0] *= scale;
        self.el[0] *= scale;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Stick inputs toward a ship-local point.
pub fn seek_relative(memory: &mut SeekMemory, local: Point) -> Steer {
    memory.az[2] = memory.az[1];
    memory.az[1] = memory.az[0];
    memory.el[2] = memory.el[1];
    memory.el[1] = memory.el[0];

    if local.z > 0.0 {
        let mut az = local.x.abs().atan2(local.z) * SEEK_GAIN;
        let mut el = local.y.abs().atan2(local.z) * SEEK_GAIN;
        if local.x < 0.0 {
            az = -az;
        }
        if local.y < 0.0 {
            el = -el;
        }
        memory.az[0] = az;
        memory.el[0] = el;

        let yaw = az - SEEK_DAMP * (memory.az[1] + memory.az[2] * 0.5);
        let pitch = el - SEEK_DAMP * (memory.el[1] + memory.el[2] * 0.5);
        Steer::new(clamp_unit(yaw), clamp_unit(pitch))
    } else {
        // behind us: hard turn toward the point's side
        let yaw = if local.x > 0.0 { 1.0 } else { -1.0 };
        Steer::new(yaw, clamp_unit(local.y * 0.5))
    }
}

/// Stick inputs away from a ship-local point. A point ahead produces a
/// saturated turn with no pitch.
pub fn flee_relative(local: Point) -> Steer {
    let dir = local.normalize_or_zero();
    if dir.z > 0.0 {
        let yaw = if dir.x > 0.0 { -1.0 } else { 1.0 };
        Steer::new(yaw, 0.0)
    } else {
        Steer::new(-dir.x, -dir.y)
    }
}

/// Stick inputs that carry the hull around or over an obstacle of the
/// given clearance radius, whichever needs less deflection.
pub fn avoid_relative(local: Point, radius: f64) -> Steer {
    if local.z <= 0.0 {
        return Steer::default();
    }
    let ax = radius - local.x.abs();
    let ay = radius - local.y.abs();
    if ax < ay {
        let mut yaw = ax.atan2(local.z) * SEEK_GAIN;
        if local.x > 0.0 {
            yaw = -yaw;
        }
        Steer::new(clamp_unit(yaw), 0.0)
    } else {
        let mut pitch = ay.atan2(local.z) * SEEK_GAIN;
        if local.y > 0.0 {
            pitch = -pitch;
        }
        Steer::new(0.0, clamp_unit(pitch))
    }
}

/// Jink patterns drawn while evading: level breaks and climbing turns.
pub const EVADE_PATTERNS: [(f64, f64); 8] = [
    (0.0, 0.5),
    (0.0, 1.0),
    (1.0, 0.3),
    (1.0, 0.6),
    (1.0, 1.0),
    (-1.0, 0.3),
    (-1.0, 0.6),
    (-1.0, 1.0),
];

pub fn evade_pattern(index: usize) -> Steer {
    let (yaw, pitch) = EVADE_PATTERNS[index % EVADE_PATTERNS.len()];
    Steer::new(yaw, pitch)
}

fn clamp_unit(v: f64) -> f64 {
    if v.is_finite() {
        v.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::f64::consts::TAU;

    fn angle_diff(a: f64, b: f64) -> f64 {
        let d = (a - b).rem_euclid(TAU);
        d.min(TAU - d)
    }

    #[test]
    fn test_seek_heading_cardinal_points() {
        let north = seek_heading(Point::new(0.0, 0.0, -1000.0), 10.0);
        let east = seek_heading(Point::new(-1000.0, 0.0, 0.0), 10.0);
        let south = seek_heading(Point::new(0.0, 0.0, 1000.0), 10.0);
        assert!(angle_diff(north.yaw, 0.0) < 1e-9, "north yaw {}", north.yaw);
        assert!(angle_diff(east.yaw, FRAC_PI_2) < 1e-9, "east yaw {}", east.yaw);
        assert!(angle_diff(south.yaw, PI) < 1e-9, "south yaw {}", south.yaw);
    }

    #[test]
    fn test_seek_heading_pitch_needs_clearance() {
        let low = seek_heading(Point::new(0.0, 50.0, -1000.0), 100.0);
        assert_eq!(low.pitch, 0.0, "offset inside hull radius must not pitch");
        let high = seek_heading(Point::new(0.0, 1000.0, -1000.0), 100.0);
        assert!((high.pitch - PI / 4.0).abs() < 1e-9, "pitch {}", high.pitch);
        let overhead = seek_heading(Point::new(0.0, 1000.0, 0.0), 100.0);
        assert_eq!(overhead.pitch, 0.0, "no horizontal clearance, no pitch");
    }

    #[test]
    fn test_seek_heading_degenerate_input_is_zeroed() {
        let s = seek_heading(Point::new(f64::NAN, 0.0, 0.0), 10.0);
        assert_eq!(s.yaw, 0.0);
        assert_eq!(s.pitch, 0.0);
    }

    #[test]
    fn test_seek_relative_ahead_is_centered() {
        let mut memory = SeekMemory::default();
        let s = seek_relative(&mut memory, Point::new(0.0, 0.0, 1000.0));
        assert_eq!(s.yaw, 0.0);
        assert_eq!(s.pitch, 0.0);
    }

    #[test]
    fn test_seek_relative_turns_toward_point() {
        let mut memory = SeekMemory::default();
        let s = seek_relative(&mut memory, Point::new(100.0, 100.0, 1000.0));
        assert!(s.yaw > 0.0, "starboard point should yaw right, got {}", s.yaw);
        assert!(s.pitch > 0.0, "high point should pitch up, got {}", s.pitch);

        let mut memory = SeekMemory::default();
        let behind = seek_relative(&mut memory, Point::new(-5.0, 0.0, -1000.0));
        assert_eq!(behind.yaw, -1.0);
    }

    #[test]
    fn test_seek_relative_memory_damps() {
        let mut memory = SeekMemory::default();
        let p = Point::new(10.0, 0.0, 1000.0);
        let first = seek_relative(&mut memory, p);
        let second = seek_relative(&mut memory, p);
        assert!(second.yaw < first.yaw, "second sample should be damped");
    }

    #[test]
    fn test_flee_relative_ahead_saturates() {
        let s = flee_relative(Point::new(10.0, 5.0, 1000.0));
        assert_eq!(s.yaw, -1.0);
        assert_eq!(s.pitch, 0.0);
    }

    #[test]
    fn test_avoid_relative_picks_smaller_deflection() {
        // obstacle well off to starboard but level: go over or under is costlier
        let s = avoid_relative(Point::new(400.0, 0.0, 2000.0), 500.0);
        assert!(s.yaw < 0.0, "should turn to port, got {:?}", s);
        assert_eq!(s.pitch, 0.0);

        let behind = avoid_relative(Point::new(0.0, 0.0, -100.0), 500.0);
        assert!(behind.is_zero());
    }

    #[test]
    fn test_budget_accumulator_caps_magnitude() {
        let mut acc = Accumulator::new(Blend::Budget);
        assert_eq!(acc.accumulate(Steer::new(0.6, 0.0)), 1.0);
        let scale = acc.accumulate(Steer::new(0.0, 0.8));
        assert!((scale - 0.5).abs() < 1e-12, "scale {}", scale);
        let s = acc.steer();
        assert!((s.pitch - 0.4).abs() < 1e-12);
        assert_eq!(acc.accumulate(Steer::new(1.0, 0.0)), 0.0);
    }

    #[test]
    fn test_priority_accumulator_keeps_first_heading() {
        let mut acc = Accumulator::new(Blend::Priority);
        acc.accumulate(Steer::new(1.0, 0.1).with_brake(0.5));
        acc.accumulate(Steer::new(2.0, 0.0).with_brake(0.2));
        let s = acc.steer();
        assert_eq!(s.yaw, 1.0);
        assert_eq!(s.brake, 0.5);
    }

    #[test]
    fn test_steer_add_keeps_strongest_brake() {
        let s = Steer::new(0.1, 0.2).with_brake(0.3) + Steer::new(0.1, 0.0).with_brake(0.1);
        assert!((s.yaw - 0.2).abs() < 1e-12);
        assert_eq!(s.brake, 0.3);
    }

    fn point() -> impl Strategy<Value = Point> {
        (-1e6..1e6f64, -1e6..1e6f64, -1e6..1e6f64).prop_map(|(x, y, z)| Point::new(x, y, z))
    }

    proptest! {
        #[test]
        fn prop_seek_yaw_in_range(p in point(), radius in 0.0..1e3f64) {
            let s = seek_heading(p, radius);
            prop_assert!(s.yaw.is_finite() && s.pitch.is_finite());
            prop_assert!((0.0..TAU).contains(&s.yaw), "yaw {} out of range", s.yaw);
        }

        #[test]
        fn prop_flee_is_reciprocal(p in point(), radius in 0.0..1e3f64) {
            let seek = seek_heading(p, radius);
            let flee = flee_heading(p, radius);
            prop_assert!(angle_diff(flee.yaw, seek.yaw + PI) < 1e-9);
            prop_assert!((0.0..TAU).contains(&flee.yaw));
            prop_assert_eq!(flee.pitch, -seek.pitch);
        }

        #[test]
        fn prop_avoid_is_quarter_turn(p in point(), beam in point(), radius in 0.0..1e3f64) {
            let seek = seek_heading(p, radius);
            let avoid = avoid_heading(p, radius, beam);
            let expected = if p.dot(beam) > 0.0 { seek.yaw - FRAC_PI_2 } else { seek.yaw + FRAC_PI_2 };
            prop_assert!(angle_diff(avoid.yaw, expected) < 1e-9);
            prop_assert!((angle_diff(avoid.yaw, seek.yaw) - FRAC_PI_2).abs() < 1e-9);
        }

        #[test]
        fn prop_relative_seek_bounded(p in point()) {
            let mut memory = SeekMemory::default();
            for _ in 0..3 {
                let s = seek_relative(&mut memory, p);
                prop_assert!(s.yaw.abs() <= 1.0 && s.pitch.abs() <= 1.0);
            }
        }
    }
}
