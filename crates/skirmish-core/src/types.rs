//! Fundamental geometric and simulation types.
//!
//! World frame: x = west, y = up, z = south (meters). Compass heading 0
//! faces north (-z) and increases clockwise, so heading π/2 faces east (-x).
//! Ship-local frames use x = starboard, y = up, z = nose.

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// World-space point or vector (meters, or m/s for velocities).
pub type Point = DVec3;

/// Stable ship identifier. Assigned once at spawn, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ShipId(pub u32);

/// Region identifier within the star system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RegionId(pub u32);

/// Shot identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ShotId(pub u32);

/// Orthonormal ship orientation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Basis {
    /// Starboard direction; the ship's beam line.
    pub right: DVec3,
    pub up: DVec3,
    /// Nose direction.
    pub forward: DVec3,
}

impl Default for Basis {
    fn default() -> Self {
        Self::from_heading(0.0, 0.0)
    }
}

impl Basis {
    /// Wings-level frame with the nose on `heading`, pitched up by `pitch`.
    pub fn from_heading(heading: f64, pitch: f64) -> Self {
        let forward = DVec3::new(
            -heading.sin() * pitch.cos(),
            pitch.sin(),
            -heading.cos() * pitch.cos(),
        );
        let right = DVec3::new(-heading.cos(), 0.0, heading.sin());
        let up = forward.cross(right);
        Self { right, up, forward }
    }

    /// Express a world vector in ship-local coordinates.
    pub fn to_local(&self, v: DVec3) -> DVec3 {
        DVec3::new(v.dot(self.right), v.dot(self.up), v.dot(self.forward))
    }

    /// Express a ship-local vector in world coordinates.
    pub fn to_world(&self, v: DVec3) -> DVec3 {
        self.right * v.x + self.up * v.y + self.forward * v.z
    }

    /// Compass heading of the nose in [0, 2π).
    pub fn heading(&self) -> f64 {
        compass_heading(self.forward)
    }

    /// Nose elevation above the horizon.
    pub fn pitch(&self) -> f64 {
        self.forward.y.clamp(-1.0, 1.0).asin()
    }

    /// Rotate about the local axes. Positive yaw turns to starboard,
    /// positive pitch raises the nose, positive roll drops the starboard wing.
    pub fn turn(&mut self, yaw: f64, pitch: f64, roll: f64) {
        let (s, c) = yaw.sin_cos();
        let forward = self.forward * c + self.right * s;
        let right = self.right * c - self.forward * s;
        self.forward = forward;
        self.right = right;

        let (s, c) = pitch.sin_cos();
        let forward = self.forward * c + self.up * s;
        let up = self.up * c - self.forward * s;
        self.forward = forward;
        self.up = up;

        let (s, c) = roll.sin_cos();
        let right = self.right * c - self.up * s;
        let up = self.up * c + self.right * s;
        self.right = right;
        self.up = up;

        self.orthonormalize();
    }

    fn orthonormalize(&mut self) {
        self.forward = self.forward.normalize_or_zero();
        self.right = self.up.cross(self.forward).normalize_or_zero();
        self.up = self.forward.cross(self.right);
    }
}

/// Compass heading of a world-space direction in [0, 2π).
pub fn compass_heading(v: DVec3) -> f64 {
    wrap_angle(v.x.atan2(v.z) + std::f64::consts::PI)
}

/// Wrap an angle into [0, 2π).
pub fn wrap_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(std::f64::consts::TAU);
    // rem_euclid can round up to exactly 2π for tiny negative inputs
    if wrapped >= std::f64::consts::TAU {
        0.0
    } else {
        wrapped
    }
}

/// Simulation time tracking.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SimTime {
    /// Current tick number (increments by 1 each tick).
    pub tick: u64,
    /// Elapsed simulation time in seconds.
    pub elapsed_secs: f64,
}

impl SimTime {
    /// Seconds per tick at the default tick rate.
    pub fn dt(&self) -> f64 {
        crate::constants::DT
    }

    /// Advance by one tick.
    pub fn advance(&mut self) {
        self.tick += 1;
        self.elapsed_secs += self.dt();
    }
}
