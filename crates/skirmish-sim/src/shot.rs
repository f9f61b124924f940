//! Shot resolution: which part of a ship a shot's travel ray struck.
//!
//! A shot is tested along the segment it covered this tick, from `origin`
//! to `location`. Shields are tested first, then the hull's collision
//! volumes, then (for capital hulls) every turret. The closest impact is
//! canonical.

use serde::{Deserialize, Serialize};

use skirmish_core::components::Ship;
use skirmish_core::constants::*;
use skirmish_core::enums::{DamageType, HitMask};
use skirmish_core::types::{Point, RegionId, ShipId, ShotId};

/// A bolt, beam or missile in flight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shot {
    pub id: ShotId,
    pub owner: ShipId,
    pub target: Option<ShipId>,
    pub region: RegionId,
    /// Position at the start of this tick's travel.
    pub origin: Point,
    pub location: Point,
    pub velocity: Point,
    pub damage: f64,
    pub damage_type: DamageType,
    pub penetration: f64,
    /// Blast radius for missiles.
    pub lethal_radius: f64,
    pub beam: bool,
    pub missile: bool,
    /// Seconds left before the shot is spent.
    pub life: f64,
    /// Missile has passed its closest approach to the target.
    pub overshot: bool,
    /// Range to the target on the previous tick.
    pub last_range: f64,
    pub spent: bool,
}

/// Outcome of testing a shot against one ship.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Impact {
    pub hit: HitMask,
    /// First point struck: the shield bubble, a turret, or the hull.
    pub point: Point,
    /// Point on the hull or turret, used to find damaged subsystems.
    pub hull_point: Point,
    /// Turret struck, as (group, weapon).
    pub turret: Option<(usize, usize)>,
    /// Beam end trimmed back to the closest impact.
    pub beam_end: Option<Point>,
}

impl Impact {
    pub fn miss(at: Point) -> Self {
        Self {
            hit: HitMask::NOTHING,
            point: at,
            hull_point: at,
            turret: None,
            beam_end: None,
        }
    }
}

/// Cheap ray-sphere test.
///
/// Hits when the sphere center is within `radius` of the infinite line and
/// either the ray's leading edge is inside the sphere, or the point of
/// closest approach lies between the ray's endpoints.
pub fn ray_sphere(center: Point, radius: f64, q: Point, w: Point, len: f64) -> bool {
    let d0 = center - q;
    if d0.cross(w).length() > radius {
        return false;
    }

    let closest = q + w * d0.dot(w);
    let leading_edge = q + w * len;

    if leading_edge.distance(center) > radius {
        let to_closest = closest - q;
        if to_closest.dot(w * len) < 0.0 || to_closest.length() > len {
            return false;
        }
    }
    true
}

/// Point where a ray of length `len` enters a sphere, or the ray origin when
/// it starts inside.
pub fn sphere_entry(center: Point, radius: f64, q: Point, w: Point, len: f64) -> Option<Point> {
    let d0 = center - q;
    let along = d0.dot(w);
    let perp_sq = d0.length_squared() - along * along;
    let r_sq = radius * radius;
    if perp_sq > r_sq {
        return None;
    }
    let half_chord = (r_sq - perp_sq).max(0.0).sqrt();
    let enter = along - half_chord;
    let exit = along + half_chord;

    if exit < 0.0 || enter > len {
        None
    } else {
        Some(q + w * enter.max(0.0))
    }
}

/// Shortest distance from `p` to the segment `a..b`.
pub fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= 0.0 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// Test a shot's travel ray against a ship's shield, hull and turrets.
pub fn check_shot_intersection(ship: &Ship, shot: &Shot) -> Impact {
    let mut impact = Impact::miss(shot.location);

    let travel = shot.location - shot.origin;
    let raw_len = travel.length();
    if !(raw_len > 0.0) {
        return impact;
    }
    let q = shot.origin;
    let w = travel / raw_len;
    let len = raw_len.max(MIN_SHOT_LEN);
    let mut blow_len = raw_len;

    // unskilled small-craft pilots get the cheap sphere test
    let easy = !ship.is_starship() && !ship.is_static() && ship.ai_level < 2;

    let mut closest = None;
    let mut d0 = f64::INFINITY;
    let mut ds = f64::INFINITY;

    if let Some(shield) = ship.shield.as_ref() {
        if shield.strength() > SHIELD_HIT_MIN_STRENGTH {
            if let Some(p) = sphere_entry(ship.location, shield.radius, q, w, len) {
                impact.hit = HitMask::SHIELD;
                impact.point = p;
                closest = Some(p);
                d0 = p.distance(q);
                ds = d0;
                if !shot.beam {
                    blow_len = shield.radius * 2.0;
                }
            }
        }
    }

    let volumes = ship.design.hull_volumes(ship.detail_level);
    let hull_hit = volumes.iter().find_map(|vol| {
        let center = ship.local_to_world(vol.center);
        if easy {
            ray_sphere(center, vol.radius, q, w, len)
                .then(|| q + w * (center - q).dot(w).clamp(0.0, len))
        } else {
            sphere_entry(center, vol.radius, q, w, blow_len)
        }
    });

    if let Some(hull_point) = hull_hit {
        impact.hit |= HitMask::HULL;
        impact.hull_point = hull_point;
        if !impact.hit.contains(HitMask::SHIELD) {
            impact.point = hull_point;
        }
        let d1 = hull_point.distance(q);
        if d1 < d0 {
            closest = Some(hull_point);
            d0 = d1;
        }
    }

    if ship.is_starship() || ship.is_static() {
        for (g, group) in ship.weapons.iter().enumerate() {
            for (i, weapon) in group.weapons.iter().enumerate() {
                let Some(pivot) = weapon.turret else {
                    continue;
                };
                if weapon.turret_radius <= 0.0 {
                    continue;
                }
                let tloc = ship.local_to_world(pivot);
                if !ray_sphere(tloc, weapon.turret_radius, q, w, len) {
                    continue;
                }
                let d1 = tloc.distance(q);
                if d1 < d0 {
                    impact.hit |= HitMask::TURRET;
                    impact.turret = Some((g, i));
                    impact.hull_point = tloc;
                    closest = Some(tloc);
                    d0 = d1;
                    if d1 < ds {
                        impact.point = tloc;
                    }
                }
            }
        }
    }

    if shot.beam && impact.hit.is_hit() {
        impact.beam_end = closest;
    }
    impact
}
