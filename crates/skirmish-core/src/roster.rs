//! Read-only world registry handed to AIs each tick.
//!
//! The roster is a snapshot: AIs resolve `ShipId`s through it and never hold
//! onto the ships themselves. A ship that was destroyed or despawned is simply
//! absent, so every lookup degrades to `None`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::components::{Farcaster, Ship};
use crate::enums::RegionKind;
use crate::types::{Point, RegionId, ShipId};

/// A simulation region: an orbital volume or a planetary airspace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Region {
    pub id: RegionId,
    pub name: String,
    pub kind: RegionKind,
    /// Region origin in star-system coordinates.
    pub location: Point,
    /// Orbital primary (planet) this region belongs to.
    pub primary: u32,
}

/// Region layout of the star system.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StarSystem {
    pub regions: Vec<Region>,
}

impl StarSystem {
    pub fn region(&self, id: RegionId) -> Option<&Region> {
        self.regions.iter().find(|r| r.id == id)
    }

    pub fn is_airspace(&self, id: RegionId) -> bool {
        self.region(id)
            .is_some_and(|r| r.kind == RegionKind::AirSpace)
    }

    pub fn is_orbital(&self, id: RegionId) -> bool {
        self.region(id)
            .is_some_and(|r| r.kind == RegionKind::Orbital)
    }

    /// Both regions orbit the same primary.
    pub fn share_primary(&self, a: RegionId, b: RegionId) -> bool {
        match (self.region(a), self.region(b)) {
            (Some(ra), Some(rb)) => ra.primary == rb.primary,
            _ => false,
        }
    }

    /// Vector from one region's origin to another's.
    pub fn offset(&self, from: RegionId, to: RegionId) -> Option<Point> {
        Some(self.region(to)?.location - self.region(from)?.location)
    }

    /// Orbital region a region belongs to: itself when orbital, otherwise the
    /// orbital region around the same primary.
    pub fn orbital_of(&self, id: RegionId) -> Option<&Region> {
        let region = self.region(id)?;
        if region.kind == RegionKind::Orbital {
            return Some(region);
        }
        self.regions
            .iter()
            .find(|r| r.kind == RegionKind::Orbital && r.primary == region.primary)
    }

    /// Airspace region closest to `from`.
    pub fn nearest_terrain(&self, from: RegionId) -> Option<&Region> {
        let origin = self.region(from)?.location;
        self.regions
            .iter()
            .filter(|r| r.kind == RegionKind::AirSpace)
            .min_by(|a, b| {
                let da = a.location.distance(origin);
                let db = b.location.distance(origin);
                da.total_cmp(&db)
            })
    }

    /// Orbital region closest to `from`.
    pub fn nearest_space(&self, from: RegionId) -> Option<&Region> {
        let origin = self.region(from)?.location;
        self.regions
            .iter()
            .filter(|r| r.kind == RegionKind::Orbital)
            .min_by(|a, b| {
                let da = a.location.distance(origin);
                let db = b.location.distance(origin);
                da.total_cmp(&db)
            })
    }
}

/// Snapshot of every live ship, ordered by id for deterministic iteration.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    ships: BTreeMap<ShipId, Ship>,
    pub star_system: StarSystem,
}

impl Roster {
    pub fn new(star_system: StarSystem) -> Self {
        Self {
            ships: BTreeMap::new(),
            star_system,
        }
    }

    pub fn insert(&mut self, ship: Ship) {
        self.ships.insert(ship.id, ship);
    }

    pub fn get(&self, id: ShipId) -> Option<&Ship> {
        self.ships.get(&id)
    }

    /// Resolve an optional reference, treating dead ships as gone.
    pub fn live(&self, id: Option<ShipId>) -> Option<&Ship> {
        id.and_then(|id| self.get(id)).filter(|s| s.is_alive())
    }

    pub fn ships(&self) -> impl Iterator<Item = &Ship> {
        self.ships.values()
    }

    pub fn in_region(&self, region: RegionId) -> impl Iterator<Item = &Ship> {
        self.ships.values().filter(move |s| s.region == region)
    }

    pub fn len(&self) -> usize {
        self.ships.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ships.is_empty()
    }

    /// Farcaster gate and its carrying ship.
    pub fn farcaster(&self, id: ShipId) -> Option<(&Ship, &Farcaster)> {
        let ship = self.get(id)?;
        ship.farcaster.as_ref().map(|f| (ship, f))
    }

    /// World-space start, end and approach points of a farcaster.
    pub fn farcaster_points(&self, id: ShipId) -> Option<FarcasterPoints> {
        let (ship, gate) = self.farcaster(id)?;
        Some(FarcasterPoints {
            start: ship.location + gate.start,
            end: ship.location + gate.end,
            approach: ship.location + gate.approach,
        })
    }

    /// Farcaster in `from` whose paired gate sits in `to`.
    pub fn find_farcaster(&self, from: RegionId, to: RegionId) -> Option<ShipId> {
        self.in_region(from)
            .filter_map(|s| s.farcaster.as_ref().map(|f| (s.id, f)))
            .find(|(_, gate)| {
                gate.dest
                    .and_then(|d| self.get(d))
                    .is_some_and(|dest| dest.region == to)
            })
            .map(|(id, _)| id)
    }
}

/// Resolved farcaster geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FarcasterPoints {
    pub start: Point,
    pub end: Point,
    pub approach: Point,
}
