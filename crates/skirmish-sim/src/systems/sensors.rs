//! Sensor sweep: rebuild each ship's contact list.
//!
//! A ship sees every live ship in its own region within its design's sensor
//! range. Contacts keep their original acquisition time while they stay in
//! view.

use hecs::World;

use skirmish_core::components::{Contact, Ship};
use skirmish_core::types::{Point, RegionId, ShipId};

pub fn run(world: &mut World, now: f64) {
    let visible: Vec<(ShipId, RegionId, Point)> = world
        .query::<&Ship>()
        .iter()
        .filter(|(_, s)| s.is_alive() && !s.in_transition)
        .map(|(_, s)| (s.id, s.region, s.location))
        .collect();

    for (_entity, ship) in world.query_mut::<&mut Ship>() {
        let range = ship.design.sensor_range;
        let contacts = visible
            .iter()
            .filter(|(id, region, loc)| {
                *id != ship.id && *region == ship.region && loc.distance(ship.location) <= range
            })
            .map(|&(id, _, _)| Contact {
                ship: id,
                acquired_at: ship
                    .contacts
                    .iter()
                    .find(|c| c.ship == id)
                    .map_or(now, |c| c.acquired_at),
            })
            .collect();
        ship.contacts = contacts;
    }
}
