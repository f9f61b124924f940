//! Tactical assessment: rules of engagement, target, threat and support.
//!
//! Runs on a fixed period rather than every tick. Each evaluation reads the
//! ship's radio orders and flight plan, settles the ROE, picks a target,
//! and records the nearest threat and the best available support. Missing
//! contacts or targets are normal and simply leave the fields empty.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use skirmish_core::components::Ship;
use skirmish_core::constants::*;
use skirmish_core::enums::{Formation, NavAction, OrderAction, Roe, ShipClass};
use skirmish_core::types::{Point, ShipId};

use crate::command::{ActuatorCommand, AiOutput};
use crate::pilot::NavState;
use crate::step::AiWorld;

/// Mid-level tactical state of one pilot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TacticalAi {
    pub roe: Roe,
    /// Mission time of the next evaluation.
    pub next_exec: f64,
    /// Last radio order acted on.
    pub action: OrderAction,
    /// Target we were explicitly ordered to attack.
    pub directed_target: Option<ShipId>,
    pub threat_level: f64,
    pub support_level: f64,
    /// Countdown to the next forced target refresh (starships).
    pub refresh_time: f64,
}

impl TacticalAi {
    pub fn new(ship: &Ship, now: f64, rng: &mut ChaCha8Rng) -> Self {
        let stagger = f64::from(ship.id.0 % 10) * TACTICAL_PERIOD_SECS / 10.0;
        let refresh_time = if ship.is_starship() && ship.ai_level == 0 {
            rng.gen_range(STARSHIP_TARGET_REFRESH_SECS..2.0 * STARSHIP_TARGET_REFRESH_SECS)
        } else {
            1.0e9
        };
        Self {
            roe: Roe::Flexible,
            next_exec: now + stagger,
            action: OrderAction::None,
            directed_target: None,
            threat_level: 0.0,
            support_level: 1.0,
            refresh_time,
        }
    }
}

/// Advance the tactical loop by one tick.
pub fn exec_frame(
    tac: &mut TacticalAi,
    nav: &mut NavState,
    rng: &mut ChaCha8Rng,
    ship: &Ship,
    world: &AiWorld,
    dt: f64,
    out: &mut AiOutput,
) {
    if world.now >= tac.next_exec {
        let mut t = Tactics {
            tac: &mut *tac,
            nav: &mut *nav,
            rng: &mut *rng,
            ship,
            world,
            out: &mut *out,
        };
        t.evaluate();
        tac.next_exec += world.tuning.tactical_period;
        if tac.next_exec < world.now {
            tac.next_exec = world.now + world.tuning.tactical_period;
        }
    }

    if ship.is_starship() {
        tac.refresh_time -= dt;
        if tac.refresh_time <= 0.0 {
            tac.refresh_time = STARSHIP_TARGET_REFRESH_SECS;
            drop_target(nav, STARSHIP_TARGET_REFRESH_SECS / 4.0);
        }
    }
}

fn drop_target(nav: &mut NavState, secs: f64) {
    nav.target = None;
    nav.subtarget = None;
    nav.drop_time = secs;
}

/// Targetable by us: not jumping, and hostile by team code or rogue.
pub fn can_target(ship: &Ship, tgt: &Ship) -> bool {
    !tgt.in_transition && (tgt.rogue || tgt.iff != ship.iff)
}

/// Formation slot offset in the lead's frame, scaled by hull size.
pub fn formation_delta(formation: Formation, element_index: u32, radius: f64) -> Point {
    let s = f64::from(element_index.saturating_sub(1));
    let mut delta = Point::new(10.0 * s, 0.0, 10.0 * s);
    match formation {
        Formation::Diamond => match element_index {
            2 => delta = Point::new(10.0, 0.0, -12.0),
            3 => delta = Point::new(-10.0, 0.0, -12.0),
            4 => delta = Point::new(0.0, 0.0, -24.0),
            _ => {}
        },
        Formation::Spread => match element_index {
            2 => delta = Point::new(15.0, 0.0, 0.0),
            3 => delta = Point::new(-15.0, 0.0, 0.0),
            4 => delta = Point::new(-30.0, 0.0, 0.0),
            _ => {}
        },
        Formation::Box => match element_index {
            2 => delta = Point::new(15.0, 0.0, 0.0),
            3 => delta = Point::new(0.0, -1.0, -15.0),
            4 => delta = Point::new(15.0, -1.0, -15.0),
            _ => {}
        },
        Formation::Trail => delta = Point::new(0.0, 0.0, -15.0 * s),
    }
    delta * radius * 2.0
}

struct Tactics<'a> {
    tac: &'a mut TacticalAi,
    nav: &'a mut NavState,
    rng: &'a mut ChaCha8Rng,
    ship: &'a Ship,
    world: &'a AiWorld<'a>,
    out: &'a mut AiOutput,
}

impl Tactics<'_> {
    fn evaluate(&mut self) {
        let roe_before = self.tac.roe;

        self.check_orders();
        self.select_target();
        if self.ship.is_starship() {
            self.find_threat_levels();
        } else {
            self.find_threat();
        }
        self.find_support();

        if self.ship.element.index > 1 {
            self.nav.formation_delta = formation_delta(
                self.ship.element.formation,
                self.ship.element.index,
                self.ship.radius(),
            );
        }

        if self.tac.roe != roe_before {
            debug!(ship = self.ship.id.0, roe = ?self.tac.roe, "rules of engagement changed");
        }
    }

    // --- Orders ---

    fn check_orders(&mut self) {
        self.tac.directed_target = None;
        if self.process_orders() {
            return;
        }
        self.check_flight_plan();
    }

    fn set_ward(&mut self, ward: Option<ShipId>) {
        if self.nav.ward != ward {
            self.nav.ward = ward;
            self.out.push(ActuatorCommand::SetWard { ward });
        }
    }

    /// Apply radio orders. Returns true when orders are in force.
    fn process_orders(&mut self) -> bool {
        self.nav.patrol = None;

        let Some(order) = self.ship.orders.as_ref().filter(|o| o.action != OrderAction::None)
        else {
            if self.tac.action != OrderAction::None {
                self.clear_radio_orders();
            }
            return false;
        };

        // orders take over from the flight plan unless they leave it alone
        self.nav.navpt = self.ship.next_navpoint();

        match order.action {
            OrderAction::Attack | OrderAction::Bracket | OrderAction::Identify => {
                let tgt = self.world.roster.live(order.target);
                if tgt.is_some_and(|t| can_target(self.ship, t)) {
                    self.tac.roe = Roe::Directed;
                    self.select_target_directed(order.target);
                    self.nav.bracket = order.action == OrderAction::Bracket;
                    self.nav.identify = order.action == OrderAction::Identify;
                    self.nav.navpt = None;
                } else {
                    self.clear_radio_orders();
                }
            }
            OrderAction::Escort | OrderAction::CoverMe => {
                if self.world.roster.live(order.target).is_some() {
                    self.tac.roe = Roe::Defensive;
                    self.set_ward(order.target);
                    self.nav.navpt = None;
                } else {
                    self.clear_radio_orders();
                }
            }
            OrderAction::WepFree => {
                self.tac.roe = Roe::Aggressive;
                drop_target(self.nav, ORDER_ACK_DROP_SECS);
            }
            OrderAction::WepHold | OrderAction::FormUp => {
                self.tac.roe = Roe::None;
                drop_target(self.nav, HOLD_ORDER_DROP_SECS);
            }
            OrderAction::MovePatrol => {
                self.tac.roe = Roe::SelfDefensive;
                self.nav.patrol = Some(order.location);
                self.nav.navpt = None;
                let (lo, hi) = PATROL_ORDER_DROP_SECS;
                let secs = self.rng.gen_range(lo..hi);
                drop_target(self.nav, secs);
            }
            OrderAction::Rtb | OrderAction::DockWith => {
                self.tac.roe = Roe::None;
                drop_target(self.nav, TRANSIT_ORDER_DROP_SECS);
                self.nav.navpt = None;
            }
            OrderAction::QuantumTo | OrderAction::FarcastTo => {
                self.tac.roe = Roe::None;
                drop_target(self.nav, TRANSIT_ORDER_DROP_SECS);
            }
            OrderAction::None => {}
        }

        self.tac.action = order.action;
        true
    }

    fn clear_radio_orders(&mut self) {
        self.tac.action = OrderAction::None;
        self.tac.roe = Roe::Flexible;
        drop_target(self.nav, ORDER_ACK_DROP_SECS);
        self.out.push(ActuatorCommand::ClearRadioOrders);
    }

    /// Derive the ROE from the active navpoint.
    fn check_flight_plan(&mut self) {
        self.tac.roe = Roe::Flexible;
        self.nav.navpt = self.ship.next_navpoint();
        let mut ward = None;

        if let Some(navpt) = self.nav.navpt.and_then(|i| self.ship.navpoints.get(i)) {
            self.tac.roe = match navpt.action {
                NavAction::Launch | NavAction::Dock | NavAction::Rtb => Roe::None,
                NavAction::Vector => Roe::SelfDefensive,
                NavAction::Defend | NavAction::Escort => Roe::Defensive,
                NavAction::Intercept | NavAction::Recon | NavAction::Strike | NavAction::Assault => {
                    Roe::Directed
                }
                NavAction::Patrol | NavAction::Sweep => Roe::Flexible,
            };
            if self.tac.roe == Roe::Defensive {
                ward = navpt.target;
            }
        } else {
            // no flight plan: an externally assigned ward still stands
            ward = self.ship.ward;
        }

        self.set_ward(ward);
    }

    // --- Target selection ---

    fn select_target(&mut self) {
        if !self.ship.is_armed() {
            self.tac.roe = Roe::None;
        }

        if self.tac.roe == Roe::None {
            if self.nav.target.is_some() {
                drop_target(self.nav, 0.0);
            }
            return;
        }

        let roster = self.world.roster;

        if let Some(ward) = roster.live(self.nav.ward) {
            if self.tac.roe != Roe::Aggressive {
                let d = ward.location.distance(self.ship.location);
                if self.nav.target.is_some() {
                    let safe_zone = if self.ship.is_starship() {
                        STARSHIP_WARD_SAFE_ZONE
                    } else {
                        WARD_SAFE_ZONE
                    };
                    if d > safe_zone {
                        drop_target(self.nav, 0.0);
                        return;
                    }
                } else if d > WARD_SAFE_ZONE {
                    return;
                }
            }
        }

        let mut target = self.nav.target;
        if target.is_some() {
            if roster.live(target).is_some() {
                self.check_target();
                // anti-air escorts stay ready to switch; everyone else keeps what they have
                if !self.ship.class().is_anti_air_escort() {
                    return;
                }
                target = self.nav.target;
            } else {
                drop_target(self.nav, 0.0);
                target = None;
            }
        }

        if self.nav.drop_time > 0.0 {
            return;
        }

        if self.tac.roe == Roe::Directed {
            let navpt_target = self
                .nav
                .navpt
                .and_then(|i| self.ship.navpoints.get(i))
                .and_then(|n| n.target);
            if target.is_some() {
                self.select_target_directed(target);
            } else if navpt_target.is_some() {
                self.select_target_directed(navpt_target);
            } else {
                self.select_target_directed(None);
            }
        } else {
            self.select_target_opportunity();

            if self.ship.class().is_anti_air_escort() {
                if let (Some(current), Some(potential)) = (target, self.nav.target) {
                    if current != potential {
                        self.nav.target = Some(current);
                    }
                }
            }
        }
    }

    fn select_target_directed(&mut self, tgt: Option<ShipId>) {
        let roster = self.world.roster;
        let mut potential = tgt;

        // fall back to the flight plan's objective if it is on the scope
        if potential.is_none() {
            let objective = self
                .ship
                .navpoints
                .iter()
                .filter(|n| n.is_open())
                .find_map(|n| n.target);
            potential = objective.filter(|o| self.ship.contacts.iter().any(|c| c.ship == *o));
        }

        let resolved = roster
            .live(potential)
            .filter(|t| can_target(self.ship, t))
            .map(|t| t.id);
        self.nav.target = resolved;

        self.tac.directed_target = match tgt {
            Some(t) if resolved == Some(t) => Some(t),
            _ => None,
        };
    }

    fn select_target_opportunity(&mut self) {
        if self.ship.iff == 0 {
            return;
        }

        let potential = if self.ship.class().is_anti_air_escort() {
            self.opportunity_anti_air()
        } else if self.ship.is_dropship() {
            self.opportunity_small_craft()
        } else {
            self.opportunity_capital()
        };

        self.nav.target = potential;
    }

    /// Corvettes and frigates: small craft and light hulls, preferring the
    /// ward's own target when escorting something bigger.
    fn opportunity_anti_air(&self) -> Option<ShipId> {
        let ship = self.ship;
        let roster = self.world.roster;
        let mut best: Option<&Ship> = None;
        let mut best_dist = ship.design.commit_range;

        if let Some(ward) = roster.live(self.nav.ward) {
            if ward.class() > ship.class() {
                if let Some(ward_target) = roster.live(ward.target) {
                    best_dist = ship.location.distance(ward_target.location);
                    best = Some(ward_target);
                }
            }
        }

        for (_, c) in self.world.contacts(ship) {
            if !ship.is_hostile_to(c) || c.in_transition {
                continue;
            }
            if !(c.iff > 0 || c.rogue) {
                continue;
            }
            let light = c.class() < ShipClass::Destroyer
                || (ShipClass::Mine..=ShipClass::Defsat).contains(&c.class());
            if !light {
                continue;
            }
            let dist = ship.location.distance(c.location);
            if dist < OPPORTUNITY_PREFERENCE * best_dist
                && best.map_or(true, |b| c.class() <= b.class())
            {
                best = Some(c);
                best_dist = dist;
            }
        }

        best.map(|b| b.id)
    }

    /// Small craft: anything up to their class limit, filtered by the ROE.
    fn opportunity_small_craft(&self) -> Option<ShipId> {
        let ship = self.ship;
        let roe = self.tac.roe;
        let mut best = None;
        let mut best_dist = match roe {
            Roe::Flexible | Roe::Aggressive => ship.design.commit_range,
            _ => 0.5 * ship.design.commit_range,
        };
        let class_limit = if ship.class() == ShipClass::Attack {
            ShipClass::Destroyer
        } else {
            ShipClass::Lca
        };
        let lead = ship.element.lead.filter(|_| ship.element.index > 1);
        let navpt = self.nav.navpt.and_then(|i| ship.navpoints.get(i));

        for (_, c) in self.world.contacts(ship) {
            if !ship.is_hostile_to(c) || c.in_transition || c.class() > class_limit {
                continue;
            }
            if !c.rogue && c.iff == 0 {
                continue;
            }
            if !c.rogue {
                if roe == Roe::SelfDefensive && c.target != Some(ship.id) {
                    continue;
                }
                if roe == Roe::Defensive && c.target != Some(ship.id) && c.target != lead {
                    continue;
                }
            }
            let dist = ship.location.distance(c.location);
            if dist < OPPORTUNITY_PREFERENCE * best_dist {
                if roe == Roe::Flexible {
                    if let Some(n) = navpt {
                        if n.location.distance(c.location) > PATROL_NAVPT_RANGE {
                            continue;
                        }
                    }
                }
                best = Some(c.id);
                best_dist = dist;
            }
        }

        best
    }

    /// Capital ships: starships and statics, preferring whoever is
    /// shooting at the ward.
    fn opportunity_capital(&self) -> Option<ShipId> {
        let ship = self.ship;
        let ward = self.world.roster.live(self.nav.ward);
        let mut best: Option<&Ship> = None;
        let mut best_dist = ship.design.commit_range;
        let mut ward_threats: Vec<&Ship> = Vec::new();

        for (_, c) in self.world.contacts(ship) {
            let target_ok = c.iff > 0 && c.iff != ship.iff && !c.in_transition;
            if !(c.rogue || target_ok) {
                continue;
            }
            if !(c.is_starship() || c.is_static()) {
                continue;
            }
            let dist = ship.location.distance(c.location);
            if dist < OPPORTUNITY_PREFERENCE * best_dist {
                best = Some(c);
                best_dist = dist;
            }
            if let Some(w) = ward {
                if c.target == Some(w.id) {
                    ward_threats.push(c);
                }
            }
        }

        if let (Some(pick), Some(w)) = (best, ward) {
            if !ward_threats.is_empty() && !ward_threats.iter().any(|t| t.id == pick.id) {
                best_dist *= WARD_THREAT_PREFERENCE;
                for t in ward_threats {
                    let dist = w.location.distance(t.location);
                    if dist < best_dist {
                        best = Some(t);
                        best_dist = dist;
                    }
                }
            }
        }

        best.map(|b| b.id)
    }

    /// Drop a target that left, switched sides, jumped, or can't be caught.
    fn check_target(&mut self) {
        let ship = self.ship;
        let Some(target) = self.world.roster.live(self.nav.target) else {
            return;
        };

        if target.region != ship.region
            || (target.iff == ship.iff && !target.rogue)
            || target.in_transition
        {
            drop_target(self.nav, 0.0);
            return;
        }

        if let Some(directed) = self.tac.directed_target {
            if directed != target.id {
                drop_target(self.nav, 0.0);
            }
            return;
        }

        // can we catch it?
        if target.design.vlimit <= ship.design.vlimit
            || ship.velocity.length() <= ship.design.vlimit
        {
            return;
        }

        let primary_range = ship
            .weapons
            .get(ship.primary_group)
            .map_or(0.0, |g| g.max_range());
        if primary_range <= 0.0 {
            return;
        }
        let drop_range = (PURSUIT_WEAPON_RANGE_FACTOR * primary_range)
            .min(OPPORTUNITY_PREFERENCE * ship.design.commit_range);

        let range = target.location.distance(ship.location);
        if range < drop_range {
            return;
        }

        let next = (target.location + target.velocity).distance(ship.location + ship.velocity);
        if next < range {
            return;
        }

        drop_target(self.nav, 0.0);
    }

    // --- Threat and support ---

    fn is_threat_candidate(&self, c: &Ship, acquired_at: f64, reaction: f64) -> bool {
        self.ship.is_hostile_to(c)
            && self.world.now - acquired_at > reaction
            && !c.in_transition
            && !matches!(c.class(), ShipClass::Freighter | ShipClass::Farcaster)
    }

    /// Nearest threat, or anyone targeting us (biggest first).
    fn pick_threat(&self, reaction: f64) -> Option<ShipId> {
        let ship = self.ship;
        let mut threat: Option<&Ship> = None;
        let mut threat_dist = f64::INFINITY;

        for (contact, c) in self.world.contacts(ship) {
            if !self.is_threat_candidate(c, contact.acquired_at, reaction) {
                continue;
            }
            let range = ship.location.distance(c.location);
            if c.target == Some(ship.id) {
                if threat_dist > 0.0 || threat.is_some_and(|t| c.class() > t.class()) {
                    threat = Some(c);
                    threat_dist = 0.0;
                }
            } else if range < threat_dist {
                threat = Some(c);
                threat_dist = range;
            }
        }

        threat.map(|t| t.id)
    }

    fn update_threat(&mut self, threat: Option<ShipId>) {
        // a threat that slipped off the scope becomes a rumor to investigate
        let roster = self.world.roster;
        if let Some(old) = self.nav.threat {
            let on_scope = self.ship.contacts.iter().any(|c| c.ship == old);
            if threat != Some(old) && !on_scope && roster.live(Some(old)).is_some() {
                self.nav.rumor = Some(old);
            }
        }
        if let Some(rumor) = self.nav.rumor {
            let on_scope = self.ship.contacts.iter().any(|c| c.ship == rumor);
            if on_scope || roster.live(Some(rumor)).is_none() {
                self.nav.rumor = None;
            }
        }
        self.nav.threat = threat;
    }

    fn find_threat(&mut self) {
        let threat = self.pick_threat(THREAT_ACQUIRE_DELAY_SECS);
        self.update_threat(threat);
    }

    /// Starship variant: also estimates threat and support levels.
    fn find_threat_levels(&mut self) {
        let ship = self.ship;
        let mut threat_level = 0.0;
        let mut support_level = ship.ai_value() / SUPPORT_RANGE_FLOOR;

        for (_, c) in self.world.contacts(ship) {
            let basis = ship.location.distance(c.location).max(SUPPORT_RANGE_FLOOR);
            let value = c.ai_value() / basis;
            if c.iff == ship.iff {
                support_level += value;
            } else if (ship.iff > 0 && c.iff > 0) || c.iff > 1 {
                threat_level += value;
            }
        }

        self.tac.threat_level = threat_level;
        self.tac.support_level = support_level;

        let reaction = STARSHIP_REACTION_SECS[usize::from(ship.ai_level.min(2))];
        let threat = self.pick_threat(reaction);
        self.update_threat(threat);
    }

    /// Biggest friendly at least our size, only while threatened.
    fn find_support(&mut self) {
        let threatened = if self.ship.is_starship() {
            self.tac.threat_level >= SUPPORT_THREAT_FLOOR
        } else {
            self.nav.threat.is_some()
        };
        if !threatened {
            self.nav.support = None;
            return;
        }

        let ship = self.ship;
        let mut support: Option<&Ship> = None;
        for (_, c) in self.world.contacts(ship) {
            if c.iff != ship.iff || c.class() < ship.class() || c.in_transition {
                continue;
            }
            if support.map_or(true, |s| c.class() > s.class()) {
                support = Some(c);
            }
        }
        self.nav.support = support.map(|s| s.id);
    }
}
