//! Combat engine: the deterministic driver for the skirmish core.
//!
//! `CombatEngine` owns the hecs world, processes external commands and runs
//! every system once per tick in a fixed order. It is headless and carries
//! no rendering or I/O, so whole engagements can be replayed in tests.

use std::collections::VecDeque;

use hecs::{Entity, World};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, warn};

use skirmish_ai::Pilot;
use skirmish_core::commands::SimCommand;
use skirmish_core::components::Ship;
use skirmish_core::config::{validate_ship, CombatTuning};
use skirmish_core::enums::AiKind;
use skirmish_core::events::CombatEvent;
use skirmish_core::roster::StarSystem;
use skirmish_core::types::{ShipId, SimTime};
use skirmish_core::{Result, SkirmishError};

use crate::damage::DamageContext;
use crate::systems;
use crate::world_setup;

/// Configuration for starting a new engagement.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// RNG seed for determinism. Same seed = same event log.
    pub seed: u64,
    /// Initial time scale (1.0 = normal).
    pub time_scale: f64,
    pub tuning: CombatTuning,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            time_scale: 1.0,
            tuning: CombatTuning::default(),
        }
    }
}

/// The combat engine. Owns the ECS world and all sim state.
pub struct CombatEngine {
    world: World,
    time: SimTime,
    paused: bool,
    time_scale: f64,
    tuning: CombatTuning,
    rng: ChaCha8Rng,
    star_system: StarSystem,
    next_ship_id: u32,
    next_shot_id: u32,
    command_queue: VecDeque<SimCommand>,
    fire_requests: Vec<(ShipId, usize)>,
    despawn_buffer: Vec<Entity>,
    events: Vec<CombatEvent>,
}

impl CombatEngine {
    /// Create an empty engine with the given config.
    pub fn new(config: SimConfig) -> Self {
        Self {
            world: World::new(),
            time: SimTime::default(),
            paused: false,
            time_scale: config.time_scale.clamp(0.0, 4.0),
            tuning: config.tuning,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            star_system: StarSystem::default(),
            next_ship_id: 1,
            next_shot_id: 0,
            command_queue: VecDeque::new(),
            fire_requests: Vec::new(),
            despawn_buffer: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Create an engine over the given region layout.
    pub fn new_with_system(config: SimConfig, star_system: StarSystem) -> Self {
        let mut engine = Self::new(config);
        engine.star_system = star_system;
        engine
    }

    pub fn set_star_system(&mut self, star_system: StarSystem) {
        self.star_system = star_system;
    }

    /// Populate the demo star system and engagement.
    pub fn setup_demo(&mut self) {
        self.star_system = world_setup::demo_star_system();
        for ship in world_setup::demo_engagement() {
            self.spawn_ship(ship);
        }
    }

    /// Spawn a ship flown by the AI its hull calls for. Static hulls get no
    /// pilot. The ship's id is assigned here and returned.
    pub fn spawn_ship(&mut self, ship: Ship) -> ShipId {
        let kind = (!ship.is_static()).then(|| Pilot::kind_for(&ship));
        self.spawn_ship_as(ship, kind)
    }

    /// Spawn a ship with an explicit pilot variant, or none.
    pub fn spawn_ship_as(&mut self, mut ship: Ship, kind: Option<AiKind>) -> ShipId {
        let id = ShipId(self.next_ship_id);
        self.next_ship_id += 1;
        ship.id = id;
        wire_power(&mut ship);
        systems::weapons::slew(&mut ship, None);

        let Some(kind) = kind else {
            self.world.spawn((ship,));
            return id;
        };

        let pilot = match validate_ship(&ship) {
            Ok(()) => Pilot::new(kind, &ship, self.time.elapsed_secs, self.rng.gen()),
            Err(err) => {
                warn!(ship = id.0, error = %err, "invalid design, pilot idles");
                self.events.push(CombatEvent::PilotIdle { ship: id });
                Pilot::idle(kind, id)
            }
        };
        self.world.spawn((ship, pilot));
        id
    }

    /// Queue a command for processing at the next tick boundary.
    pub fn queue_command(&mut self, command: SimCommand) {
        self.command_queue.push_back(command);
    }

    /// Queue multiple commands.
    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = SimCommand>) {
        self.command_queue.extend(commands);
    }

    /// Advance by one tick and drain the events it produced.
    pub fn tick(&mut self) -> Vec<CombatEvent> {
        self.process_commands();

        if !self.paused {
            self.run_systems();
            self.time.advance();
        }

        std::mem::take(&mut self.events)
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Pacing hint for an interactive driver; ticks are always `DT` long.
    pub fn time_scale(&self) -> f64 {
        self.time_scale
    }

    pub fn tuning(&self) -> &CombatTuning {
        &self.tuning
    }

    pub fn star_system(&self) -> &StarSystem {
        &self.star_system
    }

    /// Get a read-only reference to the ECS world.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Copy of a live ship's current state.
    pub fn ship(&self, id: ShipId) -> Option<Ship> {
        let entity = self.find_ship(id)?;
        self.world.get::<&Ship>(entity).ok().map(|s| (*s).clone())
    }

    /// Mutate a ship in place, e.g. to script damage in tests.
    pub fn with_ship_mut<R>(&mut self, id: ShipId, f: impl FnOnce(&mut Ship) -> R) -> Result<R> {
        let entity = self.find_ship(id).ok_or(SkirmishError::ShipNotFound(id))?;
        let mut ship = self
            .world
            .get::<&mut Ship>(entity)
            .map_err(|_| SkirmishError::ShipNotFound(id))?;
        Ok(f(&mut *ship))
    }

    /// Copy of a ship's pilot, if it has one.
    pub fn pilot(&self, id: ShipId) -> Option<Pilot> {
        let entity = self.find_ship(id)?;
        self.world.get::<&Pilot>(entity).ok().map(|p| (*p).clone())
    }

    /// Number of shots in flight.
    pub fn shot_count(&self) -> usize {
        self.world.query::<&crate::shot::Shot>().iter().count()
    }

    fn find_ship(&self, id: ShipId) -> Option<Entity> {
        self.world
            .query::<&Ship>()
            .iter()
            .find(|(_, s)| s.id == id)
            .map(|(e, _)| e)
    }

    /// Process all queued commands.
    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            if let Err(err) = self.handle_command(command) {
                warn!(error = %err, "command rejected");
            }
        }
    }

    /// Apply one command immediately.
    pub fn handle_command(&mut self, command: SimCommand) -> Result<()> {
        match command {
            SimCommand::IssueOrder { ship, order } => {
                self.with_ship_mut(ship, |s| s.orders = Some(order))?;
            }
            SimCommand::ClearOrders { ship } => {
                self.with_ship_mut(ship, |s| s.orders = None)?;
            }
            SimCommand::SetNavpoints { ship, navpoints } => {
                self.with_ship_mut(ship, |s| s.navpoints = navpoints)?;
            }
            SimCommand::SetWard { ship, ward } => {
                self.with_ship_mut(ship, |s| s.ward = ward)?;
            }
            SimCommand::Disengage { ship } => {
                self.with_pilot_mut(ship, Pilot::disengage)?;
            }
            SimCommand::Engage { ship } => {
                self.with_pilot_mut(ship, Pilot::engage)?;
            }
            SimCommand::SetAutoRepair { ship, enabled } => {
                self.with_ship_mut(ship, |s| s.auto_repair = enabled)?;
            }
            SimCommand::IncreaseRepairPriority { ship, system } => {
                let moved = self.with_ship_mut(ship, |s| crate::repair::increase_repair_priority(s, system))?;
                debug!(ship = ship.0, system, moved, "repair priority raised");
            }
            SimCommand::DecreaseRepairPriority { ship, system } => {
                let moved = self.with_ship_mut(ship, |s| crate::repair::decrease_repair_priority(s, system))?;
                debug!(ship = ship.0, system, moved, "repair priority lowered");
            }
            SimCommand::Pause => self.paused = true,
            SimCommand::Resume => self.paused = false,
            SimCommand::SetTimeScale { scale } => {
                self.time_scale = scale.clamp(0.0, 4.0);
            }
        }
        Ok(())
    }

    fn with_pilot_mut(&mut self, id: ShipId, f: impl FnOnce(&mut Pilot)) -> Result<()> {
        let entity = self.find_ship(id).ok_or(SkirmishError::ShipNotFound(id))?;
        // a pilotless hull has nothing to engage
        if let Ok(mut pilot) = self.world.get::<&mut Pilot>(entity) {
            f(&mut *pilot);
        }
        Ok(())
    }

    /// Run all systems in order.
    fn run_systems(&mut self) {
        let now = self.time.elapsed_secs;
        let dt = self.time.dt();

        // 1. Sensors
        systems::sensors::run(&mut self.world, now);

        // 2. Roster snapshot and pilots
        let roster = systems::ai::snapshot(&self.world, &self.star_system);
        let outputs = systems::ai::run(&mut self.world, &roster, &self.tuning, now, dt);

        // 3. Actuators
        self.fire_requests.clear();
        systems::actuators::run(
            &mut self.world,
            outputs,
            &self.star_system,
            &mut self.fire_requests,
            &mut self.events,
        );

        // 4. Movement and region transit
        systems::movement::run(&mut self.world, dt, &mut self.events);

        // 5. Collisions
        let mut ctx = DamageContext {
            tuning: &self.tuning,
            rng: &mut self.rng,
            events: &mut self.events,
            paused: self.paused,
        };
        systems::collisions::run(&mut self.world, &mut ctx);

        // 6. Weapons, against post-movement positions
        let roster = systems::ai::snapshot(&self.world, &self.star_system);
        systems::weapons::run(
            &mut self.world,
            &roster,
            &self.fire_requests,
            &mut self.next_shot_id,
            dt,
            &mut self.events,
        );

        // 7. Impacts
        let mut ctx = DamageContext {
            tuning: &self.tuning,
            rng: &mut self.rng,
            events: &mut self.events,
            paused: self.paused,
        };
        systems::impacts::run(&mut self.world, dt, &mut ctx);

        // 8. Damage control
        systems::maintenance::run(&mut self.world, now, dt, &self.tuning, &mut self.events);

        // 9. Cleanup
        systems::cleanup::run(&mut self.world, &mut self.despawn_buffer);
    }
}

/// Point every powered system at the reactor that lists it as a client.
fn wire_power(ship: &mut Ship) {
    let Ship {
        reactors, systems, ..
    } = ship;
    for (r, reactor) in reactors.iter().enumerate() {
        for &c in &reactor.clients {
            if let Some(sys) = systems.get_mut(c) {
                sys.source = Some(r);
                sys.home_source.get_or_insert(r);
            }
        }
    }
}
