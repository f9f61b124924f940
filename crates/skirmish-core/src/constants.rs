//! Simulation constants and tuning parameters.
//!
//! Distances are meters, speeds m/s, times seconds, angles radians.
//! Availability and throttle values are percentages (0–100).

use std::f64::consts::PI;

/// Simulation tick rate (Hz).
pub const TICK_RATE: u32 = 30;

/// Seconds per tick.
pub const DT: f64 = 1.0 / TICK_RATE as f64;

// --- Cadences ---

/// Tactical re-evaluation period.
pub const TACTICAL_PERIOD_SECS: f64 = 1.0;

/// Minimum interval between subtarget re-selections.
pub const SUBTARGET_INTERVAL_SECS: f64 = 2.345;

/// Minimum interval between point-defense assessments of the target.
pub const POINT_DEFENSE_INTERVAL_SECS: f64 = 3.5;

/// Auto-repair and power-routing cadence.
pub const MAINT_INTERVAL_SECS: f64 = 5.0;

/// How often an evading ship picks a new jink direction.
pub const EVADE_INTERVAL_SECS: f64 = 1.25;

/// Minimum spacing between obstacle scans when no obstacle is tracked.
pub const AVOID_RECHECK_SECS: f64 = 0.5;

/// Mission time during which the pilot only performs takeoff.
pub const TAKEOFF_DURATION_SECS: f64 = 10.0;

/// Mission time before the pilot starts tactical evaluation.
pub const INITIAL_ASSESSMENT_SECS: f64 = 5.0;

/// Contacts younger than this are not considered threats.
pub const THREAT_ACQUIRE_DELAY_SECS: f64 = 1.0;

/// Target suppression after a weapons-hold or form-up order.
pub const HOLD_ORDER_DROP_SECS: f64 = 5.0;

/// Target suppression after breaking off a too-close target.
pub const TOO_CLOSE_DROP_SECS: f64 = 4.0;

// --- Navigation ---

/// Arrival radius for navpoints, patrol points, and farcaster endpoints.
pub const ARRIVAL_RADIUS: f64 = 1_000.0;

/// A launch navpoint is complete once the ship is this far away.
pub const LAUNCH_COMPLETE_RANGE: f64 = 25_000.0;

/// Within this range of a locked farcaster the navigator only seeks.
pub const FARCASTER_SEEK_RANGE: f64 = 25_000.0;

/// Beyond this range from a farcaster start point, head for the approach point.
pub const FARCASTER_APPROACH_RANGE: f64 = 50_000.0;

/// Ratio test deciding whether we are lined up on the farcaster approach.
pub const FARCASTER_APPROACH_RATIO: f64 = 1.2;

/// Threatened ships regroup when their support is farther than this.
pub const REGROUP_RANGE: f64 = 35_000.0;

/// Retreat objective distance multiplier (away from the threat).
pub const RETREAT_SCALE: f64 = 100.0;

/// Lead prediction requires at least this closing speed.
pub const LEAD_MIN_CLOSING_SPEED: f64 = 50.0;

/// Lead prediction horizon.
pub const LEAD_MAX_TIME_SECS: f64 = 15.0;

/// Bracketing attacks offset the objective beyond this range.
pub const BRACKET_RANGE: f64 = 25_000.0;

/// Lateral offset used when bracketing.
pub const BRACKET_OFFSET: f64 = 15_000.0;

/// Formation look-ahead on the lead's velocity.
pub const FORMATION_PREDICTION_SECS: f64 = 5.0;

/// Airborne formations below this AGL bias their slot upward.
pub const FORMATION_LOW_AGL: f64 = 3_000.0;

/// Upward slot bias for low airborne formations.
pub const FORMATION_ALTITUDE_BUMP: f64 = 500.0;

/// An escort within this range of a slow ward holds its heading.
pub const WARD_HOLD_RANGE: f64 = 30_000.0;

/// Below this speed a ward is considered stationary.
pub const WARD_STATIONARY_SPEED: f64 = 50.0;

/// Patrol seek applies full brakes inside this range.
pub const PATROL_BRAKE_RANGE: f64 = 2_000.0;

/// Takeoff objective distance ahead of the ship.
pub const TAKEOFF_RUN: f64 = 10_000.0;

/// Takeoff objective altitude gain.
pub const TAKEOFF_CLIMB: f64 = 2_000.0;

/// Airborne ships below this altitude climb away from terrain.
pub const TERRAIN_FLOOR_AGL: f64 = 1_000.0;

/// Climb target offset used by terrain avoidance.
pub const TERRAIN_CLIMB: f64 = 10_000.0;

/// Dropship climb-out offset inside an airspace region.
pub const DROPSHIP_CLIMB: f64 = 1_000.0;

/// Dropship orbital departure offset along -Z.
pub const DROPSHIP_ORBIT_OFFSET: f64 = 1.0e6;

// --- Collision avoidance ---

/// Avoid distance as a multiple of own radius.
pub const AVOID_DIST_FACTOR: f64 = 5.0;

/// Lower clamp on the avoid distance.
pub const AVOID_DIST_MIN: f64 = 1_000.0;

/// Upper clamp on the avoid distance.
pub const AVOID_DIST_MAX: f64 = 12_000.0;

/// Closest-approach look-ahead.
pub const AVOID_TIME_SECS: f64 = 15.0;

/// Starship look-ahead multiplier.
pub const STARSHIP_AVOID_TIME_SCALE: f64 = 1.5;

/// Obstacles farther than this are ignored outright.
pub const AVOID_IGNORE_RANGE: f64 = 25_000.0;

/// Brake applied while steering around an obstacle.
pub const AVOID_BRAKE: f64 = 0.5;

/// Brake applied while fleeing an obstacle already inside the avoid distance.
pub const CLOSE_FLEE_BRAKE: f64 = 0.3;

// --- Steering and helm ---

/// Fighter seek gain on az/el error.
pub const SEEK_GAIN: f64 = 20.0;

/// Fighter seek damping on the az/el memory.
pub const SEEK_DAMP: f64 = 0.5;

/// Starship helm pitch limit.
pub const STARSHIP_PITCH_LIMIT: f64 = 60.0 * PI / 180.0;

/// Navigation-autopilot helm pitch limit.
pub const NAV_PITCH_LIMIT: f64 = 45.0 * PI / 180.0;

/// Tolerance when detecting saturated flee steering.
pub const FLEE_TOLERANCE: f64 = 1.0e-3;

/// Small craft evade threats inside this range.
pub const EVADE_RANGE: f64 = 20_000.0;

/// Gun basket half-width as a multiple of the target's angular size.
pub const GUN_BASKET_FACTOR: f64 = 2.0;

/// Small craft hold fire inside this multiple of their own radius.
pub const GUN_MIN_RANGE_RADII: f64 = 4.0;

// --- Throttle ---

/// Default starship cruise speed toward a navpoint with no speed set.
pub const STARSHIP_NAVPT_SPEED: f64 = 300.0;

/// Default autopilot speed toward a navpoint with no speed set.
pub const NAV_NAVPT_SPEED: f64 = 250.0;

/// Starships slow down inside this range of their target.
pub const ATTACK_SLOW_RANGE: f64 = 50_000.0;

/// Closing speed above which an attacking starship slows down.
pub const ATTACK_CLOSING_LIMIT: f64 = 300.0;

/// Airborne fighters below this speed go to full throttle.
pub const STALL_SPEED: f64 = 250.0;

/// Airborne fighters below this speed light the afterburner.
pub const AFTERBURNER_SPEED: f64 = 200.0;

/// Throttle floor for airborne fighters above stall speed.
pub const AIRBORNE_MIN_THROTTLE: f64 = 20.0;

/// Wingman throttle gain on lead speed error (per second).
pub const WINGMAN_THROTTLE_GAIN: f64 = 1.0e-2;

/// Gain used instead when the wingman is slower than its lead.
pub const WINGMAN_CATCH_UP_GAIN: f64 = 1.0e-5;

/// Formation zone half-depth, in multiples of the wingman's radius.
pub const WINGMAN_ZONE_RADII: f64 = 3.0;

/// A wingman this far behind its slot may light the afterburner.
pub const WINGMAN_BURN_RANGE: f64 = 10_000.0;

/// Slow orbit for airborne fighters keeping station.
pub const STATION_KEEPING_THROTTLE: f64 = 30.0;

/// Slow orbit for airborne fighters holding at a navpoint.
pub const NAV_HOLD_THROTTLE: f64 = 25.0;

/// Element leads with nothing to do cruise at this throttle.
pub const LEAD_CRUISE_THROTTLE: f64 = 35.0;

/// Fighter speed heading home or through a farcaster.
pub const FIGHTER_TRANSIT_SPEED: f64 = 750.0;

/// Fighter patrol speed near the patrol point.
pub const FIGHTER_PATROL_SPEED: f64 = 250.0;

/// Fighter patrol speed while far from the patrol point.
pub const FIGHTER_PATROL_FAST_SPEED: f64 = 750.0;

/// Distance beyond which fighter patrols fly at the fast speed.
pub const FIGHTER_PATROL_FAST_RANGE: f64 = 10_000.0;

/// Attack speed above which fighters stop using the afterburner.
pub const FIGHTER_ATTACK_SPEED: f64 = 1_250.0;

/// Throttle for pilots below veteran skill chasing a target.
pub const FIGHTER_NOVICE_THROTTLE: f64 = 70.0;

/// Airborne fighters burn toward a target farther than this.
pub const FIGHTER_AIRBORNE_BURN_RANGE: f64 = 6_000.0;

/// Space fighters burn toward a target farther ahead than this.
pub const FIGHTER_BURN_RANGE: f64 = 20_000.0;

/// Space fighters ease to half throttle inside this range ahead.
pub const FIGHTER_CLOSING_RANGE: f64 = 10_000.0;

/// Escorts closer than this to their ward match its speed.
pub const WARD_CLOSE_RANGE: f64 = 5_000.0;

/// Patrol cruise speed near the patrol point.
pub const PATROL_SLOW_SPEED: f64 = 200.0;


/// Starships inside this multiple of their speed from a patrol point slow down.
pub const PATROL_SLOW_TIME_SECS: f64 = 10.0;

/// Ships flying only on the element's lead throttle.
pub const ESCORT_THROTTLE: f64 = 50.0;

// --- Tactical ---

/// Escorts farther than this from their ward drop the target.
pub const WARD_SAFE_ZONE: f64 = 50_000.0;

/// Starship ward safe zone while engaging.
pub const STARSHIP_WARD_SAFE_ZONE: f64 = 100_000.0;

/// A new opportunity target must be closer than this fraction of the best.
pub const OPPORTUNITY_PREFERENCE: f64 = 0.75;

/// Range floor and self-value divisor for threat/support estimates.
pub const SUPPORT_RANGE_FLOOR: f64 = 20_000.0;

/// Default commit range when the design does not set one.
pub const DEFAULT_COMMIT_RANGE: f64 = 80_000.0;

/// Default sensor range for contact building.
pub const DEFAULT_SENSOR_RANGE: f64 = 100_000.0;

/// Threat reaction time for starship crews, indexed by AI level.
pub const STARSHIP_REACTION_SECS: [f64; 3] = [2.5, 1.0, 0.5];

/// Period of the starship tactical target refresh.
pub const STARSHIP_TARGET_REFRESH_SECS: f64 = 15.0;

/// Threat level below which a starship does not look for support.
pub const SUPPORT_THREAT_FLOOR: f64 = 0.01;

/// Target suppression after acknowledging weapons-free or cancelled orders.
pub const ORDER_ACK_DROP_SECS: f64 = 0.1;

/// Target suppression after a transit order (RTB, dock, jump).
pub const TRANSIT_ORDER_DROP_SECS: f64 = 10.0;

/// Random target suppression window after a patrol order.
pub const PATROL_ORDER_DROP_SECS: (f64, f64) = (5.0, 10.0);

/// Patrolling small craft ignore contacts farther than this from the navpoint.
pub const PATROL_NAVPT_RANGE: f64 = 80_000.0;

/// Primary weapon range multiple inside which a fleeing target is still pursued.
pub const PURSUIT_WEAPON_RANGE_FACTOR: f64 = 3.0;

/// Opportunity preference factor applied to the best range once a ward threat exists.
pub const WARD_THREAT_PREFERENCE: f64 = 2.0;

// --- Fire control ---

/// Subtargets are only selected within this range.
pub const SUBTARGET_MAX_RANGE: f64 = 50_000.0;

/// Weapons below this availability are ignored as subtargets or defenders.
pub const SUBTARGET_MIN_AVAILABILITY: f64 = 35.0;

/// Drone weapons open fire inside this fraction of max range (undefended target).
pub const DRONE_OPEN_RANGE_FRACTION: f64 = 0.9;

/// Drone weapons open fire inside this fraction of max range regardless.
pub const DRONE_CLOSE_RANGE_FRACTION: f64 = 0.5;

/// Forward firing arc for anti-air hulls.
pub const FORWARD_ARC: f64 = 45.0 * PI / 180.0;

// --- Shot resolution ---

/// Muzzle speed for weapons that do not set one.
pub const DEFAULT_SHOT_SPEED: f64 = 4_000.0;

/// Minimum ray length tested for a shot.
pub const MIN_SHOT_LEN: f64 = 1_000.0;

/// Seconds a bolt or missile lives before it is spent.
pub const SHOT_LIFE_SECS: f64 = 10.0;

/// Shields weaker than this (percent) are not tested.
pub const SHIELD_HIT_MIN_STRENGTH: f64 = 5.0;

/// Direct-fire shots must pass within this multiple of the hull radius.
pub const DIRECT_HIT_RADIUS_FACTOR: f64 = 2.0;

// --- Damage ---

/// Blast radius used to find subsystems hit by a missile.
pub const MISSILE_BLAST_RADIUS: f64 = 300.0;

/// Fraction of damage a turret hit deals to the turret system.
pub const TURRET_DAMAGE_SCALE: f64 = 0.3;

/// Availability drop that triggers a local explosion.
pub const EXPLOSION_THRESHOLD: f64 = 50.0;

/// Collision damage per m/s of closing speed, before the mass split.
pub const COLLISION_DAMAGE_PER_MPS: f64 = 1.0;

/// Collision damage below this is ignored.
pub const COLLISION_DAMAGE_FLOOR: f64 = 100.0;

/// Penetration assumed for shots that do not set one.
pub const DEFAULT_PENETRATION: f64 = 5.0;

/// Power-drain damage divisor.
pub const POWER_DRAIN_SCALE: f64 = 1.0e4;

/// Camera shake gain.
pub const SHAKE_GAIN: f64 = 50.0;

/// Camera shake ceiling.
pub const SHAKE_MAX: f64 = 7.0;

/// Hull integrity is reported in this many fire/smoke bands.
pub const FIRE_BANDS: f64 = 10.0;

/// Fire and smoke start below this band.
pub const FIRE_BAND_THRESHOLD: i32 = 5;

/// Chance that a given subsystem is hurt in a collision.
pub const COLLISION_SYSTEM_CHANCE: f64 = 0.27;

/// Minimum collision damage dealt to a hurt subsystem.
pub const COLLISION_BASE_DAMAGE: f64 = 33.0;

/// Random collision damage added on top of the base.
pub const COLLISION_DAMAGE_SPREAD: f64 = 32.767;

/// Damage to an unpowered system is divided by this.
pub const UNPOWERED_DAMAGE_DIVISOR: f64 = 10.0;

/// Part damage above this is split between two parts.
pub const PART_SPLIT_THRESHOLD: f64 = 50.0;

// --- Repair and power ---

/// Reactors below this availability hand their clients to another reactor.
pub const REACTOR_FAILOVER_AVAILABILITY: f64 = 33.0;

/// Fraction of capacity a healthy reactor recharges per second.
pub const REACTOR_RECHARGE_RATE: f64 = 0.1;

/// Parts below this availability start repair.
pub const REPAIR_START_AVAILABILITY: f64 = 75.0;

/// Replacement is only attempted when it takes at most this long.
pub const REPLACE_MAX_SECS: f64 = 300.0;

/// Maximum number of field repairs per part.
pub const JERRY_RIG_LIMIT: u32 = 5;

/// A part repaired from below this availability counts as jerry-rigged.
pub const JERRY_RIG_THRESHOLD: f64 = 50.0;

/// Availability restored by a first field repair.
pub const JERRY_RIG_RESTORE: f64 = 50.0;

/// Restore penalty per previous field repair.
pub const JERRY_RIG_PENALTY: f64 = 10.0;

/// Reported availability cap for a part under repair.
pub const REPAIR_AVAILABILITY_CAP: f64 = 50.0;

/// Systems above this availability are nominal.
pub const NOMINAL_AVAILABILITY: f64 = 99.0;

/// Default availability below which a system is critical.
pub const DEFAULT_CRIT_LEVEL: f64 = 50.0;

/// Parts above this availability are degraded rather than critical.
pub const PART_DEGRADED_AVAILABILITY: f64 = 49.0;

/// Default hull protection for subsystems.
pub const DEFAULT_HULL_PROTECTION: f64 = 0.5;

// --- Shields ---

/// Shield power while threatened.
pub const SHIELD_POWER_THREATENED: f64 = 100.0;

/// Shield power otherwise.
pub const SHIELD_POWER_CALM: f64 = 50.0;

/// Shield power ramp-up, percent per second.
pub const SHIELD_CHARGE_RATE: f64 = 10.0;

/// Shield power ramp-down, percent per second.
pub const SHIELD_DISCHARGE_RATE: f64 = 20.0;

// --- Transit ---

/// Quantum drive spool-up before the jump.
pub const QUANTUM_COUNTDOWN_SECS: f64 = 5.0;

/// Quantum drive cool-down after arrival.
pub const QUANTUM_POST_WARP_SECS: f64 = 3.0;

/// Distance from the farcaster end point that triggers the transit.
pub const FARCASTER_TRIGGER_RANGE: f64 = 500.0;
