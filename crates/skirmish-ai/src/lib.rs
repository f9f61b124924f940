//! Pilot AI for the skirmish combat core.
//!
//! Tactical assessment (rules of engagement, threat and target selection)
//! feeding per-ship steering, throttle, helm and fire control. Operates on
//! plain data read from a `Roster` snapshot and answers with actuator
//! commands; no ECS dependency.

pub mod command;
pub mod dropship;
pub mod nav;
pub mod navigator;
pub mod objective;
pub mod pilot;
pub mod starship;
pub mod steer;
pub mod step;
pub mod tactical;
pub mod targeting;

pub use command::{ActuatorCommand, AiOutput};
pub use pilot::Pilot;
pub use skirmish_core as core;
pub use step::{step_ai, AiWorld};
