//! Headless combat engine for the skirmish core.
//!
//! Owns the hecs ECS world, runs pilots, flight, weapons, shot resolution
//! and damage control at a fixed tick rate, and reports what happened as a
//! stream of `CombatEvent`s.

pub mod damage;
pub mod engine;
pub mod repair;
pub mod shot;
pub mod systems;
pub mod world_setup;

pub use engine::{CombatEngine, SimConfig};
pub use skirmish_core as core;

#[cfg(test)]
mod tests;
