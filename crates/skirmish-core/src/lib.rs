//! Core types and definitions for the Skirmish combat simulation.
//!
//! This crate defines the vocabulary shared across all other crates:
//! the ship data model, the per-tick roster, commands, events, tuning and
//! constants. It has no dependency on the ECS or any runtime framework.

pub mod commands;
pub mod components;
pub mod config;
pub mod constants;
pub mod enums;
pub mod error;
pub mod events;
pub mod roster;
pub mod types;

pub use error::{Result, SkirmishError};

#[cfg(test)]
mod tests;
