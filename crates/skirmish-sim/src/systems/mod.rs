//! ECS systems that operate on the simulation world each tick.
//!
//! Systems are plain functions over `&mut World`. They do not own state;
//! ships, pilots and shots live in components.

pub mod actuators;
pub mod ai;
pub mod cleanup;
pub mod collisions;
pub mod impacts;
pub mod maintenance;
pub mod movement;
pub mod sensors;
pub mod weapons;
