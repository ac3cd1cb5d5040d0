//! Builders to construct scheduler components from configuration.

pub mod simulator_builder;

pub use simulator_builder::{build_core, SimulatorBuilder};
