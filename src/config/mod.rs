//! Configuration models for the simulator.

pub mod simulator;

pub use simulator::{SimulatorConfig, DEFAULT_MAX_PROCESSES};
