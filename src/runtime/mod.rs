//! Command loop driver and state snapshots.

pub mod api;
pub mod driver;

pub use api::{check_invariants, health, snapshot, Health, Snapshot};
pub use driver::{RunSummary, Simulator};
