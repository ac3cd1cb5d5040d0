//! # Prometheus Process Sim
//!
//! A deterministic, in-memory simulator of a single-CPU process and
//! resource manager.
//!
//! The simulator consumes a stream of discrete commands (create, destroy,
//! request, release, time-out, reset) and produces a trace with one token
//! per command: the id of the process that holds the CPU afterwards, or
//! `error` when the command was rejected.
//!
//! ## Model
//!
//! - **Processes** live in a fixed pool of slots and form a tree rooted at
//!   the protected `init` process. Destroying a process destroys its whole
//!   subtree, children first, and returns everything they held.
//! - **Resources** are a fixed catalog of four counting semaphores
//!   (`R1`..`R4`, capacities 1 to 4). Requests that cannot be met park the
//!   requester in the resource's wait queue; releases wake waiters with a
//!   head-first "first fit" scan.
//! - **Scheduling** is strict priority (System > User > Init) with FIFO
//!   order inside a tier and preemption after every state change.
//!
//! ## Usage
//!
//! ```rust
//! use prometheus_process_sim::config::SimulatorConfig;
//! use prometheus_process_sim::infra::{InMemorySink, TokenStreamSource};
//! use prometheus_process_sim::runtime::Simulator;
//!
//! let source = TokenStreamSource::new("cr P1 1 cr P2 2 to exit".as_bytes());
//! let mut sim = Simulator::from_config(SimulatorConfig::default(), source, InMemorySink::new())
//!     .expect("default config is valid");
//! sim.run();
//! assert_eq!(sim.sink().trace(), "init P1 P2 P2");
//! ```
//!
//! For more scenarios see `tests/scenario_test.rs`.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core state machine: processes, resources, ready queue and scheduler.
pub mod core;
/// Configuration models for the simulator.
pub mod config;
/// Builders to construct scheduler components from configuration.
pub mod builders;
/// Command stream and trace output adapters.
pub mod infra;
/// Command loop driver and state snapshots.
pub mod runtime;
/// Shared utilities.
pub mod util;
