//! Core state machine: processes, resources, ready queue and scheduler.

pub mod audit;
pub mod command;
pub mod error;
pub mod process;
pub mod ready_queue;
pub mod resource;
pub mod scheduler;

pub use audit::{build_audit_event, AuditEvent, AuditSink, InMemoryAuditSink, TracingAuditSink};
pub use command::{Command, CommandSource, OutputSink, OutputToken};
pub use error::{AppResult, ManagerError};
pub use process::{ProcessNode, ProcessTable};
pub use ready_queue::ReadyQueue;
pub use resource::{ResourceLedger, WaitEntry};
pub use scheduler::SchedulerCore;
