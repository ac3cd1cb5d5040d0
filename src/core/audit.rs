//! Audit sink implementations.
//!
//! One event is recorded per dispatched command when a sink is attached
//! to the scheduler. Audit is observational only and never alters output.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::util::clock::now_ms;

/// Audit event structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Event identifier, unique within a run.
    pub event_id: String,
    /// Identifier of the simulation run that produced the event.
    pub run_id: String,
    /// Command name (init, cr, de, req, rel, to).
    pub command: String,
    /// `ok` or the rejection message.
    pub outcome: String,
    /// Process holding the CPU after the command.
    pub running: String,
    /// Timestamp milliseconds.
    pub created_at_ms: u128,
}

/// Audit sink abstraction.
pub trait AuditSink {
    /// Record an audit event.
    fn record(&mut self, event: AuditEvent);
}

/// In-memory audit sink for testing and dev.
pub struct InMemoryAuditSink {
    events: VecDeque<AuditEvent>,
    max_events: usize,
}

impl InMemoryAuditSink {
    /// Create a new in-memory sink with a bounded buffer.
    #[must_use]
    pub fn new(max_events: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(max_events),
            max_events,
        }
    }

    /// Retrieve a snapshot of stored events.
    #[must_use]
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.iter().cloned().collect()
    }
}

impl AuditSink for InMemoryAuditSink {
    fn record(&mut self, event: AuditEvent) {
        if self.max_events == 0 {
            return;
        }
        if self.events.len() >= self.max_events {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }
}

/// Sink that writes each event as one JSON line through `tracing`.
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&mut self, event: AuditEvent) {
        match serde_json::to_string(&event) {
            Ok(line) => tracing::info!(target: "procsim::audit", "{line}"),
            Err(e) => tracing::error!("failed to encode audit event: {}", e),
        }
    }
}

/// Helper to build an audit event from context.
pub fn build_audit_event(
    event_id: impl Into<String>,
    run_id: impl Into<String>,
    command: impl Into<String>,
    outcome: impl Into<String>,
    running: impl Into<String>,
) -> AuditEvent {
    AuditEvent {
        event_id: event_id.into(),
        run_id: run_id.into(),
        command: command.into(),
        outcome: outcome.into(),
        running: running.into(),
        created_at_ms: now_ms(),
    }
}
