//! Tests for audit functionality

use std::cell::RefCell;
use std::rc::Rc;

use prometheus_process_sim::builders::SimulatorBuilder;
use prometheus_process_sim::core::{
    build_audit_event, AuditEvent, AuditSink, InMemoryAuditSink,
};
use prometheus_process_sim::infra::{InMemorySink, TokenStreamSource};

#[test]
fn test_in_memory_audit_sink_is_bounded() {
    let mut sink = InMemoryAuditSink::new(2);
    for i in 0..3 {
        sink.record(build_audit_event(format!("e{i}"), "run", "cr", "ok", "A"));
    }
    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].event_id, "e1");
    assert_eq!(events[1].event_id, "e2");
}

#[test]
fn test_zero_capacity_sink_drops_everything() {
    let mut sink = InMemoryAuditSink::new(0);
    sink.record(build_audit_event("e", "run", "to", "ok", "init"));
    assert!(sink.events().is_empty());
}

#[test]
fn test_audit_event_serializes() {
    let event = build_audit_event("e1", "run", "de", "process is protected", "init");
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["command"], "de");
    assert_eq!(json["outcome"], "process is protected");
    assert_eq!(json["running"], "init");
}

struct Recording(Rc<RefCell<Vec<AuditEvent>>>);

impl AuditSink for Recording {
    fn record(&mut self, event: AuditEvent) {
        self.0.borrow_mut().push(event);
    }
}

#[test]
fn test_scheduler_records_one_event_per_command() {
    let events = Rc::new(RefCell::new(Vec::new()));
    let source = TokenStreamSource::new("cr A 1 de init to exit".as_bytes());
    let mut sim = SimulatorBuilder::default()
        .with_audit(Box::new(Recording(Rc::clone(&events))))
        .build(source, InMemorySink::new())
        .unwrap();
    sim.run();

    let events = events.borrow();
    let summary: Vec<(&str, &str, &str)> = events
        .iter()
        .map(|e| (e.command.as_str(), e.outcome.as_str(), e.running.as_str()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("cr", "ok", "A"),
            ("de", "process is protected", "A"),
            ("to", "ok", "A"),
        ]
    );
    assert!(events.iter().all(|e| e.run_id == sim.core().run_id()));
    assert_ne!(events[0].event_id, events[1].event_id);
}
