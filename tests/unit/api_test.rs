//! Tests for state snapshots and the invariant checker

use prometheus_process_sim::builders::SimulatorBuilder;
use prometheus_process_sim::core::SchedulerCore;
use prometheus_process_sim::runtime::{check_invariants, health, snapshot};
use prometheus_process_sim::util::{Priority, ProcessState, ResourceId};

fn busy_core() -> SchedulerCore {
    let mut core = SchedulerCore::new(Default::default()).unwrap();
    core.create("A", Priority::User).unwrap();
    core.request(ResourceId::R2, 2).unwrap();
    core.create("B", Priority::User).unwrap();
    core.time_out();
    // B runs and blocks on R2.
    core.request(ResourceId::R2, 1).unwrap();
    core
}

#[test]
fn test_snapshot_reflects_state() {
    let core = busy_core();
    let snap = snapshot(&core);

    assert_eq!(snap.running, "A");
    let pids: Vec<&str> = snap.processes.iter().map(|p| p.pid.as_str()).collect();
    assert_eq!(pids, vec!["init", "A", "B"]);

    let b = &snap.processes[2];
    assert_eq!(b.state, ProcessState::Blocked);
    assert_eq!(b.blocked_on, Some(ResourceId::R2));
    assert_eq!(b.parent.as_deref(), Some("A"));
    assert_eq!(snap.processes[1].children, vec!["B".to_string()]);
    assert_eq!(snap.processes[1].held.get(&ResourceId::R2), Some(&2));

    let r2 = &snap.resources[1];
    assert_eq!(r2.available, 0);
    assert_eq!(r2.waiters.len(), 1);
    assert_eq!(r2.waiters[0].pid, "B");
    assert_eq!(r2.waiters[0].amount, 1);

    assert_eq!(snap.ready[0].priority, Priority::System);
    assert_eq!(snap.ready[1].queue, vec!["A".to_string()]);
    assert_eq!(snap.ready[2].queue, vec!["init".to_string()]);
}

#[test]
fn test_consistent_state_has_no_violations() {
    let core = busy_core();
    assert!(check_invariants(&snapshot(&core)).is_empty());
    let report = health(&core);
    assert!(report.ok);
    assert!(report.violations.is_empty());
}

#[test]
fn test_checker_flags_corrupted_snapshot() {
    let core = busy_core();

    let mut leaked = snapshot(&core);
    leaked.resources[1].available = 1;
    assert!(check_invariants(&leaked)
        .iter()
        .any(|v| v.starts_with("R2: available")));

    let mut stray = snapshot(&core);
    stray.ready[1].queue.push("B".to_string());
    assert!(!check_invariants(&stray).is_empty());

    let mut two_runners = snapshot(&core);
    two_runners.running = "init".to_string();
    assert!(!check_invariants(&two_runners).is_empty());
}

#[test]
fn test_snapshot_serializes_to_json() {
    let core = SimulatorBuilder::default().build_core().unwrap();
    let json = serde_json::to_value(snapshot(&core)).unwrap();
    assert_eq!(json["running"], "init");
    assert_eq!(json["processes"][0]["state"], "running");
    assert_eq!(json["resources"][3]["total"], 4);
}
