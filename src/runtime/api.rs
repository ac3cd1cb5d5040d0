//! Serializable views of scheduler state and the invariant checker.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::core::SchedulerCore;
use crate::util::serde::{Priority, ProcessHandle, ProcessState, ResourceId, RESOURCE_CATALOG};

/// One live process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessSnapshot {
    /// Process id.
    pub pid: String,
    /// Scheduling tier.
    pub priority: Priority,
    /// Lifecycle state.
    pub state: ProcessState,
    /// Creator id.
    pub parent: Option<String>,
    /// Children ids in creation order.
    pub children: Vec<String>,
    /// Positive holdings only.
    pub held: BTreeMap<ResourceId, u32>,
    /// Resource waited on, if blocked.
    pub blocked_on: Option<ResourceId>,
}

/// A parked request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitSnapshot {
    /// Waiting process id.
    pub pid: String,
    /// Units wanted.
    pub amount: u32,
}

/// One resource ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSnapshot {
    /// Resource name.
    pub rid: ResourceId,
    /// Fixed capacity.
    pub total: u32,
    /// Free units.
    pub available: u32,
    /// Wait queue, head first.
    pub waiters: Vec<WaitSnapshot>,
}

/// One ready tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierSnapshot {
    /// Tier.
    pub priority: Priority,
    /// Queued ids, head first.
    pub queue: Vec<String>,
}

/// Whole-world view between commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Process holding the CPU.
    pub running: String,
    /// Live processes in slot order.
    pub processes: Vec<ProcessSnapshot>,
    /// Resources in catalog order.
    pub resources: Vec<ResourceSnapshot>,
    /// Ready tiers, highest first.
    pub ready: Vec<TierSnapshot>,
}

/// Capture the current state of `core`.
#[must_use]
pub fn snapshot(core: &SchedulerCore) -> Snapshot {
    let table = core.processes();
    let pid_of = |h: ProcessHandle| table.get(h).id().to_string();

    let processes = table
        .live()
        .map(|(_, node)| ProcessSnapshot {
            pid: node.id().to_string(),
            priority: node.priority(),
            state: node.state,
            parent: node.parent().map(pid_of),
            children: node.children().iter().copied().map(pid_of).collect(),
            held: node
                .held()
                .iter()
                .filter(|(_, units)| **units > 0)
                .map(|(rid, units)| (*rid, *units))
                .collect(),
            blocked_on: node.blocked_on,
        })
        .collect();

    let resources = RESOURCE_CATALOG
        .iter()
        .map(|rid| {
            let ledger = core.ledger(*rid);
            ResourceSnapshot {
                rid: *rid,
                total: ledger.total(),
                available: ledger.available(),
                waiters: ledger
                    .waiters()
                    .map(|e| WaitSnapshot {
                        pid: pid_of(e.process),
                        amount: e.amount,
                    })
                    .collect(),
            }
        })
        .collect();

    let ready = Priority::ALL
        .iter()
        .rev()
        .map(|priority| TierSnapshot {
            priority: *priority,
            queue: core.ready_queue().tier(*priority).map(pid_of).collect(),
        })
        .collect();

    Snapshot {
        running: core.current_id().to_string(),
        processes,
        resources,
        ready,
    }
}

/// List every invariant `snapshot` violates; empty when consistent.
#[must_use]
pub fn check_invariants(snapshot: &Snapshot) -> Vec<String> {
    let mut violations = Vec::new();
    let by_pid: HashMap<&str, &ProcessSnapshot> = snapshot
        .processes
        .iter()
        .map(|p| (p.pid.as_str(), p))
        .collect();

    // Conservation and positive wait amounts.
    for res in &snapshot.resources {
        let held: u32 = snapshot
            .processes
            .iter()
            .filter_map(|p| p.held.get(&res.rid))
            .sum();
        if res.available + held != res.total {
            violations.push(format!(
                "{}: available {} + held {} != total {}",
                res.rid, res.available, held, res.total
            ));
        }
        for w in res.waiters.iter().filter(|w| w.amount == 0) {
            violations.push(format!("{}: zero-unit wait entry for {}", res.rid, w.pid));
        }
    }

    // Queue membership matches state.
    for p in &snapshot.processes {
        let ready_slots: Vec<Priority> = snapshot
            .ready
            .iter()
            .flat_map(|tier| {
                tier.queue
                    .iter()
                    .filter(|pid| **pid == p.pid)
                    .map(move |_| tier.priority)
            })
            .collect();
        let waits: Vec<ResourceId> = snapshot
            .resources
            .iter()
            .flat_map(|r| r.waiters.iter().filter(|w| w.pid == p.pid).map(move |_| r.rid))
            .collect();

        match p.state {
            ProcessState::Ready | ProcessState::Running => {
                if ready_slots != [p.priority] || !waits.is_empty() {
                    violations.push(format!(
                        "{} is {:?} but queued in tiers {:?} and waits on {:?}",
                        p.pid, p.state, ready_slots, waits
                    ));
                }
            }
            ProcessState::Blocked => {
                if !ready_slots.is_empty() || waits.len() != 1 || p.blocked_on != waits.first().copied() {
                    violations.push(format!(
                        "{} is blocked on {:?} but queued in tiers {:?} and waits on {:?}",
                        p.pid, p.blocked_on, ready_slots, waits
                    ));
                }
            }
            ProcessState::Unused => violations.push(format!("{} is live but unused", p.pid)),
        }
        if p.state == ProcessState::Running && p.pid != snapshot.running {
            violations.push(format!("{} is running but not current", p.pid));
        }
    }

    // Tree shape: one root, consistent links, no cycles.
    let roots = snapshot.processes.iter().filter(|p| p.parent.is_none()).count();
    if roots != 1 {
        violations.push(format!("expected one root, found {roots}"));
    }
    for p in &snapshot.processes {
        for child in &p.children {
            if by_pid.get(child.as_str()).and_then(|c| c.parent.as_deref()) != Some(p.pid.as_str()) {
                violations.push(format!("{} lists {} as child without a back link", p.pid, child));
            }
        }
        let mut cursor = p.parent.as_deref();
        let mut steps = 0;
        while let Some(parent) = cursor {
            steps += 1;
            if steps > snapshot.processes.len() {
                violations.push(format!("{} has a cyclic ancestry", p.pid));
                break;
            }
            match by_pid.get(parent) {
                Some(node) => cursor = node.parent.as_deref(),
                None => {
                    violations.push(format!("{} has dead ancestor {}", p.pid, parent));
                    break;
                }
            }
        }
    }

    if !by_pid.contains_key(snapshot.running.as_str()) {
        violations.push(format!("running process {} is not live", snapshot.running));
    }

    violations
}

/// Health payload for embedding hosts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Health {
    /// No invariant violations.
    pub ok: bool,
    /// Violations, if any.
    pub violations: Vec<String>,
}

/// Check `core` and report.
#[must_use]
pub fn health(core: &SchedulerCore) -> Health {
    let violations = check_invariants(&snapshot(core));
    Health {
        ok: violations.is_empty(),
        violations,
    }
}
