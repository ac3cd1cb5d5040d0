//! The scheduler core: process table, resource ledgers, ready queue and
//! the command dispatcher tying them together.
//!
//! Every command is validated before anything is mutated. A rejected
//! command produces a single `error` token and leaves state untouched; an
//! accepted one ends with the scheduling decision, which emits the id of
//! the process holding the CPU.

use std::ops::ControlFlow;

use crate::config::SimulatorConfig;
use crate::core::audit::{build_audit_event, AuditSink};
use crate::core::command::{Command, OutputSink, OutputToken};
use crate::core::error::ManagerError;
use crate::core::process::{ProcessNode, ProcessTable};
use crate::core::ready_queue::ReadyQueue;
use crate::core::resource::ResourceLedger;
use crate::util::serde::{
    Priority, ProcessHandle, ProcessState, ResourceId, RESOURCE_CATALOG,
};

/// Owner of all simulated process and resource state.
pub struct SchedulerCore {
    config: SimulatorConfig,
    processes: ProcessTable,
    resources: [ResourceLedger; 4],
    ready: ReadyQueue,
    current: ProcessHandle,
    root: ProcessHandle,
    audit: Option<Box<dyn AuditSink>>,
    run_id: String,
    dispatched: u64,
}

impl SchedulerCore {
    /// Build a core from validated configuration, already reset.
    pub fn new(config: SimulatorConfig) -> Result<Self, ManagerError> {
        config.validate().map_err(ManagerError::InvalidConfig)?;
        let mut core = Self {
            processes: ProcessTable::new(config.max_processes),
            resources: RESOURCE_CATALOG.map(ResourceLedger::new),
            ready: ReadyQueue::new(),
            current: ProcessHandle(0),
            root: ProcessHandle(0),
            audit: None,
            run_id: uuid::Uuid::new_v4().to_string(),
            dispatched: 0,
            config,
        };
        core.reset_world();
        Ok(core)
    }

    /// Attach an audit sink.
    #[must_use]
    pub fn with_audit(mut self, audit: Box<dyn AuditSink>) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Boot: world reset followed by the scheduling decision. Returns the
    /// id of the running process (always the root).
    pub fn boot(&mut self) -> String {
        self.reset_world()
    }

    /// Execute one command, pushing its tokens to `sink`.
    ///
    /// Returns `Break` on `exit`; every other command continues the run.
    pub fn dispatch<S>(&mut self, command: &Command, sink: &mut S) -> ControlFlow<()>
    where
        S: OutputSink + ?Sized,
    {
        let result = match command {
            Command::Exit => return ControlFlow::Break(()),
            Command::Init => {
                sink.emit(OutputToken::Boundary);
                Ok(self.init())
            }
            Command::Create { pid, priority } => Priority::from_creatable_level(*priority)
                .ok_or(ManagerError::InvalidPriority(*priority))
                .and_then(|p| self.create(pid, p)),
            Command::Destroy { pid } => self.destroy(pid),
            Command::Request { rid, amount } => {
                parse_resource(rid).and_then(|rid| self.request(rid, *amount))
            }
            Command::Release { rid, amount } => {
                parse_resource(rid).and_then(|rid| self.release(rid, *amount))
            }
            Command::TimeOut => Ok(self.time_out()),
            Command::Malformed { command, reason } => Err(ManagerError::MalformedCommand(
                format!("{command}: {reason}"),
            )),
        };

        match &result {
            Ok(running) => sink.emit(OutputToken::Process(running.clone())),
            Err(e) => {
                tracing::warn!("rejected `{}`: {}", command, e);
                sink.emit(OutputToken::Error);
            }
        }
        self.record_audit(command, &result);
        ControlFlow::Continue(())
    }

    /// `init`: reset the whole world. The boundary marker is the
    /// dispatcher's job.
    pub fn init(&mut self) -> String {
        self.reset_world()
    }

    /// Create `pid` as a child of the current process.
    pub fn create(&mut self, pid: &str, priority: Priority) -> Result<String, ManagerError> {
        if priority == Priority::Init {
            return Err(ManagerError::InvalidPriority(Priority::Init as u8));
        }
        if pid.is_empty() {
            return Err(ManagerError::MalformedCommand("cr: empty pid".into()));
        }
        if self.processes.find(pid).is_some() {
            return Err(ManagerError::DuplicateProcessId(pid.to_string()));
        }
        let handle = self
            .processes
            .allocate(pid, priority, Some(self.current))
            .ok_or(ManagerError::PoolExhausted)?;
        self.ready.add(handle, priority);
        tracing::info!(
            "created {} ({:?}) under {}",
            pid,
            priority,
            self.processes.get(self.current).id()
        );
        Ok(self.schedule())
    }

    /// Destroy `pid` and its whole subtree, children first.
    pub fn destroy(&mut self, pid: &str) -> Result<String, ManagerError> {
        if pid == self.config.init_pid {
            return Err(ManagerError::ProtectedProcess);
        }
        let target = self
            .processes
            .find(pid)
            .ok_or_else(|| ManagerError::PermissionDenied(format!("no process `{pid}`")))?;
        if !self.processes.is_ancestor_of(self.current, target) {
            return Err(ManagerError::PermissionDenied(format!(
                "`{pid}` is not a descendant of `{}`",
                self.current_id()
            )));
        }

        let doomed = self.processes.post_order(target);
        tracing::info!("destroying {} ({} processes)", pid, doomed.len());
        for handle in doomed {
            self.tear_down(handle);
        }
        Ok(self.schedule())
    }

    /// Ask for `amount` units of `rid` on behalf of the current process.
    /// Blocks the process when the units are not free yet.
    pub fn request(&mut self, rid: ResourceId, amount: u32) -> Result<String, ManagerError> {
        let cur = self.current;
        let node = self.processes.get(cur);
        let held = node.amount_held(rid);
        let total = rid.capacity();
        if held.saturating_add(amount) > total {
            return Err(ManagerError::ClaimExceeded {
                resource: rid,
                held,
                requested: amount,
                total,
            });
        }

        let ledger = &mut self.resources[rid.index()];
        if amount <= ledger.available() {
            self.processes.get_mut(cur).claim_total(ledger, amount);
            tracing::debug!("{} granted {} of {}", self.current_id(), amount, rid);
        } else {
            if let Some(blocked_on) = node.blocked_on.filter(|b| *b != rid) {
                return Err(ManagerError::AlreadyBlocked {
                    blocked_on,
                    requested: rid,
                });
            }
            let priority = node.priority();
            let node = self.processes.get_mut(cur);
            node.state = ProcessState::Blocked;
            node.blocked_on = Some(rid);
            self.ready.remove(cur, priority);
            ledger.enqueue_wait(cur, amount);
            tracing::debug!("{} blocked on {} for {}", self.current_id(), rid, amount);
        }
        Ok(self.schedule())
    }

    /// Return `amount` units of `rid` from the current process and serve
    /// whatever waiters the freed units can satisfy.
    pub fn release(&mut self, rid: ResourceId, amount: u32) -> Result<String, ManagerError> {
        let held = self.processes.get(self.current).amount_held(rid);
        if amount > held {
            return Err(ManagerError::InsufficientHeld {
                resource: rid,
                held,
                requested: amount,
            });
        }
        self.release_units(self.current, rid, amount);
        Ok(self.schedule())
    }

    /// Rotate the current process to the tail of its tier.
    pub fn time_out(&mut self) -> String {
        let cur = self.current;
        let node = self.processes.get_mut(cur);
        if node.state == ProcessState::Blocked {
            tracing::warn!("time-out on blocked {}, leaving it parked", node.id());
        } else {
            let priority = node.priority();
            node.state = ProcessState::Ready;
            self.ready.remove(cur, priority);
            self.ready.add(cur, priority);
        }
        self.schedule()
    }

    /// Handle of the process holding the CPU.
    #[must_use]
    pub const fn current(&self) -> ProcessHandle {
        self.current
    }

    /// Id of the process holding the CPU.
    #[must_use]
    pub fn current_id(&self) -> &str {
        self.processes.get(self.current).id()
    }

    /// Handle of the protected root process.
    #[must_use]
    pub const fn root(&self) -> ProcessHandle {
        self.root
    }

    /// Live process named `pid`.
    #[must_use]
    pub fn process(&self, pid: &str) -> Option<&ProcessNode> {
        self.processes.find(pid).map(|h| self.processes.get(h))
    }

    /// The process pool.
    #[must_use]
    pub const fn processes(&self) -> &ProcessTable {
        &self.processes
    }

    /// Ledger of one resource.
    #[must_use]
    pub const fn ledger(&self, rid: ResourceId) -> &ResourceLedger {
        &self.resources[rid.index()]
    }

    /// The ready queue.
    #[must_use]
    pub const fn ready_queue(&self) -> &ReadyQueue {
        &self.ready
    }

    /// Configuration in effect.
    #[must_use]
    pub const fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Identifier stamped on audit events.
    #[must_use]
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    fn reset_world(&mut self) -> String {
        self.ready.reset();
        self.resources = RESOURCE_CATALOG.map(ResourceLedger::new);
        self.root = self
            .processes
            .reset_with_root(&self.config.init_pid, Priority::Init);
        self.current = self.root;
        self.ready.add(self.root, Priority::Init);
        tracing::info!("world reset, {} slots", self.processes.capacity());
        self.schedule()
    }

    /// Give units back to the ledger, then wake waiters head-first until
    /// the next one cannot be satisfied.
    fn release_units(&mut self, holder: ProcessHandle, rid: ResourceId, amount: u32) {
        let ledger = &mut self.resources[rid.index()];
        self.processes.get_mut(holder).release(ledger, amount);

        while let Some(entry) = ledger.serve_next() {
            let node = self.processes.get_mut(entry.process);
            node.claim_total(ledger, entry.amount);
            node.state = ProcessState::Ready;
            node.blocked_on = None;
            self.ready.add(entry.process, node.priority());
            tracing::debug!("{} woken with {} of {}", node.id(), entry.amount, rid);
        }
    }

    /// Destroy a single node whose descendants are already gone.
    fn tear_down(&mut self, handle: ProcessHandle) {
        // Withdraw first so the node cannot be served its own units.
        let node = self.processes.get(handle);
        let priority = node.priority();
        if node.state == ProcessState::Blocked {
            if let Some(rid) = node.blocked_on {
                self.resources[rid.index()].withdraw(handle);
            }
        }
        self.ready.remove(handle, priority);

        let holdings: Vec<(ResourceId, u32)> = self
            .processes
            .get(handle)
            .held()
            .iter()
            .filter(|(_, units)| **units > 0)
            .map(|(rid, units)| (*rid, *units))
            .collect();
        for (rid, units) in holdings {
            self.release_units(handle, rid, units);
        }
        self.processes.free(handle);
    }

    /// Pick the process that should hold the CPU and return its id.
    fn schedule(&mut self) -> String {
        let current = self.processes.get(self.current);
        match self.ready.highest_ready() {
            Some(next) => {
                let next_priority = self.processes.get(next).priority();
                if current.priority() < next_priority || current.state != ProcessState::Running {
                    if current.state == ProcessState::Running && next != self.current {
                        self.processes.get_mut(self.current).state = ProcessState::Ready;
                    }
                    self.processes.get_mut(next).state = ProcessState::Running;
                    self.current = next;
                }
            }
            None => {
                // Everyone is blocked. Keep the current process if it still
                // exists; otherwise park the CPU on the root.
                tracing::warn!("ready queue empty, no runnable process");
                if !current.is_live() {
                    self.current = self.root;
                }
            }
        }
        let running = self.current_id().to_string();
        tracing::debug!("scheduled {}", running);
        running
    }

    fn record_audit(&mut self, command: &Command, result: &Result<String, ManagerError>) {
        self.dispatched += 1;
        let Some(audit) = self.audit.as_mut() else {
            return;
        };
        let outcome = match result {
            Ok(_) => "ok".to_string(),
            Err(e) => e.to_string(),
        };
        let running = self.processes.get(self.current).id().to_string();
        audit.record(build_audit_event(
            format!("{}-{}", self.run_id, self.dispatched),
            self.run_id.clone(),
            command.keyword(),
            outcome,
            running,
        ));
    }
}

fn parse_resource(rid: &str) -> Result<ResourceId, ManagerError> {
    rid.parse().map_err(ManagerError::UnknownResource)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::InMemorySink;

    fn core() -> SchedulerCore {
        SchedulerCore::new(SimulatorConfig::default()).unwrap()
    }

    fn state(core: &SchedulerCore, pid: &str) -> ProcessState {
        core.process(pid).map_or(ProcessState::Unused, |p| p.state)
    }

    #[test]
    fn test_boot_runs_root() {
        let mut core = core();
        assert_eq!(core.boot(), "init");
        assert_eq!(state(&core, "init"), ProcessState::Running);
        assert_eq!(core.current(), core.root());
        for rid in RESOURCE_CATALOG {
            assert_eq!(core.ledger(rid).available(), rid.capacity());
        }
    }

    #[test]
    fn test_preemption_demotes_previous_runner() {
        let mut core = core();
        assert_eq!(core.create("A", Priority::User).unwrap(), "A");
        assert_eq!(state(&core, "init"), ProcessState::Ready);
        assert_eq!(state(&core, "A"), ProcessState::Running);

        // Equal tier: no preemption.
        assert_eq!(core.create("B", Priority::User).unwrap(), "A");
        assert_eq!(state(&core, "B"), ProcessState::Ready);
    }

    #[test]
    fn test_time_out_reselects_sole_runner() {
        let mut core = core();
        core.create("A", Priority::System).unwrap();
        assert_eq!(core.time_out(), "A");
        assert_eq!(state(&core, "A"), ProcessState::Running);
        assert_eq!(core.ready_queue().len(), 2);
    }

    #[test]
    fn test_request_blocks_and_release_wakes() {
        let mut core = core();
        core.create("A", Priority::User).unwrap();
        core.request(ResourceId::R2, 2).unwrap();
        core.create("B", Priority::User).unwrap();
        assert_eq!(core.time_out(), "B");

        assert_eq!(core.request(ResourceId::R2, 1).unwrap(), "A");
        let b = core.process("B").unwrap();
        assert_eq!(b.state, ProcessState::Blocked);
        assert_eq!(b.blocked_on, Some(ResourceId::R2));
        assert_eq!(core.ledger(ResourceId::R2).pending(core.processes().find("B").unwrap()), Some(1));

        assert_eq!(core.release(ResourceId::R2, 1).unwrap(), "A");
        let b = core.process("B").unwrap();
        assert_eq!(b.state, ProcessState::Ready);
        assert_eq!(b.blocked_on, None);
        assert_eq!(b.amount_held(ResourceId::R2), 1);
        assert!(core.ledger(ResourceId::R2).is_idle());
    }

    #[test]
    fn test_rejections_leave_state_untouched() {
        let mut core = core();
        core.request(ResourceId::R1, 1).unwrap();

        assert!(matches!(
            core.request(ResourceId::R1, 1),
            Err(ManagerError::ClaimExceeded { held: 1, requested: 1, total: 1, .. })
        ));
        assert!(matches!(
            core.release(ResourceId::R3, 1),
            Err(ManagerError::InsufficientHeld { held: 0, .. })
        ));
        assert_eq!(core.destroy("init"), Err(ManagerError::ProtectedProcess));
        assert!(matches!(core.destroy("ghost"), Err(ManagerError::PermissionDenied(_))));
        assert_eq!(
            core.create("init", Priority::User),
            Err(ManagerError::DuplicateProcessId("init".into()))
        );
        assert_eq!(core.create("X", Priority::Init), Err(ManagerError::InvalidPriority(0)));

        assert_eq!(core.ledger(ResourceId::R1).available(), 0);
        assert_eq!(core.processes().live_count(), 1);
        assert_eq!(state(&core, "init"), ProcessState::Running);
    }

    #[test]
    fn test_destroy_outside_subtree_denied() {
        let mut core = core();
        core.create("A", Priority::User).unwrap();
        core.create("S", Priority::System).unwrap();
        // S is running and A is its parent, not its child.
        assert!(matches!(core.destroy("A"), Err(ManagerError::PermissionDenied(_))));
        assert!(core.process("A").is_some());
    }

    #[test]
    fn test_destroy_self_falls_through_to_next() {
        let mut core = core();
        core.create("A", Priority::User).unwrap();
        core.request(ResourceId::R4, 4).unwrap();
        assert_eq!(core.destroy("A").unwrap(), "init");
        assert!(core.process("A").is_none());
        assert_eq!(core.ledger(ResourceId::R4).available(), 4);
        assert!(core.processes().get(core.root()).children().is_empty());
    }

    #[test]
    fn test_dispatch_emits_boundary_before_reset() {
        let mut core = core();
        let mut sink = InMemorySink::new();
        core.create("A", Priority::User).unwrap();
        assert!(core.dispatch(&Command::Init, &mut sink).is_continue());
        assert_eq!(
            sink.tokens(),
            &[OutputToken::Boundary, OutputToken::Process("init".into())]
        );
        assert!(core.process("A").is_none());
        assert!(core.dispatch(&Command::Exit, &mut sink).is_break());
        assert_eq!(sink.tokens().len(), 2);
    }

    #[test]
    fn test_dispatch_validates_wire_arguments() {
        let mut core = core();
        let mut sink = InMemorySink::new();
        let commands = [
            Command::Create { pid: "X".into(), priority: 3 },
            Command::Request { rid: "R9".into(), amount: 1 },
            Command::Release { rid: "disk".into(), amount: 1 },
            Command::Malformed { command: "req".into(), reason: "amount `x`".into() },
        ];
        for command in &commands {
            let _ = core.dispatch(command, &mut sink);
        }
        assert_eq!(sink.error_count(), 4);
        assert_eq!(sink.tokens().len(), 4);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let cfg = SimulatorConfig {
            max_processes: 0,
            ..SimulatorConfig::default()
        };
        assert!(matches!(SchedulerCore::new(cfg), Err(ManagerError::InvalidConfig(_))));
    }
}
