//! Priority-tiered FIFO ready queue.

use std::collections::VecDeque;

use crate::util::serde::{Priority, ProcessHandle};

/// Three FIFO tiers of ready process handles, one per [`Priority`].
///
/// A handle lives in at most one tier: the one matching the priority it
/// was added with. Callers pass the priority alongside the handle because
/// priorities are immutable after creation.
#[derive(Debug, Default, Clone)]
pub struct ReadyQueue {
    tiers: [VecDeque<ProcessHandle>; 3],
}

impl ReadyQueue {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append to the tail of the tier for `priority`.
    pub fn add(&mut self, process: ProcessHandle, priority: Priority) {
        self.tiers[priority.index()].push_back(process);
    }

    /// Remove from the tier for `priority`. No-op if absent.
    pub fn remove(&mut self, process: ProcessHandle, priority: Priority) {
        let tier = &mut self.tiers[priority.index()];
        if let Some(pos) = tier.iter().position(|p| *p == process) {
            tier.remove(pos);
        }
    }

    /// Front of the highest non-empty tier (System > User > Init).
    #[must_use]
    pub fn highest_ready(&self) -> Option<ProcessHandle> {
        self.tiers
            .iter()
            .rev()
            .find_map(|tier| tier.front().copied())
    }

    /// Empty all tiers.
    pub fn reset(&mut self) {
        for tier in &mut self.tiers {
            tier.clear();
        }
    }

    /// Whether `process` sits in any tier.
    #[must_use]
    pub fn contains(&self, process: ProcessHandle) -> bool {
        self.tiers.iter().any(|tier| tier.contains(&process))
    }

    /// Handles in one tier, head first.
    pub fn tier(&self, priority: Priority) -> impl Iterator<Item = ProcessHandle> + '_ {
        self.tiers[priority.index()].iter().copied()
    }

    /// Total number of queued handles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tiers.iter().map(VecDeque::len).sum()
    }

    /// Whether every tier is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiers.iter().all(VecDeque::is_empty)
    }
}
