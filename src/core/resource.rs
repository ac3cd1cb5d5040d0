//! Per-resource unit accounting and wait queue.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::util::serde::{ProcessHandle, ResourceId};

/// A parked request: who is waiting and for how many units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitEntry {
    /// Waiting process.
    pub process: ProcessHandle,
    /// Units still wanted. Always positive.
    pub amount: u32,
}

/// Capacity ledger for one resource.
///
/// The ledger only counts; feasibility checks (claim limits, availability)
/// happen in the scheduler before [`grant`](Self::grant) is called.
#[derive(Debug, Clone)]
pub struct ResourceLedger {
    id: ResourceId,
    total: u32,
    available: u32,
    wait_queue: VecDeque<WaitEntry>,
}

impl ResourceLedger {
    /// Fresh ledger at full capacity.
    #[must_use]
    pub fn new(id: ResourceId) -> Self {
        let total = id.capacity();
        Self {
            id,
            total,
            available: total,
            wait_queue: VecDeque::new(),
        }
    }

    /// Resource identity.
    #[must_use]
    pub const fn id(&self) -> ResourceId {
        self.id
    }

    /// Fixed capacity.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.total
    }

    /// Units not held by anyone.
    #[must_use]
    pub const fn available(&self) -> u32 {
        self.available
    }

    /// Take `amount` units out of the free pool.
    pub fn grant(&mut self, amount: u32) {
        debug_assert!(amount <= self.available, "grant beyond availability");
        self.available -= amount;
    }

    /// Return `amount` units to the free pool.
    pub fn reclaim(&mut self, amount: u32) {
        self.available += amount;
        debug_assert!(self.available <= self.total, "reclaim beyond total");
    }

    /// Park a request. A process already waiting here has `amount` added
    /// to its existing entry instead of getting a second one.
    pub fn enqueue_wait(&mut self, process: ProcessHandle, amount: u32) {
        if let Some(entry) = self.wait_queue.iter_mut().find(|e| e.process == process) {
            entry.amount += amount;
        } else {
            self.wait_queue.push_back(WaitEntry { process, amount });
        }
    }

    /// Drop the pending entry of `process`, if any.
    pub fn withdraw(&mut self, process: ProcessHandle) -> Option<WaitEntry> {
        let pos = self.wait_queue.iter().position(|e| e.process == process)?;
        self.wait_queue.remove(pos)
    }

    /// Remove and return the first entry, scanning from the head, that the
    /// current availability can satisfy. Unsatisfiable entries ahead of it
    /// keep their place.
    pub fn serve_next(&mut self) -> Option<WaitEntry> {
        let pos = self
            .wait_queue
            .iter()
            .position(|e| e.amount <= self.available)?;
        self.wait_queue.remove(pos)
    }

    /// Pending request of `process`, if parked here.
    #[must_use]
    pub fn pending(&self, process: ProcessHandle) -> Option<u32> {
        self.wait_queue
            .iter()
            .find(|e| e.process == process)
            .map(|e| e.amount)
    }

    /// Wait queue, head first.
    pub fn waiters(&self) -> impl Iterator<Item = &WaitEntry> + '_ {
        self.wait_queue.iter()
    }

    /// Whether nobody is waiting.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.wait_queue.is_empty()
    }
}
