//! Process nodes and the fixed slot pool that owns them.

use std::collections::{BTreeMap, HashMap};

use crate::core::resource::ResourceLedger;
use crate::util::serde::{Priority, ProcessHandle, ProcessState, ResourceId};

/// One process slot.
///
/// Links to other processes and resources are handles, never references,
/// so a slot can be recycled without leaving anything dangling.
#[derive(Debug, Clone, Default)]
pub struct ProcessNode {
    id: String,
    priority: Option<Priority>,
    /// Current lifecycle state.
    pub state: ProcessState,
    parent: Option<ProcessHandle>,
    children: Vec<ProcessHandle>,
    held: BTreeMap<ResourceId, u32>,
    /// Resource this process is parked on while `Blocked`.
    pub blocked_on: Option<ResourceId>,
}

impl ProcessNode {
    fn spawn(id: String, priority: Priority, parent: Option<ProcessHandle>) -> Self {
        Self {
            id,
            priority: Some(priority),
            state: ProcessState::Ready,
            parent,
            children: Vec::new(),
            held: BTreeMap::new(),
            blocked_on: None,
        }
    }

    /// Process id; empty for an unused slot.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Scheduling tier. Unused slots report `Init`, the lowest tier.
    #[must_use]
    pub fn priority(&self) -> Priority {
        self.priority.unwrap_or(Priority::Init)
    }

    /// Creator, if any.
    #[must_use]
    pub const fn parent(&self) -> Option<ProcessHandle> {
        self.parent
    }

    /// Children in creation order.
    #[must_use]
    pub fn children(&self) -> &[ProcessHandle] {
        &self.children
    }

    /// Held units per resource. Zero entries may linger after releases.
    #[must_use]
    pub const fn held(&self) -> &BTreeMap<ResourceId, u32> {
        &self.held
    }

    /// Whether the slot is occupied.
    #[must_use]
    pub const fn is_live(&self) -> bool {
        self.state.is_live()
    }

    /// True iff a positive number of units of `resource` is held.
    #[must_use]
    pub fn holds(&self, resource: ResourceId) -> bool {
        self.amount_held(resource) > 0
    }

    /// Units of `resource` currently held.
    #[must_use]
    pub fn amount_held(&self, resource: ResourceId) -> u32 {
        self.held.get(&resource).copied().unwrap_or(0)
    }

    /// Add `amount` to the holding and take it out of the ledger.
    pub fn claim_total(&mut self, ledger: &mut ResourceLedger, amount: u32) {
        *self.held.entry(ledger.id()).or_insert(0) += amount;
        ledger.grant(amount);
    }

    /// Give `amount` back to the ledger. Does nothing unless the resource
    /// is currently held; returns whether anything was released.
    pub fn release(&mut self, ledger: &mut ResourceLedger, amount: u32) -> bool {
        if !self.holds(ledger.id()) {
            return false;
        }
        if let Some(units) = self.held.get_mut(&ledger.id()) {
            *units -= amount;
        }
        ledger.reclaim(amount);
        true
    }
}

/// Fixed-capacity arena of process slots with an id index.
#[derive(Debug, Clone)]
pub struct ProcessTable {
    slots: Vec<ProcessNode>,
    index: HashMap<String, ProcessHandle>,
}

impl ProcessTable {
    /// Pool with `capacity` unused slots (at least one, for the root).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            slots: vec![ProcessNode::default(); capacity],
            index: HashMap::with_capacity(capacity),
        }
    }

    /// Clear the pool and install a parentless root in slot 0.
    pub fn reset_with_root(&mut self, pid: &str, priority: Priority) -> ProcessHandle {
        self.reset();
        let root = ProcessHandle(0);
        self.slots[root.0] = ProcessNode::spawn(pid.to_string(), priority, None);
        self.index.insert(pid.to_string(), root);
        root
    }

    /// Number of slots, used or not.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Return every slot to `Unused`.
    pub fn reset(&mut self) {
        self.slots.fill_with(ProcessNode::default);
        self.index.clear();
    }

    /// Slot holding the live process `pid`.
    #[must_use]
    pub fn find(&self, pid: &str) -> Option<ProcessHandle> {
        self.index.get(pid).copied()
    }

    /// Occupy the first unused slot. `None` when the pool is full.
    ///
    /// The new process starts `Ready` and is appended to its parent's
    /// children. Uniqueness of `pid` is the caller's job.
    pub fn allocate(
        &mut self,
        pid: &str,
        priority: Priority,
        parent: Option<ProcessHandle>,
    ) -> Option<ProcessHandle> {
        let handle = ProcessHandle(self.slots.iter().position(|s| !s.is_live())?);
        self.slots[handle.0] = ProcessNode::spawn(pid.to_string(), priority, parent);
        self.index.insert(pid.to_string(), handle);
        if let Some(parent) = parent {
            self.slots[parent.0].children.push(handle);
        }
        Some(handle)
    }

    /// Reset a slot to `Unused` and detach it from its parent.
    pub fn free(&mut self, handle: ProcessHandle) {
        let node = std::mem::take(&mut self.slots[handle.0]);
        self.index.remove(&node.id);
        if let Some(parent) = node.parent {
            self.slots[parent.0].children.retain(|c| *c != handle);
        }
    }

    /// Shared access to a slot.
    #[must_use]
    pub fn get(&self, handle: ProcessHandle) -> &ProcessNode {
        &self.slots[handle.0]
    }

    /// Mutable access to a slot.
    pub fn get_mut(&mut self, handle: ProcessHandle) -> &mut ProcessNode {
        &mut self.slots[handle.0]
    }

    /// True if `other` is `ancestor` itself or sits anywhere below it.
    #[must_use]
    pub fn is_ancestor_of(&self, ancestor: ProcessHandle, other: ProcessHandle) -> bool {
        let mut stack = vec![ancestor];
        while let Some(next) = stack.pop() {
            if next == other {
                return true;
            }
            stack.extend_from_slice(&self.slots[next.0].children);
        }
        false
    }

    /// `root` and all its descendants, every node after its whole subtree.
    #[must_use]
    pub fn post_order(&self, root: ProcessHandle) -> Vec<ProcessHandle> {
        let mut order = Vec::new();
        let mut stack = vec![(root, false)];
        while let Some((handle, expanded)) = stack.pop() {
            if expanded {
                order.push(handle);
                continue;
            }
            stack.push((handle, true));
            // Reversed so children are finished in creation order.
            for child in self.slots[handle.0].children.iter().rev() {
                stack.push((*child, false));
            }
        }
        order
    }

    /// Live slots in slot order.
    pub fn live(&self) -> impl Iterator<Item = (ProcessHandle, &ProcessNode)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, node)| node.is_live())
            .map(|(i, node)| (ProcessHandle(i), node))
    }

    /// Number of live processes.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.index.len()
    }
}
