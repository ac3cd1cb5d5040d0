//! Serializable identifiers and enums shared across the simulator.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Scheduling tier of a process. Higher tiers always win the CPU.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Reserved for the protected root process.
    Init = 0,
    /// Ordinary user processes.
    User = 1,
    /// System processes.
    System = 2,
}

impl Priority {
    /// All tiers, lowest first.
    pub const ALL: [Self; 3] = [Self::Init, Self::User, Self::System];

    /// Map a numeric level from the command stream onto a tier.
    ///
    /// Only `User` and `System` may be requested by `cr`; level 0 is
    /// reserved for init and rejected here.
    #[must_use]
    pub const fn from_creatable_level(level: u8) -> Option<Self> {
        match level {
            1 => Some(Self::User),
            2 => Some(Self::System),
            _ => None,
        }
    }

    /// Slot of this tier inside tier-indexed arrays.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Lifecycle state of a process slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessState {
    /// Free slot.
    #[default]
    Unused,
    /// Waiting for the CPU.
    Ready,
    /// Holding the CPU.
    Running,
    /// Parked in a resource wait queue.
    Blocked,
}

impl ProcessState {
    /// Whether the slot holds a live process.
    #[must_use]
    pub const fn is_live(self) -> bool {
        !matches!(self, Self::Unused)
    }
}

/// One of the four fixed resources.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum ResourceId {
    /// Single-unit resource.
    R1,
    /// Two-unit resource.
    R2,
    /// Three-unit resource.
    R3,
    /// Four-unit resource.
    R4,
}

/// The catalog every world reset recreates, in declaration order.
pub const RESOURCE_CATALOG: [ResourceId; 4] =
    [ResourceId::R1, ResourceId::R2, ResourceId::R3, ResourceId::R4];

impl ResourceId {
    /// Fixed unit capacity.
    #[must_use]
    pub const fn capacity(self) -> u32 {
        match self {
            Self::R1 => 1,
            Self::R2 => 2,
            Self::R3 => 3,
            Self::R4 => 4,
        }
    }

    /// Position in [`RESOURCE_CATALOG`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Wire name (`R1`..`R4`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::R1 => "R1",
            Self::R2 => "R2",
            Self::R3 => "R3",
            Self::R4 => "R4",
        }
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RESOURCE_CATALOG
            .into_iter()
            .find(|rid| rid.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

/// Index of a slot in the fixed process pool.
///
/// Handles are only meaningful while the slot stays live; destroy removes
/// every handle that points at a slot before the slot is recycled.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ProcessHandle(pub usize);

impl fmt::Display for ProcessHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "slot#{}", self.0)
    }
}
