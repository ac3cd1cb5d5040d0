//! Error types for scheduler operations.

use thiserror::Error;

use crate::util::serde::ResourceId;

/// Reasons a command is rejected. Every variant surfaces as a single
/// `error` token; none of them stops the run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ManagerError {
    /// `req`/`rel` named something outside the fixed catalog.
    #[error("unknown resource: {0}")]
    UnknownResource(String),
    /// The request would push the holder past the resource's total.
    #[error("claim exceeded on {resource}: held {held} + requested {requested} > total {total}")]
    ClaimExceeded {
        /// Resource being requested.
        resource: ResourceId,
        /// Units already held by the requester.
        held: u32,
        /// Units asked for.
        requested: u32,
        /// Fixed capacity of the resource.
        total: u32,
    },
    /// The release asks for more units than are held.
    #[error("insufficient held on {resource}: held {held}, releasing {requested}")]
    InsufficientHeld {
        /// Resource being released.
        resource: ResourceId,
        /// Units currently held.
        held: u32,
        /// Units asked to release.
        requested: u32,
    },
    /// `cr` named an id already in use.
    #[error("duplicate process id: {0}")]
    DuplicateProcessId(String),
    /// No free slot is left in the process pool.
    #[error("process pool exhausted")]
    PoolExhausted,
    /// `de` targeted the root process.
    #[error("process is protected")]
    ProtectedProcess,
    /// `de` targeted a process outside the caller's subtree, or none at all.
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    /// `cr` carried a priority other than 1 or 2.
    #[error("invalid priority: {0}")]
    InvalidPriority(u8),
    /// A recognised command carried an argument that failed to parse.
    #[error("malformed command: {0}")]
    MalformedCommand(String),
    /// A deadlocked current process asked to wait on a second resource.
    #[error("already blocked on {blocked_on}, cannot wait on {requested}")]
    AlreadyBlocked {
        /// Resource the process is parked on.
        blocked_on: ResourceId,
        /// Resource named by the rejected request.
        requested: ResourceId,
    },
    /// Configuration failed validation.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
