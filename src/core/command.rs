//! Commands fed to the scheduler and tokens it produces, plus the
//! source/sink seams the adapters plug into.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One parsed command from the input stream.
///
/// Arguments stay close to the wire: resource names and priority levels
/// are validated by the scheduler so that bad values surface as `error`
/// tokens rather than being dropped by the parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    /// World reset (`init`).
    Init,
    /// `cr <pid> <priority>`.
    Create {
        /// New process id.
        pid: String,
        /// Raw priority level; only 1 and 2 are accepted.
        priority: u8,
    },
    /// `de <pid>`.
    Destroy {
        /// Target process id.
        pid: String,
    },
    /// `req <rid> <amount>`.
    Request {
        /// Resource name.
        rid: String,
        /// Units requested.
        amount: u32,
    },
    /// `rel <rid> <amount>`.
    Release {
        /// Resource name.
        rid: String,
        /// Units released.
        amount: u32,
    },
    /// `to`.
    TimeOut,
    /// A recognised command whose arguments failed to parse.
    Malformed {
        /// Command keyword.
        command: String,
        /// Parser diagnostic.
        reason: String,
    },
    /// `exit`: stop reading.
    Exit,
}

impl Command {
    /// Wire keyword of the command.
    #[must_use]
    pub fn keyword(&self) -> &str {
        match self {
            Self::Init => "init",
            Self::Create { .. } => "cr",
            Self::Destroy { .. } => "de",
            Self::Request { .. } => "req",
            Self::Release { .. } => "rel",
            Self::TimeOut => "to",
            Self::Malformed { command, .. } => command,
            Self::Exit => "exit",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create { pid, priority } => write!(f, "cr {pid} {priority}"),
            Self::Destroy { pid } => write!(f, "de {pid}"),
            Self::Request { rid, amount } => write!(f, "req {rid} {amount}"),
            Self::Release { rid, amount } => write!(f, "rel {rid} {amount}"),
            Self::Malformed { command, reason } => write!(f, "{command} <{reason}>"),
            other => f.write_str(other.keyword()),
        }
    }
}

/// One element of the output trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputToken {
    /// Id of the process running after a scheduling decision.
    Process(String),
    /// A rejected command.
    Error,
    /// Line break written ahead of a world reset.
    Boundary,
}

/// Pull side: yields parsed commands one at a time.
pub trait CommandSource {
    /// Next command, or `None` once the stream is exhausted.
    fn next_command(&mut self) -> Option<Command>;
}

/// Push side: accepts output tokens in order.
pub trait OutputSink {
    /// Append a token to the trace.
    fn emit(&mut self, token: OutputToken);
}

impl<S: CommandSource + ?Sized> CommandSource for &mut S {
    fn next_command(&mut self) -> Option<Command> {
        (**self).next_command()
    }
}

impl<S: CommandSource + ?Sized> CommandSource for Box<S> {
    fn next_command(&mut self) -> Option<Command> {
        (**self).next_command()
    }
}

impl<S: OutputSink + ?Sized> OutputSink for &mut S {
    fn emit(&mut self, token: OutputToken) {
        (**self).emit(token);
    }
}
