//! In-memory command source for tests and benchmarks.

use std::collections::VecDeque;

use crate::core::{Command, CommandSource};

/// Replays a prepared list of commands.
#[derive(Debug, Clone, Default)]
pub struct VecCommandSource {
    commands: VecDeque<Command>,
}

impl VecCommandSource {
    /// Source yielding `commands` in order.
    pub fn new(commands: impl IntoIterator<Item = Command>) -> Self {
        Self {
            commands: commands.into_iter().collect(),
        }
    }

    /// Commands not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.commands.len()
    }
}

impl From<Vec<Command>> for VecCommandSource {
    fn from(commands: Vec<Command>) -> Self {
        Self::new(commands)
    }
}

impl CommandSource for VecCommandSource {
    fn next_command(&mut self) -> Option<Command> {
        self.commands.pop_front()
    }
}
