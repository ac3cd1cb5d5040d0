//! Command loop: pull a command, dispatch it, push its tokens.

use std::ops::ControlFlow;

use serde::{Deserialize, Serialize};

use crate::config::SimulatorConfig;
use crate::core::{CommandSource, ManagerError, OutputSink, OutputToken, SchedulerCore};

/// Totals for one [`Simulator::run`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Commands dispatched, `exit` excluded.
    pub commands: usize,
    /// Commands answered with `error`.
    pub errors: usize,
    /// Whether the run ended on `exit` rather than end of stream.
    pub exited: bool,
}

/// Owns a core together with its command source and output sink.
pub struct Simulator<C, S> {
    core: SchedulerCore,
    source: C,
    sink: S,
}

impl<C: CommandSource, S: OutputSink> Simulator<C, S> {
    /// Assemble from parts.
    pub const fn new(core: SchedulerCore, source: C, sink: S) -> Self {
        Self { core, source, sink }
    }

    /// Build a fresh core from `config`.
    pub fn from_config(config: SimulatorConfig, source: C, sink: S) -> Result<Self, ManagerError> {
        Ok(Self::new(SchedulerCore::new(config)?, source, sink))
    }

    /// Boot, then process commands until the source runs dry or `exit`.
    pub fn run(&mut self) -> RunSummary {
        let mut summary = RunSummary::default();
        let boot = self.core.boot();
        self.sink.emit(OutputToken::Process(boot));

        let mut counting = ErrorCounter {
            inner: &mut self.sink,
            errors: 0,
        };
        while let Some(command) = self.source.next_command() {
            if self.core.dispatch(&command, &mut counting).is_break() {
                summary.exited = true;
                break;
            }
            summary.commands += 1;
        }
        summary.errors = counting.errors;
        tracing::info!(
            "run finished: {} commands, {} errors",
            summary.commands,
            summary.errors
        );
        summary
    }

    /// Dispatch a single command without booting. `Break` on `exit`.
    pub fn step(&mut self, command: &crate::core::Command) -> ControlFlow<()> {
        self.core.dispatch(command, &mut self.sink)
    }

    /// The scheduler core.
    pub const fn core(&self) -> &SchedulerCore {
        &self.core
    }

    /// The output sink.
    pub const fn sink(&self) -> &S {
        &self.sink
    }

    /// Take the parts back.
    pub fn into_parts(self) -> (SchedulerCore, C, S) {
        (self.core, self.source, self.sink)
    }
}

struct ErrorCounter<'a, S: ?Sized> {
    inner: &'a mut S,
    errors: usize,
}

impl<S: OutputSink + ?Sized> OutputSink for ErrorCounter<'_, S> {
    fn emit(&mut self, token: OutputToken) {
        if token == OutputToken::Error {
            self.errors += 1;
        }
        self.inner.emit(token);
    }
}
