//! Builders to construct schedulers and simulators from configuration.

use crate::config::SimulatorConfig;
use crate::core::{AuditSink, CommandSource, ManagerError, OutputSink, SchedulerCore};
use crate::runtime::Simulator;

/// Build a scheduler core from configuration.
pub fn build_core(cfg: &SimulatorConfig) -> Result<SchedulerCore, ManagerError> {
    SchedulerCore::new(cfg.clone())
}

/// Fluent assembly of a [`SchedulerCore`] or full [`Simulator`].
pub struct SimulatorBuilder {
    config: SimulatorConfig,
    audit: Option<Box<dyn AuditSink>>,
}

impl SimulatorBuilder {
    /// Start from `config`.
    #[must_use]
    pub fn new(config: SimulatorConfig) -> Self {
        Self {
            config,
            audit: None,
        }
    }

    /// Configuration collected so far.
    #[must_use]
    pub const fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Override the pool size.
    #[must_use]
    pub fn max_processes(mut self, max_processes: usize) -> Self {
        self.config.max_processes = max_processes;
        self
    }

    /// Override the root process id.
    #[must_use]
    pub fn init_pid(mut self, pid: impl Into<String>) -> Self {
        self.config.init_pid = pid.into();
        self
    }

    /// Record one audit event per command.
    #[must_use]
    pub fn with_audit(mut self, audit: Box<dyn AuditSink>) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Validate and build the core alone.
    pub fn build_core(self) -> Result<SchedulerCore, ManagerError> {
        let core = build_core(&self.config)?;
        Ok(match self.audit {
            Some(audit) => core.with_audit(audit),
            None => core,
        })
    }

    /// Validate and wire a simulator around `source` and `sink`.
    pub fn build<C, S>(self, source: C, sink: S) -> Result<Simulator<C, S>, ManagerError>
    where
        C: CommandSource,
        S: OutputSink,
    {
        Ok(Simulator::new(self.build_core()?, source, sink))
    }
}

impl Default for SimulatorBuilder {
    fn default() -> Self {
        Self::new(SimulatorConfig::default())
    }
}
