//! Simulator configuration structures.

use serde::{Deserialize, Serialize};

/// Default number of process slots, root process included.
pub const DEFAULT_MAX_PROCESSES: usize = 64;

/// Knobs for one simulator instance. The resource catalog is fixed and
/// deliberately absent here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Size of the process pool, including the root process.
    pub max_processes: usize,
    /// Id given to the protected root process on every reset.
    pub init_pid: String,
    /// Token written for a rejected command.
    pub error_token: String,
    /// Text written after every trace token.
    pub separator: String,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            max_processes: DEFAULT_MAX_PROCESSES,
            init_pid: "init".into(),
            error_token: "error".into(),
            separator: " ".into(),
        }
    }
}

impl SimulatorConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_processes == 0 {
            return Err("max_processes must be greater than 0".into());
        }
        if self.init_pid.is_empty() || self.init_pid.chars().any(char::is_whitespace) {
            return Err("init_pid must be a single non-empty token".into());
        }
        if self.error_token.is_empty() {
            return Err("error_token must not be empty".into());
        }
        Ok(())
    }

    /// Parse simulator configuration from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Defaults overridden by `PROCSIM_MAX_PROCESSES` and `PROCSIM_INIT_PID`.
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(raw) = lookup("PROCSIM_MAX_PROCESSES") {
            cfg.max_processes = raw
                .trim()
                .parse()
                .map_err(|e| format!("PROCSIM_MAX_PROCESSES `{raw}`: {e}"))?;
        }
        if let Some(pid) = lookup("PROCSIM_INIT_PID") {
            cfg.init_pid = pid.trim().to_string();
        }
        cfg.validate()?;
        Ok(cfg)
    }
}
