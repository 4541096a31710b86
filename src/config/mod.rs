//! Orchestrator configuration.
//!
//! Timeouts, the parallelism bound and retry budgets shared by every
//! conversation. Per-conversation metadata (`maxLoops`) may narrow or widen
//! the retry budget for a single task.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::conversation::domain::ConversationContext;

/// Errors returned when loading or validating configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The configuration document could not be parsed.
    #[error("invalid orchestrator configuration: {0}")]
    Parse(String),

    /// A field holds a value the orchestrator cannot run with.
    #[error("configuration field {field} must be greater than zero")]
    Zero {
        /// The offending field, in its serialised spelling.
        field: &'static str,
    },
}

/// Tunables for planning and dispatch.
///
/// # Examples
///
/// ```
/// use ensemble::config::OrchestratorConfig;
///
/// let config = OrchestratorConfig::from_json_str(r#"{"maxLoops": 3}"#).expect("valid");
/// assert_eq!(config.max_loops, 3);
/// assert_eq!(config.max_parallelism, 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrchestratorConfig {
    /// Timeout for each worker call, in milliseconds.
    pub worker_timeout_ms: u64,
    /// Timeout for each reasoning backend call, in milliseconds.
    pub backend_timeout_ms: u64,
    /// Upper bound on concurrently running steps.
    pub max_parallelism: usize,
    /// Full-plan passes allowed per task, including the first.
    pub max_loops: u32,
    /// Clarification rounds allowed per step dispatch.
    pub max_clarification_rounds: u32,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            worker_timeout_ms: 30_000,
            backend_timeout_ms: 60_000,
            max_parallelism: 4,
            max_loops: 1,
            max_clarification_rounds: 2,
        }
    }
}

impl OrchestratorConfig {
    /// Creates a configuration with short timeouts for tests and local runs.
    #[must_use]
    pub const fn fast() -> Self {
        Self {
            worker_timeout_ms: 2_000,
            backend_timeout_ms: 2_000,
            max_parallelism: 4,
            max_loops: 1,
            max_clarification_rounds: 2,
        }
    }

    /// Parses a JSON document; missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the document is not valid JSON for this
    /// shape or fails [`Self::validate`].
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(raw).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that no timeout, bound or budget is zero.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Zero`] naming the first zero field.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.worker_timeout_ms == 0 {
            return Err(ConfigError::Zero {
                field: "workerTimeoutMs",
            });
        }
        if self.backend_timeout_ms == 0 {
            return Err(ConfigError::Zero {
                field: "backendTimeoutMs",
            });
        }
        if self.max_parallelism == 0 {
            return Err(ConfigError::Zero {
                field: "maxParallelism",
            });
        }
        if self.max_loops == 0 {
            return Err(ConfigError::Zero { field: "maxLoops" });
        }
        Ok(())
    }

    /// Sets the worker call timeout.
    #[must_use]
    pub const fn with_worker_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.worker_timeout_ms = timeout_ms;
        self
    }

    /// Sets the reasoning backend call timeout.
    #[must_use]
    pub const fn with_backend_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.backend_timeout_ms = timeout_ms;
        self
    }

    /// Sets the parallelism bound.
    #[must_use]
    pub const fn with_max_parallelism(mut self, max_parallelism: usize) -> Self {
        self.max_parallelism = max_parallelism;
        self
    }

    /// Sets the default full-plan pass budget.
    #[must_use]
    pub const fn with_max_loops(mut self, max_loops: u32) -> Self {
        self.max_loops = max_loops;
        self
    }

    /// Sets the clarification round limit.
    #[must_use]
    pub const fn with_max_clarification_rounds(mut self, rounds: u32) -> Self {
        self.max_clarification_rounds = rounds;
        self
    }

    /// Returns the worker call timeout.
    #[must_use]
    pub const fn worker_timeout(&self) -> Duration {
        Duration::from_millis(self.worker_timeout_ms)
    }

    /// Returns the reasoning backend call timeout.
    #[must_use]
    pub const fn backend_timeout(&self) -> Duration {
        Duration::from_millis(self.backend_timeout_ms)
    }

    /// Returns the pass budget for a conversation: its `maxLoops` metadata
    /// when present, otherwise [`Self::max_loops`], never below one.
    #[must_use]
    pub fn max_attempts_for(&self, context: &ConversationContext) -> u32 {
        context.max_loops().unwrap_or(self.max_loops).max(1)
    }
}
