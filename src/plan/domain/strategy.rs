//! Execution strategies.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How the dispatcher schedules a plan's steps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStrategy {
    /// Steps run one at a time in declared order.
    Sequential,
    /// Ready steps run concurrently up to the parallelism bound.
    #[default]
    Parallel,
    /// Currently scheduled exactly like [`Self::Parallel`].
    Adaptive,
}

impl ExecutionStrategy {
    /// Interprets a strategy hint case-insensitively.
    ///
    /// Anything other than `sequential` or `adaptive` selects
    /// [`Self::Parallel`].
    ///
    /// # Examples
    ///
    /// ```
    /// use ensemble::plan::domain::ExecutionStrategy;
    ///
    /// assert_eq!(ExecutionStrategy::parse(" SEQUENTIAL "), ExecutionStrategy::Sequential);
    /// assert_eq!(ExecutionStrategy::parse("round-robin"), ExecutionStrategy::Parallel);
    /// ```
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "sequential" => Self::Sequential,
            "adaptive" => Self::Adaptive,
            _ => Self::Parallel,
        }
    }

    /// Returns the canonical lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sequential => "sequential",
            Self::Parallel => "parallel",
            Self::Adaptive => "adaptive",
        }
    }

    /// Returns `true` when ready steps may run concurrently.
    #[must_use]
    pub const fn is_concurrent(self) -> bool {
        matches!(self, Self::Parallel | Self::Adaptive)
    }
}

impl fmt::Display for ExecutionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
