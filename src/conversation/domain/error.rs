//! Error types for conversation domain parsing.

use thiserror::Error;

/// Error returned while parsing a message role from text.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown message role: {0}")]
pub struct ParseRoleError(pub String);
