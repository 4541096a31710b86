//! Normalised index keys.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Normalises a capability name or skill tag: trims surrounding whitespace
/// and lowercases.
///
/// # Examples
///
/// ```
/// use ensemble::registry::domain::normalize_key;
///
/// assert_eq!(normalize_key("  Summarization "), "summarization");
/// ```
#[must_use]
pub fn normalize_key(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Normalised capability name, the registry's primary lookup key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilityName(String);

impl CapabilityName {
    /// Creates a normalised capability name.
    #[must_use]
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(normalize_key(raw.as_ref()))
    }

    /// Returns `true` when the name is empty after normalisation.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for CapabilityName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for CapabilityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalised skill tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkillTag(String);

impl SkillTag {
    /// Creates a normalised skill tag.
    #[must_use]
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(normalize_key(raw.as_ref()))
    }

    /// Returns `true` when the tag is empty after normalisation.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the tag as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for SkillTag {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for SkillTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
