//! Capability descriptors advertised by workers.

use super::{CapabilityName, SkillTag};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A named, addressable unit of work execution.
///
/// # Examples
///
/// ```
/// use ensemble::registry::domain::Capability;
///
/// let capability = Capability::new(" Summarizer ")
///     .with_kind("llm")
///     .with_skills(["Summarization", "  digest "]);
///
/// assert_eq!(capability.name().as_str(), "summarizer");
/// assert!(capability.skills().iter().any(|skill| skill.as_str() == "digest"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capability {
    name: CapabilityName,
    kind: Option<String>,
    skills: BTreeSet<SkillTag>,
    config: BTreeMap<String, String>,
}

impl Capability {
    /// Creates a capability with no skills, kind or configuration.
    #[must_use]
    pub fn new(name: impl AsRef<str>) -> Self {
        Self {
            name: CapabilityName::new(name),
            kind: None,
            skills: BTreeSet::new(),
            config: BTreeMap::new(),
        }
    }

    /// Sets the informational category.
    #[must_use]
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    /// Adds skill tags; empty tags are ignored after normalisation.
    #[must_use]
    pub fn with_skills<I, S>(mut self, skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.skills.extend(
            skills
                .into_iter()
                .map(SkillTag::new)
                .filter(|skill| !skill.is_empty()),
        );
        self
    }

    /// Adds a configuration entry.
    #[must_use]
    pub fn with_config(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.insert(key.into(), value.into());
        self
    }

    /// Returns the normalised capability name.
    #[must_use]
    pub const fn name(&self) -> &CapabilityName {
        &self.name
    }

    /// Returns the informational category, if declared.
    #[must_use]
    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    /// Returns the declared skill tags.
    #[must_use]
    pub const fn skills(&self) -> &BTreeSet<SkillTag> {
        &self.skills
    }

    /// Returns the free-form configuration.
    #[must_use]
    pub const fn config(&self) -> &BTreeMap<String, String> {
        &self.config
    }
}
