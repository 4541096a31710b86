//! Domain model for capabilities and skills.
//!
//! Capability names and skill tags are normalised (trimmed and lowercased)
//! before they are used as index keys.

mod capability;
mod name;

pub use capability::Capability;
pub use name::{CapabilityName, SkillTag, normalize_key};
