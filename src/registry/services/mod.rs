//! Registry services.

mod registry;

pub use registry::CapabilityRegistry;
