//! Adapter implementations for the reasoning backend port.

pub mod memory;
