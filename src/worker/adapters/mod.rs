//! Adapter implementations for worker transport ports.

pub mod memory;
