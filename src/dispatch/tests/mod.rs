//! Unit tests for plan execution.

mod aggregate_tests;
mod support;
