//! Unit tests for conversation domain types.

mod domain_tests;
