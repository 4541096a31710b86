//! Unit tests for plans and planners.

mod heuristic_tests;
