//! Unit tests for the reasoning backend boundary.
