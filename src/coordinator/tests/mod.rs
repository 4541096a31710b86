//! Unit tests for the coordinator context.
