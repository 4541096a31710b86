//! Unit tests for the worker boundary.
