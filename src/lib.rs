//! Ensemble: multi-agent task orchestration.
//!
//! A coordinator accepts free-text tasks on behalf of conversations, turns
//! each task into a plan of dependent steps, dispatches the steps to workers
//! discovered through a capability registry, and aggregates their results
//! into one answer. Steps with no matching worker run locally on a
//! reasoning backend; failed or unsatisfactory results are refined within a
//! bounded attempt budget.
//!
//! # Architecture
//!
//! Ensemble follows hexagonal architecture principles:
//!
//! - **Domain**: Pure types and invariants with no infrastructure dependencies
//! - **Ports**: Async trait interfaces for workers, reasoning backends,
//!   planners and telemetry sinks
//! - **Adapters**: In-memory and tracing implementations of those ports
//!
//! # Modules
//!
//! - [`registry`]: Capability and skill discovery for workers
//! - [`plan`]: Plan model, validation and planners
//! - [`dispatch`]: Per-conversation execution state machine and aggregation
//! - [`coordinator`]: Task acceptance and conversation history
//! - [`conversation`], [`worker`], [`reasoning`], [`telemetry`]: Supporting
//!   contexts
//! - [`config`]: Timeouts, parallelism and retry budgets

pub mod config;
pub mod conversation;
pub mod coordinator;
pub mod dispatch;
pub mod plan;
pub mod reasoning;
pub mod registry;
pub mod telemetry;
pub mod worker;
