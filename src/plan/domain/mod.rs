//! Domain model for plans and steps.

mod error;
mod ids;
mod plan;
mod step;
mod strategy;

pub use error::PlanningError;
pub use ids::{PlanId, StepId};
pub use plan::{DEFAULT_MAX_PARALLELISM, Plan, has_cycle};
pub use step::{PlanStep, StepStatus};
pub use strategy::ExecutionStrategy;
