//! Port contracts for plan construction.

pub mod planner;

#[cfg(test)]
pub use planner::MockPlanner;
pub use planner::{Planner, PlanningResult};
