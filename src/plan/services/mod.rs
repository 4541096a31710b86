//! Planner implementations.

mod fallback;
mod heuristic;
mod parser;
mod prompt;
mod reasoning;

pub use fallback::FallbackPlanner;
pub use heuristic::{DEFAULT_PIPELINE, HeuristicPlanner, SKILL_KEYWORDS};
pub use parser::parse_plan_response;
pub use prompt::render_planning_prompt;
pub use reasoning::{PLANNER_SYSTEM_PROMPT, ReasoningPlanner};
