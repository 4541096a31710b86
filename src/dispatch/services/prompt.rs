//! Task text sent for each dispatched step.

use crate::plan::domain::{Plan, PlanStep, StepId};
use crate::worker::domain::StepOutput;
use std::collections::BTreeMap;

/// Builds the task text for `step`: its description, the original task and
/// the results it builds on.
///
/// Sequential plans pass every earlier completed step; concurrent plans pass
/// only the step's completed dependencies. Results appear in declaration
/// order.
#[must_use]
pub fn compose_step_prompt(
    plan: &Plan,
    step: &PlanStep,
    results: &BTreeMap<StepId, StepOutput>,
) -> String {
    let mut sections = vec![step.description().trim().to_owned()];

    let task = plan.task().trim();
    if !task.is_empty() && task != step.description().trim() {
        sections.push(format!("Original task: {task}"));
    }

    let position = plan
        .steps()
        .iter()
        .position(|candidate| candidate.id() == step.id())
        .unwrap_or_default();
    let earlier: Vec<String> = plan
        .steps()
        .iter()
        .enumerate()
        .filter(|(index, candidate)| {
            if plan.strategy().is_concurrent() {
                step.dependencies().contains(candidate.id())
            } else {
                *index < position
            }
        })
        .map(|(_, candidate)| candidate)
        .filter_map(|candidate| {
            results
                .get(candidate.id())
                .map(|output| format!("{}:\n{}", candidate.id().label(), output.text.trim()))
        })
        .collect();
    if !earlier.is_empty() {
        sections.push(format!(
            "Results from earlier steps:\n{}",
            earlier.join("\n\n")
        ));
    }

    sections.join("\n\n")
}
