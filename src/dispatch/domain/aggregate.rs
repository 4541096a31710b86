//! Deterministic merge of step results.

use crate::plan::domain::{Plan, StepId};
use crate::worker::domain::StepOutput;
use std::collections::BTreeMap;

/// Concatenates step results in plan declaration order, each under a label
/// derived from its step id, followed by a `<completed>/<total> steps
/// completed` tally.
///
/// Steps without a result are left out of the body but still count toward
/// the total. The output does not depend on the order results arrived in.
///
/// # Examples
///
/// ```
/// use ensemble::conversation::domain::ConversationId;
/// use ensemble::dispatch::domain::aggregate;
/// use ensemble::plan::domain::{ExecutionStrategy, Plan, PlanStep, StepId};
/// use ensemble::worker::domain::StepOutput;
/// use mockable::DefaultClock;
/// use std::collections::BTreeMap;
///
/// let plan = Plan::new(
///     ConversationId::new(),
///     "task",
///     vec![PlanStep::new("step-1", "a"), PlanStep::new("step-2", "b")],
///     ExecutionStrategy::Parallel,
///     &DefaultClock,
/// )
/// .expect("valid plan");
/// let results = BTreeMap::from([(StepId::new("step-2"), StepOutput::new("B-OK"))]);
///
/// assert_eq!(aggregate(&plan, &results), "Step 2:\nB-OK\n\n1/2 steps completed");
/// ```
#[must_use]
pub fn aggregate(plan: &Plan, results: &BTreeMap<StepId, StepOutput>) -> String {
    let sections: Vec<String> = plan
        .steps()
        .iter()
        .filter_map(|step| {
            results
                .get(step.id())
                .map(|output| format!("{}:\n{}", step.id().label(), output.text.trim()))
        })
        .collect();
    let tally = format!(
        "{}/{} steps completed",
        sections.len(),
        plan.steps().len()
    );

    if sections.is_empty() {
        tally
    } else {
        format!("{}\n\n{tally}", sections.join("\n\n"))
    }
}
