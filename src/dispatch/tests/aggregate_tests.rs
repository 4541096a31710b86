//! Unit tests for aggregation and the satisfaction policy.

use std::collections::BTreeMap;

use super::support::plan;
use crate::conversation::domain::ConversationId;
use crate::dispatch::domain::{aggregate, is_satisfactory};
use crate::plan::domain::{ExecutionStrategy, PlanStep, StepId};
use crate::worker::domain::StepOutput;
use rstest::rstest;
use serde_json::json;

#[rstest]
fn aggregate_follows_declaration_order_not_key_order() {
    let plan = plan(
        ConversationId::new(),
        ExecutionStrategy::Parallel,
        vec![
            PlanStep::new("zeta", "last alphabetically, first declared"),
            PlanStep::new("alpha", "first alphabetically"),
        ],
    );
    let mut results = BTreeMap::new();
    results.insert(StepId::new("alpha"), StepOutput::new("second"));
    results.insert(StepId::new("zeta"), StepOutput::new("first"));

    assert_eq!(
        aggregate(&plan, &results),
        "Zeta:\nfirst\n\nAlpha:\nsecond\n\n2/2 steps completed"
    );
}

#[rstest]
fn aggregate_skips_missing_results_but_counts_them() {
    let plan = plan(
        ConversationId::new(),
        ExecutionStrategy::Parallel,
        vec![
            PlanStep::new("step-1", "a"),
            PlanStep::new("step-2", "b"),
            PlanStep::new("step-3", "c"),
        ],
    );
    let results = BTreeMap::from([(StepId::new("step-3"), StepOutput::new("OK step"))]);

    let text = aggregate(&plan, &results);

    assert!(text.starts_with("Step 3:\nOK step"));
    assert!(text.ends_with("1/3 steps completed"));
    assert!(!text.contains("Step 1"));
}

#[rstest]
fn aggregate_ignores_results_for_unknown_steps() {
    let plan = plan(
        ConversationId::new(),
        ExecutionStrategy::Parallel,
        vec![PlanStep::new("step-1", "a")],
    );
    let results = BTreeMap::from([(StepId::new("stray"), StepOutput::new("noise"))]);

    assert_eq!(aggregate(&plan, &results), "0/1 steps completed");
}

#[rstest]
#[case(StepOutput::new("finished [done]"), true)]
#[case(StepOutput::new("Finished [DoNe]."), true)]
#[case(StepOutput::new("done"), false)]
#[case(StepOutput::new("draft").satisfied(), true)]
#[case(StepOutput::new("draft").with_metadata("satisfied", json!(false)), false)]
#[case(StepOutput::new("draft").with_metadata("satisfied", json!("true")), false)]
fn satisfaction_policy(#[case] output: StepOutput, #[case] expected: bool) {
    assert_eq!(is_satisfactory(Some(&output)), expected);
}

#[rstest]
fn missing_result_is_not_satisfactory() {
    assert!(!is_satisfactory(None));
}
