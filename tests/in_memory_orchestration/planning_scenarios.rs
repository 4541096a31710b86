//! Planning scenarios: heuristic decomposition, backend plans and the
//! coordinator's planning fallback.

use std::sync::Arc;
use std::time::Duration;

use super::helpers::{Harness, conversation, harness};
use ensemble::config::OrchestratorConfig;
use ensemble::conversation::domain::{ConversationContext, ConversationId};
use ensemble::coordinator::{domain::TaskRequest, services::Coordinator};
use ensemble::plan::domain::{ExecutionStrategy, PlanStep, PlanningError, has_cycle};
use ensemble::plan::ports::Planner;
use ensemble::plan::services::{HeuristicPlanner, ReasoningPlanner};
use ensemble::reasoning::adapters::memory::ScriptedReasoningBackend;
use ensemble::worker::adapters::memory::ScriptedWorker;
use mockable::DefaultClock;
use rstest::rstest;

fn skills_of(step: &PlanStep) -> Vec<String> {
    step.required_skills()
        .iter()
        .map(|skill| skill.as_str().to_owned())
        .collect()
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn heuristic_plan_orders_search_before_summarization(
    harness: Harness,
    conversation: ConversationContext,
) {
    harness.register("summarizer", &["summarization"], ScriptedWorker::replying("sum"));
    harness.register("searcher", &["search"], ScriptedWorker::replying("hits"));
    let planner = HeuristicPlanner::new(Arc::clone(&harness.registry), Arc::new(DefaultClock));

    let plan = planner
        .create_plan("summarize what a search for rust async turns up", &conversation)
        .await
        .expect("heuristic plan");

    let skills: Vec<Vec<String>> = plan.steps().iter().map(skills_of).collect();
    assert_eq!(
        skills,
        vec![vec!["search".to_owned()], vec!["summarization".to_owned()]]
    );
    assert_eq!(plan.strategy(), ExecutionStrategy::Sequential);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn heuristic_plan_defaults_without_available_skills(
    harness: Harness,
    conversation: ConversationContext,
) {
    let planner = HeuristicPlanner::new(Arc::clone(&harness.registry), Arc::new(DefaultClock));

    let plan = planner
        .create_plan("search and summarize the news", &conversation)
        .await
        .expect("default pipeline");

    let skills: Vec<Vec<String>> = plan.steps().iter().map(skills_of).collect();
    assert_eq!(
        skills,
        vec![vec!["planning".to_owned()], vec!["summarization".to_owned()]]
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn truncated_plan_json_is_a_planning_error(
    harness: Harness,
    conversation: ConversationContext,
) {
    let backend = ScriptedReasoningBackend::answering(r#"{"steps": [{"invalid": true}"#);
    let planner = ReasoningPlanner::new(
        Arc::clone(&harness.registry),
        Arc::new(backend),
        Arc::new(DefaultClock),
        Duration::from_secs(1),
    );

    let result = planner.create_plan("anything", &conversation).await;

    assert!(matches!(
        result,
        Err(PlanningError::MalformedPlan(_) | PlanningError::EmptyPlan)
    ));
}

#[rstest]
fn mutual_dependencies_form_a_cycle() {
    let steps = vec![
        PlanStep::new("a", "first").with_dependencies(["b"]),
        PlanStep::new("b", "second").with_dependencies(["a"]),
    ];

    assert!(has_cycle(&steps));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn coordinator_recovers_from_malformed_backend_plan(harness: Harness) {
    harness.register("searcher", &["search"], ScriptedWorker::replying("three results"));
    let backend = ScriptedReasoningBackend::answering("not a plan at all");
    let coordinator = Coordinator::with_default_planner(
        Arc::clone(&harness.registry),
        Arc::new(backend),
        Arc::new(harness.telemetry.clone()),
        Arc::new(DefaultClock),
        OrchestratorConfig::fast(),
    );

    let answer = coordinator
        .submit(TaskRequest::new(ConversationId::new(), "search for ferris"))
        .await
        .expect("heuristic fallback succeeds");

    assert_eq!(answer.text, "three results");
}
