//! Unit tests for keyword-driven planning.

use std::sync::Arc;

use crate::conversation::domain::{ConversationContext, ConversationId};
use crate::plan::domain::{ExecutionStrategy, Plan};
use crate::plan::ports::Planner;
use crate::plan::services::HeuristicPlanner;
use crate::registry::services::CapabilityRegistry;
use crate::worker::{adapters::memory::ScriptedWorker, ports::WorkerHandle};
use mockable::DefaultClock;
use rstest::{fixture, rstest};

#[fixture]
fn registry() -> Arc<CapabilityRegistry> {
    Arc::new(CapabilityRegistry::new())
}

fn register(registry: &CapabilityRegistry, capability: &str, skills: &[&str]) {
    let handle = WorkerHandle::from_transport(capability, ScriptedWorker::replying("ok"));
    registry.register_with_skills(&handle, capability, skills.iter().copied());
}

fn skills_of(plan: &Plan) -> Vec<String> {
    plan.steps()
        .iter()
        .flat_map(|step| step.required_skills().iter().map(|skill| skill.as_str().to_owned()))
        .collect()
}

async fn plan_for(registry: Arc<CapabilityRegistry>, task: &str) -> Plan {
    let planner = HeuristicPlanner::new(registry, Arc::new(DefaultClock));
    let context = ConversationContext::new(ConversationId::new());
    planner
        .create_plan(task, &context)
        .await
        .expect("heuristic planning never fails")
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn search_precedes_summarization_when_both_available(registry: Arc<CapabilityRegistry>) {
    register(&registry, "searcher", &["search"]);
    register(&registry, "summarizer", &["summarization"]);

    let plan = plan_for(registry, "Summarize what you find when you search for Rust news").await;

    assert_eq!(skills_of(&plan), vec!["search", "summarization"]);
    assert_eq!(plan.strategy(), ExecutionStrategy::Sequential);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn steps_form_a_linear_chain(registry: Arc<CapabilityRegistry>) {
    register(&registry, "searcher", &["search"]);
    register(&registry, "analyst", &["analysis"]);
    register(&registry, "summarizer", &["summarization"]);

    let plan = plan_for(registry, "search, analyse and summarise the market").await;

    let chain: Vec<(String, Vec<String>)> = plan
        .steps()
        .iter()
        .map(|step| {
            (
                step.id().to_string(),
                step.dependencies().iter().map(ToString::to_string).collect(),
            )
        })
        .collect();
    assert_eq!(
        chain,
        vec![
            ("step-1".to_owned(), vec![]),
            ("step-2".to_owned(), vec!["step-1".to_owned()]),
            ("step-3".to_owned(), vec!["step-2".to_owned()]),
        ]
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unavailable_skills_fall_back_to_default_pipeline(registry: Arc<CapabilityRegistry>) {
    let plan = plan_for(registry, "search the web and summarize the results").await;

    assert_eq!(skills_of(&plan), vec!["planning", "summarization"]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unavailable_skills_are_dropped(registry: Arc<CapabilityRegistry>) {
    register(&registry, "summarizer", &["summarization"]);

    let plan = plan_for(registry, "search the web and summarize the results").await;

    assert_eq!(skills_of(&plan), vec!["summarization"]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn capability_name_counts_as_availability(registry: Arc<CapabilityRegistry>) {
    register(&registry, "search", &[]);

    let plan = plan_for(registry, "search for flights").await;

    assert_eq!(skills_of(&plan), vec!["search"]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn empty_task_yields_single_generic_step(registry: Arc<CapabilityRegistry>) {
    let plan = plan_for(registry, "   ").await;

    assert_eq!(plan.steps().len(), 1);
    assert!(!plan.steps().iter().any(|step| step.description().is_empty()));
}

#[rstest]
#[case::explain_is_not_plan("Summarize the findings and explain them", vec!["summarization"])]
#[case::stems_match_inflections("Analysing and summarising the report", vec!["analysis", "summarization"])]
#[case::multi_word_keyword("Look up the weather", vec!["search"])]
#[case::research_is_search("Do some research on crabs", vec!["search"])]
#[tokio::test(flavor = "multi_thread")]
async fn keywords_match_words_not_substrings(
    registry: Arc<CapabilityRegistry>,
    #[case] task: &str,
    #[case] expected: Vec<&str>,
) {
    for skill in ["planning", "search", "analysis", "summarization"] {
        register(&registry, skill, &[skill]);
    }

    let plan = plan_for(registry, task).await;

    assert_eq!(skills_of(&plan), expected);
}
