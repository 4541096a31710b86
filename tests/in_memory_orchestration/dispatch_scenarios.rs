//! Dispatch scenarios driven through the public dispatcher.

use super::helpers::{Harness, conversation, harness, plan_for};
use ensemble::conversation::domain::{ConversationContext, MAX_LOOPS_KEY};
use ensemble::plan::domain::{ExecutionStrategy, PlanStep};
use ensemble::telemetry::domain::TelemetryEvent;
use ensemble::worker::adapters::memory::ScriptedWorker;
use ensemble::worker::domain::{StepOutput, WorkerReply};
use rstest::rstest;
use serde_json::json;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn sequential_success_aggregates_both_results(
    harness: Harness,
    conversation: ConversationContext,
) {
    harness.register("a1", &[], ScriptedWorker::replying("A-OK"));
    harness.register("a2", &[], ScriptedWorker::replying("B-OK"));
    let plan = plan_for(
        &conversation,
        ExecutionStrategy::Sequential,
        vec![
            PlanStep::new("step-1", "first").with_target_capability("a1"),
            PlanStep::new("step-2", "second")
                .with_target_capability("a2")
                .with_dependencies(["step-1"]),
        ],
    );

    let answer = harness
        .dispatcher()
        .execute(plan, conversation)
        .await
        .expect("sequential plan succeeds");

    let first = answer.text.find("A-OK").expect("first result present");
    let second = answer.text.find("B-OK").expect("second result present");
    assert!(first < second);
    assert!(answer.text.ends_with("2/2 steps completed"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn missing_worker_falls_back_to_backend(harness: Harness, conversation: ConversationContext) {
    let plan = plan_for(
        &conversation,
        ExecutionStrategy::Sequential,
        vec![PlanStep::new("step-1", "answer").with_target_capability("nobody")],
    );

    let answer = harness
        .dispatcher()
        .execute(plan, conversation)
        .await
        .expect("local fallback succeeds");

    assert_eq!(answer.text, "backend answer");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn parallel_partial_failure_reports_tally(
    harness: Harness,
    conversation: ConversationContext,
) {
    harness.register("ok", &[], ScriptedWorker::replying("OK step"));
    harness.register("ko", &[], ScriptedWorker::failing("worker crashed"));
    let plan = plan_for(
        &conversation,
        ExecutionStrategy::Parallel,
        vec![
            PlanStep::new("good", "succeed").with_target_capability("ok"),
            PlanStep::new("bad", "fail").with_target_capability("ko"),
        ],
    );

    let answer = harness
        .dispatcher()
        .execute(plan, conversation)
        .await
        .expect("partial success");

    assert!(answer.text.contains("OK step"));
    assert!(answer.text.contains("1/2"));
    assert!(
        harness
            .telemetry
            .errors()
            .iter()
            .any(|message| message.contains("bad"))
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn refinement_loop_runs_until_done(harness: Harness, conversation: ConversationContext) {
    let worker = ScriptedWorker::new()
        .with_reply(WorkerReply::completed("first pass"))
        .with_reply(WorkerReply::completed("second pass [done]"));
    harness.register("writer", &[], worker.clone());
    let budgeted = conversation.with_metadata_entry(MAX_LOOPS_KEY, json!(2));
    let plan = plan_for(
        &budgeted,
        ExecutionStrategy::Sequential,
        vec![PlanStep::new("step-1", "write").with_target_capability("writer")],
    );

    let answer = harness
        .dispatcher()
        .execute(plan, budgeted)
        .await
        .expect("refined answer");

    assert_eq!(answer.text, "second pass [done]");
    assert_eq!(worker.invocations(), 2);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn satisfied_metadata_stops_refinement(harness: Harness, conversation: ConversationContext) {
    let worker = ScriptedWorker::new().with_reply(WorkerReply::completed_with(
        StepOutput::new("good enough").satisfied(),
    ));
    harness.register("writer", &[], worker.clone());
    let budgeted = conversation.with_metadata_entry(MAX_LOOPS_KEY, json!(5));
    let plan = plan_for(
        &budgeted,
        ExecutionStrategy::Sequential,
        vec![PlanStep::new("step-1", "write").with_target_capability("writer")],
    );

    let answer = harness
        .dispatcher()
        .execute(plan, budgeted)
        .await
        .expect("satisfied answer");

    assert_eq!(answer.text, "good enough");
    assert_eq!(worker.invocations(), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn skill_matched_worker_receives_step(harness: Harness, conversation: ConversationContext) {
    let searcher = ScriptedWorker::replying("found it");
    harness.register("librarian", &["search"], searcher.clone());
    let plan = plan_for(
        &conversation,
        ExecutionStrategy::Parallel,
        vec![PlanStep::new("lookup", "look it up").with_skills(["search"])],
    );

    let answer = harness
        .dispatcher()
        .execute(plan, conversation)
        .await
        .expect("skill match succeeds");

    assert_eq!(answer.text, "found it");
    assert_eq!(searcher.invocations(), 1);
    assert!(harness.telemetry.events().iter().any(|event| matches!(
        event,
        TelemetryEvent::StepDispatched { capability, .. } if capability == "librarian"
    )));
}
