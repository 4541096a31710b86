//! Given steps for orchestration BDD scenarios.

use super::world::OrchestrationWorld;
use ensemble::conversation::domain::MAX_LOOPS_KEY;
use ensemble::plan::domain::{ExecutionStrategy, PlanStep};
use ensemble::worker::adapters::memory::ScriptedWorker;
use ensemble::worker::domain::WorkerReply;
use ensemble::worker::ports::WorkerHandle;
use rstest_bdd_macros::given;
use serde_json::json;

fn add_worker(
    world: &mut OrchestrationWorld,
    capability: &str,
    skills: &[&str],
    worker: ScriptedWorker,
) {
    let handle = WorkerHandle::from_transport(capability, worker.clone());
    world
        .registry
        .register_with_skills(&handle, capability, skills.iter().copied());
    world.workers.insert(capability.to_owned(), worker);
}

#[given(r#"a worker "{capability}" that replies "{text}""#)]
fn worker_replying(world: &mut OrchestrationWorld, capability: String, text: String) {
    add_worker(world, &capability, &[], ScriptedWorker::replying(text));
}

#[given(r#"a worker "{capability}" that fails with "{reason}""#)]
fn worker_failing(world: &mut OrchestrationWorld, capability: String, reason: String) {
    add_worker(world, &capability, &[], ScriptedWorker::failing(reason));
}

#[given(r#"a worker "{capability}" that drafts "{first}" before finishing with "{second}""#)]
fn worker_replying_twice(
    world: &mut OrchestrationWorld,
    capability: String,
    first: String,
    second: String,
) {
    let worker = ScriptedWorker::new()
        .with_reply(WorkerReply::completed(first))
        .with_reply(WorkerReply::completed(second));
    add_worker(world, &capability, &[], worker);
}

#[given(r#"a "{skill}" specialist "{capability}" that replies "{text}""#)]
fn specialist_worker(
    world: &mut OrchestrationWorld,
    skill: String,
    capability: String,
    text: String,
) {
    add_worker(world, &capability, &[skill.as_str()], ScriptedWorker::replying(text));
}

#[given(r#"the reasoning backend answers "{text}""#)]
fn backend_answers(world: &mut OrchestrationWorld, text: String) {
    world.backend = world.backend.clone().with_response(text);
}

#[given("the reasoning backend answers with a truncated plan")]
fn backend_truncated_plan(world: &mut OrchestrationWorld) {
    world.backend = world
        .backend
        .clone()
        .with_response(r#"{"steps": [{"invalid": true}"#);
}

#[given("a retry budget of {loops:u32} loops")]
fn retry_budget(world: &mut OrchestrationWorld, loops: u32) {
    world.conversation = world
        .conversation
        .clone()
        .with_metadata_entry(MAX_LOOPS_KEY, json!(loops));
}

#[given(r#"a sequential plan step "{step}" for capability "{capability}""#)]
fn sequential_step(world: &mut OrchestrationWorld, step: String, capability: String) {
    world.strategy = ExecutionStrategy::Sequential;
    world
        .steps
        .push(PlanStep::new(&step, format!("run {step}")).with_target_capability(capability));
}

#[given(r#"a dependent plan step "{step}" for capability "{capability}" after "{dependency}""#)]
fn dependent_step(
    world: &mut OrchestrationWorld,
    step: String,
    capability: String,
    dependency: String,
) {
    world.strategy = ExecutionStrategy::Sequential;
    world.steps.push(
        PlanStep::new(&step, format!("run {step}"))
            .with_target_capability(capability)
            .with_dependencies([dependency]),
    );
}

#[given(r#"a parallel plan step "{step}" for capability "{capability}""#)]
fn parallel_step(world: &mut OrchestrationWorld, step: String, capability: String) {
    world.strategy = ExecutionStrategy::Parallel;
    world
        .steps
        .push(PlanStep::new(&step, format!("run {step}")).with_target_capability(capability));
}
