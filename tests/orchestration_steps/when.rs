//! When steps for orchestration BDD scenarios.

use std::sync::Arc;

use super::world::{OrchestrationWorld, run_async};
use ensemble::config::OrchestratorConfig;
use ensemble::coordinator::{domain::TaskRequest, services::Coordinator};
use ensemble::dispatch::services::Dispatcher;
use ensemble::plan::domain::Plan;
use eyre::WrapErr;
use mockable::DefaultClock;
use rstest_bdd_macros::when;

#[when("the plan is executed")]
fn execute_plan(world: &mut OrchestrationWorld) -> Result<(), eyre::Report> {
    let plan = Plan::new(
        world.conversation.id(),
        "scenario task",
        world.steps.clone(),
        world.strategy,
        &DefaultClock,
    )
    .wrap_err("build scenario plan")?;
    let dispatcher = Dispatcher::new(
        Arc::clone(&world.registry),
        Arc::new(world.backend.clone()),
        Arc::new(world.telemetry.clone()),
        Arc::new(DefaultClock),
        OrchestratorConfig::fast(),
    );

    world.outcome = Some(run_async(
        dispatcher.execute(plan, world.conversation.clone()),
    ));
    Ok(())
}

#[when(r#"the task "{text}" is submitted"#)]
fn submit_task(world: &mut OrchestrationWorld, text: String) {
    let coordinator = Coordinator::with_default_planner(
        Arc::clone(&world.registry),
        Arc::new(world.backend.clone()),
        Arc::new(world.telemetry.clone()),
        Arc::new(DefaultClock),
        OrchestratorConfig::fast(),
    );
    world.outcome = Some(run_async(
        coordinator.submit(TaskRequest::new(world.conversation.id(), text)),
    ));
}
