//! Then steps for orchestration BDD scenarios.

use super::world::OrchestrationWorld;
use eyre::eyre;
use rstest_bdd_macros::then;

#[then(r#"the answer contains "{first}" before "{second}""#)]
fn answer_orders_results(
    world: &OrchestrationWorld,
    first: String,
    second: String,
) -> Result<(), eyre::Report> {
    let text = world.answer_text()?;
    let first_at = text
        .find(&first)
        .ok_or_else(|| eyre!("answer lacks {first}: {text}"))?;
    let second_at = text
        .find(&second)
        .ok_or_else(|| eyre!("answer lacks {second}: {text}"))?;
    if first_at < second_at {
        Ok(())
    } else {
        Err(eyre!("expected {first} before {second} in {text}"))
    }
}

#[then(r#"the answer reports "{tally}""#)]
fn answer_reports_tally(world: &OrchestrationWorld, tally: String) -> Result<(), eyre::Report> {
    let text = world.answer_text()?;
    if text.contains(&tally) {
        Ok(())
    } else {
        Err(eyre!("expected tally {tally} in {text}"))
    }
}

#[then(r#"the answer is exactly "{expected}""#)]
fn answer_is_exactly(world: &OrchestrationWorld, expected: String) -> Result<(), eyre::Report> {
    let text = world.answer_text()?;
    if text == expected {
        Ok(())
    } else {
        Err(eyre!("expected answer {expected}, found {text}"))
    }
}

#[then(r#"an error event mentions "{fragment}""#)]
fn error_event_mentions(world: &OrchestrationWorld, fragment: String) -> Result<(), eyre::Report> {
    if world
        .telemetry
        .errors()
        .iter()
        .any(|message| message.contains(&fragment))
    {
        Ok(())
    } else {
        Err(eyre!("no error event mentions {fragment}"))
    }
}

#[then(r#"worker "{capability}" was invoked {count:usize} times"#)]
fn worker_invocations(
    world: &OrchestrationWorld,
    capability: String,
    count: usize,
) -> Result<(), eyre::Report> {
    let worker = world
        .workers
        .get(&capability)
        .ok_or_else(|| eyre!("unknown worker {capability}"))?;
    let invocations = worker.invocations();
    if invocations == count {
        Ok(())
    } else {
        Err(eyre!("expected {count} invocations of {capability}, found {invocations}"))
    }
}
