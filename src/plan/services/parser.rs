//! Parsing structured plans out of free-text completions.

use crate::conversation::domain::ConversationId;
use crate::plan::domain::{
    DEFAULT_MAX_PARALLELISM, ExecutionStrategy, Plan, PlanStep, PlanningError, StepId,
};
use mockable::Clock;
use serde_json::{Map, Value};
use tracing::debug;

const ID_FIELDS: &[&str] = &["id", "stepId", "step_id"];
const DESCRIPTION_FIELDS: &[&str] = &["description", "task", "instruction", "prompt"];
const SKILL_FIELDS: &[&str] = &["skills", "requiredSkills", "required_skills"];
const DEPENDENCY_FIELDS: &[&str] = &["dependencies", "dependsOn", "depends_on"];
const TARGET_FIELDS: &[&str] = &[
    "targetCapability",
    "target_capability",
    "capability",
    "agent",
    "targetAgent",
];
const PARALLELISM_FIELDS: &[&str] = &["maxParallelism", "max_parallelism"];

/// Parses a reasoning backend completion into a validated [`Plan`].
///
/// Surrounding prose and code fences are tolerated: only the text between
/// the first `{` and the last `}` is read. Steps without a description are
/// dropped; steps without an id are numbered by position.
///
/// # Errors
///
/// Returns [`PlanningError::MalformedPlan`] when no JSON object can be read
/// or it lacks a `steps` array, [`PlanningError::EmptyPlan`] when no step
/// survives, and any validation error from [`Plan::new`].
///
/// # Examples
///
/// ```
/// use ensemble::conversation::domain::ConversationId;
/// use ensemble::plan::{domain::PlanningError, services::parse_plan_response};
/// use mockable::DefaultClock;
///
/// let truncated = r#"{"steps": [{"invalid": true}"#;
/// let outcome = parse_plan_response(truncated, ConversationId::new(), "task", &DefaultClock);
/// assert!(matches!(outcome, Err(PlanningError::MalformedPlan(_))));
/// ```
pub fn parse_plan_response(
    response: &str,
    conversation_id: ConversationId,
    task: &str,
    clock: &impl Clock,
) -> Result<Plan, PlanningError> {
    let document = extract_object(response)?;
    let root: Value = serde_json::from_str(document)
        .map_err(|err| PlanningError::MalformedPlan(err.to_string()))?;
    let object = root
        .as_object()
        .ok_or_else(|| PlanningError::MalformedPlan("plan is not a JSON object".to_owned()))?;
    let raw_steps = object
        .get("steps")
        .and_then(Value::as_array)
        .ok_or_else(|| PlanningError::MalformedPlan("missing steps array".to_owned()))?;

    let mut steps = Vec::with_capacity(raw_steps.len());
    for (index, raw_step) in raw_steps.iter().enumerate() {
        match raw_step.as_object().map(|fields| parse_step(index + 1, fields)) {
            Some(Some(step)) => steps.push(step),
            _ => debug!(position = index + 1, "dropping unusable plan step"),
        }
    }
    if steps.is_empty() {
        return Err(PlanningError::EmptyPlan);
    }

    let strategy = object
        .get("strategy")
        .and_then(Value::as_str)
        .map_or_else(ExecutionStrategy::default, ExecutionStrategy::parse);
    let max_parallelism = first_present(object, PARALLELISM_FIELDS)
        .and_then(Value::as_u64)
        .and_then(|bound| usize::try_from(bound).ok())
        .unwrap_or(DEFAULT_MAX_PARALLELISM);

    Ok(Plan::new(conversation_id, task, steps, strategy, clock)?
        .with_max_parallelism(max_parallelism))
}

fn extract_object(response: &str) -> Result<&str, PlanningError> {
    let start = response.find('{');
    let end = response.rfind('}');
    match (start, end) {
        (Some(open), Some(close)) if open < close => response
            .get(open..=close)
            .ok_or_else(|| PlanningError::MalformedPlan("invalid object bounds".to_owned())),
        _ => Err(PlanningError::MalformedPlan(
            "no JSON object found in response".to_owned(),
        )),
    }
}

fn parse_step(position: usize, fields: &Map<String, Value>) -> Option<PlanStep> {
    let description = first_present(fields, DESCRIPTION_FIELDS).and_then(text_of)?;
    let id = first_present(fields, ID_FIELDS)
        .and_then(text_of)
        .map_or_else(|| StepId::numbered(position), StepId::new);

    let mut step = PlanStep::new(id, description)
        .with_skills(first_present(fields, SKILL_FIELDS).map(list_of).unwrap_or_default())
        .with_dependencies(
            first_present(fields, DEPENDENCY_FIELDS)
                .map(list_of)
                .unwrap_or_default(),
        );
    if let Some(target) = first_present(fields, TARGET_FIELDS).and_then(text_of) {
        step = step.with_target_capability(target);
    }
    Some(step)
}

/// Returns the first non-null value among `aliases`, in order.
fn first_present<'a>(fields: &'a Map<String, Value>, aliases: &[&str]) -> Option<&'a Value> {
    aliases
        .iter()
        .filter_map(|alias| fields.get(*alias))
        .find(|value| !value.is_null())
}

fn text_of(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(text) => text.trim().to_owned(),
        Value::Number(number) => number.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn list_of(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(text_of).collect(),
        Value::String(text) => text
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_owned)
            .collect(),
        _ => Vec::new(),
    }
}
