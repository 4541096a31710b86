//! Planning prompt template.

use crate::plan::domain::PlanningError;
use minijinja::{Environment, context};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

const PLANNING_TEMPLATE: &str = r#"Break the task below into steps for a team of workers.

Available capabilities:
{% for capability in capabilities -%}
- {{ capability.name }}{% if capability.skills %} (skills: {{ capability.skills | join(", ") }}){% endif %}
{% else -%}
- none registered; plan steps that can be answered directly
{% endfor %}
Task: {{ task }}

Answer with one JSON object and nothing else:
{"strategy": "sequential | parallel | adaptive", "maxParallelism": 4, "steps": [{"id": "step-1", "description": "...", "skills": ["..."], "targetCapability": "...", "dependencies": []}]}
Only use listed capabilities as targetCapability. Dependencies must name earlier step ids."#;

#[derive(Serialize)]
struct CapabilityEntry<'a> {
    name: &'a str,
    skills: Vec<&'a str>,
}

/// Renders the planning prompt for `task` over a capability snapshot as
/// returned by the registry.
///
/// # Errors
///
/// Returns [`PlanningError::Prompt`] when the template fails to render.
pub fn render_planning_prompt(
    task: &str,
    capabilities: &BTreeMap<String, BTreeSet<String>>,
) -> Result<String, PlanningError> {
    let entries: Vec<CapabilityEntry<'_>> = capabilities
        .iter()
        .map(|(name, skills)| CapabilityEntry {
            name,
            skills: skills.iter().map(String::as_str).collect(),
        })
        .collect();

    Environment::new()
        .render_str(
            PLANNING_TEMPLATE,
            context! { task => task.trim(), capabilities => entries },
        )
        .map_err(|err| PlanningError::Prompt(err.to_string()))
}
