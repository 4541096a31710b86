//! Keyword-driven planning without external calls.

use crate::conversation::domain::ConversationContext;
use crate::plan::domain::{ExecutionStrategy, Plan, PlanStep, StepId};
use crate::plan::ports::{Planner, PlanningResult};
use crate::registry::services::CapabilityRegistry;
use async_trait::async_trait;
use mockable::Clock;
use std::sync::Arc;
use tracing::debug;

/// Canonical skill order and the keywords that select each skill.
///
/// Keywords match whole words of the lowercased task. A trailing `*` matches
/// any word starting with the stem, and multi-word keywords match
/// consecutive words.
pub const SKILL_KEYWORDS: &[(&str, &[&str])] = &[
    ("planning", &["plan", "plans", "planning", "organi*", "outline*"]),
    ("search", &["search*", "look up", "lookup", "research*", "find"]),
    ("fetch", &["fetch*", "download*", "scrap*", "crawl*", "retriev*"]),
    ("parsing", &["pars*", "extract*", "feed*"]),
    ("analysis", &["analy*", "compar*", "evaluat*", "assess*", "sentiment*"]),
    ("summarization", &["summar*", "digest*", "condens*", "tl;dr"]),
];

/// Pipeline used when no keyword selects an available skill.
pub const DEFAULT_PIPELINE: &[&str] = &["planning", "summarization"];

/// Plans by matching keywords in the task text against [`SKILL_KEYWORDS`].
///
/// Skills without a live worker are dropped. The surviving skills become a
/// linear chain of steps in canonical order, run sequentially.
#[derive(Clone)]
pub struct HeuristicPlanner<C>
where
    C: Clock + Send + Sync,
{
    registry: Arc<CapabilityRegistry>,
    clock: Arc<C>,
}

impl<C> HeuristicPlanner<C>
where
    C: Clock + Send + Sync,
{
    /// Creates a heuristic planner over `registry`.
    #[must_use]
    pub const fn new(registry: Arc<CapabilityRegistry>, clock: Arc<C>) -> Self {
        Self { registry, clock }
    }

    /// Returns the canonical skills selected for `task`, before falling back
    /// to [`DEFAULT_PIPELINE`].
    #[must_use]
    pub fn select_skills(&self, task: &str) -> Vec<&'static str> {
        let words = words_of(task);
        SKILL_KEYWORDS
            .iter()
            .filter(|(_, keywords)| keywords.iter().any(|keyword| mentions(&words, keyword)))
            .map(|(skill, _)| *skill)
            .filter(|skill| self.is_available(skill))
            .collect()
    }

    fn is_available(&self, skill: &str) -> bool {
        !self.registry.find_agents_by_skill(skill).is_empty()
            || self.registry.find_agent(skill).is_some()
    }

    fn build(&self, task: &str, context: &ConversationContext) -> PlanningResult<Plan> {
        if task.trim().is_empty() {
            return Ok(Plan::direct(context.id(), task, &*self.clock));
        }

        let mut skills = self.select_skills(task);
        if skills.is_empty() {
            debug!(
                conversation_id = %context.id(),
                "no available skill matched, using default pipeline"
            );
            skills = DEFAULT_PIPELINE.to_vec();
        }

        let steps = skills
            .iter()
            .enumerate()
            .map(|(index, skill)| {
                let step = PlanStep::new(StepId::numbered(index + 1), describe(skill, task))
                    .with_skills([*skill]);
                if index == 0 {
                    step
                } else {
                    step.with_dependencies([StepId::numbered(index)])
                }
            })
            .collect();

        Plan::new(
            context.id(),
            task,
            steps,
            ExecutionStrategy::Sequential,
            &*self.clock,
        )
    }
}

#[async_trait]
impl<C> Planner for HeuristicPlanner<C>
where
    C: Clock + Send + Sync,
{
    async fn create_plan(
        &self,
        task: &str,
        context: &ConversationContext,
    ) -> PlanningResult<Plan> {
        self.build(task, context)
    }
}

fn words_of(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn mentions(words: &[String], keyword: &str) -> bool {
    let pattern: Vec<&str> = keyword
        .split(|c: char| !c.is_alphanumeric() && c != '*')
        .filter(|part| !part.is_empty())
        .collect();
    if pattern.is_empty() {
        return false;
    }
    words.windows(pattern.len()).any(|window| {
        window
            .iter()
            .zip(&pattern)
            .all(|(word, part)| word_matches(word, part))
    })
}

fn word_matches(word: &str, part: &str) -> bool {
    part.strip_suffix('*')
        .map_or_else(|| word == part, |stem| word.starts_with(stem))
}

fn describe(skill: &str, task: &str) -> String {
    let subject = task.trim();
    match skill {
        "planning" => format!("Outline an approach for: {subject}"),
        "search" => format!("Search for information relevant to: {subject}"),
        "fetch" => format!("Fetch the source material needed for: {subject}"),
        "parsing" => format!("Extract the relevant content for: {subject}"),
        "analysis" => format!("Analyse the gathered material for: {subject}"),
        "summarization" => format!("Summarise the findings for: {subject}"),
        other => format!("Apply {other} to: {subject}"),
    }
}
