//! Terminal outcome of a conversation run.

use super::ConversationFailure;
use crate::conversation::domain::{ConversationContext, ConversationId};
use crate::plan::domain::PlanId;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Outcome delivered exactly once per accepted task.
pub type DispatchOutcome = Result<FinalAnswer, ConversationFailure>;

/// The answer produced for one task.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinalAnswer {
    /// Conversation the task belonged to.
    pub conversation_id: ConversationId,
    /// The executed plan.
    pub plan_id: PlanId,
    /// Final text: the lone step's result or the aggregate.
    pub text: String,
    /// Steps that produced a result.
    pub completed_steps: usize,
    /// Steps in the plan.
    pub total_steps: usize,
    /// Attempts consumed from the plan-wide budget, including the first.
    pub attempts: u32,
    /// When the answer was assembled.
    pub completed_at: DateTime<Utc>,
    /// Context snapshot after the run, ending with the answer.
    pub context: ConversationContext,
}
