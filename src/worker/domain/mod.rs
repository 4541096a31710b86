//! Domain model for worker tasks and replies.

mod ids;
mod reply;
mod task;

pub use ids::{TaskMessageId, WorkerId};
pub use reply::{ClarificationRequest, SATISFIED_KEY, StepOutput, WorkerReply};
pub use task::WorkerTask;
