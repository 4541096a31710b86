//! Dispatch services.

mod dispatcher;
mod matcher;
mod prompt;
mod runner;

pub use dispatcher::{ATTEMPT_KEY, Dispatcher, PLAN_ID_KEY, STEP_ID_KEY};
#[cfg(test)]
pub(crate) use dispatcher::{Flow, ReplyEnvelope};
pub use matcher::{LOCAL_CAPABILITY, StepMatcher, StepTarget};
pub use prompt::compose_step_prompt;
pub use runner::{LOCAL_SYSTEM_PROMPT, StepRunner, StepSuccess};
