//! Policy deciding whether a result ends the refinement loop.

use crate::worker::domain::{SATISFIED_KEY, StepOutput};
use serde_json::Value;

/// Case-insensitive marker that declares a result final.
pub const DONE_MARKER: &str = "[done]";

/// Returns `true` when `output` carries `satisfied = true` metadata or its
/// text contains [`DONE_MARKER`] in any case.
///
/// A missing result is never satisfactory.
///
/// # Examples
///
/// ```
/// use ensemble::dispatch::domain::is_satisfactory;
/// use ensemble::worker::domain::StepOutput;
///
/// assert!(is_satisfactory(Some(&StepOutput::new("All good [DONE]"))));
/// assert!(is_satisfactory(Some(&StepOutput::new("quiet").satisfied())));
/// assert!(!is_satisfactory(Some(&StepOutput::new("draft"))));
/// assert!(!is_satisfactory(None));
/// ```
#[must_use]
pub fn is_satisfactory(output: Option<&StepOutput>) -> bool {
    output.is_some_and(|result| {
        result.metadata.get(SATISFIED_KEY) == Some(&Value::Bool(true))
            || result.text.to_lowercase().contains(DONE_MARKER)
    })
}
