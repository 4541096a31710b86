//! Domain types for conversations.

mod context;
mod error;
mod ids;
mod role;

pub use context::{ChatMessage, ConversationContext, MAX_LOOPS_KEY};
pub use error::ParseRoleError;
pub use ids::ConversationId;
pub use role::Role;
