//! Unit tests for conversation contexts and roles.

use crate::conversation::domain::{
    ChatMessage, ConversationContext, ConversationId, MAX_LOOPS_KEY, ParseRoleError, Role,
};
use rstest::{fixture, rstest};
use serde_json::{Value, json};
use std::collections::BTreeMap;

#[fixture]
fn context() -> ConversationContext {
    ConversationContext::new(ConversationId::new())
}

#[rstest]
fn with_message_produces_a_copy(context: ConversationContext) {
    let first = context.with_message(ChatMessage::user("hello"));
    let second = first.with_message(ChatMessage::worker("hi"));

    assert!(context.history().is_empty());
    assert_eq!(first.history().len(), 1);
    assert_eq!(second.history().len(), 2);
    assert_eq!(
        second.last_message().map(|message| message.role),
        Some(Role::Worker)
    );
    assert_eq!(first.id(), second.id());
}

#[rstest]
#[case(json!(3), Some(3))]
#[case(json!("2"), Some(2))]
#[case(json!(" 4 "), Some(4))]
#[case(json!(0), Some(1))]
#[case(json!(-5), Some(1))]
#[case(json!("many"), None)]
#[case(json!(true), None)]
fn max_loops_reads_numeric_metadata(
    context: ConversationContext,
    #[case] raw: Value,
    #[case] expected: Option<u32>,
) {
    let with_budget = context.with_metadata_entry(MAX_LOOPS_KEY, raw);
    assert_eq!(with_budget.max_loops(), expected);
}

#[rstest]
fn max_loops_is_absent_without_metadata(context: ConversationContext) {
    assert_eq!(context.max_loops(), None);
}

#[rstest]
#[case(Role::System, "system")]
#[case(Role::User, "user")]
#[case(Role::Assistant, "assistant")]
#[case(Role::Worker, "worker")]
fn role_as_str_round_trip(#[case] role: Role, #[case] expected: &str) {
    assert_eq!(role.as_str(), expected);
    assert_eq!(Role::try_from(expected), Ok(role));
}

#[rstest]
fn unknown_role_is_rejected() {
    assert_eq!(
        Role::try_from("robot"),
        Err(ParseRoleError("robot".to_owned()))
    );
}

#[rstest]
fn replacing_metadata_keeps_the_history(context: ConversationContext) {
    let merged = context
        .with_message(ChatMessage::user("hello"))
        .with_metadata_entry(MAX_LOOPS_KEY, json!(2));

    let replaced = merged.with_metadata_replaced(BTreeMap::new());

    assert!(replaced.metadata().is_empty());
    assert_eq!(replaced.history().len(), 1);
}
