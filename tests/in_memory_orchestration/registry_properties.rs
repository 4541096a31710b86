//! Lookup invariants of the capability registry.

use std::collections::HashSet;

use ensemble::registry::services::CapabilityRegistry;
use ensemble::worker::{adapters::memory::ScriptedWorker, ports::WorkerHandle};
use rstest::{fixture, rstest};

#[fixture]
fn populated() -> CapabilityRegistry {
    let registry = CapabilityRegistry::new();
    for (name, skills) in [
        ("scout", vec!["search", "fetch"]),
        ("reader", vec!["fetch", "parsing"]),
        ("critic", vec!["analysis"]),
        ("scribe", vec!["summarization", "analysis", "search"]),
    ] {
        let handle = WorkerHandle::from_transport(name, ScriptedWorker::replying(name));
        registry.register_with_skills(&handle, name, skills);
    }
    registry
}

#[rstest]
#[case::single(&["search"])]
#[case::pair(&["fetch", "search"])]
#[case::unrelated(&["analysis", "parsing"])]
#[case::unknown(&["telepathy"])]
#[case::mixed(&["analysis", "telepathy"])]
#[case::empty(&[])]
fn all_skills_is_a_subset_of_any_skill(populated: CapabilityRegistry, #[case] skills: &[&str]) {
    let all = populated.find_agents_by_all_skills(skills.iter().copied());
    let any = populated.find_agents_by_any_skill(skills.iter().copied());

    assert!(all.is_subset(&any));
    if skills.is_empty() {
        assert!(all.is_empty());
    }
}

#[rstest]
fn repeated_registration_is_idempotent() {
    let registry = CapabilityRegistry::new();
    let handle = WorkerHandle::from_transport("echo", ScriptedWorker::replying("echo"));

    registry.register_with_skills(&handle, "echo", ["talk"]);
    registry.register_with_skills(&handle, "echo", ["talk"]);

    assert_eq!(registry.find_agents("echo"), HashSet::from([handle.clone()]));
    assert_eq!(registry.find_agent("echo"), Some(handle));
}
