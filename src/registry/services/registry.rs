//! Concurrent capability/skill directory.
//!
//! Provides [`CapabilityRegistry`], the map-of-sets index workers register
//! into and the planners and dispatcher query.

use dashmap::DashMap;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use tracing::{debug, warn};

use crate::registry::domain::{Capability, CapabilityName, SkillTag};
use crate::worker::domain::WorkerId;
use crate::worker::ports::WorkerHandle;

/// Process-local directory of live workers.
///
/// Two forward indices map capability names and skill tags to sets of
/// handles; a reverse index remembers what each handle registered so that
/// deregistration leaves no stale skill entries behind. Every mutation of a
/// set happens under the owning map's per-key lock, so concurrent
/// get-then-modify sequences on the same key never race. Cross-key
/// consistency is best-effort.
///
/// Deregistration is visible to every query that starts after it returns;
/// a query racing a registration may miss it.
///
/// # Examples
///
/// ```
/// use ensemble::registry::{domain::Capability, services::CapabilityRegistry};
/// use ensemble::worker::{adapters::memory::ScriptedWorker, ports::WorkerHandle};
///
/// let registry = CapabilityRegistry::new();
/// let handle = WorkerHandle::from_transport("searcher", ScriptedWorker::replying("ok"));
/// registry.register(&handle, Capability::new("Search").with_skills(["web"]));
///
/// assert_eq!(registry.find_agent("search"), Some(handle.clone()));
/// assert!(registry.find_agents_by_skill(" WEB ").contains(&handle));
/// ```
#[derive(Debug, Default)]
pub struct CapabilityRegistry {
    by_capability: DashMap<CapabilityName, HashSet<WorkerHandle>>,
    by_skill: DashMap<SkillTag, HashSet<WorkerHandle>>,
    registrations: DashMap<WorkerId, HashMap<CapabilityName, Capability>>,
}

impl CapabilityRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handle` under the capability and its declared skills.
    ///
    /// Idempotent upsert: re-registering the same handle and capability name
    /// replaces the earlier declaration, and skills dropped by the new
    /// declaration are unindexed for this handle. Capabilities whose name is
    /// empty after normalisation are ignored.
    pub fn register(&self, handle: &WorkerHandle, capability: Capability) {
        let name = capability.name().clone();
        if name.is_empty() {
            warn!(worker = %handle, "ignoring registration with empty capability name");
            return;
        }

        let new_skills = capability.skills().clone();
        let previous = self
            .registrations
            .entry(handle.id())
            .or_default()
            .insert(name.clone(), capability);

        if let Some(previous_capability) = previous {
            let dropped: Vec<SkillTag> = previous_capability
                .skills()
                .difference(&new_skills)
                .cloned()
                .collect();
            self.unindex_skills(handle, dropped);
        }

        self.by_capability
            .entry(name.clone())
            .or_default()
            .insert(handle.clone());
        for skill in &new_skills {
            self.by_skill
                .entry(skill.clone())
                .or_default()
                .insert(handle.clone());
        }

        debug!(
            worker = %handle,
            capability = %name,
            skills = new_skills.len(),
            "worker registered"
        );
    }

    /// Registers `handle` under `capability` with extra skill tags.
    pub fn register_with_skills<I, S>(&self, handle: &WorkerHandle, capability: &str, skills: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.register(handle, Capability::new(capability).with_skills(skills));
    }

    /// Removes `handle` from the capability index and from every skill it
    /// declared through that capability.
    ///
    /// Skills the handle still declares through another capability remain
    /// indexed. Removing an unknown pairing is a no-op.
    pub fn deregister(&self, handle: &WorkerHandle, capability: &str) {
        let name = CapabilityName::new(capability);
        let removed = self
            .registrations
            .get_mut(&handle.id())
            .and_then(|mut declared| declared.remove(&name));
        self.registrations
            .remove_if(&handle.id(), |_, declared| declared.is_empty());

        Self::remove_from(&self.by_capability, &name, handle);
        if let Some(capability_declaration) = removed {
            let skills: Vec<SkillTag> = capability_declaration.skills().iter().cloned().collect();
            self.unindex_skills(handle, skills);
        }

        debug!(worker = %handle, capability = %name, "worker deregistered");
    }

    /// Removes `handle` from every capability and skill it registered.
    pub fn deregister_worker(&self, handle: &WorkerHandle) {
        let Some((_, declared)) = self.registrations.remove(&handle.id()) else {
            return;
        };
        for (name, capability) in declared {
            Self::remove_from(&self.by_capability, &name, handle);
            for skill in capability.skills() {
                Self::remove_from(&self.by_skill, skill, handle);
            }
        }
        debug!(worker = %handle, "worker removed from registry");
    }

    /// Returns whether `handle` still holds at least one registration.
    #[must_use]
    pub fn is_registered(&self, handle: &WorkerHandle) -> bool {
        self.registrations.contains_key(&handle.id())
    }

    /// Returns one live handle registered under the exact capability name.
    #[must_use]
    pub fn find_agent(&self, capability: &str) -> Option<WorkerHandle> {
        let name = CapabilityName::new(capability);
        self.by_capability
            .get(&name)
            .and_then(|handles| handles.iter().min_by_key(|handle| handle.id()).cloned())
    }

    /// Returns every live handle registered under the exact capability name.
    #[must_use]
    pub fn find_agents(&self, capability: &str) -> HashSet<WorkerHandle> {
        let name = CapabilityName::new(capability);
        self.by_capability
            .get(&name)
            .map(|handles| handles.value().clone())
            .unwrap_or_default()
    }

    /// Returns every live handle declaring `skill`.
    #[must_use]
    pub fn find_agents_by_skill(&self, skill: &str) -> HashSet<WorkerHandle> {
        self.by_skill
            .get(&SkillTag::new(skill))
            .map(|handles| handles.value().clone())
            .unwrap_or_default()
    }

    /// Returns the union of handles declaring any of `skills`.
    #[must_use]
    pub fn find_agents_by_any_skill<I, S>(&self, skills: I) -> HashSet<WorkerHandle>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        skills
            .into_iter()
            .flat_map(|skill| self.find_agents_by_skill(skill.as_ref()))
            .collect()
    }

    /// Returns the handles declaring every one of `skills`.
    ///
    /// An empty skill set matches nothing.
    #[must_use]
    pub fn find_agents_by_all_skills<I, S>(&self, skills: I) -> HashSet<WorkerHandle>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut matched: Option<HashSet<WorkerHandle>> = None;
        for skill in skills {
            let holders = self.find_agents_by_skill(skill.as_ref());
            let narrowed = match matched {
                Some(current) => current.intersection(&holders).cloned().collect(),
                None => holders,
            };
            if narrowed.is_empty() {
                return HashSet::new();
            }
            matched = Some(narrowed);
        }
        matched.unwrap_or_default()
    }

    /// Returns a snapshot of capability names and the union of their skills.
    #[must_use]
    pub fn list_registered_capabilities(&self) -> BTreeMap<String, BTreeSet<String>> {
        let mut listing: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for entry in self.registrations.iter() {
            for (name, capability) in entry.value() {
                listing
                    .entry(name.as_str().to_owned())
                    .or_default()
                    .extend(capability.skills().iter().map(|skill| skill.as_str().to_owned()));
            }
        }
        listing
    }

    /// Returns the number of distinct live workers.
    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.registrations.len()
    }

    fn unindex_skills(&self, handle: &WorkerHandle, skills: Vec<SkillTag>) {
        let still_declared: BTreeSet<SkillTag> = self
            .registrations
            .get(&handle.id())
            .map(|declared| {
                declared
                    .values()
                    .flat_map(|capability| capability.skills().iter().cloned())
                    .collect()
            })
            .unwrap_or_default();

        for skill in skills {
            if !still_declared.contains(&skill) {
                Self::remove_from(&self.by_skill, &skill, handle);
            }
        }
    }

    fn remove_from<K>(index: &DashMap<K, HashSet<WorkerHandle>>, key: &K, handle: &WorkerHandle)
    where
        K: Eq + std::hash::Hash + Clone,
    {
        if let Some(mut handles) = index.get_mut(key) {
            handles.remove(handle);
        }
        index.remove_if(key, |_, handles| handles.is_empty());
    }
}
