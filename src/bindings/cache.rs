//! Memoized resolution results keyed by world state.

use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;

use super::binding::Binding;
use super::chain::SpecificityChain;
use super::context::ContextSnapshot;
use super::types::TriggerSequence;

/// Prefix table entry: `None` marks an exact match only; `Some` lists the
/// longer triggers (and their commands) that start with the key.
pub type PrefixEntry = Option<BTreeMap<TriggerSequence, String>>;
pub type PrefixTable = BTreeMap<TriggerSequence, PrefixEntry>;

/// Everything a resolution depends on besides the binding set.
///
/// `contexts == None` is the context-free world used to enumerate every
/// binding regardless of which contexts are active.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct WorldState {
    pub contexts: Option<ContextSnapshot>,
    pub locales: SpecificityChain,
    pub platforms: SpecificityChain,
    pub schemes: Vec<String>,
}

/// Resolution of a context-aware world state.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ActiveBindings {
    /// Trigger → command of the winning binding.
    pub by_trigger: BTreeMap<TriggerSequence, String>,
    pub prefix_table: PrefixTable,
    /// Ambiguity groups with no unique winner; these triggers are unbound.
    pub conflicts: BTreeMap<TriggerSequence, Vec<Binding>>,
}

impl ActiveBindings {
    pub fn perfect_match(&self, trigger: &TriggerSequence) -> Option<&str> {
        self.by_trigger.get(trigger).map(String::as_str)
    }

    pub fn partial_matches(
        &self,
        trigger: &TriggerSequence,
    ) -> Option<&BTreeMap<TriggerSequence, String>> {
        self.prefix_table.get(trigger).and_then(|entry| entry.as_ref())
    }
}

/// Resolution of the context-free world: each trigger with its equally-best bindings.
pub type AllBindings = BTreeMap<TriggerSequence, Vec<Binding>>;

/// Cache value for one world state. Only the shape matching the key's mode is filled.
#[derive(Debug, Default)]
pub struct CachedBindingSet {
    active: Option<Arc<ActiveBindings>>,
    all: Option<Arc<AllBindings>>,
}

impl CachedBindingSet {
    pub fn active(&self) -> Option<&Arc<ActiveBindings>> {
        self.active.as_ref()
    }

    pub fn all(&self) -> Option<&Arc<AllBindings>> {
        self.all.as_ref()
    }

    pub fn set_active(&mut self, active: Arc<ActiveBindings>) {
        self.active = Some(active);
    }

    pub fn set_all(&mut self, all: Arc<AllBindings>) {
        self.all = Some(all);
    }
}

/// Bounded map from world state to its resolution, evicting least recently used entries.
pub struct BindingCache {
    entries: LruCache<WorldState, CachedBindingSet>,
}

impl BindingCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(capacity),
        }
    }

    /// The entry for `key`, inserting an empty one on miss.
    pub fn entry(&mut self, key: WorldState) -> &mut CachedBindingSet {
        self.entries.get_or_insert_mut(key, CachedBindingSet::default)
    }

    #[cfg(test)]
    fn peek(&self, key: &WorldState) -> Option<&CachedBindingSet> {
        self.entries.peek(key)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }
}

impl std::fmt::Debug for BindingCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BindingCache")
            .field("len", &self.entries.len())
            .field("capacity", &self.entries.cap())
            .finish()
    }
}
