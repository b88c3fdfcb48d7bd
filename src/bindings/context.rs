//! Active context snapshots.
//!
//! A [`ContextSnapshot`] maps every currently active context id to its
//! parent id. The resolver reads snapshots and never changes them;
//! [`ContextManager`] is one way for a host to produce them.

use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Child→parent map of the active contexts.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ContextSnapshot {
    parents: BTreeMap<String, Option<String>>,
}

impl ContextSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insertion of `id` with an optional parent.
    pub fn with(mut self, id: impl Into<String>, parent: Option<&str>) -> Self {
        self.parents.insert(id.into(), parent.map(str::to_string));
        self
    }

    pub fn contains(&self, id: &str) -> bool {
        self.parents.contains_key(id)
    }

    pub fn parent_of(&self, id: &str) -> Option<&str> {
        self.parents.get(id).and_then(|p| p.as_deref())
    }

    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.parents.keys().map(String::as_str)
    }

    /// Whether `ancestor` is a strict ancestor of `id` in this snapshot.
    pub fn is_ancestor(&self, ancestor: &str, id: &str, max_depth: usize) -> bool {
        let mut current = id;
        for _ in 0..max_depth {
            match self.parent_of(current) {
                Some(parent) if parent == ancestor => return true,
                Some(parent) if parent == id => return false,
                Some(parent) => current = parent,
                None => return false,
            }
        }
        false
    }
}

impl<K: Into<String>> FromIterator<(K, Option<String>)> for ContextSnapshot {
    fn from_iter<I: IntoIterator<Item = (K, Option<String>)>>(iter: I) -> Self {
        Self {
            parents: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

#[derive(Clone, Debug)]
struct ContextDefinition {
    parent_id: Option<String>,
    defined: bool,
}

/// Context hierarchy plus the set of active context ids.
#[derive(Debug)]
pub struct ContextManager {
    contexts: HashMap<String, ContextDefinition>,
    active: BTreeSet<String>,
    max_depth: usize,
}

impl Default for ContextManager {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_MAX_ASCENT_DEPTH)
    }
}

impl ContextManager {
    pub fn new(max_depth: usize) -> Self {
        Self {
            contexts: HashMap::new(),
            active: BTreeSet::new(),
            max_depth,
        }
    }

    /// Define (or redefine) a context. Returns true if the hierarchy changed.
    pub fn define_context(&mut self, id: impl Into<String>, parent_id: Option<&str>) -> bool {
        let definition = ContextDefinition {
            parent_id: parent_id.map(str::to_string),
            defined: true,
        };
        match self.contexts.insert(id.into(), definition) {
            Some(previous) => !previous.defined || previous.parent_id.as_deref() != parent_id,
            None => true,
        }
    }

    pub fn undefine_context(&mut self, id: &str) -> bool {
        match self.contexts.get_mut(id) {
            Some(def) if def.defined => {
                def.defined = false;
                def.parent_id = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_defined(&self, id: &str) -> bool {
        self.contexts.get(id).is_some_and(|d| d.defined)
    }

    /// Replace the active set. Returns true if it changed.
    pub fn set_active_context_ids<I, S>(&mut self, ids: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ids: BTreeSet<String> = ids.into_iter().map(Into::into).collect();
        if ids == self.active {
            return false;
        }
        self.active = ids;
        true
    }

    pub fn activate(&mut self, id: impl Into<String>) -> bool {
        self.active.insert(id.into())
    }

    pub fn deactivate(&mut self, id: &str) -> bool {
        self.active.remove(id)
    }

    pub fn active_context_ids(&self) -> &BTreeSet<String> {
        &self.active
    }

    fn parent_of(&self, id: &str) -> Option<&str> {
        self.contexts
            .get(id)
            .filter(|d| d.defined)
            .and_then(|d| d.parent_id.as_deref())
    }

    /// Every active context and its ancestors, mapped to their parents.
    ///
    /// An undefined context maps to no parent and ascent stops there.
    pub fn snapshot(&self) -> ContextSnapshot {
        let mut parents = BTreeMap::new();

        for id in &self.active {
            let mut current = id.as_str();
            for _ in 0..=self.max_depth {
                if parents.contains_key(current) {
                    break;
                }
                let parent = self.parent_of(current);
                parents.insert(current.to_string(), parent.map(str::to_string));
                match parent {
                    Some(parent) => current = parent,
                    None => break,
                }
            }
        }

        ContextSnapshot { parents }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_includes_ancestors_of_active_contexts() {
        let mut manager = ContextManager::default();
        manager.define_context("window", None);
        manager.define_context("dialog-and-window", Some("window"));
        manager.define_context("text-editor", Some("dialog-and-window"));
        manager.set_active_context_ids(["text-editor"]);

        let snapshot = manager.snapshot();
        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot.parent_of("text-editor"), Some("dialog-and-window"));
        assert_eq!(snapshot.parent_of("dialog-and-window"), Some("window"));
        assert!(snapshot.contains("window"));
        assert_eq!(snapshot.parent_of("window"), None);
    }

    #[test]
    fn undefined_context_stops_ascent() {
        let mut manager = ContextManager::default();
        manager.define_context("child", Some("ghost"));
        manager.set_active_context_ids(["child"]);

        let snapshot = manager.snapshot();
        assert_eq!(snapshot.parent_of("child"), Some("ghost"));
        assert!(snapshot.contains("ghost"));
        assert_eq!(snapshot.parent_of("ghost"), None);

        manager.undefine_context("child");
        let snapshot = manager.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.parent_of("child"), None);
    }

    #[test]
    fn cyclic_hierarchy_terminates() {
        let mut manager = ContextManager::new(8);
        manager.define_context("a", Some("b"));
        manager.define_context("b", Some("a"));
        manager.activate("a");

        let snapshot = manager.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert!(!snapshot.is_ancestor("c", "a", 8));
    }

    #[test]
    fn set_active_reports_changes_only() {
        let mut manager = ContextManager::default();
        assert!(manager.set_active_context_ids(["a", "b"]));
        assert!(!manager.set_active_context_ids(["b", "a"]));
        assert!(manager.deactivate("a"));
        assert!(!manager.deactivate("a"));
    }

    #[test]
    fn define_reports_hierarchy_changes() {
        let mut manager = ContextManager::default();
        assert!(manager.define_context("a", None));
        assert!(!manager.define_context("a", None));
        assert!(manager.define_context("a", Some("root")));
        assert!(manager.undefine_context("a"));
        assert!(!manager.is_defined("a"));
    }

    #[test]
    fn is_ancestor_follows_parent_links() {
        let snapshot = ContextSnapshot::new()
            .with("editor", Some("window"))
            .with("window", Some("global"))
            .with("global", None);

        assert!(snapshot.is_ancestor("window", "editor", 64));
        assert!(snapshot.is_ancestor("global", "editor", 64));
        assert!(!snapshot.is_ancestor("editor", "window", 64));
        assert!(!snapshot.is_ancestor("editor", "editor", 64));
        assert!(!snapshot.is_ancestor("global", "editor", 1));
    }

    #[test]
    fn snapshots_compare_structurally() {
        let a: ContextSnapshot = [("x", None), ("y", Some("x".to_string()))]
            .into_iter()
            .collect();
        let b = ContextSnapshot::new().with("y", Some("x")).with("x", None);
        assert_eq!(a, b);
    }
}
