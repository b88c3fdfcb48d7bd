//! Key binding schemes ("Default", "Emacs", ...) and their registry.
//!
//! Schemes are created undefined on first reference and become usable once
//! defined. Each defined scheme may name a parent, forming a forest; the
//! ancestor chain of the active scheme decides which bindings apply.

use std::collections::{BTreeSet, HashMap};

use crate::error::{BindingError, Result};

/// A named node in the scheme hierarchy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scheme {
    id: String,
    name: Option<String>,
    parent_id: Option<String>,
    defined: bool,
}

/// What changed when a scheme was (re)defined or undefined.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchemeEvent {
    pub scheme_id: String,
    pub defined_changed: bool,
    pub parent_changed: bool,
}

impl SchemeEvent {
    fn new(scheme_id: &str, defined_changed: bool, parent_changed: bool) -> Option<Self> {
        if defined_changed || parent_changed {
            Some(Self {
                scheme_id: scheme_id.to_string(),
                defined_changed,
                parent_changed,
            })
        } else {
            None
        }
    }
}

impl Scheme {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            parent_id: None,
            defined: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_defined(&self) -> bool {
        self.defined
    }

    /// Parent scheme id. Fails with `NotDefined` while the scheme is undefined.
    pub fn parent_id(&self) -> Result<Option<&str>> {
        if !self.defined {
            return Err(BindingError::scheme_not_defined(&self.id));
        }
        Ok(self.parent_id.as_deref())
    }

    pub fn name(&self) -> Result<&str> {
        if !self.defined {
            return Err(BindingError::scheme_not_defined(&self.id));
        }
        Ok(self.name.as_deref().unwrap_or(&self.id))
    }

    /// Define or redefine the scheme. Returns `None` when nothing relevant changed.
    pub fn define(
        &mut self,
        name: impl Into<String>,
        parent_id: Option<String>,
    ) -> Option<SchemeEvent> {
        let defined_changed = !self.defined;
        let parent_changed = self.defined && self.parent_id != parent_id;

        self.defined = true;
        self.name = Some(name.into());
        self.parent_id = parent_id;

        SchemeEvent::new(&self.id, defined_changed, parent_changed)
    }

    pub fn undefine(&mut self) -> Option<SchemeEvent> {
        let defined_changed = self.defined;
        let parent_changed = self.parent_id.is_some();

        self.defined = false;
        self.name = None;
        self.parent_id = None;

        SchemeEvent::new(&self.id, defined_changed, parent_changed)
    }
}

/// Get-or-create registry of schemes, defined or not.
#[derive(Debug, Default)]
pub struct SchemeRegistry {
    schemes: HashMap<String, Scheme>,
}

impl SchemeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The scheme with `id`, created undefined if never referenced before.
    pub fn get_or_create(&mut self, id: &str) -> &mut Scheme {
        self.schemes
            .entry(id.to_string())
            .or_insert_with(|| Scheme::new(id))
    }

    pub fn get(&self, id: &str) -> Option<&Scheme> {
        self.schemes.get(id)
    }

    pub fn is_defined(&self, id: &str) -> bool {
        self.schemes.get(id).is_some_and(Scheme::is_defined)
    }

    /// Defined scheme ids, sorted.
    pub fn defined_scheme_ids(&self) -> BTreeSet<String> {
        self.schemes
            .values()
            .filter(|s| s.is_defined())
            .map(|s| s.id.clone())
            .collect()
    }

    /// `id` followed by its ancestors, most specific first.
    ///
    /// Ascent stops at a scheme without parent, at an undefined scheme (whose
    /// id is still included), at a cycle, or after `max_depth` hops.
    pub fn ancestor_chain(&self, id: &str, max_depth: usize) -> Vec<String> {
        let mut chain = vec![id.to_string()];
        let mut current = id;

        for _ in 0..max_depth {
            let parent = match self.schemes.get(current).map(Scheme::parent_id) {
                Some(Ok(Some(parent))) => parent,
                _ => return chain,
            };
            if chain.iter().any(|seen| seen == parent) {
                tracing::warn!(scheme_id = id, cycle_at = parent, "Scheme parent cycle detected");
                return chain;
            }
            chain.push(parent.to_string());
            current = parent;
        }

        if let Some(Ok(Some(_))) = self.schemes.get(current).map(Scheme::parent_id) {
            tracing::warn!(scheme_id = id, max_depth, "Scheme ascent limit reached");
        }
        chain
    }
}
