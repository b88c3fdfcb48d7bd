//! The binding manager: owns the declared bindings, the scheme registry and
//! the locale/platform/context state, and answers "which command does this
//! trigger run right now".
//!
//! Resolution runs in three passes (deletion removal, candidate grouping,
//! conflict resolution) and is memoized per [`WorldState`]. Changing the
//! binding set clears the cache; changing contexts, scheme, locale or platform
//! only drops the current solution, so returning to an earlier world state is
//! a cache hit.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::binding::{Binding, BindingFilter};
use super::cache::{ActiveBindings, AllBindings, BindingCache, PrefixTable, WorldState};
use super::chain::SpecificityChain;
use super::context::ContextSnapshot;
use super::events::{BindingManagerEvent, ListenerId, ListenerRegistry};
use super::scheme::{Scheme, SchemeEvent, SchemeRegistry};
use super::types::TriggerSequence;
use crate::config::ResolverConfig;
use crate::error::{BindingError, Result};

type Candidates<'a> = BTreeMap<TriggerSequence, Vec<&'a Binding>>;

pub struct BindingManager {
    config: ResolverConfig,
    max_depth: usize,

    bindings: BTreeSet<Binding>,
    schemes: SchemeRegistry,
    active_scheme: Option<String>,
    active_scheme_chain: Vec<String>,

    locale: String,
    platform: String,
    locale_chain: SpecificityChain,
    platform_chain: SpecificityChain,
    contexts: ContextSnapshot,

    cache: BindingCache,
    solution: Option<Arc<ActiveBindings>>,
    listeners: ListenerRegistry,
}

impl Default for BindingManager {
    fn default() -> Self {
        Self::new()
    }
}

impl BindingManager {
    pub fn new() -> Self {
        Self::with_config(ResolverConfig::default())
    }

    pub fn with_config(config: ResolverConfig) -> Self {
        let locale = config.get_locale();
        let platform = config.get_platform();
        let locale_chain =
            SpecificityChain::expand(Some(locale.as_str()), config.get_locale_separator());
        let platform_chain =
            SpecificityChain::expand(Some(platform.as_str()), config.get_platform_separator());

        Self {
            max_depth: config.get_max_ascent_depth(),
            cache: BindingCache::new(config.get_cache_capacity()),
            config,
            bindings: BTreeSet::new(),
            schemes: SchemeRegistry::new(),
            active_scheme: None,
            active_scheme_chain: Vec::new(),
            locale,
            platform,
            locale_chain,
            platform_chain,
            contexts: ContextSnapshot::new(),
            solution: None,
            listeners: ListenerRegistry::default(),
        }
    }

    // ------------------------------------------------------------------
    // Listeners
    // ------------------------------------------------------------------

    pub fn add_listener(
        &mut self,
        listener: impl FnMut(&BindingManagerEvent) + 'static,
    ) -> ListenerId {
        self.listeners.add(listener)
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    fn fire(&mut self, event: BindingManagerEvent) {
        if !self.listeners.is_empty() {
            self.listeners.notify(&event);
        }
    }

    // ------------------------------------------------------------------
    // Bindings
    // ------------------------------------------------------------------

    pub fn bindings(&self) -> &BTreeSet<Binding> {
        &self.bindings
    }

    /// Add one binding. Adding a binding that is already present is a no-op.
    pub fn add_binding(&mut self, binding: Binding) -> Result<()> {
        binding.validate()?;
        if self.bindings.insert(binding) {
            self.clear_cache();
            self.fire(BindingManagerEvent::bindings_changed());
        }
        Ok(())
    }

    /// Replace the whole binding set. Nothing changes if any binding is invalid.
    pub fn set_bindings(&mut self, bindings: impl IntoIterator<Item = Binding>) -> Result<()> {
        let bindings = bindings
            .into_iter()
            .map(|b| b.validate().map(|()| b))
            .collect::<Result<BTreeSet<_>>>()?;

        if bindings == self.bindings {
            return Ok(());
        }

        info!(count = bindings.len(), "Replacing key binding set");
        self.bindings = bindings;
        self.clear_cache();
        self.fire(BindingManagerEvent::bindings_changed());
        Ok(())
    }

    /// Remove every binding matching `filter`. Returns how many were removed.
    pub fn remove_bindings(&mut self, filter: &BindingFilter) -> usize {
        let before = self.bindings.len();
        self.bindings.retain(|b| !filter.matches(b));
        let removed = before - self.bindings.len();

        if removed > 0 {
            debug!(removed, "Removed key bindings");
            self.clear_cache();
            self.fire(BindingManagerEvent::bindings_changed());
        }
        removed
    }

    fn clear_cache(&mut self) {
        debug!(entries = self.cache.len(), "Clearing binding cache");
        self.cache.clear();
        self.solution = None;
    }

    fn clear_solution(&mut self) {
        self.solution = None;
    }

    // ------------------------------------------------------------------
    // Schemes
    // ------------------------------------------------------------------

    /// The scheme with `id`, created undefined on first reference.
    pub fn scheme(&mut self, id: &str) -> &Scheme {
        self.schemes.get_or_create(id)
    }

    pub fn defined_scheme_ids(&self) -> BTreeSet<String> {
        self.schemes.defined_scheme_ids()
    }

    pub fn define_scheme(&mut self, id: &str, name: &str, parent_id: Option<&str>) {
        let event = self
            .schemes
            .get_or_create(id)
            .define(name, parent_id.map(str::to_string));
        if let Some(event) = event {
            self.scheme_changed(event);
        }
    }

    pub fn undefine_scheme(&mut self, id: &str) {
        let event = self.schemes.get_or_create(id).undefine();
        if let Some(event) = event {
            self.scheme_changed(event);
        }
    }

    fn scheme_changed(&mut self, event: SchemeEvent) {
        let defined = self.schemes.is_defined(&event.scheme_id);
        let mut active_scheme_changed = false;

        if !defined && self.active_scheme.as_deref() == Some(event.scheme_id.as_str()) {
            debug!(scheme_id = %event.scheme_id, "Active scheme became undefined");
            self.active_scheme = None;
            self.active_scheme_chain.clear();
            self.clear_solution();
            active_scheme_changed = true;
        } else if let Some(active) = self.active_scheme.as_deref() {
            // An ancestor may have been (un)defined or re-parented.
            let chain = self.schemes.ancestor_chain(active, self.max_depth);
            if chain != self.active_scheme_chain {
                self.active_scheme_chain = chain;
                self.clear_solution();
            }
        }

        self.fire(BindingManagerEvent {
            active_scheme_changed,
            ..BindingManagerEvent::scheme_changed(
                event.scheme_id,
                event.defined_changed.then_some(defined),
            )
        });
    }

    pub fn active_scheme(&self) -> Option<&str> {
        self.active_scheme.as_deref()
    }

    /// Active scheme id followed by its ancestors.
    pub fn active_scheme_chain(&self) -> &[String] {
        &self.active_scheme_chain
    }

    /// Activate a defined scheme. Fails with `NotDefined` otherwise.
    pub fn set_active_scheme(&mut self, scheme_id: &str) -> Result<()> {
        if !self.schemes.is_defined(scheme_id) {
            return Err(BindingError::scheme_not_defined(scheme_id));
        }
        if self.active_scheme.as_deref() == Some(scheme_id) {
            return Ok(());
        }

        self.active_scheme = Some(scheme_id.to_string());
        self.active_scheme_chain = self.schemes.ancestor_chain(scheme_id, self.max_depth);
        debug!(chain = ?self.active_scheme_chain, "Active scheme changed");
        self.clear_solution();
        self.fire(BindingManagerEvent::active_scheme_changed());
        Ok(())
    }

    // ------------------------------------------------------------------
    // Locale, platform, contexts
    // ------------------------------------------------------------------

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn platform(&self) -> &str {
        &self.platform
    }

    pub fn set_locale(&mut self, locale: &str) {
        if self.locale == locale {
            return;
        }
        self.locale = locale.to_string();
        self.locale_chain =
            SpecificityChain::expand(Some(locale), self.config.get_locale_separator());
        self.clear_solution();
        self.fire(BindingManagerEvent {
            locale_changed: true,
            ..Default::default()
        });
    }

    pub fn set_platform(&mut self, platform: &str) {
        if self.platform == platform {
            return;
        }
        self.platform = platform.to_string();
        self.platform_chain =
            SpecificityChain::expand(Some(platform), self.config.get_platform_separator());
        self.clear_solution();
        self.fire(BindingManagerEvent {
            platform_changed: true,
            ..Default::default()
        });
    }

    pub fn active_contexts(&self) -> &ContextSnapshot {
        &self.contexts
    }

    /// Accept a new snapshot of the active contexts.
    pub fn set_active_contexts(&mut self, contexts: ContextSnapshot) {
        if self.contexts == contexts {
            return;
        }
        self.contexts = contexts;
        self.clear_solution();
    }

    // ------------------------------------------------------------------
    // Cache orchestration
    // ------------------------------------------------------------------

    fn world_state(&self, contexts: Option<ContextSnapshot>) -> WorldState {
        WorldState {
            contexts,
            locales: self.locale_chain.clone(),
            platforms: self.platform_chain.clone(),
            schemes: self.active_scheme_chain.clone(),
        }
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Resolution for the current world state, computed on first use.
    pub fn active_bindings(&mut self) -> Arc<ActiveBindings> {
        if let Some(solution) = &self.solution {
            return Arc::clone(solution);
        }

        let key = self.world_state(Some(self.contexts.clone()));
        let cached = self.cache.entry(key.clone()).active().cloned();
        let resolved = match cached {
            Some(hit) => {
                debug!("Binding cache hit");
                hit
            }
            None => {
                debug!(bindings = self.bindings.len(), "Binding cache miss");
                let resolved = Arc::new(self.resolve_active(&self.contexts));
                self.cache.entry(key).set_active(Arc::clone(&resolved));
                resolved
            }
        };

        self.solution = Some(Arc::clone(&resolved));
        resolved
    }

    /// Every trigger with its equally-best bindings, ignoring active contexts.
    pub fn get_active_bindings_disregarding_context(&mut self) -> Arc<AllBindings> {
        let key = self.world_state(None);
        if let Some(hit) = self.cache.entry(key.clone()).all().cloned() {
            return hit;
        }

        let resolved = Arc::new(self.resolve_all());
        self.cache.entry(key).set_all(Arc::clone(&resolved));
        resolved
    }

    pub fn get_active_bindings_disregarding_context_flat(&mut self) -> Vec<Binding> {
        self.get_active_bindings_disregarding_context()
            .values()
            .flatten()
            .cloned()
            .collect()
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn get_perfect_match(&mut self, trigger: &TriggerSequence) -> Option<String> {
        self.active_bindings()
            .perfect_match(trigger)
            .map(str::to_string)
    }

    pub fn is_perfect_match(&mut self, trigger: &TriggerSequence) -> bool {
        self.active_bindings().perfect_match(trigger).is_some()
    }

    /// Longer triggers starting with `trigger`, with their commands.
    pub fn get_partial_matches(
        &mut self,
        trigger: &TriggerSequence,
    ) -> BTreeMap<TriggerSequence, String> {
        self.active_bindings()
            .partial_matches(trigger)
            .cloned()
            .unwrap_or_default()
    }

    pub fn is_partial_match(&mut self, trigger: &TriggerSequence) -> bool {
        self.active_bindings().partial_matches(trigger).is_some()
    }

    pub fn get_active_bindings_for(&mut self, command_id: &str) -> Vec<TriggerSequence> {
        self.active_bindings()
            .by_trigger
            .iter()
            .filter(|(_, command)| command.as_str() == command_id)
            .map(|(trigger, _)| trigger.clone())
            .collect()
    }

    /// The trigger to show for `command_id`: fewest strokes, then fewest modifiers.
    pub fn get_best_active_binding_for(&mut self, command_id: &str) -> Option<TriggerSequence> {
        self.get_active_bindings_for(command_id)
            .into_iter()
            .min_by(|a, b| {
                (a.len(), a.modifier_count())
                    .cmp(&(b.len(), b.modifier_count()))
                    .then_with(|| a.cmp(b))
            })
    }

    /// Bindings left unresolved for `trigger` in the current world state.
    pub fn get_conflicts_for(&mut self, trigger: &TriggerSequence) -> Vec<Binding> {
        self.active_bindings()
            .conflicts
            .get(trigger)
            .cloned()
            .unwrap_or_default()
    }

    pub fn get_current_conflicts(&mut self) -> BTreeMap<TriggerSequence, Vec<Binding>> {
        self.active_bindings().conflicts.clone()
    }

    // ------------------------------------------------------------------
    // Resolution passes
    // ------------------------------------------------------------------

    fn matches_locale_and_platform(&self, binding: &Binding) -> bool {
        self.locale_chain.matches(binding.locale())
            && self.platform_chain.matches(binding.platform())
    }

    /// Bindings left after applicable deletion markers retract their targets.
    fn surviving_bindings(&self) -> Vec<&Binding> {
        let (markers, rest): (Vec<&Binding>, Vec<&Binding>) =
            self.bindings.iter().partition(|b| b.is_deletion());

        let markers: Vec<&Binding> = markers
            .into_iter()
            .filter(|m| self.matches_locale_and_platform(m))
            .collect();

        rest.into_iter()
            .filter(|b| !markers.iter().any(|m| m.deletes(b)))
            .collect()
    }

    fn candidates(&self, contexts: Option<&ContextSnapshot>) -> Candidates<'_> {
        let mut grouped = Candidates::new();
        for binding in self.surviving_bindings() {
            if contexts.is_some_and(|c| !c.contains(binding.context_id())) {
                continue;
            }
            if !self.matches_locale_and_platform(binding) {
                continue;
            }
            if self.scheme_rank(binding.scheme_id()).is_none() {
                continue;
            }
            grouped
                .entry(binding.trigger().clone())
                .or_default()
                .push(binding);
        }
        grouped
    }

    fn scheme_rank(&self, scheme_id: &str) -> Option<usize> {
        self.active_scheme_chain.iter().position(|id| id == scheme_id)
    }

    /// `Greater` when `a` beats `b`.
    ///
    /// Context specificity only applies with a snapshot; then the earlier
    /// scheme in the active chain, then the higher binding type.
    fn compare(&self, a: &Binding, b: &Binding, contexts: Option<&ContextSnapshot>) -> Ordering {
        if let Some(contexts) = contexts {
            if a.context_id() != b.context_id() {
                let depth = self.max_depth;
                let a_inside_b = contexts.is_ancestor(b.context_id(), a.context_id(), depth);
                let b_inside_a = contexts.is_ancestor(a.context_id(), b.context_id(), depth);
                match (a_inside_b, b_inside_a) {
                    (true, false) => return Ordering::Greater,
                    (false, true) => return Ordering::Less,
                    _ => {}
                }
            }
        }

        // Lower rank is more specific.
        let by_scheme = match (self.scheme_rank(a.scheme_id()), self.scheme_rank(b.scheme_id())) {
            (Some(ra), Some(rb)) => rb.cmp(&ra),
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => Ordering::Equal,
        };

        by_scheme.then_with(|| a.binding_type().cmp(&b.binding_type()))
    }

    /// Candidates that no other candidate in `group` strictly beats.
    ///
    /// `compare` is not transitive once context specificity is involved, so
    /// every pair is checked. The result keeps `group` order but its contents
    /// do not depend on it. A cycle of wins leaves the set empty.
    fn maximal<'a>(
        &self,
        group: &[&'a Binding],
        contexts: Option<&ContextSnapshot>,
    ) -> Vec<&'a Binding> {
        group
            .iter()
            .copied()
            .filter(|&candidate| {
                !group
                    .iter()
                    .any(|&other| self.compare(other, candidate, contexts) == Ordering::Greater)
            })
            .collect()
    }

    /// The winner of an ambiguity group, if the maximal candidates agree on
    /// one command.
    fn resolve_conflicts<'a>(
        &self,
        group: &[&'a Binding],
        contexts: &ContextSnapshot,
    ) -> Option<&'a Binding> {
        let best = self.maximal(group, Some(contexts));
        let (&first, rest) = best.split_first()?;
        rest.iter()
            .all(|b| b.command_id() == first.command_id())
            .then_some(first)
    }

    fn resolve_active(&self, contexts: &ContextSnapshot) -> ActiveBindings {
        let mut by_trigger = BTreeMap::new();
        let mut conflicts = BTreeMap::new();

        for (trigger, group) in self.candidates(Some(contexts)) {
            match self.resolve_conflicts(&group, contexts) {
                Some(winner) => {
                    if let Some(command) = winner.command_id() {
                        by_trigger.insert(trigger, command.to_string());
                    }
                }
                None => {
                    warn!(
                        trigger = %trigger,
                        commands = ?group.iter().filter_map(|b| b.command_id()).collect::<Vec<_>>(),
                        "Unresolved key binding conflict; trigger left unbound"
                    );
                    conflicts.insert(trigger, group.into_iter().cloned().collect());
                }
            }
        }

        let prefix_table = build_prefix_table(&by_trigger);
        ActiveBindings {
            by_trigger,
            prefix_table,
            conflicts,
        }
    }

    fn resolve_all(&self) -> AllBindings {
        self.candidates(None)
            .into_iter()
            .map(|(trigger, group)| {
                let best = self.maximal(&group, None);
                (trigger, best.into_iter().cloned().collect())
            })
            .collect()
    }
}

/// Index resolved triggers by their proper prefixes.
///
/// Each trigger gets an exact-match marker unless a longer trigger already
/// registered it as a prefix; each prefix maps the longer trigger to its command.
pub fn build_prefix_table(by_trigger: &BTreeMap<TriggerSequence, String>) -> PrefixTable {
    let mut table = PrefixTable::new();

    for (trigger, command) in by_trigger {
        table.entry(trigger.clone()).or_insert(None);
        for prefix in trigger.prefixes() {
            table
                .entry(prefix)
                .or_insert(None)
                .get_or_insert_with(BTreeMap::new)
                .insert(trigger.clone(), command.clone());
        }
    }

    table
}

impl std::fmt::Debug for BindingManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BindingManager")
            .field("bindings", &self.bindings.len())
            .field("active_scheme", &self.active_scheme)
            .field("locale", &self.locale)
            .field("platform", &self.platform)
            .field("cache", &self.cache)
            .field("listeners", &self.listeners)
            .finish()
    }
}
