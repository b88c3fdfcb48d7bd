//! Key binding resolution.
//!
//! This module provides:
//! - Trigger sequences with chord prefixes
//! - Bindings scoped by context, scheme, locale and platform
//! - Deletion markers that retract earlier declarations
//! - Deterministic conflict resolution (context, then scheme, then type)
//! - A per-world-state cache so queries stay cheap while contexts churn
//!
//! # Example
//!
//! ```ignore
//! use kit_keybindings::bindings::*;
//!
//! let mut manager = BindingManager::new();
//! manager.define_scheme("default", "Default", None);
//! manager.set_active_scheme("default")?;
//!
//! let save = TriggerSequence::single(KeyStroke::new("s", Modifiers::cmd()));
//! manager.add_binding(Binding::new(save.clone(), "file.save", "window", "default"))?;
//! manager.set_active_contexts(ContextSnapshot::new().with("window", None));
//!
//! assert_eq!(manager.get_perfect_match(&save).as_deref(), Some("file.save"));
//! ```

mod binding;
mod cache;
mod chain;
mod context;
mod events;
mod manager;
mod scheme;
mod types;


pub use binding::{Binding, BindingFilter, SYSTEM, USER};
pub use cache::{
    ActiveBindings, AllBindings, BindingCache, CachedBindingSet, PrefixEntry, PrefixTable,
    WorldState,
};
pub use chain::SpecificityChain;
pub use context::{ContextManager, ContextSnapshot};
pub use events::{BindingManagerEvent, ListenerId, ListenerRegistry};
pub use manager::{build_prefix_table, BindingManager};
pub use scheme::{Scheme, SchemeEvent, SchemeRegistry};
pub use types::{canonicalize_key, KeyStroke, Modifiers, TriggerSequence};
