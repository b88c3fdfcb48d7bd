//! Kit Keybindings - key binding resolution for Script Kit
//!
//! This library decides which command a key press (or chord of key presses)
//! runs, given the declared bindings and the application's current state:
//! active contexts, active scheme, locale and platform.
//!
//! - `bindings` - Triggers, bindings, schemes, contexts and the resolving manager
//! - `config` - Resolver settings loaded from `~/.kit/keybindings.json`
//! - `error` - Error types and logging helpers
//! - `logging` - Optional `tracing` subscriber setup for hosts

pub mod bindings;
pub mod config;
pub mod error;
pub mod logging;

pub use bindings::{
    Binding, BindingFilter, BindingManager, BindingManagerEvent, ContextManager,
    ContextSnapshot, KeyStroke, Modifiers, TriggerSequence,
};
pub use config::ResolverConfig;
pub use error::{BindingError, Result};
