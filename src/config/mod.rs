//! Configuration module - resolver settings
//!
//! # Module Structure
//!
//! - `defaults` - All default constant values
//! - `types` - `ResolverConfig` with fallback getters
//! - `loader` - JSON loading from the file system

mod defaults;
mod loader;
mod types;

pub use defaults::{DEFAULT_CACHE_CAPACITY, DEFAULT_LOCALE_SEPARATOR, DEFAULT_MAX_ASCENT_DEPTH};
pub use loader::{default_config_path, load_config, try_load_config};
pub use types::{locale_from_lang, ResolverConfig};

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
