//! Default configuration values
//!
//! All constants used throughout the config module are defined here.

/// Maximum number of resolved world states kept in the binding cache
pub const DEFAULT_CACHE_CAPACITY: usize = 32;

/// Upper bound on parent-link hops when ascending scheme or context hierarchies
pub const DEFAULT_MAX_ASCENT_DEPTH: usize = 64;

/// Separator between locale segments ("en_GB_POSIX")
pub const DEFAULT_LOCALE_SEPARATOR: &str = "_";

/// Locale used when neither config nor environment provide one
pub const FALLBACK_LOCALE: &str = "";
