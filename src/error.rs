use std::fmt;
use std::panic::Location;
use std::path::PathBuf;

use thiserror::Error;
use tracing::{error, warn, Level};

/// Errors raised at the mutator boundary of the binding engine.
///
/// Ambiguous bindings are not represented here: an unresolvable trigger is a
/// normal runtime condition and simply resolves to "no binding".
#[derive(Error, Debug)]
pub enum BindingError {
    #[error("{kind} '{id}' is not defined")]
    NotDefined { kind: &'static str, id: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Failed to load configuration from '{path}': {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: ConfigSource,
    },
}

/// Underlying cause of a configuration failure.
#[derive(Error, Debug)]
pub enum ConfigSource {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl BindingError {
    pub fn scheme_not_defined(id: impl Into<String>) -> Self {
        Self::NotDefined {
            kind: "Scheme",
            id: id.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn is_not_defined(&self) -> bool {
        matches!(self, Self::NotDefined { .. })
    }
}

pub type Result<T> = std::result::Result<T, BindingError>;

/// Extension trait for logging recoverable failures with the caller location.
///
/// ```ignore
/// use kit_keybindings::error::ResultExt;
///
/// let config = try_load_config(&path).warn_on_err().unwrap_or_default();
/// ```
pub trait ResultExt<T> {
    /// Log error with caller location and return None. Use for recoverable failures.
    fn log_err(self) -> Option<T>;
    /// Log as warning with caller location and return None. Use for expected failures.
    fn warn_on_err(self) -> Option<T>;
}

impl<T, E: fmt::Display> ResultExt<T> for std::result::Result<T, E> {
    #[track_caller]
    fn log_err(self) -> Option<T> {
        let caller = Location::caller();
        self.map_err(|err| report(Level::ERROR, &err, caller)).ok()
    }

    #[track_caller]
    fn warn_on_err(self) -> Option<T> {
        let caller = Location::caller();
        self.map_err(|err| report(Level::WARN, &err, caller)).ok()
    }
}

fn report(level: Level, err: &dyn fmt::Display, caller: &Location<'_>) {
    if level == Level::ERROR {
        error!(error = %err, location = %caller, "Key binding operation failed");
    } else {
        warn!(error = %err, location = %caller, "Key binding operation degraded");
    }
}
