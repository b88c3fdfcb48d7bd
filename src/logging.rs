//! Structured logging setup for hosts embedding the binding engine.
//!
//! The engine itself only emits `tracing` events:
//! - `debug` for cache hits, misses and invalidations
//! - `info` when the binding set is replaced
//! - `warn` for unresolved conflicts and panicking listeners
//!
//! Hosts that already install a subscriber can ignore this module. Others call
//! [`init`] for compact stderr output, or [`init_with_file`] to also write JSONL.
//!
//! ```rust,ignore
//! let _guard = kit_keybindings::logging::init_with_file(&log_dir);
//! ```

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::error::ResultExt;

const LOG_FILE_NAME: &str = "keybindings.jsonl";

/// Guard that must be kept alive while file logging is wanted.
/// Dropping it flushes and closes the log file.
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
}

/// Filter directive used when `RUST_LOG` is unset.
pub fn default_filter() -> &'static str {
    "info,kit_keybindings=info"
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter()))
}

/// Install a compact stderr subscriber. Does nothing if one is already set.
pub fn init() {
    let pretty_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .compact();

    let _ = tracing_subscriber::registry()
        .with(env_filter())
        .with(pretty_layer)
        .try_init();
}

/// Install stderr output plus a JSONL file in `dir`.
///
/// Returns `None` when the file cannot be opened or a subscriber is already
/// installed; the failure is reported on stderr.
pub fn init_with_file(dir: &Path) -> Option<LoggingGuard> {
    fs::create_dir_all(dir).log_err()?;
    let log_path = dir.join(LOG_FILE_NAME);

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .map_err(|e| {
            eprintln!("[LOGGING] Failed to open log file {}: {}", log_path.display(), e);
            e
        })
        .ok()?;

    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file);

    let json_layer = fmt::layer()
        .json()
        .with_writer(non_blocking_file)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_target(true)
        .with_level(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_span_events(FmtSpan::NONE);

    let pretty_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .compact();

    if let Err(e) = tracing_subscriber::registry()
        .with(env_filter())
        .with(json_layer)
        .with(pretty_layer)
        .try_init()
    {
        eprintln!("[LOGGING] Subscriber already installed: {}", e);
        return None;
    }

    tracing::info!(
        event_type = "logging",
        log_path = %log_path.display(),
        "Key binding logging initialized"
    );

    Some(LoggingGuard {
        _file_guard: file_guard,
    })
}

/// Default log directory (~/.kit/logs/).
pub fn default_log_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".kit").join("logs"))
        .unwrap_or_else(|| std::env::temp_dir().join("kit-logs"))
}
