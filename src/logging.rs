//! Structured JSONL logging to file and compact human-readable stderr output.
//!
//! - **JSONL to file** (~/.whispr/logs/whispr-hotkeys.jsonl) - one JSON object per line
//! - **Compact to stderr** - for whoever is watching the terminal
//!
//! # Usage
//!
//! ```rust,ignore
//! use whispr_hotkeys::logging;
//!
//! // Keep the guard alive for the duration of the program
//! let _guard = logging::init();
//!
//! tracing::info!(binding = "record_toggle", "Hotkey pressed");
//! ```
//!
//! # JSONL Output Format
//!
//! ```json
//! {"timestamp":"2026-03-02T10:30:45.123Z","level":"INFO","target":"whispr_hotkeys::hotkeys","fields":{"message":"Registered global hotkeys","policy":"Serial"}}
//! ```

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Filter used when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_FILTER: &str = "info";

const LOG_FILE_NAME: &str = "whispr-hotkeys.jsonl";

/// Flushes and closes the log file when dropped.
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
}

/// Initialize file and stderr logging.
///
/// Returns a guard that MUST be kept alive for the duration of the program.
/// Panics if a global subscriber is already installed.
pub fn init() -> LoggingGuard {
    let log_dir = get_log_dir();
    if let Err(e) = fs::create_dir_all(&log_dir) {
        eprintln!("[LOGGING] Failed to create log directory: {}", e);
    }

    let log_path = log_dir.join(LOG_FILE_NAME);
    let file: Box<dyn Write + Send> = match OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => Box::new(file),
        Err(e) => {
            eprintln!("[LOGGING] Failed to open log file: {}", e);
            Box::new(io::sink())
        }
    };

    // Non-blocking so a slow disk never stalls the hotkey event thread
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file);

    let json_layer = fmt::layer()
        .json()
        .with_writer(non_blocking_file)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_target(true)
        .with_level(true)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .with_span_events(FmtSpan::NONE);

    let stderr_layer = fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .with_level(true)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter())
        .with(json_layer)
        .with(stderr_layer)
        .init();

    tracing::debug!(log_path = %log_path.display(), "Logging initialized");

    LoggingGuard {
        _file_guard: file_guard,
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// ~/.whispr/logs, or a temp dir when there is no home directory
fn get_log_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".whispr").join("logs"))
        .unwrap_or_else(|| std::env::temp_dir().join("whispr-logs"))
}

/// Path of the JSONL log file.
pub fn log_path() -> PathBuf {
    get_log_dir().join(LOG_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_path_is_jsonl_under_log_dir() {
        let path = log_path();
        assert_eq!(path.file_name().unwrap(), LOG_FILE_NAME);
        assert_eq!(path.parent().unwrap(), get_log_dir());
    }

    #[test]
    fn default_filter_parses() {
        assert!(EnvFilter::try_new(DEFAULT_FILTER).is_ok());
    }
}
