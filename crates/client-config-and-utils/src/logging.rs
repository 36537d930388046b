//! Logging initialization for the client.
//!
//! Thin wrapper over the observability crate. Every log line goes to
//! `~/.ccsms/logs/client.jsonl` as structured JSONL.

use observability::LogConfig;
use tracing::Level;

/// Initialize the logging system.
///
/// `RUST_LOG` takes precedence over `level` when set.
pub fn init_logging(service_name: &str, level: &str, also_stderr: bool) {
    observability::init_with_config(LogConfig {
        service_name: service_name.to_string(),
        default_level: parse_level(level).as_str().to_ascii_lowercase(),
        log_path: None,
        also_stderr,
    });
}

/// Parse a log level string into a tracing Level. Unknown values map to INFO.
pub fn parse_level(level: &str) -> Level {
    match level.trim().to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}
