// Logging setup. The terminal belongs to the menu, so logs default to
// `warn` on stderr and can be redirected to a file with `PAKET_LOG_FILE`.

use std::fs::OpenOptions;
use std::path::PathBuf;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

const LOG_LEVEL_ENV: &str = "PAKET_LOG";
const LOG_FILE_ENV: &str = "PAKET_LOG_FILE";
const DEFAULT_LEVEL: &str = "warn";

/// Filter directive from `PAKET_LOG`: either a bare level (`debug`) applied
/// to this crate, or a full `EnvFilter` directive string.
pub fn filter_directive(raw: Option<&str>) -> String {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) if v.contains('=') || v.contains(',') => v.to_string(),
        Some(v) => format!("paket_cli={}", v.to_ascii_lowercase()),
        None => format!("paket_cli={}", DEFAULT_LEVEL),
    }
}

/// Parse log file path from PAKET_LOG_FILE env var.
pub fn parse_log_file_from_env() -> Option<PathBuf> {
    std::env::var(LOG_FILE_ENV).ok().and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(PathBuf::from(trimmed))
        }
    })
}

/// Install the global subscriber. Safe to call more than once.
pub fn init() {
    let level = std::env::var(LOG_LEVEL_ENV).ok();
    let filter = EnvFilter::try_new(filter_directive(level.as_deref()))
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(None)));

    let file = parse_log_file_from_env().and_then(|path| {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .ok()
    });

    let writer = match file {
        Some(file) => BoxMakeWriter::new(file),
        None => BoxMakeWriter::new(std::io::stderr),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_target(false)
        .try_init()
        .ok();
}
