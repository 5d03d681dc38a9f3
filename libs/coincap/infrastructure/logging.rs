//! Logging initialization

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Initialize tracing with standard configuration
///
/// Honors `RUST_LOG`, falls back to `info`.
pub fn init_tracing() {
    init_tracing_with_level("info");
}

/// Initialize tracing on stdout with a default level
///
/// A subscriber that is already installed is left in place.
pub fn init_tracing_with_level(level: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(level))
        .with_target(false)
        .with_thread_ids(false)
        .with_line_number(false)
        .try_init();
}

/// Initialize tracing into an append-only log file
///
/// Used by the terminal UI, where anything written to stdout would tear
/// the alternate screen.
pub fn init_file_tracing(path: impl AsRef<Path>, level: &str) -> std::io::Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let file = OpenOptions::new().create(true).append(true).open(path)?;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(level))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init();

    Ok(())
}
