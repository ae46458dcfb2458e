//! Tracing subscriber setup.
//!
//! Headless commands log to stderr so stdout stays machine-readable. The
//! interactive session owns the terminal, so it logs to a file instead.

use std::fs;
use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Environment variable holding an `EnvFilter` directive.
pub const LOG_ENV: &str = "WALKTHRU_LOG";

pub const LOG_FILE: &str = "walkthru.log";

/// `WALKTHRU_LOG` if set and valid, else `default_directive`.
pub fn env_filter(default_directive: &str) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_env(LOG_ENV) {
        return Ok(filter);
    }
    EnvFilter::try_new(default_directive)
        .with_context(|| format!("Invalid log filter {default_directive:?}"))
}

/// Installs a stderr subscriber. A subscriber that is already installed wins.
pub fn init_stderr(default_directive: &str) -> Result<()> {
    let filter = env_filter(default_directive)?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
    Ok(())
}

/// Installs a non-blocking file subscriber writing to `dir/walkthru.log`.
///
/// The returned guard flushes on drop; keep it alive for the session.
pub fn init_file(dir: &Path, default_directive: &str) -> Result<WorkerGuard> {
    let filter = env_filter(default_directive)?;
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    let appender = tracing_appender::rolling::never(dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(writer)
        .try_init();
    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_default_directive_is_an_error() {
        if std::env::var_os(LOG_ENV).is_some() {
            return;
        }
        assert!(env_filter("walkthru=loud").is_err());
        assert!(env_filter("debug").is_ok());
    }

    #[test]
    fn test_file_logging_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let logs = dir.path().join("logs");
        let guard = init_file(&logs, "info").unwrap();
        assert!(logs.is_dir());
        drop(guard);
    }
}
