//! Tracing configuration and log routing.
//!
//! Logs go to stdout through a compact formatter and, when a log file can be
//! opened, to a non-blocking file appender as well. Because this is a library
//! embedded in a host application, the background writer's guard is handed to
//! the caller rather than parked in process state; keep it alive for as long
//! as buffered log lines should still be flushed.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const DEFAULT_LOG_DIR: &str = "logs";
const DEFAULT_LOG_FILE: &str = "reportqa.log";

/// Install the stdout and file subscribers for the process.
///
/// Respects `RUST_LOG` for filtering (defaults to `info`). The file target is
/// `REPORTQA_LOG_FILE` when set, otherwise `logs/reportqa.log`; when the file
/// cannot be opened, logging continues on stdout only and `None` is returned.
#[must_use]
pub fn init_tracing() -> Option<WorkerGuard> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout_layer = fmt::layer().with_target(false).compact();
    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer);

    match open_log_file(&resolve_log_path()) {
        Ok(file) => {
            let (writer, guard) = tracing_appender::non_blocking(file);
            let file_layer = fmt::layer()
                .with_writer(writer)
                .with_target(true)
                .with_ansi(false)
                .compact();
            registry.with(file_layer).init();
            Some(guard)
        }
        Err(error) => {
            registry.init();
            tracing::warn!(error = %error, "File logging disabled");
            None
        }
    }
}

/// Log file target: the `REPORTQA_LOG_FILE` override, else the default under
/// the logs directory.
fn resolve_log_path() -> PathBuf {
    std::env::var_os("REPORTQA_LOG_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|| Path::new(DEFAULT_LOG_DIR).join(DEFAULT_LOG_FILE))
}

/// Open the target for appending, creating parent directories as needed.
fn open_log_file(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    OpenOptions::new().create(true).append(true).open(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_log_path_prefers_env_override() {
        let dir = tempfile::tempdir().expect("tempdir");
        let custom = dir.path().join("custom.log");
        // SAFETY: this is the only test mutating this variable.
        unsafe { std::env::set_var("REPORTQA_LOG_FILE", &custom) };
        assert_eq!(resolve_log_path(), custom);
        unsafe { std::env::remove_var("REPORTQA_LOG_FILE") };
        assert_eq!(
            resolve_log_path(),
            Path::new(DEFAULT_LOG_DIR).join(DEFAULT_LOG_FILE)
        );
    }

    #[test]
    fn open_log_file_creates_parent_directories() {
        let dir = tempfile::tempdir().expect("tempdir");
        let nested = dir.path().join("nested").join("run.log");
        let file = open_log_file(&nested).expect("open log file");
        drop(file);
        assert!(nested.exists());
    }
}
