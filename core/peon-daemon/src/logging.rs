//! Tracing setup for the `peon-pet` binary.
//!
//! Logs go to a daily-rolled file under `~/.peon-pet/logs` when that
//! directory can be created, otherwise to stderr. The returned guard flushes
//! the background writer and must live until `main` returns.

use std::env;
use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const LOG_FILE_PREFIX: &str = "peon-pet.log";

pub fn init(to_stderr: bool) -> Option<WorkerGuard> {
    let filter = env_filter();

    if !to_stderr {
        if let Some(dir) = log_dir() {
            if fs_err::create_dir_all(&dir).is_ok() {
                let appender = tracing_appender::rolling::daily(&dir, LOG_FILE_PREFIX);
                let (writer, guard) = tracing_appender::non_blocking(appender);
                let _ = tracing_subscriber::fmt()
                    .with_env_filter(filter)
                    .with_writer(writer)
                    .with_ansi(false)
                    .try_init();
                return Some(guard);
            }
        }
    }

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
    None
}

fn env_filter() -> EnvFilter {
    if debug_enabled(env::var("PEON_DEBUG_LOG").ok().as_deref()) {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

fn debug_enabled(value: Option<&str>) -> bool {
    matches!(value, Some("1" | "true" | "TRUE" | "yes" | "YES"))
}

fn log_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".peon-pet").join("logs"))
}
