//! Log sink setup
//!
//! Events go to stderr by default, or are appended to `log_file` when one is
//! configured. `RUST_LOG` overrides the default `info` filter.

use std::fs::OpenOptions;
use std::io::IsTerminal;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global tracing subscriber. Call once, before serving.
///
/// An unopenable log file is not fatal: logging falls back to stderr and the
/// failure is reported there.
pub fn init(log_file: Option<&str>) {
    let Some(path) = log_file else {
        init_stderr();
        return;
    };

    match OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => {
            tracing_subscriber::fmt()
                .with_ansi(false)
                .with_env_filter(env_filter())
                .with_writer(Mutex::new(file))
                .init();
        }
        Err(e) => {
            init_stderr();
            tracing::warn!("[log] cannot open log_file={} err={}, using stderr", path, e);
        }
    }
}

fn init_stderr() {
    tracing_subscriber::fmt()
        .with_ansi(std::io::stderr().is_terminal())
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .init();
}
