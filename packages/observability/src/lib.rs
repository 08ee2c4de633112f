//! Logging bootstrap for the Decisiv client binaries.
//!
//! A binary installs the global subscriber once, early in `main`, through
//! [`init_with_config`]. Library crates only emit `tracing` events.
//!
//! Two sinks exist:
//!
//! - stderr, compact and human readable (the default);
//! - a JSONL file, one [`LogEntry`] per line, selected by the `dev` feature
//!   or by setting [`LogConfig::log_path`]. Warnings can be mirrored to
//!   stderr alongside it.
//!
//! `RUST_LOG` always wins over the configured level.

mod file_sink;
mod json_layer;

use std::path::PathBuf;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

pub use json_layer::{JsonLayer, LogEntry};

/// How the global subscriber is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Stamped on every JSONL line.
    pub service_name: String,
    /// Filter directive used when `RUST_LOG` is unset.
    pub default_level: String,
    /// Write JSONL here instead of stderr.
    pub log_path: Option<PathBuf>,
    /// Mirror warnings to stderr while writing JSONL.
    pub also_stderr: bool,
}

impl LogConfig {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            default_level: "info".to_string(),
            log_path: None,
            also_stderr: false,
        }
    }

    pub fn level(mut self, level: impl Into<String>) -> Self {
        self.default_level = level.into();
        self
    }

    /// Switch to JSONL output at `path`, mirroring warnings to stderr.
    pub fn jsonl(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_path = Some(path.into());
        self.also_stderr = true;
        self
    }

    fn wants_file(&self) -> bool {
        cfg!(feature = "dev") || self.log_path.is_some()
    }
}

pub(crate) fn env_filter_or(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Install the global subscriber described by `config`.
///
/// When the JSONL file cannot be opened the stderr sink is installed instead
/// and the failure is logged there. Calling this a second time is a no-op.
pub fn init_with_config(config: LogConfig) {
    if config.wants_file() {
        match file_sink::init_file_subscriber(&config) {
            Ok(()) => return,
            Err(err) => {
                init_stderr(&config);
                tracing::warn!(error = %err, "JSONL log file unavailable, logging to stderr");
                return;
            }
        }
    }
    init_stderr(&config);
}

fn init_stderr(config: &LogConfig) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter_or(&config.default_level))
        .with_writer(std::io::stderr)
        .compact()
        .finish()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults_to_stderr_at_info() {
        let config = LogConfig::new("cli");
        assert_eq!(config.service_name, "cli");
        assert_eq!(config.default_level, "info");
        assert!(config.log_path.is_none());
        assert!(!config.also_stderr);
    }

    #[test]
    fn test_jsonl_enables_file_and_stderr_mirror() {
        let config = LogConfig::new("cli").level("debug").jsonl("/tmp/cli.jsonl");
        assert_eq!(config.default_level, "debug");
        assert_eq!(config.log_path, Some(PathBuf::from("/tmp/cli.jsonl")));
        assert!(config.also_stderr);
        assert!(config.wants_file());
    }
}
