//! JSONL file logging.
//!
//! Appends one JSON object per line to a log file that can be tailed
//! (`tail -f ~/.decisiv/logs/dev.jsonl | jq`). Every line is flushed as soon
//! as it is written so concurrent CLI invocations interleave whole lines.

use crate::json_layer::JsonLayer;
use crate::{env_filter_or, LogConfig};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{self, LineWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

/// `~/.decisiv/logs/dev.jsonl`, or the temp dir when there is no home.
pub(crate) fn default_log_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(".decisiv")
        .join("logs")
        .join("dev.jsonl")
}

/// Shared, line-flushed handle to the log file.
#[derive(Clone)]
pub(crate) struct JsonlFile {
    inner: Arc<Mutex<LineWriter<File>>>,
}

impl JsonlFile {
    /// Open `path` for appending, creating parent directories as needed.
    pub(crate) fn open(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            inner: Arc::new(Mutex::new(LineWriter::new(file))),
        })
    }
}

impl Write for JsonlFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.lock().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.lock().flush()
    }
}

impl<'a> MakeWriter<'a> for JsonlFile {
    type Writer = JsonlFile;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Install a subscriber that writes JSONL to the configured file.
pub(crate) fn init_file_subscriber(config: &LogConfig) -> io::Result<()> {
    let log_path = config.log_path.clone().unwrap_or_else(default_log_path);
    let file = JsonlFile::open(&log_path)?;

    let json_layer = JsonLayer::new(config.service_name.clone(), file)
        .with_filter(env_filter_or(&config.default_level));

    let stderr_layer = config.also_stderr.then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .compact()
            .with_writer(io::stderr)
            .with_filter(env_filter_or("warn"))
    });

    // A subscriber installed earlier keeps precedence.
    if tracing_subscriber::registry()
        .with(json_layer)
        .with(stderr_layer)
        .try_init()
        .is_ok()
    {
        tracing::debug!(log_path = %log_path.display(), "file logging initialized");
    }
    Ok(())
}
