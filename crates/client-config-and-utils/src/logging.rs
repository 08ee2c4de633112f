//! Logging initialization for the client binaries.

use crate::Paths;
use observability::LogConfig;

/// Initialize logging for a client binary.
///
/// Level comes from `RUST_LOG` when set, otherwise `level`. When
/// `DECISIV_LOG_JSON` is set, events are also written as JSONL under the
/// client's logs directory.
pub fn init_logging(service_name: &str, level: &str, paths: &Paths) {
    let mut config = LogConfig::new(service_name).level(level);
    if std::env::var_os("DECISIV_LOG_JSON").is_some_and(|v| !v.is_empty()) {
        config = config.jsonl(paths.log_file());
    }
    observability::init_with_config(config);
}
