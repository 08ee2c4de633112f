//! Configuration, filesystem layout and logging bootstrap for the Decisiv client.

mod config;
mod error;
mod logging;
mod paths;

pub use config::{Config, ReconcileSettings, DEFAULT_API_URL, DEFAULT_LOG_LEVEL};
pub use error::{CoreError, CoreResult};
pub use logging::init_logging;
pub use paths::Paths;
