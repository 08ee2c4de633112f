//! On-disk layout of the client directory.
//!
//! ```text
//! ~/.decisiv/
//!   config.json
//!   credentials.json
//!   logs/cli.jsonl
//! ```

use crate::{CoreError, CoreResult};
use std::path::{Path, PathBuf};

/// Relocates the whole client directory (tests, sandboxes).
const HOME_OVERRIDE_ENV: &str = "DECISIV_HOME";
const DIR_NAME: &str = ".decisiv";
const CONFIG_FILE: &str = "config.json";
const CREDENTIALS_FILE: &str = "credentials.json";
const LOGS_DIR: &str = "logs";
const LOG_FILE: &str = "cli.jsonl";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    root: PathBuf,
}

impl Paths {
    /// `$DECISIV_HOME` when set and non-empty, else `~/.decisiv`.
    pub fn new() -> CoreResult<Self> {
        let root = match std::env::var_os(HOME_OVERRIDE_ENV).filter(|v| !v.is_empty()) {
            Some(dir) => PathBuf::from(dir),
            None => dirs::home_dir()
                .map(|home| home.join(DIR_NAME))
                .ok_or_else(|| CoreError::Path("no home directory for this user".to_string()))?,
        };
        Ok(Self { root })
    }

    pub fn with_base_dir(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn base_dir(&self) -> &Path {
        &self.root
    }

    pub fn config_file(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    /// Backing file of the persisted session credential.
    pub fn credentials_file(&self) -> PathBuf {
        self.root.join(CREDENTIALS_FILE)
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join(LOGS_DIR)
    }

    pub fn log_file(&self) -> PathBuf {
        self.logs_dir().join(LOG_FILE)
    }

    /// Create the root and logs directories. Idempotent.
    pub fn ensure_dirs(&self) -> CoreResult<()> {
        for dir in [self.root.clone(), self.logs_dir()] {
            std::fs::create_dir_all(&dir)
                .map_err(|e| CoreError::Path(format!("cannot create {}: {e}", dir.display())))?;
        }
        Ok(())
    }
}
