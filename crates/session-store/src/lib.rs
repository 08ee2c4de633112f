//! Durable storage for the session credential.
//!
//! This crate provides:
//! - The [`SecureStorage`] backend trait
//! - [`FileStorage`], an owner-only JSON file used by the CLI
//! - [`MemoryStorage`], used by tests and simulated sessions
//! - [`TokenStore`], the single-key credential holder shared by the
//!   HTTP client and the auth gate

mod file;
mod keys;
mod memory;
mod token_store;
mod traits;

pub use file::FileStorage;
pub use keys::StorageKeys;
pub use memory::MemoryStorage;
pub use token_store::TokenStore;
pub use traits::SecureStorage;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("invalid value: {0}")]
    InvalidValue(String),

    /// Stored bytes could not be decoded.
    #[error("credential storage is corrupt: {0}")]
    Encoding(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;
