//! Data source ingestion for the Decisiv client.
//!
//! This crate provides:
//! - [`DataSourceRegistry`], a mirror of the server's source listing that is
//!   only ever replaced wholesale by a fresh fetch
//! - Bounded background reconciliation of sources still `pending`
//! - [`UploadCoordinator`], which validates, submits and serializes uploads
//! - [`UploadPolicy`], the declared set of accepted file kinds

mod accepted;
mod error;
mod reconcile;
mod registry;
mod upload;

pub use accepted::{AcceptedKind, UploadPolicy};
pub use error::{RegistryError, RegistryResult, UploadError, UploadResult};
pub use reconcile::{ReconcileEnd, ReconcileReport};
pub use registry::DataSourceRegistry;
pub use upload::{UploadCoordinator, UploadOutcome, UploadPhase};

pub use api_client::{DataSource, SourceKind, SourceStatus, UploadReceipt};
pub use client_config_and_utils::ReconcileSettings;
