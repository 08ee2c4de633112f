//! HTTP client for the Decisiv analytics service.
//!
//! Every request goes through [`ApiClient`], which reads the current
//! credential from a shared [`session_store::TokenStore`] and attaches it as
//! a bearer header. No retries are performed and a 401 is reported as
//! [`ApiError::Unauthorized`] without touching the stored credential.

mod client;
mod error;
mod types;

pub use client::ApiClient;
pub use error::{ApiError, ApiResult};
pub use types::{
    AnalyticsOverview, Chart, ChartSeries, ChartSet, DataSource, LoginRequest, Metric,
    PredictionScenario, RegisterRequest, Report, SourceKind, SourceStatus, TokenResponse,
    UploadReceipt, User,
};
