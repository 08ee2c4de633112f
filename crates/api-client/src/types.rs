//! Wire types for the analytics service.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Account identity as returned by `/api/auth/me` and the login calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub company_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default)]
    pub is_demo: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub company_name: String,
}

/// Body returned by login and registration.
///
/// Older deployments only send `token`, so `user` is optional.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub token: String,
    #[serde(default)]
    pub user: Option<User>,
}

/// Origin of a data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Csv,
    Api,
    Sql,
    /// Seeded sample data created for new accounts
    Demo,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SourceKind::Csv => "csv",
            SourceKind::Api => "api",
            SourceKind::Sql => "sql",
            SourceKind::Demo => "demo",
        };
        f.write_str(s)
    }
}

/// Processing status of a data source.
///
/// `processing` and `error` are accepted as synonyms of `pending` and
/// `failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceStatus {
    #[serde(alias = "processing")]
    Pending,
    Completed,
    #[serde(alias = "error")]
    Failed,
}

impl SourceStatus {
    /// `completed` and `failed` never transition further.
    pub fn is_terminal(self) -> bool {
        matches!(self, SourceStatus::Completed | SourceStatus::Failed)
    }
}

impl fmt::Display for SourceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SourceStatus::Pending => "pending",
            SourceStatus::Completed => "completed",
            SourceStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// One entry of `GET /api/data/sources`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSource {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: SourceKind,
    #[serde(rename = "rows_count", default)]
    pub row_count: u64,
    pub status: SourceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Response of `POST /api/data/upload`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadReceipt {
    pub rows: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_source_id: Option<String>,
}

/// A computed business metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub value: f64,
    #[serde(default)]
    pub change_percentage: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
}

/// Response of `GET /api/analytics/overview`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsOverview {
    pub total_metrics: u64,
    pub total_sources: u64,
    #[serde(default)]
    pub key_metrics: Vec<Metric>,
}

/// One labelled series of a chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub label: String,
    #[serde(default)]
    pub data: Vec<f64>,
}

/// A chart as served by `GET /api/analytics/charts`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chart {
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub datasets: Vec<ChartSeries>,
}

/// Charts keyed by name (`revenue_chart`, `cost_chart`, ...).
pub type ChartSet = BTreeMap<String, Chart>;

/// A forecast with optimistic, conservative and critical projections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionScenario {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub metric_name: String,
    #[serde(default)]
    pub optimistic: Vec<f64>,
    #[serde(default)]
    pub conservative: Vec<f64>,
    #[serde(default)]
    pub critical: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// A generated decision report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}
