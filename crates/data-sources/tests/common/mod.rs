#![allow(dead_code)]

use api_client::ApiClient;
use data_sources::{DataSourceRegistry, ReconcileSettings};
use serde_json::{json, Value};
use session_store::TokenStore;
use std::sync::Arc;
use std::time::Duration;
use url::Url;
use wiremock::MockServer;

pub fn registry_for(server: &MockServer) -> Arc<DataSourceRegistry> {
    let tokens = Arc::new(TokenStore::in_memory());
    tokens.set("abc123").unwrap();
    let api = ApiClient::new(
        Url::parse(&server.uri()).unwrap(),
        tokens,
        Duration::from_secs(5),
    )
    .unwrap();
    Arc::new(DataSourceRegistry::new(api))
}

pub fn fast_reconcile(max_attempts: u32) -> ReconcileSettings {
    ReconcileSettings {
        interval_ms: 20,
        max_attempts,
    }
}

pub fn source(id: &str, name: &str, rows: u64, status: &str) -> Value {
    json!({
        "id": id,
        "user_id": "u-1",
        "name": name,
        "type": "csv",
        "rows_count": rows,
        "status": status,
        "created_at": "2024-05-01T10:00:00+00:00"
    })
}

/// Count of requests the server saw for `path`.
pub async fn hits(server: &MockServer, path: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == path)
        .count()
}
