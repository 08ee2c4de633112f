//! Integration tests for the analytics service client against a mock server.

use api_client::{ApiClient, ApiError, SourceKind, SourceStatus};
use serde_json::json;
use session_store::TokenStore;
use std::sync::Arc;
use std::time::Duration;
use url::Url;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer, tokens: Arc<TokenStore>) -> ApiClient {
    ApiClient::new(
        Url::parse(&server.uri()).unwrap(),
        tokens,
        Duration::from_secs(5),
    )
    .unwrap()
}

#[tokio::test]
async fn test_login_posts_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({"email": "a@b.com", "password": "secret"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "abc123",
            "user": {"id": "u-1", "email": "a@b.com", "company_name": "Acme", "is_demo": true}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, Arc::new(TokenStore::in_memory()));
    let resp = client.login("a@b.com", "secret").await.unwrap();

    assert_eq!(resp.token, "abc123");
    assert_eq!(resp.user.unwrap().company_name, "Acme");
}

#[tokio::test]
async fn test_bearer_attached_when_credential_present() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .and(header("Authorization", "Bearer abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "u-1", "email": "a@b.com", "company_name": "Acme"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let tokens = Arc::new(TokenStore::in_memory());
    tokens.set("abc123").unwrap();
    let user = client_for(&server, tokens).me().await.unwrap();

    assert_eq!(user.email, "a@b.com");
}

#[tokio::test]
async fn test_no_authorization_header_without_credential() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/data/sources"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, Arc::new(TokenStore::in_memory()));
    let sources = client.list_sources().await.unwrap();
    assert!(sources.is_empty());

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(!requests[0].headers.contains_key("authorization"));
}

#[tokio::test]
async fn test_credential_change_is_seen_by_next_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/data/sources"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let tokens = Arc::new(TokenStore::in_memory());
    let client = client_for(&server, tokens.clone());

    client.list_sources().await.unwrap();
    tokens.set("fresh").unwrap();
    client.list_sources().await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert!(!requests[0].headers.contains_key("authorization"));
    assert_eq!(
        requests[1]
            .headers
            .get("authorization")
            .unwrap()
            .to_str()
            .unwrap(),
        "Bearer fresh"
    );
}

#[tokio::test]
async fn test_unauthorized_keeps_credential() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/data/sources"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"detail": "Token expirado"})),
        )
        .mount(&server)
        .await;

    let tokens = Arc::new(TokenStore::in_memory());
    tokens.set("stale").unwrap();
    let err = client_for(&server, tokens.clone())
        .list_sources()
        .await
        .unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(err.user_message("fallback"), "Token expirado");
    assert_eq!(tokens.get().unwrap(), Some("stale".to_string()));
}

#[tokio::test]
async fn test_list_sources_preserves_server_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/data/sources"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "b", "name": "zeta.csv", "type": "csv", "rows_count": 10, "status": "processing"},
            {"id": "a", "name": "alpha", "type": "demo", "rows_count": 0, "status": "completed"}
        ])))
        .mount(&server)
        .await;

    let sources = client_for(&server, Arc::new(TokenStore::in_memory()))
        .list_sources()
        .await
        .unwrap();

    let ids: Vec<_> = sources.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, ["b", "a"]);
    assert_eq!(sources[0].status, SourceStatus::Pending);
    assert_eq!(sources[1].kind, SourceKind::Demo);
}

#[tokio::test]
async fn test_upload_sends_multipart_file_field() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/data/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "ok",
            "rows": 500,
            "columns": ["month", "revenue"],
            "data_source_id": "ds-1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let receipt = client_for(&server, Arc::new(TokenStore::in_memory()))
        .upload("report.csv", b"month,revenue\njan,10\n".to_vec())
        .await
        .unwrap();
    assert_eq!(receipt.rows, 500);
    assert_eq!(receipt.data_source_id.as_deref(), Some("ds-1"));

    let requests = server.received_requests().await.unwrap();
    let content_type = requests[0]
        .headers
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(content_type.starts_with("multipart/form-data"));

    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains(r#"name="file""#));
    assert!(body.contains(r#"filename="report.csv""#));
    assert!(body.contains("jan,10"));
}

#[tokio::test]
async fn test_server_error_carries_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/data/upload"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "detail": "Erro ao processar arquivo: empty"
        })))
        .mount(&server)
        .await;

    let err = client_for(&server, Arc::new(TokenStore::in_memory()))
        .upload("empty.csv", Vec::new())
        .await
        .unwrap_err();

    match err {
        ApiError::Server { status, message } => {
            assert_eq!(status.as_u16(), 400);
            assert_eq!(message.as_deref(), Some("Erro ao processar arquivo: empty"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_timeout_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/analytics/overview"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"total_metrics": 0, "total_sources": 0, "key_metrics": []}))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let client = ApiClient::new(
        Url::parse(&server.uri()).unwrap(),
        Arc::new(TokenStore::in_memory()),
        Duration::from_millis(50),
    )
    .unwrap();

    let err = client.analytics_overview().await.unwrap_err();
    assert!(matches!(err, ApiError::Timeout));
}

#[tokio::test]
async fn test_analytics_metrics() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/analytics/metrics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "m-1", "user_id": "u-1", "name": "revenue", "value": 10.0, "change_percentage": 2.5, "period": "monthly"},
            {"id": "m-2", "user_id": "u-1", "name": "churn", "value": 0.04}
        ])))
        .mount(&server)
        .await;

    let metrics = client_for(&server, Arc::new(TokenStore::in_memory()))
        .analytics_metrics()
        .await
        .unwrap();

    assert_eq!(metrics.len(), 2);
    assert_eq!(metrics[1].change_percentage, 0.0);
}

#[tokio::test]
async fn test_malformed_body_is_json_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let err = client_for(&server, Arc::new(TokenStore::in_memory()))
        .me()
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Json(_)));
}

#[tokio::test]
async fn test_analytics_charts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/analytics/charts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "revenue_chart": {"labels": ["Jan", "Fev"], "datasets": [{"label": "Receita (R$)", "data": [180000, 195000]}]},
            "cost_chart": {"labels": ["Jan", "Fev"], "datasets": [{"label": "Custos (R$)", "data": [85000, 88000]}]}
        })))
        .mount(&server)
        .await;

    let charts = client_for(&server, Arc::new(TokenStore::in_memory()))
        .analytics_charts()
        .await
        .unwrap();

    assert_eq!(charts.keys().collect::<Vec<_>>(), ["cost_chart", "revenue_chart"]);
    assert_eq!(charts["cost_chart"].datasets[0].data, [85000.0, 88000.0]);
}

#[tokio::test]
async fn test_run_prediction_posts_with_credential() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/predict/analyze"))
        .and(header("authorization", "Bearer abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "p-1",
            "user_id": "u-1",
            "metric_name": "Receita Mensal",
            "optimistic": [345000.0, 356500.0],
            "conservative": [300000.0, 310000.0],
            "critical": [255000.0, 263500.0],
            "created_at": "2024-05-01T10:00:00+00:00"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let tokens = Arc::new(TokenStore::in_memory());
    tokens.set("abc123").unwrap();
    let scenario = client_for(&server, tokens).run_prediction().await.unwrap();

    assert_eq!(scenario.metric_name, "Receita Mensal");
    assert_eq!(scenario.conservative.len(), 2);
    assert!(scenario.optimistic[0] > scenario.critical[0]);
}

#[tokio::test]
async fn test_prediction_scenarios() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/predict/scenarios"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"metric_name": "Receita Mensal", "optimistic": [1.0], "conservative": [1.0], "critical": [1.0]}
        ])))
        .mount(&server)
        .await;

    let scenarios = client_for(&server, Arc::new(TokenStore::in_memory()))
        .prediction_scenarios()
        .await
        .unwrap();

    assert_eq!(scenarios.len(), 1);
    assert!(scenarios[0].id.is_none());
}

#[tokio::test]
async fn test_generate_report_failure_surfaces_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/reports/generate"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"detail": "Chave OpenAI não configurada"})),
        )
        .mount(&server)
        .await;

    let err = client_for(&server, Arc::new(TokenStore::in_memory()))
        .generate_report()
        .await
        .unwrap_err();

    assert_eq!(err.user_message("Failed to generate report"), "Chave OpenAI não configurada");
}

#[tokio::test]
async fn test_reports_list_and_lookup() {
    let server = MockServer::start().await;
    let report = json!({
        "id": "r-1",
        "user_id": "u-1",
        "title": "Relatório Executivo - 01/05/2024",
        "summary": "Receita em alta",
        "content": "Receita em alta\n1. ...",
        "created_at": "2024-05-01T10:00:00+00:00"
    });
    Mock::given(method("GET"))
        .and(path("/api/reports/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([report.clone()])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/reports/r-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(report))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/reports/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Relatório não encontrado"})))
        .mount(&server)
        .await;

    let client = client_for(&server, Arc::new(TokenStore::in_memory()));

    let reports = client.list_reports().await.unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].summary, "Receita em alta");

    let found = client.report("r-1").await.unwrap();
    assert_eq!(found, reports[0]);

    let err = client.report("missing").await.unwrap_err();
    assert!(matches!(
        err,
        ApiError::Server { status, .. } if status == reqwest::StatusCode::NOT_FOUND
    ));
    assert!(matches!(client.report("  ").await, Err(ApiError::Config(_))));
}
