//! REST client for the analytics service.

use crate::error::{ApiError, ApiResult};
use crate::types::{
    AnalyticsOverview, ChartSet, DataSource, LoginRequest, Metric, PredictionScenario,
    RegisterRequest, Report, TokenResponse, UploadReceipt, User,
};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use session_store::TokenStore;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Pull the FastAPI `detail` string out of an error body.
fn error_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(detail) if !detail.is_empty() => Some(detail.clone()),
        // Request validation failures carry a list of {loc, msg, type}
        serde_json::Value::Array(items) => items
            .first()
            .and_then(|item| item.get("msg"))
            .and_then(|msg| msg.as_str())
            .map(str::to_string),
        _ => None,
    }
}

/// Percent-encode `segment` so it stays a single path segment.
fn encode_segment(segment: &str) -> String {
    url::form_urlencoded::byte_serialize(segment.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// Client for the analytics service.
///
/// Cloning is cheap and clones share the connection pool and the
/// [`TokenStore`].
#[derive(Clone)]
pub struct ApiClient {
    http_client: reqwest::Client,
    base_url: Url,
    tokens: Arc<TokenStore>,
}

impl ApiClient {
    /// Create a client rooted at `base_url` (e.g. `http://localhost:8001`).
    ///
    /// `timeout` bounds every request from connect to last body byte.
    pub fn new(base_url: Url, tokens: Arc<TokenStore>, timeout: Duration) -> ApiResult<Self> {
        if base_url.cannot_be_a_base() {
            return Err(ApiError::Config(format!("not a base URL: {base_url}")));
        }

        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Config(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url,
            tokens,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The credential holder this client reads from.
    pub fn tokens(&self) -> &Arc<TokenStore> {
        &self.tokens
    }

    fn endpoint(&self, path: &str) -> ApiResult<Url> {
        let url = format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        Url::parse(&url).map_err(|e| ApiError::Config(format!("{url}: {e}")))
    }

    /// Start a request, attaching the bearer credential when one is stored.
    fn request(&self, method: Method, path: &str) -> ApiResult<RequestBuilder> {
        let url = self.endpoint(path)?;
        let mut builder = self
            .http_client
            .request(method, url)
            .header("Accept", "application/json");

        if let Some(token) = self.tokens.get()? {
            builder = builder.bearer_auth(token);
        }
        Ok(builder)
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder, what: &str) -> ApiResult<T> {
        let response = builder.send().await.map_err(|e| {
            warn!(error = %e, "{} request failed", what);
            ApiError::from_transport(e)
        })?;
        let response = Self::check_status(response, what).await?;

        let body = response.text().await.map_err(ApiError::from_transport)?;
        serde_json::from_str(&body).map_err(|e| {
            warn!(error = %e, body_len = body.len(), "{} returned an unexpected body", what);
            ApiError::Json(e)
        })
    }

    async fn check_status(response: Response, what: &str) -> ApiResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_detail(&body);
        warn!(
            status = %status,
            body_len = body.len(),
            detail = message.as_deref().unwrap_or(""),
            "{} rejected",
            what
        );

        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized(message.unwrap_or_default()));
        }
        Err(ApiError::Server { status, message })
    }

    /// `POST /api/auth/login`
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<TokenResponse> {
        debug!(email = %email, "Logging in");
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let builder = self.request(Method::POST, "/api/auth/login")?.json(&body);
        self.send(builder, "Login").await
    }

    /// `POST /api/auth/register`
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        company_name: &str,
    ) -> ApiResult<TokenResponse> {
        debug!(email = %email, company_name = %company_name, "Registering account");
        let body = RegisterRequest {
            email: email.to_string(),
            password: password.to_string(),
            company_name: company_name.to_string(),
        };
        let builder = self.request(Method::POST, "/api/auth/register")?.json(&body);
        self.send(builder, "Registration").await
    }

    /// `GET /api/auth/me`: verify the stored credential.
    pub async fn me(&self) -> ApiResult<User> {
        let builder = self.request(Method::GET, "/api/auth/me")?;
        self.send(builder, "Identity check").await
    }

    /// `GET /api/data/sources`, in server order.
    pub async fn list_sources(&self) -> ApiResult<Vec<DataSource>> {
        let builder = self.request(Method::GET, "/api/data/sources")?;
        let sources: Vec<DataSource> = self.send(builder, "Source listing").await?;
        debug!(count = sources.len(), "Fetched data sources");
        Ok(sources)
    }

    /// `POST /api/data/upload` with the file in multipart field `file`.
    pub async fn upload(&self, filename: &str, content: Vec<u8>) -> ApiResult<UploadReceipt> {
        let size = content.len();
        let part = reqwest::multipart::Part::bytes(content)
            .file_name(filename.to_string())
            .mime_str("text/csv")?;
        let form = reqwest::multipart::Form::new().part("file", part);

        debug!(filename = %filename, size, "Uploading file");
        let builder = self.request(Method::POST, "/api/data/upload")?.multipart(form);
        let receipt: UploadReceipt = self.send(builder, "Upload").await?;
        debug!(filename = %filename, rows = receipt.rows, "Upload accepted");
        Ok(receipt)
    }

    /// `GET /api/analytics/overview`
    pub async fn analytics_overview(&self) -> ApiResult<AnalyticsOverview> {
        let builder = self.request(Method::GET, "/api/analytics/overview")?;
        self.send(builder, "Analytics overview").await
    }

    /// `GET /api/analytics/metrics`
    pub async fn analytics_metrics(&self) -> ApiResult<Vec<Metric>> {
        let builder = self.request(Method::GET, "/api/analytics/metrics")?;
        self.send(builder, "Metric listing").await
    }

    /// `GET /api/analytics/charts`
    pub async fn analytics_charts(&self) -> ApiResult<ChartSet> {
        let builder = self.request(Method::GET, "/api/analytics/charts")?;
        self.send(builder, "Chart data").await
    }

    /// `POST /api/predict/analyze`: ask the service for a new forecast.
    pub async fn run_prediction(&self) -> ApiResult<PredictionScenario> {
        debug!("Requesting forecast");
        let builder = self.request(Method::POST, "/api/predict/analyze")?;
        self.send(builder, "Forecast").await
    }

    /// `GET /api/predict/scenarios`
    pub async fn prediction_scenarios(&self) -> ApiResult<Vec<PredictionScenario>> {
        let builder = self.request(Method::GET, "/api/predict/scenarios")?;
        self.send(builder, "Scenario listing").await
    }

    /// `POST /api/reports/generate`. Slow: the service drafts the report
    /// before answering.
    pub async fn generate_report(&self) -> ApiResult<Report> {
        debug!("Requesting report generation");
        let builder = self.request(Method::POST, "/api/reports/generate")?;
        let report: Report = self.send(builder, "Report generation").await?;
        debug!(report_id = %report.id, "Report generated");
        Ok(report)
    }

    /// `GET /api/reports/list`, newest first.
    pub async fn list_reports(&self) -> ApiResult<Vec<Report>> {
        let builder = self.request(Method::GET, "/api/reports/list")?;
        self.send(builder, "Report listing").await
    }

    /// `GET /api/reports/{id}`
    pub async fn report(&self, id: &str) -> ApiResult<Report> {
        let id = id.trim();
        if id.is_empty() {
            return Err(ApiError::Config("report id is empty".to_string()));
        }
        let builder = self.request(Method::GET, &format!("/api/reports/{}", encode_segment(id)))?;
        self.send(builder, "Report lookup").await
    }
}
