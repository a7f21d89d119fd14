use std::time::Duration;

use clipquery_logging::{cq_debug, cq_warn};
use reqwest::Response;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{ApiError, ApiErrorKind, JobStatusReport};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    /// Upper bound for a single request. Queries can take a while server-side.
    pub request_timeout: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(120),
        }
    }
}

/// The four backend operations the controller relies on.
#[async_trait::async_trait]
pub trait ApiClient: Send + Sync {
    /// `POST /process-video-async`; returns the job id.
    async fn start_job(&self, url: &str) -> Result<String, ApiError>;

    /// `GET /job-status/{job_id}`.
    async fn job_status(&self, job_id: &str) -> Result<JobStatusReport, ApiError>;

    /// `POST /query`; returns the answer text.
    async fn query(&self, query: &str, session_id: &str) -> Result<String, ApiError>;

    /// `POST /stop-session`. Any HTTP response counts as stopped; the body's
    /// `message` is returned when there is one.
    async fn stop_session(&self, session_id: &str) -> Result<Option<String>, ApiError>;
}

#[derive(Serialize)]
struct StartJobRequest<'a> {
    url: &'a str,
}

#[derive(Deserialize)]
struct StartJobResponse {
    job_id: String,
}

#[derive(Serialize)]
struct QueryRequest<'a> {
    query: &'a str,
    session_id: &'a str,
}

#[derive(Deserialize)]
struct QueryResponse {
    answer: String,
}

#[derive(Serialize)]
struct SessionRequest<'a> {
    session_id: &'a str,
}

#[derive(Deserialize)]
struct MessageBody {
    message: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: Option<serde_json::Value>,
}

#[derive(Debug, Clone)]
pub struct ReqwestApiClient {
    base_url: Url,
    http: reqwest::Client,
}

impl ReqwestApiClient {
    pub fn new(settings: &ClientSettings) -> Result<Self, ApiError> {
        let base_url = Url::parse(&settings.base_url)
            .map_err(|err| ApiError::new(ApiErrorKind::InvalidBaseUrl, err.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::new(
                ApiErrorKind::InvalidBaseUrl,
                format!("{} cannot be used as a base url", settings.base_url),
            ));
        }

        let http = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiError::new(ApiErrorKind::Network, err.to_string()))?;

        Ok(Self { base_url, http })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // Checked in `new`: the base url can carry path segments.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

#[async_trait::async_trait]
impl ApiClient for ReqwestApiClient {
    async fn start_job(&self, url: &str) -> Result<String, ApiError> {
        let endpoint = self.endpoint(&["process-video-async"]);
        cq_debug!("POST {}", endpoint);
        let response = self
            .http
            .post(endpoint)
            .json(&StartJobRequest { url })
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let body: StartJobResponse = read_json(response, "Failed to start job.").await?;
        Ok(body.job_id)
    }

    async fn job_status(&self, job_id: &str) -> Result<JobStatusReport, ApiError> {
        let endpoint = self.endpoint(&["job-status", job_id]);
        cq_debug!("GET {}", endpoint);
        let response = self
            .http
            .get(endpoint)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let fallback = response.status().to_string();
        read_json(response, &fallback).await
    }

    async fn query(&self, query: &str, session_id: &str) -> Result<String, ApiError> {
        let endpoint = self.endpoint(&["query"]);
        cq_debug!("POST {} session={} query_len={}", endpoint, session_id, query.len());
        let response = self
            .http
            .post(endpoint)
            .json(&QueryRequest { query, session_id })
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let body: QueryResponse = read_json(response, "Query failed.").await?;
        Ok(body.answer)
    }

    async fn stop_session(&self, session_id: &str) -> Result<Option<String>, ApiError> {
        let endpoint = self.endpoint(&["stop-session"]);
        cq_debug!("POST {} session={}", endpoint, session_id);
        let response = self
            .http
            .post(endpoint)
            .json(&SessionRequest { session_id })
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let status = response.status();
        if !status.is_success() {
            cq_warn!("stop-session returned {}", status);
        }
        let text = response.text().await.unwrap_or_default();
        Ok(serde_json::from_str::<MessageBody>(&text)
            .ok()
            .and_then(|body| body.message))
    }
}

/// Reads a JSON body, turning non-success statuses into `HttpStatus` errors.
///
/// Error bodies carrying a FastAPI-style `detail` use it as the message;
/// otherwise `fallback` is used.
async fn read_json<T: DeserializeOwned>(response: Response, fallback: &str) -> Result<T, ApiError> {
    let status = response.status();
    let text = response.text().await.map_err(map_reqwest_error)?;

    if !status.is_success() {
        let message = error_detail(&text).unwrap_or_else(|| fallback.to_string());
        return Err(ApiError::new(ApiErrorKind::HttpStatus(status.as_u16()), message));
    }

    serde_json::from_str(&text).map_err(|err| ApiError::new(ApiErrorKind::Decode, err.to_string()))
}

fn error_detail(body: &str) -> Option<String> {
    let body: ErrorBody = serde_json::from_str(body).ok()?;
    match body.detail? {
        serde_json::Value::String(text) => Some(text),
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(ApiErrorKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return ApiError::new(ApiErrorKind::Decode, err.to_string());
    }
    ApiError::new(ApiErrorKind::Network, err.to_string())
}
