//! Shared HTTP plumbing for the auth and task clients.
//!
//! `ApiClient` owns the base URL, the pooled `reqwest::Client` and the
//! in-flight registry. The endpoint-specific clients wrap a clone of it.

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::in_flight::{InFlight, InFlightGuard, Operation};
use super::{ApiError, ApiResult};

// ============================================================================
// Endpoints
// ============================================================================

pub const LOGIN_PATH: &str = "/auth/api/v1/login";
pub const SIGNUP_PATH: &str = "/auth/api/v1/signup";
pub const PROFILE_PATH: &str = "/auth/api/v1/profile";
pub const LOGOUT_PATH: &str = "/auth/api/v1/logout";
pub const CREATE_TASK_PATH: &str = "/todos/api/v1/create";
pub const LIST_TASKS_PATH: &str = "/todos/api/v1/get";

/// HTTP core for the to-do service.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling,
/// and clones share the in-flight registry.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    in_flight: InFlight,
}

impl ApiClient {
    /// Create a client with the HTTP layer's default timeouts
    pub fn new(base_url: &str) -> ApiResult<Self> {
        Self::build(base_url, None)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> ApiResult<Self> {
        Self::build(base_url, Some(timeout))
    }

    fn build(base_url: &str, timeout: Option<Duration>) -> ApiResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            in_flight: InFlight::new(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn http(&self) -> &Client {
        &self.client
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub(crate) fn begin(&self, op: Operation) -> ApiResult<InFlightGuard> {
        self.in_flight.begin(op)
    }

    /// Whether a request of this kind is currently on the wire
    pub fn is_in_flight(&self, op: Operation) -> bool {
        self.in_flight.is_active(op)
    }

    /// Pass successful responses through; otherwise read the body and let
    /// `on_error` pick the error for this endpoint.
    pub(crate) async fn check_response(
        response: Response,
        on_error: impl FnOnce(StatusCode, &str) -> ApiError,
    ) -> ApiResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        debug!(status = %status, "Request failed");
        Err(on_error(status, &body))
    }

    /// Read a JSON body, reporting decode failures as malformed responses
    pub(crate) async fn read_json<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            ApiError::MalformedResponse(format!("{} in {}", e, ApiError::truncate_body(&text)))
        })
    }
}

/// Status mapping for endpoints that reject stale tokens with 401/403.
pub(crate) fn rejection_or(rejected: ApiError) -> impl FnOnce(StatusCode, &str) -> ApiError {
    move |status: StatusCode, body: &str| match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => rejected,
        _ => ApiError::from_status(status, body),
    }
}
