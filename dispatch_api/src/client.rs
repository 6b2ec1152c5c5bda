use std::time::Duration;

use serde::Deserialize;

use crate::error::ApiError;

/// Body returned by the reference endpoint: `{"status":"OK","req_id":"<id>"}`
/// on success, `{"status":"error","error_msg":"..."}` on the documented
/// error statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    #[serde(default)]
    pub req_id: Option<String>,
    #[serde(default)]
    pub error_msg: Option<String>,
}

/// The classification a worker logs a completed (non-dropped) attempt
/// under. `Success` and `NonOk` both "consume a rate slot" -- they are
/// completed attempts, not failures to attempt.
#[derive(Debug)]
pub enum ApiOutcome {
    /// HTTP 200 and body `status == "OK"`.
    Success(ApiResponse),
    /// Any other HTTP status or body `status`.
    NonOk { status: u16, body: ApiResponse },
}

/// Thin wrapper over a `reqwest::Client` that issues the single GET call
/// the dispatcher makes, with an independent per-call I/O timeout.
pub struct ApiClient {
    http: reqwest::Client,
    url: String,
}

impl ApiClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
        }
    }

    /// `with_base_url` is kept distinct from `new` to mirror the
    /// production-vs-test constructor split used elsewhere in this
    /// codebase, even though today both just set the target URL.
    pub fn with_base_url(url: impl Into<String>) -> Self {
        Self::new(url)
    }

    /// Issues `GET {url}?api_key=..&nonce=..&req_id=..`, bounded by
    /// `io_timeout`. Classifies the outcome per the success predicate
    /// `(http_status == 200) && (body.status == "OK")`.
    pub async fn send(
        &self,
        api_key: &str,
        nonce: u64,
        req_id: u64,
        io_timeout: Duration,
    ) -> Result<ApiOutcome, ApiError> {
        let response = self
            .http
            .get(&self.url)
            .query(&[
                ("api_key", api_key.to_string()),
                ("nonce", nonce.to_string()),
                ("req_id", req_id.to_string()),
            ])
            .timeout(io_timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ApiError::IoTimeout
                } else {
                    ApiError::Transport(e)
                }
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::IoTimeout
            } else {
                ApiError::Transport(e)
            }
        })?;

        let body: ApiResponse = serde_json::from_str(&text)
            .map_err(|e| ApiError::Malformed(format!("{e}: body was {text:?}")))?;

        if status == reqwest::StatusCode::OK && body.status == "OK" {
            Ok(ApiOutcome::Success(body))
        } else {
            Ok(ApiOutcome::NonOk {
                status: status.as_u16(),
                body,
            })
        }
    }
}
