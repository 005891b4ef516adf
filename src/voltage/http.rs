//! HTTP utilities for Voltage REST API calls

use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Header carrying the Voltage API key
pub const AUTH_HEADER: &str = "X-VOLTAGE-AUTH";

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Failure of a single HTTP round trip
#[derive(Debug, Error)]
pub enum HttpError {
    /// The request never produced a response (DNS, TLS, timeout, ...)
    #[error("failed to send request: {0}")]
    Transport(#[source] reqwest::Error),

    /// The API answered with a non-success status
    #[error("API request failed: {status}")]
    Status { status: StatusCode, body: String },

    /// The API answered 2xx with a body that is not JSON
    #[error("failed to parse response JSON: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Sanitize response body for logging
/// Truncates long responses and strips control characters
fn sanitize_for_log(body: &str) -> String {
    let char_count = body.chars().count();
    let truncated = if char_count > MAX_LOG_BODY_LENGTH {
        let head: String = body.chars().take(MAX_LOG_BODY_LENGTH).collect();
        format!("{}... [truncated, {} bytes total]", head, body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// Extract the API's own error message from an error body, if it has one
pub fn api_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["message", "error", "detail"]
        .iter()
        .find_map(|key| value.get(key).and_then(|v| v.as_str()))
        .map(str::to_string)
}

/// User-facing description of a failed status
pub fn status_message(status: StatusCode) -> &'static str {
    match status.as_u16() {
        400 => "Invalid request. Check your parameters.",
        401 => "Authentication failed. Check your Voltage API key.",
        403 => "Permission denied. Check the API key's permissions.",
        404 => "Resource not found.",
        409 => "Resource conflict. The resource may already exist or be in use.",
        429 => "Rate limit exceeded. Please try again later.",
        500..=599 => "Voltage service temporarily unavailable. Please try again.",
        _ => "Request failed.",
    }
}

/// HTTP client wrapper for Voltage API calls
#[derive(Clone)]
pub struct VoltageHttpClient {
    client: Client,
}

impl VoltageHttpClient {
    /// Create a new HTTP client, optionally bounding every request
    pub fn new(timeout: Option<Duration>) -> Result<Self, HttpError> {
        let mut builder = Client::builder().user_agent(concat!(
            "voltage-provider/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(HttpError::Transport)?;

        Ok(Self { client })
    }

    /// Make a POST request with a JSON body to a Voltage API
    ///
    /// An empty success body is returned as [`Value::Null`].
    pub async fn post<B: Serialize + ?Sized>(
        &self,
        url: &str,
        api_key: &str,
        body: &B,
    ) -> Result<Value, HttpError> {
        tracing::debug!("POST {}", url);

        let response = self
            .client
            .post(url)
            .header(AUTH_HEADER, api_key)
            .json(body)
            .send()
            .await
            .map_err(HttpError::Transport)?;

        let status = response.status();
        let response_body = response.text().await.map_err(HttpError::Transport)?;

        if !status.is_success() {
            // Only the sanitized/truncated body is logged
            tracing::error!("API error: {} - {}", status, sanitize_for_log(&response_body));
            return Err(HttpError::Status {
                status,
                body: response_body,
            });
        }

        if response_body.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&response_body).map_err(HttpError::Decode)
    }
}
