//! Voltage Client
//!
//! Main client for the Voltage dashboard API, combining the API key,
//! endpoint and HTTP functionality.

use super::error::{ClientError, DashboardNotFound, InvalidApiResponseBody};
use super::http::{self, HttpError, VoltageHttpClient};
use super::models::{
    CreateDashboardRequest, Dashboard, DeleteDashboardRequest, NodeDashboardsRequest,
    NodeDashboardsResponse,
};
use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Default Voltage API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.voltage.cloud";

const OP_CREATE: &str = "Create dashboard";
const OP_READ: &str = "Read dashboard";
const OP_DELETE: &str = "Delete dashboard";

/// Main Voltage client
#[derive(Clone)]
pub struct VoltageClient {
    http: VoltageHttpClient,
    api_key: String,
    base_url: Url,
}

impl std::fmt::Debug for VoltageClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoltageClient")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl VoltageClient {
    /// Create a new Voltage client
    pub fn new(endpoint: &str, api_key: &str, timeout: Option<Duration>) -> Result<Self> {
        let base_url = parse_base_url(endpoint)?;
        let http = VoltageHttpClient::new(timeout).context("Failed to create HTTP client")?;

        Ok(Self {
            http,
            api_key: api_key.to_string(),
            base_url,
        })
    }

    /// Endpoint this client talks to
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build an API URL relative to the endpoint
    pub fn api_url(&self, path: &str) -> Result<String> {
        let url = self
            .base_url
            .join(path.trim_start_matches('/'))
            .with_context(|| format!("Invalid API path: {}", path))?;
        Ok(url.to_string())
    }

    async fn post<B, T>(&self, op: &str, path: &str, body: &B) -> Result<T>
    where
        B: serde::Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.api_url(path)?;
        let value = self
            .http
            .post(&url, &self.api_key, body)
            .await
            .map_err(|err| classify(op, err))?;

        decode(value)
    }

    /// Create a dashboard for a node
    pub async fn create_dashboard(&self, node_id: &str, dashboard_type: &str) -> Result<Dashboard> {
        let body = CreateDashboardRequest {
            node_id,
            dashboard_type,
        };
        self.post(OP_CREATE, "dashboards/create", &body).await
    }

    /// List the dashboards attached to a node
    ///
    /// A 404 whose body says the node was not found is reported as
    /// [`DashboardNotFound`]. Any other 404 (a wrong endpoint prefix, a proxy
    /// page) stays a [`ClientError`].
    pub async fn node_dashboards(&self, node_id: &str) -> Result<Vec<Dashboard>> {
        let body = NodeDashboardsRequest { node_id };
        let url = self.api_url("node/dashboards")?;

        match self.http.post(&url, &self.api_key, &body).await {
            Ok(value) => Ok(decode::<NodeDashboardsResponse>(value)?.dashboards),
            Err(HttpError::Status { status, body }) if is_missing_node(status, &body) => {
                tracing::debug!(node_id, "Voltage reports the node as missing");
                Err(anyhow::Error::new(DashboardNotFound {
                    node_id: node_id.to_string(),
                }))
            }
            Err(err) => Err(classify(OP_READ, err)),
        }
    }

    /// Delete a dashboard
    pub async fn delete_dashboard(&self, dashboard_id: &str) -> Result<()> {
        let body = DeleteDashboardRequest { dashboard_id };
        let _: Value = self.post(OP_DELETE, "dashboards/delete", &body).await?;
        Ok(())
    }
}

/// Parse an endpoint into a base URL that relative paths can be joined onto
pub fn parse_base_url(endpoint: &str) -> Result<Url> {
    let mut url =
        Url::parse(endpoint).with_context(|| format!("Invalid Voltage endpoint: {}", endpoint))?;
    if !matches!(url.scheme(), "http" | "https") {
        anyhow::bail!("Invalid Voltage endpoint scheme: {}", url.scheme());
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn classify(op: &str, err: HttpError) -> anyhow::Error {
    match err {
        HttpError::Status { status, body } => {
            let message = http::api_message(&body)
                .unwrap_or_else(|| http::status_message(status).to_string());
            anyhow::Error::new(ClientError::new(op, status.as_u16(), message))
        }
        HttpError::Decode(source) => anyhow::Error::new(InvalidApiResponseBody::from(source)),
        HttpError::Transport(source) => {
            anyhow::Error::new(source).context(format!("{} request failed", op))
        }
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T> {
    serde_json::from_value(value)
        .map_err(|source| anyhow::Error::new(InvalidApiResponseBody::from(source)))
}

fn is_missing_node(status: StatusCode, body: &str) -> bool {
    status == StatusCode::NOT_FOUND
        && http::api_message(body).is_some_and(|m| m.to_lowercase().contains("not found"))
}
