//! Typed Voltage API errors
//!
//! The client returns [`anyhow::Error`] values; these types are what callers
//! look for with `downcast_ref` when they need to tell failures apart.

use thiserror::Error;

/// A request reached the API and was rejected.
///
/// `op` names the operation that failed (for example `"Create dashboard"`)
/// and is what gets shown to the user as the failure summary.
#[derive(Debug, Error)]
#[error("{op}: the API returned {status}: {message}")]
pub struct ClientError {
    pub op: String,
    pub status: u16,
    pub message: String,
}

impl ClientError {
    pub fn new(op: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        Self {
            op: op.into(),
            status,
            message: message.into(),
        }
    }
}

/// The API answered with a body that could not be decoded.
#[derive(Debug, Error)]
#[error("invalid API response body")]
pub struct InvalidApiResponseBody {
    #[from]
    source: serde_json::Error,
}

/// The dashboard no longer exists on the remote side.
#[derive(Debug, Error)]
#[error("dashboard not found for node {node_id}")]
pub struct DashboardNotFound {
    pub node_id: String,
}

/// Whether an error (or anything it wraps) reports a missing dashboard
pub fn is_not_found(err: &anyhow::Error) -> bool {
    err.downcast_ref::<DashboardNotFound>().is_some()
}
