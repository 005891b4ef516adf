//! Resource lifecycle contract
//!
//! The host drives every managed resource through the same phases:
//! registration ([`Resource::metadata`], [`Resource::schema`]), a one-time
//! [`Resource::configure`] with the provider's shared data, then
//! create/read/update/delete calls. Calls for one resource instance are
//! sequential; calls for different instances may run concurrently.

use super::diagnostics::Diagnostics;
use super::schema::Schema;
use super::state::{Plan, State};
use async_trait::async_trait;

#[derive(Debug, Clone)]
pub struct MetadataRequest {
    /// Provider type name, e.g. `voltage`
    pub provider_type_name: String,
}

#[derive(Debug, Clone, Default)]
pub struct MetadataResponse {
    /// Fully-qualified resource type name, e.g. `voltage_dashboard`
    pub type_name: String,
}

#[derive(Debug, Clone)]
pub struct CreateRequest {
    pub plan: Plan,
}

#[derive(Debug, Clone, Default)]
pub struct CreateResponse {
    /// Stays null unless the resource was created
    pub state: State,
    pub diagnostics: Diagnostics,
}

#[derive(Debug, Clone)]
pub struct ReadRequest {
    pub state: State,
}

#[derive(Debug, Clone)]
pub struct ReadResponse {
    /// Starts as the prior state; null means the host should forget the resource
    pub state: State,
    pub diagnostics: Diagnostics,
}

impl ReadResponse {
    pub fn from_request(req: &ReadRequest) -> Self {
        Self {
            state: req.state.clone(),
            diagnostics: Diagnostics::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct UpdateRequest {
    pub plan: Plan,
    pub state: State,
}

#[derive(Debug, Clone)]
pub struct UpdateResponse {
    pub state: State,
    pub diagnostics: Diagnostics,
}

impl UpdateResponse {
    pub fn from_request(req: &UpdateRequest) -> Self {
        Self {
            state: req.state.clone(),
            diagnostics: Diagnostics::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DeleteRequest {
    pub state: State,
}

#[derive(Debug, Clone)]
pub struct DeleteResponse {
    /// Starts as the prior state; cleared once the remote delete succeeds
    pub state: State,
    pub diagnostics: Diagnostics,
}

impl DeleteResponse {
    pub fn from_request(req: &DeleteRequest) -> Self {
        Self {
            state: req.state.clone(),
            diagnostics: Diagnostics::new(),
        }
    }
}

/// A managed resource type
///
/// `ProviderData` is whatever the provider builds in its own configure step
/// and hands to each resource. It is typed, so a resource can never be
/// configured with the wrong kind of handle.
#[async_trait]
pub trait Resource: Send + Sync {
    type ProviderData: Send + Sync;

    fn metadata(&self, req: &MetadataRequest) -> MetadataResponse;

    fn schema(&self) -> Schema;

    /// Validate user configuration without touching the remote service
    fn validate_config(&self, config: &State) -> Diagnostics {
        self.schema().validate(config)
    }

    /// `None` is sent on host calls that only need metadata; it leaves the
    /// resource unconfigured and is not an error.
    fn configure(&mut self, provider_data: Option<Self::ProviderData>);

    async fn create(&self, req: CreateRequest) -> CreateResponse;

    async fn read(&self, req: ReadRequest) -> ReadResponse;

    async fn update(&self, req: UpdateRequest) -> UpdateResponse;

    async fn delete(&self, req: DeleteRequest) -> DeleteResponse;
}
