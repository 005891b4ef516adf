//! `voltage_dashboard` resource
//!
//! Maps a Voltage node dashboard (a ThunderHub or LNbits instance attached
//! to a node) onto the resource lifecycle. Dashboards cannot be modified in
//! place: both inputs force replacement and [`Resource::update`] always
//! fails.

use super::client::DashboardApi;
use super::diagnostics::Diagnostics;
use super::resource::{
    CreateRequest, CreateResponse, DeleteRequest, DeleteResponse, MetadataRequest,
    MetadataResponse, ReadRequest, ReadResponse, Resource, UpdateRequest, UpdateResponse,
};
use super::schema::{Attribute, Schema, StringValidator};
use super::ProviderClient;
use crate::voltage::error::{is_not_found, ClientError, InvalidApiResponseBody};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Current dashboard schema version
pub const SCHEMA_VERSION: u64 = 1;

/// Dashboard application deployed next to a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DashboardType {
    Thunderhub,
    Lnbits,
}

impl DashboardType {
    pub const ALL: [DashboardType; 2] = [DashboardType::Thunderhub, DashboardType::Lnbits];

    pub fn as_str(self) -> &'static str {
        match self {
            DashboardType::Thunderhub => "thunderhub",
            DashboardType::Lnbits => "lnbits",
        }
    }
}

impl fmt::Display for DashboardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DashboardType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DashboardType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("Unknown dashboard type: {}", s))
    }
}

/// State shape of a dashboard
///
/// Computed fields are `None` until the remote service has assigned them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardModel {
    #[serde(default)]
    pub dashboard_id: Option<String>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub dashboard_name: Option<String>,
    #[serde(default)]
    pub node_name: Option<String>,
    pub node_id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(rename = "type")]
    pub dashboard_type: DashboardType,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub update_available: Option<bool>,
}

impl DashboardModel {
    /// A not-yet-created dashboard carrying only the caller's inputs
    pub fn new(node_id: impl Into<String>, dashboard_type: DashboardType) -> Self {
        Self {
            dashboard_id: None,
            created: None,
            dashboard_name: None,
            node_name: None,
            node_id: node_id.into(),
            status: None,
            dashboard_type,
            endpoint: None,
            version: None,
            update_available: None,
        }
    }
}

/// Schema of the `voltage_dashboard` resource
pub fn dashboard_schema() -> Schema {
    Schema::new(SCHEMA_VERSION, "Creates and manages a dashboard in Voltage")
        .with_attribute(
            "dashboard_id",
            Attribute::computed_string().with_description("Identifier assigned by Voltage"),
        )
        .with_attribute("created", Attribute::computed_string())
        .with_attribute("node_name", Attribute::computed_string())
        .with_attribute("dashboard_name", Attribute::computed_string())
        .with_attribute("status", Attribute::computed_string())
        .with_attribute("endpoint", Attribute::computed_string())
        .with_attribute("version", Attribute::computed_string())
        .with_attribute("update_available", Attribute::computed_bool())
        .with_attribute(
            "node_id",
            Attribute::required_string()
                .with_description("Node which connects to the dashboard")
                .with_validator(StringValidator::NotEmpty)
                .requires_replace(),
        )
        .with_attribute(
            "type",
            Attribute::required_string()
                .with_description("Dashboard application. Can be either 'thunderhub' or 'lnbits'.")
                .with_validator(StringValidator::one_of(
                    DashboardType::ALL.iter().map(|t| t.as_str()),
                ))
                .requires_replace(),
        )
}

/// Translate a client error into diagnostics
///
/// The summary is the failed operation when the error carries one, a fixed
/// message for undecodable responses, and a generic one otherwise. The
/// detail is always the full error chain.
pub fn err_to_diags(err: &anyhow::Error) -> Diagnostics {
    let summary = if let Some(client_err) = err.downcast_ref::<ClientError>() {
        client_err.op.clone()
    } else if err.downcast_ref::<InvalidApiResponseBody>().is_some() {
        "The API server response was invalid".to_string()
    } else {
        "There was an API error".to_string()
    };

    let mut diags = Diagnostics::new();
    diags.add_error(summary, format!("{:#}", err));
    diags
}

fn unconfigured() -> Diagnostics {
    let mut diags = Diagnostics::new();
    diags.add_error(
        "Unconfigured provider client",
        "The dashboard resource was used before the provider was configured. \
         Please report this issue to the provider developers.",
    );
    diags
}

/// The `voltage_dashboard` resource
#[derive(Default)]
pub struct DashboardResource {
    client: Option<ProviderClient>,
}

impl DashboardResource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    fn client(&self) -> Result<&dyn DashboardApi, Diagnostics> {
        self.client.as_deref().ok_or_else(unconfigured)
    }
}

#[async_trait]
impl Resource for DashboardResource {
    type ProviderData = ProviderClient;

    fn metadata(&self, req: &MetadataRequest) -> MetadataResponse {
        MetadataResponse {
            type_name: format!("{}_dashboard", req.provider_type_name),
        }
    }

    fn schema(&self) -> Schema {
        dashboard_schema()
    }

    fn configure(&mut self, provider_data: Option<ProviderClient>) {
        let Some(client) = provider_data else {
            return;
        };
        if self.client.is_some() {
            tracing::warn!("Dashboard resource configured twice, keeping the first client");
            return;
        }
        self.client = Some(client);
    }

    async fn create(&self, req: CreateRequest) -> CreateResponse {
        let mut resp = CreateResponse::default();

        resp.diagnostics.append(self.validate_config(&req.plan));
        if resp.diagnostics.has_error() {
            return resp;
        }

        let mut plan: DashboardModel = match req.plan.get() {
            Ok(plan) => plan,
            Err(diags) => {
                resp.diagnostics.append(diags);
                return resp;
            }
        };

        let client = match self.client() {
            Ok(client) => client,
            Err(diags) => {
                resp.diagnostics.append(diags);
                return resp;
            }
        };

        tracing::info!(
            node_id = %plan.node_id,
            dashboard_type = %plan.dashboard_type,
            "Creating dashboard"
        );

        if let Err(err) = client.create_dashboard(&mut plan).await {
            tracing::error!("Failed to create dashboard: {:#}", err);
            resp.diagnostics.append(err_to_diags(&err));
            return resp;
        }

        tracing::info!(dashboard_id = ?plan.dashboard_id, "Dashboard created");
        resp.diagnostics.append(resp.state.set(&plan));
        resp
    }

    async fn read(&self, req: ReadRequest) -> ReadResponse {
        let mut resp = ReadResponse::from_request(&req);

        let mut state: DashboardModel = match req.state.get() {
            Ok(state) => state,
            Err(diags) => {
                resp.diagnostics.append(diags);
                return resp;
            }
        };

        let client = match self.client() {
            Ok(client) => client,
            Err(diags) => {
                resp.diagnostics.append(diags);
                return resp;
            }
        };

        tracing::debug!(node_id = %state.node_id, dashboard_id = ?state.dashboard_id, "Reading dashboard");

        if let Err(err) = client.read_dashboard(&mut state).await {
            if is_not_found(&err) {
                tracing::warn!(
                    node_id = %state.node_id,
                    dashboard_id = ?state.dashboard_id,
                    "Dashboard no longer exists, removing it from state"
                );
                resp.diagnostics.add_warning(
                    "Dashboard no longer exists",
                    format!(
                        "The dashboard for node {} was not found remotely and has been removed from state. \
                         It will be recreated on the next apply.",
                        state.node_id
                    ),
                );
                resp.state.remove_resource();
                return resp;
            }
            tracing::error!("Failed to read dashboard: {:#}", err);
            resp.diagnostics.append(err_to_diags(&err));
            return resp;
        }

        resp.diagnostics.append(resp.state.set(&state));
        resp
    }

    async fn update(&self, req: UpdateRequest) -> UpdateResponse {
        let mut resp = UpdateResponse::from_request(&req);
        resp.diagnostics
            .add_error("Update not implemented", "You cannot update a dashboard");
        resp
    }

    async fn delete(&self, req: DeleteRequest) -> DeleteResponse {
        let mut resp = DeleteResponse::from_request(&req);

        let state: DashboardModel = match req.state.get() {
            Ok(state) => state,
            Err(diags) => {
                resp.diagnostics.append(diags);
                return resp;
            }
        };

        let Some(dashboard_id) = state.dashboard_id.as_deref() else {
            resp.diagnostics.add_error(
                "Missing dashboard identifier",
                "The state has no dashboard_id, so there is nothing to delete remotely.",
            );
            return resp;
        };

        let client = match self.client() {
            Ok(client) => client,
            Err(diags) => {
                resp.diagnostics.append(diags);
                return resp;
            }
        };

        tracing::info!(dashboard_id = %dashboard_id, "Deleting dashboard");

        if let Err(err) = client.delete_dashboard(dashboard_id).await {
            tracing::error!("Failed to delete dashboard: {:#}", err);
            resp.diagnostics.append(err_to_diags(&err));
            return resp;
        }

        resp.state.remove_resource();
        resp
    }
}
