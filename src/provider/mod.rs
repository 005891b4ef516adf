//! Voltage provider
//!
//! The provider owns the shared API client. The host configures it once,
//! then hands the resulting [`ProviderClient`] to every resource it creates.
//!
//! # Module Structure
//!
//! - [`client`] - The [`client::DashboardApi`] seam and its Voltage implementation
//! - [`dashboard`] - The `voltage_dashboard` resource
//! - [`diagnostics`] - (summary, detail) diagnostics returned to the host
//! - [`resource`] - The resource lifecycle trait and its request/response types
//! - [`schema`] - Attribute schemas, validators and plan modifiers
//! - [`state`] - JSON-backed state, plan and configuration documents

pub mod client;
pub mod dashboard;
pub mod diagnostics;
pub mod resource;
pub mod schema;
pub mod state;

use crate::config::{Config, ProviderConfig};
use crate::voltage::client::VoltageClient;
use client::{Client, DashboardApi};
use dashboard::DashboardResource;
use diagnostics::{Diagnostic, Diagnostics};
use resource::Resource;
use schema::{Attribute, Schema};
use state::State;
use std::sync::Arc;

/// Provider type name; resource type names are prefixed with it
pub const PROVIDER_TYPE_NAME: &str = "voltage";

/// Client handle shared read-only by all resources of a configured provider
pub type ProviderClient = Arc<dyn DashboardApi>;

/// A resource served by this provider
pub type ProviderResource = Box<dyn Resource<ProviderData = ProviderClient>>;

/// Constructor for a fresh resource instance
pub type ResourceFactory = fn() -> ProviderResource;

fn new_dashboard_resource() -> ProviderResource {
    Box::new(DashboardResource::new())
}

/// The Voltage provider
#[derive(Debug, Clone)]
pub struct VoltageProvider {
    version: String,
}

impl Default for VoltageProvider {
    fn default() -> Self {
        Self::new(env!("CARGO_PKG_VERSION"))
    }
}

impl VoltageProvider {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
        }
    }

    pub fn type_name(&self) -> &str {
        PROVIDER_TYPE_NAME
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Schema of the provider block
    pub fn schema(&self) -> Schema {
        Schema::new(0, "Interact with the Voltage node hosting API")
            .with_attribute(
                "api_key",
                Attribute::optional_string()
                    .sensitive()
                    .with_description("Voltage API key. Defaults to VOLTAGE_API_KEY."),
            )
            .with_attribute(
                "endpoint",
                Attribute::optional_string()
                    .with_description("Voltage API endpoint. Defaults to VOLTAGE_ENDPOINT or https://api.voltage.cloud."),
            )
            .with_attribute(
                "timeout_secs",
                Attribute::optional_number().with_description("Per-request timeout in seconds"),
            )
    }

    /// Build the shared client from the provider block and local settings
    pub fn configure(&self, provider_block: &State, file: &Config) -> Result<ProviderClient, Diagnostics> {
        let provider_config = if provider_block.is_null() {
            ProviderConfig::default()
        } else {
            let diags = self.schema().validate(provider_block);
            if diags.has_error() {
                return Err(diags);
            }
            provider_block.get::<ProviderConfig>()?
        };

        let settings = file.resolve(&provider_config).map_err(|err| {
            Diagnostics::from(Diagnostic::error("Missing Voltage API key", format!("{:#}", err)))
        })?;

        let api = VoltageClient::new(&settings.endpoint, &settings.api_key, settings.timeout)
            .map_err(|err| {
                Diagnostics::from(
                    Diagnostic::error("Unable to create Voltage API client", format!("{:#}", err))
                        .at("endpoint"),
                )
            })?;

        tracing::info!(
            endpoint = %api.base_url(),
            version = %self.version(),
            "Voltage provider configured"
        );

        Ok(Arc::new(Client::new(api)))
    }

    /// Resources this provider serves
    pub fn resources(&self) -> Vec<ResourceFactory> {
        vec![new_dashboard_resource as ResourceFactory]
    }

    /// Look up a resource by its fully-qualified type name
    pub fn resource(&self, type_name: &str) -> Option<ProviderResource> {
        let req = resource::MetadataRequest {
            provider_type_name: self.type_name().to_string(),
        };
        self.resources()
            .into_iter()
            .map(|factory| factory())
            .find(|resource| resource.metadata(&req).type_name == type_name)
    }
}
