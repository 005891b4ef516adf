//! Provider-side client
//!
//! [`DashboardApi`] is the seam between resources and the network: the
//! resource hands it the state model and it fills in whatever the remote
//! service owns. [`Client`] implements it on top of [`VoltageClient`].

use super::dashboard::DashboardModel;
use crate::voltage::client::VoltageClient;
use crate::voltage::error::DashboardNotFound;
use crate::voltage::models::Dashboard;
use anyhow::Result;
use async_trait::async_trait;

/// Dashboard operations a resource needs from the remote service
#[async_trait]
pub trait DashboardApi: Send + Sync {
    /// Create the dashboard described by `dashboard.node_id` and
    /// `dashboard.dashboard_type`, filling every computed field on success.
    async fn create_dashboard(&self, dashboard: &mut DashboardModel) -> Result<()>;

    /// Refresh the computed fields of an existing dashboard, looked up
    /// through its node. Fails with [`DashboardNotFound`] when it is gone.
    async fn read_dashboard(&self, dashboard: &mut DashboardModel) -> Result<()>;

    async fn delete_dashboard(&self, dashboard_id: &str) -> Result<()>;
}

/// Thin wrapper translating between state models and the Voltage API
#[derive(Debug, Clone)]
pub struct Client {
    api: VoltageClient,
}

impl Client {
    pub fn new(api: VoltageClient) -> Self {
        Self { api }
    }
}

/// Copy remote-owned fields into the model. `node_id` and the dashboard
/// type always stay as the caller declared them.
fn apply_remote(model: &mut DashboardModel, remote: Dashboard) {
    model.dashboard_id = Some(remote.dashboard_id);
    model.created = Some(remote.created);
    model.node_name = Some(remote.node_name);
    model.dashboard_name = Some(remote.dashboard_name);
    model.status = Some(remote.status);
    model.endpoint = Some(remote.endpoint);
    model.version = Some(remote.version);
    model.update_available = Some(remote.update_available);
}

/// Pick the dashboard a state model refers to out of a node's dashboards
fn select<'a>(model: &DashboardModel, dashboards: &'a [Dashboard]) -> Option<&'a Dashboard> {
    match model.dashboard_id.as_deref() {
        Some(id) => dashboards.iter().find(|d| d.dashboard_id == id),
        None => dashboards
            .iter()
            .find(|d| d.dashboard_type == model.dashboard_type.as_str()),
    }
}

#[async_trait]
impl DashboardApi for Client {
    async fn create_dashboard(&self, dashboard: &mut DashboardModel) -> Result<()> {
        let remote = self
            .api
            .create_dashboard(&dashboard.node_id, dashboard.dashboard_type.as_str())
            .await?;
        apply_remote(dashboard, remote);
        Ok(())
    }

    async fn read_dashboard(&self, dashboard: &mut DashboardModel) -> Result<()> {
        let dashboards = self.api.node_dashboards(&dashboard.node_id).await?;

        let Some(remote) = select(dashboard, &dashboards) else {
            return Err(anyhow::Error::new(DashboardNotFound {
                node_id: dashboard.node_id.clone(),
            }));
        };

        apply_remote(dashboard, remote.clone());
        Ok(())
    }

    async fn delete_dashboard(&self, dashboard_id: &str) -> Result<()> {
        self.api.delete_dashboard(dashboard_id).await
    }
}
