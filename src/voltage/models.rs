//! Voltage API wire models

use serde::{Deserialize, Serialize};

/// Dashboard as returned by the Voltage API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub dashboard_id: String,
    #[serde(default)]
    pub node_id: String,
    #[serde(rename = "type", default)]
    pub dashboard_type: String,
    #[serde(default)]
    pub created: String,
    #[serde(default)]
    pub node_name: String,
    #[serde(default)]
    pub dashboard_name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub update_available: bool,
}

/// Body for `POST /dashboards/create`
#[derive(Debug, Clone, Serialize)]
pub struct CreateDashboardRequest<'a> {
    pub node_id: &'a str,
    #[serde(rename = "type")]
    pub dashboard_type: &'a str,
}

/// Body for `POST /node/dashboards`
#[derive(Debug, Clone, Serialize)]
pub struct NodeDashboardsRequest<'a> {
    pub node_id: &'a str,
}

/// Response of `POST /node/dashboards`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NodeDashboardsResponse {
    #[serde(default)]
    pub dashboards: Vec<Dashboard>,
}

/// Body for `POST /dashboards/delete`
#[derive(Debug, Clone, Serialize)]
pub struct DeleteDashboardRequest<'a> {
    pub dashboard_id: &'a str,
}
