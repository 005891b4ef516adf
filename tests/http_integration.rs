//! Integration tests for the Voltage client using wiremock
//!
//! These tests run the dashboard resource and the HTTP client against
//! mocked endpoints, checking request shapes, response handling and the
//! diagnostics produced for each failure class.

use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant};
use voltage_provider::provider::client::{Client, DashboardApi};
use voltage_provider::provider::dashboard::{
    err_to_diags, DashboardModel, DashboardResource, DashboardType,
};
use voltage_provider::provider::diagnostics::Severity;
use voltage_provider::provider::resource::{CreateRequest, DeleteRequest, ReadRequest, Resource};
use voltage_provider::provider::state::State;
use voltage_provider::provider::ProviderClient;
use voltage_provider::voltage::client::VoltageClient;
use voltage_provider::voltage::error::{ClientError, InvalidApiResponseBody};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API_KEY: &str = "test-key";

fn remote_dashboard() -> serde_json::Value {
    json!({
        "dashboard_id": "dash-1",
        "node_id": "node-123",
        "type": "lnbits",
        "created": "2024-01-01T00:00:00Z",
        "node_name": "my-node",
        "dashboard_name": "my-dashboard",
        "status": "active",
        "endpoint": "dash-1.voltageapp.io",
        "version": "0.12.2",
        "update_available": true
    })
}

fn expected_state() -> State {
    State::from_value(json!({
        "dashboard_id": "dash-1",
        "created": "2024-01-01T00:00:00Z",
        "node_name": "my-node",
        "dashboard_name": "my-dashboard",
        "status": "active",
        "endpoint": "dash-1.voltageapp.io",
        "version": "0.12.2",
        "update_available": true,
        "node_id": "node-123",
        "type": "lnbits"
    }))
}

fn voltage_client(server: &MockServer) -> VoltageClient {
    VoltageClient::new(&server.uri(), API_KEY, None).expect("client should build")
}

fn resource(server: &MockServer) -> DashboardResource {
    let client: ProviderClient = Arc::new(Client::new(voltage_client(server)));
    let mut resource = DashboardResource::new();
    resource.configure(Some(client));
    resource
}

/// Dashboard creation
mod create_tests {
    use super::*;

    #[tokio::test]
    async fn test_create_sends_inputs_and_stores_remote_fields() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/dashboards/create"))
            .and(header("X-VOLTAGE-AUTH", API_KEY))
            .and(body_json(json!({"node_id": "node-123", "type": "lnbits"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(remote_dashboard()))
            .expect(1)
            .mount(&server)
            .await;

        let resp = resource(&server)
            .create(CreateRequest {
                plan: State::from_value(json!({"node_id": "node-123", "type": "lnbits"})),
            })
            .await;

        assert!(resp.diagnostics.is_empty(), "{:?}", resp.diagnostics);
        assert_eq!(resp.state, expected_state());
    }

    #[tokio::test]
    async fn test_create_error_status_uses_operation_as_summary() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/dashboards/create"))
            .respond_with(
                ResponseTemplate::new(409).set_body_json(json!({"message": "dashboard already exists"})),
            )
            .mount(&server)
            .await;

        let resp = resource(&server)
            .create(CreateRequest {
                plan: State::from_value(json!({"node_id": "node-123", "type": "thunderhub"})),
            })
            .await;

        let diag = resp.diagnostics.first_error().expect("should fail");
        assert_eq!(diag.summary, "Create dashboard");
        assert!(diag.detail.contains("409"));
        assert!(diag.detail.contains("dashboard already exists"));
        assert!(resp.state.is_null());
    }

    #[tokio::test]
    async fn test_create_with_html_body_is_invalid_response() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/dashboards/create"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let resp = resource(&server)
            .create(CreateRequest {
                plan: State::from_value(json!({"node_id": "node-123", "type": "lnbits"})),
            })
            .await;

        assert_eq!(
            resp.diagnostics.first_error().unwrap().summary,
            "The API server response was invalid"
        );
        assert!(resp.state.is_null());
    }

    #[tokio::test]
    async fn test_create_with_invalid_type_never_reaches_server() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(remote_dashboard()))
            .expect(0)
            .mount(&server)
            .await;

        let resp = resource(&server)
            .create(CreateRequest {
                plan: State::from_value(json!({"node_id": "node-123", "type": "grafana"})),
            })
            .await;

        assert!(resp.diagnostics.has_error());
    }
}

/// Dashboard refresh
mod read_tests {
    use super::*;

    #[tokio::test]
    async fn test_read_refreshes_from_node_listing() {
        let server = MockServer::start().await;

        let mut stopped = remote_dashboard();
        stopped["status"] = json!("stopped");

        Mock::given(method("POST"))
            .and(path("/node/dashboards"))
            .and(header("X-VOLTAGE-AUTH", API_KEY))
            .and(body_json(json!({"node_id": "node-123"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "dashboards": [
                    {"dashboard_id": "dash-0", "type": "thunderhub", "status": "active"},
                    stopped
                ]
            })))
            .mount(&server)
            .await;

        let resp = resource(&server)
            .read(ReadRequest { state: expected_state() })
            .await;

        assert!(resp.diagnostics.is_empty(), "{:?}", resp.diagnostics);
        assert_eq!(resp.state.attribute("dashboard_id"), Some(&json!("dash-1")));
        assert_eq!(resp.state.attribute("status"), Some(&json!("stopped")));
    }

    #[tokio::test]
    async fn test_read_invalid_body_keeps_state() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/node/dashboards"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let prior = State::from_value(json!({"node_id": "node-123", "type": "lnbits"}));
        let resp = resource(&server)
            .read(ReadRequest { state: prior.clone() })
            .await;

        assert_eq!(resp.state, prior);
        assert_eq!(
            resp.diagnostics.first_error().unwrap().summary,
            "The API server response was invalid"
        );
    }

    #[tokio::test]
    async fn test_read_missing_dashboard_removes_state() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/node/dashboards"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"dashboards": []})))
            .mount(&server)
            .await;

        let resp = resource(&server)
            .read(ReadRequest { state: expected_state() })
            .await;

        assert!(!resp.diagnostics.has_error());
        assert!(resp.state.is_null());
    }

    #[tokio::test]
    async fn test_read_node_404_removes_state() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/node/dashboards"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "node not found"})))
            .mount(&server)
            .await;

        let resp = resource(&server)
            .read(ReadRequest { state: expected_state() })
            .await;

        assert!(!resp.diagnostics.has_error());
        assert!(resp.state.is_null());
        let warning = resp.diagnostics.iter().next().expect("removal is reported");
        assert_eq!(warning.severity, Severity::Warning);
        assert_eq!(warning.summary, "Dashboard no longer exists");
    }

    #[tokio::test]
    async fn test_read_bare_404_keeps_state() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/node/dashboards"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let resp = resource(&server)
            .read(ReadRequest { state: expected_state() })
            .await;

        assert_eq!(resp.state, expected_state());
        let diag = resp.diagnostics.first_error().expect("should fail");
        assert_eq!(diag.summary, "Read dashboard");
        assert!(diag.detail.contains("404"));
    }

    #[tokio::test]
    async fn test_read_server_error_keeps_state() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/node/dashboards"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let resp = resource(&server)
            .read(ReadRequest { state: expected_state() })
            .await;

        assert_eq!(resp.state, expected_state());
        let diag = resp.diagnostics.first_error().unwrap();
        assert_eq!(diag.summary, "Read dashboard");
        assert!(diag.detail.contains("temporarily unavailable"));
    }
}

/// Dashboard deletion
mod delete_tests {
    use super::*;

    #[tokio::test]
    async fn test_delete_by_dashboard_id() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/dashboards/delete"))
            .and(header("X-VOLTAGE-AUTH", API_KEY))
            .and(body_json(json!({"dashboard_id": "dash-1"})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let resp = resource(&server)
            .delete(DeleteRequest { state: expected_state() })
            .await;

        assert!(resp.diagnostics.is_empty(), "{:?}", resp.diagnostics);
        assert!(resp.state.is_null());
    }

    #[tokio::test]
    async fn test_delete_failure_keeps_state() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/dashboards/delete"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({"error": "forbidden"})))
            .mount(&server)
            .await;

        let resp = resource(&server)
            .delete(DeleteRequest { state: expected_state() })
            .await;

        assert_eq!(resp.state, expected_state());
        assert_eq!(resp.diagnostics.first_error().unwrap().summary, "Delete dashboard");
    }
}

/// Lower-level client behaviour
mod client_tests {
    use super::*;

    #[tokio::test]
    async fn test_client_error_is_typed() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/dashboards/create"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = voltage_client(&server)
            .create_dashboard("node-123", "lnbits")
            .await
            .unwrap_err();

        let client_err = err.downcast_ref::<ClientError>().expect("typed client error");
        assert_eq!(client_err.status, 401);
        assert_eq!(
            client_err.message,
            "Authentication failed. Check your Voltage API key."
        );
    }

    #[tokio::test]
    async fn test_empty_create_body_is_invalid() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/dashboards/create"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let err = voltage_client(&server)
            .create_dashboard("node-123", "lnbits")
            .await
            .unwrap_err();

        assert!(err.downcast_ref::<InvalidApiResponseBody>().is_some());
    }

    #[tokio::test]
    async fn test_endpoint_path_prefix_is_kept() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/dashboards/create"))
            .respond_with(ResponseTemplate::new(200).set_body_json(remote_dashboard()))
            .expect(1)
            .mount(&server)
            .await;

        let client = VoltageClient::new(&format!("{}/v1", server.uri()), API_KEY, None).unwrap();
        let dashboard = client.create_dashboard("node-123", "lnbits").await.unwrap();
        assert_eq!(dashboard.dashboard_id, "dash-1");
    }

    #[tokio::test]
    async fn test_slow_response_hits_request_timeout() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/dashboards/create"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(remote_dashboard())
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let client =
            VoltageClient::new(&server.uri(), API_KEY, Some(Duration::from_millis(200))).unwrap();

        let started = Instant::now();
        let err = client
            .create_dashboard("node-123", "lnbits")
            .await
            .unwrap_err();
        assert!(started.elapsed() < Duration::from_secs(2), "{:?}", started.elapsed());

        assert!(err.downcast_ref::<ClientError>().is_none());
        assert!(err.downcast_ref::<InvalidApiResponseBody>().is_none());

        let diags = err_to_diags(&err);
        let diag = diags.first_error().unwrap();
        assert_eq!(diag.summary, "There was an API error");
        assert!(diag.detail.contains("Create dashboard request failed"));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_generic_error() {
        // Nothing listens on the discard port
        let client = VoltageClient::new("http://127.0.0.1:9", API_KEY, None).unwrap();
        let api = Client::new(client);

        let mut model = DashboardModel::new("node-123", DashboardType::Lnbits);
        let err = api.create_dashboard(&mut model).await.unwrap_err();

        assert!(err.downcast_ref::<ClientError>().is_none());
        assert!(err.downcast_ref::<InvalidApiResponseBody>().is_none());
        assert!(format!("{:#}", err).contains("Create dashboard request failed"));
        assert!(model.dashboard_id.is_none());
    }
}
