//! Voltage API interaction module
//!
//! This module provides the core functionality for talking to the Voltage
//! node hosting API: the HTTP transport, the typed client and the wire models.
//!
//! # Module Structure
//!
//! - [`client`] - Main Voltage client for dashboard API requests
//! - [`error`] - Typed errors the provider layer inspects
//! - [`http`] - HTTP utilities for REST API calls
//! - [`models`] - Request and response bodies
//!
//! # Example
//!
//! ```ignore
//! use voltage_provider::voltage::client::VoltageClient;
//!
//! async fn example() -> anyhow::Result<()> {
//!     let client = VoltageClient::new("https://api.voltage.cloud", "api-key", None)?;
//!     let dashboards = client.node_dashboards("node-123").await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod http;
pub mod models;
