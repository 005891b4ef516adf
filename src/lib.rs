//! Voltage infrastructure provider
//!
//! Exposes the `voltage_dashboard` resource to a declarative
//! infrastructure host: a Voltage node dashboard (ThunderHub or LNbits)
//! is created, refreshed and destroyed through the Voltage API.
//!
//! - [`voltage`] - HTTP client for the Voltage API
//! - [`provider`] - Provider configuration and the resource lifecycle
//! - [`config`] - Persistent settings and their resolution

pub mod config;
pub mod provider;
pub mod voltage;

pub use provider::{ProviderClient, VoltageProvider, PROVIDER_TYPE_NAME};
