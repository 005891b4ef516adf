//! JSON-backed state, plan and configuration documents
//!
//! The host hands configuration, plans and prior state to the provider as
//! JSON objects. A `null` document means "no resource" (for example the
//! state after a successful delete).

use super::diagnostics::{Diagnostic, Diagnostics};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// A state, plan or configuration document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct State {
    raw: Value,
}

/// Plans and configurations share the state representation
pub type Plan = State;

impl State {
    /// A document describing no resource
    pub fn null() -> Self {
        Self { raw: Value::Null }
    }

    pub fn from_value(raw: Value) -> Self {
        Self { raw }
    }

    pub fn is_null(&self) -> bool {
        self.raw.is_null()
    }

    pub fn as_value(&self) -> &Value {
        &self.raw
    }

    /// Look up a single top-level attribute
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.raw.get(name).filter(|v| !v.is_null())
    }

    /// Decode the document into a typed model
    pub fn get<T: DeserializeOwned>(&self) -> Result<T, Diagnostics> {
        if self.raw.is_null() {
            return Err(Diagnostic::error(
                "Missing resource data",
                "The host sent an empty document where resource data was expected.",
            )
            .into());
        }
        serde_json::from_value(self.raw.clone()).map_err(|err| {
            Diagnostic::error(
                "Value Conversion Error",
                format!("Could not decode resource data: {}", err),
            )
            .into()
        })
    }

    /// Replace the document with a typed model
    pub fn set<T: Serialize>(&mut self, value: &T) -> Diagnostics {
        match serde_json::to_value(value) {
            Ok(raw) => {
                self.raw = raw;
                Diagnostics::new()
            }
            Err(err) => Diagnostic::error(
                "Value Conversion Error",
                format!("Could not encode resource data: {}", err),
            )
            .into(),
        }
    }

    /// Drop the resource from the document
    pub fn remove_resource(&mut self) {
        self.raw = Value::Null;
    }
}
