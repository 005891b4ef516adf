//! Attribute schemas
//!
//! A [`Schema`] declares the attributes of a resource (or of the provider
//! block itself), their types and roles, the validators run against user
//! configuration and the plan modifiers the host honours when diffing.

use super::diagnostics::{Diagnostic, Diagnostics};
use super::state::State;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Attribute value type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeType {
    String,
    Bool,
    Number,
}

impl AttributeType {
    fn matches(self, value: &Value) -> bool {
        match self {
            AttributeType::String => value.is_string(),
            AttributeType::Bool => value.is_boolean(),
            AttributeType::Number => value.is_number(),
        }
    }
}

/// Validation applied to string attributes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "values", rename_all = "snake_case")]
pub enum StringValidator {
    /// Value must be one of the listed strings
    OneOf(Vec<String>),
    /// Value must not be empty
    NotEmpty,
}

impl StringValidator {
    pub fn one_of<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        StringValidator::OneOf(values.into_iter().map(Into::into).collect())
    }

    /// Returns the failure detail when `value` is rejected
    pub fn check(&self, value: &str) -> Option<String> {
        match self {
            StringValidator::OneOf(allowed) if !allowed.iter().any(|a| a == value) => {
                let quoted: Vec<String> = allowed.iter().map(|a| format!("\"{}\"", a)).collect();
                Some(format!(
                    "value must be one of: [{}], got: \"{}\"",
                    quoted.join(" "),
                    value
                ))
            }
            StringValidator::NotEmpty if value.is_empty() => {
                Some("value must not be empty".to_string())
            }
            _ => None,
        }
    }
}

/// Plan-time behaviour the host applies to an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanModifier {
    /// Any change destroys and recreates the resource
    RequiresReplace,
}

/// A single attribute declaration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attribute {
    #[serde(rename = "type")]
    pub kind: AttributeType,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    pub sensitive: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub validators: Vec<StringValidator>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub plan_modifiers: Vec<PlanModifier>,
}

impl Attribute {
    fn new(kind: AttributeType) -> Self {
        Self {
            kind,
            required: false,
            optional: false,
            computed: false,
            sensitive: false,
            description: None,
            validators: Vec::new(),
            plan_modifiers: Vec::new(),
        }
    }

    pub fn required_string() -> Self {
        Self {
            required: true,
            ..Self::new(AttributeType::String)
        }
    }

    pub fn optional_string() -> Self {
        Self {
            optional: true,
            ..Self::new(AttributeType::String)
        }
    }

    pub fn optional_number() -> Self {
        Self {
            optional: true,
            ..Self::new(AttributeType::Number)
        }
    }

    pub fn computed_string() -> Self {
        Self {
            computed: true,
            ..Self::new(AttributeType::String)
        }
    }

    pub fn computed_bool() -> Self {
        Self {
            computed: true,
            ..Self::new(AttributeType::Bool)
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_validator(mut self, validator: StringValidator) -> Self {
        self.validators.push(validator);
        self
    }

    pub fn requires_replace(mut self) -> Self {
        self.plan_modifiers.push(PlanModifier::RequiresReplace);
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    /// Whether users may set this attribute in configuration
    pub fn is_configurable(&self) -> bool {
        self.required || self.optional
    }

    pub fn has_modifier(&self, modifier: PlanModifier) -> bool {
        self.plan_modifiers.contains(&modifier)
    }
}

/// Resource or provider schema
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schema {
    pub description: String,
    /// Bumped whenever stored state needs upgrading
    pub version: u64,
    pub attributes: BTreeMap<String, Attribute>,
}

impl Schema {
    pub fn new(version: u64, description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            version,
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, attribute: Attribute) -> Self {
        self.attributes.insert(name.into(), attribute);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    /// Check a configuration document against the schema
    ///
    /// Null values count as unset, which is how the host represents unknown
    /// computed values inside a plan.
    pub fn validate(&self, config: &State) -> Diagnostics {
        let mut diags = Diagnostics::new();

        let Some(object) = config.as_value().as_object() else {
            diags.add_error(
                "Invalid configuration",
                "The configuration must be an object of attribute values.",
            );
            return diags;
        };

        for name in object.keys() {
            if !self.attributes.contains_key(name) {
                diags.push(
                    Diagnostic::error(
                        "Unsupported argument",
                        format!("An argument named \"{}\" is not expected here.", name),
                    )
                    .at(name.as_str()),
                );
            }
        }

        for (name, attribute) in &self.attributes {
            let Some(value) = config.attribute(name) else {
                if attribute.required {
                    diags.push(
                        Diagnostic::error(
                            "Missing required argument",
                            format!("The argument \"{}\" is required, but no definition was found.", name),
                        )
                        .at(name.as_str()),
                    );
                }
                continue;
            };

            if !attribute.is_configurable() {
                diags.push(
                    Diagnostic::error(
                        "Invalid Configuration for Read-Only Attribute",
                        format!("Cannot set value for \"{}\": it is computed by the remote service.", name),
                    )
                    .at(name.as_str()),
                );
                continue;
            }

            if !attribute.kind.matches(value) {
                diags.push(
                    Diagnostic::error(
                        "Incorrect attribute value type",
                        format!("Inappropriate value for attribute \"{}\": {:?} required.", name, attribute.kind),
                    )
                    .at(name.as_str()),
                );
                continue;
            }

            if let Some(s) = value.as_str() {
                for validator in &attribute.validators {
                    if let Some(detail) = validator.check(s) {
                        diags.push(
                            Diagnostic::error(
                                "Invalid Attribute Value Match",
                                format!("Attribute {} {}", name, detail),
                            )
                            .at(name.as_str()),
                        );
                    }
                }
            }
        }

        diags
    }

    /// Attributes whose change between `prior` and `proposed` forces the
    /// resource to be destroyed and recreated
    pub fn replacement_paths(&self, prior: &State, proposed: &State) -> Vec<String> {
        if prior.is_null() {
            return Vec::new();
        }

        self.attributes
            .iter()
            .filter(|(_, attribute)| attribute.has_modifier(PlanModifier::RequiresReplace))
            .filter(|(name, _)| prior.attribute(name) != proposed.attribute(name))
            .map(|(name, _)| name.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> Schema {
        Schema::new(1, "test")
            .with_attribute("id", Attribute::computed_string())
            .with_attribute(
                "kind",
                Attribute::required_string()
                    .with_validator(StringValidator::one_of(["a", "b"]))
                    .requires_replace(),
            )
            .with_attribute("label", Attribute::optional_string())
    }

    fn summaries(diags: &Diagnostics) -> Vec<&str> {
        diags.iter().map(|d| d.summary.as_str()).collect()
    }

    #[test]
    fn test_valid_config() {
        let diags = schema().validate(&State::from_value(json!({"kind": "a", "id": null})));
        assert!(diags.is_empty(), "{:?}", diags);
    }

    #[test]
    fn test_missing_required() {
        let diags = schema().validate(&State::from_value(json!({"label": "x"})));
        assert_eq!(summaries(&diags), ["Missing required argument"]);
        assert_eq!(diags.first_error().unwrap().attribute.as_deref(), Some("kind"));
    }

    #[test]
    fn test_one_of_rejects_other_values() {
        let diags = schema().validate(&State::from_value(json!({"kind": "c"})));
        let diag = diags.first_error().unwrap();
        assert_eq!(diag.summary, "Invalid Attribute Value Match");
        assert!(diag.detail.contains(r#"got: "c""#));
    }

    #[test]
    fn test_wrong_type() {
        let diags = schema().validate(&State::from_value(json!({"kind": true})));
        assert_eq!(summaries(&diags), ["Incorrect attribute value type"]);
    }

    #[test]
    fn test_computed_attribute_is_read_only() {
        let diags = schema().validate(&State::from_value(json!({"kind": "a", "id": "x"})));
        assert_eq!(summaries(&diags), ["Invalid Configuration for Read-Only Attribute"]);
    }

    #[test]
    fn test_unknown_attribute() {
        let diags = schema().validate(&State::from_value(json!({"kind": "a", "nope": 1})));
        assert_eq!(summaries(&diags), ["Unsupported argument"]);
    }

    #[test]
    fn test_not_an_object() {
        let diags = schema().validate(&State::from_value(json!("kind")));
        assert!(diags.has_error());
    }

    #[test]
    fn test_replacement_paths() {
        let prior = State::from_value(json!({"id": "1", "kind": "a", "label": "x"}));

        let same = State::from_value(json!({"kind": "a", "label": "y"}));
        assert!(schema().replacement_paths(&prior, &same).is_empty());

        let changed = State::from_value(json!({"kind": "b", "label": "x"}));
        assert_eq!(schema().replacement_paths(&prior, &changed), ["kind"]);

        assert!(schema().replacement_paths(&State::null(), &changed).is_empty());
    }

    #[test]
    fn test_not_empty_validator() {
        assert!(StringValidator::NotEmpty.check("").is_some());
        assert!(StringValidator::NotEmpty.check("x").is_none());
    }
}
