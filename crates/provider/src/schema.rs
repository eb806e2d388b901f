//! Provider and resource schemas

use std::fmt;

use serde::Serialize;

use crate::diagnostics::Diagnostic;
use crate::state::DynamicValue;

/// Attribute value type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeType {
    String,
    Bool,
    Number,
}

impl AttributeType {
    /// Whether a value fits this type. Null fits every type.
    pub fn accepts(&self, value: &DynamicValue) -> bool {
        matches!(
            (self, value),
            (_, DynamicValue::Null)
                | (AttributeType::String, DynamicValue::String(_))
                | (AttributeType::Bool, DynamicValue::Bool(_))
                | (AttributeType::Number, DynamicValue::Number(_))
        )
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeType::String => write!(f, "string"),
            AttributeType::Bool => write!(f, "bool"),
            AttributeType::Number => write!(f, "number"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Attribute {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub ty: AttributeType,
    pub description: &'static str,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    pub sensitive: bool,
}

impl Attribute {
    fn new(name: &'static str, ty: AttributeType) -> Self {
        Self {
            name,
            ty,
            description: "",
            required: false,
            optional: false,
            computed: false,
            sensitive: false,
        }
    }

    pub fn string(name: &'static str) -> Self {
        Self::new(name, AttributeType::String)
    }

    pub fn bool(name: &'static str) -> Self {
        Self::new(name, AttributeType::Bool)
    }

    pub fn number(name: &'static str) -> Self {
        Self::new(name, AttributeType::Number)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn computed(mut self) -> Self {
        self.computed = true;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn describe(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    /// Set only by the server
    pub fn is_read_only(&self) -> bool {
        self.computed && !self.optional && !self.required
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ResourceSchema {
    pub type_name: &'static str,
    pub version: i64,
    pub attributes: Vec<Attribute>,
}

impl ResourceSchema {
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Check a configuration value against the schema
    pub fn validate(&self, config: &DynamicValue) -> Vec<Diagnostic> {
        let Some(map) = config.as_map() else {
            if config.is_null() {
                return vec![];
            }
            return vec![Diagnostic::error(
                "Invalid configuration",
                format!("{} configuration must be an object", self.type_name),
            )];
        };

        let mut diagnostics = Vec::new();

        for attribute in &self.attributes {
            let value = map.get(attribute.name).unwrap_or(&DynamicValue::Null);

            if attribute.required && value.is_zero() {
                diagnostics.push(
                    Diagnostic::error(
                        "Missing required argument",
                        format!("The argument \"{}\" is required", attribute.name),
                    )
                    .with_attribute(attribute.name),
                );
            }

            if !attribute.ty.accepts(value) {
                diagnostics.push(
                    Diagnostic::error(
                        "Incorrect attribute value type",
                        format!("\"{}\" must be a {}", attribute.name, attribute.ty),
                    )
                    .with_attribute(attribute.name),
                );
            }

            if attribute.is_read_only() && !value.is_null() {
                diagnostics.push(
                    Diagnostic::error(
                        "Value for unconfigurable attribute",
                        format!("\"{}\" is computed by the server and cannot be set", attribute.name),
                    )
                    .with_attribute(attribute.name),
                );
            }
        }

        for key in map.keys() {
            if self.attribute(key).is_none() {
                diagnostics.push(
                    Diagnostic::error(
                        "Unsupported argument",
                        format!("An argument named \"{}\" is not expected here", key),
                    )
                    .with_attribute(key.clone()),
                );
            }
        }

        diagnostics
    }
}

/// Provider block schema
pub fn provider_schema() -> ResourceSchema {
    ResourceSchema {
        type_name: "nutanix",
        version: 0,
        attributes: vec![
            Attribute::string("endpoint")
                .optional()
                .describe("Prism Central host name or address (NUTANIX_ENDPOINT)"),
            Attribute::number("port")
                .optional()
                .describe("Prism Central port, 9440 by default (NUTANIX_PORT)"),
            Attribute::string("username").optional().describe("NUTANIX_USERNAME"),
            Attribute::string("password")
                .optional()
                .sensitive()
                .describe("NUTANIX_PASSWORD"),
            Attribute::bool("insecure")
                .optional()
                .describe("Skip TLS certificate verification (NUTANIX_INSECURE)"),
            Attribute::number("wait_timeout")
                .optional()
                .describe("Request timeout in seconds"),
        ],
    }
}

/// Schema of `nutanix_category_key`
pub fn category_key_schema() -> ResourceSchema {
    ResourceSchema {
        type_name: "nutanix_category_key",
        version: 0,
        attributes: vec![
            Attribute::string("id").computed(),
            Attribute::string("name")
                .required()
                .describe("Category key name, also the resource identifier"),
            Attribute::string("description").optional().computed(),
            Attribute::string("api_version").optional().computed(),
            Attribute::bool("system_defined")
                .computed()
                .describe("Whether the key was created by the system"),
        ],
    }
}
