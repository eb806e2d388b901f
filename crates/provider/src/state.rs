//! Terraform State Management
//!
//! Dynamic attribute values, their msgpack/JSON encodings, and the
//! per-resource `ResourceData` record the handlers read and write.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use nutanix_common::{Error, Result};

use crate::schema::ResourceSchema;

/// Dynamic value that can be encoded/decoded from Terraform state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DynamicValue {
    #[default]
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    List(Vec<DynamicValue>),
    Map(BTreeMap<String, DynamicValue>),
}

impl DynamicValue {
    pub fn is_null(&self) -> bool {
        matches!(self, DynamicValue::Null)
    }

    /// Null, empty string, false, zero or an empty collection
    pub fn is_zero(&self) -> bool {
        match self {
            DynamicValue::Null => true,
            DynamicValue::Bool(b) => !b,
            DynamicValue::Number(n) => n.as_f64() == Some(0.0),
            DynamicValue::String(s) => s.is_empty(),
            DynamicValue::List(l) => l.is_empty(),
            DynamicValue::Map(m) => m.is_empty(),
        }
    }

    pub fn as_string(&self) -> Option<&str> {
        match self {
            DynamicValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            DynamicValue::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            DynamicValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, DynamicValue>> {
        match self {
            DynamicValue::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&DynamicValue> {
        self.as_map()?.get(key)
    }
}

/// Decode a Terraform DynamicValue from msgpack bytes
pub fn decode_dynamic_value(data: &[u8]) -> Result<DynamicValue> {
    if data.is_empty() {
        return Ok(DynamicValue::Null);
    }

    rmp_serde::from_slice(data).map_err(|e| Error::Encoding(e.to_string()))
}

/// Encode a value to Terraform DynamicValue msgpack bytes
pub fn encode_dynamic_value(value: &DynamicValue) -> Result<Vec<u8>> {
    rmp_serde::to_vec(value).map_err(|e| Error::Encoding(e.to_string()))
}

/// Helper to extract a string attribute from a DynamicValue
pub fn get_string_attr(value: &DynamicValue, key: &str) -> String {
    value.get(key)
        .and_then(|v| v.as_string())
        .unwrap_or("")
        .to_string()
}

/// Helper to extract an integer attribute from a DynamicValue
pub fn get_int_attr(value: &DynamicValue, key: &str, default: i64) -> i64 {
    value.get(key)
        .and_then(|v| v.as_i64())
        .unwrap_or(default)
}

/// Helper to extract a bool attribute from a DynamicValue
pub fn get_bool_attr(value: &DynamicValue, key: &str, default: bool) -> bool {
    value.get(key)
        .and_then(|v| v.as_bool())
        .unwrap_or(default)
}

/// Create a DynamicValue map with the given attributes
pub fn make_state(attrs: Vec<(&str, DynamicValue)>) -> DynamicValue {
    DynamicValue::Map(
        attrs
            .into_iter()
            .map(|(key, value)| (key.to_string(), value))
            .collect(),
    )
}

/// Create a string DynamicValue
pub fn string_value(s: impl Into<String>) -> DynamicValue {
    DynamicValue::String(s.into())
}

/// Create a number DynamicValue from i64
pub fn int_value(n: i64) -> DynamicValue {
    DynamicValue::Number(serde_json::Number::from(n))
}

/// Create a bool DynamicValue
pub fn bool_value(b: bool) -> DynamicValue {
    DynamicValue::Bool(b)
}

/// Attribute values and identifier of one resource instance.
///
/// The identifier lives outside the attribute map; an empty identifier means
/// the resource is absent and encodes as a null state.
#[derive(Debug, Clone)]
pub struct ResourceData {
    schema: ResourceSchema,
    id: String,
    attrs: BTreeMap<String, DynamicValue>,
}

impl ResourceData {
    /// Build from a configuration or state value. Non-map values give an empty record.
    pub fn new(schema: ResourceSchema, value: &DynamicValue) -> Self {
        let mut attrs = value.as_map().cloned().unwrap_or_default();
        let id = match attrs.remove("id") {
            Some(DynamicValue::String(id)) => id,
            _ => String::new(),
        };

        Self { schema, id, attrs }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    pub fn exists(&self) -> bool {
        !self.id.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&DynamicValue> {
        self.attrs.get(key)
    }

    /// The attribute value, if set to something other than its zero value
    pub fn get_ok(&self, key: &str) -> Option<&DynamicValue> {
        self.attrs.get(key).filter(|v| !v.is_zero())
    }

    pub fn get_string(&self, key: &str) -> String {
        self.get(key)
            .and_then(|v| v.as_string())
            .unwrap_or_default()
            .to_string()
    }

    /// Write an attribute, checking it against the schema
    pub fn set(&mut self, key: &str, value: DynamicValue) -> Result<()> {
        let attribute = self.schema.attribute(key).ok_or_else(|| {
            Error::State(format!("{} has no attribute {:?}", self.schema.type_name, key))
        })?;

        if !attribute.ty.accepts(&value) {
            return Err(Error::State(format!(
                "{}: expected {}, got {:?}",
                key, attribute.ty, value
            )));
        }

        self.attrs.insert(key.to_string(), value);
        Ok(())
    }

    /// Encode as a state value; null once the identifier is cleared
    pub fn to_value(&self) -> DynamicValue {
        if self.id.is_empty() {
            return DynamicValue::Null;
        }

        let mut map = self.attrs.clone();
        map.insert("id".to_string(), string_value(&self.id));
        DynamicValue::Map(map)
    }
}
