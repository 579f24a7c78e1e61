//! Resource configuration values
//!
//! Terraform hands resource configuration to the provider as a tree of
//! dynamically typed values. `DynamicValue` is that tree, with the `GetOk`
//! lookup semantics the mapping helpers rely on.

use std::collections::HashMap;
use serde::{Deserialize, Serialize};

/// Dynamic value decoded from resource configuration or written to state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DynamicValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    List(Vec<DynamicValue>),
    Map(HashMap<String, DynamicValue>),
}

impl DynamicValue {
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

    pub fn as_list(&self) -> Option<&[DynamicValue]> {
        match self {
            DynamicValue::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&HashMap<String, DynamicValue>> {
        match self {
            DynamicValue::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Zero value of its type: null, false, 0, "", or an empty collection
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

    pub fn get(&self, key: &str) -> Option<&DynamicValue> {
        self.as_map()?.get(key)
    }

    /// Look up an attribute that is set to a non-zero value.
    ///
    /// Mirrors Terraform's `GetOk`: an attribute holding its zero value is
    /// indistinguishable from one that was never set.
    pub fn get_ok(&self, key: &str) -> Option<&DynamicValue> {
        self.get(key).filter(|v| !v.is_zero())
    }
}

impl Default for DynamicValue {
    fn default() -> Self {
        DynamicValue::Null
    }
}

impl From<serde_json::Value> for DynamicValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => DynamicValue::Null,
            serde_json::Value::Bool(b) => DynamicValue::Bool(b),
            serde_json::Value::Number(n) => DynamicValue::Number(n),
            serde_json::Value::String(s) => DynamicValue::String(s),
            serde_json::Value::Array(items) => {
                DynamicValue::List(items.into_iter().map(DynamicValue::from).collect())
            }
            serde_json::Value::Object(map) => DynamicValue::Map(
                map.into_iter().map(|(k, v)| (k, DynamicValue::from(v))).collect(),
            ),
        }
    }
}

/// Helper to extract a string attribute, empty when absent
pub fn get_string_attr(value: &DynamicValue, key: &str) -> String {
    value.get(key)
        .and_then(|v| v.as_string())
        .unwrap_or("")
        .to_string()
}

/// Create a DynamicValue map with the given attributes
pub fn make_state(attrs: Vec<(&str, DynamicValue)>) -> DynamicValue {
    let mut map = HashMap::new();
    for (key, value) in attrs {
        map.insert(key.to_string(), value);
    }
    DynamicValue::Map(map)
}

pub fn string_value(s: impl Into<String>) -> DynamicValue {
    DynamicValue::String(s.into())
}
