//! Filter sets for list endpoints

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Mapping from filter key to a scalar or a list of scalars
///
/// Keys are not interpreted; the daemon validates them. Values are sent
/// exactly as given, so a scalar stays a scalar on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Filters(BTreeMap<String, Value>);

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FilterValue>) {
        self.0.insert(key.into(), value.into().0);
    }

    /// `label=key` or `label=key=value`
    pub fn with_label(self, label: impl Into<String>) -> Self {
        self.push("label", label.into())
    }

    /// Append to a list-valued key, promoting an existing scalar
    pub fn push(mut self, key: &str, value: impl Into<FilterValue>) -> Self {
        let value = value.into().0;
        match self.0.remove(key) {
            None => {
                self.0.insert(key.to_string(), Value::Array(vec![value]));
            }
            Some(Value::Array(mut items)) => {
                items.push(value);
                self.0.insert(key.to_string(), Value::Array(items));
            }
            Some(existing) => {
                self.0
                    .insert(key.to_string(), Value::Array(vec![existing, value]));
            }
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_json(&self) -> String {
        Value::Object(self.0.clone().into_iter().collect()).to_string()
    }
}

impl<K: Into<String>, V: Into<FilterValue>> FromIterator<(K, V)> for Filters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut filters = Filters::new();
        for (k, v) in iter {
            filters.insert(k, v);
        }
        filters
    }
}

/// A single filter value; built from strings, numbers, booleans or lists
#[derive(Debug, Clone, PartialEq)]
pub struct FilterValue(Value);

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        FilterValue(Value::String(s.to_string()))
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        FilterValue(Value::String(s))
    }
}

impl From<bool> for FilterValue {
    fn from(b: bool) -> Self {
        FilterValue(Value::Bool(b))
    }
}

impl From<i64> for FilterValue {
    fn from(n: i64) -> Self {
        FilterValue(Value::from(n))
    }
}

impl From<Vec<String>> for FilterValue {
    fn from(items: Vec<String>) -> Self {
        FilterValue(Value::Array(items.into_iter().map(Value::String).collect()))
    }
}

impl From<Vec<&str>> for FilterValue {
    fn from(items: Vec<&str>) -> Self {
        items
            .into_iter()
            .map(str::to_string)
            .collect::<Vec<_>>()
            .into()
    }
}

impl From<Value> for FilterValue {
    fn from(value: Value) -> Self {
        FilterValue(value)
    }
}
