//! Query strings, path segments, and identifier normalization

use serde::Serialize;
use serde_json::Value;

use crate::types::Filters;
use crate::utils::Timestamp;
use crate::{Error, Result};

/// Ordered query parameters
///
/// Booleans are written as `1`/`0`; `None` values are skipped entirely.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pairs: Vec<(String, String)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn param(mut self, key: &str, value: impl ToString) -> Self {
        self.pairs.push((key.to_string(), value.to_string()));
        self
    }

    pub fn flag(self, key: &str, value: bool) -> Self {
        self.param(key, if value { "1" } else { "0" })
    }

    pub fn opt<T: ToString>(self, key: &str, value: Option<T>) -> Self {
        match value {
            Some(v) => self.param(key, v),
            None => self,
        }
    }

    pub fn opt_flag(self, key: &str, value: Option<bool>) -> Self {
        match value {
            Some(v) => self.flag(key, v),
            None => self,
        }
    }

    pub fn timestamp(self, key: &str, value: Option<Timestamp>) -> Self {
        self.opt(key, value.map(|t| t.as_unix()))
    }

    /// Add `filters` only when a filter set was supplied
    pub fn filters(self, filters: Option<&Filters>) -> Self {
        match filters {
            Some(f) => self.param("filters", f.to_json()),
            None => self,
        }
    }

    pub fn json<T: Serialize + ?Sized>(self, key: &str, value: &T) -> Result<Self> {
        let encoded = serde_json::to_string(value)?;
        Ok(self.param(key, encoded))
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn encode(&self) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (k, v) in &self.pairs {
            serializer.append_pair(k, v);
        }
        serializer.finish()
    }
}

/// Percent-encode one path argument, keeping `/` and `:` readable
///
/// Image references such as `localhost:5000/foo` are routed by the daemon
/// with their slashes intact.
pub fn encode_path_segment(segment: &str) -> String {
    url::form_urlencoded::byte_serialize(segment.as_bytes())
        .collect::<String>()
        .replace("%2F", "/")
        .replace("%3A", ":")
        .replace('+', "%20")
}

/// Anything that can name a daemon resource in a path
pub trait Identifier {
    fn identifier(&self) -> Option<String>;
}

impl Identifier for str {
    fn identifier(&self) -> Option<String> {
        Some(self.to_string())
    }
}

impl Identifier for String {
    fn identifier(&self) -> Option<String> {
        Some(self.clone())
    }
}

impl Identifier for Value {
    fn identifier(&self) -> Option<String> {
        match self {
            Value::String(s) => Some(s.clone()),
            Value::Object(map) => ["Id", "ID", "id"]
                .iter()
                .find_map(|key| map.get(*key))
                .and_then(Value::as_str)
                .map(str::to_string),
            _ => None,
        }
    }
}

impl<T: Identifier + ?Sized> Identifier for &T {
    fn identifier(&self) -> Option<String> {
        (**self).identifier()
    }
}

/// Reduce a raw id or resource document to its plain id
pub fn resolve_identifier<I: Identifier + ?Sized>(id: &I) -> Result<String> {
    match id.identifier() {
        Some(id) if !id.is_empty() => Ok(id),
        _ => Err(Error::NullResource),
    }
}

/// `{collection}/{id}{action}` with the id resolved and encoded
pub fn resource_path<I: Identifier + ?Sized>(collection: &str, id: &I, action: &str) -> Result<String> {
    let id = resolve_identifier(id)?;
    Ok(format!("{}/{}{}", collection, encode_path_segment(&id), action))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resource_path() {
        assert_eq!(
            resource_path("/containers", &json!({"Id": "abc"}), "/start").unwrap(),
            "/containers/abc/start"
        );
        assert_eq!(
            resource_path("/images", "localhost:5000/foo:bar", "/json").unwrap(),
            "/images/localhost:5000/foo:bar/json"
        );
    }

    #[test]
    fn test_query_encoding() {
        let query = Query::new()
            .flag("all", true)
            .flag("size", false)
            .param("limit", -1)
            .opt("since", None::<String>)
            .opt("before", Some("abc"));
        assert_eq!(query.encode(), "all=1&size=0&limit=-1&before=abc");
    }

    #[test]
    fn test_filters_omitted_when_absent() {
        let query = Query::new().filters(None);
        assert!(query.is_empty());

        let filters = Filters::new().with("status", "running");
        let query = Query::new().filters(Some(&filters));
        let decoded: Value = serde_json::from_str(query.get("filters").unwrap()).unwrap();
        assert_eq!(decoded, json!({"status": "running"}));
    }

    #[test]
    fn test_path_segment_encoding() {
        assert_eq!(encode_path_segment("localhost:5000/foo"), "localhost:5000/foo");
        assert_eq!(encode_path_segment("my name"), "my%20name");
        assert_eq!(encode_path_segment("a?b"), "a%3Fb");
    }

    #[test]
    fn test_resolve_identifier() {
        assert_eq!(resolve_identifier("abc").unwrap(), "abc");
        assert_eq!(resolve_identifier(&json!({"Id": "abc"})).unwrap(), "abc");
        assert_eq!(resolve_identifier(&json!({"ID": "node1"})).unwrap(), "node1");
        assert_eq!(resolve_identifier(&json!({"id": "x"})).unwrap(), "x");
        assert!(matches!(resolve_identifier(&json!({})), Err(Error::NullResource)));
        assert!(matches!(resolve_identifier(""), Err(Error::NullResource)));
    }
}
