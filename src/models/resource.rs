//! Shared state of every resource handle

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::api::ApiClient;

/// Client back-reference plus the attribute snapshot from the last fetch
///
/// The snapshot is only replaced by an explicit reload; actions never
/// touch it.
#[derive(Clone)]
pub struct Resource {
    client: Arc<ApiClient>,
    attrs: Value,
    id_attribute: &'static str,
}

impl Resource {
    pub(crate) fn new(client: Arc<ApiClient>, attrs: Value, id_attribute: &'static str) -> Self {
        Self {
            client,
            attrs,
            id_attribute,
        }
    }

    /// Empty string if the daemon document carried no id
    pub fn id(&self) -> &str {
        self.attrs
            .get(self.id_attribute)
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// First 10 hex digits of the id, keeping any `sha256:` prefix
    pub fn short_id(&self) -> &str {
        let id = self.id();
        let len = match id.strip_prefix("sha256:") {
            Some(_) => 17,
            None => 10,
        };
        id.get(..len).unwrap_or(id)
    }

    pub fn attrs(&self) -> &Value {
        &self.attrs
    }

    /// Attribute at a JSON pointer such as `/State/Status`
    pub fn attr(&self, pointer: &str) -> Option<&Value> {
        self.attrs.pointer(pointer).filter(|v| !v.is_null())
    }

    pub(crate) fn client(&self) -> &Arc<ApiClient> {
        &self.client
    }

    pub(crate) fn replace(&mut self, attrs: Value) {
        self.attrs = attrs;
    }
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("id", &self.short_id())
            .finish()
    }
}

impl PartialEq for Resource {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}
