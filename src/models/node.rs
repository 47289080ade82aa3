//! Swarm node handle and collection

use std::sync::Arc;

use serde_json::Value;

use super::resource::Resource;
use crate::api::{ApiClient, Identifier};
use crate::types::Filters;
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    resource: Resource,
}

impl Node {
    pub(crate) fn new(client: Arc<ApiClient>, attrs: Value) -> Self {
        Self {
            resource: Resource::new(client, attrs, "ID"),
        }
    }

    pub fn id(&self) -> &str {
        self.resource.id()
    }

    pub fn short_id(&self) -> &str {
        self.resource.short_id()
    }

    pub fn attrs(&self) -> &Value {
        self.resource.attrs()
    }

    pub fn version(&self) -> Option<u64> {
        self.resource.attr("/Version/Index").and_then(Value::as_u64)
    }

    /// `manager` or `worker`
    pub fn role(&self) -> Option<&str> {
        self.resource.attr("/Spec/Role").and_then(Value::as_str)
    }

    /// Replace the node spec at the cached version
    pub fn update(&self, spec: &Value) -> Result<()> {
        let version = self
            .version()
            .ok_or_else(|| Error::InvalidArgument("node has no version; reload it first".into()))?;
        self.resource.client().update_node(self, version, spec)
    }

    pub fn reload(&mut self) -> Result<()> {
        let attrs = self.resource.client().inspect_node(self)?;
        self.resource.replace(attrs);
        Ok(())
    }
}

impl Identifier for Node {
    fn identifier(&self) -> Option<String> {
        Some(self.id().to_string())
    }
}

#[derive(Clone)]
pub struct NodeCollection {
    client: Arc<ApiClient>,
}

impl NodeCollection {
    pub(crate) fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub fn get(&self, node: &(impl Identifier + ?Sized)) -> Result<Node> {
        let attrs = self.client.inspect_node(node)?;
        Ok(Node::new(self.client.clone(), attrs))
    }

    pub fn list(&self, filters: Option<&Filters>) -> Result<Vec<Node>> {
        Ok(self
            .client
            .nodes(filters)?
            .into_iter()
            .map(|attrs| Node::new(self.client.clone(), attrs))
            .collect())
    }
}
