//! The swarm this engine belongs to, if any

use std::sync::Arc;

use http::StatusCode;
use serde_json::{Map, Value};

use super::resource::Resource;
use crate::api::{ApiClient, InitSwarmOptions, JoinSwarmOptions};
use crate::types::{SwarmSpec, DEFAULT_NODE_CERT_EXPIRY};
use crate::{Error, Result};

/// Singleton handle; attrs stay empty while the engine is not in a swarm
#[derive(Debug, Clone)]
pub struct Swarm {
    resource: Resource,
}

impl Swarm {
    /// Handle with an initial reload; not being in a swarm is not an error
    pub(crate) fn attach(client: Arc<ApiClient>) -> Result<Self> {
        let mut swarm = Self {
            resource: Resource::new(client, Value::Object(Map::new()), "ID"),
        };
        swarm.reload()?;
        Ok(swarm)
    }

    /// Empty until the engine joins or initializes a swarm
    pub fn id(&self) -> Option<&str> {
        Some(self.resource.id()).filter(|id| !id.is_empty())
    }

    pub fn attrs(&self) -> &Value {
        self.resource.attrs()
    }

    pub fn version(&self) -> Option<u64> {
        self.resource.attr("/Version/Index").and_then(Value::as_u64)
    }

    pub fn join_tokens(&self) -> Option<&Value> {
        self.resource.attr("/JoinTokens")
    }

    /// Re-read cluster state; empties the attrs if the engine left
    ///
    /// Engines outside a swarm answer 406, or 503 on some daemon versions.
    pub fn reload(&mut self) -> Result<()> {
        let api = self.resource.client().clone();
        if api.gate().below("1.24") {
            self.resource.replace(Value::Object(Map::new()));
            return Ok(());
        }
        match api.inspect_swarm() {
            Ok(attrs) => {
                self.resource.replace(attrs);
                Ok(())
            }
            Err(e) if is_not_in_swarm(&e) => {
                tracing::warn!("engine is not part of a swarm");
                self.resource.replace(Value::Object(Map::new()));
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Initialize a new swarm with this engine as manager; returns the node id
    pub fn init(&mut self, options: &InitSwarmOptions) -> Result<String> {
        let node_id = self.resource.client().init_swarm(options)?;
        self.reload()?;
        Ok(node_id)
    }

    pub fn join(&mut self, options: &JoinSwarmOptions) -> Result<()> {
        self.resource.client().join_swarm(options)?;
        self.reload()
    }

    pub fn leave(&mut self, force: bool) -> Result<()> {
        self.resource.client().leave_swarm(force)?;
        self.resource.replace(Value::Object(Map::new()));
        Ok(())
    }

    /// Apply `spec` at the cached version
    ///
    /// A spec without a node certificate expiry gets the 90 day default,
    /// since the daemon otherwise resets it.
    pub fn update(
        &self,
        spec: &SwarmSpec,
        rotate_worker_token: bool,
        rotate_manager_token: bool,
    ) -> Result<()> {
        let version = self
            .version()
            .ok_or_else(|| Error::InvalidArgument("not part of a swarm; nothing to update".into()))?;
        let mut spec = spec.clone();
        if spec.node_cert_expiry.is_none() {
            spec.node_cert_expiry = Some(DEFAULT_NODE_CERT_EXPIRY);
        }
        self.resource
            .client()
            .update_swarm(version, Some(&spec), rotate_worker_token, rotate_manager_token)
    }
}

fn is_not_in_swarm(err: &Error) -> bool {
    match err {
        Error::Api(e) => {
            e.status == StatusCode::NOT_ACCEPTABLE
                || (e.status == StatusCode::SERVICE_UNAVAILABLE
                    && e.explanation
                        .as_deref()
                        .is_some_and(|m| m.contains("not part of a swarm")))
        }
        _ => false,
    }
}
