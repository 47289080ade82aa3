//! Swarm membership and node endpoints (API 1.24+)

use serde_json::{json, Value};

use super::request::{resource_path, Identifier, Query};
use super::{decode, ApiClient};
use crate::transport::Request;
use crate::types::{Filters, SwarmSpec};
use crate::Result;

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:2377";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitSwarmOptions {
    pub advertise_addr: Option<String>,
    pub listen_addr: String,
    pub force_new_cluster: bool,
    pub spec: Option<SwarmSpec>,
}

impl Default for InitSwarmOptions {
    fn default() -> Self {
        Self {
            advertise_addr: None,
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            force_new_cluster: false,
            spec: None,
        }
    }
}

impl InitSwarmOptions {
    pub fn with_advertise_addr(mut self, addr: impl Into<String>) -> Self {
        self.advertise_addr = Some(addr.into());
        self
    }

    pub fn with_listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.listen_addr = addr.into();
        self
    }

    pub fn with_spec(mut self, spec: SwarmSpec) -> Self {
        self.spec = Some(spec);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinSwarmOptions {
    pub remote_addrs: Vec<String>,
    pub join_token: String,
    pub listen_addr: String,
    pub advertise_addr: Option<String>,
}

impl JoinSwarmOptions {
    pub fn new(remote_addrs: Vec<String>, join_token: impl Into<String>) -> Self {
        Self {
            remote_addrs,
            join_token: join_token.into(),
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            advertise_addr: None,
        }
    }

    pub fn with_advertise_addr(mut self, addr: impl Into<String>) -> Self {
        self.advertise_addr = Some(addr.into());
        self
    }
}

impl ApiClient {
    /// Make this engine the first manager of a new swarm; returns its node id
    pub fn init_swarm(&self, options: &InitSwarmOptions) -> Result<String> {
        self.require("1.24", "init_swarm")?;
        let body = json!({
            "AdvertiseAddr": options.advertise_addr,
            "ListenAddr": options.listen_addr,
            "ForceNewCluster": options.force_new_cluster,
            "Spec": options.spec.as_ref().map(SwarmSpec::to_json),
        });
        tracing::info!(listen_addr = %options.listen_addr, "initializing swarm");
        let node_id: Value = self.post_json("/swarm/init", &Query::new(), Some(&body))?;
        Ok(node_id.as_str().unwrap_or_default().to_string())
    }

    pub fn join_swarm(&self, options: &JoinSwarmOptions) -> Result<()> {
        self.require("1.24", "join_swarm")?;
        let body = json!({
            "RemoteAddrs": options.remote_addrs,
            "ListenAddr": options.listen_addr,
            "JoinToken": options.join_token,
            "AdvertiseAddr": options.advertise_addr,
        });
        tracing::info!(remotes = ?options.remote_addrs, "joining swarm");
        let request = Request::post(self.url("/swarm/join")).json(&body)?;
        decode::no_content(self.send(request)?)
    }

    /// Leave the swarm; with `force`, not being in one is not an error
    pub fn leave_swarm(&self, force: bool) -> Result<()> {
        self.require("1.24", "leave_swarm")?;
        let url = self.url_with_query("/swarm/leave", &Query::new().flag("force", force));
        let response = self.send_unchecked(Request::post(url))?;
        if force && response.status == http::StatusCode::NOT_ACCEPTABLE {
            tracing::warn!("leave requested but node is not part of a swarm");
            return decode::no_content(response);
        }
        decode::no_content(decode::check_status(response)?)
    }

    pub fn inspect_swarm(&self) -> Result<Value> {
        self.require("1.24", "inspect_swarm")?;
        self.get_json("/swarm", &Query::new())
    }

    pub fn update_swarm(
        &self,
        version: u64,
        spec: Option<&SwarmSpec>,
        rotate_worker_token: bool,
        rotate_manager_token: bool,
    ) -> Result<()> {
        self.require("1.24", "update_swarm")?;
        let query = Query::new()
            .flag("rotateWorkerToken", rotate_worker_token)
            .flag("rotateManagerToken", rotate_manager_token)
            .param("version", version);
        let body = spec.map(SwarmSpec::to_json).unwrap_or_else(|| json!({}));
        let request = Request::post(self.url_with_query("/swarm/update", &query)).json(&body)?;
        decode::no_content(self.send(request)?)
    }

    pub fn nodes(&self, filters: Option<&Filters>) -> Result<Vec<Value>> {
        self.require("1.24", "nodes")?;
        self.get_json("/nodes", &Query::new().filters(filters))
    }

    pub fn inspect_node(&self, node: &(impl Identifier + ?Sized)) -> Result<Value> {
        self.require("1.24", "inspect_node")?;
        let path = resource_path("/nodes", node, "")?;
        self.get_json(&path, &Query::new())
    }

    /// Replace a node's spec (`Role`, `Availability`, `Labels`, ...)
    pub fn update_node(&self, node: &(impl Identifier + ?Sized), version: u64, spec: &Value) -> Result<()> {
        self.require("1.24", "update_node")?;
        let path = resource_path("/nodes", node, "/update")?;
        let url = self.url_with_query(&path, &Query::new().param("version", version));
        decode::no_content(self.send(Request::post(url).json(spec)?)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::transport::{MockTransport, Response};
    use crate::version::ApiVersion;
    use crate::Error;
    use http::StatusCode;
    use std::sync::Arc;

    fn client(transport: MockTransport) -> ApiClient {
        let config = ClientConfig::builder()
            .version(ApiVersion::parse("1.24").unwrap())
            .build();
        ApiClient::with_transport(Arc::new(transport), &config).unwrap()
    }

    fn not_in_swarm() -> Response {
        Response::json(
            StatusCode::NOT_ACCEPTABLE,
            &json!({"message": "This node is not part of a swarm"}),
        )
    }

    #[test]
    fn test_forced_leave_tolerates_406() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|req| req.query_param("force").as_deref() == Some("1"))
            .times(1)
            .returning(|_| Ok(not_in_swarm()));
        client(transport).leave_swarm(true).unwrap();
    }

    #[test]
    fn test_plain_leave_reports_406() {
        let mut transport = MockTransport::new();
        transport.expect_send().times(1).returning(|_| Ok(not_in_swarm()));
        let err = client(transport).leave_swarm(false).unwrap_err();
        assert_eq!(err.status_code(), Some(StatusCode::NOT_ACCEPTABLE));
    }

    #[test]
    fn test_init_defaults_listen_addr() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|req| {
                let body: Value = serde_json::from_slice(&req.body.as_ref().unwrap().data).unwrap();
                body["ListenAddr"] == "0.0.0.0:2377"
                    && body["ForceNewCluster"] == false
                    && body["Spec"] == json!({"Name": "default"})
            })
            .times(1)
            .returning(|_| Ok(Response::json(StatusCode::OK, &json!("node-7"))));

        let opts = InitSwarmOptions::default().with_spec(SwarmSpec::new().with_name("default"));
        assert_eq!(client(transport).init_swarm(&opts).unwrap(), "node-7");
    }

    #[test]
    fn test_update_swarm_query() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|req| {
                req.query_param("rotateWorkerToken").as_deref() == Some("1")
                    && req.query_param("rotateManagerToken").as_deref() == Some("0")
                    && req.query_param("version").as_deref() == Some("8")
            })
            .times(1)
            .returning(|_| Ok(Response::empty(StatusCode::OK)));
        client(transport).update_swarm(8, None, true, false).unwrap();
    }

    #[test]
    fn test_swarm_needs_1_24() {
        let mut transport = MockTransport::new();
        transport.expect_send().times(0);
        let config = ClientConfig::builder()
            .version(ApiVersion::parse("1.23").unwrap())
            .build();
        let api = ApiClient::with_transport(Arc::new(transport), &config).unwrap();
        assert!(matches!(api.inspect_swarm(), Err(Error::InvalidVersion(_))));
        assert!(matches!(api.nodes(None), Err(Error::InvalidVersion(_))));
    }
}
