//! Network endpoints (API 1.21+)

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use super::request::{resolve_identifier, resource_path, Identifier, Query};
use super::ApiClient;
use crate::types::{EndpointConfig, Filters};
use crate::Result;

#[derive(Debug, Clone, PartialEq)]
pub struct CreateNetworkOptions {
    pub name: String,
    pub driver: Option<String>,
    pub options: BTreeMap<String, String>,
    /// Raw `IPAM` section
    pub ipam: Option<Value>,
    pub check_duplicate: Option<bool>,
    pub internal: bool,
    pub labels: BTreeMap<String, String>,
    pub enable_ipv6: bool,
}

impl CreateNetworkOptions {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            driver: None,
            options: BTreeMap::new(),
            ipam: None,
            check_duplicate: None,
            internal: false,
            labels: BTreeMap::new(),
            enable_ipv6: false,
        }
    }

    pub fn with_driver(mut self, driver: impl Into<String>) -> Self {
        self.driver = Some(driver.into());
        self
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    pub fn with_ipam(mut self, ipam: Value) -> Self {
        self.ipam = Some(ipam);
        self
    }

    pub fn with_internal(mut self, internal: bool) -> Self {
        self.internal = internal;
        self
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    pub fn with_ipv6(mut self, enable: bool) -> Self {
        self.enable_ipv6 = enable;
        self
    }

    fn to_body(&self, api: &ApiClient) -> Result<Value> {
        let mut body = Map::new();
        body.insert("Name".into(), Value::String(self.name.clone()));
        body.insert(
            "Driver".into(),
            self.driver.clone().map(Value::String).unwrap_or(Value::Null),
        );
        body.insert("Options".into(), serde_json::to_value(&self.options)?);
        body.insert("IPAM".into(), self.ipam.clone().unwrap_or(Value::Null));
        body.insert(
            "CheckDuplicate".into(),
            self.check_duplicate.map(Value::Bool).unwrap_or(Value::Null),
        );

        if !self.labels.is_empty() {
            api.require("1.23", "network labels")?;
            body.insert("Labels".into(), serde_json::to_value(&self.labels)?);
        }
        if self.enable_ipv6 {
            api.require("1.23", "enable_ipv6")?;
            body.insert("EnableIPv6".into(), Value::Bool(true));
        }
        if self.internal {
            api.require("1.22", "internal networks")?;
            body.insert("Internal".into(), Value::Bool(true));
        }
        Ok(Value::Object(body))
    }
}

/// Endpoint settings for joining a container to a network
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectOptions {
    pub endpoint: EndpointConfig,
}

impl ConnectOptions {
    pub fn with_aliases(mut self, aliases: Vec<String>) -> Self {
        self.endpoint = self.endpoint.with_aliases(aliases);
        self
    }

    pub fn with_links(mut self, links: Vec<String>) -> Self {
        self.endpoint = self.endpoint.with_links(links);
        self
    }

    pub fn with_ipv4_address(mut self, addr: impl Into<String>) -> Self {
        self.endpoint = self.endpoint.with_ipv4_address(addr);
        self
    }

    pub fn with_ipv6_address(mut self, addr: impl Into<String>) -> Self {
        self.endpoint = self.endpoint.with_ipv6_address(addr);
        self
    }

    pub fn with_link_local_ips(mut self, ips: Vec<String>) -> Self {
        self.endpoint = self.endpoint.with_link_local_ips(ips);
        self
    }

    fn is_empty(&self) -> bool {
        self.endpoint == EndpointConfig::default()
    }
}

impl ApiClient {
    /// List networks, optionally narrowed by name and/or id
    pub fn networks(&self, names: &[&str], ids: &[&str]) -> Result<Vec<Value>> {
        self.require("1.21", "networks")?;
        let mut filters = Filters::new();
        if !names.is_empty() {
            filters.insert("name", names.to_vec());
        }
        if !ids.is_empty() {
            filters.insert("id", ids.to_vec());
        }
        let filters = (!filters.is_empty()).then_some(filters);
        self.get_json("/networks", &Query::new().filters(filters.as_ref()))
    }

    /// Returns `{"Id": ..., "Warning": ...}`
    pub fn create_network(&self, options: &CreateNetworkOptions) -> Result<Value> {
        self.require("1.21", "create_network")?;
        let body = options.to_body(self)?;
        self.post_json("/networks/create", &Query::new(), Some(&body))
    }

    pub fn remove_network(&self, network: &(impl Identifier + ?Sized)) -> Result<()> {
        self.require("1.21", "remove_network")?;
        let path = resource_path("/networks", network, "")?;
        self.delete(&path, &Query::new())
    }

    pub fn inspect_network(&self, network: &(impl Identifier + ?Sized)) -> Result<Value> {
        self.require("1.21", "inspect_network")?;
        let path = resource_path("/networks", network, "")?;
        self.get_json(&path, &Query::new())
    }

    pub fn connect_container_to_network(
        &self,
        container: &(impl Identifier + ?Sized),
        network: &(impl Identifier + ?Sized),
        options: &ConnectOptions,
    ) -> Result<()> {
        self.require("1.21", "connect_container_to_network")?;
        let mut body = Map::new();
        body.insert("Container".into(), Value::String(resolve_identifier(container)?));
        if !options.is_empty() {
            body.insert("EndpointConfig".into(), options.endpoint.to_json(self.gate())?);
        }
        let path = resource_path("/networks", network, "/connect")?;
        self.post_json::<Value, _>(&path, &Query::new(), Some(&Value::Object(body)))
            .map(|_| ())
    }

    pub fn disconnect_container_from_network(
        &self,
        container: &(impl Identifier + ?Sized),
        network: &(impl Identifier + ?Sized),
        force: bool,
    ) -> Result<()> {
        self.require("1.21", "disconnect_container_from_network")?;
        let mut body = Map::new();
        body.insert("Container".into(), Value::String(resolve_identifier(container)?));
        if force {
            self.require("1.22", "forced disconnect")?;
            body.insert("Force".into(), Value::Bool(true));
        }
        let path = resource_path("/networks", network, "/disconnect")?;
        self.post_json::<Value, _>(&path, &Query::new(), Some(&Value::Object(body)))
            .map(|_| ())
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
    use serde_json::json;
    use std::sync::Arc;

    fn client(version: &str, transport: MockTransport) -> ApiClient {
        let config = ClientConfig::builder()
            .version(ApiVersion::parse(version).unwrap())
            .build();
        ApiClient::with_transport(Arc::new(transport), &config).unwrap()
    }

    #[test]
    fn test_networks_filters() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|req| {
                let filters: Value =
                    serde_json::from_str(&req.query_param("filters").unwrap()).unwrap();
                filters == json!({"name": ["frontend"]})
            })
            .times(1)
            .returning(|_| Ok(Response::json(StatusCode::OK, &json!([]))));
        client("1.24", transport).networks(&["frontend"], &[]).unwrap();
    }

    #[test]
    fn test_networks_without_filters() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|req| req.route() == "/v1.24/networks" && req.query_param("filters").is_none())
            .times(1)
            .returning(|_| Ok(Response::json(StatusCode::OK, &json!([]))));
        client("1.24", transport).networks(&[], &[]).unwrap();
    }

    #[test]
    fn test_create_network_gates() {
        let mut transport = MockTransport::new();
        transport.expect_send().times(0);
        let api = client("1.22", transport);

        let labelled = CreateNetworkOptions::new("net").with_label("env", "ci");
        assert!(matches!(api.create_network(&labelled), Err(Error::InvalidVersion(_))));
        let ipv6 = CreateNetworkOptions::new("net").with_ipv6(true);
        assert!(matches!(api.create_network(&ipv6), Err(Error::InvalidVersion(_))));
    }

    #[test]
    fn test_disconnect_force_needs_1_22() {
        let mut transport = MockTransport::new();
        transport.expect_send().times(0);
        let err = client("1.21", transport)
            .disconnect_container_from_network("web", "net", true)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidVersion(_)));
    }

    #[test]
    fn test_connect_body() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|req| {
                let body: Value = serde_json::from_slice(&req.body.as_ref().unwrap().data).unwrap();
                req.route() == "/v1.24/networks/net/connect"
                    && body
                        == json!({
                            "Container": "web",
                            "EndpointConfig": {
                                "Aliases": ["app"],
                                "IPAMConfig": {"IPv4Address": "172.28.0.5"}
                            }
                        })
            })
            .times(1)
            .returning(|_| Ok(Response::empty(StatusCode::OK)));

        let opts = ConnectOptions::default()
            .with_aliases(vec!["app".into()])
            .with_ipv4_address("172.28.0.5");
        client("1.24", transport)
            .connect_container_to_network("web", "net", &opts)
            .unwrap();
    }
}
