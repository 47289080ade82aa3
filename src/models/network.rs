//! Network handle and collection

use std::sync::Arc;

use serde_json::Value;

use super::container::Container;
use super::resource::Resource;
use crate::api::{ApiClient, ConnectOptions, CreateNetworkOptions, Identifier};
use crate::Result;

#[derive(Debug, Clone, PartialEq)]
pub struct Network {
    resource: Resource,
}

impl Network {
    pub(crate) fn new(client: Arc<ApiClient>, attrs: Value) -> Self {
        Self {
            resource: Resource::new(client, attrs, "Id"),
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

    pub fn name(&self) -> Option<&str> {
        self.resource.attr("/Name").and_then(Value::as_str)
    }

    /// Ids of attached containers, from the cached attrs
    pub fn container_ids(&self) -> Vec<&str> {
        self.resource
            .attr("/Containers")
            .and_then(Value::as_object)
            .map(|containers| containers.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Attached containers, each fetched from the daemon
    pub fn containers(&self) -> Result<Vec<Container>> {
        let api = self.resource.client();
        self.container_ids()
            .into_iter()
            .map(|id| Ok(Container::new(api.clone(), api.inspect_container(id)?)))
            .collect()
    }

    pub fn connect(&self, container: &(impl Identifier + ?Sized), options: &ConnectOptions) -> Result<()> {
        self.resource
            .client()
            .connect_container_to_network(container, self, options)
    }

    pub fn disconnect(&self, container: &(impl Identifier + ?Sized), force: bool) -> Result<()> {
        self.resource
            .client()
            .disconnect_container_from_network(container, self, force)
    }

    pub fn remove(&self) -> Result<()> {
        self.resource.client().remove_network(self)
    }

    pub fn reload(&mut self) -> Result<()> {
        let attrs = self.resource.client().inspect_network(self)?;
        self.resource.replace(attrs);
        Ok(())
    }
}

impl Identifier for Network {
    fn identifier(&self) -> Option<String> {
        Some(self.id().to_string())
    }
}

#[derive(Clone)]
pub struct NetworkCollection {
    client: Arc<ApiClient>,
}

impl NetworkCollection {
    pub(crate) fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub fn create(&self, options: &CreateNetworkOptions) -> Result<Network> {
        let created = self.client.create_network(options)?;
        self.get(&created)
    }

    pub fn get(&self, network: &(impl Identifier + ?Sized)) -> Result<Network> {
        let attrs = self.client.inspect_network(network)?;
        Ok(Network::new(self.client.clone(), attrs))
    }

    pub fn list(&self, names: &[&str], ids: &[&str]) -> Result<Vec<Network>> {
        Ok(self
            .client
            .networks(names, ids)?
            .into_iter()
            .map(|attrs| Network::new(self.client.clone(), attrs))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::transport::MockTransport;
    use serde_json::json;

    #[test]
    fn test_container_ids() {
        let api = ApiClient::with_transport(Arc::new(MockTransport::new()), &ClientConfig::default()).unwrap();
        let network = Network::new(
            Arc::new(api),
            json!({"Id": "n1", "Name": "backend", "Containers": {"c1": {}, "c2": {}}}),
        );
        assert_eq!(network.name(), Some("backend"));
        assert_eq!(network.container_ids(), vec!["c1", "c2"]);
    }
}
