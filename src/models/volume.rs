//! Volume handle and collection; volumes are identified by name

use std::sync::Arc;

use serde_json::Value;

use super::resource::Resource;
use crate::api::{ApiClient, CreateVolumeOptions, Identifier};
use crate::types::Filters;
use crate::Result;

#[derive(Debug, Clone, PartialEq)]
pub struct Volume {
    resource: Resource,
}

impl Volume {
    pub(crate) fn new(client: Arc<ApiClient>, attrs: Value) -> Self {
        Self {
            resource: Resource::new(client, attrs, "Name"),
        }
    }

    pub fn id(&self) -> &str {
        self.resource.id()
    }

    pub fn name(&self) -> &str {
        self.resource.id()
    }

    pub fn attrs(&self) -> &Value {
        self.resource.attrs()
    }

    pub fn remove(&self) -> Result<()> {
        self.resource.client().remove_volume(self)
    }

    pub fn reload(&mut self) -> Result<()> {
        let attrs = self.resource.client().inspect_volume(self)?;
        self.resource.replace(attrs);
        Ok(())
    }
}

impl Identifier for Volume {
    fn identifier(&self) -> Option<String> {
        Some(self.name().to_string())
    }
}

#[derive(Clone)]
pub struct VolumeCollection {
    client: Arc<ApiClient>,
}

impl VolumeCollection {
    pub(crate) fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub fn create(&self, options: &CreateVolumeOptions) -> Result<Volume> {
        let attrs = self.client.create_volume(options)?;
        Ok(Volume::new(self.client.clone(), attrs))
    }

    pub fn get(&self, name: &(impl Identifier + ?Sized)) -> Result<Volume> {
        let attrs = self.client.inspect_volume(name)?;
        Ok(Volume::new(self.client.clone(), attrs))
    }

    /// The daemon reports `"Volumes": null` when there are none
    pub fn list(&self, filters: Option<&Filters>) -> Result<Vec<Volume>> {
        let response = self.client.volumes(filters)?;
        let volumes = match response.get("Volumes") {
            Some(Value::Array(volumes)) => volumes.clone(),
            _ => Vec::new(),
        };
        Ok(volumes
            .into_iter()
            .map(|attrs| Volume::new(self.client.clone(), attrs))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::transport::{MockTransport, Response};
    use http::StatusCode;
    use serde_json::json;

    #[test]
    fn test_list_tolerates_null() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .returning(|_| Ok(Response::json(StatusCode::OK, &json!({"Volumes": null, "Warnings": null}))));
        let api = ApiClient::with_transport(Arc::new(transport), &ClientConfig::default()).unwrap();
        let volumes = VolumeCollection::new(Arc::new(api)).list(None).unwrap();
        assert!(volumes.is_empty());
    }

    #[test]
    fn test_identity_is_name() {
        let api = ApiClient::with_transport(Arc::new(MockTransport::new()), &ClientConfig::default()).unwrap();
        let volume = Volume::new(Arc::new(api), json!({"Name": "pgdata", "Driver": "local"}));
        assert_eq!(volume.id(), "pgdata");
        assert_eq!(volume.identifier().as_deref(), Some("pgdata"));
    }
}
