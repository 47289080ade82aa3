//! High-level client

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use crate::api::ApiClient;
use crate::config::ClientConfig;
use crate::models::{
    ContainerCollection, ImageCollection, NetworkCollection, NodeCollection, ServiceCollection,
    Swarm, VolumeCollection,
};
use crate::transport::Transport;
use crate::Result;

/// Entry point: resource collections over one shared [`ApiClient`]
///
/// The swarm handle is attached at construction. An engine outside a
/// swarm still yields a client, with an empty swarm handle.
pub struct DockerClient {
    api: Arc<ApiClient>,
    swarm: Mutex<Swarm>,
}

impl DockerClient {
    /// Connect using `DOCKER_HOST`, `DOCKER_TLS_VERIFY` and `DOCKER_CERT_PATH`
    pub fn from_env() -> Result<Self> {
        Self::new(&ClientConfig::from_env()?)
    }

    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        Self::from_api(ApiClient::new(config)?)
    }

    /// Use a caller-supplied transport
    pub fn with_transport(transport: Arc<dyn Transport>, config: &ClientConfig) -> Result<Self> {
        Self::from_api(ApiClient::with_transport(transport, config)?)
    }

    fn from_api(api: ApiClient) -> Result<Self> {
        let api = Arc::new(api);
        let swarm = Swarm::attach(api.clone())?;
        tracing::debug!(version = %api.api_version(), in_swarm = swarm.id().is_some(), "docker client ready");
        Ok(Self {
            api,
            swarm: Mutex::new(swarm),
        })
    }

    /// Low-level client, one method per endpoint
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn containers(&self) -> ContainerCollection {
        ContainerCollection::new(self.api.clone())
    }

    pub fn images(&self) -> ImageCollection {
        ImageCollection::new(self.api.clone())
    }

    pub fn networks(&self) -> NetworkCollection {
        NetworkCollection::new(self.api.clone())
    }

    pub fn volumes(&self) -> VolumeCollection {
        VolumeCollection::new(self.api.clone())
    }

    pub fn services(&self) -> ServiceCollection {
        ServiceCollection::new(self.api.clone())
    }

    pub fn nodes(&self) -> NodeCollection {
        NodeCollection::new(self.api.clone())
    }

    /// The swarm singleton; hold the guard only as long as needed
    pub fn swarm(&self) -> MutexGuard<'_, Swarm> {
        self.swarm.lock()
    }

    pub fn info(&self) -> Result<serde_json::Value> {
        self.api.info()
    }

    pub fn ping(&self) -> Result<bool> {
        self.api.ping()
    }

    pub fn version(&self) -> Result<serde_json::Value> {
        self.api.version()
    }
}
