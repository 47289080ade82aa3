//! Low-level Engine API client
//!
//! [`ApiClient`] owns the transport and the negotiated version. Each
//! resource group (containers, images, networks, ...) lives in its own
//! module as an `impl ApiClient` block, so the call surface stays flat:
//! `api.inspect_container(id)`, `api.pull("alpine", &PullOptions::default())`, and so on.

mod container;
pub mod decode;
mod exec;
pub mod frames;
mod image;
mod network;
pub mod request;
mod service;
pub mod stream;
mod swarm;
mod system;
mod volume;

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::config::{ApiVersionSpec, ClientConfig};
use crate::transport::{HttpTransport, Request, Response, Transport};
use crate::version::{ApiVersion, VersionGate};
use crate::{Error, Result};

pub use container::{
    AttachOptions, CommitOptions, ListContainersOptions, LogsOptions, RemoveContainerOptions,
    Tail, UpdateContainerOptions,
};
pub use decode::RawStream;
pub use exec::{ExecCreateOptions, ExecStartOptions};
pub use frames::{LogStream, StdStream};
pub use image::{BuildOptions, ListImagesOptions, PullOptions, PushOptions, RemoveImageOptions};
pub use network::{ConnectOptions, CreateNetworkOptions};
pub use request::{resolve_identifier, Identifier, Query};
pub use service::ServiceOptions;
pub use stream::{JsonStream, ProgressEvent, ProgressStream};
pub use swarm::{InitSwarmOptions, JoinSwarmOptions};
pub use system::EventsOptions;
pub use volume::CreateVolumeOptions;

/// Low-level client: one method per Engine endpoint
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    gate: VersionGate,
    timeout: Duration,
}

impl ApiClient {
    /// Connect with the built-in transport
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let transport = HttpTransport::new(config)?;
        Self::with_transport(Arc::new(transport), config)
    }

    /// Use a caller-supplied transport; negotiates the version if asked to
    pub fn with_transport(transport: Arc<dyn Transport>, config: &ClientConfig) -> Result<Self> {
        let version = match &config.version {
            ApiVersionSpec::Pinned(v) => v.clone(),
            ApiVersionSpec::Auto => negotiate(transport.as_ref())?,
        };

        tracing::debug!(version = %version, "API client ready");

        Ok(Self {
            transport,
            gate: VersionGate::new(version),
            timeout: config.timeout,
        })
    }

    /// Negotiated or pinned API version
    pub fn api_version(&self) -> &ApiVersion {
        self.gate.version()
    }

    pub fn gate(&self) -> &VersionGate {
        &self.gate
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Versioned path: `/v1.24/containers/json`
    pub fn url(&self, path: &str) -> String {
        format!("/v{}{}", self.gate.version(), path)
    }

    pub fn url_with_query(&self, path: &str, query: &Query) -> String {
        if query.is_empty() {
            self.url(path)
        } else {
            format!("{}?{}", self.url(path), query.encode())
        }
    }

    pub(crate) fn require(&self, min: &str, feature: &str) -> Result<()> {
        self.gate.require(min, feature)
    }

    /// Send through the transport and map non-2xx statuses to errors
    pub fn send(&self, request: Request) -> Result<Response> {
        let method = request.method.clone();
        let path = request.route().to_string();
        tracing::debug!(%method, %path, stream = request.stream, "sending request");
        decode::check_status(self.transport.send(request)?)
    }

    /// Send without status mapping, for callers that tolerate some errors
    pub(crate) fn send_unchecked(&self, request: Request) -> Result<Response> {
        self.transport.send(request)
    }

    pub(crate) fn get_json<T: DeserializeOwned>(&self, path: &str, query: &Query) -> Result<T> {
        decode::json(self.send(Request::get(self.url_with_query(path, query)))?)
    }

    pub(crate) fn post_json<T: DeserializeOwned, B: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Query,
        body: Option<&B>,
    ) -> Result<T> {
        let mut request = Request::post(self.url_with_query(path, query));
        if let Some(body) = body {
            request = request.json(body)?;
        }
        decode::json(self.send(request)?)
    }

    pub(crate) fn post_empty(&self, path: &str, query: &Query) -> Result<()> {
        decode::no_content(self.send(Request::post(self.url_with_query(path, query)))?)
    }

    pub(crate) fn delete(&self, path: &str, query: &Query) -> Result<()> {
        decode::no_content(self.send(Request::delete(self.url_with_query(path, query)))?)
    }
}

/// Ask the daemon which API version it speaks
fn negotiate(transport: &dyn Transport) -> Result<ApiVersion> {
    let probe = || -> Result<ApiVersion> {
        let response = decode::check_status(transport.send(Request::get("/version"))?)?;
        let body: serde_json::Value = decode::json(response)?;
        let version = body
            .get("ApiVersion")
            .and_then(|v| v.as_str())
            .ok_or_else(|| Error::InvalidVersion("daemon did not report ApiVersion".into()))?;
        ApiVersion::parse(version)
    };

    match probe() {
        Ok(version) => {
            tracing::info!(version = %version, "negotiated API version");
            Ok(version)
        }
        Err(e) => Err(Error::Connection(format!(
            "error while fetching server API version: {}",
            e
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;
    use http::StatusCode;
    use serde_json::json;

    fn client(version: &str, transport: MockTransport) -> ApiClient {
        let config = ClientConfig::builder()
            .version(ApiVersion::parse(version).unwrap())
            .build();
        ApiClient::with_transport(Arc::new(transport), &config).unwrap()
    }

    #[test]
    fn test_url_composition() {
        let api = client("1.24", MockTransport::new());
        assert_eq!(api.url("/containers/json"), "/v1.24/containers/json");
        let query = Query::new().flag("all", true);
        assert_eq!(
            api.url_with_query("/containers/json", &query),
            "/v1.24/containers/json?all=1"
        );
    }

    #[test]
    fn test_auto_negotiation() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|req| req.path == "/version")
            .times(1)
            .returning(|_| Ok(Response::json(StatusCode::OK, &json!({"ApiVersion": "1.25"}))));

        let config = ClientConfig::builder().auto_version().build();
        let api = ApiClient::with_transport(Arc::new(transport), &config).unwrap();
        assert_eq!(api.api_version(), &ApiVersion::new(1, 25));
    }

    #[test]
    fn test_failed_negotiation_is_connection_error() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .returning(|_| Err(Error::Connection("refused".into())));

        let config = ClientConfig::builder().auto_version().build();
        let result = ApiClient::with_transport(Arc::new(transport), &config);
        assert!(matches!(result, Err(Error::Connection(_))));
    }

    #[test]
    fn test_error_status_is_mapped() {
        let mut transport = MockTransport::new();
        transport.expect_send().returning(|_| {
            Ok(Response::from_bytes(
                StatusCode::INTERNAL_SERVER_ERROR,
                r#"{"message":"daemon exploded"}"#,
            ))
        });
        let api = client("1.24", transport);
        let err = api.get_json::<serde_json::Value>("/info", &Query::new()).unwrap_err();
        assert_eq!(err.status_code(), Some(StatusCode::INTERNAL_SERVER_ERROR));
    }
}
