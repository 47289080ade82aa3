//! Filters, swarm absence and pre-flight version gating

mod common;

use std::sync::Arc;

use common::{query_param, FakeDaemon};
use docker_client::api::{ListContainersOptions, LogsOptions, UpdateContainerOptions};
use docker_client::transport::{Request, Response, Transport};
use docker_client::{
    ApiClient, ApiVersion, ClientConfig, ContainerOptions, CreateServiceOptions, DockerClient,
    EndpointConfig, Error, Filters, HostConfig,
};
use http::{Method, StatusCode};
use mockall::mock;
use serde_json::{json, Value};

mock! {
    pub Daemon {}

    impl Transport for Daemon {
        fn send(&self, request: Request) -> docker_client::Result<Response>;
    }
}

fn silent_api(version: &str) -> ApiClient {
    let mut daemon = MockDaemon::new();
    daemon.expect_send().times(0);
    let config = ClientConfig::builder()
        .version(ApiVersion::parse(version).unwrap())
        .build();
    ApiClient::with_transport(Arc::new(daemon), &config).unwrap()
}

#[test]
fn test_list_filters_serialized_only_when_given() {
    let daemon = FakeDaemon::new();
    daemon.on_json(Method::GET, "/v1.24/containers/json", StatusCode::OK, &json!([]));
    let client = daemon.client();

    let running = ListContainersOptions::default()
        .with_filters(Filters::new().with("status", "running"));
    client.containers().list(&running).unwrap();
    client.containers().list(&ListContainersOptions::default()).unwrap();

    let calls: Vec<String> = daemon
        .calls()
        .into_iter()
        .filter(|c| c.contains("/containers/json"))
        .collect();
    assert_eq!(calls.len(), 2);

    let filters: Value = serde_json::from_str(&query_param(&calls[0], "filters").unwrap()).unwrap();
    assert_eq!(filters, json!({"status": "running"}));
    assert!(query_param(&calls[1], "filters").is_none());
}

#[test]
fn test_list_inspects_each_container() {
    let daemon = FakeDaemon::new();
    daemon.on_json(
        Method::GET,
        "/v1.24/containers/json",
        StatusCode::OK,
        &json!([{"Id": "a1"}, {"Id": "b2"}]),
    );
    daemon.on_json(Method::GET, "/v1.24/containers/a1/json", StatusCode::OK, &json!({"Id": "a1", "Name": "/one"}));
    daemon.on_json(Method::GET, "/v1.24/containers/b2/json", StatusCode::OK, &json!({"Id": "b2", "Name": "/two"}));

    let containers = daemon
        .client()
        .containers()
        .list(&ListContainersOptions::all())
        .unwrap();
    let names: Vec<_> = containers.iter().filter_map(|c| c.name()).collect();
    assert_eq!(names, vec!["one", "two"]);
}

#[test]
fn test_get_missing_container_is_not_found() {
    let daemon = FakeDaemon::new();
    daemon.on_json(
        Method::GET,
        "/v1.24/containers/ghost/json",
        StatusCode::NOT_FOUND,
        &json!({"message": "No such container: ghost"}),
    );
    let err = daemon.client().containers().get("ghost").unwrap_err();
    assert!(err.is_not_found());
    assert!(!err.is_image_not_found());
}

#[test]
fn test_client_survives_missing_swarm() {
    let daemon = FakeDaemon::new();
    let client = daemon.client();
    assert!(client.swarm().id().is_none());
    assert_eq!(daemon.count(Method::GET, "/v1.24/swarm"), 1);

    daemon.on_json(
        Method::POST,
        "/v1.24/swarm/leave",
        StatusCode::NOT_ACCEPTABLE,
        &json!({"message": "This node is not part of a swarm"}),
    );
    client.swarm().leave(true).unwrap();
    assert!(client.swarm().leave(false).is_err());
}

#[test]
fn test_swarm_init_reloads() {
    let daemon = FakeDaemon::new();
    let client = daemon.client();

    daemon.on_json(Method::POST, "/v1.24/swarm/init", StatusCode::OK, &json!("node-1"));
    daemon.replace_json(
        Method::GET,
        "/v1.24/swarm",
        StatusCode::OK,
        &json!({"ID": "swarm-1", "Version": {"Index": 10}}),
    );

    let node_id = client.swarm().init(&Default::default()).unwrap();
    assert_eq!(node_id, "node-1");
    assert_eq!(client.swarm().id(), Some("swarm-1"));
    assert_eq!(client.swarm().version(), Some(10));
}

#[test]
fn test_gated_features_make_no_calls() {
    let api = silent_api("1.18");

    let logs = LogsOptions::default().with_since(1_400_000_000i64).with_tty(false);
    assert!(matches!(api.logs("c1", &logs), Err(Error::InvalidVersion(_))));

    let update = UpdateContainerOptions {
        cpu_shares: Some(512),
        ..Default::default()
    };
    assert!(matches!(api.update_container("c1", &update), Err(Error::InvalidVersion(_))));
    assert!(matches!(api.networks(&[], &[]), Err(Error::InvalidVersion(_))));
    assert!(matches!(api.inspect_swarm(), Err(Error::InvalidVersion(_))));
}

#[test]
fn test_gated_create_settings_make_no_calls() {
    let api = silent_api("1.21");

    let with_endpoint = ContainerOptions::new("nginx").with_network("frontend", EndpointConfig::default());
    assert!(matches!(api.create_container(&with_endpoint), Err(Error::InvalidVersion(_))));

    let mut host = HostConfig::new();
    host.shm_size = Some(64 * 1024 * 1024);
    let with_shm = ContainerOptions::new("nginx").with_host_config(host);
    assert!(matches!(api.create_container(&with_shm), Err(Error::InvalidVersion(_))));

    let service = CreateServiceOptions::new("redis").to_service_options().unwrap();
    assert!(matches!(api.create_service(&service), Err(Error::InvalidVersion(_))));
}

#[test]
fn test_auto_version_failure_is_connection_error() {
    let mut daemon = MockDaemon::new();
    daemon
        .expect_send()
        .times(1)
        .returning(|_| Err(Error::Connection("connection refused".into())));
    let config = ClientConfig::builder().auto_version().build();
    let result = DockerClient::with_transport(Arc::new(daemon), &config);
    assert!(matches!(result, Err(Error::Connection(_))));
}
