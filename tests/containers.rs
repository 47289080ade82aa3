//! Container lifecycle against a scripted daemon

mod common;

use common::{frame, query_param, FakeDaemon};
use docker_client::{ContainerOptions, Error, RunOptions};
use http::{Method, StatusCode};
use serde_json::json;

fn script_lifecycle(daemon: &FakeDaemon, exit_code: i64, logs: Vec<u8>) {
    daemon.on_json(
        Method::GET,
        "/v1.24/containers/c1/json",
        StatusCode::OK,
        &json!({"Id": "c1", "Config": {"Tty": false}, "State": {"Status": "created"}}),
    );
    daemon.on(Method::POST, "/v1.24/containers/c1/start", StatusCode::NO_CONTENT, "");
    daemon.on_json(
        Method::POST,
        "/v1.24/containers/c1/wait",
        StatusCode::OK,
        &json!({"StatusCode": exit_code}),
    );
    daemon.on(Method::GET, "/v1.24/containers/c1/logs", StatusCode::OK, logs);
    daemon.on(Method::DELETE, "/v1.24/containers/c1", StatusCode::NO_CONTENT, "");
}

#[test]
fn test_run_pulls_missing_image_once() {
    let daemon = FakeDaemon::new();
    daemon.on_json(
        Method::POST,
        "/v1.24/containers/create",
        StatusCode::NOT_FOUND,
        &json!({"message": "No such image: alpine:latest"}),
    );
    daemon.on_json(
        Method::POST,
        "/v1.24/containers/create",
        StatusCode::CREATED,
        &json!({"Id": "c1", "Warnings": null}),
    );
    daemon.on(
        Method::POST,
        "/v1.24/images/create",
        StatusCode::OK,
        "{\"status\":\"Pulling from library/alpine\"}\n{\"status\":\"Status: Downloaded newer image for alpine:latest\"}\n",
    );
    script_lifecycle(&daemon, 0, frame(1, b"hi\n"));

    let client = daemon.client();
    let options = ContainerOptions::new("alpine").with_command("echo hi");
    let output = client
        .containers()
        .run(&options, &RunOptions::default())
        .unwrap();

    assert_eq!(output.into_logs().unwrap(), b"hi\n");
    assert_eq!(daemon.count(Method::POST, "/v1.24/images/create"), 1);
    assert_eq!(daemon.count(Method::POST, "/v1.24/containers/create"), 2);

    let pull = daemon.find(Method::POST, "/v1.24/images/create").unwrap();
    assert_eq!(query_param(&pull, "fromImage").as_deref(), Some("alpine"));
    assert_eq!(query_param(&pull, "tag").as_deref(), Some("latest"));
}

#[test]
fn test_run_nonzero_exit_is_container_error() {
    let daemon = FakeDaemon::new();
    daemon.on_json(
        Method::POST,
        "/v1.24/containers/create",
        StatusCode::CREATED,
        &json!({"Id": "c1"}),
    );
    script_lifecycle(&daemon, 1, frame(2, b"sh: nope: not found\n"));

    let client = daemon.client();
    let options = ContainerOptions::new("alpine").with_command("nope");
    let run = RunOptions {
        remove: true,
        ..Default::default()
    };
    let err = client.containers().run(&options, &run).unwrap_err();

    match err {
        Error::Container(ref e) => {
            assert_eq!(e.exit_status, 1);
            assert_eq!(e.container_id, "c1");
            assert!(e.stderr.contains("not found"));
        }
        ref other => panic!("expected container error, got {:?}", other),
    }
    let message = err.to_string();
    assert!(message.contains("nope"));
    assert!(message.contains("alpine"));

    let logs = daemon.find(Method::GET, "/v1.24/containers/c1/logs").unwrap();
    assert_eq!(query_param(&logs, "stdout").as_deref(), Some("0"));
    assert_eq!(query_param(&logs, "stderr").as_deref(), Some("1"));
    assert_eq!(daemon.count(Method::DELETE, "/v1.24/containers/c1"), 1);
    assert_eq!(daemon.count(Method::POST, "/v1.24/images/create"), 0);
}

#[test]
fn test_run_detached_returns_handle() {
    let daemon = FakeDaemon::new();
    daemon.on_json(
        Method::POST,
        "/v1.24/containers/create",
        StatusCode::CREATED,
        &json!({"Id": "c1"}),
    );
    script_lifecycle(&daemon, 0, Vec::new());

    let client = daemon.client();
    let options = ContainerOptions::new("nginx").with_detach(true);
    let container = client
        .containers()
        .run(&options, &RunOptions::default())
        .unwrap()
        .into_container()
        .unwrap();

    assert_eq!(container.id(), "c1");
    assert_eq!(daemon.count(Method::POST, "/v1.24/containers/c1/wait"), 0);
}

#[test]
fn test_create_failure_other_than_missing_image_propagates() {
    let daemon = FakeDaemon::new();
    daemon.on_json(
        Method::POST,
        "/v1.24/containers/create",
        StatusCode::CONFLICT,
        &json!({"message": "Conflict. The name \"/web\" is already in use"}),
    );

    let client = daemon.client();
    let options = ContainerOptions::new("nginx").with_name("web");
    let err = client
        .containers()
        .run(&options, &RunOptions::default())
        .unwrap_err();

    assert_eq!(err.status_code(), Some(StatusCode::CONFLICT));
    assert_eq!(daemon.count(Method::POST, "/v1.24/images/create"), 0);
    let create = daemon.find(Method::POST, "/v1.24/containers/create").unwrap();
    assert_eq!(query_param(&create, "name").as_deref(), Some("web"));
}
