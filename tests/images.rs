//! Image builds and pulls against a scripted daemon

mod common;

use common::FakeDaemon;
use docker_client::api::BuildOptions;
use docker_client::Error;
use http::{Method, StatusCode};
use serde_json::json;

#[test]
fn test_build_returns_built_image() {
    let daemon = FakeDaemon::new();
    daemon.on(
        Method::POST,
        "/v1.24/build",
        StatusCode::OK,
        concat!(
            "{\"stream\":\"Step 1 : FROM busybox\\n\"}\r\n",
            "{\"stream\":\" ---> 47bcc53f74dc\\n\"}\r\n",
            "{\"stream\":\"Successfully built abc123\\n\"}\r\n",
        ),
    );
    daemon.on_json(
        Method::GET,
        "/v1.24/images/abc123/json",
        StatusCode::OK,
        &json!({"Id": "abc123", "RepoTags": ["app:dev"]}),
    );

    let client = daemon.client();
    let image = client
        .images()
        .build(&BuildOptions::from_context(vec![0u8; 1024]).with_tag("app:dev"))
        .unwrap();

    assert_eq!(image.id(), "abc123");
    assert_eq!(image.tags(), vec!["app:dev"]);
}

#[test]
fn test_build_error_event() {
    let daemon = FakeDaemon::new();
    daemon.on(
        Method::POST,
        "/v1.24/build",
        StatusCode::OK,
        "{\"stream\":\"Step 1 : FROOM busybox\\n\"}\n{\"error\":\"no such instruction\",\"errorDetail\":{\"message\":\"no such instruction\"}}\n",
    );

    let err = daemon
        .client()
        .images()
        .build(&BuildOptions::from_context(vec![0u8; 1024]))
        .unwrap_err();

    assert!(matches!(err, Error::Build(ref text) if text.contains("no such instruction")));
    assert_eq!(daemon.count(Method::GET, "/v1.24/images/abc123/json"), 0);
}

#[test]
fn test_build_without_success_marker() {
    let daemon = FakeDaemon::new();
    daemon.on(
        Method::POST,
        "/v1.24/build",
        StatusCode::OK,
        "{\"stream\":\"Step 1 : FROM busybox\\n\"}\n",
    );

    let err = daemon
        .client()
        .images()
        .build(&BuildOptions::from_context(vec![0u8; 1024]))
        .unwrap_err();
    assert!(matches!(err, Error::Build(_)));
}

#[test]
fn test_pull_error_after_progress_surfaces() {
    let daemon = FakeDaemon::new();
    daemon.on(
        Method::POST,
        "/v1.24/images/create",
        StatusCode::OK,
        "{\"status\":\"Pulling fs layer\",\"id\":\"a3ed95caeb02\"}\n{\"error\":\"manifest unknown\"}\n",
    );

    let err = daemon
        .client()
        .images()
        .pull("private/app:1.0", &Default::default())
        .unwrap_err();
    assert!(matches!(err, Error::Progress(ref m) if m == "manifest unknown"));
    assert_eq!(daemon.count(Method::GET, "/v1.24/images/private/app:1.0/json"), 0);
}
