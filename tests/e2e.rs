//! End-to-end tests against a live Docker daemon
//! Run with: cargo test --test e2e -- --ignored (requires a reachable daemon)

use docker_client::api::{ListContainersOptions, LogsOptions, RemoveContainerOptions};
use docker_client::{ContainerOptions, DockerClient, Error, RunOptions};

fn client() -> DockerClient {
    DockerClient::from_env().unwrap()
}

#[test]
#[ignore] // Run manually: cargo test --test e2e -- --ignored
fn test_ping_and_version() {
    let c = client();
    assert!(c.ping().unwrap());

    let version = c.version().unwrap();
    println!("Engine {} (API {})", version["Version"], version["ApiVersion"]);
    assert!(version["ApiVersion"].is_string());
}

#[test]
#[ignore]
fn test_run_echo() {
    let c = client();
    let options = ContainerOptions::new("alpine:3.4").with_command("echo hello world");
    let run = RunOptions {
        remove: true,
        ..Default::default()
    };

    let logs = c.containers().run(&options, &run).unwrap().into_logs().unwrap();
    assert_eq!(logs, b"hello world\n");
}

#[test]
#[ignore]
fn test_run_failure() {
    let c = client();
    let options = ContainerOptions::new("alpine:3.4").with_command("sh -c 'echo oops >&2; exit 3'");
    let run = RunOptions {
        remove: true,
        ..Default::default()
    };

    match c.containers().run(&options, &run) {
        Err(Error::Container(e)) => {
            assert_eq!(e.exit_status, 3);
            assert!(e.stderr.contains("oops"));
        }
        other => panic!("expected container error, got {:?}", other),
    }
}

#[test]
#[ignore]
fn test_detached_lifecycle() {
    let c = client();
    let options = ContainerOptions::new("alpine:3.4")
        .with_command("sh -c 'while true; do echo tick; sleep 1; done'")
        .with_detach(true);

    let mut container = c
        .containers()
        .run(&options, &RunOptions::default())
        .unwrap()
        .into_container()
        .unwrap();
    container.reload().unwrap();
    assert_eq!(container.status(), Some("running"));

    let listed = c.containers().list(&ListContainersOptions::default()).unwrap();
    assert!(listed.iter().any(|l| l.id() == container.id()));

    let mut logs = container
        .logs_stream(&LogsOptions::default().with_follow(true))
        .unwrap();
    let (_, first) = logs.next().unwrap().unwrap();
    assert_eq!(first, b"tick\n");
    logs.close();

    container.stop(Some(1)).unwrap();
    container
        .remove(&RemoveContainerOptions {
            force: true,
            ..Default::default()
        })
        .unwrap();
}
