//! Scripted in-process daemon for integration tests

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use docker_client::transport::{Request, Response, Transport};
use docker_client::{ClientConfig, DockerClient};
use http::{Method, StatusCode};
use parking_lot::Mutex;
use serde_json::{json, Value};

type Reply = (StatusCode, Vec<u8>);

/// Answers requests from per-route response queues and records every call
///
/// The last queued reply of a route is repeated once the queue drains.
pub struct FakeDaemon {
    routes: Mutex<HashMap<(Method, String), VecDeque<Reply>>>,
    calls: Mutex<Vec<(Method, String)>>,
}

impl FakeDaemon {
    /// Daemon outside any swarm, speaking API 1.24
    pub fn new() -> Arc<Self> {
        let daemon = Arc::new(Self {
            routes: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        });
        daemon.on_json(
            Method::GET,
            "/v1.24/swarm",
            StatusCode::NOT_ACCEPTABLE,
            &json!({"message": "This node is not part of a swarm"}),
        );
        daemon
    }

    pub fn on(&self, method: Method, route: &str, status: StatusCode, body: impl Into<Vec<u8>>) {
        self.routes
            .lock()
            .entry((method, route.to_string()))
            .or_default()
            .push_back((status, body.into()));
    }

    pub fn on_json(&self, method: Method, route: &str, status: StatusCode, body: &Value) {
        self.on(method, route, status, body.to_string());
    }

    /// Drop anything queued for the route and answer with `body` from now on
    pub fn replace_json(&self, method: Method, route: &str, status: StatusCode, body: &Value) {
        self.routes.lock().remove(&(method.clone(), route.to_string()));
        self.on_json(method, route, status, body);
    }

    /// Full request paths, query included, in call order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().iter().map(|(m, p)| format!("{} {}", m, p)).collect()
    }

    pub fn count(&self, method: Method, route: &str) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|(m, p)| *m == method && p.split('?').next() == Some(route))
            .count()
    }

    /// First recorded call to `route`, with its query string
    pub fn find(&self, method: Method, route: &str) -> Option<String> {
        self.calls
            .lock()
            .iter()
            .find(|(m, p)| *m == method && p.split('?').next() == Some(route))
            .map(|(_, p)| p.clone())
    }

    pub fn client(self: &Arc<Self>) -> DockerClient {
        DockerClient::with_transport(self.clone(), &ClientConfig::default())
            .expect("client construction")
    }
}

impl Transport for FakeDaemon {
    fn send(&self, request: Request) -> docker_client::Result<Response> {
        self.calls
            .lock()
            .push((request.method.clone(), request.path.clone()));

        let key = (request.method.clone(), request.route().to_string());
        let mut routes = self.routes.lock();
        let reply = match routes.get_mut(&key) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        };

        Ok(match reply {
            Some((status, body)) => Response::from_bytes(status, body),
            None => Response::from_bytes(
                StatusCode::NOT_FOUND,
                json!({"message": format!("no route for {} {}", key.0, key.1)}).to_string(),
            ),
        })
    }
}

/// One multiplexed stream frame
pub fn frame(stream: u8, payload: &[u8]) -> Vec<u8> {
    let mut out = vec![stream, 0, 0, 0];
    out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    out.extend_from_slice(payload);
    out
}

/// URL query parameter of a recorded call
pub fn query_param(path: &str, key: &str) -> Option<String> {
    let (_, query) = path.split_once('?')?;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}
