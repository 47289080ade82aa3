//! Transport seam between the request pipeline and the daemon
//!
//! Everything above this module speaks in terms of [`Request`] and
//! [`Response`]; the bytes on the wire belong to a [`Transport`].

mod http;

use std::fmt;
use std::io::{Cursor, Read};
use std::time::Duration;

use ::http::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use ::http::{HeaderMap, Method, StatusCode};
use serde::Serialize;

use crate::{Error, Result};

pub use self::http::HttpTransport;

/// Sends one request and hands back the response head plus a readable body
#[cfg_attr(test, mockall::automock)]
pub trait Transport: Send + Sync {
    fn send(&self, request: Request) -> Result<Response>;
}

/// Request payload with its content type
#[derive(Debug, Clone)]
pub struct Body {
    pub content_type: &'static str,
    pub data: Vec<u8>,
}

impl Body {
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        Ok(Self {
            content_type: "application/json",
            data: serde_json::to_vec(value)?,
        })
    }

    pub fn tar(data: Vec<u8>) -> Self {
        Self {
            content_type: "application/x-tar",
            data,
        }
    }

}

/// How long the transport waits for a response
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Deadline {
    /// The transport's configured timeout
    #[default]
    Default,
    After(Duration),
    /// Wait as long as the daemon takes, e.g. for `/wait`
    Never,
}

#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    /// Path plus query string, e.g. `/v1.24/containers/json?all=1`
    pub path: String,
    pub headers: HeaderMap,
    pub body: Option<Body>,
    pub timeout: Deadline,
    /// Body is consumed incrementally; no read timeout applies
    pub stream: bool,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            body: None,
            timeout: Deadline::Default,
            stream: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn json<T: Serialize + ?Sized>(mut self, value: &T) -> Result<Self> {
        self.body = Some(Body::json(value)?);
        Ok(self)
    }

    pub fn body(mut self, body: Body) -> Self {
        self.body = Some(body);
        self
    }

    pub fn header(mut self, name: &'static str, value: &str) -> Result<Self> {
        let value = HeaderValue::from_str(value)
            .map_err(|e| Error::InvalidArgument(format!("invalid {} header: {}", name, e)))?;
        self.headers.insert(HeaderName::from_static(name), value);
        Ok(self)
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Deadline::After(timeout);
        self
    }

    /// Disable the response timeout entirely
    pub fn no_timeout(mut self) -> Self {
        self.timeout = Deadline::Never;
        self
    }

    pub fn stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    /// Ask the daemon to hijack the connection (attach/exec)
    pub fn upgrade(mut self) -> Self {
        self.headers
            .insert(::http::header::CONNECTION, HeaderValue::from_static("Upgrade"));
        self.headers
            .insert(::http::header::UPGRADE, HeaderValue::from_static("tcp"));
        self
    }

    pub fn is_upgrade(&self) -> bool {
        self.headers.contains_key(::http::header::UPGRADE)
    }

    /// Path without the query string
    pub fn route(&self) -> &str {
        self.path.split('?').next().unwrap_or(&self.path)
    }

    /// Decoded value of one query parameter
    pub fn query_param(&self, key: &str) -> Option<String> {
        let (_, query) = self.path.split_once('?')?;
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }
}

/// Response head plus a body that is read on demand
pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Box<dyn Read + Send>,
}

impl Response {
    pub fn new(status: StatusCode, body: impl Read + Send + 'static) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Box::new(body),
        }
    }

    pub fn from_bytes(status: StatusCode, data: impl Into<Vec<u8>>) -> Self {
        Self::new(status, Cursor::new(data.into()))
    }

    pub fn json(status: StatusCode, value: &serde_json::Value) -> Self {
        let mut response = Self::from_bytes(status, value.to_string());
        response
            .headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        response
    }

    pub fn empty(status: StatusCode) -> Self {
        Self::from_bytes(status, Vec::new())
    }

    pub fn with_header(mut self, name: &'static str, value: &str) -> Self {
        if let Ok(value) = HeaderValue::from_str(value) {
            self.headers.insert(HeaderName::from_static(name), value);
        }
        self
    }

    pub fn header_str(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn bytes(mut self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.body.read_to_end(&mut buf)?;
        Ok(buf)
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let req = Request::post("/v1.24/containers/create?name=web")
            .json(&serde_json::json!({"Image": "alpine"}))
            .unwrap()
            .timeout(Duration::from_secs(3));

        assert_eq!(req.method, Method::POST);
        assert_eq!(req.route(), "/v1.24/containers/create");
        assert_eq!(req.query_param("name").as_deref(), Some("web"));
        assert_eq!(req.body.as_ref().unwrap().content_type, "application/json");
        assert!(!req.is_upgrade());
        assert!(req.upgrade().is_upgrade());
    }

    #[test]
    fn test_request_deadline() {
        assert_eq!(Request::get("/_ping").timeout, Deadline::Default);
        assert_eq!(
            Request::get("/_ping").timeout(Duration::from_secs(3)).timeout,
            Deadline::After(Duration::from_secs(3))
        );
        assert_eq!(Request::post("/containers/abc/wait").no_timeout().timeout, Deadline::Never);
    }

    #[test]
    fn test_response_bytes() {
        let resp = Response::from_bytes(StatusCode::OK, "hello").with_header("x-test", "1");
        assert_eq!(resp.header_str("x-test"), Some("1"));
        assert_eq!(resp.bytes().unwrap(), b"hello");
    }
}
