//! Daemon-wide endpoints: version, info, ping, events, registry login

use serde_json::{json, Value};

use super::request::Query;
use super::stream::JsonStream;
use super::ApiClient;
use crate::transport::Request;
use crate::types::Filters;
use crate::utils::Timestamp;
use crate::Result;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventsOptions {
    pub since: Option<Timestamp>,
    /// Without `until` the stream stays open until closed
    pub until: Option<Timestamp>,
    pub filters: Option<Filters>,
}

impl EventsOptions {
    pub fn with_since(mut self, since: impl Into<Timestamp>) -> Self {
        self.since = Some(since.into());
        self
    }

    pub fn with_until(mut self, until: impl Into<Timestamp>) -> Self {
        self.until = Some(until.into());
        self
    }

    pub fn with_filters(mut self, filters: Filters) -> Self {
        self.filters = Some(filters);
        self
    }
}

impl ApiClient {
    /// Daemon and API version report
    pub fn version(&self) -> Result<Value> {
        self.get_json("/version", &Query::new())
    }

    pub fn info(&self) -> Result<Value> {
        self.get_json("/info", &Query::new())
    }

    /// True when the daemon answers `OK`
    pub fn ping(&self) -> Result<bool> {
        let response = self.send(Request::get(self.url("/_ping")))?;
        let body = response.bytes()?;
        Ok(body.trim_ascii() == b"OK")
    }

    /// Live daemon events
    pub fn events(&self, options: &EventsOptions) -> Result<JsonStream<Value>> {
        let query = Query::new()
            .timestamp("since", options.since)
            .timestamp("until", options.until)
            .filters(options.filters.as_ref());
        let request = Request::get(self.url_with_query("/events", &query)).stream(true);
        Ok(JsonStream::new(self.send(request)?))
    }

    /// Check credentials against a registry; the daemon's reply carries
    /// `Status` and possibly an `IdentityToken`
    pub fn login(
        &self,
        username: &str,
        password: &str,
        email: Option<&str>,
        registry: Option<&str>,
    ) -> Result<Value> {
        let body = json!({
            "username": username,
            "password": password,
            "email": email,
            "serveraddress": registry,
        });
        tracing::info!(username, registry = ?registry, "registry login");
        self.post_json("/auth", &Query::new(), Some(&body))
    }
}
