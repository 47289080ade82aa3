//! Exec endpoints

use serde_json::{json, Map, Value};

use super::frames::LogStream;
use super::request::{resource_path, Identifier, Query};
use super::{decode, ApiClient};
use crate::transport::Request;
use crate::types::Command;
use crate::Result;

#[derive(Debug, Clone, PartialEq)]
pub struct ExecCreateOptions {
    pub cmd: Command,
    pub stdout: bool,
    pub stderr: bool,
    pub stdin: bool,
    pub tty: bool,
    pub privileged: bool,
    pub user: Option<String>,
}

impl ExecCreateOptions {
    pub fn new(cmd: impl Into<Command>) -> Self {
        Self {
            cmd: cmd.into(),
            stdout: true,
            stderr: true,
            stdin: false,
            tty: false,
            privileged: false,
            user: None,
        }
    }

    pub fn with_tty(mut self, tty: bool) -> Self {
        self.tty = tty;
        self
    }

    pub fn with_privileged(mut self, privileged: bool) -> Self {
        self.privileged = privileged;
        self
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecStartOptions {
    pub detach: bool,
    pub tty: bool,
}

impl ApiClient {
    /// Prepare a command inside a running container; returns `{"Id": ...}`
    pub fn exec_create(&self, container: &(impl Identifier + ?Sized), options: &ExecCreateOptions) -> Result<Value> {
        self.require("1.15", "exec")?;
        if options.privileged {
            self.require("1.19", "privileged exec")?;
        }
        if options.user.is_some() {
            self.require("1.19", "exec user")?;
        }

        let mut body = Map::new();
        body.insert("AttachStdin".into(), Value::Bool(options.stdin));
        body.insert("AttachStdout".into(), Value::Bool(options.stdout));
        body.insert("AttachStderr".into(), Value::Bool(options.stderr));
        body.insert("Tty".into(), Value::Bool(options.tty));
        body.insert("Cmd".into(), json!(options.cmd.to_argv()?));
        if self.gate().at_least("1.19") {
            body.insert("Privileged".into(), Value::Bool(options.privileged));
            body.insert(
                "User".into(),
                Value::String(options.user.clone().unwrap_or_default()),
            );
        }

        let path = resource_path("/containers", container, "/exec")?;
        self.post_json(&path, &Query::new(), Some(&Value::Object(body)))
    }

    /// Run a prepared exec and collect its output
    pub fn exec_start(&self, exec: &(impl Identifier + ?Sized), options: &ExecStartOptions) -> Result<Vec<u8>> {
        if options.detach {
            self.exec_start_request(exec, options, false)?;
            return Ok(Vec::new());
        }
        self.exec_start_request(exec, options, false)?.into_bytes()
    }

    pub fn exec_start_stream(&self, exec: &(impl Identifier + ?Sized), options: &ExecStartOptions) -> Result<LogStream> {
        self.exec_start_request(exec, options, true)
    }

    fn exec_start_request(
        &self,
        exec: &(impl Identifier + ?Sized),
        options: &ExecStartOptions,
        stream: bool,
    ) -> Result<LogStream> {
        self.require("1.15", "exec")?;
        let path = resource_path("/exec", exec, "/start")?;
        let body = json!({"Tty": options.tty, "Detach": options.detach});
        let mut request = Request::post(self.url(&path)).json(&body)?.stream(stream);
        if !options.detach {
            request = request.upgrade();
        }
        let response = self.send(request)?;
        Ok(LogStream::new(response.body, options.tty))
    }

    pub fn exec_inspect(&self, exec: &(impl Identifier + ?Sized)) -> Result<Value> {
        self.require("1.16", "exec_inspect")?;
        let path = resource_path("/exec", exec, "/json")?;
        self.get_json(&path, &Query::new())
    }

    pub fn exec_resize(&self, exec: &(impl Identifier + ?Sized), height: u32, width: u32) -> Result<()> {
        self.require("1.15", "exec_resize")?;
        let path = resource_path("/exec", exec, "/resize")?;
        let url = self.url_with_query(&path, &Query::new().param("h", height).param("w", width));
        decode::no_content(self.send(Request::post(url))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::frames::{encode_frame, StdStream};
    use crate::config::ClientConfig;
    use crate::transport::{MockTransport, Response};
    use crate::version::ApiVersion;
    use crate::Error;
    use http::StatusCode;
    use std::sync::Arc;

    fn client(version: &str, transport: MockTransport) -> ApiClient {
        let config = ClientConfig::builder()
            .version(ApiVersion::parse(version).unwrap())
            .build();
        ApiClient::with_transport(Arc::new(transport), &config).unwrap()
    }

    #[test]
    fn test_exec_create_body() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|req| {
                let body: Value = serde_json::from_slice(&req.body.as_ref().unwrap().data).unwrap();
                req.route() == "/v1.24/containers/web/exec"
                    && body["Cmd"] == json!(["ls", "-la", "/tmp dir"])
                    && body["User"] == "root"
                    && body["Privileged"] == false
            })
            .times(1)
            .returning(|_| Ok(Response::json(StatusCode::CREATED, &json!({"Id": "e1"}))));

        let opts = ExecCreateOptions::new("ls -la '/tmp dir'").with_user("root");
        let created = client("1.24", transport).exec_create("web", &opts).unwrap();
        assert_eq!(created["Id"], "e1");
    }

    #[test]
    fn test_exec_user_needs_1_19() {
        let mut transport = MockTransport::new();
        transport.expect_send().times(0);
        let opts = ExecCreateOptions::new("true").with_user("nobody");
        let err = client("1.18", transport).exec_create("web", &opts).unwrap_err();
        assert!(matches!(err, Error::InvalidVersion(_)));
    }

    #[test]
    fn test_exec_start_collects_output() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|req| req.route() == "/v1.24/exec/e1/start" && req.is_upgrade())
            .times(1)
            .returning(|_| {
                Ok(Response::from_bytes(
                    StatusCode::OK,
                    encode_frame(StdStream::Stdout, b"total 0\n").unwrap(),
                ))
            });

        let out = client("1.24", transport)
            .exec_start("e1", &ExecStartOptions::default())
            .unwrap();
        assert_eq!(out, b"total 0\n");
    }
}
