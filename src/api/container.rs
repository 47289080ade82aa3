//! Container endpoints

use std::time::Duration;

use serde_json::{Map, Value};

use super::decode::{self, RawStream};
use super::frames::LogStream;
use super::request::{resolve_identifier, resource_path, Identifier, Query};
use super::stream::JsonStream;
use super::ApiClient;
use crate::transport::{Body, Request, Response};
use crate::types::{ContainerOptions, Filters, HostConfig, RestartPolicy};
use crate::utils::{decode_json_header, ByteSize, Timestamp};
use crate::Result;
#[cfg(test)]
use crate::Error;

const DEFAULT_STOP_TIMEOUT: u64 = 10;
const PATH_STAT_HEADER: &str = "x-docker-container-path-stat";

#[derive(Debug, Clone, PartialEq)]
pub struct ListContainersOptions {
    pub all: bool,
    pub quiet: bool,
    pub trunc: bool,
    pub latest: bool,
    pub since: Option<String>,
    pub before: Option<String>,
    pub limit: i64,
    pub size: bool,
    pub filters: Option<Filters>,
}

impl Default for ListContainersOptions {
    fn default() -> Self {
        Self {
            all: false,
            quiet: false,
            trunc: false,
            latest: false,
            since: None,
            before: None,
            limit: -1,
            size: false,
            filters: None,
        }
    }
}

impl ListContainersOptions {
    pub fn all() -> Self {
        Self {
            all: true,
            ..Default::default()
        }
    }

    pub fn with_filters(mut self, filters: Filters) -> Self {
        self.filters = Some(filters);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoveContainerOptions {
    /// Remove anonymous volumes too
    pub v: bool,
    pub link: bool,
    pub force: bool,
}

/// How many trailing log lines to return
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Tail {
    #[default]
    All,
    Lines(u64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogsOptions {
    pub stdout: bool,
    pub stderr: bool,
    pub timestamps: bool,
    pub follow: bool,
    pub tail: Tail,
    pub since: Option<Timestamp>,
    /// Known TTY setting; looked up from the container when `None`
    pub tty: Option<bool>,
}

impl Default for LogsOptions {
    fn default() -> Self {
        Self {
            stdout: true,
            stderr: true,
            timestamps: false,
            follow: false,
            tail: Tail::All,
            since: None,
            tty: None,
        }
    }
}

impl LogsOptions {
    pub fn stdout_only() -> Self {
        Self {
            stderr: false,
            ..Default::default()
        }
    }

    pub fn stderr_only() -> Self {
        Self {
            stdout: false,
            ..Default::default()
        }
    }

    pub fn with_follow(mut self, follow: bool) -> Self {
        self.follow = follow;
        self
    }

    pub fn with_tail(mut self, lines: u64) -> Self {
        self.tail = Tail::Lines(lines);
        self
    }

    pub fn with_since(mut self, since: impl Into<Timestamp>) -> Self {
        self.since = Some(since.into());
        self
    }

    pub fn with_timestamps(mut self, timestamps: bool) -> Self {
        self.timestamps = timestamps;
        self
    }

    pub fn with_tty(mut self, tty: bool) -> Self {
        self.tty = Some(tty);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachOptions {
    pub stdout: bool,
    pub stderr: bool,
    /// Replay output produced before attaching
    pub logs: bool,
    pub tty: Option<bool>,
}

impl Default for AttachOptions {
    fn default() -> Self {
        Self {
            stdout: true,
            stderr: true,
            logs: false,
            tty: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommitOptions {
    pub repository: Option<String>,
    pub tag: Option<String>,
    pub message: Option<String>,
    pub author: Option<String>,
    pub changes: Option<String>,
    pub conf: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateContainerOptions {
    pub blkio_weight: Option<u16>,
    pub cpu_period: Option<i64>,
    pub cpu_quota: Option<i64>,
    pub cpu_shares: Option<i64>,
    pub cpuset_cpus: Option<String>,
    pub cpuset_mems: Option<String>,
    pub mem_limit: Option<ByteSize>,
    pub mem_reservation: Option<ByteSize>,
    pub memswap_limit: Option<ByteSize>,
    pub kernel_memory: Option<ByteSize>,
    pub restart_policy: Option<RestartPolicy>,
}

impl UpdateContainerOptions {
    fn to_body(&self, api: &ApiClient) -> Result<Value> {
        let mut data = Map::new();
        if let Some(w) = self.blkio_weight {
            data.insert("BlkioWeight".into(), Value::from(w));
        }
        if let Some(p) = self.cpu_period {
            data.insert("CpuPeriod".into(), Value::from(p));
        }
        if let Some(q) = self.cpu_quota {
            data.insert("CpuQuota".into(), Value::from(q));
        }
        if let Some(s) = self.cpu_shares {
            data.insert("CpuShares".into(), Value::from(s));
        }
        if let Some(ref c) = self.cpuset_cpus {
            data.insert("CpusetCpus".into(), Value::String(c.clone()));
        }
        if let Some(ref m) = self.cpuset_mems {
            data.insert("CpusetMems".into(), Value::String(m.clone()));
        }
        for (key, size) in [
            ("Memory", &self.mem_limit),
            ("MemoryReservation", &self.mem_reservation),
            ("MemorySwap", &self.memswap_limit),
            ("KernelMemory", &self.kernel_memory),
        ] {
            if let Some(size) = size {
                data.insert(key.into(), Value::from(size.to_bytes()?));
            }
        }
        if let Some(ref policy) = self.restart_policy {
            api.require("1.23", "restart policy update")?;
            data.insert("RestartPolicy".into(), serde_json::to_value(policy)?);
        }
        Ok(Value::Object(data))
    }
}

impl ApiClient {
    /// List containers (`docker ps`)
    pub fn containers(&self, options: &ListContainersOptions) -> Result<Vec<Value>> {
        let query = Query::new()
            .param("limit", if options.latest { 1 } else { options.limit })
            .flag("all", options.all)
            .flag("size", options.size)
            .flag("trunc_cmd", options.trunc)
            .opt("since", options.since.as_deref())
            .opt("before", options.before.as_deref())
            .filters(options.filters.as_ref());
        let mut containers: Vec<Value> = self.get_json("/containers/json", &query)?;

        if options.quiet {
            return Ok(containers
                .into_iter()
                .map(|c| serde_json::json!({"Id": c.get("Id").cloned().unwrap_or(Value::Null)}))
                .collect());
        }
        if options.trunc {
            for container in containers.iter_mut() {
                if let Some(Value::String(id)) = container.get_mut("Id") {
                    id.truncate(12);
                }
            }
        }
        Ok(containers)
    }

    /// Create a container; returns `{"Id": ..., "Warnings": ...}`
    pub fn create_container(&self, options: &ContainerOptions) -> Result<Value> {
        let config = options.to_create_body(self.gate())?;
        self.create_container_from_config(&config, options.name.as_deref())
    }

    pub fn create_container_from_config(&self, config: &Value, name: Option<&str>) -> Result<Value> {
        let query = Query::new().opt("name", name);
        self.post_json("/containers/create", &query, Some(config))
    }

    pub fn inspect_container(&self, container: &(impl Identifier + ?Sized)) -> Result<Value> {
        let path = resource_path("/containers", container, "/json")?;
        self.get_json(&path, &Query::new())
    }

    pub fn start(&self, container: &(impl Identifier + ?Sized)) -> Result<()> {
        let path = resource_path("/containers", container, "/start")?;
        self.post_empty(&path, &Query::new())
    }

    /// Start with host settings passed at start time (pre-1.15 daemons)
    pub fn start_with_host_config(
        &self,
        container: &(impl Identifier + ?Sized),
        host_config: &HostConfig,
    ) -> Result<()> {
        host_config.check(self.gate())?;
        let path = resource_path("/containers", container, "/start")?;
        let mut request = Request::post(self.url(&path));
        if !host_config.is_empty() {
            if self.gate().at_least("1.15") {
                tracing::warn!("host config passed to start; prefer setting it at create time");
            }
            request = request.json(host_config)?;
        }
        decode::no_content(self.send(request)?)
    }

    /// Stop, killing after `timeout` seconds (default 10)
    pub fn stop(&self, container: &(impl Identifier + ?Sized), timeout: Option<u64>) -> Result<()> {
        let t = timeout.unwrap_or(DEFAULT_STOP_TIMEOUT);
        let path = resource_path("/containers", container, "/stop")?;
        let url = self.url_with_query(&path, &Query::new().param("t", t));
        let request = Request::post(url).timeout(Duration::from_secs(t) + self.timeout());
        decode::no_content(self.send(request)?)
    }

    pub fn restart(&self, container: &(impl Identifier + ?Sized), timeout: Option<u64>) -> Result<()> {
        let t = timeout.unwrap_or(DEFAULT_STOP_TIMEOUT);
        let path = resource_path("/containers", container, "/restart")?;
        let url = self.url_with_query(&path, &Query::new().param("t", t));
        let request = Request::post(url).timeout(Duration::from_secs(t) + self.timeout());
        decode::no_content(self.send(request)?)
    }

    /// Send a signal (name such as `SIGHUP` or a number); default `SIGKILL`
    pub fn kill(&self, container: &(impl Identifier + ?Sized), signal: Option<&str>) -> Result<()> {
        let path = resource_path("/containers", container, "/kill")?;
        self.post_empty(&path, &Query::new().opt("signal", signal))
    }

    pub fn pause(&self, container: &(impl Identifier + ?Sized)) -> Result<()> {
        let path = resource_path("/containers", container, "/pause")?;
        self.post_empty(&path, &Query::new())
    }

    pub fn unpause(&self, container: &(impl Identifier + ?Sized)) -> Result<()> {
        let path = resource_path("/containers", container, "/unpause")?;
        self.post_empty(&path, &Query::new())
    }

    pub fn remove_container(
        &self,
        container: &(impl Identifier + ?Sized),
        options: &RemoveContainerOptions,
    ) -> Result<()> {
        let path = resource_path("/containers", container, "")?;
        let query = Query::new()
            .flag("v", options.v)
            .flag("link", options.link)
            .flag("force", options.force);
        self.delete(&path, &query)
    }

    pub fn rename(&self, container: &(impl Identifier + ?Sized), name: &str) -> Result<()> {
        self.require("1.17", "rename")?;
        let path = resource_path("/containers", container, "/rename")?;
        self.post_empty(&path, &Query::new().param("name", name))
    }

    pub fn resize(&self, container: &(impl Identifier + ?Sized), height: u32, width: u32) -> Result<()> {
        let path = resource_path("/containers", container, "/resize")?;
        self.post_empty(&path, &Query::new().param("h", height).param("w", width))
    }

    /// Block until the container stops; returns its exit code, or -1 if
    /// the daemon did not report one
    ///
    /// With no `timeout` this waits as long as the container runs.
    pub fn wait(&self, container: &(impl Identifier + ?Sized), timeout: Option<Duration>) -> Result<i64> {
        let path = resource_path("/containers", container, "/wait")?;
        let request = match timeout {
            Some(t) => Request::post(self.url(&path)).timeout(t),
            None => Request::post(self.url(&path)).no_timeout(),
        };
        let body: Value = decode::json(self.send(request)?)?;
        Ok(body.get("StatusCode").and_then(Value::as_i64).unwrap_or(-1))
    }

    pub fn top(&self, container: &(impl Identifier + ?Sized), ps_args: Option<&str>) -> Result<Value> {
        let path = resource_path("/containers", container, "/top")?;
        self.get_json(&path, &Query::new().opt("ps_args", ps_args))
    }

    /// Filesystem changes since creation
    pub fn diff(&self, container: &(impl Identifier + ?Sized)) -> Result<Value> {
        let path = resource_path("/containers", container, "/changes")?;
        self.get_json(&path, &Query::new())
    }

    /// Filesystem as a tarball
    pub fn export(&self, container: &(impl Identifier + ?Sized)) -> Result<RawStream> {
        let path = resource_path("/containers", container, "/export")?;
        let response = self.send(Request::get(self.url(&path)).stream(true))?;
        Ok(RawStream::new(response))
    }

    /// Tar stream of `path` plus its stat information
    pub fn get_archive(
        &self,
        container: &(impl Identifier + ?Sized),
        path: &str,
    ) -> Result<(RawStream, Value)> {
        self.require("1.20", "get_archive")?;
        let route = resource_path("/containers", container, "/archive")?;
        let url = self.url_with_query(&route, &Query::new().param("path", path));
        let response = self.send(Request::get(url).stream(true))?;
        let stat = match response.header_str(PATH_STAT_HEADER) {
            Some(header) => decode_json_header(header)?,
            None => Value::Null,
        };
        Ok((RawStream::new(response), stat))
    }

    /// Extract a tar archive into `path`
    pub fn put_archive(
        &self,
        container: &(impl Identifier + ?Sized),
        path: &str,
        data: Vec<u8>,
    ) -> Result<bool> {
        self.require("1.20", "put_archive")?;
        let route = resource_path("/containers", container, "/archive")?;
        let url = self.url_with_query(&route, &Query::new().param("path", path));
        let response = self.send(Request::put(url).body(Body::tar(data)))?;
        let ok = response.status == http::StatusCode::OK;
        decode::no_content(response)?;
        Ok(ok)
    }

    /// Host bindings for a private port; `"80"` is looked up as tcp then udp
    pub fn port(&self, container: &(impl Identifier + ?Sized), private_port: &str) -> Result<Option<Value>> {
        let info = self.inspect_container(container)?;
        let ports = &info["NetworkSettings"]["Ports"];
        let lookup = |key: &str| ports.get(key).filter(|v| !v.is_null()).cloned();
        if private_port.contains('/') {
            return Ok(lookup(private_port));
        }
        Ok(lookup(&format!("{}/tcp", private_port)).or_else(|| lookup(&format!("{}/udp", private_port))))
    }

    /// Create an image from a container's changes
    pub fn commit(&self, container: &(impl Identifier + ?Sized), options: &CommitOptions) -> Result<Value> {
        let id = resolve_identifier(container)?;
        let query = Query::new()
            .param("container", id)
            .opt("repo", options.repository.as_deref())
            .opt("tag", options.tag.as_deref())
            .opt("comment", options.message.as_deref())
            .opt("author", options.author.as_deref())
            .opt("changes", options.changes.as_deref());
        self.post_json("/commit", &query, options.conf.as_ref())
    }

    /// Collected output
    pub fn logs(&self, container: &(impl Identifier + ?Sized), options: &LogsOptions) -> Result<Vec<u8>> {
        self.logs_stream_inner(container, options, false)?.into_bytes()
    }

    /// Output as it arrives; with `follow` the stream only ends when closed
    pub fn logs_stream(&self, container: &(impl Identifier + ?Sized), options: &LogsOptions) -> Result<LogStream> {
        self.logs_stream_inner(container, options, true)
    }

    fn logs_stream_inner(
        &self,
        container: &(impl Identifier + ?Sized),
        options: &LogsOptions,
        stream: bool,
    ) -> Result<LogStream> {
        let id = resolve_identifier(container)?;

        if self.gate().below("1.11") {
            let attach = AttachOptions {
                stdout: options.stdout,
                stderr: options.stderr,
                logs: true,
                tty: options.tty,
            };
            return self.attach_inner(&id, &attach, stream);
        }

        let mut query = Query::new()
            .flag("stderr", options.stderr)
            .flag("stdout", options.stdout)
            .flag("timestamps", options.timestamps)
            .flag("follow", options.follow);
        if self.gate().at_least("1.13") {
            query = match options.tail {
                Tail::All => query.param("tail", "all"),
                Tail::Lines(n) => query.param("tail", n),
            };
        }
        if options.since.is_some() {
            self.require("1.19", "since")?;
            query = query.timestamp("since", options.since);
        }

        let tty = self.resolve_tty(&id, options.tty)?;
        let path = resource_path("/containers", id.as_str(), "/logs")?;
        let request = Request::get(self.url_with_query(&path, &query)).stream(stream || options.follow);
        let response = self.send(request)?;
        Ok(LogStream::new(response.body, tty))
    }

    /// Attach and collect output until the container's streams close
    pub fn attach(&self, container: &(impl Identifier + ?Sized), options: &AttachOptions) -> Result<Vec<u8>> {
        let id = resolve_identifier(container)?;
        self.attach_inner(&id, options, false)?.into_bytes()
    }

    pub fn attach_stream(&self, container: &(impl Identifier + ?Sized), options: &AttachOptions) -> Result<LogStream> {
        let id = resolve_identifier(container)?;
        self.attach_inner(&id, options, true)
    }

    fn attach_inner(&self, id: &str, options: &AttachOptions, stream: bool) -> Result<LogStream> {
        let tty = self.resolve_tty(id, options.tty)?;
        let path = resource_path("/containers", id, "/attach")?;
        let query = Query::new()
            .flag("logs", options.logs)
            .flag("stdout", options.stdout)
            .flag("stderr", options.stderr)
            .flag("stream", stream);
        let request = Request::post(self.url_with_query(&path, &query))
            .upgrade()
            .stream(stream);
        let response: Response = self.send(request)?;
        Ok(LogStream::new(response.body, tty))
    }

    fn resolve_tty(&self, id: &str, known: Option<bool>) -> Result<bool> {
        match known {
            Some(tty) => Ok(tty),
            None => {
                let info = self.inspect_container(id)?;
                Ok(info["Config"]["Tty"].as_bool().unwrap_or(false))
            }
        }
    }

    /// One stats sample
    pub fn stats(&self, container: &(impl Identifier + ?Sized)) -> Result<Value> {
        self.require("1.17", "stats")?;
        let path = resource_path("/containers", container, "/stats")?;
        self.get_json(&path, &Query::new().flag("stream", false))
    }

    /// Endless stats samples; close the stream to stop
    pub fn stats_stream(&self, container: &(impl Identifier + ?Sized)) -> Result<JsonStream<Value>> {
        self.require("1.17", "stats")?;
        let path = resource_path("/containers", container, "/stats")?;
        let response = self.send(Request::get(self.url(&path)).stream(true))?;
        Ok(JsonStream::new(response))
    }

    /// Change resource limits of a running container
    pub fn update_container(
        &self,
        container: &(impl Identifier + ?Sized),
        options: &UpdateContainerOptions,
    ) -> Result<Value> {
        self.require("1.22", "update_container")?;
        let body = options.to_body(self)?;
        let path = resource_path("/containers", container, "/update")?;
        self.post_json(&path, &Query::new(), Some(&body))
    }
}
