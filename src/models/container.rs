//! Container handle and collection

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use super::image::Image;
use super::resource::Resource;
use crate::api::{
    AttachOptions, CommitOptions, ExecCreateOptions, ExecStartOptions, Identifier,
    ListContainersOptions, LogStream, LogsOptions, PullOptions, RawStream, RemoveContainerOptions,
    UpdateContainerOptions,
};
use crate::api::{ApiClient, JsonStream};
use crate::error::ContainerError;
use crate::types::{Command, ContainerOptions};
use crate::{Error, Result};

/// A container known to the daemon
#[derive(Debug, Clone, PartialEq)]
pub struct Container {
    resource: Resource,
}

impl Container {
    pub(crate) fn new(client: Arc<ApiClient>, attrs: Value) -> Self {
        Self {
            resource: Resource::new(client, attrs, "Id"),
        }
    }

    pub fn id(&self) -> &str {
        self.resource.id()
    }

    pub fn short_id(&self) -> &str {
        self.resource.short_id()
    }

    pub fn attrs(&self) -> &Value {
        self.resource.attrs()
    }

    /// Name without the leading slash
    pub fn name(&self) -> Option<&str> {
        self.resource
            .attr("/Name")
            .and_then(Value::as_str)
            .map(|n| n.trim_start_matches('/'))
    }

    /// `running`, `exited`, ...; list results carry a plain `State` string
    pub fn status(&self) -> Option<&str> {
        match self.resource.attr("/State") {
            Some(Value::Object(state)) => state.get("Status").and_then(Value::as_str),
            Some(Value::String(state)) => Some(state),
            _ => None,
        }
    }

    pub fn labels(&self) -> Option<&Value> {
        self.resource.attr("/Config/Labels")
    }

    /// Image the container was created from
    pub fn image(&self) -> Result<Image> {
        let image_id = self
            .resource
            .attr("/Image")
            .and_then(Value::as_str)
            .ok_or(Error::NullResource)?;
        let api = self.resource.client();
        Ok(Image::new(api.clone(), api.inspect_image(image_id)?))
    }

    pub fn reload(&mut self) -> Result<()> {
        let attrs = self.resource.client().inspect_container(self)?;
        self.resource.replace(attrs);
        Ok(())
    }

    pub fn attach(&self, options: &AttachOptions) -> Result<Vec<u8>> {
        self.resource.client().attach(self, options)
    }

    pub fn attach_stream(&self, options: &AttachOptions) -> Result<LogStream> {
        self.resource.client().attach_stream(self, options)
    }

    pub fn commit(&self, options: &CommitOptions) -> Result<Image> {
        let api = self.resource.client();
        let created = api.commit(self, options)?;
        Ok(Image::new(api.clone(), api.inspect_image(&created)?))
    }

    pub fn diff(&self) -> Result<Value> {
        self.resource.client().diff(self)
    }

    /// Run a command inside the container and collect its output
    pub fn exec_run(&self, options: &ExecCreateOptions, detach: bool) -> Result<Vec<u8>> {
        let api = self.resource.client();
        let exec = api.exec_create(self, options)?;
        let start = ExecStartOptions {
            detach,
            tty: options.tty,
        };
        api.exec_start(&exec, &start)
    }

    pub fn export(&self) -> Result<RawStream> {
        self.resource.client().export(self)
    }

    pub fn get_archive(&self, path: &str) -> Result<(RawStream, Value)> {
        self.resource.client().get_archive(self, path)
    }

    pub fn put_archive(&self, path: &str, data: Vec<u8>) -> Result<bool> {
        self.resource.client().put_archive(self, path, data)
    }

    pub fn kill(&self, signal: Option<&str>) -> Result<()> {
        self.resource.client().kill(self, signal)
    }

    /// Collected logs; the TTY setting comes from the cached attrs when known
    pub fn logs(&self, options: &LogsOptions) -> Result<Vec<u8>> {
        self.resource.client().logs(self, &self.with_known_tty(options))
    }

    pub fn logs_stream(&self, options: &LogsOptions) -> Result<LogStream> {
        self.resource.client().logs_stream(self, &self.with_known_tty(options))
    }

    fn with_known_tty(&self, options: &LogsOptions) -> LogsOptions {
        let mut options = options.clone();
        if options.tty.is_none() {
            options.tty = self.resource.attr("/Config/Tty").and_then(Value::as_bool);
        }
        options
    }

    pub fn pause(&self) -> Result<()> {
        self.resource.client().pause(self)
    }

    pub fn unpause(&self) -> Result<()> {
        self.resource.client().unpause(self)
    }

    pub fn remove(&self, options: &RemoveContainerOptions) -> Result<()> {
        self.resource.client().remove_container(self, options)
    }

    pub fn rename(&self, name: &str) -> Result<()> {
        self.resource.client().rename(self, name)
    }

    pub fn resize(&self, height: u32, width: u32) -> Result<()> {
        self.resource.client().resize(self, height, width)
    }

    pub fn restart(&self, timeout: Option<u64>) -> Result<()> {
        self.resource.client().restart(self, timeout)
    }

    pub fn start(&self) -> Result<()> {
        self.resource.client().start(self)
    }

    pub fn stats(&self) -> Result<Value> {
        self.resource.client().stats(self)
    }

    pub fn stats_stream(&self) -> Result<JsonStream<Value>> {
        self.resource.client().stats_stream(self)
    }

    pub fn stop(&self, timeout: Option<u64>) -> Result<()> {
        self.resource.client().stop(self, timeout)
    }

    pub fn top(&self, ps_args: Option<&str>) -> Result<Value> {
        self.resource.client().top(self, ps_args)
    }

    pub fn update(&self, options: &UpdateContainerOptions) -> Result<Value> {
        self.resource.client().update_container(self, options)
    }

    pub fn wait(&self, timeout: Option<Duration>) -> Result<i64> {
        self.resource.client().wait(self, timeout)
    }
}

impl Identifier for Container {
    fn identifier(&self) -> Option<String> {
        Some(self.id().to_string())
    }
}

/// Which output `run` returns and whether it cleans up afterwards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    pub stdout: bool,
    pub stderr: bool,
    /// Remove the container once its output has been collected
    pub remove: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            stdout: true,
            stderr: false,
            remove: false,
        }
    }
}

/// Outcome of [`ContainerCollection::run`]
#[derive(Debug)]
pub enum RunOutput {
    /// Started in the background
    Detached(Container),
    /// Ran to a zero exit status; holds the collected logs
    Finished(Vec<u8>),
}

impl RunOutput {
    pub fn into_logs(self) -> Option<Vec<u8>> {
        match self {
            RunOutput::Finished(logs) => Some(logs),
            RunOutput::Detached(_) => None,
        }
    }

    pub fn into_container(self) -> Option<Container> {
        match self {
            RunOutput::Detached(container) => Some(container),
            RunOutput::Finished(_) => None,
        }
    }
}

/// Create, look up and list containers
#[derive(Clone)]
pub struct ContainerCollection {
    client: Arc<ApiClient>,
}

impl ContainerCollection {
    pub(crate) fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Create and start a container, then wait for it unless detached
    ///
    /// A missing image is pulled once and the create retried. A non-zero
    /// exit becomes [`Error::Container`] carrying the container's stderr;
    /// stdout is not collected in that case even if requested.
    pub fn run(&self, options: &ContainerOptions, run: &RunOptions) -> Result<RunOutput> {
        if options.detach && run.remove {
            return Err(Error::InvalidArgument(
                "the options 'detach' and 'remove' cannot be used together".into(),
            ));
        }

        let container = match self.create(options) {
            Err(e) if e.is_image_not_found() => {
                tracing::warn!(image = %options.image, "image not found locally, pulling");
                self.client
                    .pull(&options.image, &PullOptions::default())?
                    .finish()?;
                self.create(options)?
            }
            result => result?,
        };

        container.start()?;
        tracing::info!(id = %container.short_id(), image = %options.image, "container started");

        if options.detach {
            return Ok(RunOutput::Detached(container));
        }

        let exit_status = container.wait(None)?;
        let (stdout, stderr) = if exit_status == 0 {
            (run.stdout, run.stderr)
        } else {
            (false, true)
        };
        let logs = LogsOptions {
            stdout,
            stderr,
            tty: Some(options.tty),
            ..Default::default()
        };
        let out = container.logs(&logs)?;

        if run.remove {
            container.remove(&RemoveContainerOptions::default())?;
        }

        if exit_status != 0 {
            return Err(ContainerError {
                container_id: container.id().to_string(),
                exit_status,
                command: options.command.as_ref().map(Command::to_string).unwrap_or_default(),
                image: options.image.clone(),
                stderr: String::from_utf8_lossy(&out).into_owned(),
            }
            .into());
        }
        Ok(RunOutput::Finished(out))
    }

    /// Create without starting
    pub fn create(&self, options: &ContainerOptions) -> Result<Container> {
        let created = self.client.create_container(options)?;
        self.get(&created)
    }

    pub fn get(&self, container: &(impl Identifier + ?Sized)) -> Result<Container> {
        let attrs = self.client.inspect_container(container)?;
        Ok(Container::new(self.client.clone(), attrs))
    }

    /// Each listed container is inspected so the handles carry full attrs
    pub fn list(&self, options: &ListContainersOptions) -> Result<Vec<Container>> {
        self.client
            .containers(options)?
            .iter()
            .map(|summary| self.get(summary))
            .collect()
    }
}
