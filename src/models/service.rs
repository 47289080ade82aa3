//! Service handle and collection

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;

use super::resource::Resource;
use crate::api::{ApiClient, Identifier, ServiceOptions};
use crate::types::{
    Command, ContainerSpec, EndpointSpec, Filters, LogDriver, Mount, Resources, ServiceMode,
    TaskRestartPolicy, TaskTemplate, UpdateConfig,
};
use crate::{Error, Result};

/// Flat service settings, split into container spec, task template and
/// service-level parts on create or update
///
/// `labels` apply to the service; `container_labels` to its containers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateServiceOptions {
    /// Required on create; an update keeps the current image when unset
    pub image: Option<String>,
    pub command: Option<Command>,
    pub args: Option<Vec<String>>,
    pub env: Vec<String>,
    pub workdir: Option<String>,
    pub user: Option<String>,
    pub container_labels: BTreeMap<String, String>,
    pub mounts: Vec<Mount>,
    pub stop_grace_period: Option<i64>,
    pub resources: Option<Resources>,
    pub restart_policy: Option<TaskRestartPolicy>,
    pub constraints: Vec<String>,
    pub log_driver: Option<LogDriver>,
    pub name: Option<String>,
    pub labels: BTreeMap<String, String>,
    pub mode: Option<ServiceMode>,
    pub update_config: Option<UpdateConfig>,
    pub networks: Vec<String>,
    pub endpoint_spec: Option<EndpointSpec>,
}

impl CreateServiceOptions {
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            image: Some(image.into()),
            ..Default::default()
        }
    }

    pub fn with_command(mut self, command: impl Into<Command>) -> Self {
        self.command = Some(command.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    pub fn with_container_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.container_labels.insert(key.into(), value.into());
        self
    }

    pub fn with_env(mut self, key: &str, value: &str) -> Self {
        self.env.push(format!("{}={}", key, value));
        self
    }

    pub fn with_mount(mut self, mount: Mount) -> Self {
        self.mounts.push(mount);
        self
    }

    pub fn with_mode(mut self, mode: ServiceMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn with_network(mut self, network: impl Into<String>) -> Self {
        self.networks.push(network.into());
        self
    }

    pub fn with_constraint(mut self, constraint: impl Into<String>) -> Self {
        self.constraints.push(constraint.into());
        self
    }

    pub fn with_endpoint_spec(mut self, spec: EndpointSpec) -> Self {
        self.endpoint_spec = Some(spec);
        self
    }

    /// Split into the nested definition the API expects
    pub fn to_service_options(&self) -> Result<ServiceOptions> {
        let image = self
            .image
            .clone()
            .ok_or_else(|| Error::InvalidArgument("service image is required".into()))?;

        let mut container_spec = ContainerSpec::new(image);
        if let Some(ref command) = self.command {
            container_spec = container_spec.with_command(command.clone())?;
        }
        container_spec.args = self.args.clone();
        container_spec.env = (!self.env.is_empty()).then(|| self.env.clone());
        container_spec.workdir = self.workdir.clone();
        container_spec.user = self.user.clone();
        container_spec.labels = (!self.container_labels.is_empty()).then(|| self.container_labels.clone());
        container_spec.mounts = (!self.mounts.is_empty()).then(|| self.mounts.clone());
        container_spec.stop_grace_period = self.stop_grace_period;

        let mut task_template = TaskTemplate::new(container_spec);
        task_template.resources = self.resources.clone();
        task_template.restart_policy = self.restart_policy.clone();
        task_template.log_driver = self.log_driver.clone();
        if !self.constraints.is_empty() {
            task_template = task_template.with_constraints(self.constraints.clone());
        }

        Ok(ServiceOptions {
            task_template,
            name: self.name.clone(),
            labels: self.labels.clone(),
            mode: self.mode,
            update_config: self.update_config.clone(),
            networks: self.networks.clone(),
            endpoint_spec: self.endpoint_spec.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Service {
    resource: Resource,
}

impl Service {
    pub(crate) fn new(client: Arc<ApiClient>, attrs: Value) -> Self {
        Self {
            resource: Resource::new(client, attrs, "ID"),
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

    pub fn name(&self) -> Option<&str> {
        self.resource.attr("/Spec/Name").and_then(Value::as_str)
    }

    /// `Version.Index`, required by updates
    pub fn version(&self) -> Option<u64> {
        self.resource.attr("/Version/Index").and_then(Value::as_u64)
    }

    /// Tasks of this service, narrowed further by `filters`
    pub fn tasks(&self, filters: Option<&Filters>) -> Result<Vec<Value>> {
        let filters = filters.cloned().unwrap_or_default().with("service", self.id());
        self.resource.client().tasks(Some(&filters))
    }

    /// Replace the definition; an unset image keeps the current one
    pub fn update(&self, options: &CreateServiceOptions) -> Result<()> {
        let mut options = options.clone();
        if options.image.is_none() {
            options.image = self
                .resource
                .attr("/Spec/TaskTemplate/ContainerSpec/Image")
                .and_then(Value::as_str)
                .map(str::to_string);
        }
        let version = self
            .version()
            .ok_or_else(|| Error::InvalidArgument("service has no version; reload it first".into()))?;
        self.resource
            .client()
            .update_service(self, version, &options.to_service_options()?)
    }

    pub fn remove(&self) -> Result<()> {
        self.resource.client().remove_service(self)
    }

    pub fn reload(&mut self) -> Result<()> {
        let attrs = self.resource.client().inspect_service(self)?;
        self.resource.replace(attrs);
        Ok(())
    }
}

impl Identifier for Service {
    fn identifier(&self) -> Option<String> {
        Some(self.id().to_string())
    }
}

#[derive(Clone)]
pub struct ServiceCollection {
    client: Arc<ApiClient>,
}

impl ServiceCollection {
    pub(crate) fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub fn create(&self, options: &CreateServiceOptions) -> Result<Service> {
        let service_id = self.client.create_service(&options.to_service_options()?)?;
        self.get(service_id.as_str())
    }

    pub fn get(&self, service: &(impl Identifier + ?Sized)) -> Result<Service> {
        let attrs = self.client.inspect_service(service)?;
        Ok(Service::new(self.client.clone(), attrs))
    }

    pub fn list(&self, filters: Option<&Filters>) -> Result<Vec<Service>> {
        Ok(self
            .client
            .services(filters)?
            .into_iter()
            .map(|attrs| Service::new(self.client.clone(), attrs))
            .collect())
    }
}
