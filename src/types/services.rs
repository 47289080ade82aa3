//! Swarm service specification types

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::containers::Command;
use crate::utils::ByteSize;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MountType {
    Bind,
    Volume,
    Tmpfs,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Mount {
    pub target: String,
    pub source: String,
    #[serde(rename = "Type")]
    pub kind: MountType,
    #[serde(default)]
    pub read_only: bool,
}

impl Mount {
    pub fn volume(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            source: source.into(),
            kind: MountType::Volume,
            read_only: false,
        }
    }

    pub fn bind(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            kind: MountType::Bind,
            ..Self::volume(source, target)
        }
    }

    /// Parse `source:target[:ro|rw]`; absolute sources become bind mounts
    pub fn parse(spec: &str) -> crate::Result<Self> {
        let parts: Vec<&str> = spec.split(':').collect();
        let (source, target, mode) = match parts.as_slice() {
            [source, target] => (*source, *target, "rw"),
            [source, target, mode] => (*source, *target, *mode),
            _ => {
                return Err(crate::Error::InvalidArgument(format!(
                    "invalid mount spec: {}",
                    spec
                )))
            }
        };
        let read_only = match mode {
            "ro" => true,
            "rw" => false,
            other => {
                return Err(crate::Error::InvalidArgument(format!(
                    "invalid mount mode: {}",
                    other
                )))
            }
        };
        let mut mount = if source.starts_with('/') {
            Mount::bind(source, target)
        } else {
            Mount::volume(source, target)
        };
        mount.read_only = read_only;
        Ok(mount)
    }
}

/// Container half of a task template
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContainerSpec {
    pub image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env: Option<Vec<String>>,
    #[serde(rename = "Dir", skip_serializing_if = "Option::is_none")]
    pub workdir: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mounts: Option<Vec<Mount>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_grace_period: Option<i64>,
}

impl ContainerSpec {
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            ..Default::default()
        }
    }

    pub fn with_command(mut self, command: impl Into<Command>) -> Result<Self> {
        self.command = Some(command.into().to_argv()?);
        Ok(self)
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = Some(args);
        self
    }

    pub fn with_env(mut self, key: &str, value: &str) -> Self {
        self.env
            .get_or_insert_with(Vec::new)
            .push(format!("{}={}", key, value));
        self
    }

    pub fn with_workdir(mut self, dir: impl Into<String>) -> Self {
        self.workdir = Some(dir.into());
        self
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn with_mount(mut self, mount: Mount) -> Self {
        self.mounts.get_or_insert_with(Vec::new).push(mount);
        self
    }

    pub fn with_stop_grace_period(mut self, nanos: i64) -> Self {
        self.stop_grace_period = Some(nanos);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResourceSpec {
    #[serde(rename = "NanoCPUs", skip_serializing_if = "Option::is_none")]
    pub nano_cpus: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_bytes: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Resources {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limits: Option<ResourceSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reservations: Option<ResourceSpec>,
}

impl Resources {
    pub fn with_limits(mut self, nano_cpus: Option<i64>, memory: Option<ByteSize>) -> Result<Self> {
        self.limits = Some(ResourceSpec {
            nano_cpus,
            memory_bytes: memory.map(|m| m.to_bytes()).transpose()?,
        });
        Ok(self)
    }

    pub fn with_reservations(mut self, nano_cpus: Option<i64>, memory: Option<ByteSize>) -> Result<Self> {
        self.reservations = Some(ResourceSpec {
            nano_cpus,
            memory_bytes: memory.map(|m| m.to_bytes()).transpose()?,
        });
        Ok(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RestartCondition {
    None,
    OnFailure,
    Any,
}

/// Task restart policy (durations in nanoseconds)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TaskRestartPolicy {
    pub condition: RestartCondition,
    #[serde(default)]
    pub delay: i64,
    #[serde(default)]
    pub max_attempts: i64,
    #[serde(default)]
    pub window: i64,
}

impl Default for TaskRestartPolicy {
    fn default() -> Self {
        Self {
            condition: RestartCondition::None,
            delay: 0,
            max_attempts: 0,
            window: 0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogDriver {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Options", default)]
    pub options: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Placement {
    #[serde(default)]
    pub constraints: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TaskTemplate {
    pub container_spec: ContainerSpec,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resources: Option<Resources>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restart_policy: Option<TaskRestartPolicy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placement: Option<Placement>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_driver: Option<LogDriver>,
}

impl TaskTemplate {
    pub fn new(container_spec: ContainerSpec) -> Self {
        Self {
            container_spec,
            ..Default::default()
        }
    }

    pub fn with_resources(mut self, resources: Resources) -> Self {
        self.resources = Some(resources);
        self
    }

    pub fn with_restart_policy(mut self, policy: TaskRestartPolicy) -> Self {
        self.restart_policy = Some(policy);
        self
    }

    pub fn with_constraints(mut self, constraints: Vec<String>) -> Self {
        self.placement = Some(Placement { constraints });
        self
    }

    pub fn with_log_driver(mut self, driver: LogDriver) -> Self {
        self.log_driver = Some(driver);
        self
    }
}

/// `replicated` with a replica count, or `global`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceMode {
    Replicated(u64),
    Global,
}

impl Serialize for ServiceMode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let value = match self {
            ServiceMode::Replicated(n) => serde_json::json!({"Replicated": {"Replicas": n}}),
            ServiceMode::Global => serde_json::json!({"Global": {}}),
        };
        value.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ServiceMode {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        if value.get("Global").is_some() {
            return Ok(ServiceMode::Global);
        }
        let replicas = value
            .get("Replicated")
            .and_then(|r| r.get("Replicas"))
            .and_then(|r| r.as_u64())
            .unwrap_or(1);
        Ok(ServiceMode::Replicated(replicas))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureAction {
    Pause,
    Continue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateConfig {
    pub parallelism: u64,
    /// Nanoseconds between updates
    #[serde(default)]
    pub delay: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_action: Option<FailureAction>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PortConfig {
    pub protocol: String,
    pub target_port: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_port: Option<u16>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EndpointSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<PortConfig>,
}

impl EndpointSpec {
    /// Publish `target` as `published` over TCP
    pub fn with_port(mut self, published: u16, target: u16) -> Self {
        self.ports.push(PortConfig {
            protocol: "tcp".into(),
            target_port: target,
            published_port: Some(published),
        });
        self
    }
}
