//! Container creation options and their placement into request bags
//!
//! Callers describe a container with one flat [`ContainerOptions`]. At
//! request time it is split into the container-config bag and the
//! `HostConfig` bag according to the negotiated API version; settings that
//! moved between bags over time are placed by table lookup.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::utils::{split_command, ByteSize};
use crate::version::VersionGate;
use crate::{Error, Result};

/// Process to run: a shell-style string or an explicit argv
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Command {
    Shell(String),
    Exec(Vec<String>),
}

impl Command {
    pub fn to_argv(&self) -> Result<Vec<String>> {
        match self {
            Command::Shell(s) => split_command(s),
            Command::Exec(args) => Ok(args.clone()),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Shell(s) => write!(f, "{}", s),
            Command::Exec(args) => write!(f, "{}", args.join(" ")),
        }
    }
}

impl From<&str> for Command {
    fn from(s: &str) -> Self {
        Command::Shell(s.to_string())
    }
}

impl From<String> for Command {
    fn from(s: String) -> Self {
        Command::Shell(s)
    }
}

impl From<Vec<String>> for Command {
    fn from(args: Vec<String>) -> Self {
        Command::Exec(args)
    }
}

impl From<Vec<&str>> for Command {
    fn from(args: Vec<&str>) -> Self {
        Command::Exec(args.into_iter().map(str::to_string).collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RestartPolicyName {
    #[serde(rename = "no")]
    No,
    Always,
    OnFailure,
    UnlessStopped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RestartPolicy {
    pub name: RestartPolicyName,
    #[serde(default)]
    pub maximum_retry_count: u32,
}

impl RestartPolicy {
    pub fn always() -> Self {
        Self {
            name: RestartPolicyName::Always,
            maximum_retry_count: 0,
        }
    }

    pub fn on_failure(max_retries: u32) -> Self {
        Self {
            name: RestartPolicyName::OnFailure,
            maximum_retry_count: max_retries,
        }
    }

    pub fn unless_stopped() -> Self {
        Self {
            name: RestartPolicyName::UnlessStopped,
            maximum_retry_count: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Ulimit {
    pub name: String,
    pub soft: i64,
    pub hard: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(rename = "Type")]
    pub driver: String,
    #[serde(rename = "Config", default)]
    pub config: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PortBinding {
    #[serde(default)]
    pub host_ip: String,
    #[serde(default)]
    pub host_port: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeviceMapping {
    pub path_on_host: String,
    pub path_in_container: String,
    pub cgroup_permissions: String,
}

impl DeviceMapping {
    /// Parse `host[:container[:permissions]]`
    pub fn parse(spec: &str) -> Result<Self> {
        let parts: Vec<&str> = spec.split(':').collect();
        let (host, container, perms) = match parts.as_slice() {
            [host] => (*host, *host, "rwm"),
            [host, container] => (*host, *container, "rwm"),
            [host, container, perms] => (*host, *container, *perms),
            _ => return Err(Error::InvalidArgument(format!("invalid device spec: {}", spec))),
        };
        if host.is_empty() {
            return Err(Error::InvalidArgument(format!("invalid device spec: {}", spec)));
        }
        Ok(Self {
            path_on_host: host.to_string(),
            path_in_container: container.to_string(),
            cgroup_permissions: perms.to_string(),
        })
    }
}

/// The `HostConfig` bag
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HostConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub binds: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port_bindings: Option<BTreeMap<String, Vec<PortBinding>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub privileged: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publish_all_ports: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dns: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dns_search: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volumes_from: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restart_policy: Option<RestartPolicy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cap_add: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cap_drop: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub devices: Option<Vec<DeviceMapping>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_hosts: Option<Vec<String>>,
    #[serde(rename = "ReadonlyRootfs", skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_opt: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipc_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pid_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ulimits: Option<Vec<Ulimit>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_config: Option<LogConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_swap: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_shares: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpuset_cpus: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oom_kill_disable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_add: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shm_size: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tmpfs: Option<BTreeMap<String, String>>,
}

/// Minimum API version per `HostConfig` key; keys not listed need only 1.15
const HOST_CONFIG_GATES: &[(&str, &str, &str)] = &[
    ("Dns", "dns", "1.10"),
    ("VolumesFrom", "volumes_from", "1.10"),
    ("SecurityOpt", "security_opt", "1.15"),
    ("IpcMode", "ipc_mode", "1.15"),
    ("ReadonlyRootfs", "read_only", "1.17"),
    ("PidMode", "pid_mode", "1.17"),
    ("Ulimits", "ulimits", "1.18"),
    ("LogConfig", "log_config", "1.18"),
    ("OomKillDisable", "oom_kill_disable", "1.19"),
    ("GroupAdd", "group_add", "1.20"),
    ("ShmSize", "shm_size", "1.22"),
    ("Tmpfs", "tmpfs", "1.22"),
];

/// Minimum API version per container-config key
const CONTAINER_CONFIG_GATES: &[(&str, &str, &str)] = &[
    ("Labels", "labels", "1.18"),
    ("VolumeDriver", "volume_driver", "1.19"),
    ("StopSignal", "stop_signal", "1.21"),
    ("NetworkingConfig", "networking_config", "1.22"),
];

/// Settings that moved from the container bag into `HostConfig`:
/// (feature, container key, host key, version where `HostConfig` owns it)
const RELOCATIONS: &[(&str, &str, &str, &str)] = &[
    ("dns", "Dns", "Dns", "1.10"),
    ("volumes_from", "VolumesFrom", "VolumesFrom", "1.10"),
    ("mem_limit", "Memory", "Memory", "1.19"),
    ("memswap_limit", "MemorySwap", "MemorySwap", "1.19"),
    ("cpu_shares", "CpuShares", "CpuShares", "1.19"),
    ("cpuset", "Cpuset", "CpusetCpus", "1.19"),
];

/// API version that accepts `HostConfig` on create
pub const HOST_CONFIG_MIN_VERSION: &str = "1.15";

fn check_gates(map: &Map<String, Value>, gates: &[(&str, &str, &str)], gate: &VersionGate) -> Result<()> {
    for (key, feature, min) in gates {
        if map.get(*key).is_some_and(|v| !v.is_null()) {
            gate.require(min, feature)?;
        }
    }
    Ok(())
}

impl HostConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        *self == HostConfig::default()
    }

    /// Reject keys the negotiated version does not know
    pub fn check(&self, gate: &VersionGate) -> Result<()> {
        match serde_json::to_value(self)? {
            Value::Object(map) => check_gates(&map, HOST_CONFIG_GATES, gate),
            _ => Ok(()),
        }
    }
}

/// One endpoint entry of a `NetworkingConfig`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    pub aliases: Vec<String>,
    pub links: Vec<String>,
    pub ipv4_address: Option<String>,
    pub ipv6_address: Option<String>,
    pub link_local_ips: Vec<String>,
}

impl EndpointConfig {
    pub fn with_aliases(mut self, aliases: Vec<String>) -> Self {
        self.aliases = aliases;
        self
    }

    pub fn with_links(mut self, links: Vec<String>) -> Self {
        self.links = links;
        self
    }

    pub fn with_ipv4_address(mut self, addr: impl Into<String>) -> Self {
        self.ipv4_address = Some(addr.into());
        self
    }

    pub fn with_ipv6_address(mut self, addr: impl Into<String>) -> Self {
        self.ipv6_address = Some(addr.into());
        self
    }

    pub fn with_link_local_ips(mut self, ips: Vec<String>) -> Self {
        self.link_local_ips = ips;
        self
    }

    /// Wire form, gated: endpoint config 1.22, link-local addresses 1.24
    pub fn to_json(&self, gate: &VersionGate) -> Result<Value> {
        gate.require("1.22", "endpoint config")?;

        let mut endpoint = Map::new();
        if !self.aliases.is_empty() {
            endpoint.insert("Aliases".into(), serde_json::to_value(&self.aliases)?);
        }
        if !self.links.is_empty() {
            endpoint.insert("Links".into(), serde_json::to_value(&self.links)?);
        }

        let mut ipam = Map::new();
        if let Some(ref addr) = self.ipv4_address {
            ipam.insert("IPv4Address".into(), Value::String(addr.clone()));
        }
        if let Some(ref addr) = self.ipv6_address {
            ipam.insert("IPv6Address".into(), Value::String(addr.clone()));
        }
        if !self.link_local_ips.is_empty() {
            gate.require("1.24", "link_local_ips")?;
            ipam.insert("LinkLocalIPs".into(), serde_json::to_value(&self.link_local_ips)?);
        }
        if !ipam.is_empty() {
            endpoint.insert("IPAMConfig".into(), Value::Object(ipam));
        }
        Ok(Value::Object(endpoint))
    }
}

/// Everything needed to create a container, as one flat set of options
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContainerOptions {
    pub image: String,
    pub command: Option<Command>,
    pub name: Option<String>,
    pub hostname: Option<String>,
    pub domainname: Option<String>,
    pub user: Option<String>,
    pub detach: bool,
    pub stdin_open: bool,
    pub tty: bool,
    pub ports: Vec<String>,
    pub environment: Vec<String>,
    pub volumes: Vec<String>,
    pub network_disabled: bool,
    pub entrypoint: Option<Command>,
    pub working_dir: Option<String>,
    pub mac_address: Option<String>,
    pub labels: BTreeMap<String, String>,
    pub stop_signal: Option<String>,
    pub volume_driver: Option<String>,
    pub networks: BTreeMap<String, EndpointConfig>,

    // placed by version
    pub dns: Option<Vec<String>>,
    pub volumes_from: Option<Vec<String>>,
    pub mem_limit: Option<ByteSize>,
    pub memswap_limit: Option<ByteSize>,
    pub cpu_shares: Option<i64>,
    pub cpuset: Option<String>,

    pub host_config: HostConfig,
}

impl ContainerOptions {
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            image: image.into(),
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

    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = Some(hostname.into());
        self
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn with_detach(mut self, detach: bool) -> Self {
        self.detach = detach;
        self
    }

    pub fn with_tty(mut self, tty: bool) -> Self {
        self.tty = tty;
        self
    }

    pub fn with_stdin_open(mut self, open: bool) -> Self {
        self.stdin_open = open;
        self
    }

    /// Expose a port; `"80"` means `"80/tcp"`
    pub fn with_port(mut self, port: impl Into<String>) -> Self {
        self.ports.push(port.into());
        self
    }

    /// Publish a container port on the host
    pub fn with_port_binding(mut self, port: impl Into<String>, host_port: u16) -> Self {
        let port = normalize_port(&port.into());
        self.ports.push(port.clone());
        self.host_config
            .port_bindings
            .get_or_insert_with(BTreeMap::new)
            .entry(port)
            .or_default()
            .push(PortBinding {
                host_ip: String::new(),
                host_port: host_port.to_string(),
            });
        self
    }

    pub fn with_env(mut self, key: &str, value: &str) -> Self {
        self.environment.push(format!("{}={}", key, value));
        self
    }

    pub fn with_volume(mut self, path: impl Into<String>) -> Self {
        self.volumes.push(path.into());
        self
    }

    /// Bind `host:container[:mode]`; the container path is declared as a volume
    pub fn with_bind(mut self, bind: impl Into<String>) -> Self {
        let bind = bind.into();
        if let Some(target) = bind.split(':').nth(1) {
            self.volumes.push(target.to_string());
        }
        self.host_config.binds.get_or_insert_with(Vec::new).push(bind);
        self
    }

    pub fn with_entrypoint(mut self, entrypoint: impl Into<Command>) -> Self {
        self.entrypoint = Some(entrypoint.into());
        self
    }

    pub fn with_working_dir(mut self, dir: impl Into<String>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    pub fn with_stop_signal(mut self, signal: impl Into<String>) -> Self {
        self.stop_signal = Some(signal.into());
        self
    }

    pub fn with_volume_driver(mut self, driver: impl Into<String>) -> Self {
        self.volume_driver = Some(driver.into());
        self
    }

    pub fn with_network(mut self, network: impl Into<String>, endpoint: EndpointConfig) -> Self {
        self.networks.insert(network.into(), endpoint);
        self
    }

    pub fn with_network_disabled(mut self, disabled: bool) -> Self {
        self.network_disabled = disabled;
        self
    }

    pub fn with_dns(mut self, servers: Vec<String>) -> Self {
        self.dns = Some(servers);
        self
    }

    pub fn with_volumes_from(mut self, containers: Vec<String>) -> Self {
        self.volumes_from = Some(containers);
        self
    }

    pub fn with_mem_limit(mut self, limit: impl Into<ByteSize>) -> Self {
        self.mem_limit = Some(limit.into());
        self
    }

    pub fn with_memswap_limit(mut self, limit: impl Into<ByteSize>) -> Self {
        self.memswap_limit = Some(limit.into());
        self
    }

    pub fn with_cpu_shares(mut self, shares: i64) -> Self {
        self.cpu_shares = Some(shares);
        self
    }

    pub fn with_cpuset(mut self, cpus: impl Into<String>) -> Self {
        self.cpuset = Some(cpus.into());
        self
    }

    pub fn with_network_mode(mut self, mode: impl Into<String>) -> Self {
        self.host_config.network_mode = Some(mode.into());
        self
    }

    pub fn with_restart_policy(mut self, policy: RestartPolicy) -> Self {
        self.host_config.restart_policy = Some(policy);
        self
    }

    pub fn with_privileged(mut self, privileged: bool) -> Self {
        self.host_config.privileged = Some(privileged);
        self
    }

    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.host_config.read_only = Some(read_only);
        self
    }

    pub fn with_security_opt(mut self, opts: Vec<String>) -> Self {
        self.host_config.security_opt = Some(opts);
        self
    }

    pub fn with_pid_mode(mut self, mode: impl Into<String>) -> Self {
        self.host_config.pid_mode = Some(mode.into());
        self
    }

    pub fn with_ipc_mode(mut self, mode: impl Into<String>) -> Self {
        self.host_config.ipc_mode = Some(mode.into());
        self
    }

    pub fn with_ulimit(mut self, ulimit: Ulimit) -> Self {
        self.host_config.ulimits.get_or_insert_with(Vec::new).push(ulimit);
        self
    }

    pub fn with_log_config(mut self, config: LogConfig) -> Self {
        self.host_config.log_config = Some(config);
        self
    }

    pub fn with_device(mut self, spec: &str) -> Result<Self> {
        let device = DeviceMapping::parse(spec)?;
        self.host_config.devices.get_or_insert_with(Vec::new).push(device);
        Ok(self)
    }

    pub fn with_extra_host(mut self, host: &str, ip: &str) -> Self {
        self.host_config
            .extra_hosts
            .get_or_insert_with(Vec::new)
            .push(format!("{}:{}", host, ip));
        self
    }

    pub fn with_cap_add(mut self, cap: impl Into<String>) -> Self {
        self.host_config.cap_add.get_or_insert_with(Vec::new).push(cap.into());
        self
    }

    pub fn with_cap_drop(mut self, cap: impl Into<String>) -> Self {
        self.host_config.cap_drop.get_or_insert_with(Vec::new).push(cap.into());
        self
    }

    pub fn with_host_config(mut self, host_config: HostConfig) -> Self {
        self.host_config = host_config;
        self
    }

    /// Build the create request body for the negotiated version
    ///
    /// Fails before any request is made when a setting is newer than the
    /// negotiated version.
    pub fn to_create_body(&self, gate: &VersionGate) -> Result<Value> {
        if self.image.is_empty() {
            return Err(Error::InvalidArgument("image is required".into()));
        }

        let mut config = Map::new();
        config.insert("Image".into(), Value::String(self.image.clone()));
        if let Some(ref command) = self.command {
            config.insert("Cmd".into(), serde_json::to_value(command.to_argv()?)?);
        }
        if let Some(ref entrypoint) = self.entrypoint {
            config.insert("Entrypoint".into(), serde_json::to_value(entrypoint.to_argv()?)?);
        }
        insert_opt(&mut config, "Hostname", &self.hostname);
        insert_opt(&mut config, "Domainname", &self.domainname);
        insert_opt(&mut config, "User", &self.user);
        insert_opt(&mut config, "WorkingDir", &self.working_dir);
        insert_opt(&mut config, "MacAddress", &self.mac_address);
        insert_opt(&mut config, "StopSignal", &self.stop_signal);
        insert_opt(&mut config, "VolumeDriver", &self.volume_driver);

        config.insert("Tty".into(), Value::Bool(self.tty));
        config.insert("OpenStdin".into(), Value::Bool(self.stdin_open));
        config.insert("StdinOnce".into(), Value::Bool(self.stdin_open));
        config.insert("AttachStdin".into(), Value::Bool(self.stdin_open));
        config.insert("AttachStdout".into(), Value::Bool(!self.detach));
        config.insert("AttachStderr".into(), Value::Bool(!self.detach));
        config.insert("NetworkDisabled".into(), Value::Bool(self.network_disabled));

        if !self.environment.is_empty() {
            config.insert("Env".into(), serde_json::to_value(&self.environment)?);
        }
        if !self.volumes.is_empty() {
            let volumes: Map<String, Value> = self
                .volumes
                .iter()
                .map(|v| (v.clone(), Value::Object(Map::new())))
                .collect();
            config.insert("Volumes".into(), Value::Object(volumes));
        }
        if !self.ports.is_empty() {
            let ports: Map<String, Value> = self
                .ports
                .iter()
                .map(|p| (normalize_port(p), Value::Object(Map::new())))
                .collect();
            config.insert("ExposedPorts".into(), Value::Object(ports));
        }
        if !self.labels.is_empty() {
            config.insert("Labels".into(), serde_json::to_value(&self.labels)?);
        }

        let mut host = match serde_json::to_value(&self.host_config)? {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        for (feature, container_key, host_key, host_from) in RELOCATIONS {
            let value = match self.relocatable(feature)? {
                Some(v) => v,
                None => continue,
            };
            if gate.at_least(host_from) {
                host.insert(host_key.to_string(), value);
            } else {
                config.insert(container_key.to_string(), value);
            }
        }

        if !host.is_empty() {
            gate.require(HOST_CONFIG_MIN_VERSION, "host_config")?;
            check_gates(&host, HOST_CONFIG_GATES, gate)?;
            config.insert("HostConfig".into(), Value::Object(host));
        }

        if !self.networks.is_empty() {
            let mut endpoints = Map::new();
            for (network, endpoint) in &self.networks {
                endpoints.insert(network.clone(), endpoint.to_json(gate)?);
            }
            let mut networking = Map::new();
            networking.insert("EndpointsConfig".into(), Value::Object(endpoints));
            config.insert("NetworkingConfig".into(), Value::Object(networking));
        }

        check_gates(&config, CONTAINER_CONFIG_GATES, gate)?;
        Ok(Value::Object(config))
    }

    fn relocatable(&self, feature: &str) -> Result<Option<Value>> {
        let value = match feature {
            "dns" => self.dns.as_ref().map(|d| serde_json::to_value(d)).transpose()?,
            "volumes_from" => self
                .volumes_from
                .as_ref()
                .map(|v| serde_json::to_value(v))
                .transpose()?,
            "mem_limit" => self.mem_limit.as_ref().map(|m| m.to_bytes()).transpose()?.map(Value::from),
            "memswap_limit" => self
                .memswap_limit
                .as_ref()
                .map(|m| m.to_bytes())
                .transpose()?
                .map(Value::from),
            "cpu_shares" => self.cpu_shares.map(Value::from),
            "cpuset" => self.cpuset.clone().map(Value::String),
            _ => None,
        };
        Ok(value)
    }
}

fn insert_opt(map: &mut Map<String, Value>, key: &str, value: &Option<String>) {
    if let Some(v) = value {
        map.insert(key.to_string(), Value::String(v.clone()));
    }
}

fn normalize_port(port: &str) -> String {
    if port.contains('/') {
        port.to_string()
    } else {
        format!("{}/tcp", port)
    }
}
