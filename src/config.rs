//! Client configuration with builder pattern

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::version::ApiVersion;
use crate::{Error, Result};

/// Default daemon address
#[cfg(unix)]
pub const DEFAULT_DOCKER_HOST: &str = "unix:///var/run/docker.sock";

/// Default daemon address
#[cfg(windows)]
pub const DEFAULT_DOCKER_HOST: &str = "npipe:////./pipe/docker_engine";

/// Address used when a TCP host omits the hostname
pub const DEFAULT_TCP_HOST: &str = "127.0.0.1";

/// Default per-call timeout
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Where the daemon listens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Host {
    Unix(PathBuf),
    Tcp { host: String, port: u16, tls: bool },
    NamedPipe(String),
}

impl Host {
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Some(path) = s.strip_prefix("unix://") {
            if path.is_empty() {
                return Err(Error::InvalidArgument(format!("invalid unix socket url: {}", s)));
            }
            // unix://var/run/docker.sock is accepted as a relative-looking absolute path
            let path = if path.starts_with('/') {
                path.to_string()
            } else {
                format!("/{}", path)
            };
            return Ok(Host::Unix(PathBuf::from(path)));
        }
        if let Some(pipe) = s.strip_prefix("npipe://") {
            if pipe.is_empty() {
                return Err(Error::InvalidArgument(format!("invalid named pipe url: {}", s)));
            }
            return Ok(Host::NamedPipe(pipe.replace('/', "\\")));
        }
        if s.starts_with('/') {
            return Ok(Host::Unix(PathBuf::from(s)));
        }

        let (scheme, rest) = s.split_once("://").unwrap_or(("tcp", s));
        let tls = match scheme {
            "https" => true,
            "http" | "tcp" => false,
            _ => return Err(Error::InvalidArgument(format!("unsupported scheme in host: {}", s))),
        };
        let default_port = if tls { 2376 } else { 2375 };
        if rest.trim_end_matches('/').is_empty() {
            return Ok(Host::Tcp {
                host: DEFAULT_TCP_HOST.to_string(),
                port: default_port,
                tls,
            });
        }

        // Parsed under `tcp` so that http hosts don't pick up port 80
        let url = Url::parse(&format!("tcp://{}", rest))
            .map_err(|e| Error::InvalidArgument(format!("invalid host {}: {}", s, e)))?;
        if !matches!(url.path(), "" | "/") {
            return Err(Error::InvalidArgument(format!(
                "path prefixes are not supported in host: {}",
                s
            )));
        }
        let host = match url.host() {
            Some(url::Host::Domain(domain)) if !domain.is_empty() => domain.to_string(),
            Some(url::Host::Ipv4(addr)) => addr.to_string(),
            Some(url::Host::Ipv6(addr)) => addr.to_string(),
            _ => DEFAULT_TCP_HOST.to_string(),
        };
        Ok(Host::Tcp {
            host,
            port: url.port().unwrap_or(default_port),
            tls,
        })
    }

    /// `host:port` for TCP hosts with IPv6 literals bracketed; `localhost`
    /// for local sockets
    pub fn authority(&self) -> String {
        match self {
            Host::Tcp { host, port, .. } if host.contains(':') => format!("[{}]:{}", host, port),
            Host::Tcp { host, port, .. } => format!("{}:{}", host, port),
            _ => "localhost".to_string(),
        }
    }
}

impl FromStr for Host {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Host::parse(s)
    }
}

impl fmt::Display for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Host::Unix(path) => write!(f, "unix://{}", path.display()),
            Host::Tcp { tls, .. } => {
                let scheme = if *tls { "https" } else { "http" };
                write!(f, "{}://{}", scheme, self.authority())
            }
            Host::NamedPipe(pipe) => write!(f, "npipe://{}", pipe.replace('\\', "/")),
        }
    }
}

/// Client certificate material location; loading is left to the transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TlsConfig {
    pub verify: bool,
    pub cert_path: Option<PathBuf>,
}

/// Pinned API version or negotiation against the daemon
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApiVersionSpec {
    Auto,
    Pinned(ApiVersion),
}

impl Default for ApiVersionSpec {
    fn default() -> Self {
        ApiVersionSpec::Pinned(ApiVersion::default())
    }
}

impl FromStr for ApiVersionSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case("auto") {
            Ok(ApiVersionSpec::Auto)
        } else {
            Ok(ApiVersionSpec::Pinned(ApiVersion::parse(s)?))
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub host: Host,
    pub version: ApiVersionSpec,
    pub timeout: Duration,
    pub tls: Option<TlsConfig>,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: Host::parse(DEFAULT_DOCKER_HOST).unwrap_or(Host::Tcp {
                host: DEFAULT_TCP_HOST.into(),
                port: 2375,
                tls: false,
            }),
            version: ApiVersionSpec::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            tls: None,
            user_agent: format!("docker-client/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Resolve configuration from `DOCKER_HOST`, `DOCKER_TLS_VERIFY`, `DOCKER_CERT_PATH`
    pub fn from_env() -> Result<Self> {
        let env: HashMap<String, String> = std::env::vars().collect();
        Self::from_env_map(&env)
    }

    /// Like [`ClientConfig::from_env`] but reads from the given map
    pub fn from_env_map(env: &HashMap<String, String>) -> Result<Self> {
        let mut config = ClientConfig::default();

        let tls_verify = env
            .get("DOCKER_TLS_VERIFY")
            .map(|v| !v.is_empty() && v != "0")
            .unwrap_or(false);
        let cert_path = env
            .get("DOCKER_CERT_PATH")
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);

        // A certificate directory alone is enough to switch to TLS
        let use_tls = tls_verify || cert_path.is_some();

        if let Some(host) = env.get("DOCKER_HOST").filter(|h| !h.is_empty()) {
            let mut host = Host::parse(host)?;
            if use_tls {
                if let Host::Tcp { ref mut tls, .. } = host {
                    *tls = true;
                }
            }
            config.host = host;
        }

        if use_tls {
            config.tls = Some(TlsConfig {
                verify: tls_verify,
                cert_path,
            });
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.timeout.is_zero() {
            return Err(Error::InvalidArgument("timeout must be greater than zero".into()));
        }
        if let Host::Tcp { ref host, .. } = self.host {
            if host.is_empty() {
                return Err(Error::InvalidArgument("host cannot be empty".into()));
            }
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn host(mut self, host: Host) -> Self {
        self.config.host = host;
        self
    }

    pub fn base_url(mut self, url: &str) -> Result<Self> {
        self.config.host = Host::parse(url)?;
        Ok(self)
    }

    pub fn version(mut self, version: ApiVersion) -> Self {
        self.config.version = ApiVersionSpec::Pinned(version);
        self
    }

    pub fn auto_version(mut self) -> Self {
        self.config.version = ApiVersionSpec::Auto;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn tls(mut self, tls: TlsConfig) -> Self {
        self.config.tls = Some(tls);
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    pub fn build(self) -> ClientConfig {
        self.config
    }

    pub fn build_validated(self) -> Result<ClientConfig> {
        let config = self.build();
        config.validate()?;
        Ok(config)
    }
}
