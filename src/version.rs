//! API version tokens and feature gating

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{Error, Result};

/// Dotted numeric version token such as `1.24`
///
/// Ordering compares components numerically, padding the shorter token
/// with zeros, so `1.9 < 1.10` and `1.24 == 1.24.0`.
#[derive(Debug, Clone)]
pub struct ApiVersion {
    components: Vec<u64>,
}

impl ApiVersion {
    pub fn new(major: u64, minor: u64) -> Self {
        Self {
            components: vec![major, minor],
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        let trimmed = s.trim().trim_start_matches('v');
        if trimmed.is_empty() {
            return Err(Error::InvalidVersion(format!("empty version string: {:?}", s)));
        }
        let components = trimmed
            .split('.')
            .map(|part| {
                part.parse::<u64>()
                    .map_err(|_| Error::InvalidVersion(format!("malformed version: {:?}", s)))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { components })
    }

    fn component(&self, idx: usize) -> u64 {
        self.components.get(idx).copied().unwrap_or(0)
    }
}

/// Three-way numeric comparison of two dotted version strings
pub fn compare(a: &str, b: &str) -> Result<Ordering> {
    Ok(ApiVersion::parse(a)?.cmp(&ApiVersion::parse(b)?))
}

impl Ord for ApiVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.components.len().max(other.components.len());
        (0..len)
            .map(|i| self.component(i).cmp(&other.component(i)))
            .find(|o| *o != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for ApiVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ApiVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ApiVersion {}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.components.iter().map(|c| c.to_string()).collect();
        write!(f, "{}", parts.join("."))
    }
}

impl FromStr for ApiVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// `1.24`, used when none is configured
impl Default for ApiVersion {
    fn default() -> Self {
        Self::new(1, 24)
    }
}

impl Serialize for ApiVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ApiVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        ApiVersion::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Negotiated version for one client; fixed after construction
#[derive(Debug, Clone)]
pub struct VersionGate {
    version: ApiVersion,
}

impl VersionGate {
    pub fn new(version: ApiVersion) -> Self {
        Self { version }
    }

    pub fn version(&self) -> &ApiVersion {
        &self.version
    }

    /// True if the negotiated version is `min` or newer
    pub fn at_least(&self, min: &str) -> bool {
        match ApiVersion::parse(min) {
            Ok(min) => self.version >= min,
            Err(_) => false,
        }
    }

    /// True if the negotiated version is older than `max`
    pub fn below(&self, max: &str) -> bool {
        !self.at_least(max)
    }

    /// Fail with `InvalidVersion` when `feature` needs a newer API
    pub fn require(&self, min: &str, feature: &str) -> Result<()> {
        if self.at_least(min) {
            Ok(())
        } else {
            tracing::debug!(feature, min, negotiated = %self.version, "version gate rejected call");
            Err(Error::min_version(feature, min))
        }
    }
}
