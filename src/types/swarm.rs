//! Swarm cluster specification

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Certificate lifetime applied when an update leaves it unset (90 days, ns)
pub const DEFAULT_NODE_CERT_EXPIRY: i64 = 7_776_000_000_000_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExternalCa {
    pub protocol: String,
    #[serde(rename = "URL")]
    pub url: String,
}

/// Cluster-wide settings; unset fields are left to the daemon
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SwarmSpec {
    pub name: Option<String>,
    pub task_history_retention_limit: Option<i64>,
    pub snapshot_interval: Option<i64>,
    pub keep_old_snapshots: Option<i64>,
    pub log_entries_for_slow_followers: Option<i64>,
    pub heartbeat_tick: Option<i64>,
    pub election_tick: Option<i64>,
    pub dispatcher_heartbeat_period: Option<i64>,
    pub node_cert_expiry: Option<i64>,
    pub external_ca: Option<ExternalCa>,
}

impl SwarmSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_task_history_retention_limit(mut self, limit: i64) -> Self {
        self.task_history_retention_limit = Some(limit);
        self
    }

    pub fn with_snapshot_interval(mut self, interval: i64) -> Self {
        self.snapshot_interval = Some(interval);
        self
    }

    pub fn with_keep_old_snapshots(mut self, count: i64) -> Self {
        self.keep_old_snapshots = Some(count);
        self
    }

    pub fn with_log_entries_for_slow_followers(mut self, count: i64) -> Self {
        self.log_entries_for_slow_followers = Some(count);
        self
    }

    pub fn with_heartbeat_tick(mut self, tick: i64) -> Self {
        self.heartbeat_tick = Some(tick);
        self
    }

    pub fn with_election_tick(mut self, tick: i64) -> Self {
        self.election_tick = Some(tick);
        self
    }

    pub fn with_dispatcher_heartbeat_period(mut self, period: i64) -> Self {
        self.dispatcher_heartbeat_period = Some(period);
        self
    }

    pub fn with_node_cert_expiry(mut self, expiry: i64) -> Self {
        self.node_cert_expiry = Some(expiry);
        self
    }

    pub fn with_external_ca(mut self, ca: ExternalCa) -> Self {
        self.external_ca = Some(ca);
        self
    }

    /// Nested wire form (`Orchestration`, `Raft`, `Dispatcher`, `CAConfig`)
    pub fn to_json(&self) -> Value {
        let mut spec = Map::new();
        if let Some(ref name) = self.name {
            spec.insert("Name".into(), Value::String(name.clone()));
        }

        let section = |pairs: &[(&str, Option<i64>)]| -> Option<Value> {
            let map: Map<String, Value> = pairs
                .iter()
                .filter_map(|(k, v)| v.map(|v| (k.to_string(), Value::from(v))))
                .collect();
            (!map.is_empty()).then_some(Value::Object(map))
        };

        if let Some(v) = section(&[("TaskHistoryRetentionLimit", self.task_history_retention_limit)]) {
            spec.insert("Orchestration".into(), v);
        }
        if let Some(v) = section(&[
            ("SnapshotInterval", self.snapshot_interval),
            ("KeepOldSnapshots", self.keep_old_snapshots),
            ("LogEntriesForSlowFollowers", self.log_entries_for_slow_followers),
            ("HeartbeatTick", self.heartbeat_tick),
            ("ElectionTick", self.election_tick),
        ]) {
            spec.insert("Raft".into(), v);
        }
        if let Some(v) = section(&[("HeartbeatPeriod", self.dispatcher_heartbeat_period)]) {
            spec.insert("Dispatcher".into(), v);
        }

        let mut ca = match section(&[("NodeCertExpiry", self.node_cert_expiry)]) {
            Some(Value::Object(map)) => map,
            _ => Map::new(),
        };
        if let Some(ref external) = self.external_ca {
            if let Ok(v) = serde_json::to_value(external) {
                ca.insert("ExternalCA".into(), v);
            }
        }
        if !ca.is_empty() {
            spec.insert("CAConfig".into(), Value::Object(ca));
        }

        Value::Object(spec)
    }
}

impl Serialize for SwarmSpec {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}
