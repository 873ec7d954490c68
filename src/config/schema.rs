//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the bridge.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::model::ModelSettings;

/// Root configuration for the bridge.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct BridgeConfig {
    /// Target load-balancer device settings.
    pub bigip: BigIpConfig,

    /// Reconciler process settings.
    pub driver: DriverConfig,

    /// Where snapshots are written.
    pub output: OutputConfig,

    /// Coalescing behaviour.
    pub aggregator: AggregatorConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Static routes fed into the aggregator at startup and on reload.
    pub routes: Vec<StaticRouteConfig>,
}

/// Load-balancer device settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct BigIpConfig {
    /// Management API URL.
    pub url: String,

    /// Management username.
    pub user: String,

    /// Management password.
    pub pass: String,

    /// Partitions the reconciler manages; the first hosts new entries.
    pub partitions: Vec<String>,

    /// Externally reachable address for the routing virtual server.
    pub external_addr: String,

    /// Port of the routing virtual server and of every service entry.
    pub http_port: u16,

    /// How often the reconciler re-verifies device state, in seconds.
    pub verify_interval_secs: u64,

    /// Prefix for generated service names.
    pub pool_prefix: String,

    /// Name of the routing virtual server.
    pub virtual_server_name: String,

    /// Name of the L7 policy holding the rules.
    pub policy_name: String,
}

impl Default for BigIpConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            user: String::new(),
            pass: String::new(),
            partitions: Vec::new(),
            external_addr: String::new(),
            http_port: 80,
            verify_interval_secs: 30,
            pool_prefix: "cf".to_string(),
            virtual_server_name: "routing-vip-http".to_string(),
            policy_name: "cf-routing-policy".to_string(),
        }
    }
}

impl BigIpConfig {
    /// Partition that receives generated entries.
    pub fn primary_partition(&self) -> &str {
        self.partitions
            .iter()
            .map(|p| p.trim())
            .find(|p| !p.is_empty())
            .unwrap_or_default()
    }

    pub fn model_settings(&self) -> ModelSettings {
        ModelSettings {
            pool_prefix: self.pool_prefix.clone(),
            service_port: self.http_port,
            partition: self.primary_partition().to_string(),
        }
    }
}

/// Reconciler process configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct DriverConfig {
    /// Interpreter or executable to launch.
    pub interpreter: String,

    /// Script passed as the first argument.
    pub script: String,

    /// Additional arguments appended after `--config-file <path>`.
    pub extra_args: Vec<String>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            interpreter: "python".to_string(),
            script: "python/bigipconfigdriver.py".to_string(),
            extra_args: Vec::new(),
        }
    }
}

/// Snapshot output configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    /// File the snapshot is written to and the reconciler reads.
    pub config_file: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            config_file: std::env::temp_dir().join("lb-bridge.json"),
        }
    }
}

/// Aggregator coalescing configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
#[serde(default)]
pub struct AggregatorConfig {
    /// Extra time to keep draining updates before a flush, in milliseconds.
    pub settle_ms: u64,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// A route declared in the config file.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct StaticRouteConfig {
    /// Host plus optional path, e.g. `baz.cf.com/segment1`.
    pub uri: String,

    /// Context path of the pool.
    #[serde(default = "default_context_path")]
    pub context_path: String,

    /// Backend addresses as `host:port`.
    #[serde(default)]
    pub endpoints: Vec<String>,
}

fn default_context_path() -> String {
    "/".to_string()
}
