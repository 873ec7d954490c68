//! Snapshot rendering and serialization.

use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;

use crate::config::BigIpConfig;
use crate::model::ordering::{cmp_route_configs, cmp_rule_specificity, cmp_rules};
use crate::model::{ConfigModel, HostMatch, RouteConfig, Rule};

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to serialize snapshot: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Device-wide settings copied into every snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceSettings {
    pub url: String,
    pub username: String,
    pub password: String,
    pub partitions: Vec<String>,
    pub partition: String,
    pub external_addr: String,
    pub port: u16,
    pub verify_interval_secs: u64,
    pub log_level: String,
    pub virtual_server_name: String,
    pub policy_name: String,
}

impl DeviceSettings {
    pub fn from_config(bigip: &BigIpConfig, log_level: &str) -> Self {
        Self {
            url: bigip.url.clone(),
            username: bigip.user.clone(),
            password: bigip.pass.clone(),
            partitions: bigip.partitions.clone(),
            partition: bigip.primary_partition().to_string(),
            external_addr: bigip.external_addr.clone(),
            port: bigip.http_port,
            verify_interval_secs: bigip.verify_interval_secs,
            log_level: log_level.to_string(),
            virtual_server_name: bigip.virtual_server_name.clone(),
            policy_name: bigip.policy_name.clone(),
        }
    }
}

/// Fully ordered rendering of the model at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    bigip: BigIpSection,
    global: GlobalSection,
    resources: Resources,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct BigIpSection {
    url: String,
    username: String,
    password: String,
    partitions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
struct GlobalSection {
    log_level: String,
    verify_interval: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
struct Resources {
    virtual_server: VirtualServer,
    pools: Vec<PoolEntry>,
    l7_policy: Policy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
struct VirtualServer {
    name: String,
    partition: String,
    bind_addr: String,
    port: u16,
    policies: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct PoolEntry {
    name: String,
    port: u16,
    partition: String,
    members: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct Policy {
    name: String,
    partition: String,
    rules: Vec<RuleEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
struct RuleEntry {
    #[serde(rename = "fullURI")]
    full_uri: String,
    ordinal: usize,
    host: HostEntry,
    path_segments: Vec<String>,
    forward_to: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
enum HostEntry {
    Equals(String),
    EndsWith(String),
}

impl Snapshot {
    /// Render an ordered snapshot of `model`.
    pub fn render(model: &ConfigModel, device: &DeviceSettings) -> Self {
        let mut configs: Vec<&RouteConfig> = model.route_configs().collect();
        configs.sort_by(|a, b| cmp_route_configs(a, b));

        let mut by_specificity: Vec<&Rule> = model.rules().collect();
        by_specificity.sort_by(|a, b| cmp_rule_specificity(a, b));
        let ordinals: HashMap<&str, usize> = by_specificity
            .iter()
            .enumerate()
            .map(|(ordinal, rule)| (rule.full_uri.as_str(), ordinal))
            .collect();

        let mut sorted_rules: Vec<&Rule> = model.rules().collect();
        sorted_rules.sort_by(|a, b| cmp_rules(a, b));

        let rules = sorted_rules
            .into_iter()
            .map(|rule| RuleEntry {
                full_uri: rule.full_uri.clone(),
                ordinal: ordinals.get(rule.full_uri.as_str()).copied().unwrap_or_default(),
                host: match &rule.host {
                    HostMatch::Exact(host) => HostEntry::Equals(host.clone()),
                    HostMatch::Wildcard(suffix) => HostEntry::EndsWith(suffix.clone()),
                },
                path_segments: rule.path_segments.clone(),
                forward_to: rule.forward_to.service_name.clone(),
            })
            .collect();

        Self {
            bigip: BigIpSection {
                url: device.url.clone(),
                username: device.username.clone(),
                password: device.password.clone(),
                partitions: device.partitions.clone(),
            },
            global: GlobalSection {
                log_level: device.log_level.clone(),
                verify_interval: device.verify_interval_secs,
            },
            resources: Resources {
                virtual_server: VirtualServer {
                    name: device.virtual_server_name.clone(),
                    partition: device.partition.clone(),
                    bind_addr: device.external_addr.clone(),
                    port: device.port,
                    policies: vec![device.policy_name.clone()],
                },
                pools: configs
                    .into_iter()
                    .map(|c| PoolEntry {
                        name: c.service_name().to_string(),
                        port: c.service_port(),
                        partition: c.partition.clone(),
                        members: c.members.iter().cloned().collect(),
                    })
                    .collect(),
                l7_policy: Policy {
                    name: device.policy_name.clone(),
                    partition: device.partition.clone(),
                    rules,
                },
            },
        }
    }

    pub fn pool_names(&self) -> Vec<&str> {
        self.resources.pools.iter().map(|p| p.name.as_str()).collect()
    }

    pub fn rule_uris(&self) -> Vec<&str> {
        self.resources
            .l7_policy
            .rules
            .iter()
            .map(|r| r.full_uri.as_str())
            .collect()
    }

    /// Members of the named pool, if present.
    pub fn pool_members(&self, name: &str) -> Option<Vec<&str>> {
        self.resources
            .pools
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.members.iter().map(String::as_str).collect())
    }

    /// Pretty JSON with a trailing newline.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SnapshotError> {
        let mut bytes = serde_json::to_vec_pretty(self)?;
        bytes.push(b'\n');
        Ok(bytes)
    }
}
