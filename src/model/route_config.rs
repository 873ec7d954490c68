//! Backend-service entries of the desired device state.

use std::collections::BTreeSet;
use std::fmt;

/// Identity of a backend service on the device.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServiceKey {
    pub service_name: String,
    pub service_port: u16,
}

impl ServiceKey {
    pub fn new(service_name: impl Into<String>, service_port: u16) -> Self {
        Self {
            service_name: service_name.into(),
            service_port,
        }
    }
}

impl fmt::Display for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.service_name, self.service_port)
    }
}

/// One backend service: its key, partition and member addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteConfig {
    pub key: ServiceKey,
    pub partition: String,
    /// `host:port` strings, kept ordered.
    pub members: BTreeSet<String>,
}

impl RouteConfig {
    pub fn new(key: ServiceKey, partition: impl Into<String>) -> Self {
        Self {
            key,
            partition: partition.into(),
            members: BTreeSet::new(),
        }
    }

    pub fn service_name(&self) -> &str {
        &self.key.service_name
    }

    pub fn service_port(&self) -> u16 {
        self.key.service_port
    }
}
