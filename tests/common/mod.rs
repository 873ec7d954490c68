//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use lb_bridge::config::BridgeConfig;
use lb_bridge::model::{ConfigModel, ObservedRoute};
use lb_bridge::registry::{Endpoint, Pool, RouteEvent, RouteTable, RouteUri};
use lb_bridge::sink::{ConfigSink, SinkError};
use lb_bridge::snapshot::{DeviceSettings, Snapshot};

/// Sink that keeps every write in memory.
#[derive(Default)]
pub struct MemorySink {
    writes: Mutex<Vec<Vec<u8>>>,
    started: AtomicUsize,
    failing: AtomicBool,
    delay: Option<Duration>,
}

impl MemorySink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Sink whose every write blocks for `delay`.
    pub fn slow(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay: Some(delay),
            ..Self::default()
        })
    }

    /// Writes entered so far, including ones still in progress.
    pub fn writes_started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    /// Make subsequent writes fail until reset.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn write_count(&self) -> usize {
        self.writes.lock().unwrap().len()
    }

    pub fn last(&self) -> Vec<u8> {
        self.writes.lock().unwrap().last().cloned().unwrap_or_default()
    }

    pub fn last_json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.last()).unwrap()
    }
}

impl ConfigSink for MemorySink {
    fn output_filename(&self) -> String {
        "memory".to_string()
    }

    fn write(&self, bytes: &[u8]) -> Result<usize, SinkError> {
        self.started.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(SinkError::Rejected("injected failure".to_string()));
        }
        self.writes.lock().unwrap().push(bytes.to_vec());
        Ok(bytes.len())
    }
}

/// Config with every required device setting present.
pub fn test_config() -> BridgeConfig {
    let mut config = BridgeConfig::default();
    config.bigip.url = "https://10.0.0.1".to_string();
    config.bigip.user = "admin".to_string();
    config.bigip.pass = "secret".to_string();
    config.bigip.partitions = vec!["cf".to_string()];
    config.bigip.external_addr = "10.0.0.10".to_string();
    config
}

pub fn endpoint(host: &str) -> Endpoint {
    Endpoint::new(host, 80)
}

pub fn pool(context_path: &str, hosts: &[&str]) -> Pool {
    let mut pool = Pool::new(context_path);
    for host in hosts {
        pool.put(endpoint(host));
    }
    pool
}

/// Seven routes, nine endpoints, mixing wildcards and nested paths.
pub fn populated_table() -> RouteTable {
    let routes: [(&str, &str, &[&str]); 7] = [
        ("foo.cf.com", "/", &["127.0.0.1"]),
        ("bar.cf.com", "/", &["127.0.1.1", "127.0.1.2"]),
        ("baz.cf.com", "/", &["127.0.2.1"]),
        ("baz.cf.com/segment1", "/segment1", &["127.0.3.1", "127.0.3.2"]),
        (
            "baz.cf.com/segment1/segment2/segment3",
            "/segment1/segment2/segment3",
            &["127.0.4.1", "127.0.4.2"],
        ),
        ("*.cf.com", "/", &["127.0.5.1"]),
        ("*.foo.cf.com", "/", &["127.0.6.1"]),
    ];

    let mut table = RouteTable::new();
    for (uri, context_path, hosts) in routes {
        table.insert(RouteUri::new(uri), pool(context_path, hosts));
    }
    table
}

/// Bytes a fresh aggregator would write for exactly the routes in `table`.
pub fn expected_snapshot(config: &BridgeConfig, table: &RouteTable) -> Vec<u8> {
    let mut model = ConfigModel::new();
    model.apply(
        &config.bigip.model_settings(),
        RouteEvent::Add,
        &RouteUri::new(""),
        &ObservedRoute::collect(table),
    );
    let device = DeviceSettings::from_config(&config.bigip, &config.observability.log_level);
    Snapshot::render(&model, &device).to_bytes().unwrap()
}
