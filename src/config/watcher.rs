//! Watches the config file and publishes changed static routes.
//!
//! The parent directory is watched rather than the file itself, so editors
//! that save by renaming a new file into place keep being noticed.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::StaticRouteConfig;

pub struct ConfigWatcher {
    path: PathBuf,
    current: Vec<StaticRouteConfig>,
    routes_tx: mpsc::UnboundedSender<Vec<StaticRouteConfig>>,
}

impl ConfigWatcher {
    /// `current` is the route list already applied; reloads equal to it are
    /// not sent.
    pub fn new(
        path: &Path,
        current: Vec<StaticRouteConfig>,
    ) -> (Self, mpsc::UnboundedReceiver<Vec<StaticRouteConfig>>) {
        let (routes_tx, routes_rx) = mpsc::unbounded_channel();
        let watcher = Self {
            path: path.to_path_buf(),
            current,
            routes_tx,
        };
        (watcher, routes_rx)
    }

    /// Start watching. The returned watcher must be kept alive.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let Self {
            path,
            mut current,
            routes_tx,
        } = self;
        let file_name: Option<OsString> = path.file_name().map(|n| n.to_os_string());
        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let target = path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| {
                let event = match res {
                    Ok(event) => event,
                    Err(e) => {
                        tracing::error!(error = %e, "Config watch error");
                        return;
                    }
                };
                if !(event.kind.is_modify() || event.kind.is_create()) {
                    return;
                }
                let ours = event
                    .paths
                    .iter()
                    .any(|p| p.file_name().map(|n| n.to_os_string()) == file_name);
                if !ours {
                    return;
                }

                match load_config(&target) {
                    Ok(config) if config.routes == current => {
                        tracing::debug!(path = %target.display(), "Config changed, routes unchanged");
                    }
                    Ok(config) => {
                        tracing::info!(
                            path = %target.display(),
                            routes = config.routes.len(),
                            "Static routes changed"
                        );
                        current = config.routes.clone();
                        let _ = routes_tx.send(config.routes);
                    }
                    Err(e) => tracing::error!(
                        path = %target.display(),
                        error = %e,
                        "Ignoring invalid config reload"
                    ),
                }
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        tracing::info!(path = %path.display(), "Config watcher started");
        Ok(watcher)
    }
}
