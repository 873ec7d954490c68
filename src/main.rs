//! lb-bridge
//!
//! Bridges a route registry to an external load-balancer reconciler.
//!
//! # Architecture Overview
//!
//! ```text
//!   route registry ──route_update──▶ aggregator ──flush──▶ snapshot file
//!   (static routes,                  (single task,              │
//!    reloaded on change)              owns the model)           ▼
//!                                                         reconciler process
//!   SIGTERM/SIGINT ──▶ supervisor ──forward signal──────▶ (python driver)
//!                        ▲                                      │
//!                        └────────── stderr, exit status ───────┘
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use lb_bridge::config::load_config;
use lb_bridge::lifecycle;
use lb_bridge::observability::logging;

#[derive(Debug, Parser)]
#[command(name = "lb-bridge", version, about = "Route registry to load-balancer bridge")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config/lb-bridge.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("lb-bridge: {}: {e}", cli.config.display());
            return ExitCode::from(2);
        }
    };

    logging::init(&config.observability.log_level);
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %cli.config.display(),
        output = %config.output.config_file.display(),
        "lb-bridge starting"
    );

    match lifecycle::run(&cli.config, config).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) if e.is_fatal() => {
            tracing::error!(error = %e, "Exiting after fatal error");
            ExitCode::FAILURE
        }
        Err(e) => {
            tracing::warn!(error = %e, "Shutdown completed with errors");
            ExitCode::FAILURE
        }
    }
}
