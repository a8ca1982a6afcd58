//! concentrator-core daemon.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌──────────────────────────────────────────────┐
//!   SIGHUP ──────▶│ lifecycle ──▶ Logger::reopen                 │
//!   SIGUSR1 ─────▶│           ──▶ reload ──┐                     │
//!   file change ─▶│ config watcher ────────┴▶ Services::apply    │
//!                 │                                              │
//!   management ──▶│ admin ──▶ connlimit view ──▶ ConnLimiter     │
//!                 │                                              │
//!   tracing ─────▶│ observability ──▶ log pipeline ──▶ targets   │
//!                 └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use concentrator_core::admin::AdminServer;
use concentrator_core::config::watcher::{reload_into, ConfigWatcher};
use concentrator_core::config::{load_config, ConcentratorConfig};
use concentrator_core::lifecycle::{Services, Shutdown, SignalEvent, Signals};
use concentrator_core::observability;

#[derive(Parser)]
#[command(name = "concentrator-core")]
#[command(about = "Connection limiting and logging core for an access concentrator", long_about = None)]
struct Args {
    /// Configuration file (TOML). Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => ConcentratorConfig::default(),
    };

    let services = Services::start(&config)?;
    observability::logging::init_tracing(
        &config.observability.filter,
        Some(services.logger.clone()),
    )?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "concentrator-core starting");

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => observability::metrics::init_metrics(addr)?,
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let shutdown = Shutdown::new();
    let admin = AdminServer::bind(&config.cli.bind_address, services.management()).await?;
    let admin_task = tokio::spawn(admin.run(shutdown.subscribe()));

    let (config_watcher, mut reload_rx) = match &args.config {
        Some(path) => {
            let (config_watcher, rx) = ConfigWatcher::new(path);
            (Some(config_watcher), rx)
        }
        None => (None, tokio::sync::mpsc::unbounded_channel().1),
    };
    let reload_tx = config_watcher.as_ref().map(ConfigWatcher::sender);
    // The watcher handle must outlive the main loop.
    let _watch_handle = config_watcher.and_then(|w| match w.run() {
        Ok(handle) => Some(handle),
        Err(e) => {
            tracing::warn!(error = %e, "config watcher unavailable, reload on SIGUSR1 only");
            None
        }
    });

    let mut signals = Signals::register()?;
    loop {
        tokio::select! {
            event = signals.recv() => match event {
                SignalEvent::Reopen => services.logger.reopen(),
                SignalEvent::Reload => match (&args.config, &reload_tx) {
                    (Some(path), Some(tx)) => {
                        reload_into(path, tx);
                    }
                    _ => tracing::warn!("no configuration file to reload"),
                },
                SignalEvent::Shutdown => break,
            },
            Some(config) = reload_rx.recv() => services.apply(&config),
        }
    }

    shutdown.trigger();
    let _ = admin_task.await;

    tracing::info!("Shutdown complete");
    Ok(())
}
