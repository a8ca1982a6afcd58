//! Daemon diagnostics.
//!
//! # Responsibilities
//! - Install the global `tracing` subscriber
//! - Route diagnostics to stderr and, when a logger is given, into the log
//!   pipeline
//!
//! # Design Decisions
//! - `RUST_LOG` wins over the configured filter
//! - The pipeline layer applies its own level threshold on top of the filter

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::log::{Logger, PipelineLayer};

/// Build the env filter, falling back to `default_filter`.
pub fn env_filter(default_filter: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter))
}

/// Install the global subscriber. Fails if one is already set.
pub fn init_tracing(
    default_filter: &str,
    logger: Option<Arc<Logger>>,
) -> Result<(), tracing_subscriber::util::TryInitError> {
    tracing_subscriber::registry()
        .with(env_filter(default_filter))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(logger.map(PipelineLayer::new))
        .try_init()
}
