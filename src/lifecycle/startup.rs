//! Startup orchestration and reload application.
//!
//! # Responsibilities
//! - Build the logger and limiter from a validated configuration
//! - Apply reloaded configurations to the running services
//!
//! # Design Decisions
//! - An invalid limiter setting is fatal at startup
//! - A log file that cannot be opened is reported and left out
//! - On reload, a section that cannot be applied keeps its current state

use std::sync::Arc;

use thiserror::Error;

use crate::admin::Management;
use crate::config::ConcentratorConfig;
use crate::connlimit::{ConnLimiter, ConnlimitView, LimitSettings, RateParseError};
use crate::log::{Logger, LoggerBuilder};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("connlimit setup failed: {0}")]
    Connlimit(#[from] RateParseError),
}

/// Long-lived services shared by the listener, signal and reload tasks.
#[derive(Debug, Clone)]
pub struct Services {
    pub logger: Arc<Logger>,
    pub limiter: Arc<ConnLimiter>,
}

impl Services {
    pub fn start(config: &ConcentratorConfig) -> Result<Self, StartupError> {
        let logger = LoggerBuilder::from_config(&config.log).build();
        let limiter = ConnLimiter::new(LimitSettings::from_config(&config.connlimit)?);

        Ok(Self {
            logger: Arc::new(logger),
            limiter: Arc::new(limiter),
        })
    }

    /// Management dispatcher over these services.
    pub fn management(&self) -> Management {
        Management::new(ConnlimitView::new(Arc::clone(&self.limiter)))
    }

    /// Apply a reloaded configuration. Affects later checks and emissions only.
    pub fn apply(&self, config: &ConcentratorConfig) {
        match LimitSettings::from_config(&config.connlimit) {
            Ok(settings) => self.limiter.apply(settings),
            Err(e) => tracing::error!(error = %e, "connlimit: keeping previous settings"),
        }
        self.logger.apply_config(&config.log);
        tracing::info!("configuration applied");
    }
}
