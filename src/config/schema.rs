//! Configuration schema definitions.
//!
//! All sections derive Serde traits and default every field, so a minimal
//! file (or none at all) yields a working daemon.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration for the concentrator daemon.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ConcentratorConfig {
    /// Connection-attempt limiter.
    pub connlimit: ConnlimitConfig,

    /// Log pipeline.
    pub log: LogConfig,

    /// Management listener.
    pub cli: CliConfig,

    /// Daemon diagnostics and metrics.
    pub observability: ObservabilityConfig,
}

/// `[connlimit]` section.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, rename_all = "kebab-case")]
pub struct ConnlimitConfig {
    /// Sustained rate once the burst is spent: `N`, `N/Ts`, `N/Tm` or `N/Th`.
    pub limit: Option<String>,

    /// Attempts accepted inside the burst window.
    pub burst: u32,

    /// Burst window in seconds.
    pub timeout: u64,

    /// Maximum tracked identities (0 = unbounded).
    pub max_entries: usize,
}

impl Default for ConnlimitConfig {
    fn default() -> Self {
        Self {
            limit: None,
            burst: 3,
            timeout: 60,
            max_entries: 0,
        }
    }
}

/// `[log]` section.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default, rename_all = "kebab-case")]
pub struct LogConfig {
    /// Severity threshold (0 = msg only ... 5 = debug).
    pub level: u8,

    /// Emergency file, written directly on resource exhaustion.
    pub log_emerg: Option<PathBuf>,

    /// Raw debug file receiving every completed line before fan-out.
    pub log_debug: Option<PathBuf>,

    /// General log file target.
    pub log_file: Option<PathBuf>,

    /// Maximum outstanding chunks (0 = unbounded).
    pub chunk_pool: usize,
}

/// `[cli]` section.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, rename_all = "kebab-case")]
pub struct CliConfig {
    /// Management listener address.
    pub bind_address: String,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:2001".to_string(),
        }
    }
}

/// `[observability]` section.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, rename_all = "kebab-case")]
pub struct ObservabilityConfig {
    /// `EnvFilter` directive for the daemon's own diagnostics.
    pub filter: String,

    /// Enable the Prometheus endpoint.
    pub metrics_enabled: bool,

    /// Prometheus endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            filter: "concentrator_core=info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ConcentratorConfig::default();
        assert_eq!(config.connlimit.burst, 3);
        assert_eq!(config.connlimit.timeout, 60);
        assert!(config.connlimit.limit.is_none());
        assert_eq!(config.log.level, 0);
        assert!(config.log.log_emerg.is_none());
        assert_eq!(config.cli.bind_address, "127.0.0.1:2001");
    }

    #[test]
    fn test_kebab_case_keys() {
        let config: ConcentratorConfig = toml::from_str(
            r#"
            [connlimit]
            limit = "10/1s"
            max-entries = 512

            [log]
            level = 5
            log-emerg = "/tmp/emerg.log"
            log-debug = "/tmp/debug.log"
            "#,
        )
        .unwrap();

        assert_eq!(config.connlimit.limit.as_deref(), Some("10/1s"));
        assert_eq!(config.connlimit.max_entries, 512);
        assert_eq!(config.connlimit.burst, 3);
        assert_eq!(config.log.level, 5);
        assert_eq!(config.log.log_emerg, Some(PathBuf::from("/tmp/emerg.log")));
        assert_eq!(config.log.log_debug, Some(PathBuf::from("/tmp/debug.log")));
        assert!(config.log.log_file.is_none());
    }
}
