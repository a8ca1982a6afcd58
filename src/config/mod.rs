//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ConcentratorConfig (validated, immutable)
//!
//! On reload (file change or SIGUSR1):
//!     watcher.rs loads the file again
//!     → validation.rs validates
//!     → new config sent over the reload channel
//!     → limiter settings swapped, log parameters re-applied
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - A rejected reload keeps the running configuration

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{CliConfig, ConcentratorConfig, ConnlimitConfig, LogConfig, ObservabilityConfig};
