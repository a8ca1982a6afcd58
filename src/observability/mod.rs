//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! connlimit, log, admin, lifecycle:
//!     → tracing events → logging.rs (stderr + log pipeline bridge)
//!     → metrics.rs (counters, gauges) → Prometheus scrape (optional)
//! ```

pub mod logging;
pub mod metrics;
