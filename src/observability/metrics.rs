//! Metrics collection and exposition.
//!
//! # Metrics
//! - `connlimit_accepted_total` (counter): admitted connection attempts
//! - `connlimit_dropped_total` (counter): rejected connection attempts
//! - `connlimit_evicted_total` (counter): stale entries removed during checks
//! - `connlimit_entries` (gauge): identities currently tracked
//! - `log_messages_total` (counter): completed lines, by level
//! - `log_exhausted_total` (counter): lines lost to chunk exhaustion, by stage
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed, so library users and
//!   tests pay nothing
//! - Prometheus exporter is opt-in (`metrics-enabled`)

use std::net::SocketAddr;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::log::Level;

/// Install the Prometheus recorder and its scrape listener.
///
/// Must be called from inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "metrics exporter listening");
    Ok(())
}

pub fn record_connlimit_decision(accepted: bool) {
    if accepted {
        counter!("connlimit_accepted_total").increment(1);
    } else {
        counter!("connlimit_dropped_total").increment(1);
    }
}

pub fn record_connlimit_evicted(count: usize) {
    if count > 0 {
        counter!("connlimit_evicted_total").increment(count as u64);
    }
}

pub fn record_connlimit_entries(len: usize) {
    gauge!("connlimit_entries").set(len as f64);
}

/// Count a completed line.
pub fn record_log_message(level: Level) {
    counter!("log_messages_total", "level" => level.name()).increment(1);
}

/// Count a line lost to chunk exhaustion; `stage` is `chunk` or `clone`.
pub fn record_log_exhausted(stage: &'static str) {
    counter!("log_exhausted_total", "stage" => stage).increment(1);
}
