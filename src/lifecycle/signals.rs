//! OS signal handling.
//!
//! # Signals
//! - SIGHUP → reopen log files (rotation)
//! - SIGUSR1 → reload the configuration file
//! - SIGINT / SIGTERM → shutdown

use tokio::signal::unix::{signal, Signal, SignalKind};

/// What the daemon should do in response to a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalEvent {
    Reopen,
    Reload,
    Shutdown,
}

/// Registered handlers for the signals the daemon reacts to.
pub struct Signals {
    hangup: Signal,
    user1: Signal,
    interrupt: Signal,
    terminate: Signal,
}

impl Signals {
    /// Register handlers. Must be called from inside a Tokio runtime.
    pub fn register() -> std::io::Result<Self> {
        Ok(Self {
            hangup: signal(SignalKind::hangup())?,
            user1: signal(SignalKind::user_defined1())?,
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
        })
    }

    /// Wait for the next signal of interest.
    pub async fn recv(&mut self) -> SignalEvent {
        let event = tokio::select! {
            _ = self.hangup.recv() => SignalEvent::Reopen,
            _ = self.user1.recv() => SignalEvent::Reload,
            _ = self.interrupt.recv() => SignalEvent::Shutdown,
            _ = self.terminate.recv() => SignalEvent::Shutdown,
        };
        tracing::info!(event = ?event, "signal received");
        event
    }
}
