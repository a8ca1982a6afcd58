//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Validate → Build logger and limiter → Bind listener
//!
//! Signals (signals.rs):
//!     SIGHUP → Logger::reopen
//!     SIGUSR1 → reload config → Services::apply
//!     SIGTERM/SIGINT → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     Broadcast → listener stops accepting → exit
//! ```

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use signals::{SignalEvent, Signals};
pub use startup::{Services, StartupError};
