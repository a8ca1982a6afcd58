//! Access-concentrator core services.
//!
//! - [`connlimit`]: per-identity connection-attempt limiter and its
//!   management view
//! - [`log`]: multi-threaded, chunked log pipeline with pluggable targets
//! - [`admin`]: line-oriented management listener
//! - [`config`], [`lifecycle`], [`observability`]: daemon plumbing

pub mod admin;
pub mod clock;
pub mod config;
pub mod connlimit;
pub mod lifecycle;
pub mod log;
pub mod observability;

pub use config::schema::ConcentratorConfig;
pub use connlimit::{ConnLimiter, Decision, IdentityKey};
pub use lifecycle::{Services, Shutdown};
pub use log::{Level, Logger};
