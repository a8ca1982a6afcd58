//! Connection-attempt limiting subsystem.
//!
//! # Data Flow
//! ```text
//! New session from peer (IPv4 or MAC):
//!     → key.rs (derive IdentityKey)
//!     → limiter.rs (two-tier burst / sustained check under one lock)
//!     → Accept or Drop handed back to the admission code
//!
//! Management (`connlimit show|flush ...`):
//!     → view.rs (parse, render, flush)
//!
//! Reload:
//!     → rate.rs (parse `limit = "N/T[s|m|h]"`)
//!     → LimitSettings swapped into the limiter
//! ```
//!
//! # Design Decisions
//! - Single ordered list, most recently touched first
//! - Stale entries are collected during lookups and freed after unlock
//! - Bookkeeping exhaustion is a typed error, not an abort

pub mod key;
pub mod limiter;
pub mod rate;
pub mod view;

pub use key::{IdentityKey, MacAddr};
pub use limiter::{ConnLimiter, ConnlimitError, Decision, EntrySnapshot, LimitSettings};
pub use rate::{RateLimit, RateParseError};
pub use view::{ConnlimitView, FlushScope};
