//! Management surface.
//!
//! # Data Flow
//! ```text
//! concentrator-cli / telnet
//!     → server.rs (TCP, one command per line)
//!     → commands.rs (dispatch by first word)
//!     → connlimit::ConnlimitView
//!     → reply lines ("\r\n"), then an empty line
//! ```

pub mod commands;
pub mod server;

pub use commands::Management;
pub use server::{AdminError, AdminServer};
