//! Chunked, refcounted log pipeline.
//!
//! # Data Flow
//! ```text
//! log_*! / Logger::emit(level, args)
//!     → level check (atomic threshold)
//!     → assembler.rs (thread-local scratch → pending message, 128-byte chunks)
//!     → on '\n': direct.rs debug file (raw copy)
//!     → broadcast.rs (one MessageClone per target, shared Arc<MessageBody>)
//!     → target.rs (FileTarget, custom targets)
//!
//! Out-of-band:
//!     chunk exhaustion → direct.rs emergency file ("log: out of memory")
//!     tracing events → bridge.rs → Logger::emit
//! ```
//!
//! # Design Decisions
//! - Emission never fails from the caller's point of view; internal errors go
//!   to the emergency file and to metrics
//! - A line is written to every target exactly once, sharing one body
//! - Targets are fixed once the logger is built

pub mod assembler;
pub mod bridge;
pub mod broadcast;
pub mod direct;
pub mod file_target;
pub mod level;
pub mod logger;
pub mod macros;
pub mod message;
pub mod pool;
pub mod target;

use thiserror::Error;

pub use assembler::{current_session, switch_session, LOG_MAX_SIZE};
pub use bridge::PipelineLayer;
pub use file_target::FileTarget;
pub use level::Level;
pub use logger::{Logger, LoggerBuilder};
pub use message::{MessageBody, MessageClone, SessionIdentity};
pub use pool::{ChunkPool, LOG_CHUNK_SIZE};
pub use target::{LogTarget, TargetRegistry};

/// Internal pipeline errors.
#[derive(Debug, Error)]
pub enum LogError {
    #[error("log: out of memory (chunk pool of {capacity} exhausted)")]
    PoolExhausted { capacity: usize },

    #[error("log: emission while a line is being assembled on this thread")]
    Reentrant,

    #[error("log: {0}")]
    Io(#[from] std::io::Error),
}
