//! The logger: level filter, assembly, direct files and fan-out.
//!
//! # Responsibilities
//! - Reject emissions below the configured threshold before any allocation
//! - Drive the per-thread assembler and dispatch completed lines
//! - Own the emergency and raw debug files
//! - Apply `[log]` reloads without rebuilding
//!
//! # Design Decisions
//! - Threshold is an atomic so reloads never block emitters
//! - Targets are registered through [`LoggerBuilder`] only

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use crate::config::LogConfig;
use crate::log::assembler::{self, Assembler};
use crate::log::broadcast::Broadcaster;
use crate::log::direct::DirectFile;
use crate::log::file_target::FileTarget;
use crate::log::message::SessionIdentity;
use crate::log::pool::ChunkPool;
use crate::log::target::{LogTarget, TargetRegistry};
use crate::log::{Level, LogError};
use crate::observability::metrics;

/// Collects logger settings and targets, then freezes them.
#[derive(Default)]
pub struct LoggerBuilder {
    level: u8,
    targets: Vec<Arc<dyn LogTarget>>,
    chunk_pool: usize,
    emerg: Option<PathBuf>,
    debug: Option<PathBuf>,
}

impl LoggerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder seeded from a `[log]` section. A configured `log-file` is
    /// opened and registered as the first target; if it cannot be opened the
    /// failure is reported and the target is left out.
    pub fn from_config(config: &LogConfig) -> Self {
        let mut builder = Self::new()
            .level(config.level)
            .chunk_pool(config.chunk_pool);
        builder.emerg = config.log_emerg.clone();
        builder.debug = config.log_debug.clone();

        if let Some(path) = &config.log_file {
            match FileTarget::open(path) {
                Ok(target) => builder = builder.with_target(Arc::new(target)),
                Err(e) => report_open_failure("log-file", path, &e),
            }
        }
        builder
    }

    pub fn level(mut self, level: u8) -> Self {
        self.level = level;
        self
    }

    /// Append a target; dispatch follows registration order.
    pub fn with_target(mut self, target: Arc<dyn LogTarget>) -> Self {
        self.targets.push(target);
        self
    }

    /// Bound the chunk pool (0 = unbounded).
    pub fn chunk_pool(mut self, capacity: usize) -> Self {
        self.chunk_pool = capacity;
        self
    }

    pub fn emergency_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.emerg = Some(path.into());
        self
    }

    pub fn debug_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.debug = Some(path.into());
        self
    }

    /// Open the direct files and freeze the target list. A direct file that
    /// cannot be opened is reported and stays closed.
    pub fn build(self) -> Logger {
        let pool = ChunkPool::new(self.chunk_pool);

        let emerg = Arc::new(open_direct("log-emerg", self.emerg.as_deref()));
        let debug = open_direct("log-debug", self.debug.as_deref());

        Logger {
            level: AtomicU8::new(self.level),
            assembler: Assembler::new(pool.clone()),
            broadcaster: Broadcaster::new(
                TargetRegistry::new(self.targets),
                pool,
                Arc::clone(&emerg),
            ),
            emerg,
            debug,
        }
    }
}

fn open_direct(name: &'static str, path: Option<&Path>) -> DirectFile {
    let file = DirectFile::new(name);
    if let Err(e) = file.configure(path) {
        if let Some(path) = path {
            report_open_failure(name, path, &e);
        }
    }
    file
}

/// Startup open failures go to stderr as well, since the subscriber that
/// would carry `tracing` output is installed after the logger exists.
fn report_open_failure(name: &str, path: &Path, error: &LogError) {
    eprintln!("log:open: {}: {}: {}", name, path.display(), error);
}

/// Entry point for every log line.
#[derive(Debug)]
pub struct Logger {
    level: AtomicU8,
    assembler: Assembler,
    broadcaster: Broadcaster,
    emerg: Arc<DirectFile>,
    debug: DirectFile,
}

impl Logger {
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    /// Current threshold.
    pub fn level(&self) -> u8 {
        self.level.load(Ordering::Relaxed)
    }

    pub fn set_level(&self, level: u8) {
        self.level.store(level, Ordering::Relaxed);
    }

    pub fn enabled(&self, level: Level) -> bool {
        level.passes(self.level())
    }

    /// Emit a fragment; a line is dispatched once a fragment ends in `\n`.
    pub fn emit(&self, level: Level, args: fmt::Arguments<'_>) {
        self.dispatch(level, args, false);
    }

    /// Like [`Logger::emit`], tagging the line with the thread's current
    /// session as of completion.
    pub fn emit_session(&self, level: Level, args: fmt::Arguments<'_>) {
        self.dispatch(level, args, true);
    }

    /// Write straight to the emergency file.
    pub fn emerg(&self, args: fmt::Arguments<'_>) {
        self.emerg.write_fmt(args);
    }

    /// Write straight to the debug file, ignoring the threshold.
    pub fn debug_raw(&self, args: fmt::Arguments<'_>) {
        self.debug.write_fmt(args);
    }

    /// Record which session the calling thread now works for.
    pub fn switch_session(session: Option<Arc<SessionIdentity>>) {
        assembler::switch_session(session);
    }

    pub fn current_session() -> Option<Arc<SessionIdentity>> {
        assembler::current_session()
    }

    pub fn session_start(&self, session: &SessionIdentity) {
        self.broadcaster.targets().session_start(session);
    }

    pub fn session_stop(&self, session: &SessionIdentity) {
        self.broadcaster.targets().session_stop(session);
    }

    /// Reopen every target and both direct files (log rotation).
    pub fn reopen(&self) {
        self.broadcaster.targets().reopen_all();
        let _ = self.emerg.reopen();
        let _ = self.debug.reopen();
    }

    /// Apply a reloaded `[log]` section. Targets and the chunk pool bound are
    /// fixed at build time and are not affected.
    pub fn apply_config(&self, config: &LogConfig) {
        self.set_level(config.level);
        let _ = self.emerg.configure(config.log_emerg.as_deref());
        let _ = self.debug.configure(config.log_debug.as_deref());
    }

    pub fn targets(&self) -> &TargetRegistry {
        self.broadcaster.targets()
    }

    pub fn pool(&self) -> &ChunkPool {
        self.assembler.pool()
    }

    fn dispatch(&self, level: Level, args: fmt::Arguments<'_>, scoped: bool) {
        if !self.enabled(level) {
            return;
        }

        match self.assembler.push(level, args) {
            Ok(None) => {}
            Ok(Some(body)) => {
                let session = if scoped { assembler::current_session() } else { None };
                self.debug.write_message(&body, session.as_deref());
                metrics::record_log_message(body.level());
                self.broadcaster.complete(body, session.as_deref());
            }
            Err(LogError::PoolExhausted { .. }) => {
                self.emerg.write_fmt(format_args!("log: out of memory\n"));
                metrics::record_log_exhausted("chunk");
            }
            Err(_) => {}
        }
    }
}
