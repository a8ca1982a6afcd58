//! Per-thread line assembly.
//!
//! # Responsibilities
//! - Format each emission into a bounded per-thread scratch buffer
//! - Accumulate fragments into the thread's pending message until a newline
//! - Hand back the frozen body once the line is complete
//! - Track the session the current thread is working for
//!
//! # Design Decisions
//! - Pending messages live in thread-local storage keyed by assembler id, so
//!   several loggers can coexist on one thread
//! - Output longer than the scratch bound is truncated, never an error
//! - No thread-local borrow is held while a completed line is dispatched
//! - Dropping an assembler frees the dropping thread's unfinished line;
//!   lines left on other threads are freed when those threads exit

use std::cell::RefCell;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::log::message::{MessageBody, PendingMessage, SessionIdentity};
use crate::log::pool::ChunkPool;
use crate::log::{Level, LogError};

/// Scratch buffer size; formatted output keeps at most `LOG_MAX_SIZE - 1` bytes.
pub const LOG_MAX_SIZE: usize = 4096;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static PENDING: RefCell<Vec<(u64, PendingMessage)>> = const { RefCell::new(Vec::new()) };
    static SCRATCH: RefCell<String> = RefCell::new(String::with_capacity(LOG_MAX_SIZE));
    static CURRENT_SESSION: RefCell<Option<Arc<SessionIdentity>>> = const { RefCell::new(None) };
}

/// Set the session the calling thread is now working for.
pub fn switch_session(session: Option<Arc<SessionIdentity>>) {
    CURRENT_SESSION.with(|current| *current.borrow_mut() = session);
}

/// Session the calling thread is working for, if any.
pub fn current_session() -> Option<Arc<SessionIdentity>> {
    CURRENT_SESSION.with(|current| current.borrow().clone())
}

/// Builds lines out of partial writes, one pending message per thread.
#[derive(Debug)]
pub struct Assembler {
    id: u64,
    pool: ChunkPool,
}

impl Assembler {
    pub fn new(pool: ChunkPool) -> Self {
        Self {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            pool,
        }
    }

    pub fn pool(&self) -> &ChunkPool {
        &self.pool
    }

    /// Append formatted text to this thread's pending line.
    ///
    /// Returns the completed body when the text ends with a newline. On chunk
    /// exhaustion the whole pending line is discarded.
    pub fn push(
        &self,
        level: Level,
        args: fmt::Arguments<'_>,
    ) -> Result<Option<Arc<MessageBody>>, LogError> {
        SCRATCH.with(|scratch| match scratch.try_borrow_mut() {
            Ok(mut buf) => self.push_formatted(level, &mut buf, args),
            Err(_) => self.push_formatted(level, &mut String::new(), args),
        })
    }

    /// Whether the calling thread holds an unfinished line for this assembler.
    pub fn has_pending(&self) -> bool {
        PENDING.with(|slots| slots.borrow().iter().any(|(id, _)| *id == self.id))
    }

    /// Drop the calling thread's unfinished line, if any.
    pub fn discard(&self) {
        PENDING.with(|slots| slots.borrow_mut().retain(|(id, _)| *id != self.id));
    }

    fn push_formatted(
        &self,
        level: Level,
        buf: &mut String,
        args: fmt::Arguments<'_>,
    ) -> Result<Option<Arc<MessageBody>>, LogError> {
        buf.clear();
        let _ = fmt::write(
            &mut Bounded {
                buf,
                limit: LOG_MAX_SIZE - 1,
            },
            args,
        );
        if buf.is_empty() {
            return Ok(None);
        }
        let complete = buf.ends_with('\n');

        PENDING.with(|slots| {
            let mut slots = slots.try_borrow_mut().map_err(|_| LogError::Reentrant)?;
            let idx = match slots.iter().position(|(id, _)| *id == self.id) {
                Some(idx) => idx,
                None => {
                    slots.push((self.id, PendingMessage::new(level)));
                    slots.len() - 1
                }
            };

            if let Err(e) = slots[idx].1.append(&self.pool, buf.as_bytes()) {
                slots.swap_remove(idx);
                return Err(e);
            }

            if complete {
                let (_, pending) = slots.swap_remove(idx);
                Ok(Some(pending.complete()))
            } else {
                Ok(None)
            }
        })
    }
}

impl Drop for Assembler {
    fn drop(&mut self) {
        // May run during thread-local teardown or inside a dispatch.
        let _ = PENDING.try_with(|slots| {
            if let Ok(mut slots) = slots.try_borrow_mut() {
                slots.retain(|(id, _)| *id != self.id);
            }
        });
    }
}

/// `fmt::Write` adapter that silently truncates at `limit` bytes.
struct Bounded<'a> {
    buf: &'a mut String,
    limit: usize,
}

impl fmt::Write for Bounded<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let room = self.limit.saturating_sub(self.buf.len());
        if s.len() <= room {
            self.buf.push_str(s);
        } else {
            let mut end = room;
            while !s.is_char_boundary(end) {
                end -= 1;
            }
            self.buf.push_str(&s[..end]);
        }
        Ok(())
    }
}
