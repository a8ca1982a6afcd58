//! Pending, completed and cloned log messages.
//!
//! A [`PendingMessage`] is owned by one worker thread while its line is being
//! assembled. Completing it freezes the chunks into a [`MessageBody`] behind an
//! `Arc`; every target receives a [`MessageClone`] holding its own header chunk
//! and a reference to that shared body. The body (and its chunks) is released
//! when the last reference goes away.

use std::io::{self, Write};
use std::sync::Arc;
use std::time::SystemTime;

use crate::log::pool::{Chunk, ChunkPool, LOG_CHUNK_SIZE};
use crate::log::{Level, LogError};

/// Identity of the session a line belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionIdentity {
    pub ifname: String,
    pub sessionid: String,
}

impl SessionIdentity {
    pub fn new(ifname: impl Into<String>, sessionid: impl Into<String>) -> Self {
        Self {
            ifname: ifname.into(),
            sessionid: sessionid.into(),
        }
    }

    /// `ifname: sessionid: ` prefix used by file-style outputs.
    pub fn prefix(&self) -> String {
        format!("{}: {}: ", self.ifname, self.sessionid)
    }
}

/// A line under construction on one worker thread.
#[derive(Debug)]
pub struct PendingMessage {
    level: Level,
    timestamp: SystemTime,
    chunks: Vec<Chunk>,
}

impl PendingMessage {
    pub fn new(level: Level) -> Self {
        Self {
            level,
            timestamp: SystemTime::now(),
            chunks: Vec::new(),
        }
    }

    /// Split `text` into pooled chunks and append them.
    ///
    /// On failure the chunks taken by this call are returned to the pool; the
    /// caller is expected to discard the whole message.
    pub fn append(&mut self, pool: &ChunkPool, text: &[u8]) -> Result<(), LogError> {
        let mut added = Vec::with_capacity(text.len().div_ceil(LOG_CHUNK_SIZE));
        for piece in text.chunks(LOG_CHUNK_SIZE) {
            let mut chunk = pool.alloc()?;
            chunk.push_bytes(piece);
            added.push(chunk);
        }
        self.chunks.append(&mut added);
        Ok(())
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Freeze the message. No chunk can be added afterwards.
    pub fn complete(self) -> Arc<MessageBody> {
        Arc::new(MessageBody {
            level: self.level,
            timestamp: self.timestamp,
            chunks: self.chunks,
        })
    }
}

/// Immutable text of a completed line, shared by every clone.
#[derive(Debug)]
pub struct MessageBody {
    level: Level,
    timestamp: SystemTime,
    chunks: Vec<Chunk>,
}

impl MessageBody {
    pub fn level(&self) -> Level {
        self.level
    }

    pub fn timestamp(&self) -> SystemTime {
        self.timestamp
    }

    /// Chunk payloads in order.
    pub fn chunks(&self) -> impl Iterator<Item = &[u8]> {
        self.chunks.iter().map(Chunk::as_bytes)
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Total length in bytes.
    pub fn len(&self) -> usize {
        self.chunks.iter().map(Chunk::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Concatenated text (lossy if a chunk boundary split invalid UTF-8).
    pub fn text(&self) -> String {
        let mut bytes = Vec::with_capacity(self.len());
        for chunk in self.chunks() {
            bytes.extend_from_slice(chunk);
        }
        String::from_utf8_lossy(&bytes).into_owned()
    }

    /// Write every chunk to `w` without joining them first.
    pub fn write_to<W: Write + ?Sized>(&self, w: &mut W) -> io::Result<()> {
        for chunk in self.chunks() {
            w.write_all(chunk)?;
        }
        Ok(())
    }
}

/// Per-target view of a completed message.
///
/// Dropping the clone (or calling [`MessageClone::release`]) returns its header
/// chunk and releases one reference to the shared body.
#[derive(Debug)]
pub struct MessageClone {
    level: Level,
    timestamp: SystemTime,
    header: Chunk,
    body: Arc<MessageBody>,
}

impl MessageClone {
    /// Allocate a header chunk and take a reference to `body`.
    pub fn new(body: &Arc<MessageBody>, pool: &ChunkPool) -> Result<Self, LogError> {
        let header = pool.alloc()?;
        Ok(Self {
            level: body.level,
            timestamp: body.timestamp,
            header,
            body: Arc::clone(body),
        })
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn timestamp(&self) -> SystemTime {
        self.timestamp
    }

    /// Target-owned prefix, empty on arrival.
    pub fn header(&self) -> &Chunk {
        &self.header
    }

    pub fn header_mut(&mut self) -> &mut Chunk {
        &mut self.header
    }

    pub fn body(&self) -> &MessageBody {
        &self.body
    }

    /// Live references to the shared body, including this one.
    pub fn refs(&self) -> usize {
        Arc::strong_count(&self.body)
    }

    /// Write header then body to `w`.
    pub fn write_to<W: Write + ?Sized>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(self.header.as_bytes())?;
        self.body.write_to(w)
    }

    /// Give the clone back. Equivalent to dropping it.
    pub fn release(self) {}
}
