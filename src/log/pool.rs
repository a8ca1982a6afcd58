//! Fixed-size chunk pool.
//!
//! Chunks are byte buffers of at most [`LOG_CHUNK_SIZE`] bytes. Dropping a
//! chunk returns its buffer to the pool's free list. A bounded pool refuses
//! to hand out more than `capacity` chunks at once, which is how exhaustion
//! surfaces to the assembler and broadcaster.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::log::LogError;

/// Maximum bytes carried by one chunk.
pub const LOG_CHUNK_SIZE: usize = 128;

struct PoolInner {
    free: Mutex<Vec<Vec<u8>>>,
    outstanding: AtomicUsize,
    capacity: usize,
}

/// Shared pool of chunk buffers.
#[derive(Clone)]
pub struct ChunkPool {
    inner: Arc<PoolInner>,
}

impl ChunkPool {
    /// Create a pool; `capacity == 0` means unbounded.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(PoolInner {
                free: Mutex::new(Vec::new()),
                outstanding: AtomicUsize::new(0),
                capacity,
            }),
        }
    }

    pub fn unbounded() -> Self {
        Self::new(0)
    }

    /// Take an empty chunk from the pool.
    pub fn alloc(&self) -> Result<Chunk, LogError> {
        let capacity = self.inner.capacity;
        let mut current = self.inner.outstanding.load(Ordering::Relaxed);
        loop {
            if capacity != 0 && current >= capacity {
                return Err(LogError::PoolExhausted { capacity });
            }
            match self.inner.outstanding.compare_exchange_weak(
                current,
                current + 1,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(actual) => current = actual,
            }
        }

        let buf = self
            .inner
            .free
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop()
            .unwrap_or_else(|| Vec::with_capacity(LOG_CHUNK_SIZE));

        Ok(Chunk {
            buf,
            pool: Arc::clone(&self.inner),
        })
    }

    /// Chunks currently handed out.
    pub fn outstanding(&self) -> usize {
        self.inner.outstanding.load(Ordering::Acquire)
    }

    /// Buffers waiting on the free list.
    pub fn idle(&self) -> usize {
        self.inner.free.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }
}

impl std::fmt::Debug for ChunkPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkPool")
            .field("capacity", &self.inner.capacity)
            .field("outstanding", &self.outstanding())
            .finish()
    }
}

/// One pooled fragment of line text.
pub struct Chunk {
    buf: Vec<u8>,
    pool: Arc<PoolInner>,
}

impl Chunk {
    /// Append as much of `bytes` as fits; returns how many were taken.
    pub fn push_bytes(&mut self, bytes: &[u8]) -> usize {
        let room = LOG_CHUNK_SIZE - self.buf.len();
        let taken = bytes.len().min(room);
        self.buf.extend_from_slice(&bytes[..taken]);
        taken
    }

    /// Append as much of `s` as fits without splitting a character.
    pub fn push_str(&mut self, s: &str) -> usize {
        let room = LOG_CHUNK_SIZE - self.buf.len();
        let mut end = s.len().min(room);
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        self.buf.extend_from_slice(&s.as_bytes()[..end]);
        end
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn clear(&mut self) {
        self.buf.clear();
    }
}

impl Drop for Chunk {
    fn drop(&mut self) {
        let mut buf = std::mem::take(&mut self.buf);
        buf.clear();
        self.pool
            .free
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(buf);
        self.pool.outstanding.fetch_sub(1, Ordering::AcqRel);
    }
}

impl std::fmt::Debug for Chunk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Chunk")
            .field(&String::from_utf8_lossy(&self.buf))
            .finish()
    }
}
