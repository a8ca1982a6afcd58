//! Directly written files: the emergency file and the raw debug file.
//!
//! These bypass cloning and fan-out entirely. Writes are serialized by a mutex
//! so concurrent lines do not interleave.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::log::message::{MessageBody, SessionIdentity};
use crate::log::LogError;

struct OpenFile {
    path: PathBuf,
    file: File,
}

/// An optional append-mode file that can be re-pointed on reload.
pub struct DirectFile {
    name: &'static str,
    inner: Mutex<Option<OpenFile>>,
}

impl DirectFile {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            inner: Mutex::new(None),
        }
    }

    /// Point the file at `path`, or close it for `None`.
    ///
    /// If opening fails the previous file stays in place and the error is
    /// reported through `tracing`.
    pub fn configure(&self, path: Option<&Path>) -> Result<(), LogError> {
        let Some(path) = path else {
            self.lock().take();
            return Ok(());
        };

        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => {
                *self.lock() = Some(OpenFile {
                    path: path.to_path_buf(),
                    file,
                });
                Ok(())
            }
            Err(e) => {
                tracing::error!(file = self.name, path = ?path, error = %e, "log: open failed");
                Err(LogError::Io(e))
            }
        }
    }

    /// Reopen the current path (after rotation).
    pub fn reopen(&self) -> Result<(), LogError> {
        let path = self.path();
        match path {
            Some(path) => self.configure(Some(&path)),
            None => Ok(()),
        }
    }

    pub fn path(&self) -> Option<PathBuf> {
        self.lock().as_ref().map(|f| f.path.clone())
    }

    pub fn is_open(&self) -> bool {
        self.lock().is_some()
    }

    /// Write formatted text as-is. A closed file swallows the write.
    pub fn write_fmt(&self, args: fmt::Arguments<'_>) {
        if let Some(open) = self.lock().as_mut() {
            let _ = open.file.write_fmt(args);
            let _ = open.file.flush();
        }
    }

    /// Write pre-assembled bytes in one call.
    pub fn write_bytes(&self, bytes: &[u8]) {
        if let Some(open) = self.lock().as_mut() {
            let _ = open.file.write_all(bytes);
            let _ = open.file.flush();
        }
    }

    /// Write a completed line, prefixed with the session identity if any.
    pub fn write_message(&self, body: &MessageBody, session: Option<&SessionIdentity>) {
        if let Some(open) = self.lock().as_mut() {
            let mut line = Vec::with_capacity(body.len() + 64);
            if let Some(session) = session {
                line.extend_from_slice(session.prefix().as_bytes());
            }
            let _ = body.write_to(&mut line);
            let _ = open.file.write_all(&line);
            let _ = open.file.flush();
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<OpenFile>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl fmt::Debug for DirectFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectFile")
            .field("name", &self.name)
            .field("path", &self.path())
            .finish()
    }
}
