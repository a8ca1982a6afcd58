//! Plain-text file target.
//!
//! Each line is written as
//! `[YYYY-MM-DD HH:MM:SS]: <level>: [ifname: sessionid: ]<text>`.
//! The prefix goes into the clone's header chunk; whatever does not fit in
//! one chunk is written straight after it.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::log::direct::DirectFile;
use crate::log::message::{MessageClone, SessionIdentity};
use crate::log::target::LogTarget;
use crate::log::LogError;

/// Appends every line to one file; reopened on SIGHUP.
#[derive(Debug)]
pub struct FileTarget {
    file: DirectFile,
}

impl FileTarget {
    /// Open `path` for appending, creating it if needed.
    pub fn open(path: &Path) -> Result<Self, LogError> {
        let file = DirectFile::new("log-file");
        file.configure(Some(path))?;
        Ok(Self { file })
    }

    pub fn path(&self) -> Option<PathBuf> {
        self.file.path()
    }
}

fn line_prefix(msg: &MessageClone, session: Option<&SessionIdentity>) -> String {
    let stamp: DateTime<Local> = msg.timestamp().into();
    let mut prefix = format!("[{}]: {}: ", stamp.format("%Y-%m-%d %H:%M:%S"), msg.level());
    if let Some(session) = session {
        prefix.push_str(&session.prefix());
    }
    prefix
}

impl LogTarget for FileTarget {
    fn name(&self) -> &str {
        "log-file"
    }

    fn log(&self, mut msg: MessageClone, session: Option<&SessionIdentity>) {
        let prefix = line_prefix(&msg, session);
        let taken = msg.header_mut().push_str(&prefix);

        let mut line = Vec::with_capacity(prefix.len() + msg.body().len());
        line.extend_from_slice(msg.header().as_bytes());
        line.extend_from_slice(&prefix.as_bytes()[taken..]);
        let _ = msg.body().write_to(&mut line);
        self.file.write_bytes(&line);
    }

    fn reopen(&self) {
        let _ = self.file.reopen();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::message::PendingMessage;
    use crate::log::pool::ChunkPool;
    use crate::log::Level;
    use std::sync::Arc;

    fn clone_of(pool: &ChunkPool, level: Level, text: &str) -> MessageClone {
        let mut pending = PendingMessage::new(level);
        pending.append(pool, text.as_bytes()).unwrap();
        let body = pending.complete();
        MessageClone::new(&body, pool).unwrap()
    }

    #[test]
    fn test_line_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("concentrator.log");
        let target = FileTarget::open(&path).unwrap();
        let pool = ChunkPool::unbounded();

        let session = SessionIdentity::new("ppp0", "0123456789abcdef");
        target.log(clone_of(&pool, Level::Info2, "ipcp up\n"), Some(&session));
        target.log(clone_of(&pool, Level::Error, "boom\n"), None);

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        // "[YYYY-MM-DD HH:MM:SS]" is 21 characters.
        assert!(lines[0].starts_with('['));
        assert_eq!(&lines[0][20..], "]: info: ppp0: 0123456789abcdef: ipcp up");
        assert_eq!(&lines[1][20..], "]: error: boom");
        assert_eq!(pool.outstanding(), 0);
    }

    #[test]
    fn test_long_prefix_spills_past_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("concentrator.log");
        let target = FileTarget::open(&path).unwrap();
        let pool = ChunkPool::unbounded();

        let session = SessionIdentity::new("i".repeat(100), "s".repeat(40));
        target.log(clone_of(&pool, Level::Warn, "x\n"), Some(&session));

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.ends_with(&format!("{}: {}: x\n", "i".repeat(100), "s".repeat(40))));
    }

    #[test]
    fn test_reopen_after_rename() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("concentrator.log");
        let rotated = dir.path().join("concentrator.log.1");
        let target = Arc::new(FileTarget::open(&path).unwrap());
        let pool = ChunkPool::unbounded();

        target.log(clone_of(&pool, Level::Msg, "before\n"), None);
        std::fs::rename(&path, &rotated).unwrap();
        target.log(clone_of(&pool, Level::Msg, "still old\n"), None);
        target.reopen();
        target.log(clone_of(&pool, Level::Msg, "after\n"), None);

        let old = std::fs::read_to_string(&rotated).unwrap();
        assert!(old.contains("before") && old.contains("still old"));
        let fresh = std::fs::read_to_string(&path).unwrap();
        assert!(fresh.ends_with("]: msg: after\n"));
        assert!(!fresh.contains("before"));
    }

    #[test]
    fn test_open_failure() {
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("nope").join("x.log");
        assert!(matches!(FileTarget::open(&bad), Err(LogError::Io(_))));
    }
}
