//! Log targets and their registry.
//!
//! # Responsibilities
//! - Define the capability set a target may implement
//! - Keep targets in registration order
//!
//! # Design Decisions
//! - Every capability has a default, so a target implements only what it needs
//! - The registry is filled before the logger is built and never changes after,
//!   so iteration needs no lock

use std::sync::Arc;

use crate::log::message::{MessageClone, SessionIdentity};

/// A consumer of completed log lines.
pub trait LogTarget: Send + Sync {
    /// Short name used in diagnostics.
    fn name(&self) -> &str {
        "target"
    }

    /// Consume one line. The clone is released when this returns unless the
    /// target keeps it.
    fn log(&self, msg: MessageClone, session: Option<&SessionIdentity>) {
        let _ = session;
        msg.release();
    }

    /// A session became active.
    fn session_start(&self, _session: &SessionIdentity) {}

    /// A session finished.
    fn session_stop(&self, _session: &SessionIdentity) {}

    /// Reopen underlying files (log rotation).
    fn reopen(&self) {}
}

/// Ordered, immutable list of registered targets.
#[derive(Clone)]
pub struct TargetRegistry {
    targets: Arc<[Arc<dyn LogTarget>]>,
}

impl TargetRegistry {
    pub fn new(targets: Vec<Arc<dyn LogTarget>>) -> Self {
        Self {
            targets: targets.into(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn LogTarget>> {
        self.targets.iter()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn reopen_all(&self) {
        for target in self.iter() {
            tracing::debug!(target_name = target.name(), "reopening log target");
            target.reopen();
        }
    }

    pub fn session_start(&self, session: &SessionIdentity) {
        for target in self.iter() {
            target.session_start(session);
        }
    }

    pub fn session_stop(&self, session: &SessionIdentity) {
        for target in self.iter() {
            target.session_stop(session);
        }
    }
}

impl Default for TargetRegistry {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl std::fmt::Debug for TargetRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.targets.iter().map(|t| t.name()))
            .finish()
    }
}
