//! Fan-out of completed lines to every registered target.

use std::sync::Arc;

use crate::log::direct::DirectFile;
use crate::log::message::{MessageBody, MessageClone, SessionIdentity};
use crate::log::pool::ChunkPool;
use crate::log::target::TargetRegistry;
use crate::observability::metrics;

/// Hands one clone of each completed line to each target, in registration order.
#[derive(Debug)]
pub struct Broadcaster {
    targets: TargetRegistry,
    pool: ChunkPool,
    emerg: Arc<DirectFile>,
}

impl Broadcaster {
    pub fn new(targets: TargetRegistry, pool: ChunkPool, emerg: Arc<DirectFile>) -> Self {
        Self {
            targets,
            pool,
            emerg,
        }
    }

    pub fn targets(&self) -> &TargetRegistry {
        &self.targets
    }

    /// Dispatch `body` and release the caller's reference.
    ///
    /// Stops at the first clone that cannot be allocated; returns how many
    /// targets received the line.
    pub fn complete(&self, body: Arc<MessageBody>, session: Option<&SessionIdentity>) -> usize {
        let mut delivered = 0;
        for target in self.targets.iter() {
            let clone = match MessageClone::new(&body, &self.pool) {
                Ok(clone) => clone,
                Err(_) => {
                    self.emerg.write_fmt(format_args!("log: out of memory\n"));
                    metrics::record_log_exhausted("clone");
                    break;
                }
            };
            target.log(clone, session);
            delivered += 1;
        }
        delivered
    }
}
