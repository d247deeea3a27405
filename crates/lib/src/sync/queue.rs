//! Offline queue for metadata updates
//!
//! Updates written while no relay is reachable pile up here; the host shows
//! a "N changes pending" indicator from [`PendingQueue::pending_count`].
//! Flushing is best-effort: a failed push logs a warning and leaves the
//! record (and everything behind it) queued for the next attempt.

use std::sync::Mutex;

use tracing::{debug, warn};

use super::types::MetadataUpdateRecord;
use crate::Result;

/// Transport collaborator that receives flushed records.
pub trait SyncSink: Send + Sync {
    /// Push one record to the relay.
    fn push(&self, record: &MetadataUpdateRecord) -> Result<()>;
}

/// FIFO queue of records awaiting a reachable relay.
#[derive(Default)]
pub struct PendingQueue {
    items: Mutex<Vec<MetadataUpdateRecord>>,
}

impl PendingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record to the back of the queue.
    pub fn enqueue(&self, record: MetadataUpdateRecord) {
        self.items.lock().unwrap().push(record);
    }

    /// Number of records awaiting flush.
    pub fn pending_count(&self) -> usize {
        self.items.lock().unwrap().len()
    }

    /// Push queued records to the sink in order, stopping at the first
    /// failure. Returns the number of records flushed; sync failures are
    /// never fatal.
    pub fn flush(&self, sink: &dyn SyncSink) -> usize {
        let mut items = self.items.lock().unwrap();
        let mut flushed = 0;

        while let Some(record) = items.first() {
            match sink.push(record) {
                Ok(()) => {
                    items.remove(0);
                    flushed += 1;
                }
                Err(e) => {
                    warn!(
                        error = %e,
                        remaining = items.len(),
                        "sync flush interrupted, records stay queued"
                    );
                    break;
                }
            }
        }

        if flushed > 0 {
            debug!(flushed, "flushed pending metadata records");
        }
        flushed
    }
}
