use super::store::{KeyValueStore, StoreError, LAST_CLEAR_DATE_KEY};
use std::collections::VecDeque;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    Set(String),
    Remove,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingWrite {
    pub key: String,
    pub op: WriteOp,
}

/// FIFO of store writes that haven't landed yet.
///
/// The store only ever sees a prefix of the queued writes, in order. A write
/// that fails stays at the front and blocks everything queued after it until
/// a later flush gets it through.
///
/// A queued day marker splits the queue: a new write may replace an earlier
/// write of the same key only when no marker sits between them, so each key
/// appears at most once per marker.
#[derive(Debug, Default)]
pub struct Outbox {
    queue: VecDeque<PendingWrite>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue_set(&mut self, key: &str, value: String) {
        self.push(key, WriteOp::Set(value));
    }

    pub fn enqueue_remove(&mut self, key: &str) {
        self.push(key, WriteOp::Remove);
    }

    fn push(&mut self, key: &str, op: WriteOp) {
        if let Some(idx) = self.collapse_index(key) {
            self.queue[idx].op = op;
            return;
        }
        self.queue.push_back(PendingWrite {
            key: key.to_string(),
            op,
        });
    }

    /// Latest entry for `key` not separated from the tail by a marker write.
    /// Markers themselves never absorb a later write.
    fn collapse_index(&self, key: &str) -> Option<usize> {
        for (idx, write) in self.queue.iter().enumerate().rev() {
            if write.key == LAST_CLEAR_DATE_KEY {
                return None;
            }
            if write.key == key {
                return Some(idx);
            }
        }
        None
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn is_pending(&self, key: &str) -> bool {
        self.queue.iter().any(|w| w.key == key)
    }

    pub fn pending(&self) -> impl Iterator<Item = &PendingWrite> {
        self.queue.iter()
    }

    /// Drain queued writes into the store until one fails.
    /// Returns the number of writes that landed.
    pub fn flush(&mut self, store: &mut dyn KeyValueStore) -> usize {
        let mut written = 0;

        while let Some(write) = self.queue.front() {
            let result: Result<(), StoreError> = match &write.op {
                WriteOp::Set(value) => store.set(&write.key, value),
                WriteOp::Remove => store.remove(&write.key),
            };

            match result {
                Ok(()) => {
                    log::debug!("Persisted {}", write.key);
                    self.queue.pop_front();
                    written += 1;
                }
                Err(e) => {
                    log::warn!(
                        "Write failed, {} write(s) kept for retry: {}",
                        self.queue.len(),
                        e
                    );
                    break;
                }
            }
        }

        written
    }
}
