use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::SystemTime;
use uuid::Uuid;

use crate::envelope::Envelope;
use crate::invariants::debug_assert_tail_monotone;
use crate::metrics::StoreMetrics;

/// The ordered, append-only, head-trimmed log shared by every subscriber.
///
/// Guarded by a single `std::sync::Mutex`. A `VecDeque` gives O(1) amortized
/// append-at-tail and trim-at-head, which is the whole access pattern this
/// store needs — no lock-free ring buffer is warranted here because I4
/// (prune preservation) requires pruning to be atomic with respect to
/// cursor-index arithmetic that lives one layer up, in the dispatch crate;
/// a single mutex is what makes that critical section possible.
pub struct MessageStore {
    envelopes: Mutex<VecDeque<Envelope>>,
    metrics: StoreMetrics,
}

impl MessageStore {
    pub fn new() -> Self {
        Self {
            envelopes: Mutex::new(VecDeque::new()),
            metrics: StoreMetrics::new(),
        }
    }

    /// Appends a payload as a fresh envelope. Returns the new envelope's id.
    /// Never fails.
    pub fn append(&self, payload: String) -> Uuid {
        let envelope = Envelope::new(payload);
        let id = envelope.id();

        let mut guard = self.envelopes.lock().unwrap();
        let old_len = guard.len();
        guard.push_back(envelope);
        debug_assert_tail_monotone!(old_len, guard.len());
        drop(guard);

        self.metrics.record_enqueue();
        id
    }

    /// Returns a clone of the envelope at `index`, or `None` if `index` is at
    /// or beyond the current logical size.
    pub fn read_at(&self, index: usize) -> Option<Envelope> {
        self.envelopes.lock().unwrap().get(index).cloned()
    }

    /// Returns the current logical size of the store.
    pub fn len(&self) -> usize {
        self.envelopes.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Linear scan for the logical index of the envelope with the given id.
    pub fn find_index_by_id(&self, id: Uuid) -> Option<usize> {
        self.envelopes
            .lock()
            .unwrap()
            .iter()
            .position(|e| e.id() == id)
    }

    /// Overwrites the payload of the envelope with the given id, preserving
    /// its id and `created_at`. Returns `false` if the id is absent.
    pub fn set_payload(&self, id: Uuid, payload: String) -> bool {
        let mut guard = self.envelopes.lock().unwrap();
        match guard.iter_mut().find(|e| e.id() == id) {
            Some(envelope) => {
                envelope.set_payload(payload);
                true
            }
            None => false,
        }
    }

    /// Returns a shallow copy of the current log, for diagnostics.
    pub fn snapshot(&self) -> Vec<Envelope> {
        self.envelopes.lock().unwrap().iter().cloned().collect()
    }

    /// Removes envelopes from the head whose `created_at < cutoff`, stopping
    /// at the first non-expired envelope. `on_removed` runs *while the store
    /// lock is still held*, so callers can shift cursor indices atomically
    /// with respect to the trim (I4) before any other producer or dispatch
    /// loop can observe an inconsistent state.
    ///
    /// Returns the number of envelopes removed.
    pub fn trim_expired_and<F>(&self, cutoff: SystemTime, on_removed: F) -> u64
    where
        F: FnOnce(u64),
    {
        let mut guard = self.envelopes.lock().unwrap();
        let mut removed = 0u64;
        while let Some(front) = guard.front() {
            if front.created_at() < cutoff {
                guard.pop_front();
                removed += 1;
            } else {
                break;
            }
        }
        on_removed(removed);
        drop(guard);

        if removed > 0 {
            log::trace!("trimmed {removed} expired envelope(s) from store head");
        }
        self.metrics.record_prune(removed);
        removed
    }

    /// Convenience wrapper over [`trim_expired_and`](Self::trim_expired_and)
    /// for callers with no cursors to shift (e.g. unit tests).
    pub fn trim_expired(&self, cutoff: SystemTime) -> u64 {
        self.trim_expired_and(cutoff, |_| {})
    }

    pub fn metrics(&self) -> &StoreMetrics {
        &self.metrics
    }
}

impl Default for MessageStore {
    fn default() -> Self {
        Self::new()
    }
}
