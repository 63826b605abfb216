use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use push_queue_core::Envelope;

use crate::handler::SubscriberBoxed;
use crate::invariants::debug_assert_prune_shift;
use crate::shutdown::CancelSignal;

/// Per-subscriber position and state: where it is in the store, whether a
/// delivery is in flight, its handler, its cancellation signal, and its
/// private dead-letter queue.
///
/// `index` and `committed` are plain atomics rather than a single mutex:
/// the owning dispatch loop is the only writer of `committed` and the only
/// "forward" writer of `index` (via `advance`), while the TTL pruner is a
/// concurrent "backward" writer of `index` (via `shift_by`). Atomics let
/// both proceed without a cursor-wide lock, while the store lock held by
/// the pruner during the shift still gives I4's atomicity with respect to
/// the *store's* trim — the cursor arithmetic itself only needs to avoid
/// tearing, not a happens-before relationship with dispatch.
pub struct Cursor {
    pub subscriber_id: Uuid,
    pub handler: Arc<dyn SubscriberBoxed>,
    pub cancel: CancelSignal,
    index: AtomicUsize,
    committed: AtomicBool,
    dlq: Mutex<Vec<Envelope>>,
}

impl Cursor {
    pub fn new(subscriber_id: Uuid, handler: Arc<dyn SubscriberBoxed>, cancel: CancelSignal) -> Self {
        Self {
            subscriber_id,
            handler,
            cancel,
            index: AtomicUsize::new(0),
            committed: AtomicBool::new(true),
            dlq: Mutex::new(Vec::new()),
        }
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index.load(Ordering::Acquire)
    }

    #[inline]
    pub fn is_committed(&self) -> bool {
        self.committed.load(Ordering::Acquire)
    }

    pub(crate) fn mark_in_flight(&self) {
        self.committed.store(false, Ordering::Release);
    }

    /// Advances past the current envelope, marking the cursor committed.
    pub(crate) fn advance(&self) {
        self.index.fetch_add(1, Ordering::AcqRel);
        self.committed.store(true, Ordering::Release);
    }

    /// Rewinds to an explicit index (ReplayFrom). Caller has already
    /// verified the idle-at-tail guard.
    pub(crate) fn rewind_to(&self, index: usize) {
        self.index.store(index, Ordering::Release);
        self.committed.store(false, Ordering::Release);
    }

    /// Shifts the index down by `k` (floored at 0), called by the pruner
    /// for every live cursor after a successful `TrimExpired`.
    pub(crate) fn shift_by(&self, k: u64) {
        if k == 0 {
            return;
        }
        let k = k as usize;
        let mut current = self.index.load(Ordering::Acquire);
        loop {
            let shifted = current.saturating_sub(k);
            match self.index.compare_exchange_weak(
                current,
                shifted,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => {
                    debug_assert_prune_shift!(current, k, shifted);
                    break;
                }
                Err(observed) => current = observed,
            }
        }
    }

    pub(crate) fn push_dlq(&self, envelope: Envelope) {
        self.dlq.lock().unwrap().push(envelope);
    }

    pub(crate) fn remove_dlq_by_id(&self, id: Uuid) {
        self.dlq.lock().unwrap().retain(|e| e.id() != id);
    }

    pub fn dlq_snapshot(&self) -> Vec<Envelope> {
        self.dlq.lock().unwrap().clone()
    }

    pub fn dlq_len(&self) -> usize {
        self.dlq.lock().unwrap().len()
    }
}
