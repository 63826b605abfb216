use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for store-level activity.
///
/// All methods use `Ordering::Relaxed`: these are purely statistical counters
/// with no control-flow dependency on their exact value, and no
/// happens-before relationship to establish (unlike the store's own mutex,
/// which does the actual coordination).
#[derive(Debug, Default)]
pub struct StoreMetrics {
    messages_enqueued: AtomicU64,
    messages_pruned: AtomicU64,
    prune_cycles: AtomicU64,
}

impl StoreMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_enqueue(&self) {
        self.messages_enqueued.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_prune(&self, removed: u64) {
        if removed > 0 {
            self.messages_pruned.fetch_add(removed, Ordering::Relaxed);
            self.prune_cycles.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn messages_enqueued(&self) -> u64 {
        self.messages_enqueued.load(Ordering::Relaxed)
    }

    pub fn messages_pruned(&self) -> u64 {
        self.messages_pruned.load(Ordering::Relaxed)
    }

    pub fn prune_cycles(&self) -> u64 {
        self.prune_cycles.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> StoreMetricsSnapshot {
        StoreMetricsSnapshot {
            messages_enqueued: self.messages_enqueued(),
            messages_pruned: self.messages_pruned(),
            prune_cycles: self.prune_cycles(),
        }
    }
}

/// A point-in-time copy of [`StoreMetrics`], safe to hand to diagnostics code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreMetricsSnapshot {
    pub messages_enqueued: u64,
    pub messages_pruned: u64,
    pub prune_cycles: u64,
}
