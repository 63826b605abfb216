use std::time::Duration;

use push_queue_core::Envelope;
use uuid::Uuid;

/// Diagnostic snapshot of one subscriber's cursor, returned by
/// [`crate::Queue::get_state`].
///
/// Per-subscriber fields are read without cross-coordination with the
/// buffer snapshot taken alongside them — they may be slightly stale by
/// the time the caller observes them, which the design accepts as fine
/// for diagnostics.
#[derive(Debug, Clone)]
pub struct CursorState {
    pub subscriber_id: Uuid,
    pub index: usize,
    pub committed: bool,
    pub dlq_len: usize,
}

/// A consistent point-in-time view of the queue, taken under the store
/// lock for the buffer itself.
#[derive(Debug, Clone)]
pub struct QueueState {
    pub buffer: Vec<Envelope>,
    pub cursors: Vec<CursorState>,
    pub ttl: Duration,
}
