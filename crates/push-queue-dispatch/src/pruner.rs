use std::sync::Arc;
use std::time::{Duration, SystemTime};

use dashmap::DashMap;
use push_queue_core::MessageStore;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::cursor::Cursor;
use crate::shutdown::CancelSignal;

/// Tick cadence for the background pruner. Not configurable: it only
/// governs how promptly expired envelopes are noticed, not correctness —
/// I4 holds regardless of how often this fires.
const PRUNE_INTERVAL: Duration = Duration::from_millis(100);

/// Spawns the TTL pruner: each tick, trims envelopes older than `ttl` from
/// the store's head and shifts every live cursor's index down by the
/// number removed, under the store's own lock so the trim and the shift
/// are atomic with respect to each other (I4).
pub(crate) fn spawn_pruner(
    store: Arc<MessageStore>,
    cursors: Arc<DashMap<Uuid, Arc<Cursor>>>,
    ttl: Duration,
    cancel: CancelSignal,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(PRUNE_INTERVAL);

        loop {
            tokio::select! {
                _ = interval.tick() => {}
                _ = cancel.cancelled() => break,
            }

            let cutoff = match SystemTime::now().checked_sub(ttl) {
                Some(cutoff) => cutoff,
                None => {
                    log::warn!("ttl subtraction underflowed system clock; skipping this prune cycle");
                    continue;
                }
            };

            let removed = store.trim_expired_and(cutoff, |removed| {
                if removed > 0 {
                    for entry in cursors.iter() {
                        entry.value().shift_by(removed);
                    }
                }
            });

            if removed > 0 {
                log::debug!("pruned {removed} expired envelope(s), shifted {} cursor(s)", cursors.len());
            } else {
                log::trace!("prune cycle: nothing expired");
            }
        }

        log::info!("ttl pruner stopped");
    })
}
