use std::sync::Arc;

use dashmap::DashMap;
use uuid::Uuid;

use crate::cursor::Cursor;
use crate::handler::DeliveryResult;

/// Replays a single DLQ entry for one subscriber. Mirrors the normal
/// failure surface on a second failure (calls `on_message_failed` so the
/// application sees the same callback shape it would from the dispatch
/// loop) but never removes the entry unless the replay Acks.
///
/// No-op if the subscriber has no DLQ entry with `message_id`.
pub(crate) async fn replay_from_dlq(cursor: &Cursor, message_id: Uuid) {
    let found = cursor
        .dlq_snapshot()
        .into_iter()
        .find(|envelope| envelope.id() == message_id);

    let Some(envelope) = found else {
        log::warn!(
            "ReplayFromDlq: no dlq entry {message_id} for subscriber {}",
            cursor.subscriber_id
        );
        return;
    };

    replay_one(cursor, &envelope).await;
}

/// Replays every entry currently in a subscriber's DLQ, in insertion order,
/// against a stable snapshot — removals during the pass never perturb the
/// iteration.
pub(crate) async fn replay_all_dlq_messages(cursor: &Cursor) {
    for envelope in cursor.dlq_snapshot() {
        replay_one(cursor, &envelope).await;
    }
}

/// Fans `replay_all_dlq_messages` out to every live subscriber.
/// Fire-and-forget: a failure for one subscriber is logged, not surfaced,
/// and does not stop the fan-out.
pub(crate) async fn replay_all_dlq_subscribers(cursors: &DashMap<Uuid, Arc<Cursor>>) {
    let snapshot: Vec<Arc<Cursor>> = cursors.iter().map(|entry| entry.value().clone()).collect();
    for cursor in snapshot {
        replay_all_dlq_messages(&cursor).await;
    }
}

async fn replay_one(cursor: &Cursor, envelope: &push_queue_core::Envelope) {
    let result = cursor
        .handler
        .on_message_receive_boxed(envelope, cursor.subscriber_id, &cursor.cancel)
        .await;

    match result {
        Ok(DeliveryResult::Ack) => {
            cursor.remove_dlq_by_id(envelope.id());
            log::debug!(
                "replayed dlq entry {} for subscriber {} acked, removed from dlq",
                envelope.id(),
                cursor.subscriber_id
            );
        }
        Ok(DeliveryResult::Nack) => {
            log::warn!(
                "replayed dlq entry {} for subscriber {} nacked, leaving in dlq",
                envelope.id(),
                cursor.subscriber_id
            );
            let _ = cursor
                .handler
                .on_message_failed_boxed(envelope, cursor.subscriber_id, None, &cursor.cancel)
                .await;
        }
        Err(err) => {
            log::warn!(
                "replayed dlq entry {} for subscriber {} errored: {err}; leaving in dlq",
                envelope.id(),
                cursor.subscriber_id
            );
            let _ = cursor
                .handler
                .on_message_failed_boxed(envelope, cursor.subscriber_id, Some(&err), &cursor.cancel)
                .await;
        }
    }
}
