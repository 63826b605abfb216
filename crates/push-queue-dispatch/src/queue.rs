use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use push_queue_core::{MessageStore, QueueConfig};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::cursor::Cursor;
use crate::dispatch::spawn_dispatch_loop;
use crate::dlq;
use crate::error::QueueError;
use crate::handler::{Subscriber, SubscriberBoxed};
use crate::pruner::spawn_pruner;
use crate::shutdown::{CancelSignal, LinkedCancel};
use crate::state::{CursorState, QueueState};

struct SubscriberEntry {
    cursor: Arc<Cursor>,
    dispatch_handle: JoinHandle<()>,
    _link: LinkedCancel,
}

/// The push queue façade: composes the store, the subscriber registry, the
/// TTL pruner task and the per-subscriber dispatch loops behind the
/// operations named in the design (`Enqueue`, `Subscribe`, `Unsubscribe`,
/// `GetState`, `ChangeMessagePayload`, the `Replay*` family, `Dispose`).
///
/// Construction is the only fallible operation — every producer call on an
/// already-constructed `Queue` is infallible, with unknown ids absorbed as
/// silent, logged no-ops.
pub struct Queue {
    store: Arc<MessageStore>,
    subscribers: Arc<DashMap<Uuid, SubscriberEntry>>,
    /// Thin `id -> cursor` mirror the pruner reads on every tick. Kept in
    /// lockstep with `subscribers` by `subscribe`/`unsubscribe`/`dispose`,
    /// so the pruner never has to see the dispatch `JoinHandle` or the
    /// `LinkedCancel` that `SubscriberEntry` also owns.
    pruner_cursors: Arc<DashMap<Uuid, Arc<Cursor>>>,
    config: QueueConfig,
    root_cancel: CancelSignal,
    pruner_handle: JoinHandle<()>,
    disposed: AtomicBool,
}

impl Queue {
    /// Builds a queue from `config`, validating it first. Spawns the TTL
    /// pruner immediately; it runs for the queue's lifetime.
    pub fn new(config: QueueConfig) -> Result<Self, QueueError> {
        config.validate()?;

        let store = Arc::new(MessageStore::new());
        let subscribers: Arc<DashMap<Uuid, SubscriberEntry>> = Arc::new(DashMap::new());
        let pruner_cursors: Arc<DashMap<Uuid, Arc<Cursor>>> = Arc::new(DashMap::new());
        let root_cancel = CancelSignal::new();

        let pruner_handle = spawn_pruner(
            store.clone(),
            pruner_cursors.clone(),
            config.ttl,
            root_cancel.clone(),
        );

        Ok(Self {
            store,
            subscribers,
            pruner_cursors,
            config,
            root_cancel,
            pruner_handle,
            disposed: AtomicBool::new(false),
        })
    }

    /// Appends `payload` as a new envelope. Never fails.
    pub fn enqueue(&self, payload: impl Into<String>) -> Uuid {
        self.store.append(payload.into())
    }

    /// Registers `handler` as a new subscriber, starting its dispatch loop.
    /// Always succeeds once `handler` is constructed — in Rust, unlike a
    /// runtime that validates a handler descriptor, there is nothing left
    /// to fail here.
    pub fn subscribe<S: Subscriber + 'static>(&self, handler: S) -> Uuid {
        let subscriber_id = Uuid::new_v4();
        let link = LinkedCancel::new(&self.root_cancel);
        let cursor = Arc::new(Cursor::new(
            subscriber_id,
            Arc::new(handler) as Arc<dyn SubscriberBoxed>,
            link.child.clone(),
        ));

        let dispatch_handle = spawn_dispatch_loop(self.store.clone(), cursor.clone(), self.config);

        self.pruner_cursors.insert(subscriber_id, cursor.clone());
        self.subscribers.insert(
            subscriber_id,
            SubscriberEntry {
                cursor,
                dispatch_handle,
                _link: link,
            },
        );

        subscriber_id
    }

    /// Cancels and removes `subscriber_id`'s dispatch loop. Silent no-op if
    /// the id is unknown.
    pub fn unsubscribe(&self, subscriber_id: Uuid) {
        self.pruner_cursors.remove(&subscriber_id);
        match self.subscribers.remove(&subscriber_id) {
            Some((_, entry)) => {
                entry.cursor.cancel.cancel();
                entry.dispatch_handle.abort();
            }
            None => {
                log::warn!("Unsubscribe: unknown subscriber {subscriber_id}");
            }
        }
    }

    /// Returns a consistent snapshot of the buffer plus a best-effort view
    /// of every subscriber's cursor.
    pub fn get_state(&self) -> QueueState {
        let buffer = self.store.snapshot();
        let cursors = self
            .subscribers
            .iter()
            .map(|entry| CursorState {
                subscriber_id: *entry.key(),
                index: entry.value().cursor.index(),
                committed: entry.value().cursor.is_committed(),
                dlq_len: entry.value().cursor.dlq_len(),
            })
            .collect();

        QueueState {
            buffer,
            cursors,
            ttl: self.config.ttl,
        }
    }

    /// Overwrites the payload of the envelope with `message_id`, preserving
    /// its id and creation timestamp. Silent no-op if absent.
    pub fn change_message_payload(&self, message_id: Uuid, new_payload: impl Into<String>) {
        if !self.store.set_payload(message_id, new_payload.into()) {
            log::warn!("ChangeMessagePayload: unknown message {message_id}");
        }
    }

    /// Replays a single DLQ entry for one subscriber. Silent no-op if the
    /// subscriber or the entry is unknown.
    pub async fn replay_from_dlq(&self, subscriber_id: Uuid, message_id: Uuid) {
        match self.subscribers.get(&subscriber_id) {
            Some(entry) => dlq::replay_from_dlq(&entry.cursor, message_id).await,
            None => log::warn!("ReplayFromDlq: unknown subscriber {subscriber_id}"),
        }
    }

    /// Replays every DLQ entry for one subscriber. Silent no-op if the
    /// subscriber is unknown.
    pub async fn replay_all_dlq_messages(&self, subscriber_id: Uuid) {
        match self.subscribers.get(&subscriber_id) {
            Some(entry) => dlq::replay_all_dlq_messages(&entry.cursor).await,
            None => log::warn!("ReplayAllDlqMessages: unknown subscriber {subscriber_id}"),
        }
    }

    /// Fans `replay_all_dlq_messages` out to every live subscriber.
    pub async fn replay_all_dlq_subscribers(&self) {
        dlq::replay_all_dlq_subscribers(&self.pruner_cursors).await;
    }

    /// Rewinds `subscriber_id`'s cursor to `message_id`'s position in the
    /// store. Guarded per the design: the subscriber must be committed and
    /// caught up (`index + 1 >= store.size`) at the moment of the call, or
    /// the operation is a logged no-op. The index-has-started-consuming
    /// guard is vacuous over a `usize` and is not encoded as a check.
    pub fn replay_from(&self, subscriber_id: Uuid, message_id: Uuid) {
        let Some(entry) = self.subscribers.get(&subscriber_id) else {
            log::warn!("ReplayFrom: unknown subscriber {subscriber_id}");
            return;
        };
        let cursor = &entry.cursor;

        let caught_up = cursor.index().saturating_add(1) >= self.store.len();
        if !cursor.is_committed() || !caught_up {
            log::warn!(
                "ReplayFrom: subscriber {subscriber_id} is not idle at the tail, ignoring rewind request"
            );
            return;
        }

        match self.store.find_index_by_id(message_id) {
            Some(index) => cursor.rewind_to(index),
            None => log::warn!("ReplayFrom: unknown message {message_id}"),
        }
    }

    /// Idempotent shutdown: cancels the pruner and every subscriber's
    /// dispatch loop. A second call is a no-op.
    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.root_cancel.cancel();
        self.pruner_handle.abort();
        for entry in self.subscribers.iter() {
            entry.value().dispatch_handle.abort();
        }
        self.subscribers.clear();
        self.pruner_cursors.clear();
    }
}

impl Drop for Queue {
    fn drop(&mut self) {
        self.dispose();
    }
}
