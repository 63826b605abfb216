use std::sync::Arc;
use std::time::Duration;

use push_queue_core::{MessageStore, QueueConfig};
use tokio::task::JoinHandle;

use crate::cursor::Cursor;
use crate::policy::{EngineOutcome, RetryPolicyEngine};

/// How long the loop sleeps when it's caught up (cursor index == store
/// size) before checking again. Matches the teacher's polling cadence used
/// for similar "wait for more input" loops.
const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Spawns the per-subscriber dispatch loop described in the design: read
/// the next envelope at the cursor, deliver it through the retry/fallback
/// policy engine, advance on success, repeat until cancelled.
pub(crate) fn spawn_dispatch_loop(
    store: Arc<MessageStore>,
    cursor: Arc<Cursor>,
    config: QueueConfig,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let engine = RetryPolicyEngine::new();
        log::info!("dispatch loop started for subscriber {}", cursor.subscriber_id);

        loop {
            if cursor.cancel.is_cancelled() {
                break;
            }

            let next = store.read_at(cursor.index());
            let Some(envelope) = next else {
                tokio::select! {
                    _ = tokio::time::sleep(IDLE_POLL_INTERVAL) => {}
                    _ = cursor.cancel.cancelled() => break,
                }
                continue;
            };

            cursor.mark_in_flight();
            let outcome = engine.deliver(&cursor, &envelope, &config).await;

            match outcome {
                EngineOutcome::Delivered => cursor.advance(),
                EngineOutcome::Handled => {}
                EngineOutcome::Blocked => {
                    tokio::select! {
                        _ = tokio::time::sleep(config.retry_delay) => {}
                        _ = cursor.cancel.cancelled() => break,
                    }
                }
            }
        }

        log::info!("dispatch loop stopped for subscriber {}", cursor.subscriber_id);
    })
}
