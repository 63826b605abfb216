use push_queue_core::{Envelope, QueueConfig};

use crate::cursor::Cursor;
use crate::handler::{DeliveryResult, FailureBehavior, HandlerError};

/// What the dispatch loop should do once the policy engine returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineOutcome {
    /// An attempt returned Ack; the cursor has NOT been advanced yet — the
    /// caller commits it (kept separate from `Handled` so the hot,
    /// zero-retry Ack path doesn't need a fallback round trip).
    Delivered,
    /// The fallback path ran to completion and already performed whatever
    /// cursor mutation its `FailureBehavior` implied (advance, and
    /// optionally a DLQ append). The caller does nothing further.
    Handled,
    /// `FailureBehavior::Block` was chosen: the cursor was left untouched
    /// and the same envelope will be re-offered. The caller is expected to
    /// pace re-offers with the configured retry delay.
    Blocked,
}

/// The retry/fallback engine described in the design: bounded retries on
/// Nack/error, then a fallback callback whose choice is applied here.
///
/// Stateless by design — one instance is shared across every subscriber's
/// dispatch loop, mirroring the teacher's `RetryingExporter` wrapping any
/// `SpanExporter` rather than each exporter managing its own retry state.
#[derive(Debug, Default, Clone, Copy)]
pub struct RetryPolicyEngine;

impl RetryPolicyEngine {
    pub fn new() -> Self {
        Self
    }

    /// Drives up to `1 + config.retry_count` attempts at `envelope` through
    /// `cursor`'s handler, then the fallback path if all attempts failed.
    pub async fn deliver(
        &self,
        cursor: &Cursor,
        envelope: &Envelope,
        config: &QueueConfig,
    ) -> EngineOutcome {
        let attempts = 1 + config.retry_count;
        let mut last_error: Option<HandlerError> = None;

        for attempt in 0..attempts {
            let result = cursor
                .handler
                .on_message_receive_boxed(envelope, cursor.subscriber_id, &cursor.cancel)
                .await;

            match result {
                Ok(DeliveryResult::Ack) => return EngineOutcome::Delivered,
                Ok(DeliveryResult::Nack) => last_error = None,
                Err(err) => last_error = Some(err),
            }

            let is_last_attempt = attempt + 1 == attempts;
            if !is_last_attempt {
                tokio::select! {
                    _ = tokio::time::sleep(config.retry_delay) => {}
                    _ = cursor.cancel.cancelled() => return EngineOutcome::Blocked,
                }
            }
        }

        self.fallback(cursor, envelope, last_error.as_ref()).await
    }

    async fn fallback(
        &self,
        cursor: &Cursor,
        envelope: &Envelope,
        last_error: Option<&HandlerError>,
    ) -> EngineOutcome {
        let behavior = match cursor
            .handler
            .on_message_failed_boxed(envelope, cursor.subscriber_id, last_error, &cursor.cancel)
            .await
        {
            Ok(behavior) => behavior,
            Err(err) => {
                log::error!(
                    "on_message_failed errored for subscriber {}: {err}; committing to keep subscriber alive",
                    cursor.subscriber_id
                );
                FailureBehavior::Commit
            }
        };

        match behavior {
            FailureBehavior::Commit => {
                cursor.advance();
                EngineOutcome::Handled
            }
            FailureBehavior::AddToDlq => {
                cursor.push_dlq(envelope.clone());
                cursor.advance();
                EngineOutcome::Handled
            }
            FailureBehavior::RetryOnceThenCommit => {
                let _ = cursor
                    .handler
                    .on_message_receive_boxed(envelope, cursor.subscriber_id, &cursor.cancel)
                    .await;
                cursor.advance();
                EngineOutcome::Handled
            }
            FailureBehavior::RetryOnceThenDlq => {
                let _ = cursor
                    .handler
                    .on_message_receive_boxed(envelope, cursor.subscriber_id, &cursor.cancel)
                    .await;
                cursor.push_dlq(envelope.clone());
                cursor.advance();
                EngineOutcome::Handled
            }
            FailureBehavior::Block => EngineOutcome::Blocked,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::Subscriber;
    use crate::shutdown::CancelSignal;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use uuid::Uuid;

    struct ScriptedSubscriber {
        nacks_before_ack: u32,
        calls: AtomicU32,
        failure_behavior: FailureBehavior,
    }

    impl ScriptedSubscriber {
        fn new(nacks_before_ack: u32, failure_behavior: FailureBehavior) -> Self {
            Self {
                nacks_before_ack,
                calls: AtomicU32::new(0),
                failure_behavior,
            }
        }

        fn call_count(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Subscriber for ScriptedSubscriber {
        async fn on_message_receive(
            &self,
            _envelope: &Envelope,
            _subscriber_id: Uuid,
            _cancel: &CancelSignal,
        ) -> Result<DeliveryResult, HandlerError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.nacks_before_ack {
                Ok(DeliveryResult::Nack)
            } else {
                Ok(DeliveryResult::Ack)
            }
        }

        async fn on_message_failed(
            &self,
            _envelope: &Envelope,
            _subscriber_id: Uuid,
            _error: Option<&HandlerError>,
            _cancel: &CancelSignal,
        ) -> Result<FailureBehavior, HandlerError> {
            Ok(self.failure_behavior)
        }
    }

    fn fast_config(retry_count: u32) -> QueueConfig {
        QueueConfig::new(Duration::from_secs(30), retry_count, Duration::from_millis(10)).unwrap()
    }

    #[tokio::test]
    async fn ack_on_first_attempt_is_delivered() {
        let subscriber = Arc::new(ScriptedSubscriber::new(0, FailureBehavior::Commit));
        let cursor = Cursor::new(Uuid::new_v4(), subscriber.clone(), CancelSignal::new());
        let envelope = Envelope::new("hi".into());
        let config = fast_config(3);

        let outcome = RetryPolicyEngine::new().deliver(&cursor, &envelope, &config).await;
        assert_eq!(outcome, EngineOutcome::Delivered);
        assert_eq!(subscriber.call_count(), 1);
    }

    #[tokio::test]
    async fn retries_then_acks_within_budget() {
        let subscriber = Arc::new(ScriptedSubscriber::new(2, FailureBehavior::Commit));
        let cursor = Cursor::new(Uuid::new_v4(), subscriber.clone(), CancelSignal::new());
        let envelope = Envelope::new("hi".into());
        let config = fast_config(3);

        let outcome = RetryPolicyEngine::new().deliver(&cursor, &envelope, &config).await;
        assert_eq!(outcome, EngineOutcome::Delivered);
        assert_eq!(subscriber.call_count(), 3);
    }

    #[tokio::test]
    async fn exhaustion_routes_to_add_to_dlq_and_advances() {
        let subscriber = Arc::new(ScriptedSubscriber::new(u32::MAX, FailureBehavior::AddToDlq));
        let cursor = Cursor::new(Uuid::new_v4(), subscriber.clone(), CancelSignal::new());
        let envelope = Envelope::new("hi".into());
        let config = fast_config(2);

        let outcome = RetryPolicyEngine::new().deliver(&cursor, &envelope, &config).await;
        assert_eq!(outcome, EngineOutcome::Handled);
        assert_eq!(subscriber.call_count(), 3); // 1 + retry_count attempts
        assert_eq!(cursor.index(), 1);
        assert_eq!(cursor.dlq_len(), 1);
    }

    #[tokio::test]
    async fn retry_once_then_dlq_makes_one_extra_call() {
        let subscriber = Arc::new(ScriptedSubscriber::new(u32::MAX, FailureBehavior::RetryOnceThenDlq));
        let cursor = Cursor::new(Uuid::new_v4(), subscriber.clone(), CancelSignal::new());
        let envelope = Envelope::new("hi".into());
        let config = fast_config(1);

        RetryPolicyEngine::new().deliver(&cursor, &envelope, &config).await;
        assert_eq!(subscriber.call_count(), 3); // 1 + 1 retry, then 1 extra best-effort
        assert_eq!(cursor.dlq_len(), 1);
        assert_eq!(cursor.index(), 1);
    }

    #[tokio::test]
    async fn block_does_not_advance_cursor() {
        let subscriber = Arc::new(ScriptedSubscriber::new(u32::MAX, FailureBehavior::Block));
        let cursor = Cursor::new(Uuid::new_v4(), subscriber, CancelSignal::new());
        let envelope = Envelope::new("hi".into());
        let config = fast_config(1);

        let outcome = RetryPolicyEngine::new().deliver(&cursor, &envelope, &config).await;
        assert_eq!(outcome, EngineOutcome::Blocked);
        assert_eq!(cursor.index(), 0);
        assert!(!cursor.is_committed());
    }

    struct FailingFailureHandler;

    impl Subscriber for FailingFailureHandler {
        async fn on_message_receive(
            &self,
            _envelope: &Envelope,
            _subscriber_id: Uuid,
            _cancel: &CancelSignal,
        ) -> Result<DeliveryResult, HandlerError> {
            Ok(DeliveryResult::Nack)
        }

        async fn on_message_failed(
            &self,
            _envelope: &Envelope,
            _subscriber_id: Uuid,
            _error: Option<&HandlerError>,
            _cancel: &CancelSignal,
        ) -> Result<FailureBehavior, HandlerError> {
            Err(HandlerError::new("boom"))
        }
    }

    #[tokio::test]
    async fn errored_failure_handler_falls_back_to_commit() {
        let cursor = Cursor::new(Uuid::new_v4(), Arc::new(FailingFailureHandler), CancelSignal::new());
        let envelope = Envelope::new("hi".into());
        let config = fast_config(1);

        let outcome = RetryPolicyEngine::new().deliver(&cursor, &envelope, &config).await;
        assert_eq!(outcome, EngineOutcome::Handled);
        assert_eq!(cursor.index(), 1);
        assert_eq!(cursor.dlq_len(), 0);
    }
}
