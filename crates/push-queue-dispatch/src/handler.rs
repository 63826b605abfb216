use push_queue_core::Envelope;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;
use uuid::Uuid;

use crate::shutdown::CancelSignal;

/// Outcome of a single delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryResult {
    Ack,
    Nack,
}

/// The post-failure action chosen once retries for an envelope are
/// exhausted, returned by [`Subscriber::on_message_failed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureBehavior {
    /// Advance the cursor past this envelope; no DLQ entry.
    Commit,
    /// Append the envelope to this subscriber's DLQ, then advance.
    AddToDlq,
    /// One more best-effort `on_message_receive` call, result discarded,
    /// then advance.
    RetryOnceThenCommit,
    /// One more best-effort `on_message_receive` call, result discarded,
    /// then append to DLQ, then advance.
    RetryOnceThenDlq,
    /// Do not advance; the dispatch loop re-offers the same envelope.
    Block,
}

/// An error returned by a handler method. Folded into the Nack path for
/// `on_message_receive`, and into `Commit` for `on_message_failed` /
/// `on_dead_letter`.
#[derive(Debug, Error, Clone)]
#[error("{0}")]
pub struct HandlerError(pub String);

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// The subscriber capability set: the application-supplied handler invoked
/// by the dispatch loop and retry/fallback policy engine.
///
/// Uses native async fn in traits rather than `#[async_trait]`. This trait
/// is not object-safe (the `impl Future` return types can't appear in a
/// vtable); see [`SubscriberBoxed`] for the dynamic-dispatch twin used by
/// the subscriber registry.
pub trait Subscriber: Send + Sync {
    /// Invoked at most `1 + retry_count` times per envelope by the policy
    /// engine. Must be safe to call repeatedly for the same envelope.
    fn on_message_receive(
        &self,
        envelope: &Envelope,
        subscriber_id: Uuid,
        cancel: &CancelSignal,
    ) -> impl Future<Output = Result<DeliveryResult, HandlerError>> + Send;

    /// Invoked once retries are exhausted; `error` carries the last Nack's
    /// context if the last attempt returned `Err`.
    fn on_message_failed(
        &self,
        envelope: &Envelope,
        subscriber_id: Uuid,
        error: Option<&HandlerError>,
        cancel: &CancelSignal,
    ) -> impl Future<Output = Result<FailureBehavior, HandlerError>> + Send;

    /// Optional extension point for future DLQ-specific sweepers. Not
    /// invoked by the current dispatch loop or replay operations.
    fn on_dead_letter(
        &self,
        _envelope: &Envelope,
        _subscriber_id: Uuid,
        _cancel: &CancelSignal,
    ) -> impl Future<Output = Result<DeliveryResult, HandlerError>> + Send {
        async { Ok(DeliveryResult::Ack) }
    }
}

/// Object-safe twin of [`Subscriber`], for storage behind
/// `Arc<dyn SubscriberBoxed>` in the subscriber registry.
pub trait SubscriberBoxed: Send + Sync {
    fn on_message_receive_boxed<'a>(
        &'a self,
        envelope: &'a Envelope,
        subscriber_id: Uuid,
        cancel: &'a CancelSignal,
    ) -> Pin<Box<dyn Future<Output = Result<DeliveryResult, HandlerError>> + Send + 'a>>;

    fn on_message_failed_boxed<'a>(
        &'a self,
        envelope: &'a Envelope,
        subscriber_id: Uuid,
        error: Option<&'a HandlerError>,
        cancel: &'a CancelSignal,
    ) -> Pin<Box<dyn Future<Output = Result<FailureBehavior, HandlerError>> + Send + 'a>>;

    fn on_dead_letter_boxed<'a>(
        &'a self,
        envelope: &'a Envelope,
        subscriber_id: Uuid,
        cancel: &'a CancelSignal,
    ) -> Pin<Box<dyn Future<Output = Result<DeliveryResult, HandlerError>> + Send + 'a>>;
}

impl<T: Subscriber> SubscriberBoxed for T {
    fn on_message_receive_boxed<'a>(
        &'a self,
        envelope: &'a Envelope,
        subscriber_id: Uuid,
        cancel: &'a CancelSignal,
    ) -> Pin<Box<dyn Future<Output = Result<DeliveryResult, HandlerError>> + Send + 'a>> {
        Box::pin(self.on_message_receive(envelope, subscriber_id, cancel))
    }

    fn on_message_failed_boxed<'a>(
        &'a self,
        envelope: &'a Envelope,
        subscriber_id: Uuid,
        error: Option<&'a HandlerError>,
        cancel: &'a CancelSignal,
    ) -> Pin<Box<dyn Future<Output = Result<FailureBehavior, HandlerError>> + Send + 'a>> {
        Box::pin(self.on_message_failed(envelope, subscriber_id, error, cancel))
    }

    fn on_dead_letter_boxed<'a>(
        &'a self,
        envelope: &'a Envelope,
        subscriber_id: Uuid,
        cancel: &'a CancelSignal,
    ) -> Pin<Box<dyn Future<Output = Result<DeliveryResult, HandlerError>> + Send + 'a>> {
        Box::pin(self.on_dead_letter(envelope, subscriber_id, cancel))
    }
}
