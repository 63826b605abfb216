//! Push-based, multi-subscriber dispatch on top of `push-queue-core`'s
//! TTL-bounded store: per-subscriber cursors, the retry/fallback policy
//! engine, dead-letter quarantine and replay, and the `Queue` façade.
//!
//! Producers call [`Queue::enqueue`]; each subscriber registered via
//! [`Queue::subscribe`] gets its own `tokio` dispatch loop that delivers
//! every envelope in store order through the [`Subscriber`] trait, with
//! bounded retries and a configurable post-failure behavior.

mod cursor;
mod dispatch;
mod dlq;
mod error;
mod handler;
mod invariants;
mod policy;
mod pruner;
mod queue;
mod shutdown;
mod state;

pub use error::{ConfigError, QueueError};
pub use handler::{DeliveryResult, FailureBehavior, HandlerError, Subscriber, SubscriberBoxed};
pub use push_queue_core::{Envelope, QueueConfig, StoreMetrics, StoreMetricsSnapshot};
pub use queue::Queue;
pub use shutdown::CancelSignal;
pub use state::{CursorState, QueueState};
