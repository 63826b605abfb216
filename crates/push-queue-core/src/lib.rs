//! Core, non-async primitives for the push queue: the envelope type, the
//! TTL-bounded shared store, its configuration, and its metrics.
//!
//! Nothing in this crate spawns a task, holds an async runtime handle, or
//! knows what a subscriber is. Those concerns live one layer up in
//! `push-queue-dispatch`, which composes this crate's `MessageStore` with
//! per-subscriber cursors and retry/DLQ policy.

mod config;
mod envelope;
mod invariants;
mod metrics;
mod store;

pub use config::{ConfigError, QueueConfig, MAX_RETRY_COUNT, MAX_RETRY_DELAY, MIN_RETRY_DELAY};
pub use envelope::Envelope;
pub use metrics::{StoreMetrics, StoreMetricsSnapshot};
pub use store::MessageStore;
