use thiserror::Error;

pub use push_queue_core::ConfigError;

/// Errors surfaced by the `Queue` façade.
///
/// Producer operations (Enqueue, Subscribe, ChangeMessagePayload, Replay*)
/// never return this type — unknown ids are absorbed as silent, logged
/// no-ops per the error taxonomy. The only fallible path is construction.
#[derive(Debug, Error)]
pub enum QueueError {
    /// `QueueConfig::validate` rejected the configuration at construction.
    #[error("invalid queue configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
}
