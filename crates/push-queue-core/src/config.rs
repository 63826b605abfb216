use std::time::Duration;
use thiserror::Error;

/// Minimum accepted delay between retry attempts.
pub const MIN_RETRY_DELAY: Duration = Duration::from_millis(10);
/// Maximum accepted delay between retry attempts.
pub const MAX_RETRY_DELAY: Duration = Duration::from_millis(1000);
/// Maximum accepted retry count.
pub const MAX_RETRY_COUNT: u32 = 100;

/// Errors returned by [`QueueConfig::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// TTL must be strictly positive.
    #[error("ttl must be greater than zero")]
    InvalidTtl,
    /// `retry_count` must be in `1..=100`.
    #[error("retry_count must be between 1 and {max} (got {actual})", max = MAX_RETRY_COUNT)]
    InvalidRetryCount { actual: u32 },
    /// `retry_delay` must be in `10ms..=1000ms`.
    #[error("retry_delay must be between 10ms and 1000ms (got {actual_ms}ms)")]
    InvalidRetryDelay { actual_ms: u128 },
}

/// Configuration for a [`Queue`](crate::Queue)-equivalent core engine.
///
/// Immutable after construction. Use [`QueueConfig::validate`] to turn a
/// hand-built value into one guaranteed to satisfy the recognized range for
/// every field; [`QueueConfig::default`] already satisfies it.
#[derive(Debug, Clone, Copy)]
pub struct QueueConfig {
    /// Max age of an envelope in the store before the pruner removes it.
    pub ttl: Duration,
    /// Max retries per envelope before the failure policy is invoked.
    pub retry_count: u32,
    /// Pause between retry attempts.
    pub retry_delay: Duration,
}

impl QueueConfig {
    /// Creates a new configuration and validates it immediately.
    pub fn new(ttl: Duration, retry_count: u32, retry_delay: Duration) -> Result<Self, ConfigError> {
        let config = Self {
            ttl,
            retry_count,
            retry_delay,
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks that every field is within its recognized range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ttl.is_zero() {
            return Err(ConfigError::InvalidTtl);
        }
        if self.retry_count == 0 || self.retry_count > MAX_RETRY_COUNT {
            return Err(ConfigError::InvalidRetryCount {
                actual: self.retry_count,
            });
        }
        if self.retry_delay < MIN_RETRY_DELAY || self.retry_delay > MAX_RETRY_DELAY {
            return Err(ConfigError::InvalidRetryDelay {
                actual_ms: self.retry_delay.as_millis(),
            });
        }
        Ok(())
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(30),
            retry_count: 3,
            retry_delay: Duration::from_millis(100),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(QueueConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_ttl_is_rejected() {
        let config = QueueConfig {
            ttl: Duration::ZERO,
            ..QueueConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidTtl));
    }

    #[test]
    fn retry_count_out_of_range_is_rejected() {
        let too_few = QueueConfig {
            retry_count: 0,
            ..QueueConfig::default()
        };
        assert!(matches!(
            too_few.validate(),
            Err(ConfigError::InvalidRetryCount { actual: 0 })
        ));

        let too_many = QueueConfig {
            retry_count: 101,
            ..QueueConfig::default()
        };
        assert!(matches!(
            too_many.validate(),
            Err(ConfigError::InvalidRetryCount { actual: 101 })
        ));
    }

    #[test]
    fn retry_delay_out_of_range_is_rejected() {
        let too_short = QueueConfig {
            retry_delay: Duration::from_millis(1),
            ..QueueConfig::default()
        };
        assert!(too_short.validate().is_err());

        let too_long = QueueConfig {
            retry_delay: Duration::from_millis(5000),
            ..QueueConfig::default()
        };
        assert!(too_long.validate().is_err());
    }

    #[test]
    fn new_validates_eagerly() {
        assert!(QueueConfig::new(Duration::ZERO, 3, Duration::from_millis(100)).is_err());
        assert!(QueueConfig::new(Duration::from_secs(1), 3, Duration::from_millis(100)).is_ok());
    }
}
