//! Queue configuration.
//!
//! [`QueueConfig`] holds the knobs a deployment may want to tune without a
//! rebuild. With the `config-file` feature it can be read from TOML:
//!
//! ```toml
//! name = "ui-events"
//! default_delay_ms = 5
//! consumers = 2
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Name given to queues that were not configured with one.
pub const DEFAULT_QUEUE_NAME: &str = "timerq";

/// Tunables for a [`TimerQueue`](crate::runtime::TimerQueue).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QueueConfig {
    /// Name used in log events and as the consumer thread name prefix.
    pub name: String,
    /// Delay applied by [`TimerQueue::enqueue`](crate::runtime::TimerQueue::enqueue).
    ///
    /// Zero means "as soon as possible"; a small positive value coalesces
    /// bursts so batched consumers pick them up together.
    pub default_delay_ms: u64,
    /// Number of consumer threads started by
    /// [`spawn_consumers`](crate::runtime::spawn_consumers).
    pub consumers: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_QUEUE_NAME.to_owned(),
            default_delay_ms: 0,
            consumers: 1,
        }
    }
}

impl QueueConfig {
    /// Returns the default delay as a [`Duration`].
    #[must_use]
    pub fn default_delay(&self) -> Duration {
        Duration::from_millis(self.default_delay_ms)
    }

    /// Checks that the configuration can be used to build a queue.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "name",
                reason: "must not be empty",
            });
        }
        if self.consumers == 0 {
            return Err(ConfigError::Invalid {
                field: "consumers",
                reason: "must be at least 1",
            });
        }
        Ok(())
    }

    /// Parses and validates a TOML document.
    #[cfg(feature = "config-file")]
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = QueueConfig::default();
        assert_eq!(config.name, DEFAULT_QUEUE_NAME);
        assert_eq!(config.default_delay(), Duration::ZERO);
        assert_eq!(config.consumers, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_consumers() {
        let config = QueueConfig {
            consumers: 0,
            ..QueueConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "consumers",
                reason: "must be at least 1",
            })
        );
    }

    #[test]
    fn validate_rejects_blank_name() {
        let config = QueueConfig {
            name: "  ".into(),
            ..QueueConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "name", .. })
        ));
    }

    #[cfg(feature = "config-file")]
    #[test]
    fn from_toml_fills_missing_fields_with_defaults() {
        let config = QueueConfig::from_toml_str("default_delay_ms = 5\n").expect("parse");
        assert_eq!(config.name, DEFAULT_QUEUE_NAME);
        assert_eq!(config.default_delay(), Duration::from_millis(5));
        assert_eq!(config.consumers, 1);
    }

    #[cfg(feature = "config-file")]
    #[test]
    fn from_toml_rejects_unknown_fields_and_bad_values() {
        assert!(matches!(
            QueueConfig::from_toml_str("priority = 3\n"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            QueueConfig::from_toml_str("consumers = 0\n"),
            Err(ConfigError::Invalid { field: "consumers", .. })
        ));
    }
}
