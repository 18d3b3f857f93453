//! Builder for configured timer queues.

use crate::config::QueueConfig;
use crate::error::ConfigError;
use crate::runtime::queue::{Task, TimerQueue};
use crate::time::{TimeSource, WallClock};
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

/// Builds a [`TimerQueue`] from a [`QueueConfig`] plus an optional clock.
///
/// # Example
///
/// ```
/// use timerq::runtime::TimerQueue;
/// use timerq::time::VirtualClock;
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let queue: TimerQueue = TimerQueue::builder()
///     .name("render")
///     .default_delay(Duration::from_millis(2))
///     .clock(Arc::new(VirtualClock::new()))
///     .build()
///     .expect("valid config");
/// assert_eq!(queue.name(), "render");
/// ```
pub struct TimerQueueBuilder<T = Task> {
    config: QueueConfig,
    default_delay: Duration,
    clock: Option<Arc<dyn TimeSource>>,
    _payload: PhantomData<fn() -> T>,
}

impl<T> TimerQueueBuilder<T> {
    /// Creates a builder with default configuration and a wall clock.
    #[must_use]
    pub fn new() -> Self {
        Self::from_config(QueueConfig::default())
    }

    /// Creates a builder seeded from `config`.
    #[must_use]
    pub fn from_config(config: QueueConfig) -> Self {
        Self {
            default_delay: config.default_delay(),
            config,
            clock: None,
            _payload: PhantomData,
        }
    }

    /// Sets the queue name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    /// Sets the delay used by [`TimerQueue::enqueue`].
    #[must_use]
    pub fn default_delay(mut self, delay: Duration) -> Self {
        self.default_delay = delay;
        self
    }

    /// Sets how many consumers [`spawn_consumers`](crate::runtime::spawn_consumers) starts.
    #[must_use]
    pub fn consumers(mut self, consumers: usize) -> Self {
        self.config.consumers = consumers;
        self
    }

    /// Injects the time source. Defaults to a fresh [`WallClock`].
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn TimeSource>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Validates the configuration and builds the queue.
    pub fn build(self) -> Result<TimerQueue<T>, ConfigError> {
        self.config.validate()?;
        let clock: Arc<dyn TimeSource> = match self.clock {
            Some(clock) => clock,
            None => Arc::new(WallClock::new()),
        };
        Ok(TimerQueue::from_parts(
            self.config.name,
            self.default_delay,
            self.config.consumers,
            clock,
        ))
    }
}

impl<T> Default for TimerQueueBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for TimerQueueBuilder<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerQueueBuilder")
            .field("config", &self.config)
            .field("default_delay", &self.default_delay)
            .field("custom_clock", &self.clock.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_applies_config() {
        let config = QueueConfig {
            name: "io".into(),
            default_delay_ms: 7,
            consumers: 3,
        };
        let queue: TimerQueue<u8> = TimerQueueBuilder::from_config(config)
            .build()
            .expect("valid config");
        assert_eq!(queue.name(), "io");
        assert_eq!(queue.default_delay(), Duration::from_millis(7));
        assert_eq!(queue.consumer_count(), 3);
    }

    #[test]
    fn explicit_delay_overrides_config() {
        let queue: TimerQueue<u8> = TimerQueueBuilder::from_config(QueueConfig {
            default_delay_ms: 7,
            ..QueueConfig::default()
        })
        .default_delay(Duration::from_micros(250))
        .build()
        .expect("valid config");
        assert_eq!(queue.default_delay(), Duration::from_micros(250));
    }

    #[test]
    fn build_rejects_invalid_config() {
        let err = TimerQueue::<u8>::builder()
            .consumers(0)
            .build()
            .expect_err("zero consumers");
        assert!(matches!(err, ConfigError::Invalid { field: "consumers", .. }));
    }
}
