//! Time sources for deadline ordering and wake-up computation.
//!
//! Queues read the current time through [`TimeSource`], so production code
//! runs against [`WallClock`] while tests can inject a [`VirtualClock`] and
//! move time by hand.

use crate::types::Time;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Time source abstraction for getting the current time.
///
/// Implementations must be monotonic: successive calls never go backwards.
pub trait TimeSource: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> Time;
}

/// Monotonic wall clock for production use.
///
/// Uses [`Instant`] internally. The epoch is the moment this clock was
/// created, so the first reading is close to [`Time::ZERO`].
#[derive(Debug)]
pub struct WallClock {
    epoch: Instant,
}

impl WallClock {
    /// Creates a new wall clock time source.
    #[must_use]
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for WallClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for WallClock {
    fn now(&self) -> Time {
        Time::ZERO + self.epoch.elapsed()
    }
}

/// Virtual time source for tests.
///
/// Time only advances when explicitly told to do so. Blocking consumers do
/// not observe an advance until they wake, so pair [`advance`](Self::advance)
/// with [`TimerQueue::wake_consumers`](crate::runtime::TimerQueue::wake_consumers).
///
/// # Example
///
/// ```
/// use timerq::time::{TimeSource, VirtualClock};
/// use timerq::types::Time;
/// use std::time::Duration;
///
/// let clock = VirtualClock::new();
/// assert_eq!(clock.now(), Time::ZERO);
///
/// clock.advance(Duration::from_secs(1));
/// assert_eq!(clock.now(), Time::from_secs(1));
/// ```
#[derive(Debug)]
pub struct VirtualClock {
    now: AtomicU64,
}

impl VirtualClock {
    /// Creates a new virtual clock starting at time zero.
    #[must_use]
    pub fn new() -> Self {
        Self::starting_at(Time::ZERO)
    }

    /// Creates a virtual clock starting at the given time.
    #[must_use]
    pub fn starting_at(time: Time) -> Self {
        Self {
            now: AtomicU64::new(time.as_nanos()),
        }
    }

    /// Moves time forward by `delta`, saturating at the largest representable time.
    pub fn advance(&self, delta: Duration) {
        // The closure never returns None, so the update cannot fail.
        let _ = self
            .now
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |nanos| {
                Some((Time::from_nanos(nanos) + delta).as_nanos())
            });
    }

    /// Moves time to `time`. Targets in the past are ignored.
    pub fn advance_to(&self, time: Time) {
        self.now.fetch_max(time.as_nanos(), Ordering::AcqRel);
    }
}

impl Default for VirtualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for VirtualClock {
    fn now(&self) -> Time {
        Time::from_nanos(self.now.load(Ordering::Acquire))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init_test(name: &str) {
        crate::test_utils::init_test_logging();
        crate::test_phase!(name);
    }

    #[test]
    fn virtual_clock_starts_at_zero() {
        init_test("virtual_clock_starts_at_zero");
        let clock = VirtualClock::new();
        let now = clock.now();
        crate::assert_with_log!(now == Time::ZERO, "clock starts at zero", Time::ZERO, now);
        crate::test_complete!("virtual_clock_starts_at_zero");
    }

    #[test]
    fn virtual_clock_advance_and_advance_to() {
        init_test("virtual_clock_advance_and_advance_to");
        let clock = VirtualClock::starting_at(Time::from_secs(10));
        clock.advance(Duration::from_millis(500));
        let now = clock.now();
        crate::assert_with_log!(
            now == Time::from_millis(10_500),
            "advance adds delta",
            Time::from_millis(10_500),
            now
        );

        clock.advance_to(Time::from_secs(5));
        let now = clock.now();
        crate::assert_with_log!(
            now == Time::from_millis(10_500),
            "advance_to never goes backwards",
            Time::from_millis(10_500),
            now
        );

        clock.advance_to(Time::from_secs(12));
        assert_eq!(clock.now(), Time::from_secs(12));
        crate::test_complete!("virtual_clock_advance_and_advance_to");
    }

    #[test]
    fn virtual_clock_advance_saturates() {
        init_test("virtual_clock_advance_saturates");
        let clock = VirtualClock::starting_at(Time::from_nanos(u64::MAX - 1));
        clock.advance(Duration::from_secs(1));
        let now = clock.now();
        crate::assert_with_log!(
            now == Time::from_nanos(u64::MAX),
            "advance saturates",
            u64::MAX,
            now
        );
        crate::test_complete!("virtual_clock_advance_saturates");
    }

    #[test]
    fn wall_clock_is_monotonic() {
        init_test("wall_clock_is_monotonic");
        let clock = WallClock::new();
        let first = clock.now();
        std::thread::sleep(Duration::from_millis(2));
        let second = clock.now();
        crate::assert_with_log!(second > first, "wall clock advances", first, second);
        crate::test_complete!("wall_clock_is_monotonic");
    }
}
