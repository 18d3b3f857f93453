//! Manual- and auto-reset events.
//!
//! An [`Event`] is a boolean flag behind a mutex with two condition
//! variables: one for "became signaled" and one for "became cleared".
//!
//! | State      | `set()`              | `wait()` Manual | `wait()` Auto      | `reset()`    |
//! |------------|----------------------|-----------------|--------------------|--------------|
//! | Unsignaled | → Signaled, notify   | blocks          | blocks             | no-op        |
//! | Signaled   | no-op                | returns         | returns, consumes  | → Unsignaled |
//!
//! Every operation has a `*_then` form taking a closure. The closure runs
//! exactly once while the event's lock is held, before the state change
//! and before any waiter is notified, so "mutate shared state, then signal"
//! is a single atomic step. If the closure panics the state is left as it
//! was and nobody is notified.
//!
//! A timed wait that expires never runs its closure and never changes state.
//!
//! # Example
//!
//! ```
//! use timerq::sync::Event;
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicU32, Ordering};
//!
//! let ready = Arc::new(Event::auto());
//! let value = Arc::new(AtomicU32::new(0));
//!
//! let handle = {
//!     let (ready, value) = (Arc::clone(&ready), Arc::clone(&value));
//!     std::thread::spawn(move || ready.wait_then(|| value.load(Ordering::SeqCst)))
//! };
//!
//! ready.set_then(|| value.store(7, Ordering::SeqCst));
//! assert_eq!(handle.join().unwrap(), 7);
//! assert!(!ready.is_set());
//! ```

use parking_lot::{Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// How an [`Event`] leaves the signaled state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ResetPolicy {
    /// The signal persists until [`Event::reset`]; `set` releases every waiter.
    Manual,
    /// A successful wait consumes the signal; `set` releases one waiter.
    #[default]
    Auto,
}

/// A signal with manual or automatic reset and timed waits.
#[derive(Debug)]
pub struct Event {
    signaled: Mutex<bool>,
    on_signal: Condvar,
    on_reset: Condvar,
    policy: ResetPolicy,
}

impl Event {
    /// Creates an unsignaled event with the given reset policy.
    #[must_use]
    pub const fn new(policy: ResetPolicy) -> Self {
        Self {
            signaled: Mutex::new(false),
            on_signal: Condvar::new(),
            on_reset: Condvar::new(),
            policy,
        }
    }

    /// Creates an unsignaled manual-reset event.
    #[must_use]
    pub const fn manual() -> Self {
        Self::new(ResetPolicy::Manual)
    }

    /// Creates an unsignaled auto-reset event.
    #[must_use]
    pub const fn auto() -> Self {
        Self::new(ResetPolicy::Auto)
    }

    /// Returns the reset policy.
    #[must_use]
    pub fn policy(&self) -> ResetPolicy {
        self.policy
    }

    /// Returns true if the event is currently signaled.
    #[must_use]
    pub fn is_set(&self) -> bool {
        *self.signaled.lock()
    }

    /// Signals the event.
    pub fn set(&self) {
        self.set_then(|| ());
    }

    /// Runs `f` under the lock, then signals the event.
    ///
    /// Setting an already signaled event runs `f` but notifies nobody.
    pub fn set_then<R>(&self, f: impl FnOnce() -> R) -> R {
        let mut signaled = self.signaled.lock();
        let out = f();
        let was_signaled = std::mem::replace(&mut *signaled, true);
        drop(signaled);
        if !was_signaled {
            match self.policy {
                ResetPolicy::Manual => {
                    self.on_signal.notify_all();
                }
                ResetPolicy::Auto => {
                    self.on_signal.notify_one();
                }
            }
        }
        out
    }

    /// Clears the signal.
    ///
    /// Resetting is the manual-reset way to close a gate. Auto-reset events
    /// accept it too, as an extension: it discards a signal nobody consumed
    /// yet, and waiters keep blocking until the next `set`.
    pub fn reset(&self) {
        self.reset_then(|| ());
    }

    /// Runs `f` under the lock, then clears the signal.
    pub fn reset_then<R>(&self, f: impl FnOnce() -> R) -> R {
        let mut signaled = self.signaled.lock();
        let out = f();
        let was_signaled = std::mem::replace(&mut *signaled, false);
        drop(signaled);
        if was_signaled {
            self.on_reset.notify_all();
        }
        out
    }

    /// Blocks until the event is signaled.
    pub fn wait(&self) {
        self.wait_then(|| ());
    }

    /// Blocks until the event is signaled, then runs `f` under the lock.
    ///
    /// On an auto-reset event the signal is consumed after `f` returns.
    pub fn wait_then<R>(&self, f: impl FnOnce() -> R) -> R {
        let mut signaled = self.signaled.lock();
        while !*signaled {
            self.on_signal.wait(&mut signaled);
        }
        self.observe(signaled, f)
    }

    /// Waits at most `timeout` for the signal. Returns whether it arrived.
    pub fn wait_for(&self, timeout: Duration) -> bool {
        self.wait_for_then(timeout, || ()).is_some()
    }

    /// Waits at most `timeout`; runs `f` under the lock only if the signal
    /// arrived.
    pub fn wait_for_then<R>(&self, timeout: Duration, f: impl FnOnce() -> R) -> Option<R> {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.wait_until_then(deadline, f),
            // Unrepresentable deadline: nothing can time out.
            None => Some(self.wait_then(f)),
        }
    }

    /// Waits until `deadline` for the signal. Returns whether it arrived.
    pub fn wait_until(&self, deadline: Instant) -> bool {
        self.wait_until_then(deadline, || ()).is_some()
    }

    /// Waits until `deadline`; runs `f` under the lock only if the signal
    /// arrived.
    pub fn wait_until_then<R>(&self, deadline: Instant, f: impl FnOnce() -> R) -> Option<R> {
        let mut signaled = self.signaled.lock();
        while !*signaled {
            if self
                .on_signal
                .wait_until(&mut signaled, deadline)
                .timed_out()
            {
                // A set() can race the timeout; honour it if it won.
                if !*signaled {
                    return None;
                }
                break;
            }
        }
        Some(self.observe(signaled, f))
    }

    /// Blocks while the event is signaled.
    pub fn wait_for_reset(&self) {
        self.wait_for_reset_then(|| ());
    }

    /// Blocks while the event is signaled, then runs `f` under the lock.
    ///
    /// For a manual-reset event used as a run/stop gate this lets a thread
    /// wait for the "stop" edge.
    pub fn wait_for_reset_then<R>(&self, f: impl FnOnce() -> R) -> R {
        let mut signaled = self.signaled.lock();
        while *signaled {
            self.on_reset.wait(&mut signaled);
        }
        f()
    }

    /// Runs `f` under the event's lock without touching the signal.
    pub fn synchronize<R>(&self, f: impl FnOnce() -> R) -> R {
        let _signaled = self.signaled.lock();
        f()
    }

    fn observe<R>(&self, mut signaled: MutexGuard<'_, bool>, f: impl FnOnce() -> R) -> R {
        let out = f();
        if self.policy == ResetPolicy::Auto {
            *signaled = false;
            drop(signaled);
            self.on_reset.notify_all();
        }
        out
    }
}

impl Default for Event {
    fn default() -> Self {
        Self::new(ResetPolicy::default())
    }
}
