//! Thread-safe timer queue.
//!
//! Producers schedule payloads for a deadline; consumers block in
//! [`TimerQueue::wait_pop`] until the earliest deadline has passed. A single
//! mutex guards the heap, the sequence counter and the open flag, and one
//! condition variable carries every wake-up: new entries (which may have an
//! earlier deadline than the one a consumer is sleeping towards), shutdown,
//! and explicit [`wake_consumers`](TimerQueue::wake_consumers) calls.
//! Consumers re-evaluate the heap after every wake, so nobody busy-polls and
//! a newly inserted earlier deadline always pre-empts a longer sleep.
//!
//! The lock is never held while a payload is being run; consumers take the
//! payload out and release the lock first.
//!
//! # Lifecycle
//!
//! A queue starts open. [`shutdown`](TimerQueue::shutdown) closes it: new
//! submissions fail with [`QueueError::Closed`], and consumers keep
//! receiving whatever is already due, then get `None`. Pending entries are
//! kept until popped, [`clear`](TimerQueue::clear)ed, or the queue is
//! dropped. [`restart`](TimerQueue::restart) reopens the queue.

use crate::config::{DEFAULT_QUEUE_NAME, QueueConfig};
use crate::error::QueueError;
use crate::runtime::builder::TimerQueueBuilder;
use crate::runtime::timer::TimerHeap;
use crate::time::{TimeSource, WallClock};
use crate::tracing_compat::{debug, trace};
use crate::types::Time;
use parking_lot::{Condvar, Mutex, MutexGuard};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A unit of work run by a consumer.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Result of a bounded pop.
#[derive(Debug, PartialEq, Eq)]
pub enum PopOutcome<T> {
    /// A payload was due and has been removed from the queue.
    Ready(T),
    /// The queue is closed and nothing due remains.
    Closed,
    /// The timeout elapsed with nothing due.
    TimedOut,
}

impl<T> PopOutcome<T> {
    /// Returns the payload, if one was popped.
    pub fn ready(self) -> Option<T> {
        match self {
            Self::Ready(payload) => Some(payload),
            Self::Closed | Self::TimedOut => None,
        }
    }
}

struct QueueState<T> {
    heap: TimerHeap<T>,
    open: bool,
}

/// A deadline-ordered queue of payloads shared between threads.
///
/// `T` defaults to [`Task`]; queues of `Task` also get the consumer loop
/// ([`run`](TimerQueue::run)) and the synchronous bridge
/// ([`synchronize`](TimerQueue::synchronize)).
///
/// # Example
///
/// ```
/// use timerq::runtime::TimerQueue;
/// use std::time::Duration;
///
/// let queue: TimerQueue<&str> = TimerQueue::new();
/// queue.enqueue_after(Duration::from_millis(10), "second").unwrap();
/// queue.enqueue_urgently("first").unwrap();
///
/// assert_eq!(queue.wait_pop(), Some("first"));
/// assert_eq!(queue.wait_pop(), Some("second"));
///
/// queue.shutdown();
/// assert_eq!(queue.wait_pop(), None);
/// ```
pub struct TimerQueue<T = Task> {
    state: Mutex<QueueState<T>>,
    wakeup: Condvar,
    clock: Arc<dyn TimeSource>,
    default_delay: Duration,
    consumers: usize,
    name: String,
}

impl<T> TimerQueue<T> {
    /// Creates an open queue on a [`WallClock`] with zero default delay.
    #[must_use]
    pub fn new() -> Self {
        Self::with_default_delay(Duration::ZERO)
    }

    /// Creates an open queue on a [`WallClock`] whose
    /// [`enqueue`](Self::enqueue) waits `default_delay`.
    #[must_use]
    pub fn with_default_delay(default_delay: Duration) -> Self {
        let defaults = QueueConfig::default();
        Self::from_parts(
            DEFAULT_QUEUE_NAME.to_owned(),
            default_delay,
            defaults.consumers,
            Arc::new(WallClock::new()),
        )
    }

    /// Returns a builder for a configured queue.
    #[must_use]
    pub fn builder() -> TimerQueueBuilder<T> {
        TimerQueueBuilder::new()
    }

    pub(crate) fn from_parts(
        name: String,
        default_delay: Duration,
        consumers: usize,
        clock: Arc<dyn TimeSource>,
    ) -> Self {
        Self {
            state: Mutex::new(QueueState {
                heap: TimerHeap::new(),
                open: true,
            }),
            wakeup: Condvar::new(),
            clock,
            default_delay,
            consumers,
            name,
        }
    }

    /// Returns the queue name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the current time of the queue's clock.
    #[must_use]
    pub fn now(&self) -> Time {
        self.clock.now()
    }

    /// Returns the delay used by [`enqueue`](Self::enqueue).
    #[must_use]
    pub fn default_delay(&self) -> Duration {
        self.default_delay
    }

    /// Returns the number of consumer threads this queue is configured for.
    #[must_use]
    pub fn consumer_count(&self) -> usize {
        self.consumers
    }

    /// Returns true until [`shutdown`](Self::shutdown) is called.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state.lock().open
    }

    /// Returns the number of pending payloads, due or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().heap.len()
    }

    /// Returns true if nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.lock().heap.is_empty()
    }

    /// Returns the earliest pending deadline.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Time> {
        self.state.lock().heap.peek_deadline()
    }

    /// Schedules `payload` to become due after `delay`.
    pub fn enqueue_after(&self, delay: Duration, payload: T) -> Result<(), QueueError> {
        let mut state = self.lock_open()?;
        let deadline = self.clock.now() + delay;
        self.push(&mut state, deadline, payload);
        Ok(())
    }

    /// Schedules `payload` to become due at `deadline`.
    ///
    /// Deadlines in the past are due immediately.
    pub fn enqueue_at(&self, deadline: Time, payload: T) -> Result<(), QueueError> {
        let mut state = self.lock_open()?;
        self.push(&mut state, deadline, payload);
        Ok(())
    }

    /// Schedules `payload` after the queue's default delay.
    pub fn enqueue(&self, payload: T) -> Result<(), QueueError> {
        self.enqueue_after(self.default_delay, payload)
    }

    /// Schedules `payload` ahead of every timestamp-based entry.
    ///
    /// Urgent entries are due at [`Time::ZERO`], so they run before anything
    /// scheduled through a clock reading and, through the sequence
    /// tie-break, in submission order among themselves.
    pub fn enqueue_urgently(&self, payload: T) -> Result<(), QueueError> {
        self.enqueue_at(Time::ZERO, payload)
    }

    /// Blocks until the earliest payload is due and returns it.
    ///
    /// Returns `None` once the queue is closed and nothing due remains.
    pub fn wait_pop(&self) -> Option<T> {
        self.wait_with(None, |heap, now| heap.pop_due(now)).ready()
    }

    /// Blocks until at least one payload is due, then returns every due
    /// payload in deadline order.
    ///
    /// Returns `None` once the queue is closed and nothing due remains.
    pub fn wait_pop_all(&self) -> Option<Vec<T>> {
        self.wait_with(None, |heap, now| non_empty(heap.pop_expired(now)))
            .ready()
    }

    /// Like [`wait_pop`](Self::wait_pop) but gives up after `timeout`.
    pub fn wait_pop_for(&self, timeout: Duration) -> PopOutcome<T> {
        let limit = Instant::now().checked_add(timeout);
        if limit.is_none() {
            return match self.wait_pop() {
                Some(payload) => PopOutcome::Ready(payload),
                None => PopOutcome::Closed,
            };
        }
        self.wait_with(limit, |heap, now| heap.pop_due(now))
    }

    /// Pops the earliest payload if it is due, without blocking.
    pub fn try_pop(&self) -> Option<T> {
        let now = self.clock.now();
        let popped = self.state.lock().heap.pop_due(now);
        if popped.is_some() {
            trace!(queue = %self.name, %now, "popped");
        }
        popped
    }

    /// Pops the earliest payload whether or not it is due.
    ///
    /// Blocks only while the queue is empty and open. Meant for tests that
    /// check ordering without waiting for deadlines.
    pub fn wait_pop_any(&self) -> Option<T> {
        self.wait_with(None, |heap, _| heap.pop_any()).ready()
    }

    /// Pops every pending payload, due or not, in deadline order.
    ///
    /// Blocks only while the queue is empty and open.
    pub fn wait_pop_all_any(&self) -> Option<Vec<T>> {
        self.wait_with(None, |heap, _| non_empty(heap.drain_ordered()))
            .ready()
    }

    /// Discards every pending payload and returns how many were dropped.
    pub fn clear(&self) -> usize {
        let discarded = self.state.lock().heap.drain_ordered();
        // Payloads are dropped outside the lock; their destructors may
        // touch this queue.
        let count = discarded.len();
        drop(discarded);
        debug!(queue = %self.name, discarded = count, "queue cleared");
        count
    }

    /// Closes the queue and wakes every blocked consumer.
    ///
    /// Idempotent and safe to call from inside a running task.
    pub fn shutdown(&self) {
        let was_open = std::mem::replace(&mut self.state.lock().open, false);
        self.wakeup.notify_all();
        if was_open {
            debug!(queue = %self.name, "queue shut down");
        }
    }

    /// Reopens a closed queue.
    pub fn restart(&self) {
        let was_open = std::mem::replace(&mut self.state.lock().open, true);
        if !was_open {
            debug!(queue = %self.name, "queue restarted");
        }
    }

    /// Wakes every blocked consumer so it re-reads the clock.
    ///
    /// Needed after advancing a [`VirtualClock`](crate::time::VirtualClock);
    /// a wall clock needs no help.
    pub fn wake_consumers(&self) {
        let _state = self.state.lock();
        self.wakeup.notify_all();
    }

    fn lock_open(&self) -> Result<MutexGuard<'_, QueueState<T>>, QueueError> {
        let state = self.state.lock();
        if state.open {
            Ok(state)
        } else {
            Err(QueueError::Closed)
        }
    }

    fn push(&self, state: &mut QueueState<T>, deadline: Time, payload: T) {
        let sequence = state.heap.insert(deadline, payload);
        trace!(queue = %self.name, %deadline, sequence = sequence.get(), "enqueued");
        self.wakeup.notify_all();
    }

    /// Shared consumer loop: take whatever `take` yields, otherwise sleep
    /// until the earliest deadline, the optional `limit`, or a notification.
    fn wait_with<R>(
        &self,
        limit: Option<Instant>,
        mut take: impl FnMut(&mut TimerHeap<T>, Time) -> Option<R>,
    ) -> PopOutcome<R> {
        let mut state = self.state.lock();
        loop {
            let now = self.clock.now();
            if let Some(out) = take(&mut state.heap, now) {
                trace!(queue = %self.name, %now, "popped");
                return PopOutcome::Ready(out);
            }
            if !state.open {
                return PopOutcome::Closed;
            }
            if limit.is_some_and(|limit| Instant::now() >= limit) {
                return PopOutcome::TimedOut;
            }

            let due_at = state
                .heap
                .peek_deadline()
                .and_then(|deadline| Instant::now().checked_add(deadline.duration_since(now)));
            match earliest(due_at, limit) {
                Some(wake_at) => {
                    self.wakeup.wait_until(&mut state, wake_at);
                }
                None => self.wakeup.wait(&mut state),
            }
        }
    }
}

fn non_empty<T>(items: Vec<T>) -> Option<Vec<T>> {
    if items.is_empty() { None } else { Some(items) }
}

fn earliest(a: Option<Instant>, b: Option<Instant>) -> Option<Instant> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, None) => a,
        (None, b) => b,
    }
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for TimerQueue<T> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl<T> fmt::Debug for TimerQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("TimerQueue")
            .field("name", &self.name)
            .field("open", &state.open)
            .field("pending", &state.heap.len())
            .field("next_deadline", &state.heap.peek_deadline())
            .field("default_delay", &self.default_delay)
            .finish_non_exhaustive()
    }
}
