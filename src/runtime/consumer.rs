//! Consumer loops for queues of [`Task`]s.
//!
//! A consumer pops due tasks and runs them one at a time with the queue lock
//! released. A panicking task is caught, logged and counted; the loop keeps
//! going, because a dead consumer would stall every timer behind it.

use crate::runtime::queue::{Task, TimerQueue};
use crate::tracing_compat::{debug, error};
use std::any::Any;
use std::cell::Cell;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Counters reported by a consumer loop when it exits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsumerStats {
    /// Tasks that ran to completion.
    pub executed: u64,
    /// Tasks that panicked.
    pub panicked: u64,
    /// Batches taken by [`TimerQueue::run_batched`]; zero for [`TimerQueue::run`].
    pub batches: u64,
}

impl ConsumerStats {
    fn record(&mut self, completed: bool) {
        if completed {
            self.executed += 1;
        } else {
            self.panicked += 1;
        }
    }
}

thread_local! {
    /// Address of the queue whose consumer loop this thread is running.
    static CONSUMING: Cell<usize> = const { Cell::new(0) };
}

struct ConsumerScope {
    previous: usize,
}

impl ConsumerScope {
    fn enter(queue: &TimerQueue<Task>) -> Self {
        let previous = CONSUMING.with(|c| c.replace(queue_addr(queue)));
        Self { previous }
    }
}

impl Drop for ConsumerScope {
    fn drop(&mut self) {
        CONSUMING.with(|c| c.set(self.previous));
    }
}

fn queue_addr(queue: &TimerQueue<Task>) -> usize {
    std::ptr::from_ref(queue) as usize
}

/// Returns true if the calling thread is inside `queue`'s consumer loop.
pub(crate) fn is_consuming(queue: &TimerQueue<Task>) -> bool {
    CONSUMING.with(|c| c.get() == queue_addr(queue))
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.as_str()
    } else {
        "<non-string panic payload>"
    }
}

/// Runs `f`, containing and logging any panic. Returns `None` if it panicked.
pub(crate) fn catch_panic<R>(queue: &str, f: impl FnOnce() -> R) -> Option<R> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(out) => Some(out),
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            error!(queue = %queue, panic = %message, "task panicked; consumer continues");
            None
        }
    }
}

/// Runs one task. Returns false if it panicked.
fn run_isolated(queue: &str, task: Task) -> bool {
    catch_panic(queue, task).is_some()
}

impl TimerQueue<Task> {
    /// Runs due tasks one at a time until the queue is shut down and no due
    /// work remains.
    pub fn run(&self) -> ConsumerStats {
        let _scope = ConsumerScope::enter(self);
        debug!(queue = %self.name(), "consumer started");
        let mut stats = ConsumerStats::default();
        while let Some(task) = self.wait_pop() {
            stats.record(run_isolated(self.name(), task));
        }
        debug!(
            queue = %self.name(),
            executed = stats.executed,
            panicked = stats.panicked,
            "consumer stopped"
        );
        stats
    }

    /// Like [`run`](Self::run) but takes every due task per wake-up.
    ///
    /// Every task of a batch runs even if an earlier one shuts the queue
    /// down; once dequeued, a task always runs.
    pub fn run_batched(&self) -> ConsumerStats {
        let _scope = ConsumerScope::enter(self);
        debug!(queue = %self.name(), "batched consumer started");
        let mut stats = ConsumerStats::default();
        while let Some(batch) = self.wait_pop_all() {
            stats.batches += 1;
            for task in batch {
                stats.record(run_isolated(self.name(), task));
            }
        }
        debug!(
            queue = %self.name(),
            executed = stats.executed,
            panicked = stats.panicked,
            batches = stats.batches,
            "batched consumer stopped"
        );
        stats
    }
}

/// Runs [`TimerQueue::run`] on a new thread called `name`.
///
/// The thread holds a reference to the queue, so the queue must be shut
/// down for the thread to finish.
pub fn spawn_consumer(
    queue: &Arc<TimerQueue<Task>>,
    name: impl Into<String>,
) -> io::Result<JoinHandle<ConsumerStats>> {
    let queue = Arc::clone(queue);
    thread::Builder::new()
        .name(name.into())
        .spawn(move || queue.run())
}

/// Starts [`TimerQueue::consumer_count`] consumer threads named
/// `<queue>-consumer-<n>`.
pub fn spawn_consumers(
    queue: &Arc<TimerQueue<Task>>,
) -> io::Result<Vec<JoinHandle<ConsumerStats>>> {
    (0..queue.consumer_count())
        .map(|n| spawn_consumer(queue, format!("{}-consumer-{n}", queue.name())))
        .collect()
}
