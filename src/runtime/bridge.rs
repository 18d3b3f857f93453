//! Blocking request/response on top of a task queue.

use crate::error::QueueError;
use crate::runtime::consumer;
use crate::runtime::queue::{Task, TimerQueue};
use crate::sync::completion;
use crate::tracing_compat::trace;

impl TimerQueue<Task> {
    /// Runs `f` on a consumer thread and blocks until its result is back.
    ///
    /// The call is queued urgently, so it runs ahead of timed work and in
    /// submission order relative to other urgent submissions. Called from
    /// inside this queue's own consumer loop, `f` runs inline instead; the
    /// consumer would otherwise wait on itself. The inline path reports the
    /// same errors as the queued one.
    ///
    /// # Errors
    ///
    /// - [`QueueError::Closed`] if the queue is shut down.
    /// - [`QueueError::TaskPanicked`] if `f` panicked on the consumer.
    /// - [`QueueError::Abandoned`] if the task was discarded unrun, e.g. by
    ///   [`clear`](TimerQueue::clear).
    ///
    /// # Example
    ///
    /// ```
    /// use timerq::runtime::{TimerQueue, spawn_consumer};
    /// use std::sync::Arc;
    ///
    /// let queue: Arc<TimerQueue> = Arc::new(TimerQueue::new());
    /// let consumer = spawn_consumer(&queue, "worker").unwrap();
    ///
    /// assert_eq!(queue.synchronize(|| 6 * 7), Ok(42));
    ///
    /// queue.shutdown();
    /// consumer.join().unwrap();
    /// ```
    pub fn synchronize<R, F>(&self, f: F) -> Result<R, QueueError>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        if consumer::is_consuming(self) {
            if !self.is_open() {
                return Err(QueueError::Closed);
            }
            trace!(queue = %self.name(), "synchronize on consumer thread, running inline");
            return consumer::catch_panic(self.name(), f).ok_or(QueueError::TaskPanicked);
        }
        let (completer, waiter) = completion();
        self.enqueue_urgently(Box::new(move || completer.complete(f())))?;
        waiter.wait()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::spawn_consumer;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    fn init_test(name: &str) {
        crate::test_utils::init_test_logging();
        crate::test_phase!(name);
    }

    fn failing_call() -> u32 {
        panic!("request failed");
    }

    #[test]
    fn synchronize_returns_result_from_consumer_thread() {
        init_test("synchronize_returns_result_from_consumer_thread");
        let queue: Arc<TimerQueue> = Arc::new(TimerQueue::new());
        let consumer = spawn_consumer(&queue, "bridge-worker").expect("spawn");

        let ran_on = queue.synchronize(|| thread::current().name().map(str::to_owned));
        crate::assert_with_log!(
            ran_on == Ok(Some("bridge-worker".to_owned())),
            "ran on the consumer",
            "bridge-worker",
            ran_on
        );

        queue.shutdown();
        consumer.join().expect("consumer panicked");
        crate::test_complete!("synchronize_returns_result_from_consumer_thread");
    }

    #[test]
    fn synchronize_on_closed_queue_fails() {
        init_test("synchronize_on_closed_queue_fails");
        let queue: TimerQueue = TimerQueue::new();
        queue.shutdown();
        assert_eq!(queue.synchronize(|| 1), Err(QueueError::Closed));
        crate::test_complete!("synchronize_on_closed_queue_fails");
    }

    #[test]
    fn panicking_request_reports_task_panicked() {
        init_test("panicking_request_reports_task_panicked");
        let queue: Arc<TimerQueue> = Arc::new(TimerQueue::new());
        let consumer = spawn_consumer(&queue, "bridge-panic").expect("spawn");

        assert_eq!(queue.synchronize(failing_call), Err(QueueError::TaskPanicked));
        // The consumer survives and keeps serving.
        assert_eq!(queue.synchronize(|| 5), Ok(5));

        queue.shutdown();
        let stats = consumer.join().expect("consumer panicked");
        assert_eq!(stats.panicked, 1);
        crate::test_complete!("panicking_request_reports_task_panicked");
    }

    #[test]
    fn cleared_request_reports_abandoned() {
        init_test("cleared_request_reports_abandoned");
        let queue: Arc<TimerQueue> = Arc::new(TimerQueue::new());
        let caller = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.synchronize(|| "never"))
        };
        while queue.is_empty() {
            thread::sleep(Duration::from_millis(1));
        }
        assert_eq!(queue.clear(), 1);
        let outcome = caller.join().expect("caller panicked");
        assert_eq!(outcome, Err(QueueError::Abandoned));
        crate::test_complete!("cleared_request_reports_abandoned");
    }

    #[test]
    fn nested_synchronize_runs_inline() {
        init_test("nested_synchronize_runs_inline");
        let queue: Arc<TimerQueue> = Arc::new(TimerQueue::new());
        let consumer = spawn_consumer(&queue, "bridge-nested").expect("spawn");

        let inner = Arc::clone(&queue);
        let outcome = queue.synchronize(move || inner.synchronize(|| 9));
        assert_eq!(outcome, Ok(Ok(9)));

        queue.shutdown();
        consumer.join().expect("consumer panicked");
        crate::test_complete!("nested_synchronize_runs_inline");
    }

    #[test]
    fn nested_synchronize_after_shutdown_is_closed() {
        init_test("nested_synchronize_after_shutdown_is_closed");
        let queue: Arc<TimerQueue> = Arc::new(TimerQueue::new());
        let outcome = Arc::new(Mutex::new(None));
        {
            let inner = Arc::clone(&queue);
            let outcome = Arc::clone(&outcome);
            queue
                .enqueue_urgently(Box::new(move || {
                    inner.shutdown();
                    *outcome.lock() = Some(inner.synchronize(|| 1));
                }))
                .expect("open");
        }
        let stats = queue.run();
        let outcome = *outcome.lock();
        crate::assert_with_log!(
            outcome == Some(Err(QueueError::Closed)),
            "closed queue rejects inline call",
            Some(Err::<i32, _>(QueueError::Closed)),
            outcome
        );
        assert_eq!(stats.executed, 1);
        crate::test_complete!("nested_synchronize_after_shutdown_is_closed");
    }

    #[test]
    fn nested_panicking_request_reports_task_panicked() {
        init_test("nested_panicking_request_reports_task_panicked");
        let queue: Arc<TimerQueue> = Arc::new(TimerQueue::new());
        let outcome = Arc::new(Mutex::new(None));
        {
            let inner = Arc::clone(&queue);
            let outcome = Arc::clone(&outcome);
            queue
                .enqueue_urgently(Box::new(move || {
                    *outcome.lock() = Some(inner.synchronize(failing_call));
                }))
                .expect("open");
        }
        queue.shutdown();
        let stats = queue.run();
        let outcome = *outcome.lock();
        crate::assert_with_log!(
            outcome == Some(Err(QueueError::TaskPanicked)),
            "inline panic reported to the caller",
            Some(Err::<u32, _>(QueueError::TaskPanicked)),
            outcome
        );
        crate::assert_with_log!(
            stats.executed == 1 && stats.panicked == 0,
            "enclosing task completed",
            (1, 0),
            (stats.executed, stats.panicked)
        );
        crate::test_complete!("nested_panicking_request_reports_task_panicked");
    }
}
