//! One-shot result hand-off between a consumer and a blocked caller.
//!
//! [`completion`] returns a [`Completer`] that travels with a task and a
//! [`CompletionWaiter`] that stays with the caller. The value is stored
//! inside [`Event::set_then`] so storing and signalling is one step.
//!
//! A completer that is dropped without delivering still releases the
//! waiter, with [`QueueError::TaskPanicked`] when the drop happens during a
//! panic and [`QueueError::Abandoned`] otherwise.

use crate::error::QueueError;
use crate::sync::Event;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

struct Shared<R> {
    ready: Event,
    slot: Mutex<Option<Result<R, QueueError>>>,
}

impl<R> Shared<R> {
    fn deliver(&self, outcome: Result<R, QueueError>) {
        self.ready.set_then(|| *self.slot.lock() = Some(outcome));
    }

    fn take(&self) -> Result<R, QueueError> {
        self.slot.lock().take().unwrap_or(Err(QueueError::Abandoned))
    }
}

/// Creates a connected completer/waiter pair.
#[must_use]
pub fn completion<R>() -> (Completer<R>, CompletionWaiter<R>) {
    let shared = Arc::new(Shared {
        ready: Event::manual(),
        slot: Mutex::new(None),
    });
    (
        Completer {
            shared: Some(Arc::clone(&shared)),
        },
        CompletionWaiter { shared },
    )
}

/// Sending half. Delivers exactly one outcome.
pub struct Completer<R> {
    shared: Option<Arc<Shared<R>>>,
}

impl<R> Completer<R> {
    /// Delivers the value and releases the waiter.
    pub fn complete(mut self, value: R) {
        if let Some(shared) = self.shared.take() {
            shared.deliver(Ok(value));
        }
    }
}

impl<R> Drop for Completer<R> {
    fn drop(&mut self) {
        if let Some(shared) = self.shared.take() {
            let err = if std::thread::panicking() {
                QueueError::TaskPanicked
            } else {
                QueueError::Abandoned
            };
            shared.deliver(Err(err));
        }
    }
}

impl<R> std::fmt::Debug for Completer<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Completer")
            .field("delivered", &self.shared.is_none())
            .finish()
    }
}

/// Receiving half.
pub struct CompletionWaiter<R> {
    shared: Arc<Shared<R>>,
}

impl<R> CompletionWaiter<R> {
    /// Blocks until the completer delivers or is dropped.
    pub fn wait(self) -> Result<R, QueueError> {
        self.shared.ready.wait_then(|| self.shared.take())
    }

    /// Like [`wait`](Self::wait) but gives up after `timeout`, handing the
    /// waiter back so the caller can keep waiting.
    pub fn wait_for(self, timeout: Duration) -> Result<Result<R, QueueError>, Self> {
        match self.shared.ready.wait_for_then(timeout, || self.shared.take()) {
            Some(outcome) => Ok(outcome),
            None => Err(self),
        }
    }

    /// Returns true once an outcome has been delivered.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.shared.ready.is_set()
    }
}

impl<R> std::fmt::Debug for CompletionWaiter<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionWaiter")
            .field("ready", &self.is_ready())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn init_test(name: &str) {
        crate::test_utils::init_test_logging();
        crate::test_phase!(name);
    }

    #[test]
    fn complete_delivers_value_across_threads() {
        init_test("complete_delivers_value_across_threads");
        let (completer, waiter) = completion::<String>();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            completer.complete("done".to_owned());
        });
        let value = waiter.wait();
        crate::assert_with_log!(
            value == Ok("done".to_owned()),
            "value delivered",
            "done",
            value
        );
        handle.join().expect("completer thread panicked");
        crate::test_complete!("complete_delivers_value_across_threads");
    }

    #[test]
    fn dropped_completer_reports_abandoned() {
        init_test("dropped_completer_reports_abandoned");
        let (completer, waiter) = completion::<u32>();
        drop(completer);
        assert!(waiter.is_ready());
        assert_eq!(waiter.wait(), Err(QueueError::Abandoned));
        crate::test_complete!("dropped_completer_reports_abandoned");
    }

    fn fail_holding(completer: Completer<u32>) {
        let _completer = completer;
        panic!("task failed");
    }

    #[test]
    fn completer_dropped_during_panic_reports_panicked() {
        init_test("completer_dropped_during_panic_reports_panicked");
        let (completer, waiter) = completion::<u32>();
        let handle = thread::spawn(move || fail_holding(completer));
        assert!(handle.join().is_err());
        assert_eq!(waiter.wait(), Err(QueueError::TaskPanicked));
        crate::test_complete!("completer_dropped_during_panic_reports_panicked");
    }

    #[test]
    fn wait_for_times_out_then_succeeds() {
        init_test("wait_for_times_out_then_succeeds");
        let (completer, waiter) = completion::<u8>();
        let Err(waiter) = waiter.wait_for(Duration::from_millis(10)) else {
            panic!("nothing was delivered yet");
        };
        completer.complete(3);
        assert_eq!(waiter.wait_for(Duration::from_millis(10)).ok(), Some(Ok(3)));
        crate::test_complete!("wait_for_times_out_then_succeeds");
    }
}
