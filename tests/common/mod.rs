//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::time::{Duration, Instant};

/// Installs the crate's test subscriber.
pub fn init_test_logging() {
    timerq::test_utils::init_test_logging();
}

/// Installs logging and marks the start of `name`.
pub fn init_test(name: &str) {
    init_test_logging();
    timerq::test_phase!(name);
}

/// Polls `cond` until it holds or `timeout` elapses. Returns whether it held.
pub fn wait_until(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let limit = Instant::now() + timeout;
    while Instant::now() < limit {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    cond()
}
