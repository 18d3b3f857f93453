//! Test logging helpers.
//!
//! Every test starts with [`init_test_logging`] and brackets itself with
//! [`test_phase!`](crate::test_phase) / [`test_complete!`](crate::test_complete)
//! so interleaved output from threaded tests stays attributable. Set
//! `RUST_LOG` to change verbosity (default `debug`).

use std::sync::Once;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Installs a global `tracing` subscriber that writes through the test
/// harness. Safe to call from every test.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_thread_names(true)
            .try_init();
    });
}

/// Logs the start of a named test phase.
#[macro_export]
macro_rules! test_phase {
    ($name:expr) => {
        ::tracing::info!(phase = %$name, "==== test phase ====");
    };
}

/// Logs the successful end of a named test.
#[macro_export]
macro_rules! test_complete {
    ($name:expr) => {
        ::tracing::info!(test = %$name, "test complete");
    };
}

/// Asserts a condition, logging expected and actual values first.
#[macro_export]
macro_rules! assert_with_log {
    ($cond:expr, $what:expr, $expected:expr, $actual:expr) => {{
        let ok = $cond;
        ::tracing::debug!(
            check = %$what,
            expected = ?$expected,
            actual = ?$actual,
            ok,
            "assert"
        );
        assert!(
            ok,
            "{}: expected {:?}, got {:?}",
            $what, $expected, $actual
        );
    }};
}
