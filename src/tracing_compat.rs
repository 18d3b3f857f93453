//! Optional `tracing` integration.
//!
//! With the `tracing-integration` feature enabled these are the `tracing`
//! macros. Without it they expand to dead code that only borrows the field
//! values, so call sites compile warning-free and nothing runs at runtime.

#[cfg(feature = "tracing-integration")]
pub use tracing::{debug, error, info, trace, warn};

#[cfg(not(feature = "tracing-integration"))]
pub(crate) mod noop {
    /// Accepts the `tracing` event syntax used in this crate: `key = %v`,
    /// `key = ?v`, `key = v`, `%v`, `?v`, `v`, then a message literal.
    macro_rules! noop_event {
        () => {};
        ($msg:literal $(, $arg:expr)*) => {
            if false {
                let _ = ::core::format_args!($msg $(, $arg)*);
            }
        };
        ($key:ident = % $value:expr $(, $($rest:tt)*)?) => {
            if false {
                let _ = &$value;
            }
            $($crate::tracing_compat::noop::noop_event!($($rest)*);)?
        };
        ($key:ident = ? $value:expr $(, $($rest:tt)*)?) => {
            if false {
                let _ = &$value;
            }
            $($crate::tracing_compat::noop::noop_event!($($rest)*);)?
        };
        ($key:ident = $value:expr $(, $($rest:tt)*)?) => {
            if false {
                let _ = &$value;
            }
            $($crate::tracing_compat::noop::noop_event!($($rest)*);)?
        };
        (% $value:ident $(, $($rest:tt)*)?) => {
            if false {
                let _ = &$value;
            }
            $($crate::tracing_compat::noop::noop_event!($($rest)*);)?
        };
        (? $value:ident $(, $($rest:tt)*)?) => {
            if false {
                let _ = &$value;
            }
            $($crate::tracing_compat::noop::noop_event!($($rest)*);)?
        };
        ($value:ident $(, $($rest:tt)*)?) => {
            if false {
                let _ = &$value;
            }
            $($crate::tracing_compat::noop::noop_event!($($rest)*);)?
        };
    }

    pub(crate) use noop_event;
}

#[cfg(not(feature = "tracing-integration"))]
#[allow(unused_imports)]
pub(crate) use noop::{
    noop_event as debug, noop_event as error, noop_event as info, noop_event as trace,
    noop_event as warn,
};
