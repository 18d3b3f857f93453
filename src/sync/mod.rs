//! Blocking coordination primitives.
//!
//! - [`Event`]: manual/auto-reset signal with timed waits and
//!   closure-under-lock operations
//! - [`completion`]: one-shot result hand-off built on [`Event`]

pub mod completion;
mod event;

pub use completion::{Completer, CompletionWaiter, completion};
pub use event::{Event, ResetPolicy};
