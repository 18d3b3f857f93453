//! Clock abstraction.
//!
//! - [`TimeSource`]: trait every clock implements
//! - [`WallClock`]: monotonic production clock
//! - [`VirtualClock`]: manually advanced clock for tests

mod clock;

pub use clock::{TimeSource, VirtualClock, WallClock};
