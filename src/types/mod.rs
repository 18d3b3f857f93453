//! Core value types shared by the clock, the heap and the queue.

pub mod time;

pub use time::{Sequence, Time};
