//! timerq: a deadline-ordered task queue and manual/auto-reset events for OS threads.
//!
//! # Overview
//!
//! Producers schedule work on a [`TimerQueue`] for "as soon as possible", after
//! a delay, or at an absolute [`Time`]. One or more consumer threads block
//! until the earliest deadline passes, take the work out, and run it with the
//! queue unlocked. Entries with equal deadlines run in submission order.
//!
//! On top of the queue, [`TimerQueue::synchronize`] turns fire-and-forget
//! submission into a blocking request/response call, and [`Event`] covers the
//! cases where a plain signal is enough.
//!
//! # Core Guarantees
//!
//! - **Deadline order**: earlier deadlines run first; ties run in submission order
//! - **Never early**: a consumer never receives a payload before its deadline
//! - **No lost wake-ups**: an earlier deadline, a shutdown or a set event always
//!   wakes the threads that care about it
//! - **Graceful shutdown**: already-due work is still handed out after
//!   [`TimerQueue::shutdown`]; new submissions fail with [`QueueError::Closed`]
//! - **Isolated failures**: a panicking task is logged and counted; its consumer keeps running
//!
//! # Module Structure
//!
//! - [`types`]: [`Time`] and the insertion [`Sequence`](types::Sequence)
//! - [`time`]: clock abstraction ([`WallClock`](time::WallClock), [`VirtualClock`](time::VirtualClock))
//! - [`sync`]: [`Event`] and the one-shot [`completion`](sync::completion()) channel
//! - [`runtime`]: [`TimerQueue`], its heap, consumer loops and builder
//! - [`config`]: serde-backed [`QueueConfig`](config::QueueConfig)
//! - [`error`](mod@error): error types
//! - [`tracing_compat`]: optional tracing integration (requires `tracing-integration` feature)
//!
//! # Example
//!
//! ```
//! use timerq::runtime::{TimerQueue, spawn_consumer};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let queue: Arc<TimerQueue> = Arc::new(TimerQueue::new());
//! let consumer = spawn_consumer(&queue, "worker").unwrap();
//!
//! queue
//!     .enqueue_after(Duration::from_millis(5), Box::new(|| println!("later")))
//!     .unwrap();
//! let answer = queue.synchronize(|| 40 + 2).unwrap();
//! assert_eq!(answer, 42);
//!
//! queue.shutdown();
//! consumer.join().unwrap();
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::doc_markdown)]

pub mod config;
pub mod error;
pub mod runtime;
pub mod sync;
pub mod time;
pub mod tracing_compat;
pub mod types;

#[cfg(any(test, feature = "test-internals"))]
pub mod test_utils;

pub use config::QueueConfig;
pub use error::{ConfigError, QueueError};
pub use runtime::{PopOutcome, Task, TimerQueue};
pub use sync::{Event, ResetPolicy};
pub use types::Time;
