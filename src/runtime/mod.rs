//! Timer queue, its consumer loops and the blocking bridge.
//!
//! - [`TimerQueue`]: deadline-ordered queue shared between producers and consumers
//! - [`TimerHeap`]: the `(deadline, sequence)` min-heap underneath it
//! - [`spawn_consumer`] / [`spawn_consumers`]: consumer threads for queues of [`Task`]s
//! - [`TimerQueue::synchronize`]: run a closure on a consumer and wait for its result

mod bridge;
mod builder;
mod consumer;
mod queue;
pub mod timer;

pub use builder::TimerQueueBuilder;
pub use consumer::{ConsumerStats, spawn_consumer, spawn_consumers};
pub use queue::{PopOutcome, Task, TimerQueue};
pub use timer::TimerHeap;
