//! Discrete-event simulation driver.
//!
//! For every root the driver seeds a FIFO queue with the root's `initiate`
//! output and processes messages until the queue drains:
//!
//! 1. Pop the front message and count it by kind
//! 2. For a Broadcast, record its path in the root's cycle set
//! 3. Dispatch to the target's handler (a Broadcast goes to every node)
//! 4. Append everything the handler emitted to the back of the queue
//!
//! Per-root cycle sets are then merged (as a union) into the run's global set.
//! Ordering is insertion order only, so with a seeded RNG a run is fully
//! deterministic.
//!
//! Termination follows from ttl strictly decreasing on every relay, but
//! breadth grows as `max_degree^ttl`; the queue is capped and overflow is
//! reported as [`SimError::Capacity`](crate::SimError::Capacity).

mod driver;
mod stats;

pub use driver::{RootOutcome, RunSummary, Simulator};
pub use stats::{CycleSet, MessageCounts};
