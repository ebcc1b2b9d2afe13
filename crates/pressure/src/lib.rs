//! # pressure: bounded queue with explicit backpressure
//!
//! A fixed-capacity FIFO ring over caller-owned storage. It never grows,
//! accounts for every item it receives, and makes overflow a deliberate
//! choice instead of a silent failure.
//!
//! ## Key Principles
//!
//! - **Bounded memory**: storage is supplied once, at construction; no
//!   operation allocates or frees
//! - **O(1) everything**: enqueue, dequeue and peek are index arithmetic
//! - **No silent loss**: every item is dequeued, resident, evicted,
//!   discarded or rejected, and the [`Stats`] ledger always balances
//! - **Sticky faults**: misuse (reentrancy) or an exhausted sequence counter
//!   stops the queue until an explicit [`Queue::reset`]
//!
//! ## Architecture
//!
//! - `ring`: raw circular buffer mechanics (head, tail, count)
//! - [`policy`]: what happens when an item meets a full queue
//! - [`classifier`]: fill level to [`PressureState`] with watermarks
//! - [`ledger`]: outcome counters and the balance equation
//! - [`guard`]: reentrancy detection and the fault state
//! - [`queue`]: the [`Queue`] aggregate tying them together
//!
//! ## Example
//!
//! ```
//! use pressure::{Item, OverflowPolicy, PressureState, Queue, QueueConfig, QueueError};
//!
//! let mut slots = [Item::EMPTY; 4];
//! let config = QueueConfig::with_capacity(4).with_policy(OverflowPolicy::Reject);
//! let queue = Queue::new(config, &mut slots[..])?;
//!
//! for payload in 1..=4 {
//!     queue.enqueue(payload, 1_000 + payload)?;
//! }
//! assert_eq!(queue.pressure_state(), PressureState::Critical);
//!
//! // A full queue under REJECT pushes back on the producer.
//! assert_eq!(queue.enqueue(5, 1_005), Err(QueueError::Full));
//! assert_eq!(queue.stats().rejected, 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod classifier;
mod config;
mod error;
pub mod guard;
mod item;
pub mod ledger;
pub mod policy;
pub mod queue;
mod ring;


/// Largest capacity a queue may be configured with.
pub const MAX_CAPACITY: u32 = 4096;

pub use classifier::{PressureState, Transition, Watermarks};
pub use config::{DEFAULT_CAPACITY, QueueConfig};
pub use error::{ConfigError, ErrorCode, FaultReason, QueueError};
pub use guard::GuardState;
pub use item::{Item, Sequence, Storage};
pub use ledger::Stats;
pub use policy::OverflowPolicy;
pub use queue::{Queue, QueueOutcome};
