//! Rebalancing demand bookkeeping for topology exchanges.
//!
//! When the cluster topology changes, a node may become responsible for
//! partitions it does not yet hold. For each exchange the rebalancing
//! supervisor records which partitions it must re-acquire and by which
//! method:
//!
//! - **Full demand**: the complete current contents of the partition are
//!   resent by the current owner.
//! - **Historical demand**: only the missing update-counter range is
//!   replayed from the owner's update log.
//!
//! # Lifecycle
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Rebalancing supervisor                      │
//! │                                                             │
//! │  topology change                                            │
//! │        │                                                    │
//! │        ▼                                                    │
//! │  DemandedPartitions::new()                                  │
//! │        │  add_full / add_historical per missing partition   │
//! │        ▼                                                    │
//! │  drain via full() / historical()  ──►  demand requests      │
//! │        │                               to current owners    │
//! │        ▼                                                    │
//! │  remove(partition) as data arrives                          │
//! │        │                                                    │
//! │        ▼                                                    │
//! │  is_empty()  ──►  exchange complete, tracker discarded      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! A tracker is built by a single writer during one exchange and then shared
//! read-only; it provides no internal locking.

mod demand;

pub use demand::{CounterRange, DemandedPartitions, PartitionDemand};
