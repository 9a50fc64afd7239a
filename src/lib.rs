//! Cluster-maintenance primitives for a partitioned in-memory distributed cache.
//!
//! This crate provides the bookkeeping and pacing machinery a cache node
//! needs to stay healthy through topology changes and multi-version garbage
//! collection:
//!
//! - **Demand tracking** — per-exchange record of which partitions a node
//!   must re-acquire during rebalancing, split into full resends and
//!   historical update-log replays
//! - **Bounded backoff** — exponential per-attempt timeouts under a hard
//!   wall-clock budget for any retried distributed operation
//! - **Vacuum scheduling** — a self-pacing background loop that triggers
//!   MVCC cleanup passes and contains its own failure
//!
//! The storage engine, transport, MVCC algorithm, and topology coordination
//! are external collaborators; this crate only defines the seams it consumes
//! them through.
//!
//! # Example
//!
//! ```rust,no_run
//! use cortado::rebalancing::DemandedPartitions;
//! use cortado::vacuum::{NoOpVacuumExecutor, VacuumConfig, VacuumScheduler};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     // Bookkeeping for one rebalancing exchange.
//!     let mut demands = DemandedPartitions::new();
//!     demands.add_full(3);
//!     demands.add_historical(7, 1_200, 4_800);
//!
//!     // Drain the tracker to issue demand requests to the current owners.
//!     let full: Vec<_> = demands.full().collect();
//!     let historical: Vec<_> = demands.historical().collect();
//!     assert_eq!((full.len(), historical.len()), (1, 1));
//!
//!     // Background MVCC cleanup, one pass every 5 seconds.
//!     let scheduler = Arc::new(VacuumScheduler::new(
//!         VacuumConfig::default().with_interval(Duration::from_secs(5)),
//!         Arc::new(NoOpVacuumExecutor),
//!     ));
//!     let handle = scheduler.clone().spawn();
//!
//!     // ... node lifetime ...
//!
//!     scheduler.cancel();
//!     handle.await.unwrap();
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │        Rebalancing supervisor (external)    │
//! │   builds / drains one tracker per exchange  │
//! └─────────────────────────────────────────────┘
//!                     │
//!     ┌───────────────┼───────────────┐
//!     ▼               ▼               ▼
//! ┌─────────┐   ┌──────────┐   ┌───────────┐
//! │ Demand  │   │ Backoff  │   │  Vacuum   │
//! │Tracking │   │ Timeouts │   │ Scheduler │
//! └─────────┘   └──────────┘   └───────────┘
//!                                    │
//!                                    ▼
//!                        ┌───────────────────────┐
//!                        │ VacuumExecutor (seam  │
//!                        │ to the MVCC engine)   │
//!                        └───────────────────────┘
//! ```
//!
//! # Error model
//!
//! Caller bugs (demanding a partition under both kinds, inverted counter
//! ranges, sub-1.0 multipliers) panic. Everything recoverable is a
//! distinguishable [`Error`] variant: retry exhaustion is [`Error::Timeout`],
//! a dead GC subsystem is [`Error::Vacuum`], so callers branch without
//! string matching.

pub mod error;
pub mod rebalancing;
pub mod retry;
pub mod types;
pub mod vacuum;

// Re-export main types for convenience
pub use error::{Error, Result, VacuumError};
pub use rebalancing::{CounterRange, DemandedPartitions, PartitionDemand};
pub use retry::{next_timeout, total_backoff_timeout, BackoffConfig, ExponentialBackoffTimeout};
pub use types::{PartitionId, UpdateCounter};
pub use vacuum::{
    NoOpVacuumExecutor, VacuumConfig, VacuumErrorState, VacuumExecutor, VacuumMetrics,
    VacuumScheduler, VacuumSchedulerState,
};
