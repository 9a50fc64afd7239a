//! Core types used throughout the crate.

/// Partition identifier within a cache group.
pub type PartitionId = u32;

/// Monotonic per-partition update counter.
///
/// Historical rebalancing replays the half-open counter interval a node is
/// missing from the update log instead of resending the whole partition.
pub type UpdateCounter = u64;
