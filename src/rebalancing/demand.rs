//! Per-exchange tracking of demanded partitions.

use crate::types::{PartitionId, UpdateCounter};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Half-open update-counter interval `[from, to)` to replay from the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterRange {
    /// First counter to replay (inclusive).
    pub from: UpdateCounter,
    /// First counter past the replayed range (exclusive).
    pub to: UpdateCounter,
}

impl CounterRange {
    /// Create a new counter range.
    ///
    /// # Panics
    ///
    /// Panics if `from > to`.
    pub fn new(from: UpdateCounter, to: UpdateCounter) -> Self {
        assert!(
            from <= to,
            "invalid counter range: from {from} > to {to}"
        );

        Self { from, to }
    }

    /// Number of updates covered by the range.
    pub fn len(&self) -> u64 {
        self.to - self.from
    }

    /// Whether the range covers no updates.
    pub fn is_empty(&self) -> bool {
        self.from == self.to
    }
}

/// How a demanded partition is to be resupplied.
///
/// Keying the tracker by partition id with this tagged variant makes the
/// full/historical mutual exclusion structural: a partition can only ever be
/// registered under one kind at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PartitionDemand {
    /// Complete resend of the partition's current contents.
    Full,
    /// Replay of a bounded update-counter range from the owner's log.
    Historical(CounterRange),
}

impl PartitionDemand {
    /// Whether this is a full demand.
    pub fn is_full(&self) -> bool {
        matches!(self, PartitionDemand::Full)
    }

    /// Whether this is a historical demand.
    pub fn is_historical(&self) -> bool {
        matches!(self, PartitionDemand::Historical(_))
    }
}

/// Set of partitions a node must re-acquire during one rebalancing exchange.
///
/// Built incrementally by the rebalancing supervisor, drained to issue demand
/// requests, and discarded when the exchange completes. The backing map is
/// allocated lazily so exchanges with zero demand carry no overhead.
///
/// Registering a partition under one kind while it is already registered
/// under the other is a bug in the caller's exchange logic and panics; it is
/// never reported as a recoverable error.
#[derive(Debug, Clone, Default)]
pub struct DemandedPartitions {
    /// Lazily allocated demand map. `None` until the first insertion.
    demands: Option<HashMap<PartitionId, PartitionDemand>>,

    /// Number of full demands, maintained so aggregate queries stay O(1).
    full_count: usize,

    /// Number of historical demands.
    historical_count: usize,
}

impl DemandedPartitions {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a historical demand for `partition` covering `[from, to)`.
    ///
    /// Re-registering a historical demand replaces the previous range.
    ///
    /// # Panics
    ///
    /// Panics if `partition` already has a full demand, or if `from > to`.
    pub fn add_historical(
        &mut self,
        partition: PartitionId,
        from: UpdateCounter,
        to: UpdateCounter,
    ) {
        assert!(
            !self.has_full_partition(partition),
            "partition {partition} already demanded as full"
        );

        let range = CounterRange::new(from, to);
        let prev = self
            .demands
            .get_or_insert_with(HashMap::new)
            .insert(partition, PartitionDemand::Historical(range));

        if prev.is_none() {
            self.historical_count += 1;
        }
    }

    /// Register a full demand for `partition`.
    ///
    /// # Panics
    ///
    /// Panics if `partition` already has a historical demand.
    pub fn add_full(&mut self, partition: PartitionId) {
        assert!(
            !self.has_historical_partition(partition),
            "partition {partition} already demanded as historical"
        );

        let prev = self
            .demands
            .get_or_insert_with(HashMap::new)
            .insert(partition, PartitionDemand::Full);

        if prev.is_none() {
            self.full_count += 1;
        }
    }

    /// Remove the demand for `partition`, whichever kind holds it.
    ///
    /// Returns whether a demand was actually removed.
    pub fn remove(&mut self, partition: PartitionId) -> bool {
        let removed = self
            .demands
            .as_mut()
            .and_then(|demands| demands.remove(&partition));

        match removed {
            Some(PartitionDemand::Full) => {
                self.full_count -= 1;
                true
            }
            Some(PartitionDemand::Historical(_)) => {
                self.historical_count -= 1;
                true
            }
            None => false,
        }
    }

    /// Look up the demand registered for `partition`.
    pub fn get(&self, partition: PartitionId) -> Option<&PartitionDemand> {
        self.demands.as_ref()?.get(&partition)
    }

    /// Whether any historical demand is registered.
    pub fn has_historical(&self) -> bool {
        self.historical_count > 0
    }

    /// Whether `partition` has a historical demand.
    pub fn has_historical_partition(&self, partition: PartitionId) -> bool {
        matches!(self.get(partition), Some(PartitionDemand::Historical(_)))
    }

    /// Whether any full demand is registered.
    pub fn has_full(&self) -> bool {
        self.full_count > 0
    }

    /// Whether `partition` has a full demand.
    pub fn has_full_partition(&self, partition: PartitionId) -> bool {
        matches!(self.get(partition), Some(PartitionDemand::Full))
    }

    /// Whether no demands are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total number of demanded partitions.
    pub fn len(&self) -> usize {
        self.full_count + self.historical_count
    }

    /// Read-only view of the historical demands.
    ///
    /// Valid (and empty) even when nothing was ever registered.
    pub fn historical(&self) -> impl Iterator<Item = (PartitionId, CounterRange)> + '_ {
        self.demands
            .iter()
            .flatten()
            .filter_map(|(&partition, demand)| match demand {
                PartitionDemand::Historical(range) => Some((partition, *range)),
                PartitionDemand::Full => None,
            })
    }

    /// Read-only view of the fully demanded partition ids.
    ///
    /// Valid (and empty) even when nothing was ever registered.
    pub fn full(&self) -> impl Iterator<Item = PartitionId> + '_ {
        self.demands
            .iter()
            .flatten()
            .filter_map(|(&partition, demand)| match demand {
                PartitionDemand::Full => Some(partition),
                PartitionDemand::Historical(_) => None,
            })
    }

    /// Iterate over all demands.
    pub fn iter(&self) -> impl Iterator<Item = (PartitionId, &PartitionDemand)> + '_ {
        self.demands
            .iter()
            .flatten()
            .map(|(&partition, demand)| (partition, demand))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_empty_tracker() {
        let demands = DemandedPartitions::new();

        assert!(demands.is_empty());
        assert_eq!(demands.len(), 0);
        assert!(!demands.has_full());
        assert!(!demands.has_historical());
        assert_eq!(demands.full().count(), 0);
        assert_eq!(demands.historical().count(), 0);
    }

    #[test]
    fn test_add_full_and_historical() {
        let mut demands = DemandedPartitions::new();

        demands.add_full(1);
        demands.add_historical(2, 100, 250);

        assert!(demands.has_full());
        assert!(demands.has_full_partition(1));
        assert!(!demands.has_full_partition(2));

        assert!(demands.has_historical());
        assert!(demands.has_historical_partition(2));
        assert!(!demands.has_historical_partition(1));

        assert_eq!(demands.len(), 2);
        assert_eq!(
            demands.get(2),
            Some(&PartitionDemand::Historical(CounterRange::new(100, 250)))
        );
    }

    #[test]
    fn test_demand_exclusivity() {
        let mut demands = DemandedPartitions::new();

        demands.add_full(1);
        demands.add_historical(2, 0, 10);
        demands.add_full(3);
        demands.add_historical(4, 5, 5);

        for partition in [1, 2, 3, 4] {
            assert!(
                demands.has_full_partition(partition)
                    ^ demands.has_historical_partition(partition)
            );
        }
    }

    #[test]
    #[should_panic(expected = "already demanded as full")]
    fn test_historical_over_full_panics() {
        let mut demands = DemandedPartitions::new();

        demands.add_full(7);
        demands.add_historical(7, 0, 10);
    }

    #[test]
    #[should_panic(expected = "already demanded as historical")]
    fn test_full_over_historical_panics() {
        let mut demands = DemandedPartitions::new();

        demands.add_historical(7, 0, 10);
        demands.add_full(7);
    }

    #[test]
    #[should_panic(expected = "invalid counter range")]
    fn test_inverted_range_panics() {
        let mut demands = DemandedPartitions::new();

        demands.add_historical(1, 10, 5);
    }

    #[test]
    fn test_re_register_historical_replaces_range() {
        let mut demands = DemandedPartitions::new();

        demands.add_historical(1, 0, 10);
        demands.add_historical(1, 10, 30);

        assert_eq!(demands.len(), 1);
        assert_eq!(
            demands.get(1),
            Some(&PartitionDemand::Historical(CounterRange::new(10, 30)))
        );
    }

    #[test]
    fn test_remove() {
        let mut demands = DemandedPartitions::new();

        demands.add_full(1);
        demands.add_historical(2, 0, 100);

        assert!(demands.remove(1));
        assert!(!demands.has_full());
        assert_eq!(demands.len(), 1);

        assert!(demands.remove(2));
        assert!(demands.is_empty());

        // Removing an absent partition is a no-op.
        assert!(!demands.remove(1));
        assert!(!demands.remove(99));
    }

    #[test]
    fn test_size_consistency() {
        let mut demands = DemandedPartitions::new();

        for partition in 0..8 {
            if partition % 2 == 0 {
                demands.add_full(partition);
            } else {
                demands.add_historical(partition, 0, u64::from(partition) * 10);
            }
        }

        demands.remove(0);
        demands.remove(3);
        demands.remove(42);

        assert_eq!(
            demands.len(),
            demands.full().count() + demands.historical().count()
        );
        assert_eq!(demands.is_empty(), demands.len() == 0);
        assert_eq!(demands.len(), 6);
    }

    #[test]
    fn test_views_cover_registered_partitions() {
        let mut demands = DemandedPartitions::new();

        demands.add_full(10);
        demands.add_full(11);
        demands.add_historical(20, 1, 2);

        let full: HashSet<_> = demands.full().collect();
        assert_eq!(full, HashSet::from([10, 11]));

        let historical: Vec<_> = demands.historical().collect();
        assert_eq!(historical, vec![(20, CounterRange::new(1, 2))]);

        assert_eq!(demands.iter().count(), 3);
    }

    #[test]
    fn test_counter_range_len() {
        assert_eq!(CounterRange::new(100, 250).len(), 150);
        assert!(CounterRange::new(5, 5).is_empty());
        assert!(!CounterRange::new(5, 6).is_empty());
    }

    #[test]
    fn test_demand_serialization() {
        let demand = PartitionDemand::Historical(CounterRange::new(100, 250));
        let bytes = bincode::serialize(&demand).unwrap();
        let decoded: PartitionDemand = bincode::deserialize(&bytes).unwrap();

        assert_eq!(demand, decoded);
        assert!(decoded.is_historical());
        assert!(PartitionDemand::Full.is_full());
    }
}
