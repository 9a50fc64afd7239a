//! Seam to the external MVCC garbage-collection engine.

use crate::error::VacuumError;
use std::time::Duration;

/// Aggregate outcome of one vacuum pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VacuumMetrics {
    /// Row versions examined.
    pub scanned_rows: u64,

    /// Obsolete row versions removed.
    pub cleaned_rows: u64,

    /// Time spent locating cleanup candidates.
    pub search_time: Duration,

    /// Time spent removing them.
    pub cleanup_time: Duration,
}

impl VacuumMetrics {
    /// Fold another pass segment (for example one partition's worth of work)
    /// into this one.
    pub fn merge(&mut self, other: &VacuumMetrics) {
        self.scanned_rows += other.scanned_rows;
        self.cleaned_rows += other.cleaned_rows;
        self.search_time += other.search_time;
        self.cleanup_time += other.cleanup_time;
    }
}

/// Runs one cluster-wide MVCC cleanup pass.
///
/// Implemented by the storage engine; the scheduler calls it once per
/// interval and blocks until the pass completes or fails. Implementations
/// should return promptly after cancellation of the surrounding task.
#[async_trait::async_trait]
pub trait VacuumExecutor: Send + Sync {
    /// Run a single vacuum pass to completion.
    async fn run_vacuum(&self) -> Result<VacuumMetrics, VacuumError>;
}

/// Executor that cleans nothing, for wiring and tests.
#[derive(Debug, Default)]
pub struct NoOpVacuumExecutor;

#[async_trait::async_trait]
impl VacuumExecutor for NoOpVacuumExecutor {
    async fn run_vacuum(&self) -> Result<VacuumMetrics, VacuumError> {
        Ok(VacuumMetrics::default())
    }
}
