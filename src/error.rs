//! Error types for the cluster-maintenance primitives.

use thiserror::Error;

/// Result type alias for cluster-maintenance operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the cluster-maintenance primitives.
///
/// Contract violations (for example demanding the same partition under both
/// rebalancing kinds) are caller bugs and surface as panics, never as a
/// variant of this enum.
#[derive(Error, Debug)]
pub enum Error {
    /// The retry budget of a backoff strategy is exhausted, either because
    /// the wall-clock budget elapsed or because the attempt limit was hit.
    #[error("operation timed out")]
    Timeout,

    /// The operation was cancelled.
    #[error("operation cancelled")]
    Cancelled,

    /// The vacuum subsystem failed.
    #[error("vacuum error: {0}")]
    Vacuum(#[from] VacuumError),
}

/// Errors reported by the external vacuum executor.
///
/// `Clone` so a single failure can be both propagated to the caller and
/// retained in the node-wide [`VacuumErrorState`](crate::vacuum::VacuumErrorState).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VacuumError {
    /// A cleanup pass started but did not complete.
    #[error("vacuum pass failed: {0}")]
    PassFailed(String),

    /// The executor is not in a state where it can run a pass.
    #[error("vacuum executor unavailable: {0}")]
    ExecutorUnavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds_are_distinguishable() {
        let timeout = Error::Timeout;
        let vacuum = Error::Vacuum(VacuumError::PassFailed("disk full".into()));

        assert!(matches!(timeout, Error::Timeout));
        assert!(matches!(vacuum, Error::Vacuum(VacuumError::PassFailed(_))));
    }

    #[test]
    fn test_vacuum_error_converts_to_crate_error() {
        let err: Error = VacuumError::ExecutorUnavailable("stopped".into()).into();
        assert!(matches!(err, Error::Vacuum(_)));
    }
}
