//! Bounded retry pacing for distributed operations.
//!
//! Any distributed handshake that retries (rebalancing demand requests,
//! vacuum coordination, join/reconnect attempts) must stay within a hard
//! wall-clock budget while backing off between attempts. This module
//! provides the timeout side of that discipline; the caller owns the actual
//! sleeping and retrying:
//!
//! ```rust
//! use cortado::retry::{BackoffConfig, ExponentialBackoffTimeout};
//! use std::time::Duration;
//!
//! # fn attempt_operation(_timeout: Duration) -> bool { true }
//! let config = BackoffConfig::default()
//!     .with_total_timeout(Duration::from_secs(30))
//!     .with_initial_timeout(Duration::from_millis(500));
//!
//! let mut backoff = ExponentialBackoffTimeout::new(config);
//!
//! while !backoff.check_timeout() {
//!     let timeout = match backoff.get_and_calculate_next_timeout() {
//!         Ok(timeout) => timeout,
//!         Err(_) => break, // budget exhausted, escalate
//!     };
//!
//!     if attempt_operation(timeout) {
//!         break;
//!     }
//! }
//! ```

mod backoff;

pub use backoff::{
    next_timeout, total_backoff_timeout, BackoffConfig, ExponentialBackoffTimeout,
};
