//! MVCC vacuum scheduling.
//!
//! Multi-version storage accumulates record versions that are no longer
//! visible to any active transaction or snapshot. The vacuum subsystem
//! periodically asks the storage engine's garbage collector (the
//! [`VacuumExecutor`]) to run one cleanup pass over those versions.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    VacuumScheduler                          │
//! │                                                             │
//! │  sleep(interval)          ── initial delay                  │
//! │        │                                                    │
//! │        ▼                                                    │
//! │  ┌──────────────────────────────────────────────────────┐  │
//! │  │  next = now + interval                               │  │
//! │  │  executor.run_vacuum().await   ── one blocking pass  │  │
//! │  │  sleep_until(next)             ── unless overrun     │  │
//! │  └──────────────────────────────────────────────────────┘  │
//! │        │                      │                             │
//! │   cancellation           executor error                     │
//! │        ▼                      ▼                             │
//! │    Cancelled          Failed + VacuumErrorState             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Passes are strictly sequential; a pass that overruns its slot delays the
//! next one but is never compensated with catch-up bursts. An executor
//! failure is a standing condition: the scheduler records it once in the
//! node-wide [`VacuumErrorState`] and stops permanently until an operator
//! restarts the subsystem.

mod executor;
mod scheduler;

pub use executor::{NoOpVacuumExecutor, VacuumExecutor, VacuumMetrics};
pub use scheduler::{VacuumConfig, VacuumErrorState, VacuumScheduler, VacuumSchedulerState};
