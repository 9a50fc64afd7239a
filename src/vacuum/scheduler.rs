//! Background scheduler driving periodic vacuum passes.

use crate::error::VacuumError;
use crate::vacuum::executor::VacuumExecutor;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{sleep, sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Configuration for the vacuum scheduler.
#[derive(Debug, Clone, Copy)]
pub struct VacuumConfig {
    /// Target spacing between consecutive pass starts.
    pub interval: Duration,
}

impl Default for VacuumConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
        }
    }
}

impl VacuumConfig {
    /// Set the vacuum interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

/// Lifecycle state of the scheduler loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VacuumSchedulerState {
    /// Created but not yet running.
    Idle,
    /// Loop is running passes.
    Running,
    /// Shut down cooperatively. Terminal.
    Cancelled,
    /// Stopped after an executor error. Terminal; the error is in the
    /// [`VacuumErrorState`].
    Failed,
}

impl VacuumSchedulerState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Idle,
            1 => Self::Running,
            2 => Self::Cancelled,
            _ => Self::Failed,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::Running => 1,
            Self::Cancelled => 2,
            Self::Failed => 3,
        }
    }
}

/// Node-wide record of a permanent vacuum failure.
///
/// Written only by the vacuum scheduler, read by any component that needs to
/// know whether vacuum is still running. Set-once-until-reset: the first
/// error wins and later attempts to overwrite it are ignored;
/// [`reset`](Self::reset) belongs to the subsystem's explicit restart path.
#[derive(Debug, Clone, Default)]
pub struct VacuumErrorState {
    inner: Arc<RwLock<Option<Arc<VacuumError>>>>,
}

impl VacuumErrorState {
    /// Create an empty error state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a vacuum failure. The first recorded error is kept.
    pub fn set(&self, err: VacuumError) {
        let mut slot = self.inner.write();

        if let Some(existing) = slot.as_ref() {
            warn!(
                error = %err,
                existing = %existing,
                "Vacuum error already recorded, keeping the original"
            );
            return;
        }

        *slot = Some(Arc::new(err));
    }

    /// The recorded failure, if any.
    pub fn get(&self) -> Option<Arc<VacuumError>> {
        self.inner.read().clone()
    }

    /// Whether a failure has been recorded.
    pub fn is_failed(&self) -> bool {
        self.inner.read().is_some()
    }

    /// Clear the recorded failure. Only the vacuum restart path should call
    /// this.
    pub fn reset(&self) {
        *self.inner.write() = None;
    }
}

/// Periodically triggers vacuum passes on the [`VacuumExecutor`].
///
/// One long-lived instance per node. The loop sleeps `interval` before the
/// first pass, then paces itself so pass starts are `interval` apart,
/// shrinking the sleep by however long the pass took. A pass that overruns
/// its slot just delays the schedule; there are no catch-up bursts.
///
/// Cancellation interrupts sleeps and in-flight passes promptly and is a
/// clean shutdown, not an error. Any executor failure stops the loop
/// permanently and records the error in the shared [`VacuumErrorState`].
pub struct VacuumScheduler {
    interval: Duration,
    executor: Arc<dyn VacuumExecutor>,
    error_state: VacuumErrorState,
    cancel: CancellationToken,
    state: AtomicU8,
    passes_completed: AtomicU64,
}

impl VacuumScheduler {
    /// Create a scheduler. It does nothing until [`run`](Self::run) or
    /// [`spawn`](Self::spawn).
    pub fn new(config: VacuumConfig, executor: Arc<dyn VacuumExecutor>) -> Self {
        Self {
            interval: config.interval,
            executor,
            error_state: VacuumErrorState::new(),
            cancel: CancellationToken::new(),
            state: AtomicU8::new(VacuumSchedulerState::Idle.as_u8()),
            passes_completed: AtomicU64::new(0),
        }
    }

    /// Token observed by the loop; cancelling it shuts the scheduler down.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Request cooperative shutdown.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Handle to the node-wide vacuum error record.
    pub fn error_state(&self) -> VacuumErrorState {
        self.error_state.clone()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> VacuumSchedulerState {
        VacuumSchedulerState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Number of passes that completed successfully.
    pub fn passes_completed(&self) -> u64 {
        self.passes_completed.load(Ordering::Relaxed)
    }

    /// Spawn the scheduler loop onto the runtime.
    pub fn spawn(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Run the scheduler loop until cancellation or an executor failure.
    pub async fn run(self: Arc<Self>) {
        self.set_state(VacuumSchedulerState::Running);
        info!(interval_ms = self.interval.as_millis() as u64, "Vacuum scheduler started");

        // Initial delay before the first pass.
        tokio::select! {
            _ = self.cancel.cancelled() => {
                self.finish_cancelled();
                return;
            }
            _ = sleep(self.interval) => {}
        }

        loop {
            let next_scheduled = Instant::now() + self.interval;

            debug!("Vacuum pass started by scheduler");

            let outcome = tokio::select! {
                _ = self.cancel.cancelled() => {
                    self.finish_cancelled();
                    return;
                }
                outcome = self.executor.run_vacuum() => outcome,
            };

            match outcome {
                Ok(metrics) => {
                    self.passes_completed.fetch_add(1, Ordering::Relaxed);
                    debug!(
                        scanned_rows = metrics.scanned_rows,
                        cleaned_rows = metrics.cleaned_rows,
                        "Vacuum pass complete"
                    );
                }
                Err(err) => {
                    error!(error = %err, "Error occurred during scheduled vacuum, stopping scheduler");

                    self.error_state.set(err);
                    self.set_state(VacuumSchedulerState::Failed);
                    return;
                }
            }

            // Self-pace to the interval; an overrunning pass proceeds
            // immediately with no catch-up burst.
            if next_scheduled > Instant::now() {
                tokio::select! {
                    _ = self.cancel.cancelled() => {
                        self.finish_cancelled();
                        return;
                    }
                    _ = sleep_until(next_scheduled) => {}
                }
            }
        }
    }

    fn finish_cancelled(&self) {
        self.set_state(VacuumSchedulerState::Cancelled);
        info!("Vacuum scheduler shutting down");
    }

    fn set_state(&self, state: VacuumSchedulerState) {
        self.state.store(state.as_u8(), Ordering::Release);
    }
}

impl std::fmt::Debug for VacuumScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VacuumScheduler")
            .field("interval", &self.interval)
            .field("state", &self.state())
            .field("passes_completed", &self.passes_completed())
            .finish()
    }
}
