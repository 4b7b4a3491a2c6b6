use crate::ports::inbound::CollectionCyclePort;
use crate::shared::panic::panic_message;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Lifecycle of the collector loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Waiting for the next tick
    Idle,
    /// A collection cycle is in progress
    Running,
    /// Terminal; the loop has exited and will not run again
    Stopped,
}

/// CollectorScheduler - runs one collection cycle per interval
///
/// Cycles never overlap: the next tick is only awaited once the previous
/// cycle has returned. A tick that falls due while a cycle is still running
/// is delayed rather than fired in a burst.
pub struct CollectorScheduler<C>
where
    C: CollectionCyclePort + ?Sized + 'static,
{
    cycle: Arc<C>,
    interval: Duration,
    scan_on_start: bool,
}

impl<C> CollectorScheduler<C>
where
    C: CollectionCyclePort + ?Sized + 'static,
{
    /// Creates a scheduler; intervals shorter than one millisecond are raised
    pub fn new(cycle: Arc<C>, interval: Duration) -> Self {
        Self {
            cycle,
            interval: interval.max(Duration::from_millis(1)),
            scan_on_start: false,
        }
    }

    /// Runs the first cycle immediately instead of after one interval
    pub fn with_scan_on_start(mut self, scan_on_start: bool) -> Self {
        self.scan_on_start = scan_on_start;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Spawns the loop on the current runtime
    ///
    /// The loop stops when `parent` (or the returned handle) is cancelled.
    /// The cycle in flight at that moment sees the same cancellation through
    /// the token passed to `run_cycle`.
    pub fn start(self, parent: &CancellationToken) -> SchedulerHandle {
        let token = parent.child_token();
        let (state, _) = watch::channel(SchedulerState::Idle);
        let state = Arc::new(state);

        let task = tokio::spawn(run_loop(
            self.cycle,
            self.interval,
            self.scan_on_start,
            token.clone(),
            Arc::clone(&state),
        ));

        SchedulerHandle { token, state, task }
    }
}

async fn run_loop<C>(
    cycle: Arc<C>,
    period: Duration,
    scan_on_start: bool,
    token: CancellationToken,
    state: Arc<watch::Sender<SchedulerState>>,
) where
    C: CollectionCyclePort + ?Sized + 'static,
{
    let first_tick = if scan_on_start {
        Instant::now()
    } else {
        Instant::now() + period
    };
    let mut ticker = interval_at(first_tick, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(interval_secs = period.as_secs_f64(), "Collector started");

    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = ticker.tick() => {}
        }

        state.send_replace(SchedulerState::Running);

        match AssertUnwindSafe(cycle.run_cycle(&token)).catch_unwind().await {
            Ok(Ok(report)) => debug!(
                cycle_id = %report.cycle_id,
                published = report.published,
                "Cycle finished"
            ),
            Ok(Err(err)) => error!(error = %err, "Collection cycle aborted"),
            Err(panic) => error!(
                panic = %panic_message(panic.as_ref()),
                "Collection cycle panicked"
            ),
        }

        state.send_replace(SchedulerState::Idle);
    }

    state.send_replace(SchedulerState::Stopped);
    info!("Collector stopped");
}

/// Handle to a running collector loop
pub struct SchedulerHandle {
    token: CancellationToken,
    state: Arc<watch::Sender<SchedulerState>>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    pub fn state(&self) -> SchedulerState {
        *self.state.borrow()
    }

    /// Receiver notified on every state transition
    pub fn subscribe(&self) -> watch::Receiver<SchedulerState> {
        self.state.subscribe()
    }

    /// Requests the loop to stop; safe to call any number of times
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Cancels the loop and waits for the in-flight cycle to drain
    ///
    /// # Returns
    /// `true` if the loop exited within `grace`, `false` if it had to be aborted
    pub async fn shutdown(self, grace: Duration) -> bool {
        self.token.cancel();
        let mut task = self.task;

        match tokio::time::timeout(grace, &mut task).await {
            Ok(Ok(())) => true,
            Ok(Err(err)) => {
                error!(error = %err, "Collector task failed");
                self.state.send_replace(SchedulerState::Stopped);
                true
            }
            Err(_) => {
                warn!(grace_secs = grace.as_secs(), "shutdown timed out");
                task.abort();
                self.state.send_replace(SchedulerState::Stopped);
                false
            }
        }
    }
}
