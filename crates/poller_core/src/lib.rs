use std::{
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use chrono::{DateTime, Utc};
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
    time::{interval_at, Instant, MissedTickBehavior},
};
use tracing::{debug, info, warn};

pub mod error;
pub mod reconcile;
pub mod source;
pub mod table;

pub use error::PollError;
pub use reconcile::{ReconcileReport, Reconciler};
pub use source::{DataSource, HttpDataSource};
pub use table::{MemoryTable, TableRow, TableView};

pub const DEFAULT_POLL_PERIOD: Duration = Duration::from_millis(1000);
pub const MIN_POLL_PERIOD: Duration = Duration::from_millis(1);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);
const EVENT_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Another cycle was still in flight; nothing was fetched.
    Skipped,
    Applied(ReconcileReport),
}

#[derive(Debug, Clone)]
pub enum PollEvent {
    Applied {
        report: ReconcileReport,
        rows: Vec<TableRow>,
    },
    Failed {
        message: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollStats {
    pub started: u64,
    pub skipped: u64,
    pub applied: u64,
    pub failed: u64,
    pub last_applied_at: Option<DateTime<Utc>>,
}

#[derive(Default)]
struct Counters {
    started: AtomicU64,
    skipped: AtomicU64,
    applied: AtomicU64,
    failed: AtomicU64,
}

struct RenderState<V> {
    reconciler: Reconciler,
    view: V,
    last_applied_at: Option<DateTime<Utc>>,
}

/// Releases the in-flight flag when the cycle that acquired it ends,
/// whether it finished, failed or was dropped mid-await.
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Periodically fetches a payload and mirrors it into a table view.
pub struct Poller<V: TableView = MemoryTable> {
    source: Arc<dyn DataSource>,
    state: Mutex<RenderState<V>>,
    in_flight: AtomicBool,
    period: Duration,
    counters: Counters,
    events: broadcast::Sender<PollEvent>,
}

impl<V: TableView + 'static> Poller<V> {
    pub fn new(source: Arc<dyn DataSource>, view: V) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            source,
            state: Mutex::new(RenderState {
                reconciler: Reconciler::new(),
                view,
                last_applied_at: None,
            }),
            in_flight: AtomicBool::new(false),
            period: DEFAULT_POLL_PERIOD,
            counters: Counters::default(),
            events,
        }
    }

    /// A zero period is clamped to [`MIN_POLL_PERIOD`].
    pub fn with_period(mut self, period: Duration) -> Self {
        if period < MIN_POLL_PERIOD {
            warn!(
                requested_ms = period.as_millis() as u64,
                "poll period too short; using minimum"
            );
            self.period = MIN_POLL_PERIOD;
        } else {
            self.period = period;
        }
        self
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PollEvent> {
        self.events.subscribe()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub async fn rows(&self) -> Vec<TableRow> {
        self.state.lock().await.view.rows()
    }

    pub async fn stats(&self) -> PollStats {
        let last_applied_at = self.state.lock().await.last_applied_at;
        PollStats {
            started: self.counters.started.load(Ordering::Relaxed),
            skipped: self.counters.skipped.load(Ordering::Relaxed),
            applied: self.counters.applied.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
            last_applied_at,
        }
    }

    /// Runs one fetch-and-reconcile cycle unless one is already in flight.
    ///
    /// The in-flight flag stays set until the cycle has fully completed, so
    /// a tick arriving while a slow response is pending is a no-op.
    pub async fn fetch_cycle(&self) -> Result<CycleOutcome, PollError> {
        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            self.counters.skipped.fetch_add(1, Ordering::Relaxed);
            debug!("previous poll still in flight; skipping tick");
            return Ok(CycleOutcome::Skipped);
        };
        self.counters.started.fetch_add(1, Ordering::Relaxed);

        match self.run_cycle().await {
            Ok((report, rows)) => {
                self.counters.applied.fetch_add(1, Ordering::Relaxed);
                debug!(
                    first_render = report.first_render,
                    appended = report.appended,
                    updated = report.updated,
                    dropped = report.dropped,
                    "reconciled payload"
                );
                let _ = self.events.send(PollEvent::Applied { report, rows });
                Ok(CycleOutcome::Applied(report))
            }
            Err(err) => {
                self.counters.failed.fetch_add(1, Ordering::Relaxed);
                let _ = self.events.send(PollEvent::Failed {
                    message: err.to_string(),
                });
                Err(err)
            }
        }
    }

    async fn run_cycle(&self) -> Result<(ReconcileReport, Vec<TableRow>), PollError> {
        let text = self.source.fetch_text().await?;

        let mut state = self.state.lock().await;
        let RenderState {
            reconciler,
            view,
            last_applied_at,
        } = &mut *state;
        let report = reconciler.reconcile(view, &text)?;
        *last_applied_at = Some(Utc::now());
        Ok((report, view.rows()))
    }

    /// Starts the repeating timer. The first tick fires one period from now.
    ///
    /// Every tick runs its cycle as a separate task so a slow response never
    /// delays the timer; overlap is decided by the in-flight flag.
    pub fn start_polling(self: Arc<Self>) -> PollerHandle {
        let period = self.period;
        info!(period_ms = period.as_millis() as u64, "starting poller");

        let task = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let poller = Arc::clone(&self);
                tokio::spawn(async move {
                    if let Err(error) = poller.fetch_cycle().await {
                        warn!(%error, "poll cycle failed");
                    }
                });
            }
        });

        PollerHandle { task }
    }
}

/// Handle to a running poll timer.
///
/// Dropping the handle leaves the timer running; call [`PollerHandle::shutdown`]
/// to stop it.
pub struct PollerHandle {
    task: JoinHandle<()>,
}

impl PollerHandle {
    pub fn shutdown(self) {
        self.task.abort();
        info!("poller stopped");
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
