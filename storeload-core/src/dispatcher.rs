use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::error::{Error, Result};
use crate::progress::{ProgressFn, ProgressUpdate};
use crate::sink::ResultSink;
use crate::transport::PurchaseTransport;
use crate::worker::{WorkerReport, run_store};
use crate::workload::WorkloadConfig;

/// Lifecycle of a run. Moves strictly forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum DispatcherState {
    /// Workload validated, sink holds its header.
    Created,
    /// Workers are being launched.
    Running,
    /// Waiting for every worker to finish.
    Draining,
    /// Sink flushed and closed; the log can be read.
    Closed,
}

#[derive(Debug)]
pub struct RunOutcome<W> {
    /// The sink's writer after the final flush.
    pub writer: W,
    /// Wall-clock time from the first launch until the sink was closed.
    pub elapsed: Duration,
    pub workers: Vec<WorkerReport>,
    /// Records whose append failed; they are missing from the log.
    pub lost_records: u64,
}

/// Launches one worker per store, waits for all of them and closes the sink.
pub struct Dispatcher<T, W: Write + Send> {
    cfg: Arc<WorkloadConfig>,
    transport: Arc<T>,
    sink: Arc<ResultSink<W>>,
    progress: Option<ProgressFn>,
    state: watch::Sender<DispatcherState>,
}

impl<T, W> Dispatcher<T, W>
where
    T: PurchaseTransport,
    W: Write + Send + 'static,
{
    pub fn new(cfg: WorkloadConfig, transport: T, sink: ResultSink<W>) -> Result<Self> {
        cfg.validate()?;

        let (state, _) = watch::channel(DispatcherState::Created);
        Ok(Self {
            cfg: Arc::new(cfg),
            transport: Arc::new(transport),
            sink: Arc::new(sink),
            progress: None,
            state,
        })
    }

    #[must_use]
    pub fn with_progress(mut self, progress: Option<ProgressFn>) -> Self {
        self.progress = progress;
        self
    }

    pub fn state(&self) -> DispatcherState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<DispatcherState> {
        self.state.subscribe()
    }

    pub async fn run(self) -> Result<RunOutcome<W>> {
        let Self {
            cfg,
            transport,
            sink,
            progress,
            state,
        } = self;

        let started = Instant::now();
        transition(&state, DispatcherState::Running);

        let requests_done = Arc::new(AtomicU64::new(0));
        let mut handles: Vec<JoinHandle<WorkerReport>> =
            Vec::with_capacity(cfg.max_store as usize);

        for store_id in cfg.store_ids() {
            let cfg = cfg.clone();
            let transport = transport.clone();
            let sink = sink.clone();
            let requests_done = requests_done.clone();
            handles.push(tokio::spawn(async move {
                run_store(&cfg, store_id, &*transport, &*sink, &requests_done).await
            }));
        }
        tracing::info!(stores = cfg.max_store, "launched store workers");

        transition(&state, DispatcherState::Draining);

        let progress_handle = progress.map(|progress| {
            spawn_progress(
                progress,
                started,
                cfg.max_store,
                cfg.total_requests(),
                requests_done.clone(),
            )
        });

        let mut workers = Vec::with_capacity(handles.len());
        let mut panicked = 0usize;
        for handle in handles {
            match handle.await {
                Ok(report) => workers.push(report),
                Err(err) => {
                    panicked += 1;
                    tracing::error!(error = %err, "store worker did not complete");
                }
            }
        }

        if let Some(handle) = progress_handle {
            handle.abort();
            let _ = handle.await;
        }

        // Every task holding a clone was joined above, panicked ones included.
        let sink = Arc::try_unwrap(sink)
            .map_err(|still_shared| Error::SinkStillShared(Arc::strong_count(&still_shared) - 1))?;
        let lost_records = sink.write_errors();
        if lost_records > 0 {
            tracing::warn!(lost_records, "some outcome records could not be written");
        }
        let writer = sink.close();
        let elapsed = started.elapsed();
        transition(&state, DispatcherState::Closed);

        if panicked > 0 {
            return Err(Error::WorkerPanicked { panicked, elapsed });
        }

        tracing::info!(
            requests = requests_done.load(Ordering::Relaxed),
            elapsed_ms = elapsed.as_millis() as u64,
            "all store workers finished"
        );

        Ok(RunOutcome {
            writer,
            elapsed,
            workers,
            lost_records,
        })
    }
}

fn transition(state: &watch::Sender<DispatcherState>, next: DispatcherState) {
    let prev = state.send_replace(next);
    tracing::debug!(from = %prev, to = %next, "dispatcher state");
}

fn spawn_progress(
    progress: ProgressFn,
    started: Instant,
    stores: u32,
    requests_total: u64,
    requests_done: Arc<AtomicU64>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(1));
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        interval.tick().await;

        let mut tick: u64 = 0;
        let mut last_at = Instant::now();
        let mut last_done = requests_done.load(Ordering::Relaxed);

        loop {
            interval.tick().await;

            tick = tick.saturating_add(1);
            let now = Instant::now();
            let dt = now.duration_since(last_at);
            last_at = now;

            let done = requests_done.load(Ordering::Relaxed);
            let delta = done.saturating_sub(last_done);
            last_done = done;

            (progress)(ProgressUpdate {
                tick,
                elapsed: started.elapsed(),
                interval: dt,
                stores,
                requests_done: done,
                requests_total,
                rps_now: (delta as f64) / dt.as_secs_f64().max(1e-9),
            });
        }
    })
}
