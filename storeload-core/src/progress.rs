use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ProgressUpdate {
    /// Monotonic tick counter (1-based) for progress emissions.
    pub tick: u64,
    pub elapsed: Duration,
    pub interval: Duration,
    pub stores: u32,
    pub requests_done: u64,
    pub requests_total: u64,
    /// Requests/sec observed during the last progress interval.
    pub rps_now: f64,
}

pub type ProgressFn = std::sync::Arc<dyn Fn(ProgressUpdate) + Send + Sync + 'static>;
