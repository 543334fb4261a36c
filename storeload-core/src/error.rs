use std::time::Duration;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("task join error: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("invalid workload: {0}")]
    InvalidConfig(&'static str),

    #[error("invalid target `{0}` (expected host:port or ip:port)")]
    InvalidTarget(String),

    #[error("invalid date `{0}` (expected an 8-digit calendar date, e.g. 20210101)")]
    InvalidDate(String),

    /// The result log was still closed; `elapsed` is the run's wall time up to that point.
    #[error("{panicked} worker task(s) panicked")]
    WorkerPanicked { panicked: usize, elapsed: Duration },

    /// Invariant guard: the dispatcher joins every worker before unwrapping the sink, so this
    /// only fires if a worker handle escaped the join barrier.
    #[error("result sink is still shared by {0} worker(s)")]
    SinkStillShared(usize),
}
