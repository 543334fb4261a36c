//! Concurrent purchase load generation: one worker per simulated store, a shared result
//! log, and post-run aggregation of that log into a report.

mod aggregate;
mod dispatcher;
mod error;
mod progress;
mod purchase;
mod record;
mod sink;
mod stats;
mod transport;
mod worker;
mod workload;

pub use aggregate::{
    AggregateReport, EXPECTED_STATUS, Tally, aggregate_file, aggregate_log, throughput,
};
pub use dispatcher::{Dispatcher, DispatcherState, RunOutcome};
pub use error::{Error, Result};
pub use progress::{ProgressFn, ProgressUpdate};
pub use purchase::{PurchaseGenerator, PurchaseItem, PurchaseRequest};
pub use record::{FAILURE_MARKER, HEADER, LogLine, OutcomeRecord, REQUEST_KIND, parse_line};
pub use sink::ResultSink;
pub use stats::{LatencyStats, LatencySummary};
pub use transport::{
    Completed, PurchaseTransport, TransportError, TransportErrorKind, execute_purchase,
};
pub use worker::{WorkerReport, run_store};
pub use workload::{
    DEFAULT_CUSTOMERS_PER_STORE, DEFAULT_ITEMS_PER_PURCHASE, DEFAULT_MAX_ITEM_ID,
    DEFAULT_PURCHASES, OPEN_HOURS, TargetAddr, WorkloadConfig, default_date, format_date,
    parse_date,
};
