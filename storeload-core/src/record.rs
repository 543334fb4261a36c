use std::fmt;

use crate::transport::{Completed, TransportError};

pub const HEADER: &str = "Start RequestType Latency ResponseCode";
pub const REQUEST_KIND: &str = "POST";
pub const FAILURE_MARKER: &str = "error";

/// Result of one request attempt, as written to the result log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeRecord {
    Completed {
        start_epoch_ms: u64,
        latency_ms: u64,
        status: u16,
    },
    Failed,
}

impl OutcomeRecord {
    pub fn from_result(res: &Result<Completed, TransportError>) -> Self {
        match res {
            Ok(c) => Self::Completed {
                start_epoch_ms: c.start_epoch_ms,
                latency_ms: c.latency_ms,
                status: c.status,
            },
            Err(_) => Self::Failed,
        }
    }

    /// The log line for this record, newline included.
    pub fn to_line(&self) -> String {
        format!("{self}\n")
    }
}

impl fmt::Display for OutcomeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed {
                start_epoch_ms,
                latency_ms,
                status,
            } => write!(f, "{start_epoch_ms} {REQUEST_KIND} {latency_ms} {status}"),
            Self::Failed => f.write_str(FAILURE_MARKER),
        }
    }
}

/// One line of the result log as read back by the aggregator.
///
/// Parsing is lenient in the same way the log is consumed: the status decides success, the
/// latency column feeds the statistics even if the status column is unreadable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogLine {
    Failure,
    Record {
        latency_ms: Option<f64>,
        status: Option<u16>,
    },
    Malformed,
}

pub fn parse_line(line: &str) -> LogLine {
    let fields: Vec<&str> = line.split_whitespace().collect();
    match fields.as_slice() {
        [marker] if *marker == FAILURE_MARKER => LogLine::Failure,
        [_, _, latency, status] => LogLine::Record {
            latency_ms: latency.parse::<f64>().ok().filter(|v| v.is_finite()),
            status: status.parse().ok(),
        },
        _ => LogLine::Malformed,
    }
}
