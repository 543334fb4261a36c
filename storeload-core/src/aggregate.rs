use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Duration;

use serde::{Serialize, Serializer};

use crate::error::Result;
use crate::record::{HEADER, LogLine, parse_line};
use crate::stats::{LatencyStats, LatencySummary};

/// Status the purchase service answers with when a purchase was created.
pub const EXPECTED_STATUS: u16 = 201;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateReport {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    /// `None` when no latency sample was observed.
    pub latency: Option<LatencySummary>,
    #[serde(rename = "wall_time_ms", serialize_with = "serialize_millis")]
    pub wall_time: Duration,
    /// Requests per second over the wall time; `None` when the wall time is zero.
    pub throughput_rps: Option<f64>,
}

impl AggregateReport {
    /// Zero-filled report, used when the result log cannot be read back.
    pub fn empty(wall_time: Duration) -> Self {
        Self {
            total_requests: 0,
            successful_requests: 0,
            failed_requests: 0,
            latency: None,
            wall_time,
            throughput_rps: throughput(0, wall_time),
        }
    }
}

pub fn throughput(requests: u64, wall_time: Duration) -> Option<f64> {
    let secs = wall_time.as_secs_f64();
    if secs > 0.0 {
        Some(requests as f64 / secs)
    } else {
        None
    }
}

fn serialize_millis<S: Serializer>(d: &Duration, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}

/// Running counts over the records of one result log.
#[derive(Debug, Default)]
pub struct Tally {
    total: u64,
    successful: u64,
    failed: u64,
    latency: LatencyStats,
}

impl Tally {
    pub fn observe(&mut self, line: &str) {
        self.total += 1;
        match parse_line(line) {
            LogLine::Failure => self.failed += 1,
            LogLine::Record { latency_ms, status } => {
                if status == Some(EXPECTED_STATUS) {
                    self.successful += 1;
                } else {
                    self.failed += 1;
                }
                if let Some(ms) = latency_ms {
                    self.latency.record(ms);
                }
            }
            LogLine::Malformed => {
                tracing::warn!(line, "malformed result record counted as failed");
                self.failed += 1;
            }
        }
    }

    /// A record line that is not valid UTF-8; counted as failed like any malformed line.
    pub fn observe_undecodable(&mut self, raw: &[u8]) {
        self.total += 1;
        self.failed += 1;
        tracing::warn!(
            line = %String::from_utf8_lossy(raw).trim_end(),
            "undecodable result record counted as failed"
        );
    }

    pub fn finish(mut self, wall_time: Duration) -> AggregateReport {
        AggregateReport {
            total_requests: self.total,
            successful_requests: self.successful,
            failed_requests: self.failed,
            latency: self.latency.summary(),
            wall_time,
            throughput_rps: throughput(self.total, wall_time),
        }
    }
}

/// Aggregates a result log: header line first, then one record per line. Blank lines are
/// not records. Only I/O errors fail; bad bytes in a line make that one record malformed.
pub fn aggregate_log<R: BufRead>(mut reader: R, wall_time: Duration) -> Result<AggregateReport> {
    let mut tally = Tally::default();
    let mut buf = Vec::new();
    let mut first = true;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let is_first = std::mem::replace(&mut first, false);

        let Ok(line) = std::str::from_utf8(&buf) else {
            if is_first {
                tracing::warn!("result log has no header line");
            }
            tally.observe_undecodable(&buf);
            continue;
        };
        let line = line.trim();
        if is_first {
            if line == HEADER {
                continue;
            }
            tracing::warn!("result log has no header line");
        }
        if line.is_empty() {
            continue;
        }
        tally.observe(line);
    }

    Ok(tally.finish(wall_time))
}

/// Like [`aggregate_log`], but never fails: an unreadable log yields a zero-filled report.
pub fn aggregate_file(path: &Path, wall_time: Duration) -> AggregateReport {
    let res = File::open(path)
        .map_err(Into::into)
        .and_then(|f| aggregate_log(BufReader::new(f), wall_time));

    match res {
        Ok(report) => report,
        Err(err) => {
            tracing::error!(
                path = %path.display(),
                error = %err,
                "failed to read result log; reporting zeros"
            );
            AggregateReport::empty(wall_time)
        }
    }
}
