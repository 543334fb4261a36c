use serde::Serialize;
use std::io::Write as _;
use std::sync::Arc;

use storeload_core::{AggregateReport, ProgressFn, ProgressUpdate, TargetAddr, WorkloadConfig};

use super::OutputFormatter;

pub(crate) struct JsonOutput {
    pub(crate) show_progress: bool,
}

impl OutputFormatter for JsonOutput {
    fn print_header(&self, _cfg: &WorkloadConfig) {}

    fn progress(&self) -> Option<ProgressFn> {
        if !self.show_progress {
            return None;
        }
        Some(Arc::new(move |u| {
            let line = build_progress_line(&u);
            emit_json_line(&line);
        }))
    }

    fn print_summary(&self, cfg: &WorkloadConfig, report: &AggregateReport) -> anyhow::Result<()> {
        let line = build_summary_line(cfg, report);
        emit_json_line(&line);
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct JsonProgressLine {
    pub kind: &'static str,
    pub tick: u64,
    pub elapsed_secs: u64,
    pub interval_secs: f64,
    pub stores: u32,
    pub requests_done: u64,
    pub requests_total: u64,
    pub requests_per_sec: f64,
}

fn build_progress_line(u: &ProgressUpdate) -> JsonProgressLine {
    JsonProgressLine {
        kind: "progress",
        tick: u.tick,
        elapsed_secs: u.elapsed.as_secs(),
        interval_secs: u.interval.as_secs_f64(),
        stores: u.stores,
        requests_done: u.requests_done,
        requests_total: u.requests_total,
        requests_per_sec: u.rps_now,
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct JsonSummaryLine<'a> {
    pub kind: &'static str,
    pub max_store: u32,
    pub target: &'a TargetAddr,
    #[serde(flatten)]
    pub report: &'a AggregateReport,
}

fn build_summary_line<'a>(cfg: &'a WorkloadConfig, report: &'a AggregateReport) -> JsonSummaryLine<'a> {
    JsonSummaryLine {
        kind: "summary",
        max_store: cfg.max_store,
        target: &cfg.target,
        report,
    }
}

fn emit_json_line<T: Serialize>(line: &T) {
    match serde_json::to_string(line) {
        Ok(s) => {
            let mut stdout = std::io::stdout().lock();
            let _ = writeln!(stdout, "{s}");
            let _ = stdout.flush();
        }
        Err(err) => tracing::warn!(error = %err, "failed to encode json output line"),
    }
}
