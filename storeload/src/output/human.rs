use std::sync::Arc;

mod format;
mod progress;
mod summary;

use format::{format_duration_single, format_rate};
use progress::HumanProgress;
use summary::render;

use storeload_core::{AggregateReport, ProgressFn, WorkloadConfig, format_date};

use super::OutputFormatter;

pub(crate) struct HumanReadableOutput {
    progress: Option<Arc<HumanProgress>>,
}

impl HumanReadableOutput {
    pub(crate) fn new(show_progress: bool) -> Self {
        Self {
            progress: show_progress.then(|| Arc::new(HumanProgress::new())),
        }
    }
}

impl OutputFormatter for HumanReadableOutput {
    fn print_header(&self, cfg: &WorkloadConfig) {
        println!("target: {}", cfg.target);
        println!(
            "stores={} purchases/hour={} items/purchase={} date={} requests={}",
            cfg.max_store,
            cfg.purchases,
            cfg.items_per_purchase,
            format_date(cfg.date),
            cfg.total_requests()
        );
        println!();
    }

    fn progress(&self) -> Option<ProgressFn> {
        let progress = self.progress.clone()?;

        Some(Arc::new(move |u| {
            let message = format!(
                "stores={} elapsed={} rps={}",
                u.stores,
                format_duration_single(u.elapsed),
                format_rate(u.rps_now)
            );
            progress.update(u.requests_done, u.requests_total, message);
        }))
    }

    fn print_summary(&self, cfg: &WorkloadConfig, report: &AggregateReport) -> anyhow::Result<()> {
        if let Some(progress) = &self.progress {
            progress.finish();
        }
        print!("{}", render(cfg, report));
        Ok(())
    }
}
