use crate::cli::OutputFormat;
use storeload_core::{AggregateReport, ProgressFn, WorkloadConfig};

mod human;
mod json;

pub(crate) trait OutputFormatter: Send + Sync {
    fn print_header(&self, cfg: &WorkloadConfig);
    fn progress(&self) -> Option<ProgressFn>;
    fn print_summary(&self, cfg: &WorkloadConfig, report: &AggregateReport)
    -> anyhow::Result<()>;
}

pub(crate) fn formatter(format: OutputFormat, show_progress: bool) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::HumanReadable => Box::new(human::HumanReadableOutput::new(show_progress)),
        OutputFormat::Json => Box::new(json::JsonOutput { show_progress }),
    }
}
