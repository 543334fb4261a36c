use anyhow::Context as _;
use std::time::Duration;

use storeload_core::{Dispatcher, ResultSink, RunOutcome, WorkloadConfig, aggregate_file};
use storeload_http::{HttpPurchaseTransport, TransportTimeouts};

use crate::cli::Cli;
use crate::exit_codes::ExitCode;
use crate::output;
use crate::run_error::RunError;

pub(crate) fn workload_config(cli: &Cli) -> WorkloadConfig {
    WorkloadConfig {
        max_store: cli.max_store,
        customers_per_store: cli.customers_per_store,
        max_item_id: cli.max_item_id,
        purchases: cli.purchases,
        items_per_purchase: cli.items_per_purchase,
        date: cli.date,
        target: cli.target.clone(),
        seed: cli.seed,
    }
}

pub async fn run(cli: Cli) -> Result<ExitCode, RunError> {
    let cfg = workload_config(&cli);
    cfg.validate()?;

    let out = output::formatter(cli.output, !cli.no_progress);

    let transport = HttpPurchaseTransport::new(
        &cfg.target,
        Some(cli.base_path.as_str()),
        TransportTimeouts {
            connect: cli.connect_timeout,
            request: cli.request_timeout,
        },
    )
    .context("build http transport")
    .map_err(RunError::InvalidInput)?;

    let sink = ResultSink::create(&cli.report)
        .with_context(|| format!("create result log {}", cli.report.display()))
        .map_err(RunError::RuntimeError)?;

    out.print_header(&cfg);
    tracing::info!(
        stores = cfg.max_store,
        target = %cfg.target,
        requests = cfg.total_requests(),
        report = %cli.report.display(),
        "starting run"
    );

    let res = Dispatcher::new(cfg.clone(), transport, sink)?
        .with_progress(out.progress())
        .run()
        .await;
    let (elapsed, failure) = settle(res)?;

    let report = aggregate_file(&cli.report, elapsed);
    tracing::info!(
        total = report.total_requests,
        failed = report.failed_requests,
        elapsed_ms = elapsed.as_millis() as u64,
        "run finished"
    );

    out.print_summary(&cfg, &report).map_err(RunError::RuntimeError)?;

    match failure {
        Some(err) => Err(err),
        None => Ok(ExitCode::Success),
    }
}

/// Wall time of a run whose result log was closed, plus the error to exit with afterwards.
/// A panicked store still leaves a closed, readable log, so its report is printed too.
fn settle<W>(
    res: storeload_core::Result<RunOutcome<W>>,
) -> Result<(Duration, Option<RunError>), RunError> {
    match res {
        Ok(outcome) => Ok((outcome.elapsed, None)),
        Err(err @ storeload_core::Error::WorkerPanicked { elapsed, .. }) => {
            Ok((elapsed, Some(err.into())))
        }
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storeload_core::Error;

    #[test]
    fn completed_run_settles_without_error() {
        let res = Ok(RunOutcome {
            writer: Vec::<u8>::new(),
            elapsed: Duration::from_millis(90),
            workers: Vec::new(),
            lost_records: 0,
        });
        match settle(res) {
            Ok((elapsed, None)) => assert_eq!(elapsed, Duration::from_millis(90)),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn worker_panic_still_reports_then_exits_40() {
        let res: storeload_core::Result<RunOutcome<Vec<u8>>> = Err(Error::WorkerPanicked {
            panicked: 1,
            elapsed: Duration::from_millis(40),
        });
        match settle(res) {
            Ok((elapsed, Some(err))) => {
                assert_eq!(elapsed, Duration::from_millis(40));
                assert_eq!(err.exit_code(), ExitCode::RuntimeError);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn other_run_errors_abort_before_reporting() {
        let res: storeload_core::Result<RunOutcome<Vec<u8>>> = Err(Error::SinkStillShared(1));
        match settle(res) {
            Err(err) => assert_eq!(err.exit_code(), ExitCode::RuntimeError),
            Ok(_) => panic!("expected an error"),
        }
    }
}
