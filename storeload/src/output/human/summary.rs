use std::fmt::Write as _;

use storeload_core::{AggregateReport, WorkloadConfig};

use super::format::{format_millis_opt, format_rps_opt};

pub(crate) fn render(cfg: &WorkloadConfig, report: &AggregateReport) -> String {
    let mut out = String::new();
    let latency = report.latency.as_ref();

    out.push_str("load test results\n");
    writeln!(&mut out, "  max stores:          {}", cfg.max_store).ok();
    writeln!(&mut out, "  total requests:      {}", report.total_requests).ok();
    writeln!(&mut out, "  successful requests: {}", report.successful_requests).ok();
    writeln!(&mut out, "  failed requests:     {}", report.failed_requests).ok();
    writeln!(
        &mut out,
        "  mean latency:        {}",
        format_millis_opt(latency.map(|l| l.mean_ms))
    )
    .ok();
    writeln!(
        &mut out,
        "  median latency:      {}",
        format_millis_opt(latency.map(|l| l.median_ms))
    )
    .ok();
    writeln!(
        &mut out,
        "  p99 latency:         {}",
        format_millis_opt(latency.map(|l| l.p99_ms))
    )
    .ok();
    writeln!(
        &mut out,
        "  max latency:         {}",
        format_millis_opt(latency.map(|l| l.max_ms))
    )
    .ok();
    writeln!(
        &mut out,
        "  wall time:           {} ms",
        report.wall_time.as_millis()
    )
    .ok();
    writeln!(
        &mut out,
        "  throughput:          {}",
        format_rps_opt(report.throughput_rps)
    )
    .ok();

    out
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use std::time::Duration;
    use storeload_core::{LatencySummary, TargetAddr};

    fn cfg() -> WorkloadConfig {
        WorkloadConfig::new(2, TargetAddr::parse("localhost:8080").unwrap())
    }

    #[test]
    fn renders_every_report_field() {
        let report = AggregateReport {
            total_requests: 18,
            successful_requests: 17,
            failed_requests: 1,
            latency: Some(LatencySummary {
                count: 17,
                mean_ms: 10.5,
                median_ms: 10.0,
                p99_ms: 14.0,
                max_ms: 14.0,
            }),
            wall_time: Duration::from_millis(96),
            throughput_rps: Some(187.5),
        };

        let out = render(&cfg(), &report);
        assert!(out.starts_with("load test results\n"));
        assert!(out.contains("max stores:          2\n"));
        assert!(out.contains("total requests:      18\n"));
        assert!(out.contains("successful requests: 17\n"));
        assert!(out.contains("failed requests:     1\n"));
        assert!(out.contains("mean latency:        10.50 ms\n"));
        assert!(out.contains("median latency:      10.00 ms\n"));
        assert!(out.contains("p99 latency:         14.00 ms\n"));
        assert!(out.contains("max latency:         14.00 ms\n"));
        assert!(out.contains("wall time:           96 ms\n"));
        assert!(out.contains("throughput:          187.50 req/s\n"));
    }

    #[test]
    fn empty_report_prints_na_for_undefined_values() {
        let out = render(&cfg(), &AggregateReport::empty(Duration::ZERO));
        assert!(out.contains("total requests:      0\n"));
        assert!(out.contains("mean latency:        n/a\n"));
        assert!(out.contains("p99 latency:         n/a\n"));
        assert!(out.contains("throughput:          n/a\n"));
    }
}
