use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use storeload_core::{
    DEFAULT_CUSTOMERS_PER_STORE, DEFAULT_ITEMS_PER_PURCHASE, DEFAULT_MAX_ITEM_ID,
    DEFAULT_PURCHASES, TargetAddr,
};
use storeload_http::DEFAULT_BASE_PATH;

fn parse_duration(input: &str) -> Result<Duration, String> {
    let s = input.trim();
    let d = humantime::parse_duration(s)
        .map_err(|err| format!("invalid duration '{s}' (expected e.g. 60s, 250ms, 1m): {err}"))?;
    if d.is_zero() {
        return Err(format!("duration '{s}' must be greater than zero"));
    }
    Ok(d)
}

fn parse_target(input: &str) -> Result<TargetAddr, String> {
    TargetAddr::parse(input).map_err(|err| err.to_string())
}

fn parse_date(input: &str) -> Result<NaiveDate, String> {
    storeload_core::parse_date(input).map_err(|err| err.to_string())
}

fn parse_positive(input: &str) -> Result<u32, String> {
    match input.trim().parse::<u32>() {
        Ok(0) => Err("value must be at least 1".to_string()),
        Ok(v) => Ok(v),
        Err(err) => Err(format!("invalid number '{input}': {err}")),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary.
    HumanReadable,
    /// Emit JSON progress and summary lines (NDJSON) to stdout.
    Json,
}

#[derive(Debug, Parser)]
#[command(
    name = "storeload",
    author,
    version,
    about = "Purchase load generator for a retail store service",
    long_about = "storeload simulates a chain of stores submitting purchases to a remote purchase service.\n\nEach store runs as its own concurrent worker for a 9-hour business day and posts `purchases` purchases per hour. Every outcome is appended to a shared result log, which is aggregated into a latency and throughput report once all stores finished.",
    after_help = "Examples:\n  storeload -s 32 -t localhost:8080\n  storeload -s 64 -t shop.example.com:80 --purchases 120 --report out/run1.csv\n  storeload -s 8 -t 127.0.0.1:8080 --seed 42 --output json"
)]
pub struct Cli {
    /// Number of stores to simulate (one concurrent worker each)
    #[arg(short = 's', long, env = "STORELOAD_MAX_STORE", value_parser = parse_positive)]
    pub max_store: u32,

    /// Purchase service endpoint, `host:port`
    #[arg(short = 't', long, env = "STORELOAD_TARGET", value_parser = parse_target)]
    pub target: TargetAddr,

    /// Customers per store; store N owns ids [N*C, N*C + C)
    #[arg(
        long,
        env = "STORELOAD_CUSTOMERS_PER_STORE",
        default_value_t = DEFAULT_CUSTOMERS_PER_STORE,
        value_parser = parse_positive
    )]
    pub customers_per_store: u32,

    /// Highest item id that can be purchased
    #[arg(
        long,
        env = "STORELOAD_MAX_ITEM_ID",
        default_value_t = DEFAULT_MAX_ITEM_ID,
        value_parser = parse_positive
    )]
    pub max_item_id: u32,

    /// Purchases per store per opening hour
    #[arg(long, env = "STORELOAD_PURCHASES", default_value_t = DEFAULT_PURCHASES)]
    pub purchases: u32,

    /// Items in every purchase
    #[arg(
        long,
        env = "STORELOAD_ITEMS_PER_PURCHASE",
        default_value_t = DEFAULT_ITEMS_PER_PURCHASE
    )]
    pub items_per_purchase: u32,

    /// Transaction date, YYYYMMDD
    #[arg(long, env = "STORELOAD_DATE", default_value = "20210101", value_parser = parse_date)]
    pub date: NaiveDate,

    /// Result log written during the run
    #[arg(long, env = "STORELOAD_REPORT", default_value = "report.csv")]
    pub report: PathBuf,

    /// Path prefix of the purchase service
    #[arg(long, env = "STORELOAD_BASE_PATH", default_value = DEFAULT_BASE_PATH)]
    pub base_path: String,

    /// TCP connect timeout (e.g. 60s, 500ms)
    #[arg(long, env = "STORELOAD_CONNECT_TIMEOUT", default_value = "60s", value_parser = parse_duration)]
    pub connect_timeout: Duration,

    /// Timeout for one whole request/response exchange
    #[arg(long, env = "STORELOAD_REQUEST_TIMEOUT", default_value = "60s", value_parser = parse_duration)]
    pub request_timeout: Duration,

    /// Base RNG seed; store N draws from seed + N
    #[arg(long, env = "STORELOAD_SEED")]
    pub seed: Option<u64>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::HumanReadable)]
    pub output: OutputFormat,

    /// Disable progress reporting while the run is in flight
    #[arg(long)]
    pub no_progress: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_duration_accepts_common_units() {
        assert_eq!(parse_duration("250ms"), Ok(Duration::from_millis(250)));
        assert_eq!(parse_duration("60s"), Ok(Duration::from_secs(60)));
        assert_eq!(parse_duration("1m"), Ok(Duration::from_secs(60)));
    }

    #[test]
    fn parse_duration_rejects_invalid_values() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("abc").is_err());
        assert!(parse_duration("10x").is_err());
        assert!(parse_duration("0s").is_err());
    }

    #[test]
    fn cli_applies_workload_defaults() {
        let cli = match Cli::try_parse_from(["storeload", "-s", "4", "-t", "localhost:8080"]) {
            Ok(v) => v,
            Err(err) => panic!("failed to parse args: {err}"),
        };

        assert_eq!(cli.max_store, 4);
        assert_eq!(cli.target.to_string(), "localhost:8080");
        assert_eq!(cli.customers_per_store, 1000);
        assert_eq!(cli.max_item_id, 100_000);
        assert_eq!(cli.purchases, 60);
        assert_eq!(cli.items_per_purchase, 5);
        assert_eq!(storeload_core::format_date(cli.date), "20210101");
        assert_eq!(cli.report, PathBuf::from("report.csv"));
        assert_eq!(cli.base_path, "store_a2_server_war");
        assert_eq!(cli.connect_timeout, Duration::from_secs(60));
        assert_eq!(cli.seed, None);
        assert_eq!(cli.output, OutputFormat::HumanReadable);
        assert!(!cli.no_progress);
    }

    #[test]
    fn cli_parses_full_flag_set() {
        let parsed = Cli::try_parse_from([
            "storeload",
            "--max-store",
            "16",
            "--target",
            "shop.example.com:9090",
            "--customers-per-store",
            "50",
            "--max-item-id",
            "300",
            "--purchases",
            "0",
            "--items-per-purchase",
            "2",
            "--date",
            "20240229",
            "--request-timeout",
            "2s",
            "--seed",
            "7",
            "--output",
            "json",
            "--no-progress",
        ]);
        let cli = match parsed {
            Ok(v) => v,
            Err(err) => panic!("failed to parse args: {err}"),
        };

        assert_eq!(cli.max_store, 16);
        assert_eq!(cli.customers_per_store, 50);
        assert_eq!(cli.max_item_id, 300);
        assert_eq!(cli.purchases, 0);
        assert_eq!(cli.items_per_purchase, 2);
        assert_eq!(storeload_core::format_date(cli.date), "20240229");
        assert_eq!(cli.request_timeout, Duration::from_secs(2));
        assert_eq!(cli.seed, Some(7));
        assert_eq!(cli.output, OutputFormat::Json);
        assert!(cli.no_progress);
    }

    #[test]
    fn cli_rejects_malformed_values() {
        for args in [
            vec!["storeload", "-s", "0", "-t", "localhost:8080"],
            vec!["storeload", "-s", "-3", "-t", "localhost:8080"],
            vec!["storeload", "-s", "2", "-t", "localhost"],
            vec!["storeload", "-s", "2", "-t", "localhost:99999"],
            vec!["storeload", "-s", "2", "-t", "bad_host!:80"],
            vec!["storeload", "-s", "2", "-t", "localhost:80", "--date", "2021-01-01"],
            vec!["storeload", "-s", "2", "-t", "localhost:80", "--date", "20211301"],
            vec!["storeload", "-s", "2", "-t", "localhost:80", "--max-item-id", "0"],
            vec!["storeload", "-t", "localhost:80"],
        ] {
            assert!(Cli::try_parse_from(&args).is_err(), "accepted {args:?}");
        }
    }
}
