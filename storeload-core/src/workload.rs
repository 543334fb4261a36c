use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{Error, Result};

/// Every store is open for this many hours and issues `purchases` requests per hour.
pub const OPEN_HOURS: u64 = 9;

pub const DEFAULT_CUSTOMERS_PER_STORE: u32 = 1000;
pub const DEFAULT_MAX_ITEM_ID: u32 = 100_000;
pub const DEFAULT_PURCHASES: u32 = 60;
pub const DEFAULT_ITEMS_PER_PURCHASE: u32 = 5;

const DATE_FORMAT: &str = "%Y%m%d";

pub fn default_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2021, 1, 1).unwrap_or_default()
}

/// Parses an 8-digit `YYYYMMDD` calendar date.
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    let s = input.trim();
    if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::InvalidDate(s.to_string()));
    }
    NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|_| Error::InvalidDate(s.to_string()))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// A `host:port` pair the purchase service listens on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TargetAddr {
    pub host: String,
    pub port: u16,
}

impl TargetAddr {
    pub fn parse(input: &str) -> Result<Self> {
        let s = input.trim();
        let invalid = || Error::InvalidTarget(s.to_string());

        let (host, port) = s.rsplit_once(':').ok_or_else(invalid)?;
        if port.is_empty() || port.len() > 5 || !port.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let port: u16 = port.parse().map_err(|_| invalid())?;

        if !(host == "localhost" || is_ipv4_like(host) || is_domain_name(host)) {
            return Err(invalid());
        }

        Ok(Self {
            host: host.to_string(),
            port,
        })
    }
}

impl FromStr for TargetAddr {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for TargetAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

fn is_ipv4_like(host: &str) -> bool {
    let groups: Vec<&str> = host.split('.').collect();
    groups.len() == 4
        && groups
            .iter()
            .all(|g| (1..=3).contains(&g.len()) && g.bytes().all(|b| b.is_ascii_digit()))
}

fn is_domain_name(host: &str) -> bool {
    let labels: Vec<&str> = host.split('.').collect();
    let Some((tld, rest)) = labels.split_last() else {
        return false;
    };
    if rest.is_empty() {
        return false;
    }

    let tld_ok = (2..=6).contains(&tld.len()) && tld.bytes().all(|b| b.is_ascii_alphabetic());
    tld_ok
        && rest.iter().all(|label| {
            (1..=63).contains(&label.len())
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
        })
}

/// Immutable workload shape shared by every store of a run.
#[derive(Debug, Clone, Serialize)]
pub struct WorkloadConfig {
    pub max_store: u32,
    pub customers_per_store: u32,
    pub max_item_id: u32,
    /// Purchases per store per open hour.
    pub purchases: u32,
    pub items_per_purchase: u32,
    pub date: NaiveDate,
    pub target: TargetAddr,
    /// Base RNG seed; store `n` derives its own seed from it. `None` seeds from OS entropy.
    pub seed: Option<u64>,
}

impl WorkloadConfig {
    pub fn new(max_store: u32, target: TargetAddr) -> Self {
        Self {
            max_store,
            customers_per_store: DEFAULT_CUSTOMERS_PER_STORE,
            max_item_id: DEFAULT_MAX_ITEM_ID,
            purchases: DEFAULT_PURCHASES,
            items_per_purchase: DEFAULT_ITEMS_PER_PURCHASE,
            date: default_date(),
            target,
            seed: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_store == 0 {
            return Err(Error::InvalidConfig("`max_store` must be at least 1"));
        }
        if self.customers_per_store == 0 {
            return Err(Error::InvalidConfig(
                "`customers_per_store` must be at least 1",
            ));
        }
        if self.max_item_id == 0 {
            return Err(Error::InvalidConfig("`max_item_id` must be at least 1"));
        }
        Ok(())
    }

    pub fn requests_per_store(&self) -> u64 {
        OPEN_HOURS * u64::from(self.purchases)
    }

    pub fn total_requests(&self) -> u64 {
        u64::from(self.max_store) * self.requests_per_store()
    }

    /// Store ids are 1-based.
    pub fn store_ids(&self) -> std::ops::RangeInclusive<u32> {
        1..=self.max_store
    }
}
