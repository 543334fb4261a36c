use serde::Serialize;

/// Latency samples in milliseconds.
///
/// Mean and max are maintained online; percentiles need the full sample set, which is fine
/// for the bounded workloads a run produces.
#[derive(Debug, Clone, Default)]
pub struct LatencyStats {
    samples: Vec<f64>,
    sorted: bool,
    mean: f64,
    max: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatencySummary {
    pub count: u64,
    pub mean_ms: f64,
    pub median_ms: f64,
    pub p99_ms: f64,
    pub max_ms: f64,
}

impl LatencyStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, sample_ms: f64) {
        if !sample_ms.is_finite() {
            return;
        }

        self.samples.push(sample_ms);
        self.sorted = false;

        let n = self.samples.len() as f64;
        self.mean += (sample_ms - self.mean) / n;
        if self.samples.len() == 1 || sample_ms > self.max {
            self.max = sample_ms;
        }
    }

    pub fn count(&self) -> u64 {
        self.samples.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn mean(&self) -> Option<f64> {
        (!self.is_empty()).then_some(self.mean)
    }

    pub fn max(&self) -> Option<f64> {
        (!self.is_empty()).then_some(self.max)
    }

    /// Percentile `p` in `(0, 100]` with linear interpolation between closest ranks.
    ///
    /// The estimated position is `p / 100 * (n + 1)`; positions before the first or past the
    /// last sample clamp to the minimum or maximum.
    pub fn percentile(&mut self, p: f64) -> Option<f64> {
        if self.is_empty() || !(p > 0.0 && p <= 100.0) {
            return None;
        }
        self.ensure_sorted();

        let sorted = &self.samples;
        let n = sorted.len();
        if n == 1 {
            return Some(sorted[0]);
        }

        let pos = p * (n as f64 + 1.0) / 100.0;
        if pos < 1.0 {
            return Some(sorted[0]);
        }
        if pos >= n as f64 {
            return Some(sorted[n - 1]);
        }

        let floor = pos.floor();
        let frac = pos - floor;
        let lower = sorted[floor as usize - 1];
        let upper = sorted[floor as usize];
        Some(lower + frac * (upper - lower))
    }

    pub fn summary(&mut self) -> Option<LatencySummary> {
        let mean_ms = self.mean()?;
        let max_ms = self.max()?;
        let median_ms = self.percentile(50.0)?;
        let p99_ms = self.percentile(99.0)?;

        Some(LatencySummary {
            count: self.count(),
            mean_ms,
            median_ms,
            p99_ms,
            max_ms,
        })
    }

    fn ensure_sorted(&mut self) {
        if !self.sorted {
            self.samples.sort_by(f64::total_cmp);
            self.sorted = true;
        }
    }
}

impl Extend<f64> for LatencyStats {
    fn extend<I: IntoIterator<Item = f64>>(&mut self, iter: I) {
        for v in iter {
            self.record(v);
        }
    }
}

impl FromIterator<f64> for LatencyStats {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut stats = Self::new();
        stats.extend(iter);
        stats
    }
}
