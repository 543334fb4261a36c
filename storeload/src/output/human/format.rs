use std::time::Duration;

pub(crate) const UNDEFINED: &str = "n/a";

pub(crate) fn format_rate(v: f64) -> String {
    if v.is_finite() {
        format!("{v:.0}")
    } else {
        "0".to_string()
    }
}

pub(crate) fn format_millis_opt(v: Option<f64>) -> String {
    match v {
        Some(ms) if ms.is_finite() => format!("{ms:.2} ms"),
        _ => UNDEFINED.to_string(),
    }
}

pub(crate) fn format_rps_opt(v: Option<f64>) -> String {
    match v {
        Some(rps) if rps.is_finite() => format!("{rps:.2} req/s"),
        _ => UNDEFINED.to_string(),
    }
}

/// A single rounded component in `us`, `ms` or `s`.
pub(crate) fn format_duration_single(d: Duration) -> String {
    let micros = d.as_micros();
    if micros >= 1_000_000 {
        return format!("{}s", (micros + 500_000) / 1_000_000);
    }
    if micros >= 1_000 {
        return format!("{}ms", (micros + 500) / 1_000);
    }
    format!("{micros}us")
}
