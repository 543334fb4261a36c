use storeload_core::TargetAddr;

use super::{Error, Result};

pub(super) fn base_url(target: &TargetAddr) -> Result<url::Url> {
    let raw = format!("http://{target}/");
    url::Url::parse(&raw).map_err(|_| Error::InvalidUrl(raw))
}

pub(super) fn host_header_value(parsed: &url::Url) -> Option<String> {
    let host = parsed.host_str()?;
    match parsed.port() {
        Some(port) if port != 80 => Some(format!("{host}:{port}")),
        _ => Some(host.to_string()),
    }
}
