use std::future::Future;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use tokio::time::Instant;

use crate::purchase::PurchaseRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum TransportErrorKind {
    InvalidTarget,
    Connect,
    Timeout,
    Protocol,
    Encode,
}

/// The call did not complete, so there is no status code to report.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Sends a single purchase to the remote service and reports its HTTP-style status code.
///
/// Implementations make exactly one attempt. Timeouts are the implementation's business.
pub trait PurchaseTransport: Send + Sync + 'static {
    fn send_purchase(
        &self,
        purchase: &PurchaseRequest,
    ) -> impl Future<Output = Result<u16, TransportError>> + Send;
}

impl<T: PurchaseTransport> PurchaseTransport for Arc<T> {
    fn send_purchase(
        &self,
        purchase: &PurchaseRequest,
    ) -> impl Future<Output = Result<u16, TransportError>> + Send {
        (**self).send_purchase(purchase)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completed {
    pub start_epoch_ms: u64,
    pub latency_ms: u64,
    pub status: u16,
}

/// Times one purchase call. Wall clock for the start stamp, monotonic clock for latency.
pub async fn execute_purchase<T: PurchaseTransport>(
    transport: &T,
    purchase: &PurchaseRequest,
) -> Result<Completed, TransportError> {
    let start_epoch_ms = epoch_millis(SystemTime::now());
    let started = Instant::now();
    let status = transport.send_purchase(purchase).await?;
    let latency_ms = started.elapsed().as_millis() as u64;

    Ok(Completed {
        start_epoch_ms,
        latency_ms,
        status,
    })
}

fn epoch_millis(t: SystemTime) -> u64 {
    t.duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
