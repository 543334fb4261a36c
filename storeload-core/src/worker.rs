use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::purchase::PurchaseGenerator;
use crate::record::OutcomeRecord;
use crate::sink::ResultSink;
use crate::transport::{PurchaseTransport, execute_purchase};
use crate::workload::WorkloadConfig;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerReport {
    pub store_id: u32,
    /// Calls that returned a status code (any status).
    pub completed: u64,
    /// Calls that failed in the transport.
    pub failed: u64,
}

/// Appends its record when dropped, so the attempt is logged even if the call unwinds.
struct PendingRecord<'a, W: Write + Send> {
    sink: &'a ResultSink<W>,
    store_id: u32,
    record: OutcomeRecord,
}

impl<W: Write + Send> Drop for PendingRecord<'_, W> {
    fn drop(&mut self) {
        if let Err(err) = self.sink.append(&self.record) {
            tracing::warn!(store_id = self.store_id, error = %err, "failed to append outcome record");
        }
    }
}

/// Emulates one store's day: `OPEN_HOURS * purchases` sequential purchase calls.
///
/// Transport failures become `error` records and never stop the loop.
pub async fn run_store<T, W>(
    cfg: &WorkloadConfig,
    store_id: u32,
    transport: &T,
    sink: &ResultSink<W>,
    requests_done: &AtomicU64,
) -> WorkerReport
where
    T: PurchaseTransport,
    W: Write + Send,
{
    let mut generator = PurchaseGenerator::new(cfg, store_id);
    let mut report = WorkerReport {
        store_id,
        ..WorkerReport::default()
    };

    for _ in 0..cfg.requests_per_store() {
        let purchase = generator.next_purchase();

        let mut pending = PendingRecord {
            sink,
            store_id,
            record: OutcomeRecord::Failed,
        };

        let res = execute_purchase(transport, &purchase).await;
        match &res {
            Ok(_) => report.completed += 1,
            Err(err) => {
                report.failed += 1;
                tracing::warn!(
                    store_id,
                    customer_id = purchase.customer_id,
                    error = %err,
                    "purchase request failed"
                );
            }
        }
        pending.record = OutcomeRecord::from_result(&res);
        drop(pending);

        requests_done.fetch_add(1, Ordering::Relaxed);
    }

    tracing::debug!(
        store_id,
        completed = report.completed,
        failed = report.failed,
        "store finished"
    );
    report
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::purchase::PurchaseRequest;
    use crate::record::{HEADER, LogLine, parse_line};
    use crate::transport::{TransportError, TransportErrorKind};
    use crate::workload::TargetAddr;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recording {
        seen: Mutex<Vec<PurchaseRequest>>,
    }

    impl PurchaseTransport for Recording {
        async fn send_purchase(&self, purchase: &PurchaseRequest) -> Result<u16, TransportError> {
            let n = {
                let mut seen = self.seen.lock().unwrap();
                seen.push(purchase.clone());
                seen.len()
            };
            if n % 3 == 0 {
                Err(TransportError::new(TransportErrorKind::Timeout, "slow"))
            } else {
                Ok(201)
            }
        }
    }

    fn cfg() -> WorkloadConfig {
        let mut cfg = WorkloadConfig::new(
            1,
            TargetAddr {
                host: "localhost".to_string(),
                port: 8080,
            },
        );
        cfg.purchases = 2;
        cfg.items_per_purchase = 4;
        cfg.customers_per_store = 10;
        cfg.max_item_id = 50;
        cfg
    }

    #[tokio::test]
    async fn every_attempt_leaves_exactly_one_record() {
        let cfg = cfg();
        let transport = Recording::default();
        let sink = ResultSink::in_memory().unwrap();
        let done = AtomicU64::new(0);

        let report = run_store(&cfg, 3, &transport, &sink, &done).await;

        assert_eq!(report.store_id, 3);
        assert_eq!(report.completed, 12);
        assert_eq!(report.failed, 6);
        assert_eq!(done.load(Ordering::Relaxed), 18);

        let seen = transport.seen.lock().unwrap();
        assert_eq!(seen.len(), 18);
        for p in seen.iter() {
            assert_eq!(p.store_id, 3);
            assert!((30..40).contains(&p.customer_id));
            assert_eq!(p.items.len(), 4);
        }

        let text = String::from_utf8(sink.close()).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some(HEADER));
        let parsed: Vec<LogLine> = lines.map(parse_line).collect();
        assert_eq!(parsed.len(), 18);
        for (i, line) in parsed.iter().enumerate() {
            if (i + 1) % 3 == 0 {
                assert_eq!(*line, LogLine::Failure);
            } else {
                assert!(matches!(line, LogLine::Record { status: Some(201), .. }));
            }
        }
    }

    struct Panicking;

    impl PurchaseTransport for Panicking {
        async fn send_purchase(&self, _purchase: &PurchaseRequest) -> Result<u16, TransportError> {
            panic!("transport blew up");
        }
    }

    #[tokio::test]
    async fn unwinding_call_still_logs_a_failure() {
        let cfg = cfg();
        let sink = std::sync::Arc::new(ResultSink::in_memory().unwrap());
        let done = std::sync::Arc::new(AtomicU64::new(0));

        let task = {
            let sink = sink.clone();
            let done = done.clone();
            tokio::spawn(async move { run_store(&cfg, 1, &Panicking, &sink, &done).await })
        };
        assert!(task.await.is_err());

        let sink = std::sync::Arc::into_inner(sink).unwrap();
        let text = String::from_utf8(sink.close()).unwrap();
        assert_eq!(text, format!("{HEADER}\nerror\n"));
    }
}
