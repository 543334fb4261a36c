use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::error::Result;
use crate::record::{HEADER, OutcomeRecord};

/// Append-only result log shared by every worker of a run.
///
/// Each `append` writes one whole line straight to the writer while holding the lock, so
/// lines from concurrent workers never interleave and a failed write is reported to the
/// caller of that `append`. Records are rendered before the lock is taken.
#[derive(Debug)]
pub struct ResultSink<W: Write + Send> {
    writer: Mutex<W>,
    write_errors: AtomicU64,
}

impl<W: Write + Send> ResultSink<W> {
    /// Wraps `writer` and writes the schema header.
    pub fn new(mut writer: W) -> Result<Self> {
        writer.write_all(HEADER.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(Self {
            writer: Mutex::new(writer),
            write_errors: AtomicU64::new(0),
        })
    }

    pub fn append(&self, record: &OutcomeRecord) -> Result<()> {
        let line = record.to_line();
        self.append_line(&line)
    }

    fn append_line(&self, line: &str) -> Result<()> {
        let res = self.writer.lock().write_all(line.as_bytes());
        if res.is_err() {
            self.write_errors.fetch_add(1, Ordering::Relaxed);
        }
        Ok(res?)
    }

    /// Appends that failed so far; each one is a record missing from the log.
    pub fn write_errors(&self) -> u64 {
        self.write_errors.load(Ordering::Relaxed)
    }

    /// Flushes and returns the underlying writer. Takes `self` by value, so it can only run
    /// once no worker holds the sink anymore. A failed flush is logged, not returned: the
    /// records already written stay usable.
    pub fn close(self) -> W {
        let mut writer = self.writer.into_inner();
        if let Err(err) = writer.flush() {
            tracing::warn!(error = %err, "failed to flush result log");
        }
        writer
    }
}

impl ResultSink<File> {
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        Self::new(File::create(path)?)
    }
}

impl ResultSink<Vec<u8>> {
    pub fn in_memory() -> Result<Self> {
        Self::new(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::record::{LogLine, parse_line};
    use std::sync::Arc;

    #[test]
    fn header_is_written_once_up_front() {
        let sink = ResultSink::in_memory().unwrap();
        let buf = sink.close();
        assert_eq!(String::from_utf8(buf).unwrap(), format!("{HEADER}\n"));
    }

    #[test]
    fn appends_keep_call_order_within_one_writer() {
        let sink = ResultSink::in_memory().unwrap();
        for latency_ms in 0..5 {
            sink.append(&OutcomeRecord::Completed {
                start_epoch_ms: 100,
                latency_ms,
                status: 201,
            })
            .unwrap();
        }
        sink.append(&OutcomeRecord::Failed).unwrap();

        let text = String::from_utf8(sink.close()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                HEADER,
                "100 POST 0 201",
                "100 POST 1 201",
                "100 POST 2 201",
                "100 POST 3 201",
                "100 POST 4 201",
                "error",
            ]
        );
    }

    #[test]
    fn concurrent_appends_never_interleave() {
        const WRITERS: u64 = 16;
        const PER_WRITER: u64 = 500;

        let sink = Arc::new(ResultSink::in_memory().unwrap());
        let handles: Vec<_> = (0..WRITERS)
            .map(|w| {
                let sink = sink.clone();
                std::thread::spawn(move || {
                    for i in 0..PER_WRITER {
                        let record = if i % 7 == 0 {
                            OutcomeRecord::Failed
                        } else {
                            OutcomeRecord::Completed {
                                start_epoch_ms: 1_700_000_000_000 + w,
                                latency_ms: i,
                                status: 201,
                            }
                        };
                        sink.append(&record).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let sink = Arc::into_inner(sink).unwrap();
        let text = String::from_utf8(sink.close()).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some(HEADER));

        let mut count = 0u64;
        for line in lines {
            count += 1;
            match parse_line(line) {
                LogLine::Failure => {}
                LogLine::Record {
                    latency_ms: Some(_),
                    status: Some(201),
                } => {}
                other => panic!("corrupted line {line:?} parsed as {other:?}"),
            }
        }
        assert_eq!(count, WRITERS * PER_WRITER);
    }

    #[test]
    fn file_sink_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/report.csv");
        let sink = ResultSink::create(&path).unwrap();
        sink.append(&OutcomeRecord::Failed).unwrap();
        sink.close();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, format!("{HEADER}\nerror\n"));
    }

    /// Accepts `capacity` bytes, then fails every write.
    struct FullDisk {
        written: Vec<u8>,
        capacity: usize,
    }

    impl Write for FullDisk {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            let room = self.capacity - self.written.len();
            if room == 0 {
                return Err(std::io::Error::other("disk full"));
            }
            let n = buf.len().min(room);
            self.written.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn failed_append_is_reported_to_its_caller() {
        let sink = ResultSink::new(FullDisk {
            written: Vec::new(),
            capacity: HEADER.len() + 1 + "error\n".len(),
        })
        .unwrap();

        sink.append(&OutcomeRecord::Failed).unwrap();
        assert!(sink.append(&OutcomeRecord::Failed).is_err());
        assert!(sink.append(&OutcomeRecord::Failed).is_err());
        assert_eq!(sink.write_errors(), 2);

        let disk = sink.close();
        assert_eq!(
            String::from_utf8(disk.written).unwrap(),
            format!("{HEADER}\nerror\n")
        );
    }
}
