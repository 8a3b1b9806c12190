//! JSON Lines audit sinks.
//!
//! Uses JSON Lines format (.jsonl) for robustness:
//! - Each line is a complete JSON object
//! - Partial file corruption only affects individual lines
//! - Can be read even if a write was interrupted

use crate::error::AuditResult;
use crate::record::AttemptRecord;
use chrono::Utc;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::sync::Mutex;
use tracing::warn;

/// Where the engine reports attempt lifecycle events.
///
/// Recording must never fail the submission it describes; implementations
/// swallow and log their own errors.
pub trait AuditSink: Send + Sync {
    fn record(&self, record: &AttemptRecord);
}

/// Sink that discards everything. For tests and dry wiring.
#[derive(Debug, Default)]
pub struct NullAuditSink;

impl AuditSink for NullAuditSink {
    fn record(&self, _record: &AttemptRecord) {}
}

struct ActiveWriter {
    writer: BufWriter<File>,
    records_written: usize,
}

/// Append-only JSON Lines audit log, one file per day.
///
/// Opens `<dir>/orders_<YYYYMMDD>.jsonl` lazily in append mode and flushes
/// after every record; an interrupted process loses at most the line being
/// written.
pub struct JsonLinesAuditSink {
    base_dir: String,
    active: Mutex<Option<ActiveWriter>>,
}

impl JsonLinesAuditSink {
    pub fn new(base_dir: impl Into<String>) -> Self {
        let base_dir = base_dir.into();
        if let Err(e) = std::fs::create_dir_all(&base_dir) {
            warn!(?e, "failed to create audit directory: {}", base_dir);
        }

        Self {
            base_dir,
            active: Mutex::new(None),
        }
    }

    fn write_record(&self, record: &AttemptRecord) -> AuditResult<()> {
        let mut guard = self.active.lock().unwrap_or_else(|e| e.into_inner());

        if guard.is_none() {
            let date = Utc::now().format("%Y%m%d");
            let filename = format!("{}/orders_{}.jsonl", self.base_dir, date);
            let file = OpenOptions::new().create(true).append(true).open(&filename)?;
            *guard = Some(ActiveWriter {
                writer: BufWriter::new(file),
                records_written: 0,
            });
        }

        let active = guard.as_mut().expect("writer opened above");
        serde_json::to_writer(&mut active.writer, record)?;
        active.writer.write_all(b"\n")?;
        active.writer.flush()?;
        active.records_written += 1;

        Ok(())
    }

    /// Number of records written so far.
    pub fn records_written(&self) -> usize {
        self.active
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map_or(0, |w| w.records_written)
    }
}

impl AuditSink for JsonLinesAuditSink {
    fn record(&self, record: &AttemptRecord) {
        if let Err(e) = self.write_record(record) {
            warn!(?e, cloid = %record.client_order_id, "failed to write audit record");
        }
    }
}
