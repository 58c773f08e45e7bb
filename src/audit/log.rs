//! Append-only in-memory audit log with CSV export
//!
//! The CSV starts with a UTF-8 byte-order mark so spreadsheet tools pick
//! the right encoding. Columns are the union of all record columns in
//! first-appearance order; missing cells are left empty.

use super::record::AuditRecord;
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// UTF-8 byte-order mark
const UTF8_BOM: &str = "\u{feff}";

/// Generate a short upper-case session identifier
pub fn new_session_id() -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    id[..8].to_uppercase()
}

/// Ordered collection of audit records for one session
#[derive(Debug, Clone)]
pub struct AuditLog {
    session_id: String,
    records: Vec<AuditRecord>,
}

impl AuditLog {
    /// Create an empty log for a session
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            records: Vec::new(),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Append a record
    pub fn append(&mut self, record: AuditRecord) {
        tracing::debug!(
            id = record.log_uuid(),
            status = %record.integrity_status(),
            "Audit record appended"
        );
        self.records.push(record);
    }

    pub fn records(&self) -> &[AuditRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of records whose integrity check failed
    pub fn failures(&self) -> usize {
        self.records
            .iter()
            .filter(|r| !r.integrity_status().is_pass())
            .count()
    }

    /// Union of record columns in first-appearance order
    pub fn columns(&self) -> Vec<String> {
        let mut columns: Vec<String> = Vec::new();
        for record in &self.records {
            for column in record.columns() {
                if !columns.contains(&column) {
                    columns.push(column);
                }
            }
        }
        columns
    }

    /// Render the log as CSV text, BOM included
    pub fn to_csv(&self) -> Result<String> {
        let columns = self.columns();
        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::CRLF)
            .from_writer(UTF8_BOM.as_bytes().to_vec());

        writer.write_record(&columns)?;
        for record in &self.records {
            writer.write_record(columns.iter().map(|c| record.get(c).unwrap_or_default()))?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| Error::Export(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| Error::Export(e.to_string()))
    }

    /// File name used by `export_csv`
    pub fn export_file_name(&self) -> String {
        format!(
            "gdpr_audit_{}_{}.csv",
            self.session_id,
            chrono::Utc::now().timestamp()
        )
    }

    /// Write the CSV into `dir` and return the file path
    pub fn export_csv(&self, dir: &Path) -> Result<PathBuf> {
        if self.records.is_empty() {
            return Err(Error::Export("audit log is empty".to_string()));
        }

        std::fs::create_dir_all(dir)?;
        let path = dir.join(self.export_file_name());
        std::fs::write(&path, self.to_csv()?)?;

        tracing::info!(
            path = %path.display(),
            records = self.records.len(),
            "Exported audit log"
        );
        Ok(path)
    }
}
