//! Record export.
//!
//! Snapshots records as JSON or CSV for audit and hand-off. Both
//! formats share one flat row shape so a report and a location share
//! land in the same column set; timestamps are rendered as RFC 3339
//! here and nowhere deeper in the stack.

use crate::models::{Record, RecordPayload};
use crate::{Error, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// Export file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// Pretty-printed JSON array.
    #[default]
    Json,
    /// CSV with a header row.
    Csv,
}

impl ExportFormat {
    /// Parses a format name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }

    /// Detects the format from a file extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::parse)
    }

    /// Returns the format name as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One exported record, flattened across both kinds.
///
/// Kind-specific columns are `None`/empty where they do not apply.
#[derive(Debug, Clone, Serialize)]
pub struct ExportRow {
    /// Record id.
    pub id: String,
    /// Record kind name.
    pub kind: String,
    /// Creation instant, RFC 3339.
    pub created_at: String,
    /// Deletion instant, RFC 3339, when soft-deleted.
    pub deleted_at: Option<String>,
    /// Reporter or sharer name.
    pub name: String,
    /// Report severity.
    pub severity: Option<String>,
    /// Report location text.
    pub location: Option<String>,
    /// Report description.
    pub description: Option<String>,
    /// Share latitude.
    pub latitude: Option<f64>,
    /// Share longitude.
    pub longitude: Option<f64>,
    /// Share note.
    pub note: Option<String>,
}

impl From<&Record> for ExportRow {
    fn from(record: &Record) -> Self {
        let mut row = Self {
            id: record.id.as_str().to_string(),
            kind: record.kind.as_str().to_string(),
            created_at: format_timestamp(record.created_at),
            deleted_at: record.deleted_at.map(format_timestamp),
            name: String::new(),
            severity: None,
            location: None,
            description: None,
            latitude: None,
            longitude: None,
            note: None,
        };

        match &record.payload {
            RecordPayload::EmergencyReport(report) => {
                row.name.clone_from(&report.reporter_name);
                row.severity = Some(report.severity.as_str().to_string());
                row.location = Some(report.location.clone());
                row.description = Some(report.description.clone());
            }
            RecordPayload::LocationShare(share) => {
                row.name.clone_from(&share.sharer_name);
                row.latitude = Some(share.latitude);
                row.longitude = Some(share.longitude);
                row.note.clone_from(&share.note);
            }
        }

        row
    }
}

/// Result of an export operation.
#[derive(Debug, Clone)]
pub struct ExportResult {
    /// Number of records exported.
    pub exported: usize,
    /// Format used.
    pub format: ExportFormat,
    /// Output path, if the export went to a file.
    pub output_path: Option<String>,
}

impl ExportResult {
    /// Returns whether any records were exported.
    #[must_use]
    pub const fn has_exports(&self) -> bool {
        self.exported > 0
    }
}

/// Writes records to a writer in the given format.
///
/// # Errors
///
/// Returns an error if serialization or the underlying write fails.
pub fn export_records<W: Write>(
    records: &[Record],
    format: ExportFormat,
    writer: W,
) -> Result<ExportResult> {
    let exported = match format {
        ExportFormat::Json => write_json(records, writer)?,
        ExportFormat::Csv => write_csv(records, writer)?,
    };

    Ok(ExportResult {
        exported,
        format,
        output_path: None,
    })
}

/// Exports records to a file.
///
/// The format is detected from the file extension when `format` is
/// `None`, defaulting to JSON.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn export_to_file(
    records: &[Record],
    format: Option<ExportFormat>,
    path: &Path,
) -> Result<ExportResult> {
    let format = format
        .or_else(|| ExportFormat::from_path(path))
        .unwrap_or_default();

    let file = std::fs::File::create(path).map_err(|e| Error::Storage {
        operation: "create_export_file".to_string(),
        cause: format!("{}: {e}", path.display()),
    })?;
    let writer = std::io::BufWriter::new(file);

    let mut result = export_records(records, format, writer)?;
    result.output_path = Some(path.display().to_string());
    Ok(result)
}

fn write_json<W: Write>(records: &[Record], mut writer: W) -> Result<usize> {
    let rows: Vec<ExportRow> = records.iter().map(ExportRow::from).collect();

    serde_json::to_writer_pretty(&mut writer, &rows).map_err(|e| Error::Storage {
        operation: "write_json_export".to_string(),
        cause: e.to_string(),
    })?;
    writeln!(writer).map_err(|e| Error::Storage {
        operation: "write_json_export".to_string(),
        cause: e.to_string(),
    })?;
    writer.flush().map_err(|e| Error::Storage {
        operation: "flush_json_export".to_string(),
        cause: e.to_string(),
    })?;

    Ok(rows.len())
}

fn write_csv<W: Write>(records: &[Record], writer: W) -> Result<usize> {
    let csv_error = |e: csv::Error| Error::Storage {
        operation: "write_csv_export".to_string(),
        cause: e.to_string(),
    };

    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    // Header row is written even for an empty export.
    csv_writer
        .write_record([
            "id",
            "kind",
            "created_at",
            "deleted_at",
            "name",
            "severity",
            "location",
            "description",
            "latitude",
            "longitude",
            "note",
        ])
        .map_err(csv_error)?;

    let mut exported = 0;
    for record in records {
        let row = ExportRow::from(record);
        let latitude = row.latitude.map_or_else(String::new, |v| v.to_string());
        let longitude = row.longitude.map_or_else(String::new, |v| v.to_string());

        csv_writer
            .write_record([
                row.id.as_str(),
                row.kind.as_str(),
                row.created_at.as_str(),
                row.deleted_at.as_deref().unwrap_or(""),
                row.name.as_str(),
                row.severity.as_deref().unwrap_or(""),
                row.location.as_deref().unwrap_or(""),
                row.description.as_deref().unwrap_or(""),
                latitude.as_str(),
                longitude.as_str(),
                row.note.as_deref().unwrap_or(""),
            ])
            .map_err(csv_error)?;
        exported += 1;
    }

    csv_writer.flush().map_err(|e| Error::Storage {
        operation: "flush_csv_export".to_string(),
        cause: e.to_string(),
    })?;

    Ok(exported)
}

/// Renders an epoch-seconds timestamp as RFC 3339.
#[must_use]
pub fn format_timestamp(secs: u64) -> String {
    i64::try_from(secs)
        .ok()
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .map_or_else(
            || secs.to_string(),
            |dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true),
        )
}
