//! Export: serialises a filtered view of the history store as CSV.
//!
//! Quoting follows RFC 4180 through the `csv` crate: any field containing the
//! delimiter, a quote or a line break is wrapped in quotes with inner quotes
//! doubled, so a standard CSV reader recovers every field exactly.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, SecondsFormat};

use crate::types::LogEvent;

/// MIME type of the export artifact.
pub const EXPORT_MIME: &str = "text/csv";

/// Fixed header row.
pub const EXPORT_HEADER: [&str; 6] = ["ID", "Timestamp", "Level", "Account ID", "Message", "Impact"];

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("csv write failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("export i/o failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Write the header and one row per event to `writer`.
///
/// Timestamps use RFC 3339 with millisecond precision in UTC. A missing
/// amount becomes an empty field.
pub fn export<'a, W, I>(events: I, writer: W) -> Result<usize, ExportError>
where
    W: Write,
    I: IntoIterator<Item = &'a LogEvent>,
{
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(EXPORT_HEADER)?;

    let mut rows = 0;
    for event in events {
        let timestamp = event.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true);
        csv.write_record([
            event.id.as_str(),
            timestamp.as_str(),
            event.kind.as_str(),
            event.account.as_str(),
            event.message.as_str(),
            event.amount.as_deref().unwrap_or(""),
        ])?;
        rows += 1;
    }
    csv.flush()?;
    Ok(rows)
}

/// Render the export into a `String`.
pub fn export_to_string<'a, I>(events: I) -> Result<String, ExportError>
where
    I: IntoIterator<Item = &'a LogEvent>,
{
    let mut buf = Vec::new();
    export(events, &mut buf)?;
    // The csv writer only emits the UTF-8 we handed it.
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Date-stamped artifact name, e.g. `tradewatch-logs-2024-12-26.csv`.
pub fn export_file_name(date: NaiveDate) -> String {
    format!("tradewatch-logs-{}.csv", date.format("%Y-%m-%d"))
}

/// Save the export into `dir` under [`export_file_name`]. Creates `dir` if
/// needed and returns the written path.
pub fn write_export<'a, I>(dir: &Path, date: NaiveDate, events: I) -> Result<PathBuf, ExportError>
where
    I: IntoIterator<Item = &'a LogEvent>,
{
    std::fs::create_dir_all(dir)?;
    let path = dir.join(export_file_name(date));
    let file = std::fs::File::create(&path)?;
    let rows = export(events, std::io::BufWriter::new(file))?;
    tracing::info!(path = %path.display(), rows, "history exported");
    Ok(path)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
