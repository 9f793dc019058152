//! CSV export of the entry log.
//!
//! Produces one row per entry in the order given, with a header row. Dates
//! are written as `YYYY-MM-DD` and absent optional fields as empty cells.

use crate::{Entry, Result};
use std::io::Write;
use std::path::Path;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct CsvRow<'a> {
    id: String,
    date: String,
    exercise: &'a str,
    muscle_group: &'a str,
    sets: i32,
    reps: &'a str,
    weight: Option<f64>,
    rpe: Option<f64>,
    notes: Option<&'a str>,
    created_at: String,
}

impl<'a> From<&'a Entry> for CsvRow<'a> {
    fn from(entry: &'a Entry) -> Self {
        CsvRow {
            id: entry.id.to_string(),
            date: entry.date.format("%Y-%m-%d").to_string(),
            exercise: &entry.exercise,
            muscle_group: &entry.muscle_group,
            sets: entry.sets,
            reps: &entry.reps,
            weight: entry.weight,
            rpe: entry.rpe,
            notes: entry.notes.as_deref(),
            created_at: entry.created_at.to_rfc3339(),
        }
    }
}

/// Write entries as CSV to any writer; returns the number of rows written
pub fn write_csv<W: Write>(entries: &[Entry], writer: W) -> Result<usize> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(writer);

    for entry in entries {
        writer.serialize(CsvRow::from(entry))?;
    }
    writer.flush()?;

    Ok(entries.len())
}

/// Write entries as CSV to a file, replacing it
pub fn export_to_path(entries: &[Entry], path: &Path) -> Result<usize> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let file = std::fs::File::create(path)?;
    let count = write_csv(entries, file)?;

    tracing::info!("Exported {} entries to {:?}", count, path);
    Ok(count)
}
