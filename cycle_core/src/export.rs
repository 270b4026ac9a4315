//! CSV export of cycle events and daily logs.

use crate::{CycleEvent, DailyLog, Result};
use std::path::Path;

/// A row in the events CSV
#[derive(Debug, serde::Serialize)]
struct EventRow {
    id: String,
    date: String,
    kind: &'static str,
    notes: Option<String>,
}

impl From<&CycleEvent> for EventRow {
    fn from(event: &CycleEvent) -> Self {
        EventRow {
            id: event.id.to_string(),
            date: event.date.format("%Y-%m-%d").to_string(),
            kind: event.kind.as_str(),
            notes: event.notes.clone(),
        }
    }
}

/// A row in the daily logs CSV
#[derive(Debug, serde::Serialize)]
struct DailyLogRow {
    date: String,
    mood: Option<u8>,
    energy: Option<u8>,
    symptoms: String,
    notes: Option<String>,
}

impl From<&DailyLog> for DailyLogRow {
    fn from(log: &DailyLog) -> Self {
        DailyLogRow {
            date: log.date.format("%Y-%m-%d").to_string(),
            mood: log.mood,
            energy: log.energy,
            symptoms: log.symptoms.join(";"),
            notes: log.notes.clone(),
        }
    }
}

/// Write events to a headered CSV file, replacing any existing file
///
/// Returns the number of rows written.
pub fn export_events_csv(events: &[CycleEvent], path: &Path) -> Result<usize> {
    write_rows(path, events.iter().map(EventRow::from))
}

/// Write daily logs to a headered CSV file, replacing any existing file
///
/// Symptoms are joined with `;` into a single column.
pub fn export_daily_logs_csv(logs: &[DailyLog], path: &Path) -> Result<usize> {
    write_rows(path, logs.iter().map(DailyLogRow::from))
}

fn write_rows<T: serde::Serialize>(path: &Path, rows: impl Iterator<Item = T>) -> Result<usize> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(path)?;
    let mut count = 0;
    for row in rows {
        writer.serialize(row)?;
        count += 1;
    }
    writer.flush()?;

    tracing::info!("Exported {} rows to {:?}", count, path);
    Ok(count)
}
