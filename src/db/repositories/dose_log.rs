use anyhow::{anyhow, Context, Result};
use log::warn;
use rusqlite::{params, Row};

use crate::db::connection::Database;
use crate::db::helpers::{format_datetime, parse_datetime};
use crate::models::{DoseAction, LogEntry};

fn row_to_entry(row: &Row) -> Result<LogEntry> {
    let scheduled_at: String = row.get("scheduled_at")?;
    let action: String = row.get("action")?;
    let actual_at: String = row.get("actual_at")?;

    Ok(LogEntry {
        id: Some(row.get("id")?),
        med_id: row.get("med_id")?,
        scheduled_at: parse_datetime(&scheduled_at, "scheduled_at")?,
        action: DoseAction::parse(&action)
            .ok_or_else(|| anyhow!("unknown dose action '{action}'"))?,
        actual_at: parse_datetime(&actual_at, "actual_at")?,
    })
}

impl Database {
    /// Pure append; the log is never edited or rewritten.
    pub async fn append_log_entry(&self, entry: &LogEntry) -> Result<i64> {
        let record = entry.clone();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO dose_log (med_id, scheduled_at, action, actual_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    record.med_id,
                    format_datetime(record.scheduled_at),
                    record.action.as_str(),
                    format_datetime(record.actual_at),
                ],
            )
            .with_context(|| "failed to append dose log entry")?;
            Ok(conn.last_insert_rowid())
        })
        .await
    }

    /// Loads the full log in write order. Malformed entries (bad timestamps,
    /// unknown actions) are skipped with a warning.
    pub async fn list_log_entries(&self) -> Result<Vec<LogEntry>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, med_id, scheduled_at, action, actual_at
                 FROM dose_log
                 ORDER BY id",
            )?;

            let mut rows = stmt.query([])?;
            let mut entries = Vec::new();
            while let Some(row) = rows.next()? {
                match row_to_entry(row) {
                    Ok(entry) => entries.push(entry),
                    Err(err) => warn!("skipping malformed dose log row: {err:#}"),
                }
            }

            Ok(entries)
        })
        .await
    }
}
