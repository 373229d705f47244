use anyhow::{Context, Result};
use log::warn;
use rusqlite::{params, Row};

use crate::db::connection::Database;
use crate::db::helpers::{format_datetime, parse_datetime};
use crate::models::SnoozeRecord;

fn row_to_snooze(row: &Row) -> Result<SnoozeRecord> {
    let scheduled_at: String = row.get("scheduled_at")?;
    let snoozed_until: String = row.get("snoozed_until")?;

    Ok(SnoozeRecord {
        id: Some(row.get("id")?),
        med_id: row.get("med_id")?,
        scheduled_at: parse_datetime(&scheduled_at, "scheduled_at")?,
        snoozed_until: parse_datetime(&snoozed_until, "snoozed_until")?,
    })
}

impl Database {
    pub async fn append_snooze(&self, record: &SnoozeRecord) -> Result<i64> {
        let record = record.clone();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO snoozes (med_id, scheduled_at, snoozed_until)
                 VALUES (?1, ?2, ?3)",
                params![
                    record.med_id,
                    format_datetime(record.scheduled_at),
                    format_datetime(record.snoozed_until),
                ],
            )
            .with_context(|| "failed to append snooze record")?;
            Ok(conn.last_insert_rowid())
        })
        .await
    }

    /// Loads snooze records in write order (ascending id), which the ledger
    /// relies on for latest-wins resolution.
    pub async fn list_snoozes(&self) -> Result<Vec<SnoozeRecord>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, med_id, scheduled_at, snoozed_until
                 FROM snoozes
                 ORDER BY id",
            )?;

            let mut rows = stmt.query([])?;
            let mut records = Vec::new();
            while let Some(row) = rows.next()? {
                match row_to_snooze(row) {
                    Ok(record) => records.push(record),
                    Err(err) => warn!("skipping malformed snooze row: {err:#}"),
                }
            }

            Ok(records)
        })
        .await
    }

    /// Atomically replaces the snooze table with the retained records,
    /// preserving their original write order.
    pub async fn rewrite_snoozes(&self, records: Vec<SnoozeRecord>) -> Result<()> {
        self.execute(move |conn| {
            let tx = conn
                .transaction()
                .with_context(|| "failed to open snooze rewrite transaction")?;

            tx.execute("DELETE FROM snoozes", [])?;
            for record in &records {
                tx.execute(
                    "INSERT INTO snoozes (id, med_id, scheduled_at, snoozed_until)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![
                        record.id,
                        record.med_id,
                        format_datetime(record.scheduled_at),
                        format_datetime(record.snoozed_until),
                    ],
                )?;
            }

            tx.commit()
                .with_context(|| "failed to commit snooze rewrite")
        })
        .await
    }
}
