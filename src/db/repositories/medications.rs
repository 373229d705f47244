use anyhow::{anyhow, Context, Result};
use chrono::NaiveDateTime;
use log::warn;
use rusqlite::{params, Row};

use crate::db::connection::Database;
use crate::db::helpers::{format_datetime, parse_datetime};
use crate::models::medication::{times_from_csv, times_to_csv};
use crate::models::{Medication, MedicationDraft, WeekdayMask};

fn row_to_medication(row: &Row) -> Result<Medication> {
    let times: String = row.get("times")?;
    let days_mask: String = row.get("days_mask")?;
    let created_at: String = row.get("created_at")?;
    let updated_at: String = row.get("updated_at")?;

    Ok(Medication {
        id: row.get("id")?,
        name: row.get("name")?,
        dose: row.get("dose")?,
        times: times_from_csv(&times),
        days: WeekdayMask::parse(&days_mask)
            .ok_or_else(|| anyhow!("invalid days mask '{days_mask}'"))?,
        active: row.get("active")?,
        created_at: parse_datetime(&created_at, "created_at")?,
        updated_at: parse_datetime(&updated_at, "updated_at")?,
    })
}

impl Database {
    pub async fn insert_medication(
        &self,
        draft: &MedicationDraft,
        now: NaiveDateTime,
    ) -> Result<i64> {
        let record = draft.clone();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO medications (name, dose, times, days_mask, active, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    record.name,
                    record.dose,
                    times_to_csv(&record.times),
                    record.days.encode(),
                    record.active,
                    format_datetime(now),
                    format_datetime(now),
                ],
            )
            .with_context(|| "failed to insert medication")?;
            Ok(conn.last_insert_rowid())
        })
        .await
    }

    /// Mutates an existing medication in place. Returns the number of rows
    /// touched so the caller can detect an unknown id.
    pub async fn update_medication(
        &self,
        med_id: i64,
        draft: &MedicationDraft,
        now: NaiveDateTime,
    ) -> Result<usize> {
        let record = draft.clone();
        self.execute(move |conn| {
            let changed = conn
                .execute(
                    "UPDATE medications
                     SET name = ?1,
                         dose = ?2,
                         times = ?3,
                         days_mask = ?4,
                         active = ?5,
                         updated_at = ?6
                     WHERE id = ?7",
                    params![
                        record.name,
                        record.dose,
                        times_to_csv(&record.times),
                        record.days.encode(),
                        record.active,
                        format_datetime(now),
                        med_id,
                    ],
                )
                .with_context(|| "failed to update medication")?;
            Ok(changed)
        })
        .await
    }

    pub async fn set_medication_active(
        &self,
        med_id: i64,
        active: bool,
        now: NaiveDateTime,
    ) -> Result<usize> {
        self.execute(move |conn| {
            let changed = conn
                .execute(
                    "UPDATE medications SET active = ?1, updated_at = ?2 WHERE id = ?3",
                    params![active, format_datetime(now), med_id],
                )
                .with_context(|| "failed to flip medication active flag")?;
            Ok(changed)
        })
        .await
    }

    pub async fn get_medication(&self, med_id: i64) -> Result<Option<Medication>> {
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, dose, times, days_mask, active, created_at, updated_at
                 FROM medications
                 WHERE id = ?1",
            )?;

            let mut rows = stmt.query(params![med_id])?;
            if let Some(row) = rows.next()? {
                Ok(Some(row_to_medication(row)?))
            } else {
                Ok(None)
            }
        })
        .await
    }

    /// Loads every medication, active and inactive. Rows that fail to parse
    /// are skipped with a warning so one bad record does not make the rest
    /// of the schedule unusable.
    pub async fn list_medications(&self) -> Result<Vec<Medication>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, dose, times, days_mask, active, created_at, updated_at
                 FROM medications
                 ORDER BY id",
            )?;

            let mut rows = stmt.query([])?;
            let mut meds = Vec::new();
            while let Some(row) = rows.next()? {
                match row_to_medication(row) {
                    Ok(med) => meds.push(med),
                    Err(err) => warn!("skipping malformed medication row: {err:#}"),
                }
            }

            Ok(meds)
        })
        .await
    }
}
