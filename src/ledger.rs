use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::{Error, Result};
use crate::models::{DoseKey, SnoozeRecord};

/// In-memory view over the persisted snooze records, in write order.
///
/// Snoozes are keyed by their *new* time for cleanup so a stale override from
/// days ago is eventually forgotten whether or not it was ever acted on.
#[derive(Debug, Default)]
pub struct SnoozeLedger {
    records: Vec<SnoozeRecord>,
}

impl SnoozeLedger {
    /// Builds the view from records loaded in write order (ascending row id).
    pub fn new(records: Vec<SnoozeRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[SnoozeRecord] {
        &self.records
    }

    /// Appends an override after checking it actually moves the slot forward.
    /// Returns the record so the caller can persist it.
    pub fn record(
        &mut self,
        med_id: i64,
        scheduled_at: NaiveDateTime,
        snoozed_until: NaiveDateTime,
    ) -> Result<SnoozeRecord> {
        if snoozed_until <= scheduled_at {
            return Err(Error::SnoozeOrdering {
                scheduled: scheduled_at,
                until: snoozed_until,
            });
        }
        let record = SnoozeRecord {
            id: None,
            med_id,
            scheduled_at,
            snoozed_until,
        };
        self.records.push(record.clone());
        Ok(record)
    }

    /// Overrides whose new time falls on `today`, latest write wins per key.
    /// Records relocated to any other date are excluded even if still
    /// unresolved.
    pub fn effective_for_today(&self, today: NaiveDate) -> HashMap<DoseKey, NaiveDateTime> {
        let mut out = HashMap::new();
        for record in &self.records {
            if record.snoozed_until.date() == today {
                out.insert(record.key(), record.snoozed_until);
            }
        }
        out
    }

    /// Records young enough to survive a retention pass: anything whose new
    /// time's date is more than `keep_days` days before `today` is dropped.
    /// Purging affects storage growth only, never the answer of
    /// `effective_for_today`.
    pub fn retained_after_purge(&self, today: NaiveDate, keep_days: i64) -> Vec<SnoozeRecord> {
        self.records
            .iter()
            .filter(|record| (today - record.snoozed_until.date()).num_days() <= keep_days)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate, NaiveTime};

    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn at(date: NaiveDate, h: u32, m: u32) -> NaiveDateTime {
        date.and_time(NaiveTime::from_hms_opt(h, m, 0).unwrap())
    }

    #[test]
    fn record_rejects_non_forward_snooze() {
        let mut ledger = SnoozeLedger::default();
        let scheduled = at(day(6), 8, 0);
        let err = ledger.record(1, scheduled, scheduled).unwrap_err();
        assert!(matches!(err, Error::SnoozeOrdering { .. }));
        assert!(ledger.records().is_empty());
    }

    #[test]
    fn effective_for_today_takes_latest_write() {
        let mut ledger = SnoozeLedger::default();
        let scheduled = at(day(6), 8, 0);
        ledger.record(1, scheduled, at(day(6), 14, 0)).unwrap();
        ledger.record(1, scheduled, at(day(6), 15, 0)).unwrap();

        let map = ledger.effective_for_today(day(6));
        assert_eq!(map.len(), 1);
        assert_eq!(
            map[&DoseKey {
                med_id: 1,
                scheduled_at: scheduled
            }],
            at(day(6), 15, 0)
        );
    }

    #[test]
    fn effective_for_today_excludes_other_dates() {
        let mut ledger = SnoozeLedger::default();
        // Pending override from yesterday never leaks into today's view.
        ledger.record(1, at(day(5), 8, 0), at(day(5), 22, 0)).unwrap();
        ledger.record(2, at(day(6), 8, 0), at(day(6), 8, 30)).unwrap();

        let map = ledger.effective_for_today(day(6));
        assert_eq!(map.len(), 1);
        assert!(map
            .keys()
            .all(|key| key.med_id == 2));
    }

    #[test]
    fn purge_drops_stale_records_only() {
        let mut ledger = SnoozeLedger::default();
        let today = day(9);
        let stale = today - Duration::days(3);
        ledger.record(1, at(stale, 8, 0), at(stale, 8, 30)).unwrap();
        ledger.record(1, at(today, 8, 0), at(today, 8, 30)).unwrap();

        let retained = ledger.retained_after_purge(today, 1);
        assert_eq!(retained.len(), 1);
        assert_eq!(retained[0].snoozed_until.date(), today);
    }

    #[test]
    fn purge_keeps_records_inside_retention() {
        let mut ledger = SnoozeLedger::default();
        let today = day(9);
        let yesterday = today - Duration::days(1);
        ledger
            .record(1, at(yesterday, 8, 0), at(yesterday, 9, 0))
            .unwrap();

        assert_eq!(ledger.retained_after_purge(today, 1).len(), 1);
        assert!(ledger.retained_after_purge(today, 0).is_empty());
    }
}
