use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const DAY_NAMES: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

const TIME_FMT: &str = "%H:%M";

/// Weekday activity mask, Monday first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekdayMask(pub [bool; 7]);

impl WeekdayMask {
    pub fn all() -> Self {
        WeekdayMask([true; 7])
    }

    pub fn weekdays() -> Self {
        WeekdayMask([true, true, true, true, true, false, false])
    }

    pub fn none() -> Self {
        WeekdayMask([false; 7])
    }

    /// Parses the stored form, seven characters of `1`/`0` (e.g. `1010100`).
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.len() != 7 || !raw.chars().all(|ch| ch == '0' || ch == '1') {
            return None;
        }
        let mut days = [false; 7];
        for (idx, ch) in raw.chars().enumerate() {
            days[idx] = ch == '1';
        }
        Some(WeekdayMask(days))
    }

    pub fn encode(&self) -> String {
        self.0
            .iter()
            .map(|&active| if active { '1' } else { '0' })
            .collect()
    }

    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        self.0[date.weekday().num_days_from_monday() as usize]
    }

    pub fn active_count(&self) -> usize {
        self.0.iter().filter(|&&active| active).count()
    }

    /// Readable form for list views, e.g. `Mon Wed Fri`.
    pub fn day_names(&self) -> String {
        let names: Vec<&str> = DAY_NAMES
            .iter()
            .zip(self.0.iter())
            .filter(|(_, &active)| active)
            .map(|(&name, _)| name)
            .collect();
        if names.is_empty() {
            "(none)".to_string()
        } else {
            names.join(" ")
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Medication {
    pub id: i64,
    pub name: String,
    pub dose: String,
    pub times: Vec<NaiveTime>,
    pub days: WeekdayMask,
    pub active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// User-supplied medication fields, before an id has been assigned.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicationDraft {
    pub name: String,
    pub dose: String,
    pub times: Vec<NaiveTime>,
    pub days: WeekdayMask,
    pub active: bool,
}

impl MedicationDraft {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::EmptyName);
        }
        if self.times.is_empty() {
            return Err(Error::NoDoseTimes);
        }
        Ok(())
    }

    /// Trims text fields and sorts/dedups dose times before persistence.
    pub fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self.dose = self.dose.trim().to_string();
        self.times.sort();
        self.times.dedup();
        self
    }
}

pub fn times_to_csv(times: &[NaiveTime]) -> String {
    times
        .iter()
        .map(|t| t.format(TIME_FMT).to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Parses the stored `08:00,20:00` form. Entries that fail to parse are
/// skipped with a warning so one bad value does not drop the whole row.
pub fn times_from_csv(raw: &str) -> Vec<NaiveTime> {
    let mut out = Vec::new();
    for part in raw.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        match NaiveTime::parse_from_str(part, TIME_FMT) {
            Ok(time) => out.push(time),
            Err(err) => warn!("skipping unparseable dose time '{part}': {err}"),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(name: &str, times: &[(u32, u32)]) -> MedicationDraft {
        MedicationDraft {
            name: name.to_string(),
            dose: "500 mg".to_string(),
            times: times
                .iter()
                .map(|&(h, m)| NaiveTime::from_hms_opt(h, m, 0).unwrap())
                .collect(),
            days: WeekdayMask::all(),
            active: true,
        }
    }

    #[test]
    fn mask_round_trips_stored_form() {
        let mask = WeekdayMask::parse("1010100").unwrap();
        assert_eq!(mask.encode(), "1010100");
        assert_eq!(mask.active_count(), 3);
        assert_eq!(mask.day_names(), "Mon Wed Fri");
    }

    #[test]
    fn mask_rejects_malformed_input() {
        assert!(WeekdayMask::parse("101").is_none());
        assert!(WeekdayMask::parse("10101xx").is_none());
        assert_eq!(WeekdayMask::none().day_names(), "(none)");
    }

    #[test]
    fn mask_checks_weekday_of_date() {
        // 2024-03-06 is a Wednesday
        let wed = NaiveDate::from_ymd_opt(2024, 3, 6).unwrap();
        assert!(WeekdayMask::weekdays().is_active_on(wed));
        assert!(!WeekdayMask::parse("1100000").unwrap().is_active_on(wed));
    }

    #[test]
    fn draft_validation_rejects_empty_fields() {
        assert!(matches!(
            draft("   ", &[(8, 0)]).validate(),
            Err(Error::EmptyName)
        ));
        assert!(matches!(draft("Aspirin", &[]).validate(), Err(Error::NoDoseTimes)));
        assert!(draft("Aspirin", &[(8, 0)]).validate().is_ok());
    }

    #[test]
    fn normalize_sorts_and_dedups_times() {
        let normalized = draft("  Aspirin ", &[(20, 0), (8, 0), (20, 0)]).normalized();
        assert_eq!(normalized.name, "Aspirin");
        assert_eq!(times_to_csv(&normalized.times), "08:00,20:00");
    }

    #[test]
    fn times_csv_skips_malformed_entries() {
        let times = times_from_csv("08:00, bogus ,20:15,");
        assert_eq!(times.len(), 2);
        assert_eq!(times_to_csv(&times), "08:00,20:15");
    }
}
