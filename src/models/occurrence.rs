use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// Identifies one concrete dose slot: the medication plus the original
/// calendar instant, before any snooze relocation. This pair keys the
/// action log and the snooze ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoseKey {
    pub med_id: i64,
    pub scheduled_at: NaiveDateTime,
}

/// One concrete dose instance inside a built week. Recomputed on every
/// builder pass, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Occurrence {
    pub med_id: i64,
    pub med_name: String,
    pub dose: String,
    /// Original calendar instant; the log key.
    pub scheduled_at: NaiveDateTime,
    /// Instant the dose should be treated as due, after applying any
    /// same-day snooze override. Always >= `scheduled_at`.
    pub effective_at: NaiveDateTime,
}

impl Occurrence {
    pub fn key(&self) -> DoseKey {
        DoseKey {
            med_id: self.med_id,
            scheduled_at: self.scheduled_at,
        }
    }

    /// Whether a snooze override moved this occurrence off its calendar slot.
    pub fn is_relocated(&self) -> bool {
        self.effective_at != self.scheduled_at
    }

    pub fn day_part(&self) -> DayPart {
        DayPart::for_hour(self.effective_at.hour())
    }
}

/// Row bucket the weekly grid places a dose into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DayPart {
    Am,
    Noon,
    Pm,
    Bed,
}

impl DayPart {
    pub fn for_hour(hour: u32) -> DayPart {
        match hour {
            5..=11 => DayPart::Am,
            12..=14 => DayPart::Noon,
            15..=19 => DayPart::Pm,
            _ => DayPart::Bed,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DayPart::Am => "AM",
            DayPart::Noon => "Noon",
            DayPart::Pm => "PM",
            DayPart::Bed => "Bed",
        }
    }
}
