use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::occurrence::DoseKey;

/// Terminal action recorded against a dose slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DoseAction {
    Taken,
    Skipped,
    Snoozed,
}

impl DoseAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            DoseAction::Taken => "taken",
            DoseAction::Skipped => "skipped",
            DoseAction::Snoozed => "snoozed",
        }
    }

    pub fn parse(value: &str) -> Option<DoseAction> {
        match value {
            "taken" => Some(DoseAction::Taken),
            "skipped" => Some(DoseAction::Skipped),
            "snoozed" => Some(DoseAction::Snoozed),
            _ => None,
        }
    }
}

/// Append-only record of a user action. Immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub id: Option<i64>,
    pub med_id: i64,
    /// Original scheduled instant of the slot this action resolves.
    pub scheduled_at: NaiveDateTime,
    pub action: DoseAction,
    pub actual_at: NaiveDateTime,
}

impl LogEntry {
    pub fn key(&self) -> DoseKey {
        DoseKey {
            med_id: self.med_id,
            scheduled_at: self.scheduled_at,
        }
    }
}
