use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::logbook::DoseLog;
use crate::models::{DoseAction, Occurrence};

use super::config::ScheduleConfig;

/// Display status of one occurrence in the weekly grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DoseStatus {
    Idle,
    DueSoon,
    Taken,
    Skipped,
    Snoozed,
}

impl DoseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DoseStatus::Idle => "idle",
            DoseStatus::DueSoon => "due-soon",
            DoseStatus::Taken => "taken",
            DoseStatus::Skipped => "skipped",
            DoseStatus::Snoozed => "snoozed",
        }
    }
}

/// True if `now` falls within the due window around `effective_at`,
/// inclusive at the boundary.
pub fn within_due_window(now: NaiveDateTime, effective_at: NaiveDateTime, window_secs: i64) -> bool {
    (now - effective_at).num_seconds().abs() <= window_secs
}

/// Maps an occurrence to its display status. A logged action always wins;
/// otherwise the occurrence is due-soon inside the window and idle outside
/// it. No other precedence rules.
pub fn classify(
    occ: &Occurrence,
    log: &DoseLog,
    now: NaiveDateTime,
    config: &ScheduleConfig,
) -> DoseStatus {
    if let Some(action) = log.latest_action(occ.key()) {
        return match action {
            DoseAction::Taken => DoseStatus::Taken,
            DoseAction::Skipped => DoseStatus::Skipped,
            DoseAction::Snoozed => DoseStatus::Snoozed,
        };
    }
    if within_due_window(now, occ.effective_at, config.due_window_secs) {
        DoseStatus::DueSoon
    } else {
        DoseStatus::Idle
    }
}
