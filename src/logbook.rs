use std::collections::HashMap;

use chrono::{Duration, NaiveDateTime};
use serde::Serialize;

use crate::models::{DoseAction, DoseKey, LogEntry};

/// Per-action totals over a trailing window; feeds the summary view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionCounts {
    pub taken: u32,
    pub snoozed: u32,
    pub skipped: u32,
}

/// Read-side view over the append-only dose log.
///
/// The presence of any entry for a key means that slot is resolved and must
/// never raise another notification, regardless of the action type.
#[derive(Debug, Default)]
pub struct DoseLog {
    entries: Vec<LogEntry>,
    resolved: HashMap<DoseKey, DoseAction>,
}

impl DoseLog {
    /// Builds the view from entries loaded in write order; the latest action
    /// per key wins for display purposes.
    pub fn new(entries: Vec<LogEntry>) -> Self {
        let mut resolved = HashMap::new();
        for entry in &entries {
            resolved.insert(entry.key(), entry.action);
        }
        Self { entries, resolved }
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn is_resolved(&self, key: DoseKey) -> bool {
        self.resolved.contains_key(&key)
    }

    pub fn latest_action(&self, key: DoseKey) -> Option<DoseAction> {
        self.resolved.get(&key).copied()
    }

    /// Action totals over the trailing `days` days, grouped by actual
    /// action timestamp.
    pub fn counts_in_window(&self, now: NaiveDateTime, days: i64) -> ActionCounts {
        let cutoff = now - Duration::days(days);
        let mut counts = ActionCounts::default();
        for entry in &self.entries {
            if entry.actual_at < cutoff {
                continue;
            }
            match entry.action {
                DoseAction::Taken => counts.taken += 1,
                DoseAction::Snoozed => counts.snoozed += 1,
                DoseAction::Skipped => counts.skipped += 1,
            }
        }
        counts
    }
}
