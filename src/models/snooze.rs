use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::occurrence::DoseKey;

/// One snooze override: the original slot relocated to `snoozed_until`.
/// The same key may accumulate several records across a day; the ledger
/// resolves to the latest.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnoozeRecord {
    pub id: Option<i64>,
    pub med_id: i64,
    pub scheduled_at: NaiveDateTime,
    pub snoozed_until: NaiveDateTime,
}

impl SnoozeRecord {
    pub fn key(&self) -> DoseKey {
        DoseKey {
            med_id: self.med_id,
            scheduled_at: self.scheduled_at,
        }
    }
}
