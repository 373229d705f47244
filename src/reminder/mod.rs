pub mod controller;
pub mod detector;
mod loop_worker;

use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use std::sync::{Arc, RwLock};

use crate::models::Occurrence;

pub use controller::ReminderController;
pub use detector::due_candidate;

/// Notifications pushed to the host shell.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum ReminderEvent {
    /// Exactly one unresolved occurrence entered the due window this tick.
    DoseDue { occurrence: Occurrence },
    /// A tick finished; the grid should repaint even when nothing is due.
    ScheduleRefreshed,
    /// A tick failed on storage; transient, the next tick retries fresh.
    StorageNotice { message: String },
}

/// Wall clock with an optional override, used by the host's test panel to
/// pin "now" to an arbitrary day and time.
#[derive(Clone, Default)]
pub(crate) struct Clock {
    override_at: Arc<RwLock<Option<NaiveDateTime>>>,
}

impl Clock {
    pub fn now(&self) -> NaiveDateTime {
        self.override_at
            .read()
            .unwrap()
            .unwrap_or_else(|| Local::now().naive_local())
    }

    pub fn set_override(&self, at: Option<NaiveDateTime>) {
        *self.override_at.write().unwrap() = at;
    }
}
