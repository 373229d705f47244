pub mod db;
pub mod error;
pub mod ledger;
pub mod logbook;
pub mod models;
pub mod reminder;
pub mod schedule;
pub mod settings;

pub use db::Database;
pub use error::{Error, Result};
pub use ledger::SnoozeLedger;
pub use logbook::{ActionCounts, DoseLog};
pub use models::{
    DayPart, DoseAction, DoseKey, LogEntry, Medication, MedicationDraft, Occurrence, SnoozeRecord,
    WeekdayMask,
};
pub use reminder::{due_candidate, ReminderController, ReminderEvent};
pub use schedule::{
    build_week, classify, expand_range, week_start_for, within_due_window, CalendarExpansion,
    DoseStatus, ScheduleConfig,
};
pub use settings::{ReminderSettings, SettingsStore};
