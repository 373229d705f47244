pub mod log_entry;
pub mod medication;
pub mod occurrence;
pub mod snooze;

pub use log_entry::{DoseAction, LogEntry};
pub use medication::{Medication, MedicationDraft, WeekdayMask, DAY_NAMES};
pub use occurrence::{DayPart, DoseKey, Occurrence};
pub use snooze::SnoozeRecord;
