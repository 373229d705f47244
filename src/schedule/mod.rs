pub mod builder;
pub mod calendar;
pub mod config;
pub mod status;

pub use builder::{build_week, week_start_for};
pub use calendar::{expand_range, CalendarExpansion};
pub use config::ScheduleConfig;
pub use status::{classify, within_due_window, DoseStatus};
