use chrono::NaiveDateTime;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures the engine reports to its host.
///
/// Validation and ordering problems are rejected at the boundary where they
/// occur; storage failures wrap the underlying error and are treated as
/// transient by the reminder loop (the tick is skipped, the next one
/// re-evaluates fresh state).
#[derive(Debug, Error)]
pub enum Error {
    #[error("medication name must not be empty")]
    EmptyName,

    #[error("medication needs at least one dose time")]
    NoDoseTimes,

    #[error("snooze until {until} is not after the scheduled time {scheduled}")]
    SnoozeOrdering {
        scheduled: NaiveDateTime,
        until: NaiveDateTime,
    },

    #[error("snooze action requires a duration in minutes")]
    MissingSnoozeMinutes,

    #[error("unknown medication id {0}")]
    UnknownMedication(i64),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}
