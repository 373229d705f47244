/// Tunable thresholds for due detection and status classification.
#[derive(Debug, Clone)]
pub struct ScheduleConfig {
    /// Tolerance around the effective timestamp within which a dose counts
    /// as due. Inclusive at the boundary.
    pub due_window_secs: i64,

    /// Whether a snoozed slot may raise a second popup at its relocated
    /// time. Off by default: snoozing resolves the original key immediately
    /// and the new time is a display relocation only.
    pub renotify_snoozed: bool,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            due_window_secs: 60,
            renotify_snoozed: false,
        }
    }
}
