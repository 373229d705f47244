use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::RwLock};

use crate::schedule::ScheduleConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReminderSettings {
    /// Seconds between reminder loop ticks.
    pub poll_interval_secs: u64,
    /// Tolerance around an effective timestamp for due detection.
    pub due_window_secs: i64,
    /// Minutes the host preselects in its snooze picker.
    pub default_snooze_minutes: i64,
    /// Snooze records older than this many days are dropped by the
    /// retention pass.
    pub snooze_keep_days: i64,
    /// Whether a snoozed slot raises a second popup at its relocated time.
    pub renotify_snoozed: bool,
}

impl Default for ReminderSettings {
    fn default() -> Self {
        Self {
            poll_interval_secs: 10,
            due_window_secs: 60,
            default_snooze_minutes: 10,
            snooze_keep_days: 2,
            renotify_snoozed: false,
        }
    }
}

impl ReminderSettings {
    pub fn schedule_config(&self) -> ScheduleConfig {
        ScheduleConfig {
            due_window_secs: self.due_window_secs,
            renotify_snoozed: self.renotify_snoozed,
        }
    }
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<ReminderSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_default()
        } else {
            ReminderSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn current(&self) -> ReminderSettings {
        self.data.read().unwrap().clone()
    }

    pub fn update(&self, settings: ReminderSettings) -> Result<()> {
        {
            let mut guard = self.data.write().unwrap();
            *guard = settings;
            self.persist(&guard)?;
        }
        Ok(())
    }

    fn persist(&self, data: &ReminderSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_reference_behavior() {
        let settings = ReminderSettings::default();
        assert_eq!(settings.poll_interval_secs, 10);
        assert_eq!(settings.due_window_secs, 60);
        assert_eq!(settings.default_snooze_minutes, 10);
        assert_eq!(settings.snooze_keep_days, 2);
        assert!(!settings.renotify_snoozed);
    }
}
