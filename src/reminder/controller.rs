use std::sync::Arc;

use anyhow::Context;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use log::info;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::db::Database;
use crate::error::{Error, Result};
use crate::ledger::SnoozeLedger;
use crate::logbook::{ActionCounts, DoseLog};
use crate::models::{DoseAction, DoseKey, LogEntry, Medication, MedicationDraft, Occurrence};
use crate::schedule::{self, DoseStatus};
use crate::settings::SettingsStore;

use super::loop_worker::{reminder_loop, scan_once};
use super::{Clock, ReminderEvent};

/// Facade the host shell talks to: medication CRUD, week building, due
/// checks, user actions, and the reminder loop's lifecycle.
///
/// All writes funnel through the single database worker thread, so a tick
/// and a user action can never interleave their storage effects.
#[derive(Clone)]
pub struct ReminderController {
    db: Database,
    settings: Arc<SettingsStore>,
    events: broadcast::Sender<ReminderEvent>,
    worker: Arc<Mutex<Option<(CancellationToken, JoinHandle<()>)>>>,
    clock: Clock,
}

impl ReminderController {
    pub fn new(db: Database, settings: Arc<SettingsStore>) -> Self {
        let (events, _) = broadcast::channel(32);
        Self {
            db,
            settings,
            events,
            worker: Arc::new(Mutex::new(None)),
            clock: Clock::default(),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ReminderEvent> {
        self.events.subscribe()
    }

    pub fn settings(&self) -> Arc<SettingsStore> {
        self.settings.clone()
    }

    /// Current wall-clock instant, honoring any test override.
    pub fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }

    /// Pins "now" for the host's test panel; `None` returns to real time.
    pub fn set_time_override(&self, at: Option<NaiveDateTime>) {
        self.clock.set_override(at);
    }

    /// Spawns the reminder loop after a snooze retention pass. Idempotent:
    /// a second start while running is a no-op.
    pub async fn start(&self) -> Result<()> {
        let mut guard = self.worker.lock().await;
        if guard.is_some() {
            return Ok(());
        }

        let removed = self.purge_snoozes().await?;
        if removed > 0 {
            info!("dropped {removed} stale snooze record(s) at startup");
        }

        let cancel_token = CancellationToken::new();
        let handle = tokio::spawn(reminder_loop(
            self.db.clone(),
            self.settings.clone(),
            self.events.clone(),
            self.clock.clone(),
            cancel_token.clone(),
        ));

        *guard = Some((cancel_token, handle));
        Ok(())
    }

    /// Cancels the loop and waits for any in-flight tick to finish.
    pub async fn stop(&self) -> Result<()> {
        let worker = self.worker.lock().await.take();
        if let Some((cancel_token, handle)) = worker {
            cancel_token.cancel();
            handle
                .await
                .context("reminder loop task failed to join")?;
        }
        Ok(())
    }

    pub async fn save_medication(&self, draft: MedicationDraft) -> Result<i64> {
        draft.validate()?;
        let draft = draft.normalized();
        let med_id = self.db.insert_medication(&draft, self.clock.now()).await?;
        info!("saved medication '{}' (id={med_id})", draft.name);
        Ok(med_id)
    }

    pub async fn update_medication(&self, med_id: i64, draft: MedicationDraft) -> Result<()> {
        draft.validate()?;
        let draft = draft.normalized();
        let changed = self
            .db
            .update_medication(med_id, &draft, self.clock.now())
            .await?;
        if changed == 0 {
            return Err(Error::UnknownMedication(med_id));
        }
        Ok(())
    }

    /// Soft delete: the medication stops producing occurrences but its
    /// history stays intact.
    pub async fn deactivate_medication(&self, med_id: i64) -> Result<()> {
        let changed = self
            .db
            .set_medication_active(med_id, false, self.clock.now())
            .await?;
        if changed == 0 {
            return Err(Error::UnknownMedication(med_id));
        }
        Ok(())
    }

    pub async fn list_medications(&self) -> Result<Vec<Medication>> {
        Ok(self.db.list_medications().await?)
    }

    pub async fn get_medication(&self, med_id: i64) -> Result<Option<Medication>> {
        Ok(self.db.get_medication(med_id).await?)
    }

    /// Occurrence list for the week starting at `week_start` (a Monday),
    /// snooze overrides applied to today's entries.
    pub async fn build_week(&self, week_start: NaiveDate) -> Result<Vec<Occurrence>> {
        let meds = self.db.list_medications().await?;
        let ledger = SnoozeLedger::new(self.db.list_snoozes().await?);
        Ok(schedule::build_week(
            &meds,
            &ledger,
            week_start,
            self.clock.now().date(),
        ))
    }

    /// Convenience for the default grid view.
    pub async fn current_week(&self) -> Result<Vec<Occurrence>> {
        let today = self.clock.now().date();
        self.build_week(schedule::week_start_for(today)).await
    }

    pub async fn classify(&self, occ: &Occurrence) -> Result<DoseStatus> {
        let log = DoseLog::new(self.db.list_log_entries().await?);
        let config = self.settings.current().schedule_config();
        Ok(schedule::classify(occ, &log, self.clock.now(), &config))
    }

    /// Statuses for a whole built week in one log load, index-aligned with
    /// the input.
    pub async fn week_statuses(&self, week: &[Occurrence]) -> Result<Vec<DoseStatus>> {
        let log = DoseLog::new(self.db.list_log_entries().await?);
        let config = self.settings.current().schedule_config();
        let now = self.clock.now();
        Ok(week
            .iter()
            .map(|occ| schedule::classify(occ, &log, now, &config))
            .collect())
    }

    /// One-shot due check for a manual refresh, outside the timer.
    pub async fn due_candidate(&self) -> Result<Option<Occurrence>> {
        let config = self.settings.current().schedule_config();
        scan_once(&self.db, &config, self.clock.now()).await
    }

    /// Records the user's decision for a dose slot. Snoozing writes the
    /// ledger override first, then resolves the original key in the log so
    /// the slot cannot raise a duplicate popup.
    pub async fn take_action(
        &self,
        key: DoseKey,
        action: DoseAction,
        snooze_minutes: Option<i64>,
    ) -> Result<()> {
        let now = self.clock.now();

        if action == DoseAction::Snoozed {
            let minutes = snooze_minutes.ok_or(Error::MissingSnoozeMinutes)?;
            let snoozed_until = now + Duration::minutes(minutes);
            let mut ledger = SnoozeLedger::new(self.db.list_snoozes().await?);
            let record = ledger.record(key.med_id, key.scheduled_at, snoozed_until)?;
            self.db.append_snooze(&record).await?;
        }

        let entry = LogEntry {
            id: None,
            med_id: key.med_id,
            scheduled_at: key.scheduled_at,
            action,
            actual_at: now,
        };
        self.db.append_log_entry(&entry).await?;
        Ok(())
    }

    /// Action totals over the trailing `days` days, for the summary view.
    pub async fn action_counts(&self, days: i64) -> Result<ActionCounts> {
        let log = DoseLog::new(self.db.list_log_entries().await?);
        Ok(log.counts_in_window(self.clock.now(), days))
    }

    /// Drops snooze records older than the configured retention and returns
    /// how many were removed. Purging never changes what
    /// `effective_for_today` answers, only storage growth.
    pub async fn purge_snoozes(&self) -> Result<usize> {
        let keep_days = self.settings.current().snooze_keep_days;
        let ledger = SnoozeLedger::new(self.db.list_snoozes().await?);
        let retained = ledger.retained_after_purge(self.clock.now().date(), keep_days);
        let removed = ledger.records().len() - retained.len();
        if removed > 0 {
            self.db.rewrite_snoozes(retained).await?;
        }
        Ok(removed)
    }
}
