use std::sync::Arc;

use chrono::NaiveDateTime;
use log::{error, info};
use tokio::sync::broadcast;
use tokio::time::{Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::db::Database;
use crate::error::Result;
use crate::ledger::SnoozeLedger;
use crate::logbook::DoseLog;
use crate::models::Occurrence;
use crate::schedule::{build_week, week_start_for, ScheduleConfig};
use crate::settings::SettingsStore;

use super::detector::due_candidate;
use super::{Clock, ReminderEvent};

/// Periodic due scan. One tick at a time: the tick body is awaited to
/// completion before the next interval fires or cancellation is honored,
/// so no occurrence is ever partially logged on shutdown.
pub(crate) async fn reminder_loop(
    db: Database,
    settings: Arc<SettingsStore>,
    events: broadcast::Sender<ReminderEvent>,
    clock: Clock,
    cancel_token: CancellationToken,
) {
    let poll_secs = settings.current().poll_interval_secs.max(1);
    let mut ticker = tokio::time::interval(Duration::from_secs(poll_secs));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let now = clock.now();
                let config = settings.current().schedule_config();

                match scan_once(&db, &config, now).await {
                    Ok(Some(occurrence)) => {
                        let _ = events.send(ReminderEvent::DoseDue { occurrence });
                    }
                    Ok(None) => {}
                    Err(err) => {
                        // Transient: skip this tick's effects, re-evaluate
                        // fresh state on the next one.
                        error!("reminder tick failed: {err:#}");
                        let _ = events.send(ReminderEvent::StorageNotice {
                            message: err.to_string(),
                        });
                    }
                }

                let _ = events.send(ReminderEvent::ScheduleRefreshed);
            }
            _ = cancel_token.cancelled() => {
                info!("reminder loop shutting down");
                break;
            }
        }
    }
}

/// One due scan over fresh state: load everything, build the week, pick at
/// most one unresolved occurrence inside the due window.
pub(crate) async fn scan_once(
    db: &Database,
    config: &ScheduleConfig,
    now: NaiveDateTime,
) -> Result<Option<Occurrence>> {
    let meds = db.list_medications().await?;
    let snoozes = db.list_snoozes().await?;
    let entries = db.list_log_entries().await?;

    let ledger = SnoozeLedger::new(snoozes);
    let log = DoseLog::new(entries);

    let today = now.date();
    let week = build_week(&meds, &ledger, week_start_for(today), today);

    Ok(due_candidate(&week, &log, now, config).cloned())
}
