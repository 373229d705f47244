use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use tempfile::TempDir;

use pillbox::{
    Database, DoseAction, DoseKey, Error, MedicationDraft, ReminderController, ReminderSettings,
    SettingsStore, SnoozeRecord, WeekdayMask,
};

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn engine() -> (TempDir, Database, ReminderController) {
    init_logs();
    let dir = tempfile::tempdir().expect("tempdir");
    let db = Database::new(dir.path().join("pillbox.sqlite3")).expect("database");
    let settings =
        Arc::new(SettingsStore::new(dir.path().join("settings.json")).expect("settings"));
    let controller = ReminderController::new(db.clone(), settings);
    (dir, db, controller)
}

fn draft(name: &str, times: &[(u32, u32)], days: WeekdayMask) -> MedicationDraft {
    MedicationDraft {
        name: name.to_string(),
        dose: "500 mg".to_string(),
        times: times
            .iter()
            .map(|&(h, m)| NaiveTime::from_hms_opt(h, m, 0).unwrap())
            .collect(),
        days,
        active: true,
    }
}

fn at(date: NaiveDate, h: u32, m: u32, s: u32) -> NaiveDateTime {
    date.and_time(NaiveTime::from_hms_opt(h, m, s).unwrap())
}

// 2024-03-06 is a Wednesday.
fn wednesday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 6).unwrap()
}

#[tokio::test]
async fn save_assigns_monotonic_ids_and_updates_mutate_in_place() {
    let (_dir, _db, controller) = engine();

    let first = controller
        .save_medication(draft("Vitamin D", &[(8, 0)], WeekdayMask::all()))
        .await
        .unwrap();
    let second = controller
        .save_medication(draft("Aspirin", &[(20, 0)], WeekdayMask::all()))
        .await
        .unwrap();
    assert!(second > first);

    let mut changed = draft("Vitamin D3", &[(8, 0), (12, 0)], WeekdayMask::weekdays());
    changed.dose = "1000 IU".to_string();
    controller.update_medication(first, changed).await.unwrap();

    let loaded = controller.get_medication(first).await.unwrap().unwrap();
    assert_eq!(loaded.id, first);
    assert_eq!(loaded.name, "Vitamin D3");
    assert_eq!(loaded.dose, "1000 IU");
    assert_eq!(loaded.times.len(), 2);
    assert_eq!(loaded.days, WeekdayMask::weekdays());

    let err = controller
        .update_medication(9999, draft("Ghost", &[(8, 0)], WeekdayMask::all()))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::UnknownMedication(9999)));
}

#[tokio::test]
async fn validation_errors_are_surfaced_not_coerced() {
    let (_dir, _db, controller) = engine();

    let err = controller
        .save_medication(draft("   ", &[(8, 0)], WeekdayMask::all()))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::EmptyName));

    let err = controller
        .save_medication(draft("Aspirin", &[], WeekdayMask::all()))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NoDoseTimes));

    assert!(controller.list_medications().await.unwrap().is_empty());
}

#[tokio::test]
async fn deactivated_medication_keeps_history_but_yields_nothing() {
    let (_dir, _db, controller) = engine();
    controller.set_time_override(Some(at(wednesday(), 7, 0, 0)));

    let med_id = controller
        .save_medication(draft("Vitamin D", &[(8, 0)], WeekdayMask::all()))
        .await
        .unwrap();

    assert_eq!(controller.current_week().await.unwrap().len(), 7);

    controller.deactivate_medication(med_id).await.unwrap();

    let meds = controller.list_medications().await.unwrap();
    assert_eq!(meds.len(), 1);
    assert!(!meds[0].active);
    assert!(controller.current_week().await.unwrap().is_empty());
    assert!(controller.due_candidate().await.unwrap().is_none());
}

#[tokio::test]
async fn medications_survive_a_reopen() {
    init_logs();
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("pillbox.sqlite3");

    {
        let db = Database::new(path.clone()).expect("database");
        let settings =
            Arc::new(SettingsStore::new(dir.path().join("settings.json")).expect("settings"));
        let controller = ReminderController::new(db, settings);
        controller
            .save_medication(draft("Vitamin D", &[(8, 0)], WeekdayMask::all()))
            .await
            .unwrap();
    }

    // Reopen: migrations are idempotent and the row is still there.
    let db = Database::new(path).expect("reopen");
    let meds = db.list_medications().await.unwrap();
    assert_eq!(meds.len(), 1);
    assert_eq!(meds[0].name, "Vitamin D");
}

#[tokio::test]
async fn purge_drops_only_records_past_retention() {
    let (_dir, db, controller) = engine();
    let today = wednesday();
    controller.set_time_override(Some(at(today, 9, 0, 0)));
    controller
        .settings()
        .update(ReminderSettings {
            snooze_keep_days: 1,
            ..ReminderSettings::default()
        })
        .unwrap();

    let med_id = controller
        .save_medication(draft("Vitamin D", &[(8, 0)], WeekdayMask::all()))
        .await
        .unwrap();

    let stale_day = today - Duration::days(3);
    db.append_snooze(&SnoozeRecord {
        id: None,
        med_id,
        scheduled_at: at(stale_day, 8, 0, 0),
        snoozed_until: at(stale_day, 8, 30, 0),
    })
    .await
    .unwrap();
    db.append_snooze(&SnoozeRecord {
        id: None,
        med_id,
        scheduled_at: at(today, 8, 0, 0),
        snoozed_until: at(today, 8, 30, 0),
    })
    .await
    .unwrap();

    let removed = controller.purge_snoozes().await.unwrap();
    assert_eq!(removed, 1);

    let remaining = db.list_snoozes().await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].snoozed_until.date(), today);

    // A second pass has nothing left to drop.
    assert_eq!(controller.purge_snoozes().await.unwrap(), 0);
}

#[tokio::test]
async fn malformed_rows_are_skipped_without_poisoning_the_load() {
    let (_dir, db, controller) = engine();
    controller.set_time_override(Some(at(wednesday(), 8, 0, 30)));

    controller
        .save_medication(draft("Vitamin D", &[(8, 0)], WeekdayMask::all()))
        .await
        .unwrap();

    // Write garbage rows behind the repository's back.
    let raw = rusqlite::Connection::open(db.path()).unwrap();
    raw.execute(
        "INSERT INTO medications (name, dose, times, days_mask, active, created_at, updated_at)
         VALUES ('Broken', '1', '08:00', 'notamask', 1, 'nonsense', 'nonsense')",
        [],
    )
    .unwrap();
    raw.execute(
        "INSERT INTO dose_log (med_id, scheduled_at, action, actual_at)
         VALUES (1, '2024-03-06 08:00:00', 'devoured', '2024-03-06 08:00:10')",
        [],
    )
    .unwrap();
    raw.execute(
        "INSERT INTO snoozes (med_id, scheduled_at, snoozed_until)
         VALUES (1, 'garbage', 'garbage')",
        [],
    )
    .unwrap();

    let meds = controller.list_medications().await.unwrap();
    assert_eq!(meds.len(), 1);
    assert_eq!(meds[0].name, "Vitamin D");

    assert!(db.list_log_entries().await.unwrap().is_empty());
    assert!(db.list_snoozes().await.unwrap().is_empty());

    // The scheduler still works over the surviving rows.
    assert!(controller.due_candidate().await.unwrap().is_some());
}

#[tokio::test]
async fn action_counts_aggregate_the_trailing_week() {
    let (_dir, _db, controller) = engine();
    let today = wednesday();
    controller.set_time_override(Some(at(today, 8, 0, 30)));

    let med_id = controller
        .save_medication(draft("Vitamin D", &[(8, 0), (12, 0), (20, 0)], WeekdayMask::all()))
        .await
        .unwrap();

    let key = |h| DoseKey {
        med_id,
        scheduled_at: at(today, h, 0, 0),
    };
    controller
        .take_action(key(8), DoseAction::Snoozed, Some(10))
        .await
        .unwrap();
    controller
        .take_action(key(12), DoseAction::Skipped, None)
        .await
        .unwrap();
    controller
        .take_action(key(20), DoseAction::Taken, None)
        .await
        .unwrap();

    let counts = controller.action_counts(7).await.unwrap();
    assert_eq!(counts.taken, 1);
    assert_eq!(counts.skipped, 1);
    assert_eq!(counts.snoozed, 1);
}
