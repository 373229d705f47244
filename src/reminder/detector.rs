use chrono::NaiveDateTime;

use crate::logbook::DoseLog;
use crate::models::{DoseAction, Occurrence};
use crate::schedule::{within_due_window, ScheduleConfig};

/// Picks the single occurrence to surface right now, if any.
///
/// Candidates are today's occurrences inside the due window that are not
/// yet resolved in the log. Earliest effective timestamp wins; medication
/// id breaks remaining ties. At most one occurrence is ever returned per
/// scan.
pub fn due_candidate<'a>(
    week: &'a [Occurrence],
    log: &DoseLog,
    now: NaiveDateTime,
    config: &ScheduleConfig,
) -> Option<&'a Occurrence> {
    let today = now.date();
    week.iter()
        .filter(|occ| occ.scheduled_at.date() == today)
        .filter(|occ| within_due_window(now, occ.effective_at, config.due_window_secs))
        .filter(|occ| !is_blocked(occ, log, config))
        .min_by(|a, b| {
            a.effective_at
                .cmp(&b.effective_at)
                .then(a.med_id.cmp(&b.med_id))
        })
}

/// A logged action blocks re-surfacing, with one policy exception: when
/// re-notification is enabled, a slot whose only resolution is `snoozed`
/// and which still carries a live relocation stays eligible at its new
/// time.
fn is_blocked(occ: &Occurrence, log: &DoseLog, config: &ScheduleConfig) -> bool {
    match log.latest_action(occ.key()) {
        None => false,
        Some(DoseAction::Snoozed) if config.renotify_snoozed && occ.is_relocated() => false,
        Some(_) => true,
    }
}
