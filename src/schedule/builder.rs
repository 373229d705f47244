use chrono::{Datelike, Duration, NaiveDate};

use crate::ledger::SnoozeLedger;
use crate::models::{DoseKey, Medication, Occurrence};

use super::calendar::expand_range;

/// Monday of the week containing `date`.
pub fn week_start_for(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// Builds the authoritative occurrence list for one week.
///
/// Inactive medications contribute nothing: not shown, not logged, not
/// reminded. Snooze overrides relocate today's entries only; every
/// occurrence keeps its original scheduled instant as the log key next to
/// the effective instant used for display and due detection.
pub fn build_week(
    meds: &[Medication],
    ledger: &SnoozeLedger,
    week_start: NaiveDate,
    today: NaiveDate,
) -> Vec<Occurrence> {
    let overrides = ledger.effective_for_today(today);
    let week_end = week_start + Duration::days(6);

    let mut out = Vec::new();
    for med in meds.iter().filter(|m| m.active) {
        for scheduled_at in expand_range(med, week_start, week_end) {
            let mut effective_at = scheduled_at;
            if scheduled_at.date() == today {
                let key = DoseKey {
                    med_id: med.id,
                    scheduled_at,
                };
                if let Some(&until) = overrides.get(&key) {
                    effective_at = until;
                }
            }
            out.push(Occurrence {
                med_id: med.id,
                med_name: med.name.clone(),
                dose: med.dose.clone(),
                scheduled_at,
                effective_at,
            });
        }
    }

    out.sort_by(|a, b| {
        a.effective_at
            .cmp(&b.effective_at)
            .then(a.med_id.cmp(&b.med_id))
    });
    out
}
