use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::models::{Medication, WeekdayMask};

/// Expands a medication's recurring definition over an inclusive date range.
///
/// The result walks every date in the range whose weekday is marked active,
/// crossed with every configured dose time. A mask with no active days
/// yields an empty sequence: the medication is dormant, not an error.
pub fn expand_range(med: &Medication, start: NaiveDate, end: NaiveDate) -> CalendarExpansion {
    CalendarExpansion {
        times: med.times.clone(),
        days: med.days,
        cursor: Some(start),
        end,
        time_idx: 0,
    }
}

/// Lazy, finite walk over (date x time-of-day) instants. Iteration consumes
/// the walk; clone it first to keep a restartable copy.
#[derive(Debug, Clone)]
pub struct CalendarExpansion {
    times: Vec<NaiveTime>,
    days: WeekdayMask,
    cursor: Option<NaiveDate>,
    end: NaiveDate,
    time_idx: usize,
}

impl Iterator for CalendarExpansion {
    type Item = NaiveDateTime;

    fn next(&mut self) -> Option<NaiveDateTime> {
        loop {
            let date = self.cursor?;
            if date > self.end {
                self.cursor = None;
                return None;
            }
            if self.days.is_active_on(date) && self.time_idx < self.times.len() {
                let instant = date.and_time(self.times[self.time_idx]);
                self.time_idx += 1;
                return Some(instant);
            }
            self.cursor = date.succ_opt();
            self.time_idx = 0;
        }
    }
}
