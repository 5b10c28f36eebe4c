//! Recurrence expansion for calendar events.

use crate::types::{CalendarEvent, Frequency, Occurrence, Recurrence};
use chrono::{DateTime, Datelike, Duration, Months, Utc};

/// Upper bound on occurrences walked for a single event.
pub const MAX_OCCURRENCES: usize = 10_000;

/// Start of the `n`-th occurrence (0 = the event itself).
///
/// Computed from the original start rather than the previous occurrence so
/// that month-end clamping does not drift (Jan 31 -> Feb 29 -> Mar 31).
fn nth_start(start: DateTime<Utc>, rule: &Recurrence, n: u32) -> Option<DateTime<Utc>> {
    let steps = n.checked_mul(rule.interval.max(1))?;
    match rule.frequency {
        Frequency::Daily => start.checked_add_signed(Duration::days(i64::from(steps))),
        Frequency::Weekly => start.checked_add_signed(Duration::weeks(i64::from(steps))),
        Frequency::Monthly => start.checked_add_months(Months::new(steps)),
    }
}

fn is_exception(rule: &Recurrence, at: DateTime<Utc>) -> bool {
    let day = at.date_naive();
    rule.exceptions.iter().any(|ex| ex.date_naive() == day)
}

/// Index of the first step whose occurrence could still end after `from`.
///
/// Rounded down, so the walk may begin one period early; callers filter.
fn first_step(
    start: DateTime<Utc>,
    duration: Duration,
    rule: &Recurrence,
    from: DateTime<Utc>,
) -> u32 {
    let anchor = from - duration;
    if anchor <= start {
        return 0;
    }
    let elapsed = anchor - start;
    let periods = match rule.frequency {
        Frequency::Daily => elapsed.num_days(),
        Frequency::Weekly => elapsed.num_weeks(),
        Frequency::Monthly => {
            let months = |at: DateTime<Utc>| i64::from(at.year()) * 12 + i64::from(at.month0());
            (months(anchor) - months(start) - 1).max(0)
        }
    };
    u32::try_from(periods / i64::from(rule.interval.max(1))).unwrap_or(u32::MAX)
}

/// Iterate over the occurrences of `event` in start order, beginning near
/// `from`. At most `MAX_OCCURRENCES` steps are walked past that point.
fn walk(event: &CalendarEvent, from: DateTime<Utc>) -> impl Iterator<Item = Occurrence> + '_ {
    let duration = event.end - event.start;
    let rule = event.recurrence.as_ref();
    let first = rule.map_or(0, |r| first_step(event.start, duration, r, from));
    let mut n: u32 = first;
    let mut done = false;

    std::iter::from_fn(move || {
        loop {
            if done || (n - first) as usize >= MAX_OCCURRENCES {
                return None;
            }
            let Some(rule) = rule else {
                done = true;
                return Some(Occurrence {
                    start: event.start,
                    end: event.end,
                });
            };
            let start = nth_start(event.start, rule, n)?;
            n = n.checked_add(1)?;
            if let Some(until) = rule.until
                && start > until
            {
                done = true;
                return None;
            }
            if is_exception(rule, start) {
                continue;
            }
            return Some(Occurrence {
                start,
                end: start + duration,
            });
        }
    })
}

/// Expand `event` into the occurrences overlapping `[from, to)`.
pub fn occurrences(
    event: &CalendarEvent,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Vec<Occurrence> {
    walk(event, from)
        .take_while(|occ| occ.start < to)
        .filter(|occ| occ.end > from)
        .collect()
}

/// Whether any occurrence of `event` overlaps `[from, to)`.
pub fn occurs_within(event: &CalendarEvent, from: DateTime<Utc>, to: DateTime<Utc>) -> bool {
    walk(event, from)
        .take_while(|occ| occ.start < to)
        .any(|occ| occ.end > from)
}
