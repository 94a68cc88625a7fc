// --- File: crates/meetslot_scheduler/src/logic.rs ---
use crate::policy::{seconds_since_day_start, seconds_since_midnight, PolicyError, SchedulingPolicy};
use chrono::{DateTime, Datelike, Duration, NaiveDate, Timelike, Utc};
use chrono_tz::Tz;
use tracing::debug;

/// A period during which the calendar owner is unavailable.
///
/// Always non-empty: `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusyInterval {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl BusyInterval {
    /// Returns `None` when the interval is empty or inverted.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Option<Self> {
        (start < end).then_some(Self { start, end })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Half-open overlap test against `[start, end)`.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        !(start >= self.end || end <= self.start)
    }
}

/// A bookable candidate meeting time in the policy time zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

/// Slots that share a local calendar date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaySlots {
    pub date: NaiveDate,
    pub slots: Vec<Slot>,
}

/// Computes every free slot between `now + lead_time` and `now + horizon`.
///
/// Candidates start on a grid of `step_minutes` anchored at local midnight,
/// lie entirely inside a workday window and do not overlap any busy interval.
/// The result is sorted by start time with no duplicates.
pub fn compute_available_slots(
    now: DateTime<Utc>,
    busy_intervals: &[BusyInterval],
    policy: &SchedulingPolicy,
) -> Result<Vec<Slot>, PolicyError> {
    policy.validate()?;

    let tz = policy.time_zone;
    let duration = policy.duration();
    let step = policy.step();
    let search_end = (now + policy.horizon()).with_timezone(&tz);
    let end_of_day = policy.end_of_workday_secs();

    let mut cursor = round_up_to_step((now + policy.lead_time()).with_timezone(&tz), step);

    debug!(
        "Searching slots from {} to {} against {} busy intervals",
        cursor,
        search_end,
        busy_intervals.len()
    );

    let mut slots = Vec::new();

    while cursor < search_end {
        let day = cursor.date_naive();

        if !policy.is_workday(cursor.weekday()) {
            cursor = advance_to(cursor, policy.workday_start_on(next_day(day)), step);
            continue;
        }

        if seconds_since_midnight(&cursor) < policy.start_of_workday_secs() {
            cursor = advance_to(cursor, policy.workday_start_on(day), step);
            continue;
        }

        let slot_end = cursor + duration;
        if seconds_since_day_start(day, &slot_end) > end_of_day {
            cursor = cursor + step;
            if cursor.date_naive() == day && seconds_since_midnight(&cursor) >= end_of_day {
                cursor = advance_to(cursor, policy.workday_start_on(next_day(day)), step);
            }
            continue;
        }

        let start_utc = cursor.with_timezone(&Utc);
        let end_utc = slot_end.with_timezone(&Utc);
        if !busy_intervals
            .iter()
            .any(|busy| busy.overlaps(start_utc, end_utc))
        {
            slots.push(Slot {
                start: cursor,
                end: slot_end,
            });
        }

        cursor = cursor + step;
    }

    debug!("Found {} available slots", slots.len());
    Ok(slots)
}

/// Groups sorted slots by the local date of their start.
pub fn group_by_day(slots: &[Slot]) -> Vec<DaySlots> {
    let mut days: Vec<DaySlots> = Vec::new();
    for slot in slots {
        let date = slot.start.date_naive();
        match days.last_mut() {
            Some(current) if current.date == date => current.slots.push(*slot),
            _ => days.push(DaySlots {
                date,
                slots: vec![*slot],
            }),
        }
    }
    days
}

/// Rounds `t` up to the next multiple of `step` counted from local midnight.
///
/// A time already on the grid is returned unchanged. Sub-minute remainders
/// round up.
pub fn round_up_to_step(t: DateTime<Tz>, step: Duration) -> DateTime<Tz> {
    let step_secs = step.num_seconds();
    if step_secs <= 0 {
        return t;
    }

    let secs = seconds_since_midnight(&t);
    let nanos = i64::from(t.nanosecond() % 1_000_000_000);
    let remainder = secs % step_secs;

    if remainder == 0 && nanos == 0 {
        return t;
    }
    t + Duration::seconds(step_secs - remainder) - Duration::nanoseconds(nanos)
}

fn next_day(day: NaiveDate) -> NaiveDate {
    day.succ_opt().unwrap_or(NaiveDate::MAX)
}

// Jumps never move backwards: a zone transition could resolve `target` at or before `cursor`.
fn advance_to(cursor: DateTime<Tz>, target: DateTime<Tz>, step: Duration) -> DateTime<Tz> {
    if target > cursor {
        target
    } else {
        cursor + step
    }
}
