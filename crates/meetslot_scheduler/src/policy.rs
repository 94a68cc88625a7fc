// --- File: crates/meetslot_scheduler/src/policy.rs ---
//! Business-hour policy used by the availability calculator.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike, Weekday};
use chrono_tz::Tz;
use meetslot_config::SchedulingConfig;
use thiserror::Error;

const SECONDS_PER_HOUR: i64 = 3600;
const SECONDS_PER_DAY: i64 = 86_400;
const MINUTES_PER_DAY: i64 = 1440;
/// Longest search horizon accepted, in days.
pub const MAX_HORIZON_DAYS: i64 = 366;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolicyError {
    #[error("Meeting duration must be positive, got {0} minutes")]
    NonPositiveDuration(i64),
    #[error("Step must be positive, got {0} minutes")]
    NonPositiveStep(i64),
    #[error("Step of {0} minutes is longer than a day")]
    StepTooLarge(i64),
    #[error("Workday start hour {start} must be before end hour {end}")]
    InvalidWorkdayHours { start: u32, end: u32 },
    #[error("Workday end hour {0} is past midnight")]
    EndHourOutOfRange(u32),
    #[error("Meeting duration of {duration} minutes does not fit a {span} minute workday")]
    DurationExceedsWorkday { duration: i64, span: i64 },
    #[error("No workdays configured")]
    NoWorkdays,
    #[error("Search horizon must be at least one day, got {0}")]
    NonPositiveHorizon(i64),
    #[error("Search horizon of {0} days exceeds the {max} day limit", max = MAX_HORIZON_DAYS)]
    HorizonTooLong(i64),
    #[error("Lead time must not be negative, got {0} minutes")]
    NegativeLeadTime(i64),
    #[error("Lead time of {lead} minutes exceeds the {max} minute search horizon")]
    LeadTimeTooLong { lead: i64, max: i64 },
    #[error("Unknown weekday: {0}")]
    UnknownWeekday(String),
    #[error("Unknown time zone: {0}")]
    UnknownTimeZone(String),
}

/// When and how meetings may be booked.
///
/// Build it with [`SchedulingPolicy::try_from`] from config, or fill the
/// fields directly and call [`SchedulingPolicy::validate`].
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulingPolicy {
    pub duration_minutes: i64,
    pub step_minutes: i64,
    pub workday_start_hour: u32,
    /// Meetings must end at or before this hour. 24 means midnight.
    pub workday_end_hour: u32,
    pub workdays: Vec<Weekday>,
    pub horizon_days: i64,
    pub time_zone: Tz,
    /// Minimum notice between "now" and the first bookable slot.
    pub lead_time_minutes: i64,
}

impl Default for SchedulingPolicy {
    fn default() -> Self {
        Self {
            duration_minutes: 60,
            step_minutes: 30,
            workday_start_hour: 10,
            workday_end_hour: 19,
            workdays: vec![
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
            ],
            horizon_days: 7,
            time_zone: chrono_tz::Asia::Tokyo,
            lead_time_minutes: 60,
        }
    }
}

impl SchedulingPolicy {
    /// Checks the policy invariants.
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.duration_minutes <= 0 {
            return Err(PolicyError::NonPositiveDuration(self.duration_minutes));
        }
        if self.step_minutes <= 0 {
            return Err(PolicyError::NonPositiveStep(self.step_minutes));
        }
        if self.step_minutes > MINUTES_PER_DAY {
            return Err(PolicyError::StepTooLarge(self.step_minutes));
        }
        if self.workday_end_hour > 24 {
            return Err(PolicyError::EndHourOutOfRange(self.workday_end_hour));
        }
        if self.workday_start_hour >= self.workday_end_hour {
            return Err(PolicyError::InvalidWorkdayHours {
                start: self.workday_start_hour,
                end: self.workday_end_hour,
            });
        }
        let span = i64::from(self.workday_end_hour - self.workday_start_hour) * 60;
        if self.duration_minutes > span {
            return Err(PolicyError::DurationExceedsWorkday {
                duration: self.duration_minutes,
                span,
            });
        }
        if self.workdays.is_empty() {
            return Err(PolicyError::NoWorkdays);
        }
        if self.horizon_days < 1 {
            return Err(PolicyError::NonPositiveHorizon(self.horizon_days));
        }
        if self.horizon_days > MAX_HORIZON_DAYS {
            return Err(PolicyError::HorizonTooLong(self.horizon_days));
        }
        if self.lead_time_minutes < 0 {
            return Err(PolicyError::NegativeLeadTime(self.lead_time_minutes));
        }
        // Horizon is bounded above, so this cannot overflow
        let max_lead = self.horizon_days * MINUTES_PER_DAY;
        if self.lead_time_minutes > max_lead {
            return Err(PolicyError::LeadTimeTooLong {
                lead: self.lead_time_minutes,
                max: max_lead,
            });
        }
        Ok(())
    }

    pub fn duration(&self) -> Duration {
        Duration::minutes(self.duration_minutes)
    }

    pub fn step(&self) -> Duration {
        Duration::minutes(self.step_minutes)
    }

    pub fn lead_time(&self) -> Duration {
        Duration::minutes(self.lead_time_minutes)
    }

    pub fn horizon(&self) -> Duration {
        Duration::days(self.horizon_days)
    }

    pub fn is_workday(&self, day: Weekday) -> bool {
        self.workdays.contains(&day)
    }

    pub(crate) fn start_of_workday_secs(&self) -> i64 {
        i64::from(self.workday_start_hour) * SECONDS_PER_HOUR
    }

    pub(crate) fn end_of_workday_secs(&self) -> i64 {
        i64::from(self.workday_end_hour) * SECONDS_PER_HOUR
    }

    /// `workday_start_hour:00` on `date` in the policy time zone.
    pub fn workday_start_on(&self, date: NaiveDate) -> DateTime<Tz> {
        let time = NaiveTime::from_hms_opt(self.workday_start_hour, 0, 0).unwrap_or(NaiveTime::MIN);
        local_datetime(&self.time_zone, date.and_time(time))
    }

    /// Whether a meeting starting at `start` lies entirely inside a workday window.
    ///
    /// Busy intervals and the search horizon are not considered here.
    pub fn admits(&self, start: DateTime<Tz>) -> bool {
        let start = start.with_timezone(&self.time_zone);
        let end = start + self.duration();
        let day = start.date_naive();

        self.is_workday(start.weekday())
            && seconds_since_midnight(&start) >= self.start_of_workday_secs()
            && seconds_since_day_start(day, &end) <= self.end_of_workday_secs()
    }
}

impl TryFrom<&SchedulingConfig> for SchedulingPolicy {
    type Error = PolicyError;

    fn try_from(config: &SchedulingConfig) -> Result<Self, Self::Error> {
        let mut workdays = Vec::with_capacity(config.workdays.len());
        for name in &config.workdays {
            let day = name
                .trim()
                .parse::<Weekday>()
                .map_err(|_| PolicyError::UnknownWeekday(name.clone()))?;
            if !workdays.contains(&day) {
                workdays.push(day);
            }
        }

        let time_zone = config
            .time_zone
            .parse::<Tz>()
            .map_err(|_| PolicyError::UnknownTimeZone(config.time_zone.clone()))?;

        let policy = SchedulingPolicy {
            duration_minutes: config.duration_minutes,
            step_minutes: config.step_minutes,
            workday_start_hour: config.workday_start_hour,
            workday_end_hour: config.workday_end_hour,
            workdays,
            horizon_days: config.horizon_days,
            time_zone,
            lead_time_minutes: config.lead_time_minutes,
        };
        policy.validate()?;
        Ok(policy)
    }
}

/// Resolves a wall-clock time to an instant.
///
/// Ambiguous times (clocks going back) take the earlier instant. Times inside
/// a DST gap move forward to the first hour that exists.
pub(crate) fn local_datetime(tz: &Tz, naive: NaiveDateTime) -> DateTime<Tz> {
    (0..=2)
        .map(|h| naive + Duration::hours(h))
        .find_map(|candidate| tz.from_local_datetime(&candidate).earliest())
        .unwrap_or_else(|| tz.from_utc_datetime(&naive))
}

pub(crate) fn seconds_since_midnight(t: &DateTime<Tz>) -> i64 {
    i64::from(t.num_seconds_from_midnight())
}

/// Seconds between local midnight of `day` and `t`; exceeds one day when `t` is on a later date.
pub(crate) fn seconds_since_day_start(day: NaiveDate, t: &DateTime<Tz>) -> i64 {
    (t.date_naive() - day).num_days() * SECONDS_PER_DAY + seconds_since_midnight(t)
}
