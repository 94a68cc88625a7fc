// --- File: crates/meetslot_scheduler/src/logic_test.rs ---
#[cfg(test)]
mod tests {
    use crate::logic::{compute_available_slots, group_by_day, round_up_to_step, BusyInterval, Slot};
    use crate::policy::{PolicyError, SchedulingPolicy};
    use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc, Weekday};
    use chrono_tz::{Asia::Tokyo, Tz};

    // 2025-05-05 is a Monday.
    fn tokyo(month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Tz> {
        Tokyo.with_ymd_and_hms(2025, month, day, hour, minute, 0).unwrap()
    }

    fn now_at(month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        tokyo(month, day, hour, minute).with_timezone(&Utc)
    }

    fn busy(start: DateTime<Tz>, end: DateTime<Tz>) -> BusyInterval {
        BusyInterval::new(start.with_timezone(&Utc), end.with_timezone(&Utc)).unwrap()
    }

    fn starts(slots: &[Slot]) -> Vec<DateTime<Tz>> {
        slots.iter().map(|s| s.start).collect()
    }

    #[test]
    fn test_busy_hour_is_skipped_after_lead_time() {
        let policy = SchedulingPolicy::default();
        let busy = vec![busy(tokyo(5, 5, 10, 0), tokyo(5, 5, 11, 0))];

        let slots = compute_available_slots(now_at(5, 5, 9, 5), &busy, &policy).unwrap();

        assert_eq!(
            starts(&slots[..3]),
            vec![tokyo(5, 5, 11, 0), tokyo(5, 5, 11, 30), tokyo(5, 5, 12, 0)]
        );
    }

    #[test]
    fn test_fully_booked_day_moves_to_next_workday() {
        let policy = SchedulingPolicy::default();
        let busy = vec![busy(tokyo(5, 5, 10, 0), tokyo(5, 5, 19, 0))];

        let slots = compute_available_slots(now_at(5, 5, 8, 0), &busy, &policy).unwrap();

        assert!(slots.iter().all(|s| s.start.date_naive() != tokyo(5, 5, 0, 0).date_naive()));
        assert_eq!(slots[0].start, tokyo(5, 6, 10, 0));
    }

    #[test]
    fn test_aligned_search_start_is_not_pushed_back() {
        let policy = SchedulingPolicy::default();
        // 09:00 + 60 minutes lead lands exactly on 10:00
        let slots = compute_available_slots(now_at(5, 5, 9, 0), &[], &policy).unwrap();
        assert_eq!(slots[0].start, tokyo(5, 5, 10, 0));
    }

    #[test]
    fn test_seconds_past_boundary_round_up() {
        let policy = SchedulingPolicy::default();
        let now = now_at(5, 5, 9, 0) + Duration::seconds(30);
        let slots = compute_available_slots(now, &[], &policy).unwrap();
        assert_eq!(slots[0].start, tokyo(5, 5, 10, 30));
    }

    #[test]
    fn test_round_up_to_step() {
        let step = Duration::minutes(30);
        assert_eq!(round_up_to_step(tokyo(5, 5, 10, 0), step), tokyo(5, 5, 10, 0));
        assert_eq!(round_up_to_step(tokyo(5, 5, 10, 1), step), tokyo(5, 5, 10, 30));
        assert_eq!(round_up_to_step(tokyo(5, 5, 23, 45), step), tokyo(5, 6, 0, 0));
        assert_eq!(
            round_up_to_step(tokyo(5, 5, 10, 0) + Duration::nanoseconds(1), step),
            tokyo(5, 5, 10, 30)
        );
    }

    #[test]
    fn test_last_slot_ends_at_close_of_business() {
        let policy = SchedulingPolicy {
            horizon_days: 1,
            ..Default::default()
        };
        let slots = compute_available_slots(now_at(5, 5, 8, 0), &[], &policy).unwrap();

        // 10:00 through 18:00 every 30 minutes
        assert_eq!(slots.len(), 17);
        let last = slots.last().unwrap();
        assert_eq!(last.start, tokyo(5, 5, 18, 0));
        assert_eq!(last.end, tokyo(5, 5, 19, 0));
    }

    #[test]
    fn test_weekend_is_skipped() {
        let policy = SchedulingPolicy::default();
        // Friday evening: 18:30 would spill past 19:00
        let slots = compute_available_slots(now_at(5, 9, 17, 30), &[], &policy).unwrap();

        assert_eq!(slots[0].start, tokyo(5, 12, 10, 0));
        assert!(slots
            .iter()
            .all(|s| !matches!(s.start.date_naive().weekday(), Weekday::Sat | Weekday::Sun)));
    }

    #[test]
    fn test_horizon_can_end_mid_day() {
        let policy = SchedulingPolicy {
            horizon_days: 1,
            ..Default::default()
        };
        let slots = compute_available_slots(now_at(5, 5, 12, 5), &[], &policy).unwrap();

        assert_eq!(slots[0].start, tokyo(5, 5, 13, 30));
        assert_eq!(slots.last().unwrap().start, tokyo(5, 6, 12, 0));
    }

    #[test]
    fn test_slot_crossing_midnight_is_rejected() {
        let policy = SchedulingPolicy {
            workday_start_hour: 20,
            workday_end_hour: 24,
            workdays: vec![
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
                Weekday::Sat,
                Weekday::Sun,
            ],
            horizon_days: 1,
            ..Default::default()
        };
        let slots = compute_available_slots(now_at(5, 5, 18, 0), &[], &policy).unwrap();

        assert_eq!(slots.len(), 7);
        assert_eq!(slots[0].start, tokyo(5, 5, 20, 0));
        assert_eq!(slots.last().unwrap().start, tokyo(5, 5, 23, 0));
        assert!(!starts(&slots).contains(&tokyo(5, 5, 23, 30)));
    }

    #[test]
    fn test_touching_busy_interval_does_not_block() {
        let policy = SchedulingPolicy {
            horizon_days: 1,
            ..Default::default()
        };
        let busy = vec![busy(tokyo(5, 5, 11, 0), tokyo(5, 5, 12, 0))];
        let slots = compute_available_slots(now_at(5, 5, 8, 0), &busy, &policy).unwrap();
        let starts = starts(&slots);

        assert!(starts.contains(&tokyo(5, 5, 10, 0)));
        assert!(starts.contains(&tokyo(5, 5, 12, 0)));
        assert!(!starts.contains(&tokyo(5, 5, 10, 30)));
        assert!(!starts.contains(&tokyo(5, 5, 11, 0)));
        assert!(!starts.contains(&tokyo(5, 5, 11, 30)));
    }

    #[test]
    fn test_early_cursor_jumps_to_start_hour() {
        let policy = SchedulingPolicy {
            step_minutes: 45,
            ..Default::default()
        };
        let slots = compute_available_slots(now_at(5, 5, 8, 0), &[], &policy).unwrap();

        assert_eq!(slots[0].start, tokyo(5, 5, 10, 0));
        assert_eq!(slots[1].start, tokyo(5, 5, 10, 45));
    }

    #[test]
    fn test_zero_lead_time() {
        let policy = SchedulingPolicy {
            lead_time_minutes: 0,
            ..Default::default()
        };
        let slots = compute_available_slots(now_at(5, 5, 10, 10), &[], &policy).unwrap();
        assert_eq!(slots[0].start, tokyo(5, 5, 10, 30));
    }

    #[test]
    fn test_invalid_policy_fails_before_searching() {
        let policy = SchedulingPolicy {
            duration_minutes: 600,
            ..Default::default()
        };
        let result = compute_available_slots(now_at(5, 5, 8, 0), &[], &policy);
        assert_eq!(
            result,
            Err(PolicyError::DurationExceedsWorkday {
                duration: 600,
                span: 540
            })
        );
    }

    #[test]
    fn test_same_input_same_output() {
        let policy = SchedulingPolicy::default();
        let busy = vec![
            busy(tokyo(5, 6, 13, 0), tokyo(5, 6, 14, 30)),
            busy(tokyo(5, 7, 10, 0), tokyo(5, 7, 10, 15)),
        ];
        let now = now_at(5, 5, 9, 5);

        let first = compute_available_slots(now, &busy, &policy).unwrap();
        let second = compute_available_slots(now, &busy, &policy).unwrap();
        assert_eq!(first, second);
        assert!(first.windows(2).all(|w| w[0].start < w[1].start));
    }

    #[test]
    fn test_busy_interval_must_be_non_empty() {
        let t = now_at(5, 5, 10, 0);
        assert!(BusyInterval::new(t, t).is_none());
        assert!(BusyInterval::new(t, t - Duration::minutes(1)).is_none());
        assert!(BusyInterval::new(t, t + Duration::minutes(1)).is_some());
    }

    #[test]
    fn test_group_by_day() {
        let policy = SchedulingPolicy {
            horizon_days: 2,
            ..Default::default()
        };
        let slots = compute_available_slots(now_at(5, 5, 8, 0), &[], &policy).unwrap();
        let days = group_by_day(&slots);

        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2025, 5, 5).unwrap());
        assert_eq!(days[1].date, NaiveDate::from_ymd_opt(2025, 5, 6).unwrap());
        assert_eq!(days[0].slots.len() + days[1].slots.len(), slots.len());
        assert!(group_by_day(&[]).is_empty());
    }
}
