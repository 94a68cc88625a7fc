// --- File: crates/meetslot_scheduler/src/logic_proptest.rs ---
#[cfg(test)]
mod tests {
    use crate::logic::{compute_available_slots, round_up_to_step, BusyInterval};
    use crate::policy::SchedulingPolicy;
    use chrono::{DateTime, Datelike, Duration, Timelike, Utc, Weekday};
    use chrono_tz::Tz;
    use proptest::prelude::*;

    const ALL_DAYS: [Weekday; 7] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];

    // 2024-01-01 .. 2027-01-01
    fn now_strategy() -> impl Strategy<Value = DateTime<Utc>> {
        (1_704_067_200i64..1_798_761_600i64)
            .prop_map(|secs| DateTime::from_timestamp(secs, 0).unwrap())
    }

    fn policy_strategy(zones: Vec<Tz>) -> impl Strategy<Value = SchedulingPolicy> {
        (
            prop::sample::select(vec![15i64, 30, 45, 60, 90]),
            prop::sample::select(vec![15i64, 20, 30, 60]),
            0u32..12,
            2u32..=12,
            prop::collection::btree_set(0usize..7, 1..=7),
            1i64..=7,
            prop::sample::select(zones),
            0i64..=180,
        )
            .prop_map(
                |(duration, step, start, span, days, horizon, tz, lead)| SchedulingPolicy {
                    duration_minutes: duration,
                    step_minutes: step,
                    workday_start_hour: start,
                    workday_end_hour: (start + span).min(24),
                    workdays: days.into_iter().map(|i| ALL_DAYS[i]).collect(),
                    horizon_days: horizon,
                    time_zone: tz,
                    lead_time_minutes: lead,
                },
            )
    }

    // (minutes after now, length in minutes)
    fn busy_strategy() -> impl Strategy<Value = Vec<(i64, i64)>> {
        prop::collection::vec((0i64..7 * 24 * 60, 1i64..300), 0..10)
    }

    fn to_intervals(now: DateTime<Utc>, raw: &[(i64, i64)]) -> Vec<BusyInterval> {
        raw.iter()
            .filter_map(|&(offset, len)| {
                let start = now + Duration::minutes(offset);
                BusyInterval::new(start, start + Duration::minutes(len))
            })
            .collect()
    }

    proptest! {
        #[test]
        fn test_slots_respect_policy(
            now in now_strategy(),
            policy in policy_strategy(vec![
                chrono_tz::Asia::Tokyo,
                chrono_tz::Europe::Zurich,
                chrono_tz::America::New_York,
                chrono_tz::UTC,
            ]),
            raw_busy in busy_strategy(),
        ) {
            let busy = to_intervals(now, &raw_busy);
            let slots = compute_available_slots(now, &busy, &policy).unwrap();
            let earliest = now + policy.lead_time();
            let latest = now + policy.horizon();

            for pair in slots.windows(2) {
                prop_assert!(pair[0].start < pair[1].start);
            }

            for slot in &slots {
                prop_assert_eq!(slot.end - slot.start, policy.duration());
                prop_assert!(policy.admits(slot.start));
                prop_assert!(policy.workdays.contains(&slot.start.weekday()));

                let start = slot.start.with_timezone(&Utc);
                let end = slot.end.with_timezone(&Utc);
                prop_assert!(start >= earliest);
                prop_assert!(start < latest);
                prop_assert!(busy.iter().all(|b| !b.overlaps(start, end)));

                let secs = i64::from(slot.start.num_seconds_from_midnight());
                prop_assert_eq!(secs % (policy.step_minutes * 60), 0);
            }
        }

        #[test]
        fn test_every_free_grid_time_is_found(
            now in now_strategy(),
            policy in policy_strategy(vec![chrono_tz::Asia::Tokyo, chrono_tz::UTC]),
            raw_busy in busy_strategy(),
        ) {
            // Fixed-offset zones: a plain walk over the grid is the reference.
            let busy = to_intervals(now, &raw_busy);
            let slots = compute_available_slots(now, &busy, &policy).unwrap();

            let end = now + policy.horizon();
            let mut cursor = round_up_to_step(
                (now + policy.lead_time()).with_timezone(&policy.time_zone),
                policy.step(),
            );
            let mut expected = Vec::new();
            while cursor.with_timezone(&Utc) < end {
                let start = cursor.with_timezone(&Utc);
                let finish = start + policy.duration();
                if policy.admits(cursor) && busy.iter().all(|b| !b.overlaps(start, finish)) {
                    expected.push(cursor);
                }
                cursor = cursor + policy.step();
            }

            let found: Vec<_> = slots.iter().map(|s| s.start).collect();
            prop_assert_eq!(found, expected);
        }
    }
}
