//! Property tests for the streak/consistency calculator and the stopwatch.

use cadence_core::habit::{consistency_rate, current_streak, HabitPeriod, Occurrence};
use cadence_core::Stopwatch;
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use proptest::prelude::*;

fn anchor() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 31).unwrap()
}

fn log_from(offsets: Vec<(i64, u32)>) -> Vec<Occurrence> {
    offsets
        .into_iter()
        .map(|(days_back, count)| Occurrence {
            at: Utc
                .from_utc_datetime(&(anchor() - Duration::days(days_back)).and_hms_opt(12, 0, 0).unwrap()),
            count,
        })
        .collect()
}

proptest! {
    #[test]
    fn consistency_rate_stays_in_bounds(
        offsets in prop::collection::vec((0i64..60, 0u32..20), 0..50),
        goal in 0u32..10,
        periods in 0u32..20,
        weekly in any::<bool>(),
    ) {
        let period = if weekly { HabitPeriod::Weekly } else { HabitPeriod::Daily };
        let rate = consistency_rate(&log_from(offsets), period, goal, periods, anchor());
        prop_assert!((0.0..=100.0).contains(&rate));
    }

    #[test]
    fn streak_never_exceeds_logged_periods(
        offsets in prop::collection::vec((0i64..60, 1u32..5), 0..50),
        goal in 1u32..5,
    ) {
        let log = log_from(offsets);
        let streak = current_streak(&log, HabitPeriod::Daily, goal, anchor());
        // A streak of n requires at least n distinct logged days.
        let mut days: Vec<_> = log.iter().map(|o| o.at.date_naive()).collect();
        days.sort();
        days.dedup();
        prop_assert!(streak as usize <= days.len());
    }

    #[test]
    fn stopwatch_total_is_monotonic_across_cycles(
        segments in prop::collection::vec((0u64..1_000_000, 0u64..1_000_000), 1..20),
    ) {
        let mut sw = Stopwatch::default();
        let mut clock = 0u64;
        let mut last_total = 0u64;
        for (gap, run) in segments {
            clock += gap;
            sw.start_at(clock);
            clock += run;
            let total = sw.stop_at(clock).unwrap();
            prop_assert!(total >= last_total);
            last_total = total;
        }
    }
}
