//! Weekly metrics aggregation.
//!
//! Pure reductions over raw persisted records: time blocks and habit
//! occurrence logs for a trailing 7-day window. No hidden running counters
//! anywhere, so recomputing from the full log always reproduces the same
//! output.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::habit::{consistency_rate, Habit, HabitPeriod, Occurrence};
use crate::schedule::TimeBlock;

/// Length of the trailing window in days, today inclusive.
pub const WINDOW_DAYS: i64 = 7;

/// Aggregated view of one trailing week.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyMetrics {
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    /// Planned hours per category, from block intervals.
    pub hours_by_category: BTreeMap<String, f64>,
    /// Hours actually clocked per category, from block stopwatches.
    pub tracked_hours_by_category: BTreeMap<String, f64>,
    /// Completed blocks over all blocks in the window, as a percentage.
    pub schedule_completion_pct: f64,
    /// Mean per-habit consistency over the window, as a percentage.
    pub habit_consistency_pct: f64,
}

/// Reduce one week of blocks and habit logs into a [`WeeklyMetrics`].
///
/// `today` anchors the window: it covers the 7 calendar days ending at
/// `today`, inclusive. Blocks outside the window are ignored, so callers
/// may pass more history than needed.
pub fn weekly_metrics(
    blocks: &[TimeBlock],
    habits: &[(Habit, Vec<Occurrence>)],
    today: NaiveDate,
) -> WeeklyMetrics {
    let window_start = today - Duration::days(WINDOW_DAYS - 1);

    let in_window = |b: &&TimeBlock| {
        let d = b.start.date_naive();
        d >= window_start && d <= today
    };

    let mut hours: BTreeMap<String, f64> = BTreeMap::new();
    let mut tracked: BTreeMap<String, f64> = BTreeMap::new();
    let mut total = 0usize;
    let mut completed = 0usize;

    for block in blocks.iter().filter(in_window) {
        let key = block.category.as_str().to_string();
        *hours.entry(key.clone()).or_insert(0.0) += block.planned_minutes() as f64 / 60.0;
        *tracked.entry(key).or_insert(0.0) +=
            block.timer.accumulated_ms() as f64 / 3_600_000.0;
        total += 1;
        if block.completed {
            completed += 1;
        }
    }

    let schedule_completion_pct = if total == 0 {
        0.0
    } else {
        completed as f64 / total as f64 * 100.0
    };

    WeeklyMetrics {
        window_start,
        window_end: today,
        hours_by_category: hours,
        tracked_hours_by_category: tracked,
        schedule_completion_pct,
        habit_consistency_pct: mean_consistency(habits, today),
    }
}

/// Mean consistency across habits for the trailing week.
///
/// Daily habits are measured over 7 periods, weekly habits over the single
/// period containing the window. No habits yields a defined 0%.
fn mean_consistency(habits: &[(Habit, Vec<Occurrence>)], today: NaiveDate) -> f64 {
    if habits.is_empty() {
        return 0.0;
    }
    let sum: f64 = habits
        .iter()
        .map(|(habit, log)| {
            let periods = match habit.period {
                HabitPeriod::Daily => WINDOW_DAYS as u32,
                HabitPeriod::Weekly => 1,
            };
            consistency_rate(log, habit.period, habit.goal, periods, today)
        })
        .sum();
    sum / habits.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::BlockCategory;
    use chrono::{TimeZone, Utc};

    fn block_on(day: u32, hour: u32, len_hours: u32, category: BlockCategory) -> TimeBlock {
        let start = Utc.with_ymd_and_hms(2026, 3, day, hour, 0, 0).unwrap();
        let end = Utc
            .with_ymd_and_hms(2026, 3, day, hour + len_hours, 0, 0)
            .unwrap();
        TimeBlock::new("b", category, start, end).unwrap()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 7).unwrap()
    }

    #[test]
    fn hours_grouped_by_category() {
        let blocks = vec![
            block_on(5, 9, 2, BlockCategory::Work),
            block_on(6, 9, 3, BlockCategory::Work),
            block_on(6, 19, 1, BlockCategory::Leisure),
        ];
        let m = weekly_metrics(&blocks, &[], today());
        assert_eq!(m.hours_by_category["work"], 5.0);
        assert_eq!(m.hours_by_category["leisure"], 1.0);
    }

    #[test]
    fn blocks_outside_window_are_ignored() {
        // Window for Mar 7 is Mar 1..=7; Mar 20 is outside.
        let blocks = vec![
            block_on(6, 9, 2, BlockCategory::Work),
            block_on(20, 9, 4, BlockCategory::Work),
        ];
        let m = weekly_metrics(&blocks, &[], today());
        assert_eq!(m.hours_by_category["work"], 2.0);
    }

    #[test]
    fn completion_pct_over_window_blocks() {
        let mut done = block_on(5, 9, 1, BlockCategory::Work);
        done.completed = true;
        let blocks = vec![done, block_on(6, 9, 1, BlockCategory::Work)];
        let m = weekly_metrics(&blocks, &[], today());
        assert_eq!(m.schedule_completion_pct, 50.0);
    }

    #[test]
    fn empty_window_is_all_zeros() {
        let m = weekly_metrics(&[], &[], today());
        assert_eq!(m.schedule_completion_pct, 0.0);
        assert_eq!(m.habit_consistency_pct, 0.0);
        assert!(m.hours_by_category.is_empty());
    }

    #[test]
    fn tracked_hours_from_stopwatch() {
        let mut b = block_on(6, 9, 2, BlockCategory::Work);
        b.timer.start_at(0);
        b.timer.stop_at(90 * 60 * 1000); // 90 minutes clocked
        let m = weekly_metrics(&[b], &[], today());
        assert!((m.tracked_hours_by_category["work"] - 1.5).abs() < 1e-9);
    }

    #[test]
    fn recomputation_is_idempotent() {
        let blocks = vec![block_on(5, 9, 2, BlockCategory::Atelic)];
        let habit = Habit::new("u", "stretch", HabitPeriod::Daily, 1);
        let log = vec![Occurrence {
            at: Utc.with_ymd_and_hms(2026, 3, 6, 8, 0, 0).unwrap(),
            count: 1,
        }];
        let habits = vec![(habit, log)];
        let a = weekly_metrics(&blocks, &habits, today());
        let b = weekly_metrics(&blocks, &habits, today());
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }
}
