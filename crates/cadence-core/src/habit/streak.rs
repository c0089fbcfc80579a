//! Streak and consistency derivation over an occurrence log.
//!
//! Both values are pure functions of the raw log: recomputing from the full
//! log always reproduces the same output. Daily habits bucket occurrences
//! by UTC calendar date; weekly habits by ISO week (Monday start).

use std::collections::HashMap;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use super::{Habit, HabitPeriod, Occurrence};

/// Derived streak/consistency snapshot for one habit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HabitReport {
    pub habit_id: String,
    /// Consecutive qualifying periods ending at the present.
    pub current_streak: u32,
    /// Completions over the trailing window as a percentage of the
    /// required total, in [0, 100].
    pub consistency_pct: f64,
    pub window_periods: u32,
}

/// Default report window per period: a trailing week of days, or four
/// ISO weeks.
pub fn default_window(period: HabitPeriod) -> u32 {
    match period {
        HabitPeriod::Daily => 7,
        HabitPeriod::Weekly => 4,
    }
}

/// First day of the period containing `date`.
fn period_start(date: NaiveDate, period: HabitPeriod) -> NaiveDate {
    match period {
        HabitPeriod::Daily => date,
        HabitPeriod::Weekly => {
            date - Duration::days(date.weekday().num_days_from_monday() as i64)
        }
    }
}

fn period_step(period: HabitPeriod) -> Duration {
    match period {
        HabitPeriod::Daily => Duration::days(1),
        HabitPeriod::Weekly => Duration::days(7),
    }
}

/// Sum completion counts per period start.
fn bucket(occurrences: &[Occurrence], period: HabitPeriod) -> HashMap<NaiveDate, u64> {
    let mut sums: HashMap<NaiveDate, u64> = HashMap::new();
    for occ in occurrences {
        let key = period_start(occ.at.date_naive(), period);
        *sums.entry(key).or_insert(0) += occ.count as u64;
    }
    sums
}

/// Count of consecutive qualifying periods up to `today`.
///
/// The current, still in-progress period extends the streak once its goal
/// is met but does not break it while unmet. A goal of zero derives a
/// streak of zero: there is nothing to qualify against.
pub fn current_streak(
    occurrences: &[Occurrence],
    period: HabitPeriod,
    goal: u32,
    today: NaiveDate,
) -> u32 {
    if goal == 0 {
        return 0;
    }
    let sums = bucket(occurrences, period);
    let step = period_step(period);
    let met = |start: NaiveDate| sums.get(&start).copied().unwrap_or(0) >= goal as u64;

    let mut streak = 0;
    let mut cursor = period_start(today, period);
    if met(cursor) {
        streak += 1;
    }
    cursor -= step;
    while met(cursor) {
        streak += 1;
        cursor -= step;
    }
    streak
}

/// Consistency over the trailing `periods` periods ending at `today`.
///
/// Total completions in the window divided by the window's required total
/// (`goal * periods`), as a percentage clamped to [0, 100]. A zero
/// required total yields 0% rather than a division failure.
pub fn consistency_rate(
    occurrences: &[Occurrence],
    period: HabitPeriod,
    goal: u32,
    periods: u32,
    today: NaiveDate,
) -> f64 {
    let required = goal as u64 * periods as u64;
    if required == 0 {
        return 0.0;
    }
    let sums = bucket(occurrences, period);
    let step = period_step(period);

    let mut total = 0u64;
    let mut cursor = period_start(today, period);
    for _ in 0..periods {
        total += sums.get(&cursor).copied().unwrap_or(0);
        cursor -= step;
    }
    (total as f64 / required as f64 * 100.0).clamp(0.0, 100.0)
}

/// Build the full derived report for a habit.
pub fn report(
    habit: &Habit,
    occurrences: &[Occurrence],
    window_periods: u32,
    today: NaiveDate,
) -> HabitReport {
    HabitReport {
        habit_id: habit.id.clone(),
        current_streak: current_streak(occurrences, habit.period, habit.goal, today),
        consistency_pct: consistency_rate(
            occurrences,
            habit.period,
            habit.goal,
            window_periods,
            today,
        ),
        window_periods,
    }
}
