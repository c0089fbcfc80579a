//! Habit types and the occurrence log.
//!
//! A habit carries a periodicity and a consistency goal (completions per
//! period). Streak and consistency are derived from the occurrence log on
//! demand -- see [`streak`] -- and are never stored as independent truth.

pub mod streak;

pub use streak::{consistency_rate, current_streak, HabitReport};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How often the habit's goal must be met.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HabitPeriod {
    Daily,
    Weekly,
}

/// A tracked habit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Habit {
    pub id: String,
    pub owner: String,
    pub name: String,
    pub period: HabitPeriod,
    /// Completions required per period for the period to qualify.
    pub goal: u32,
    pub created_at: DateTime<Utc>,
}

impl Habit {
    pub fn new(
        owner: impl Into<String>,
        name: impl Into<String>,
        period: HabitPeriod,
        goal: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            owner: owner.into(),
            name: name.into(),
            period,
            goal,
            created_at: Utc::now(),
        }
    }
}

/// One logged completion occurrence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Occurrence {
    pub at: DateTime<Utc>,
    pub count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn habit_serialization() {
        let habit = Habit::new("user-1", "Read 20 pages", HabitPeriod::Daily, 1);
        let json = serde_json::to_string(&habit).unwrap();
        let decoded: Habit = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.period, HabitPeriod::Daily);
        assert_eq!(decoded.goal, 1);
    }
}
