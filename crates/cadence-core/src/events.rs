use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::rewards::PointsReason;

/// Every state-changing command produces an Event. Surfaces include them in
/// responses; the server also logs them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        block_id: String,
        at: DateTime<Utc>,
    },
    TimerStopped {
        block_id: String,
        accumulated_ms: u64,
        at: DateTime<Utc>,
    },
    BlockCompletionToggled {
        block_id: String,
        completed: bool,
        at: DateTime<Utc>,
    },
    TaskCompletionToggled {
        block_id: String,
        task_id: String,
        completed: bool,
        at: DateTime<Utc>,
    },
    HabitCompleted {
        habit_id: String,
        count: u32,
        current_streak: u32,
        at: DateTime<Utc>,
    },
    MilestoneCompleted {
        goal_id: String,
        milestone_id: String,
        at: DateTime<Utc>,
    },
    PointsAwarded {
        reason: PointsReason,
        delta: i64,
        balance: i64,
        at: DateTime<Utc>,
    },
    RewardRedeemed {
        reward_id: String,
        balance: i64,
        at: DateTime<Utc>,
    },
}
