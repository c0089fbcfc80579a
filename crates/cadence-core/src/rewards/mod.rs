//! Reward catalog and the points ledger.
//!
//! Points are earned by completing time blocks and logging habit
//! occurrences, and spent by redeeming rewards. The balance is always the
//! sum of the ledger, never an independently stored counter.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// Points earned for completing a time block.
pub const POINTS_PER_BLOCK: i64 = 10;
/// Points earned per logged habit completion count.
pub const POINTS_PER_HABIT_COUNT: i64 = 5;

/// Why a ledger entry exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointsReason {
    BlockCompleted,
    HabitCompleted,
    RewardRedeemed,
}

impl PointsReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            PointsReason::BlockCompleted => "block_completed",
            PointsReason::HabitCompleted => "habit_completed",
            PointsReason::RewardRedeemed => "reward_redeemed",
        }
    }
}

/// One signed entry in an owner's points ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub owner: String,
    pub delta: i64,
    pub reason: PointsReason,
    pub at: DateTime<Utc>,
}

/// A redeemable reward in an owner's catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reward {
    pub id: String,
    pub owner: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub cost_points: i64,
    #[serde(default)]
    pub redeemed: bool,
    #[serde(default)]
    pub redeemed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Reward {
    /// Create a reward. Fails on an empty name or negative cost.
    pub fn new(
        owner: impl Into<String>,
        name: impl Into<String>,
        cost_points: i64,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::MissingField("name"));
        }
        if cost_points < 0 {
            return Err(ValidationError::InvalidValue {
                field: "cost_points",
                message: "cost must not be negative".to_string(),
            });
        }
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            owner: owner.into(),
            name,
            description: String::new(),
            cost_points,
            redeemed: false,
            redeemed_at: None,
            created_at: Utc::now(),
        })
    }

    /// Mark the reward redeemed against the given balance.
    ///
    /// Returns the ledger delta to append on success.
    pub fn redeem(&mut self, balance: i64) -> Result<i64, ValidationError> {
        if self.redeemed {
            return Err(ValidationError::InvalidValue {
                field: "redeemed",
                message: "reward already redeemed".to_string(),
            });
        }
        if balance < self.cost_points {
            return Err(ValidationError::InvalidValue {
                field: "cost_points",
                message: format!(
                    "insufficient points: balance {balance}, cost {}",
                    self.cost_points
                ),
            });
        }
        self.redeemed = true;
        self.redeemed_at = Some(Utc::now());
        Ok(-self.cost_points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redeem_requires_sufficient_balance() {
        let mut r = Reward::new("user-1", "Movie night", 30).unwrap();
        let err = r.redeem(20);
        assert!(err.is_err());
        assert!(!r.redeemed);

        assert_eq!(r.redeem(30).unwrap(), -30);
        assert!(r.redeemed);
    }

    #[test]
    fn double_redeem_is_rejected() {
        let mut r = Reward::new("user-1", "Movie night", 10).unwrap();
        r.redeem(100).unwrap();
        assert!(r.redeem(100).is_err());
    }

    #[test]
    fn negative_cost_is_rejected() {
        assert!(Reward::new("user-1", "free points", -5).is_err());
    }
}
