//! Goals and their milestones.
//!
//! Milestones are owned child records addressed by stable id and mutated
//! only through the parent goal. Goal status and progress are driven by the
//! milestone completion ratio; every mutation appends to the audit history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalPriority {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    NotStarted,
    InProgress,
    Completed,
}

/// A sub-goal with its own deadline and completion state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Milestone {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Milestone {
    pub fn new(title: impl Into<String>, deadline: Option<DateTime<Utc>>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            deadline,
            completed: false,
            completed_at: None,
        }
    }
}

/// One entry in a goal's audit history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub at: DateTime<Utc>,
    pub entry: String,
}

/// A long-running objective with ordered milestones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    pub id: String,
    pub owner: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
    pub priority: GoalPriority,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub milestones: Vec<Milestone>,
    /// Completed-milestone percentage, recomputed on every mutation.
    pub progress_pct: f64,
    pub status: GoalStatus,
    #[serde(default)]
    pub history: Vec<AuditEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Goal {
    /// Create a goal. Fails if the title is empty.
    pub fn new(
        owner: impl Into<String>,
        title: impl Into<String>,
        priority: GoalPriority,
    ) -> Result<Self, ValidationError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(ValidationError::MissingField("title"));
        }
        let now = Utc::now();
        let mut goal = Self {
            id: Uuid::new_v4().to_string(),
            owner: owner.into(),
            title,
            description: String::new(),
            deadline: None,
            priority,
            category: String::new(),
            milestones: Vec::new(),
            progress_pct: 0.0,
            status: GoalStatus::NotStarted,
            history: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        goal.record("created");
        Ok(goal)
    }

    pub fn milestone(&self, milestone_id: &str) -> Option<&Milestone> {
        self.milestones.iter().find(|m| m.id == milestone_id)
    }

    /// Append a milestone, recompute progress, and return its id.
    pub fn add_milestone(&mut self, milestone: Milestone) -> String {
        let id = milestone.id.clone();
        self.record(&format!("milestone '{}' added", milestone.title));
        self.milestones.push(milestone);
        self.recompute();
        id
    }

    /// Set a milestone's completion flag. Returns `false` if absent.
    pub fn set_milestone_completed(&mut self, milestone_id: &str, completed: bool) -> bool {
        let Some(m) = self.milestones.iter_mut().find(|m| m.id == milestone_id) else {
            return false;
        };
        m.completed = completed;
        m.completed_at = completed.then(Utc::now);
        let title = m.title.clone();
        self.record(&format!(
            "milestone '{}' marked {}",
            title,
            if completed { "complete" } else { "incomplete" }
        ));
        self.recompute();
        true
    }

    /// Retitle or re-deadline a milestone. Returns `false` if absent.
    pub fn update_milestone(
        &mut self,
        milestone_id: &str,
        title: Option<&str>,
        deadline: Option<Option<DateTime<Utc>>>,
    ) -> bool {
        let Some(m) = self.milestones.iter_mut().find(|m| m.id == milestone_id) else {
            return false;
        };
        if let Some(title) = title {
            m.title = title.to_string();
        }
        if let Some(deadline) = deadline {
            m.deadline = deadline;
        }
        let title = m.title.clone();
        self.record(&format!("milestone '{}' updated", title));
        self.recompute();
        true
    }

    /// Remove a milestone. Siblings' completion state is untouched.
    pub fn remove_milestone(&mut self, milestone_id: &str) -> bool {
        let before = self.milestones.len();
        self.milestones.retain(|m| m.id != milestone_id);
        if self.milestones.len() == before {
            return false;
        }
        self.record("milestone removed");
        self.recompute();
        true
    }

    /// Recompute progress percentage and status from the milestone ratio.
    ///
    /// No milestones -> NotStarted at 0%. All complete (non-empty) ->
    /// Completed. Anything in between -> InProgress.
    pub fn recompute(&mut self) {
        self.updated_at = Utc::now();
        let total = self.milestones.len();
        if total == 0 {
            self.progress_pct = 0.0;
            self.status = GoalStatus::NotStarted;
            return;
        }
        let done = self.milestones.iter().filter(|m| m.completed).count();
        self.progress_pct = done as f64 / total as f64 * 100.0;
        self.status = if done == 0 {
            GoalStatus::NotStarted
        } else if done == total {
            GoalStatus::Completed
        } else {
            GoalStatus::InProgress
        };
    }

    fn record(&mut self, entry: &str) {
        self.history.push(AuditEntry {
            at: Utc::now(),
            entry: entry.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn goal() -> Goal {
        Goal::new("user-1", "Ship the launch", GoalPriority::High).unwrap()
    }

    #[test]
    fn empty_title_is_rejected() {
        let err = Goal::new("user-1", "  ", GoalPriority::Low);
        assert!(matches!(err, Err(ValidationError::MissingField("title"))));
    }

    #[test]
    fn status_follows_milestone_ratio() {
        let mut g = goal();
        assert_eq!(g.status, GoalStatus::NotStarted);

        let a = g.add_milestone(Milestone::new("draft", None));
        let b = g.add_milestone(Milestone::new("review", None));
        assert_eq!(g.status, GoalStatus::NotStarted);
        assert_eq!(g.progress_pct, 0.0);

        g.set_milestone_completed(&a, true);
        assert_eq!(g.status, GoalStatus::InProgress);
        assert_eq!(g.progress_pct, 50.0);

        g.set_milestone_completed(&b, true);
        assert_eq!(g.status, GoalStatus::Completed);
        assert_eq!(g.progress_pct, 100.0);
    }

    #[test]
    fn removing_milestone_leaves_siblings_untouched() {
        let mut g = goal();
        let a = g.add_milestone(Milestone::new("a", None));
        let b = g.add_milestone(Milestone::new("b", None));
        g.set_milestone_completed(&b, true);

        assert!(g.remove_milestone(&a));
        assert_eq!(g.milestones.len(), 1);
        assert!(g.milestone(&b).unwrap().completed);
        // Sole remaining milestone is complete -> goal completes.
        assert_eq!(g.status, GoalStatus::Completed);
    }

    #[test]
    fn mutations_append_audit_history() {
        let mut g = goal();
        let len_after_create = g.history.len();
        let a = g.add_milestone(Milestone::new("a", None));
        g.set_milestone_completed(&a, true);
        g.remove_milestone(&a);
        assert_eq!(g.history.len(), len_after_create + 3);
    }

    #[test]
    fn unknown_milestone_ids_are_rejected() {
        let mut g = goal();
        assert!(!g.set_milestone_completed("nope", true));
        assert!(!g.remove_milestone("nope"));
        assert!(!g.update_milestone("nope", Some("x"), None));
    }
}
