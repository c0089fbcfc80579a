//! Daily schedule types: one schedule per (owner, date), owning an ordered
//! list of time blocks. Tasks inside a block are owned child records with
//! stable ids; all task mutation goes through the parent block.

mod stopwatch;

pub use stopwatch::Stopwatch;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// Activity category a time block is assigned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockCategory {
    Work,
    Leisure,
    FamilyFriends,
    Atelic,
}

impl BlockCategory {
    pub const ALL: [BlockCategory; 4] = [
        BlockCategory::Work,
        BlockCategory::Leisure,
        BlockCategory::FamilyFriends,
        BlockCategory::Atelic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BlockCategory::Work => "work",
            BlockCategory::Leisure => "leisure",
            BlockCategory::FamilyFriends => "family_friends",
            BlockCategory::Atelic => "atelic",
        }
    }
}

/// A task owned by a time block.
///
/// Optionally back-references the habit it contributes to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockTask {
    pub id: String,
    pub name: String,
    pub completed: bool,
    #[serde(default)]
    pub habit_id: Option<String>,
}

impl BlockTask {
    pub fn new(name: impl Into<String>, habit_id: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            completed: false,
            habit_id,
        }
    }
}

/// A bounded interval of a day assigned to one activity category.
///
/// The block itself is the completable unit; its task list may be empty.
/// Block completion is independent of task completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeBlock {
    pub id: String,
    pub name: String,
    pub category: BlockCategory,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub tasks: Vec<BlockTask>,
    #[serde(default)]
    pub completed: bool,
    /// Stopwatch accumulating focus time across start/stop cycles.
    #[serde(default)]
    pub timer: Stopwatch,
}

impl TimeBlock {
    /// Create a new block. Fails if `start >= end`.
    pub fn new(
        name: impl Into<String>,
        category: BlockCategory,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        if start >= end {
            return Err(ValidationError::InvalidTimeRange { start, end });
        }
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            category,
            start,
            end,
            tasks: Vec::new(),
            completed: false,
            timer: Stopwatch::default(),
        })
    }

    /// Planned duration of the interval in minutes.
    pub fn planned_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// Toggle block completion. Independent of task state.
    pub fn toggle_completed(&mut self) -> bool {
        self.completed = !self.completed;
        self.completed
    }

    /// Append a task and return a reference to it.
    pub fn add_task(&mut self, task: BlockTask) -> &BlockTask {
        self.tasks.push(task);
        self.tasks.last().expect("just pushed")
    }

    pub fn task(&self, task_id: &str) -> Option<&BlockTask> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    /// Toggle a task's completion flag. Returns the new state, or `None`
    /// if no task with that id exists.
    pub fn toggle_task(&mut self, task_id: &str) -> Option<bool> {
        let task = self.tasks.iter_mut().find(|t| t.id == task_id)?;
        task.completed = !task.completed;
        Some(task.completed)
    }

    /// Rename a task. Returns `false` if no task with that id exists.
    pub fn rename_task(&mut self, task_id: &str, name: &str) -> bool {
        match self.tasks.iter_mut().find(|t| t.id == task_id) {
            Some(task) => {
                task.name = name.to_string();
                true
            }
            None => false,
        }
    }

    /// Remove a task by id. Siblings keep their order and state.
    pub fn remove_task(&mut self, task_id: &str) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != task_id);
        self.tasks.len() < before
    }
}

/// One user's schedule for one calendar day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaySchedule {
    pub id: String,
    pub owner: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub blocks: Vec<TimeBlock>,
}

impl DaySchedule {
    /// An empty-but-valid schedule for a day with no prior activity.
    pub fn empty(owner: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            owner: owner.into(),
            date,
            blocks: Vec::new(),
        }
    }

    pub fn block(&self, block_id: &str) -> Option<&TimeBlock> {
        self.blocks.iter().find(|b| b.id == block_id)
    }

    pub fn block_mut(&mut self, block_id: &str) -> Option<&mut TimeBlock> {
        self.blocks.iter_mut().find(|b| b.id == block_id)
    }

    /// Remove a block by id. Returns `false` if absent.
    pub fn remove_block(&mut self, block_id: &str) -> bool {
        let before = self.blocks.len();
        self.blocks.retain(|b| b.id != block_id);
        self.blocks.len() < before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn block() -> TimeBlock {
        let start = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2026, 3, 2, 10, 30, 0).unwrap();
        TimeBlock::new("Deep work", BlockCategory::Work, start, end).unwrap()
    }

    #[test]
    fn rejects_inverted_interval() {
        let start = Utc.with_ymd_and_hms(2026, 3, 2, 10, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
        let err = TimeBlock::new("bad", BlockCategory::Work, start, end);
        assert!(matches!(
            err,
            Err(ValidationError::InvalidTimeRange { .. })
        ));
    }

    #[test]
    fn planned_minutes() {
        assert_eq!(block().planned_minutes(), 90);
    }

    #[test]
    fn task_toggle_round_trips() {
        let mut b = block();
        let id = b.add_task(BlockTask::new("outline", None)).id.clone();
        assert_eq!(b.toggle_task(&id), Some(true));
        assert_eq!(b.toggle_task(&id), Some(false));
        assert!(!b.task(&id).unwrap().completed);
    }

    #[test]
    fn block_completion_independent_of_tasks() {
        let mut b = block();
        b.add_task(BlockTask::new("left undone", None));
        assert!(b.toggle_completed());
        assert!(b.completed);
        assert!(!b.tasks[0].completed);
    }

    #[test]
    fn remove_task_keeps_siblings() {
        let mut b = block();
        let first = b.add_task(BlockTask::new("a", None)).id.clone();
        let second = b.add_task(BlockTask::new("b", None)).id.clone();
        b.toggle_task(&second);
        assert!(b.remove_task(&first));
        assert_eq!(b.tasks.len(), 1);
        assert!(b.task(&second).unwrap().completed);
    }

    #[test]
    fn empty_schedule_is_valid() {
        let s = DaySchedule::empty("user-1", NaiveDate::from_ymd_opt(2026, 3, 2).unwrap());
        assert!(s.blocks.is_empty());
        assert_eq!(s.owner, "user-1");
    }
}
