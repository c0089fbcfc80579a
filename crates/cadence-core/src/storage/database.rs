//! SQLite-based storage for habits, schedules, goals, rewards, and the
//! points ledger.
//!
//! Owned child lists (tasks inside a time block, milestones and history on
//! a goal) are stored as JSON text columns and mutated only through their
//! parent row. Occurrence logs and the points ledger are append-only row
//! tables so derived values can always be recomputed from raw records.

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::data_dir;
use super::migrations;
use crate::goal::{Goal, GoalPriority, GoalStatus};
use crate::habit::{Habit, HabitPeriod, Occurrence};
use crate::rewards::{LedgerEntry, PointsReason, Reward};
use crate::schedule::{BlockCategory, DaySchedule, Stopwatch, TimeBlock};

// === Helper Functions ===

/// Parse block category from database string
fn parse_category(category_str: &str) -> BlockCategory {
    match category_str {
        "leisure" => BlockCategory::Leisure,
        "family_friends" => BlockCategory::FamilyFriends,
        "atelic" => BlockCategory::Atelic,
        _ => BlockCategory::Work,
    }
}

/// Parse habit period from database string
fn parse_period(period_str: &str) -> HabitPeriod {
    match period_str {
        "Weekly" => HabitPeriod::Weekly,
        _ => HabitPeriod::Daily,
    }
}

/// Format habit period for database storage
fn format_period(period: HabitPeriod) -> &'static str {
    match period {
        HabitPeriod::Daily => "Daily",
        HabitPeriod::Weekly => "Weekly",
    }
}

/// Parse goal priority from database string
fn parse_priority(priority_str: &str) -> GoalPriority {
    match priority_str {
        "low" => GoalPriority::Low,
        "high" => GoalPriority::High,
        _ => GoalPriority::Medium,
    }
}

/// Format goal priority for database storage
fn format_priority(priority: GoalPriority) -> &'static str {
    match priority {
        GoalPriority::Low => "low",
        GoalPriority::Medium => "medium",
        GoalPriority::High => "high",
    }
}

/// Parse goal status from database string
fn parse_status(status_str: &str) -> GoalStatus {
    match status_str {
        "in_progress" => GoalStatus::InProgress,
        "completed" => GoalStatus::Completed,
        _ => GoalStatus::NotStarted,
    }
}

/// Format goal status for database storage
fn format_status(status: GoalStatus) -> &'static str {
    match status {
        GoalStatus::NotStarted => "not_started",
        GoalStatus::InProgress => "in_progress",
        GoalStatus::Completed => "completed",
    }
}

/// Parse points reason from database string
fn parse_reason(reason_str: &str) -> PointsReason {
    match reason_str {
        "habit_completed" => PointsReason::HabitCompleted,
        "reward_redeemed" => PointsReason::RewardRedeemed,
        _ => PointsReason::BlockCompleted,
    }
}

/// Parse datetime from RFC3339 string with fallback to current time
fn parse_datetime_fallback(dt_str: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(dt_str)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn parse_optional_datetime(dt_str: Option<String>) -> Option<DateTime<Utc>> {
    dt_str.map(|s| parse_datetime_fallback(&s))
}

const DATE_FMT: &str = "%Y-%m-%d";

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FMT).to_string()
}

fn parse_date_fallback(date_str: &str) -> NaiveDate {
    NaiveDate::parse_from_str(date_str, DATE_FMT).unwrap_or_else(|_| Utc::now().date_naive())
}

/// Build a TimeBlock from a database row
/// (id, name, category, start_time, end_time, tasks, completed,
///  timer_accumulated_ms, timer_started_at_ms)
fn row_to_block(row: &rusqlite::Row) -> Result<TimeBlock, rusqlite::Error> {
    let category_str: String = row.get(2)?;
    let start_str: String = row.get(3)?;
    let end_str: String = row.get(4)?;
    let tasks_json: String = row.get(5)?;
    let accumulated_ms: i64 = row.get(7)?;
    let started_at_ms: Option<i64> = row.get(8)?;

    Ok(TimeBlock {
        id: row.get(0)?,
        name: row.get(1)?,
        category: parse_category(&category_str),
        start: parse_datetime_fallback(&start_str),
        end: parse_datetime_fallback(&end_str),
        tasks: serde_json::from_str(&tasks_json).unwrap_or_default(),
        completed: row.get(6)?,
        timer: Stopwatch::from_parts(
            accumulated_ms.max(0) as u64,
            started_at_ms.map(|ms| ms.max(0) as u64),
        ),
    })
}

/// Build a Habit from a database row
/// (id, owner, name, period, goal, created_at)
fn row_to_habit(row: &rusqlite::Row) -> Result<Habit, rusqlite::Error> {
    let period_str: String = row.get(3)?;
    let goal: i64 = row.get(4)?;
    let created_str: String = row.get(5)?;
    Ok(Habit {
        id: row.get(0)?,
        owner: row.get(1)?,
        name: row.get(2)?,
        period: parse_period(&period_str),
        goal: goal.max(0) as u32,
        created_at: parse_datetime_fallback(&created_str),
    })
}

/// Build a Goal from a database row
/// (id, owner, title, description, deadline, priority, category,
///  milestones, progress_pct, status, history, created_at, updated_at)
fn row_to_goal(row: &rusqlite::Row) -> Result<Goal, rusqlite::Error> {
    let priority_str: String = row.get(5)?;
    let status_str: String = row.get(9)?;
    let milestones_json: String = row.get(7)?;
    let history_json: String = row.get(10)?;
    let created_str: String = row.get(11)?;
    let updated_str: String = row.get(12)?;
    Ok(Goal {
        id: row.get(0)?,
        owner: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        deadline: parse_optional_datetime(row.get(4)?),
        priority: parse_priority(&priority_str),
        category: row.get(6)?,
        milestones: serde_json::from_str(&milestones_json).unwrap_or_default(),
        progress_pct: row.get(8)?,
        status: parse_status(&status_str),
        history: serde_json::from_str(&history_json).unwrap_or_default(),
        created_at: parse_datetime_fallback(&created_str),
        updated_at: parse_datetime_fallback(&updated_str),
    })
}

/// Build a Reward from a database row
/// (id, owner, name, description, cost_points, redeemed, redeemed_at, created_at)
fn row_to_reward(row: &rusqlite::Row) -> Result<Reward, rusqlite::Error> {
    let created_str: String = row.get(7)?;
    Ok(Reward {
        id: row.get(0)?,
        owner: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        cost_points: row.get(4)?,
        redeemed: row.get(5)?,
        redeemed_at: parse_optional_datetime(row.get(6)?),
        created_at: parse_datetime_fallback(&created_str),
    })
}

/// SQLite database for all persisted application state.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open the database at `~/.config/cadence/cadence.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, Box<dyn std::error::Error>> {
        let path = data_dir()?.join("cadence.db");
        Self::open_at(&path)
    }

    /// Open the database at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, Box<dyn std::error::Error>> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        // Create base tables (v1 schema) first
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS habits (
                id         TEXT PRIMARY KEY,
                owner      TEXT NOT NULL,
                name       TEXT NOT NULL,
                period     TEXT NOT NULL,
                goal       INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS habit_occurrences (
                id       INTEGER PRIMARY KEY AUTOINCREMENT,
                habit_id TEXT NOT NULL,
                at       TEXT NOT NULL,
                count    INTEGER NOT NULL DEFAULT 1
            );

            CREATE TABLE IF NOT EXISTS schedules (
                id    TEXT PRIMARY KEY,
                owner TEXT NOT NULL,
                date  TEXT NOT NULL,
                UNIQUE(owner, date)
            );

            CREATE TABLE IF NOT EXISTS time_blocks (
                id                   TEXT PRIMARY KEY,
                schedule_id          TEXT NOT NULL,
                name                 TEXT NOT NULL,
                category             TEXT NOT NULL,
                start_time           TEXT NOT NULL,
                end_time             TEXT NOT NULL,
                tasks                TEXT NOT NULL DEFAULT '[]',
                completed            INTEGER NOT NULL DEFAULT 0,
                timer_accumulated_ms INTEGER NOT NULL DEFAULT 0,
                timer_started_at_ms  INTEGER
            );

            CREATE TABLE IF NOT EXISTS goals (
                id           TEXT PRIMARY KEY,
                owner        TEXT NOT NULL,
                title        TEXT NOT NULL,
                description  TEXT NOT NULL DEFAULT '',
                deadline     TEXT,
                priority     TEXT NOT NULL,
                category     TEXT NOT NULL DEFAULT '',
                milestones   TEXT NOT NULL DEFAULT '[]',
                progress_pct REAL NOT NULL DEFAULT 0,
                status       TEXT NOT NULL,
                history      TEXT NOT NULL DEFAULT '[]',
                created_at   TEXT NOT NULL,
                updated_at   TEXT NOT NULL
            );

            -- Indexes for common query patterns
            CREATE INDEX IF NOT EXISTS idx_habits_owner ON habits(owner);
            CREATE INDEX IF NOT EXISTS idx_habit_occurrences_habit_at
                ON habit_occurrences(habit_id, at);
            CREATE INDEX IF NOT EXISTS idx_time_blocks_schedule ON time_blocks(schedule_id);
            CREATE INDEX IF NOT EXISTS idx_goals_owner ON goals(owner);",
        )?;

        // Run incremental migrations (v1 -> v2, etc.)
        migrations::migrate(&self.conn)?;

        Ok(())
    }

    // === Habit CRUD ===

    /// Create a new habit.
    pub fn create_habit(&self, habit: &Habit) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT INTO habits (id, owner, name, period, goal, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                habit.id,
                habit.owner,
                habit.name,
                format_period(habit.period),
                habit.goal,
                habit.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn list_habits(&self, owner: &str) -> Result<Vec<Habit>, rusqlite::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT id, owner, name, period, goal, created_at
             FROM habits WHERE owner = ?1 ORDER BY created_at ASC",
        )?;
        let rows = stmt.query_map(params![owner], row_to_habit)?;
        rows.collect()
    }

    pub fn get_habit(&self, owner: &str, id: &str) -> Result<Option<Habit>, rusqlite::Error> {
        self.conn
            .query_row(
                "SELECT id, owner, name, period, goal, created_at
                 FROM habits WHERE owner = ?1 AND id = ?2",
                params![owner, id],
                row_to_habit,
            )
            .optional()
    }

    /// Update a habit's mutable fields. Returns `false` if absent.
    pub fn update_habit(&self, habit: &Habit) -> Result<bool, rusqlite::Error> {
        let changed = self.conn.execute(
            "UPDATE habits SET name = ?3, period = ?4, goal = ?5
             WHERE owner = ?1 AND id = ?2",
            params![
                habit.owner,
                habit.id,
                habit.name,
                format_period(habit.period),
                habit.goal,
            ],
        )?;
        Ok(changed > 0)
    }

    /// Delete a habit and its occurrence log. Returns `false` if absent.
    pub fn delete_habit(&self, owner: &str, id: &str) -> Result<bool, rusqlite::Error> {
        let changed = self
            .conn
            .execute("DELETE FROM habits WHERE owner = ?1 AND id = ?2", params![owner, id])?;
        if changed > 0 {
            self.conn.execute(
                "DELETE FROM habit_occurrences WHERE habit_id = ?1",
                params![id],
            )?;
        }
        Ok(changed > 0)
    }

    /// Append one completion occurrence to a habit's log.
    pub fn record_occurrence(
        &self,
        habit_id: &str,
        occurrence: &Occurrence,
    ) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT INTO habit_occurrences (habit_id, at, count) VALUES (?1, ?2, ?3)",
            params![habit_id, occurrence.at.to_rfc3339(), occurrence.count],
        )?;
        Ok(())
    }

    /// Full occurrence log for a habit, oldest first.
    pub fn occurrences(&self, habit_id: &str) -> Result<Vec<Occurrence>, rusqlite::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT at, count FROM habit_occurrences WHERE habit_id = ?1 ORDER BY at ASC",
        )?;
        let rows = stmt.query_map(params![habit_id], |row| {
            let at_str: String = row.get(0)?;
            let count: i64 = row.get(1)?;
            Ok(Occurrence {
                at: parse_datetime_fallback(&at_str),
                count: count.max(0) as u32,
            })
        })?;
        rows.collect()
    }

    /// All of an owner's habits paired with their occurrence logs.
    pub fn habits_with_logs(
        &self,
        owner: &str,
    ) -> Result<Vec<(Habit, Vec<Occurrence>)>, rusqlite::Error> {
        let habits = self.list_habits(owner)?;
        let mut out = Vec::with_capacity(habits.len());
        for habit in habits {
            let log = self.occurrences(&habit.id)?;
            out.push((habit, log));
        }
        Ok(out)
    }

    // === Schedule CRUD ===

    /// Load the schedule for a day, creating an empty one on first access.
    pub fn schedule_for_day(
        &self,
        owner: &str,
        date: NaiveDate,
    ) -> Result<DaySchedule, rusqlite::Error> {
        let date_str = format_date(date);
        let existing: Option<String> = self
            .conn
            .query_row(
                "SELECT id FROM schedules WHERE owner = ?1 AND date = ?2",
                params![owner, date_str],
                |row| row.get(0),
            )
            .optional()?;

        let schedule_id = match existing {
            Some(id) => id,
            None => {
                let id = Uuid::new_v4().to_string();
                self.conn.execute(
                    "INSERT INTO schedules (id, owner, date) VALUES (?1, ?2, ?3)",
                    params![id, owner, date_str],
                )?;
                id
            }
        };

        let mut stmt = self.conn.prepare(
            "SELECT id, name, category, start_time, end_time, tasks, completed,
                    timer_accumulated_ms, timer_started_at_ms
             FROM time_blocks WHERE schedule_id = ?1 ORDER BY start_time ASC",
        )?;
        let blocks: Vec<TimeBlock> = stmt
            .query_map(params![schedule_id], row_to_block)?
            .collect::<Result<_, _>>()?;

        Ok(DaySchedule {
            id: schedule_id,
            owner: owner.to_string(),
            date,
            blocks,
        })
    }

    /// Insert a block into a schedule.
    pub fn insert_block(
        &self,
        schedule_id: &str,
        block: &TimeBlock,
    ) -> Result<(), rusqlite::Error> {
        let tasks_json = serde_json::to_string(&block.tasks).unwrap();
        self.conn.execute(
            "INSERT INTO time_blocks (
                id, schedule_id, name, category, start_time, end_time,
                tasks, completed, timer_accumulated_ms, timer_started_at_ms
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                block.id,
                schedule_id,
                block.name,
                block.category.as_str(),
                block.start.to_rfc3339(),
                block.end.to_rfc3339(),
                tasks_json,
                block.completed,
                block.timer.accumulated_ms() as i64,
                block.timer.started_at_epoch_ms().map(|ms| ms as i64),
            ],
        )?;
        Ok(())
    }

    /// Load a block by id, scoped to its owner.
    pub fn get_block(&self, owner: &str, block_id: &str) -> Result<Option<TimeBlock>, rusqlite::Error> {
        self.conn
            .query_row(
                "SELECT b.id, b.name, b.category, b.start_time, b.end_time, b.tasks,
                        b.completed, b.timer_accumulated_ms, b.timer_started_at_ms
                 FROM time_blocks b
                 JOIN schedules s ON b.schedule_id = s.id
                 WHERE b.id = ?1 AND s.owner = ?2",
                params![block_id, owner],
                row_to_block,
            )
            .optional()
    }

    /// Persist a block's current state. Returns `false` if absent.
    pub fn update_block(&self, owner: &str, block: &TimeBlock) -> Result<bool, rusqlite::Error> {
        let tasks_json = serde_json::to_string(&block.tasks).unwrap();
        let changed = self.conn.execute(
            "UPDATE time_blocks SET
                name = ?3, category = ?4, start_time = ?5, end_time = ?6,
                tasks = ?7, completed = ?8, timer_accumulated_ms = ?9,
                timer_started_at_ms = ?10
             WHERE id = ?1
               AND schedule_id IN (SELECT id FROM schedules WHERE owner = ?2)",
            params![
                block.id,
                owner,
                block.name,
                block.category.as_str(),
                block.start.to_rfc3339(),
                block.end.to_rfc3339(),
                tasks_json,
                block.completed,
                block.timer.accumulated_ms() as i64,
                block.timer.started_at_epoch_ms().map(|ms| ms as i64),
            ],
        )?;
        Ok(changed > 0)
    }

    /// Delete a block. Returns `false` if absent.
    pub fn delete_block(&self, owner: &str, block_id: &str) -> Result<bool, rusqlite::Error> {
        let changed = self.conn.execute(
            "DELETE FROM time_blocks
             WHERE id = ?1
               AND schedule_id IN (SELECT id FROM schedules WHERE owner = ?2)",
            params![block_id, owner],
        )?;
        Ok(changed > 0)
    }

    /// All of an owner's blocks whose schedule date falls in [from, to].
    pub fn blocks_in_window(
        &self,
        owner: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<TimeBlock>, rusqlite::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT b.id, b.name, b.category, b.start_time, b.end_time, b.tasks,
                    b.completed, b.timer_accumulated_ms, b.timer_started_at_ms
             FROM time_blocks b
             JOIN schedules s ON b.schedule_id = s.id
             WHERE s.owner = ?1 AND s.date >= ?2 AND s.date <= ?3
             ORDER BY b.start_time ASC",
        )?;
        let rows = stmt.query_map(
            params![owner, format_date(from), format_date(to)],
            row_to_block,
        )?;
        rows.collect()
    }

    // === Goal CRUD ===

    /// Create a new goal.
    pub fn create_goal(&self, goal: &Goal) -> Result<(), rusqlite::Error> {
        let milestones_json = serde_json::to_string(&goal.milestones).unwrap();
        let history_json = serde_json::to_string(&goal.history).unwrap();
        self.conn.execute(
            "INSERT INTO goals (
                id, owner, title, description, deadline, priority, category,
                milestones, progress_pct, status, history, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                goal.id,
                goal.owner,
                goal.title,
                goal.description,
                goal.deadline.map(|d| d.to_rfc3339()),
                format_priority(goal.priority),
                goal.category,
                milestones_json,
                goal.progress_pct,
                format_status(goal.status),
                history_json,
                goal.created_at.to_rfc3339(),
                goal.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn list_goals(&self, owner: &str) -> Result<Vec<Goal>, rusqlite::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT id, owner, title, description, deadline, priority, category,
                    milestones, progress_pct, status, history, created_at, updated_at
             FROM goals WHERE owner = ?1 ORDER BY created_at ASC",
        )?;
        let rows = stmt.query_map(params![owner], row_to_goal)?;
        rows.collect()
    }

    pub fn get_goal(&self, owner: &str, id: &str) -> Result<Option<Goal>, rusqlite::Error> {
        self.conn
            .query_row(
                "SELECT id, owner, title, description, deadline, priority, category,
                        milestones, progress_pct, status, history, created_at, updated_at
                 FROM goals WHERE owner = ?1 AND id = ?2",
                params![owner, id],
                row_to_goal,
            )
            .optional()
    }

    /// Persist a goal's current state, milestones and history included.
    /// Returns `false` if absent.
    pub fn update_goal(&self, goal: &Goal) -> Result<bool, rusqlite::Error> {
        let milestones_json = serde_json::to_string(&goal.milestones).unwrap();
        let history_json = serde_json::to_string(&goal.history).unwrap();
        let changed = self.conn.execute(
            "UPDATE goals SET
                title = ?3, description = ?4, deadline = ?5, priority = ?6,
                category = ?7, milestones = ?8, progress_pct = ?9, status = ?10,
                history = ?11, updated_at = ?12
             WHERE owner = ?1 AND id = ?2",
            params![
                goal.owner,
                goal.id,
                goal.title,
                goal.description,
                goal.deadline.map(|d| d.to_rfc3339()),
                format_priority(goal.priority),
                goal.category,
                milestones_json,
                goal.progress_pct,
                format_status(goal.status),
                history_json,
                goal.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(changed > 0)
    }

    pub fn delete_goal(&self, owner: &str, id: &str) -> Result<bool, rusqlite::Error> {
        let changed = self
            .conn
            .execute("DELETE FROM goals WHERE owner = ?1 AND id = ?2", params![owner, id])?;
        Ok(changed > 0)
    }

    // === Reward CRUD ===

    /// Create a new reward.
    pub fn create_reward(&self, reward: &Reward) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT INTO rewards (
                id, owner, name, description, cost_points, redeemed, redeemed_at, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                reward.id,
                reward.owner,
                reward.name,
                reward.description,
                reward.cost_points,
                reward.redeemed,
                reward.redeemed_at.map(|d| d.to_rfc3339()),
                reward.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn list_rewards(&self, owner: &str) -> Result<Vec<Reward>, rusqlite::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT id, owner, name, description, cost_points, redeemed, redeemed_at, created_at
             FROM rewards WHERE owner = ?1 ORDER BY created_at ASC",
        )?;
        let rows = stmt.query_map(params![owner], row_to_reward)?;
        rows.collect()
    }

    pub fn get_reward(&self, owner: &str, id: &str) -> Result<Option<Reward>, rusqlite::Error> {
        self.conn
            .query_row(
                "SELECT id, owner, name, description, cost_points, redeemed, redeemed_at, created_at
                 FROM rewards WHERE owner = ?1 AND id = ?2",
                params![owner, id],
                row_to_reward,
            )
            .optional()
    }

    /// Persist a reward's current state. Returns `false` if absent.
    pub fn update_reward(&self, reward: &Reward) -> Result<bool, rusqlite::Error> {
        let changed = self.conn.execute(
            "UPDATE rewards SET
                name = ?3, description = ?4, cost_points = ?5, redeemed = ?6, redeemed_at = ?7
             WHERE owner = ?1 AND id = ?2",
            params![
                reward.owner,
                reward.id,
                reward.name,
                reward.description,
                reward.cost_points,
                reward.redeemed,
                reward.redeemed_at.map(|d| d.to_rfc3339()),
            ],
        )?;
        Ok(changed > 0)
    }

    pub fn delete_reward(&self, owner: &str, id: &str) -> Result<bool, rusqlite::Error> {
        let changed = self
            .conn
            .execute("DELETE FROM rewards WHERE owner = ?1 AND id = ?2", params![owner, id])?;
        Ok(changed > 0)
    }

    // === Points ledger ===

    /// Append a signed entry to the points ledger.
    pub fn append_points(&self, entry: &LedgerEntry) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT INTO points_ledger (owner, delta, reason, at) VALUES (?1, ?2, ?3, ?4)",
            params![
                entry.owner,
                entry.delta,
                entry.reason.as_str(),
                entry.at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Balance is always the sum of the ledger.
    pub fn points_balance(&self, owner: &str) -> Result<i64, rusqlite::Error> {
        self.conn.query_row(
            "SELECT COALESCE(SUM(delta), 0) FROM points_ledger WHERE owner = ?1",
            params![owner],
            |row| row.get(0),
        )
    }

    /// Full ledger for an owner, oldest first.
    pub fn points_ledger(&self, owner: &str) -> Result<Vec<LedgerEntry>, rusqlite::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT owner, delta, reason, at FROM points_ledger
             WHERE owner = ?1 ORDER BY at ASC, id ASC",
        )?;
        let rows = stmt.query_map(params![owner], |row| {
            let reason_str: String = row.get(2)?;
            let at_str: String = row.get(3)?;
            Ok(LedgerEntry {
                owner: row.get(0)?,
                delta: row.get(1)?,
                reason: parse_reason(&reason_str),
                at: parse_datetime_fallback(&at_str),
            })
        })?;
        rows.collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::BlockTask;
    use chrono::TimeZone;

    fn store() -> Store {
        Store::open_memory().unwrap()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
    }

    fn sample_block() -> TimeBlock {
        let start = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2026, 3, 2, 11, 0, 0).unwrap();
        TimeBlock::new("Deep work", BlockCategory::Work, start, end).unwrap()
    }

    #[test]
    fn habit_crud_round_trip() {
        let db = store();
        let habit = Habit::new("user-1", "Read", HabitPeriod::Daily, 1);
        db.create_habit(&habit).unwrap();

        let listed = db.list_habits("user-1").unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "Read");

        // Scoped to owner.
        assert!(db.get_habit("user-2", &habit.id).unwrap().is_none());

        let mut updated = habit.clone();
        updated.goal = 3;
        assert!(db.update_habit(&updated).unwrap());
        assert_eq!(db.get_habit("user-1", &habit.id).unwrap().unwrap().goal, 3);

        assert!(db.delete_habit("user-1", &habit.id).unwrap());
        assert!(db.list_habits("user-1").unwrap().is_empty());
    }

    #[test]
    fn occurrences_are_append_only_rows() {
        let db = store();
        let habit = Habit::new("user-1", "Read", HabitPeriod::Daily, 1);
        db.create_habit(&habit).unwrap();
        let occ = Occurrence {
            at: Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).unwrap(),
            count: 2,
        };
        db.record_occurrence(&habit.id, &occ).unwrap();
        db.record_occurrence(&habit.id, &occ).unwrap();

        let log = db.occurrences(&habit.id).unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].count, 2);
    }

    #[test]
    fn fresh_day_yields_empty_schedule() {
        let db = store();
        let schedule = db.schedule_for_day("user-1", date()).unwrap();
        assert!(schedule.blocks.is_empty());

        // Second access returns the same lazily created document.
        let again = db.schedule_for_day("user-1", date()).unwrap();
        assert_eq!(schedule.id, again.id);
    }

    #[test]
    fn block_round_trip_preserves_tasks_and_timer() {
        let db = store();
        let schedule = db.schedule_for_day("user-1", date()).unwrap();

        let mut block = sample_block();
        block.add_task(BlockTask::new("outline", None));
        block.timer.start_at(1_000);
        block.timer.stop_at(61_000);
        db.insert_block(&schedule.id, &block).unwrap();

        let loaded = db.get_block("user-1", &block.id).unwrap().unwrap();
        assert_eq!(loaded.tasks.len(), 1);
        assert_eq!(loaded.timer.accumulated_ms(), 60_000);
        assert!(!loaded.timer.is_running());

        // Other owners cannot see it.
        assert!(db.get_block("user-2", &block.id).unwrap().is_none());
    }

    #[test]
    fn update_block_is_owner_scoped() {
        let db = store();
        let schedule = db.schedule_for_day("user-1", date()).unwrap();
        let mut block = sample_block();
        db.insert_block(&schedule.id, &block).unwrap();

        block.completed = true;
        assert!(db.update_block("user-1", &block).unwrap());
        assert!(!db.update_block("user-2", &block).unwrap());
        assert!(db.get_block("user-1", &block.id).unwrap().unwrap().completed);
    }

    #[test]
    fn blocks_in_window_joins_on_schedule_date() {
        let db = store();
        let inside = db.schedule_for_day("user-1", date()).unwrap();
        let outside = db
            .schedule_for_day("user-1", NaiveDate::from_ymd_opt(2026, 1, 1).unwrap())
            .unwrap();
        db.insert_block(&inside.id, &sample_block()).unwrap();
        db.insert_block(&outside.id, &sample_block()).unwrap();

        let window = db
            .blocks_in_window(
                "user-1",
                NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
                NaiveDate::from_ymd_opt(2026, 3, 7).unwrap(),
            )
            .unwrap();
        assert_eq!(window.len(), 1);
    }

    #[test]
    fn goal_round_trip_preserves_milestones_and_history() {
        let db = store();
        let mut goal =
            Goal::new("user-1", "Ship", crate::goal::GoalPriority::High).unwrap();
        let mid = goal.add_milestone(crate::goal::Milestone::new("draft", None));
        goal.set_milestone_completed(&mid, true);
        db.create_goal(&goal).unwrap();

        let loaded = db.get_goal("user-1", &goal.id).unwrap().unwrap();
        assert_eq!(loaded.milestones.len(), 1);
        assert!(loaded.milestones[0].completed);
        assert_eq!(loaded.status, GoalStatus::Completed);
        assert!(loaded.history.len() >= 3);

        assert!(db.delete_goal("user-1", &goal.id).unwrap());
        assert!(db.get_goal("user-1", &goal.id).unwrap().is_none());
    }

    #[test]
    fn points_balance_sums_ledger() {
        let db = store();
        let now = Utc::now();
        for (delta, reason) in [
            (10, PointsReason::BlockCompleted),
            (5, PointsReason::HabitCompleted),
            (-8, PointsReason::RewardRedeemed),
        ] {
            db.append_points(&LedgerEntry {
                owner: "user-1".to_string(),
                delta,
                reason,
                at: now,
            })
            .unwrap();
        }
        assert_eq!(db.points_balance("user-1").unwrap(), 7);
        assert_eq!(db.points_balance("user-2").unwrap(), 0);
        assert_eq!(db.points_ledger("user-1").unwrap().len(), 3);
    }

    #[test]
    fn reward_crud_round_trip() {
        let db = store();
        let mut reward = Reward::new("user-1", "Movie night", 30).unwrap();
        db.create_reward(&reward).unwrap();

        reward.redeem(50).unwrap();
        assert!(db.update_reward(&reward).unwrap());

        let loaded = db.get_reward("user-1", &reward.id).unwrap().unwrap();
        assert!(loaded.redeemed);
        assert!(loaded.redeemed_at.is_some());

        assert!(db.delete_reward("user-1", &reward.id).unwrap());
        assert!(db.list_rewards("user-1").unwrap().is_empty());
    }
}
