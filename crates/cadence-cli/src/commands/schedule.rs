//! Daily schedule commands: time blocks, tasks and the block stopwatch.

use chrono::{DateTime, NaiveDate, Utc};
use clap::Subcommand;

use cadence_core::{
    BlockCategory, BlockTask, LedgerEntry, PointsReason, Store, TimeBlock, POINTS_PER_BLOCK,
};

#[derive(Subcommand)]
pub enum ScheduleAction {
    /// Show a day's schedule (today by default)
    Show {
        /// Date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Owner id
        #[arg(long, default_value = "local")]
        owner: String,
    },
    /// Add a time block to the day its start falls on
    AddBlock {
        /// Block name
        name: String,
        /// Category: work, leisure, family_friends or atelic
        #[arg(long, default_value = "work")]
        category: String,
        /// Start (RFC3339, e.g. 2026-03-02T09:00:00Z)
        #[arg(long)]
        start: DateTime<Utc>,
        /// End (RFC3339)
        #[arg(long)]
        end: DateTime<Utc>,
        #[arg(long, default_value = "local")]
        owner: String,
    },
    /// Toggle a block's completion flag
    CompleteBlock {
        /// Block ID
        id: String,
        #[arg(long, default_value = "local")]
        owner: String,
    },
    /// Delete a time block
    DeleteBlock {
        /// Block ID
        id: String,
        #[arg(long, default_value = "local")]
        owner: String,
    },
    /// Start a block's stopwatch
    StartTimer {
        /// Block ID
        id: String,
        #[arg(long, default_value = "local")]
        owner: String,
    },
    /// Stop a block's stopwatch and persist the accumulated duration
    StopTimer {
        /// Block ID
        id: String,
        #[arg(long, default_value = "local")]
        owner: String,
    },
    /// Add a task to a block
    AddTask {
        /// Block ID
        block_id: String,
        /// Task name
        name: String,
        /// Habit this task contributes to
        #[arg(long)]
        habit_id: Option<String>,
        #[arg(long, default_value = "local")]
        owner: String,
    },
    /// Toggle a task's completion flag
    ToggleTask {
        /// Block ID
        block_id: String,
        /// Task ID
        task_id: String,
        #[arg(long, default_value = "local")]
        owner: String,
    },
}

fn parse_category(category: &str) -> BlockCategory {
    match category {
        "leisure" => BlockCategory::Leisure,
        "family_friends" => BlockCategory::FamilyFriends,
        "atelic" => BlockCategory::Atelic,
        _ => BlockCategory::Work,
    }
}

fn load_block(
    store: &Store,
    owner: &str,
    id: &str,
) -> Result<TimeBlock, Box<dyn std::error::Error>> {
    Ok(store
        .get_block(owner, id)?
        .ok_or(format!("time block not found: {id}"))?)
}

pub fn run(action: ScheduleAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = Store::open()?;

    match action {
        ScheduleAction::Show { date, owner } => {
            let date = date.unwrap_or_else(|| Utc::now().date_naive());
            let schedule = store.schedule_for_day(&owner, date)?;
            println!("{}", serde_json::to_string_pretty(&schedule)?);
        }
        ScheduleAction::AddBlock {
            name,
            category,
            start,
            end,
            owner,
        } => {
            let block = TimeBlock::new(name, parse_category(&category), start, end)?;
            let schedule = store.schedule_for_day(&owner, block.start.date_naive())?;
            store.insert_block(&schedule.id, &block)?;
            println!("{}", serde_json::to_string_pretty(&block)?);
        }
        ScheduleAction::CompleteBlock { id, owner } => {
            let mut block = load_block(&store, &owner, &id)?;
            block.toggle_completed();
            if block.completed {
                store.append_points(&LedgerEntry {
                    owner: owner.clone(),
                    delta: POINTS_PER_BLOCK,
                    reason: PointsReason::BlockCompleted,
                    at: Utc::now(),
                })?;
            }
            store.update_block(&owner, &block)?;
            println!("{}", serde_json::to_string_pretty(&block)?);
        }
        ScheduleAction::DeleteBlock { id, owner } => {
            if store.delete_block(&owner, &id)? {
                println!("time block deleted: {id}");
            } else {
                return Err(format!("time block not found: {id}").into());
            }
        }
        ScheduleAction::StartTimer { id, owner } => {
            let mut block = load_block(&store, &owner, &id)?;
            if !block.timer.start() {
                println!("timer already running");
            }
            store.update_block(&owner, &block)?;
            println!("{}", serde_json::to_string_pretty(&block)?);
        }
        ScheduleAction::StopTimer { id, owner } => {
            let mut block = load_block(&store, &owner, &id)?;
            match block.timer.stop() {
                Some(total) => println!("accumulated: {total} ms"),
                None => println!("timer not running"),
            }
            store.update_block(&owner, &block)?;
            println!("{}", serde_json::to_string_pretty(&block)?);
        }
        ScheduleAction::AddTask {
            block_id,
            name,
            habit_id,
            owner,
        } => {
            let mut block = load_block(&store, &owner, &block_id)?;
            block.add_task(BlockTask::new(name, habit_id));
            store.update_block(&owner, &block)?;
            println!("{}", serde_json::to_string_pretty(&block)?);
        }
        ScheduleAction::ToggleTask {
            block_id,
            task_id,
            owner,
        } => {
            let mut block = load_block(&store, &owner, &block_id)?;
            if block.toggle_task(&task_id).is_none() {
                return Err(format!("task not found: {task_id}").into());
            }
            store.update_block(&owner, &block)?;
            println!("{}", serde_json::to_string_pretty(&block)?);
        }
    }
    Ok(())
}
