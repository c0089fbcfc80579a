//! Habit management commands for CLI.

use chrono::Utc;
use clap::Subcommand;

use cadence_core::habit::streak;
use cadence_core::{
    Habit, HabitPeriod, LedgerEntry, Occurrence, PointsReason, Store, POINTS_PER_HABIT_COUNT,
};

#[derive(Subcommand)]
pub enum HabitAction {
    /// Create a new habit
    Create {
        /// Habit name
        name: String,
        /// Period: daily or weekly (default: daily)
        #[arg(long, default_value = "daily")]
        period: String,
        /// Completions required per period (default: 1)
        #[arg(long, default_value = "1")]
        goal: u32,
        /// Owner id
        #[arg(long, default_value = "local")]
        owner: String,
    },
    /// List habits
    List {
        #[arg(long, default_value = "local")]
        owner: String,
    },
    /// Log a completion occurrence
    Complete {
        /// Habit ID
        id: String,
        /// Completion count (default: 1)
        #[arg(long, default_value = "1")]
        count: u32,
        #[arg(long, default_value = "local")]
        owner: String,
    },
    /// Update a habit
    Update {
        /// Habit ID
        id: String,
        /// New name
        #[arg(long)]
        name: Option<String>,
        /// New period: daily or weekly
        #[arg(long)]
        period: Option<String>,
        /// New per-period goal
        #[arg(long)]
        goal: Option<u32>,
        #[arg(long, default_value = "local")]
        owner: String,
    },
    /// Delete a habit and its occurrence log
    Delete {
        /// Habit ID
        id: String,
        #[arg(long, default_value = "local")]
        owner: String,
    },
    /// Show the derived streak/consistency report
    Streak {
        /// Habit ID
        id: String,
        #[arg(long, default_value = "local")]
        owner: String,
    },
}

fn parse_period(period: &str) -> HabitPeriod {
    match period {
        "weekly" => HabitPeriod::Weekly,
        _ => HabitPeriod::Daily,
    }
}

pub fn run(action: HabitAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = Store::open()?;

    match action {
        HabitAction::Create {
            name,
            period,
            goal,
            owner,
        } => {
            let habit = Habit::new(owner, name, parse_period(&period), goal);
            store.create_habit(&habit)?;
            println!("{}", serde_json::to_string_pretty(&habit)?);
        }
        HabitAction::List { owner } => {
            let habits = store.list_habits(&owner)?;
            println!("{}", serde_json::to_string_pretty(&habits)?);
        }
        HabitAction::Complete { id, count, owner } => {
            let habit = store
                .get_habit(&owner, &id)?
                .ok_or(format!("habit not found: {id}"))?;
            let now = Utc::now();
            store.record_occurrence(&habit.id, &Occurrence { at: now, count })?;
            store.append_points(&LedgerEntry {
                owner: owner.clone(),
                delta: POINTS_PER_HABIT_COUNT * count as i64,
                reason: PointsReason::HabitCompleted,
                at: now,
            })?;

            let log = store.occurrences(&habit.id)?;
            let report = streak::report(
                &habit,
                &log,
                streak::default_window(habit.period),
                now.date_naive(),
            );
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        HabitAction::Update {
            id,
            name,
            period,
            goal,
            owner,
        } => {
            let mut habit = store
                .get_habit(&owner, &id)?
                .ok_or(format!("habit not found: {id}"))?;
            if let Some(name) = name {
                habit.name = name;
            }
            if let Some(period) = period {
                habit.period = parse_period(&period);
            }
            if let Some(goal) = goal {
                habit.goal = goal;
            }
            store.update_habit(&habit)?;
            println!("{}", serde_json::to_string_pretty(&habit)?);
        }
        HabitAction::Delete { id, owner } => {
            if store.delete_habit(&owner, &id)? {
                println!("habit deleted: {id}");
            } else {
                return Err(format!("habit not found: {id}").into());
            }
        }
        HabitAction::Streak { id, owner } => {
            let habit = store
                .get_habit(&owner, &id)?
                .ok_or(format!("habit not found: {id}"))?;
            let log = store.occurrences(&habit.id)?;
            let report = streak::report(
                &habit,
                &log,
                streak::default_window(habit.period),
                Utc::now().date_naive(),
            );
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}
