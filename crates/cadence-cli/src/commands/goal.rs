//! Goal and milestone management commands for CLI.

use clap::Subcommand;

use cadence_core::{Goal, GoalPriority, Milestone, Store};

#[derive(Subcommand)]
pub enum GoalAction {
    /// Create a new goal
    Create {
        /// Goal title
        title: String,
        /// Goal description
        #[arg(long)]
        description: Option<String>,
        /// Priority: low, medium or high (default: medium)
        #[arg(long, default_value = "medium")]
        priority: String,
        /// Category label
        #[arg(long)]
        category: Option<String>,
        /// Owner id
        #[arg(long, default_value = "local")]
        owner: String,
    },
    /// List goals
    List {
        #[arg(long, default_value = "local")]
        owner: String,
    },
    /// Get goal details, milestones and audit history included
    Get {
        /// Goal ID
        id: String,
        #[arg(long, default_value = "local")]
        owner: String,
    },
    /// Delete a goal
    Delete {
        /// Goal ID
        id: String,
        #[arg(long, default_value = "local")]
        owner: String,
    },
    /// Add a milestone to a goal
    MilestoneAdd {
        /// Goal ID
        goal_id: String,
        /// Milestone title
        title: String,
        #[arg(long, default_value = "local")]
        owner: String,
    },
    /// Mark a milestone complete (or incomplete with --undo)
    MilestoneComplete {
        /// Goal ID
        goal_id: String,
        /// Milestone ID
        milestone_id: String,
        /// Mark incomplete instead
        #[arg(long)]
        undo: bool,
        #[arg(long, default_value = "local")]
        owner: String,
    },
    /// Delete a milestone; siblings keep their state
    MilestoneDelete {
        /// Goal ID
        goal_id: String,
        /// Milestone ID
        milestone_id: String,
        #[arg(long, default_value = "local")]
        owner: String,
    },
}

fn parse_priority(priority: &str) -> GoalPriority {
    match priority {
        "low" => GoalPriority::Low,
        "high" => GoalPriority::High,
        _ => GoalPriority::Medium,
    }
}

fn load_goal(store: &Store, owner: &str, id: &str) -> Result<Goal, Box<dyn std::error::Error>> {
    Ok(store
        .get_goal(owner, id)?
        .ok_or(format!("goal not found: {id}"))?)
}

pub fn run(action: GoalAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = Store::open()?;

    match action {
        GoalAction::Create {
            title,
            description,
            priority,
            category,
            owner,
        } => {
            let mut goal = Goal::new(owner, title, parse_priority(&priority))?;
            if let Some(description) = description {
                goal.description = description;
            }
            if let Some(category) = category {
                goal.category = category;
            }
            store.create_goal(&goal)?;
            println!("{}", serde_json::to_string_pretty(&goal)?);
        }
        GoalAction::List { owner } => {
            let goals = store.list_goals(&owner)?;
            println!("{}", serde_json::to_string_pretty(&goals)?);
        }
        GoalAction::Get { id, owner } => {
            let goal = load_goal(&store, &owner, &id)?;
            println!("{}", serde_json::to_string_pretty(&goal)?);
        }
        GoalAction::Delete { id, owner } => {
            if store.delete_goal(&owner, &id)? {
                println!("goal deleted: {id}");
            } else {
                return Err(format!("goal not found: {id}").into());
            }
        }
        GoalAction::MilestoneAdd {
            goal_id,
            title,
            owner,
        } => {
            let mut goal = load_goal(&store, &owner, &goal_id)?;
            goal.add_milestone(Milestone::new(title, None));
            store.update_goal(&goal)?;
            println!("{}", serde_json::to_string_pretty(&goal)?);
        }
        GoalAction::MilestoneComplete {
            goal_id,
            milestone_id,
            undo,
            owner,
        } => {
            let mut goal = load_goal(&store, &owner, &goal_id)?;
            if !goal.set_milestone_completed(&milestone_id, !undo) {
                return Err(format!("milestone not found: {milestone_id}").into());
            }
            store.update_goal(&goal)?;
            println!("{}", serde_json::to_string_pretty(&goal)?);
        }
        GoalAction::MilestoneDelete {
            goal_id,
            milestone_id,
            owner,
        } => {
            let mut goal = load_goal(&store, &owner, &goal_id)?;
            if !goal.remove_milestone(&milestone_id) {
                return Err(format!("milestone not found: {milestone_id}").into());
            }
            store.update_goal(&goal)?;
            println!("{}", serde_json::to_string_pretty(&goal)?);
        }
    }
    Ok(())
}
