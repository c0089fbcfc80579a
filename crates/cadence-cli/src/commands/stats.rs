use chrono::{Duration, NaiveDate, Utc};
use clap::Subcommand;

use cadence_core::metrics::{weekly_metrics, WINDOW_DAYS};
use cadence_core::Store;

#[derive(Subcommand)]
pub enum StatsAction {
    /// Weekly metrics over the trailing 7 days
    Weekly {
        /// Window end date (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Owner id
        #[arg(long, default_value = "local")]
        owner: String,
    },
    /// Points balance and ledger
    Points {
        #[arg(long, default_value = "local")]
        owner: String,
    },
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = Store::open()?;

    match action {
        StatsAction::Weekly { date, owner } => {
            let today = date.unwrap_or_else(|| Utc::now().date_naive());
            let from = today - Duration::days(WINDOW_DAYS - 1);
            let blocks = store.blocks_in_window(&owner, from, today)?;
            let habits = store.habits_with_logs(&owner)?;
            let metrics = weekly_metrics(&blocks, &habits, today);
            println!("{}", serde_json::to_string_pretty(&metrics)?);
        }
        StatsAction::Points { owner } => {
            let balance = store.points_balance(&owner)?;
            let ledger = store.points_ledger(&owner)?;
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "balance": balance,
                    "ledger": ledger,
                }))?
            );
        }
    }
    Ok(())
}
