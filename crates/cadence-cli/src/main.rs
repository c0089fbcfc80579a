use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "cadence-cli", version, about = "Cadence CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the REST server
    Serve,
    /// Habit management
    Habit {
        #[command(subcommand)]
        action: commands::habit::HabitAction,
    },
    /// Goal and milestone management
    Goal {
        #[command(subcommand)]
        action: commands::goal::GoalAction,
    },
    /// Daily schedule management
    Schedule {
        #[command(subcommand)]
        action: commands::schedule::ScheduleAction,
    },
    /// Weekly metrics
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Bearer token management
    Token {
        #[command(subcommand)]
        action: commands::token::TokenAction,
    },
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Serve => commands::serve::run(),
        Commands::Habit { action } => commands::habit::run(action),
        Commands::Goal { action } => commands::goal::run(action),
        Commands::Schedule { action } => commands::schedule::run(action),
        Commands::Stats { action } => commands::stats::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Token { action } => commands::token::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
