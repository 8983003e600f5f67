//! salespipe - CLI for the daily sales pipeline

mod commands;
mod error;

use clap::{Parser, Subcommand};

use commands::dashboard::DashboardArgs;
use commands::run::RunArgs;

#[derive(Parser)]
#[command(
    name = "salespipe",
    version,
    about = "Run the daily sales pipeline and render its dashboard"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline end to end for one invocation
    Run(RunArgs),
    /// Render run history and the latest regional breakdown
    Dashboard(DashboardArgs),
}

fn main() {
    tracing_subscriber::fmt().with_target(false).init();

    let cli = Cli::parse();
    let result = match &cli.command {
        Commands::Run(args) => commands::run::handle_run(args),
        Commands::Dashboard(args) => commands::dashboard::handle_dashboard(args),
    };

    if let Err(err) = result {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
