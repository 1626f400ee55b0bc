use clap::{ArgAction, Parser, Subcommand};

mod commands;
mod logging;
mod tui;

#[derive(Parser)]
#[command(
    name = "vow",
    version,
    disable_version_flag = true,
    about = "A focus timer that keeps you to your word"
)]
struct Cli {
    /// Print version
    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    version: Option<bool>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Insert the built-in subjects, quotes and poems (safe to repeat)
    Seed,
    /// Print session statistics as JSON
    Stats,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    logging::init();

    let result = match cli.command {
        None => tui::run(),
        Some(Commands::Seed) => commands::seed::run(),
        Some(Commands::Stats) => commands::stats::run(),
        Some(Commands::Config { action }) => commands::config::run(action),
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "exiting");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
