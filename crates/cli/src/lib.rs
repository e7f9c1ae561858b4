pub mod commands;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use rigforge_core::config::{AppConfig, LoadOptions, LogFormat};

#[derive(Debug, Parser)]
#[command(
    name = "rigforge",
    about = "Rigforge PC build recommendation CLI",
    long_about = "Parse free-text part queries, assemble tiered PC build recommendations, and suggest upgrades from a local component catalog.",
    after_help = "Examples:\n  rigforge seed\n  rigforge recommend \"gaming pc under 50000\"\n  rigforge upgrade --thread 42 \"upgrade my gpu\""
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations")]
    Migrate,
    #[command(about = "Load the deterministic component catalog seed data")]
    Seed,
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Search the component catalog with a free-text query")]
    Search {
        query: String,
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Generate tiered build recommendations for a free-text query")]
    Recommend {
        query: String,
        #[arg(long, help = "Persist the result under this conversation thread id")]
        thread: Option<i64>,
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Suggest upgrades against the last recommendation saved for a thread")]
    Upgrade {
        query: String,
        #[arg(long, help = "Thread id whose last saved recommendation is the baseline")]
        thread: i64,
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

/// Logging goes to stderr so command output on stdout stays parseable.
fn init_logging() {
    use tracing::Level;

    let Ok(config) = AppConfig::load(LoadOptions::default()) else {
        return;
    };
    let level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(level)
        .with_writer(std::io::stderr);
    let _ = match config.logging.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Seed => commands::seed::run(),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Search { query, json } => commands::search::run(&query, json),
        Command::Recommend { query, thread, json } => {
            commands::recommend::run(&query, thread, json)
        }
        Command::Upgrade { query, thread, json } => commands::upgrade::run(&query, thread, json),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
