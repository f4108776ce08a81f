mod commands;
mod config;
mod render;
mod utils;

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;

use config::{GlobalOptions, Settings, is_config_error};

/// Exit code for missing or invalid configuration.
const EXIT_CONFIG: u8 = 2;

/// Used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "warn,icsync=info,icsync_core=info,icsync_notion=info";

#[derive(Parser)]
#[command(name = "icsync", version)]
#[command(about = "Sync match fixtures from an iCalendar file into a Notion database")]
struct Cli {
    #[command(flatten)]
    options: GlobalOptions,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create and update database rows from the calendar (default)
    Sync {
        /// List every write instead of counts
        #[arg(short, long)]
        verbose: bool,
    },
    /// Show what a sync would do without writing anything
    Status {
        /// List every record, including unchanged ones
        #[arg(short, long)]
        verbose: bool,
    },
    /// Resolve the calendar offline and print the records as JSON
    Parse,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red(), e);
            if is_config_error(&e) {
                ExitCode::from(EXIT_CONFIG)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let settings = Settings::load(&cli.options)?;

    match cli.command.unwrap_or(Commands::Sync { verbose: false }) {
        Commands::Sync { verbose } => commands::sync::run(&settings, verbose).await,
        Commands::Status { verbose } => commands::status::run(&settings, verbose).await,
        Commands::Parse => commands::parse::run(&settings),
    }
}
