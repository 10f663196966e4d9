use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use tickerdash::cli::setup::{setup, setup_at_path};
use tickerdash::core::Interval;
use tickerdash::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for tickerdash::AppCommand {
    fn from(cmd: Commands) -> tickerdash::AppCommand {
        match cmd {
            Commands::Quote { symbol } => tickerdash::AppCommand::Quote { symbol },
            Commands::History { symbol, interval } => {
                tickerdash::AppCommand::History { symbol, interval }
            }
            Commands::Forecast { symbol } => tickerdash::AppCommand::Forecast { symbol },
            Commands::Search { query } => tickerdash::AppCommand::Search {
                query: query.join(" "),
            },
            Commands::Dashboard => tickerdash::AppCommand::Dashboard,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Show the current quote for a symbol
    Quote { symbol: String },
    /// Show daily price history for a symbol
    History {
        symbol: String,
        /// Lookback interval: 1d, 1w, 1m or 1y
        #[arg(short, long, default_value = "1m")]
        interval: Interval,
    },
    /// Project the next 7 days from recent moving averages
    Forecast { symbol: String },
    /// Look up symbols by ticker or company name
    Search {
        #[arg(required = true)]
        query: Vec<String>,
    },
    /// Start the interactive dashboard
    Dashboard,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => match cli.config_path.as_deref() {
            Some(path) => setup_at_path(path).map(|()| println!("Created configuration at {path}")),
            None => setup().map(|path| println!("Created configuration at {}", path.display())),
        },
        Some(cmd) => tickerdash::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
