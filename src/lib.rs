pub mod cli;
pub mod core;
pub mod providers;

use crate::core::Interval;
use crate::core::config::AppConfig;
use crate::providers::MarketData;
use anyhow::Result;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    Quote { symbol: String },
    History { symbol: String, interval: Interval },
    Forecast { symbol: String },
    Search { query: String },
    Dashboard,
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("tickerdash starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    // Keys stay out of the logs.
    debug!(
        fmp = ?config.providers.fmp.as_ref().map(|p| &p.base_url),
        alphavantage = ?config.providers.alphavantage.as_ref().map(|p| &p.base_url),
        seed = ?config.synthetic_seed,
        "Loaded config"
    );

    let market = MarketData::from_config(&config);
    let rng = config
        .synthetic_seed
        .map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed);

    match command {
        AppCommand::Quote { symbol } => cli::quote::run(&market, &symbol).await,
        AppCommand::History { symbol, interval } => {
            cli::history::run(&market, &symbol, interval).await
        }
        AppCommand::Forecast { symbol } => {
            let mut rng = rng;
            cli::forecast::run(&market, &symbol, &mut rng).await
        }
        AppCommand::Search { query } => cli::search::run(&market, &query).await,
        AppCommand::Dashboard => cli::dashboard::run(&market, rng).await,
    }
}
