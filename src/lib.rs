pub mod aggregator;
pub mod api;
pub mod cli;
pub mod core;
pub mod fetcher;
pub mod providers;
pub mod store;

use crate::aggregator::{Aggregate, CachingAggregator, IndicatorAggregator};
use crate::core::config::AppConfig;
use crate::fetcher::IndicatorFetcher;
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Commands that need a loaded configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    Serve { bind: Option<String> },
    Breakdown { country: Option<String>, json: bool },
}

pub fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!(
        indicators = config.indicators.len(),
        ttl_secs = config.cache.ttl_secs,
        timeout_ms = config.fetch.timeout_ms,
        "Loaded config"
    );
    Ok(config)
}

/// Wires providers, fetcher and aggregator together from `config`.
pub fn build_aggregator(config: &AppConfig) -> Result<Arc<dyn Aggregate>> {
    let sources = providers::build_sources(&config.providers)?;
    if sources.is_empty() {
        warn!("No providers configured, every breakdown will be NO_DATA");
    }

    let fetcher = IndicatorFetcher::new(sources, config.fetch.timeout());
    let aggregator = IndicatorAggregator::new(config.indicators.clone(), fetcher);

    if config.cache.ttl_secs == 0 {
        return Ok(Arc::new(aggregator));
    }
    Ok(Arc::new(CachingAggregator::new(
        aggregator,
        Duration::from_secs(config.cache.ttl_secs),
    )))
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Oracle indicators starting...");
    let config = load_config(config_path)?;

    match command {
        AppCommand::Serve { bind } => cli::serve::run(&config, bind.as_deref()).await,
        AppCommand::Breakdown { country, json } => {
            cli::breakdown::run(&config, country.as_deref(), json).await
        }
    }
}
