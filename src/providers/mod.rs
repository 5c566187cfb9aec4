pub mod alpha_vantage;
pub mod eia;
pub mod fred;
pub mod util;

use anyhow::Result;
use std::sync::Arc;
use tracing::debug;

use crate::core::config::ProvidersConfig;
use crate::core::source::{ProviderKind, SourceSet};
use alpha_vantage::AlphaVantageSource;
use eia::EiaSource;
use fred::FredSource;

/// Builds one source per configured provider. Indicators whose provider is
/// left out of the config are reported as unavailable.
pub fn build_sources(config: &ProvidersConfig) -> Result<SourceSet> {
    let mut sources = SourceSet::new();

    if let Some(p) = &config.alpha_vantage {
        debug!("Using Alpha Vantage at {}", p.base_url);
        let source = AlphaVantageSource::new(&p.base_url, p.api_key.as_deref())?;
        sources = sources.with(ProviderKind::AlphaVantage, Arc::new(source));
    }
    if let Some(p) = &config.fred {
        debug!("Using FRED at {}", p.base_url);
        let source = FredSource::new(&p.base_url, p.api_key.as_deref())?;
        sources = sources.with(ProviderKind::Fred, Arc::new(source));
    }
    if let Some(p) = &config.eia {
        debug!("Using EIA at {}", p.base_url);
        let source = EiaSource::new(&p.base_url, p.api_key.as_deref())?;
        sources = sources.with(ProviderKind::Eia, Arc::new(source));
    }

    Ok(sources)
}
