use anyhow::{Context, Result, bail, ensure};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::debug;

use crate::core::indicator::{Impact, IndicatorKey};
use crate::core::source::SourceQuery;

/// Static description of one indicator: how to fetch it and how to score it.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct IndicatorSpec {
    pub key: IndicatorKey,
    pub weight: f64,
    pub confidence: f64,
    pub threshold: f64,
    pub impact_above: Impact,
    pub impact_below: Impact,
    pub unit: String,
    pub source: String,
    pub query: SourceQuery,
}

#[allow(clippy::too_many_arguments)]
fn spec(
    key: IndicatorKey,
    weight: f64,
    confidence: f64,
    threshold: f64,
    impact_above: Impact,
    impact_below: Impact,
    unit: &str,
    source: &str,
    query: SourceQuery,
) -> IndicatorSpec {
    IndicatorSpec {
        key,
        weight,
        confidence,
        threshold,
        impact_above,
        impact_below,
        unit: unit.to_string(),
        source: source.to_string(),
        query,
    }
}

fn quote(symbol: &str) -> SourceQuery {
    SourceQuery::AlphaVantage {
        symbol: symbol.to_string(),
    }
}

pub fn default_indicators() -> Vec<IndicatorSpec> {
    use Impact::*;
    use IndicatorKey::*;

    const ALPHA_VANTAGE: &str = "Alpha Vantage";

    vec![
        spec(Copper, 0.20, 0.92, 8400.0, Positive, Negative, "USD/t", ALPHA_VANTAGE, quote("HG=F")),
        spec(Oil, 0.15, 0.90, 75.0, Negative, Positive, "USD/bbl", ALPHA_VANTAGE, quote("CL=F")),
        spec(Gold, 0.05, 0.90, 1940.0, Positive, Negative, "USD/oz", ALPHA_VANTAGE, quote("GC=F")),
        spec(Silver, 0.05, 0.85, 24.5, Positive, Negative, "USD/oz", ALPHA_VANTAGE, quote("SI=F")),
        spec(NaturalGas, 0.10, 0.85, 3.40, Negative, Positive, "USD/MMBtu", ALPHA_VANTAGE, quote("NG=F")),
        spec(
            Pmi,
            0.20,
            0.90,
            50.0,
            Positive,
            Negative,
            "index",
            "FRED (Federal Reserve)",
            SourceQuery::Fred {
                series_id: "MANEMP".to_string(),
            },
        ),
        spec(
            Electricity,
            0.25,
            0.90,
            100.0,
            Positive,
            Neutral,
            "TWh",
            "EIA (Energy Information Administration)",
            SourceQuery::Eia {
                route: "electricity/rto/daily-region-data".to_string(),
                respondent: "US48".to_string(),
            },
        ),
    ]
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind: "127.0.0.1:8080".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FetchConfig {
    pub timeout_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        FetchConfig { timeout_ms: 8000 }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CacheConfig {
    /// Lifetime of a cached LIVE breakdown; 0 disables caching.
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig { ttl_secs: 60 }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProviderConfig {
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

impl ProviderConfig {
    fn new(base_url: &str) -> Self {
        ProviderConfig {
            base_url: base_url.to_string(),
            api_key: None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub alpha_vantage: Option<ProviderConfig>,
    pub fred: Option<ProviderConfig>,
    pub eia: Option<ProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            alpha_vantage: Some(ProviderConfig::new("https://www.alphavantage.co")),
            fred: Some(ProviderConfig::new("https://api.stlouisfed.org")),
            eia: Some(ProviderConfig::new("https://api.eia.gov")),
        }
    }
}

fn default_country() -> String {
    "FRA".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default = "default_country")]
    pub default_country: String,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default = "default_indicators")]
    pub indicators: Vec<IndicatorSpec>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            server: ServerConfig::default(),
            fetch: FetchConfig::default(),
            cache: CacheConfig::default(),
            default_country: default_country(),
            providers: ProvidersConfig::default(),
            indicators: default_indicators(),
        }
    }
}

impl AppConfig {
    /// Loads the config from the default location, falling back to built-in
    /// defaults when no file exists there.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config at {}, using built-in defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "oracle-portfolio", "oracle-indicators")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(self.fetch.timeout_ms > 0, "fetch.timeout_ms must be positive");

        let mut seen = HashSet::new();
        for spec in &self.indicators {
            if !seen.insert(spec.key) {
                bail!("Duplicate indicator: {}", spec.key);
            }
            ensure!(
                spec.weight > 0.0 && spec.weight <= 1.0,
                "Weight of {} must be in (0, 1], got {}",
                spec.key,
                spec.weight
            );
            ensure!(
                (0.0..=1.0).contains(&spec.confidence),
                "Confidence of {} must be in [0, 1], got {}",
                spec.key,
                spec.confidence
            );
            ensure!(
                spec.threshold.is_finite(),
                "Threshold of {} must be finite",
                spec.key
            );
        }
        Ok(())
    }
}
