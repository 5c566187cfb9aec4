//! Indicator source abstractions

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Display;
use std::sync::Arc;

use crate::core::error::FetchError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    AlphaVantage,
    Fred,
    Eia,
}

impl Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                ProviderKind::AlphaVantage => "alpha_vantage",
                ProviderKind::Fred => "fred",
                ProviderKind::Eia => "eia",
            }
        )
    }
}

/// Where a single indicator reading lives on its provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "snake_case")]
pub enum SourceQuery {
    AlphaVantage { symbol: String },
    Fred { series_id: String },
    Eia { route: String, respondent: String },
}

impl SourceQuery {
    pub fn provider(&self) -> ProviderKind {
        match self {
            SourceQuery::AlphaVantage { .. } => ProviderKind::AlphaVantage,
            SourceQuery::Fred { .. } => ProviderKind::Fred,
            SourceQuery::Eia { .. } => ProviderKind::Eia,
        }
    }

    /// Provider-local identifier, used for logging and test doubles.
    pub fn identifier(&self) -> &str {
        match self {
            SourceQuery::AlphaVantage { symbol } => symbol,
            SourceQuery::Fred { series_id } => series_id,
            SourceQuery::Eia { respondent, .. } => respondent,
        }
    }
}

#[async_trait]
pub trait IndicatorSource: Send + Sync {
    /// Performs one read and returns the raw numeric value it found.
    async fn fetch_value(&self, query: &SourceQuery) -> Result<f64, FetchError>;
}

/// The sources available to a fetcher, one per provider family.
#[derive(Clone, Default)]
pub struct SourceSet {
    sources: HashMap<ProviderKind, Arc<dyn IndicatorSource>>,
}

impl SourceSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, kind: ProviderKind, source: Arc<dyn IndicatorSource>) -> Self {
        self.sources.insert(kind, source);
        self
    }

    pub fn get(&self, kind: ProviderKind) -> Option<&Arc<dyn IndicatorSource>> {
        self.sources.get(&kind)
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
