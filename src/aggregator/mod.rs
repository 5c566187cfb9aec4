pub mod caching;
pub mod score;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{error, info, instrument};

use crate::core::config::IndicatorSpec;
use crate::core::error::AggregationError;
use crate::core::indicator::{Indicator, IndicatorKey};
use crate::fetcher::IndicatorFetcher;

pub use caching::CachingAggregator;
pub use score::composite_score;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataStatus {
    Live,
    NoData,
    Error,
}

impl std::fmt::Display for DataStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                DataStatus::Live => "LIVE",
                DataStatus::NoData => "NO_DATA",
                DataStatus::Error => "ERROR",
            }
        )
    }
}

/// Outcome of one aggregation run.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationResult {
    pub indicators: BTreeMap<IndicatorKey, Indicator>,
    pub overall_score: f64,
    pub status: DataStatus,
    pub timestamp: DateTime<Utc>,
    pub error: Option<String>,
}

impl AggregationResult {
    /// Scores whatever was obtained; an empty set is `NoData`.
    pub fn from_indicators(
        indicators: impl IntoIterator<Item = Indicator>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let indicators: BTreeMap<IndicatorKey, Indicator> = indicators
            .into_iter()
            .map(|indicator| (indicator.key, indicator))
            .collect();

        match composite_score(indicators.values()) {
            Some(overall_score) => AggregationResult {
                indicators,
                overall_score,
                status: DataStatus::Live,
                timestamp,
                error: None,
            },
            None => Self::no_data(timestamp),
        }
    }

    pub fn no_data(timestamp: DateTime<Utc>) -> Self {
        AggregationResult {
            indicators: BTreeMap::new(),
            overall_score: 0.0,
            status: DataStatus::NoData,
            timestamp,
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        AggregationResult {
            error: Some(message.into()),
            status: DataStatus::Error,
            ..Self::no_data(timestamp)
        }
    }

    pub fn is_live(&self) -> bool {
        self.status == DataStatus::Live
    }
}

/// Anything that can produce a fresh indicator breakdown.
#[async_trait]
pub trait Aggregate: Send + Sync {
    async fn aggregate(&self) -> AggregationResult;
}

/// Fetches every configured indicator concurrently, waits for all of them to
/// settle, and scores the ones that produced a value.
pub struct IndicatorAggregator {
    specs: Arc<Vec<IndicatorSpec>>,
    fetcher: Arc<IndicatorFetcher>,
}

impl IndicatorAggregator {
    pub fn new(specs: Vec<IndicatorSpec>, fetcher: IndicatorFetcher) -> Self {
        IndicatorAggregator {
            specs: Arc::new(specs),
            fetcher: Arc::new(fetcher),
        }
    }

    async fn collect(&self) -> Result<Vec<Indicator>, AggregationError> {
        // Dropping the set aborts every fetch still in flight, so an abandoned
        // request does not leave work running behind it.
        let mut tasks = JoinSet::new();
        let mut keys = HashMap::with_capacity(self.specs.len());
        for spec in self.specs.iter() {
            let spec = spec.clone();
            let fetcher = Arc::clone(&self.fetcher);
            let key = spec.key;
            let handle = tasks.spawn(async move {
                fetcher
                    .fetch(&spec)
                    .await
                    .map(|value| Indicator::from_reading(&spec, value))
            });
            keys.insert(handle.id(), key);
        }

        let mut indicators = Vec::with_capacity(self.specs.len());
        let mut failure = None;
        while let Some(settled) = tasks.join_next().await {
            match settled {
                Ok(Some(indicator)) => indicators.push(indicator),
                Ok(None) => {}
                Err(e) => {
                    let key = keys
                        .get(&e.id())
                        .map_or_else(|| "unknown".to_string(), ToString::to_string);
                    failure.get_or_insert(AggregationError::TaskFailed {
                        key,
                        reason: e.to_string(),
                    });
                }
            }
        }

        match failure {
            Some(e) => Err(e),
            None => Ok(indicators),
        }
    }
}

#[async_trait]
impl Aggregate for IndicatorAggregator {
    #[instrument(name = "Aggregate", skip(self))]
    async fn aggregate(&self) -> AggregationResult {
        match self.collect().await {
            Ok(indicators) => {
                let result = AggregationResult::from_indicators(indicators, Utc::now());
                info!(
                    status = %result.status,
                    score = result.overall_score,
                    available = result.indicators.len(),
                    requested = self.specs.len(),
                    "Aggregation complete"
                );
                result
            }
            Err(e) => {
                error!(error = %e, "Aggregation failed");
                AggregationResult::failed(e.to_string(), Utc::now())
            }
        }
    }
}
