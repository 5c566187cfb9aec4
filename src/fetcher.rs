use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::core::config::IndicatorSpec;
use crate::core::error::FetchError;
use crate::core::source::SourceSet;

/// Reads one indicator from its source with a bounded timeout. There is no
/// retry: a failed read means no data for this indicator in this cycle.
pub struct IndicatorFetcher {
    sources: SourceSet,
    timeout: Duration,
}

impl IndicatorFetcher {
    pub fn new(sources: SourceSet, timeout: Duration) -> Self {
        IndicatorFetcher { sources, timeout }
    }

    /// Returns the validated reading, or `None` on any failure.
    #[instrument(skip(self, spec), fields(indicator = %spec.key))]
    pub async fn fetch(&self, spec: &IndicatorSpec) -> Option<f64> {
        match self.try_fetch(spec).await {
            Ok(value) => {
                debug!(value, "Indicator fetched");
                Some(value)
            }
            Err(e) => {
                warn!(error = %e, "Indicator unavailable");
                None
            }
        }
    }

    pub async fn try_fetch(&self, spec: &IndicatorSpec) -> Result<f64, FetchError> {
        let provider = spec.query.provider();
        let source = self
            .sources
            .get(provider)
            .ok_or(FetchError::NoSource(provider))?;

        let value = tokio::time::timeout(self.timeout, source.fetch_value(&spec.query))
            .await
            .map_err(|_| FetchError::Timeout(self.timeout))??;

        if !value.is_finite() {
            return Err(FetchError::NotANumber(value.to_string()));
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::default_indicators;
    use crate::core::indicator::IndicatorKey;
    use crate::core::source::ProviderKind;
    use crate::core::source::mock::{MockSource, Outcome};
    use std::sync::Arc;

    fn spec_for(key: IndicatorKey) -> IndicatorSpec {
        default_indicators()
            .into_iter()
            .find(|s| s.key == key)
            .unwrap()
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let source = Arc::new(MockSource::new(&[("MANEMP", Outcome::Value(52.0))]));
        let fetcher = IndicatorFetcher::new(source.into_source_set(), Duration::from_secs(1));

        assert_eq!(fetcher.fetch(&spec_for(IndicatorKey::Pmi)).await, Some(52.0));
    }

    #[tokio::test]
    async fn test_source_failure_is_none() {
        let source = Arc::new(MockSource::new(&[("MANEMP", Outcome::Fail)]));
        let fetcher = IndicatorFetcher::new(source.clone().into_source_set(), Duration::from_secs(1));

        assert_eq!(fetcher.fetch(&spec_for(IndicatorKey::Pmi)).await, None);
        // Single attempt, no retry
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_timeout_is_none() {
        let source = Arc::new(MockSource::new(&[(
            "HG=F",
            Outcome::Delayed(Duration::from_millis(500), 9000.0),
        )]));
        let fetcher =
            IndicatorFetcher::new(source.into_source_set(), Duration::from_millis(20));

        let err = fetcher
            .try_fetch(&spec_for(IndicatorKey::Copper))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_non_finite_is_rejected() {
        let source = Arc::new(MockSource::new(&[("CL=F", Outcome::Value(f64::NAN))]));
        let fetcher = IndicatorFetcher::new(source.into_source_set(), Duration::from_secs(1));

        assert_eq!(fetcher.fetch(&spec_for(IndicatorKey::Oil)).await, None);
    }

    #[tokio::test]
    async fn test_missing_provider_is_none() {
        let source = Arc::new(MockSource::new(&[("US48", Outcome::Value(120.0))]));
        let sources = SourceSet::new().with(ProviderKind::Fred, source);
        let fetcher = IndicatorFetcher::new(sources, Duration::from_secs(1));

        let err = fetcher
            .try_fetch(&spec_for(IndicatorKey::Electricity))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "No source configured for provider eia");
    }
}
