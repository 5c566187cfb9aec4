use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::core::error::FetchError;
use crate::core::source::{IndicatorSource, ProviderKind, SourceQuery};
use crate::providers::util::{build_url, finite_value, http_client, read_json};

/// Latest observation of a FRED series.
pub struct FredSource {
    base_url: String,
    api_key: String,
    client: Client,
}

impl FredSource {
    pub fn new(base_url: &str, api_key: Option<&str>) -> Result<Self> {
        Ok(FredSource {
            base_url: base_url.to_string(),
            api_key: api_key.unwrap_or_default().trim().to_string(),
            client: http_client()?,
        })
    }
}

#[derive(Deserialize, Debug)]
struct ObservationsResponse {
    #[serde(default)]
    observations: Vec<Observation>,
}

#[derive(Deserialize, Debug)]
struct Observation {
    value: Option<Value>,
}

#[async_trait]
impl IndicatorSource for FredSource {
    #[instrument(name = "FredFetch", skip(self), fields(series = %query.identifier()))]
    async fn fetch_value(&self, query: &SourceQuery) -> Result<f64, FetchError> {
        let SourceQuery::Fred { series_id } = query else {
            return Err(FetchError::UnsupportedQuery {
                provider: ProviderKind::Fred,
                identifier: query.identifier().to_string(),
            });
        };

        let url = build_url(
            &self.base_url,
            "fred/series/observations",
            &[
                ("series_id", series_id.as_str()),
                ("api_key", self.api_key.as_str()),
                ("file_type", "json"),
                ("limit", "1"),
                ("sort_order", "desc"),
            ],
        )?;
        debug!("Requesting latest observation of {}", series_id);

        let response = self.client.get(url).send().await?;
        let data: ObservationsResponse = read_json(response).await?;

        // FRED reports a missing observation as "."
        let value = data
            .observations
            .into_iter()
            .next()
            .and_then(|obs| obs.value)
            .ok_or(FetchError::MissingField("observations[0].value"))?;
        finite_value(&value)
    }
}
