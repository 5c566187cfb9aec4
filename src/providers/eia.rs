use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::core::error::FetchError;
use crate::core::source::{IndicatorSource, ProviderKind, SourceQuery};
use crate::providers::util::{build_url, finite_value, http_client, read_json};

/// Latest daily value of an EIA v2 route for one respondent region.
pub struct EiaSource {
    base_url: String,
    api_key: String,
    client: Client,
}

impl EiaSource {
    pub fn new(base_url: &str, api_key: Option<&str>) -> Result<Self> {
        Ok(EiaSource {
            base_url: base_url.to_string(),
            api_key: api_key.unwrap_or_default().trim().to_string(),
            client: http_client()?,
        })
    }
}

// { "response": { "data": [ { "period": "2026-10-14", "value": 11234, ... } ] } }
#[derive(Deserialize, Debug)]
struct EiaResponse {
    response: Option<EiaPayload>,
}

#[derive(Deserialize, Debug)]
struct EiaPayload {
    #[serde(default)]
    data: Vec<EiaRow>,
}

#[derive(Deserialize, Debug)]
struct EiaRow {
    value: Option<Value>,
}

#[async_trait]
impl IndicatorSource for EiaSource {
    #[instrument(name = "EiaFetch", skip(self), fields(respondent = %query.identifier()))]
    async fn fetch_value(&self, query: &SourceQuery) -> Result<f64, FetchError> {
        let SourceQuery::Eia { route, respondent } = query else {
            return Err(FetchError::UnsupportedQuery {
                provider: ProviderKind::Eia,
                identifier: query.identifier().to_string(),
            });
        };

        let path = format!("v2/{}/data/", route.trim_matches('/'));
        let url = build_url(
            &self.base_url,
            &path,
            &[
                ("api_key", self.api_key.as_str()),
                ("frequency", "daily"),
                ("data[0]", "value"),
                ("facets[respondent][]", respondent.as_str()),
                ("sort[0][column]", "period"),
                ("sort[0][direction]", "desc"),
                ("offset", "0"),
                ("length", "1"),
            ],
        )?;
        debug!("Requesting latest {} value for {}", route, respondent);

        let response = self.client.get(url).send().await?;
        let data: EiaResponse = read_json(response).await?;

        let value = data
            .response
            .ok_or(FetchError::MissingField("response"))?
            .data
            .into_iter()
            .next()
            .and_then(|row| row.value)
            .ok_or(FetchError::MissingField("response.data[0].value"))?;
        finite_value(&value)
    }
}
