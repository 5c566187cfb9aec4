use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::core::error::FetchError;
use crate::core::source::{IndicatorSource, ProviderKind, SourceQuery};
use crate::providers::util::{build_url, finite_value, http_client, read_json};

const DEMO_KEY: &str = "demo";

/// Commodity futures quotes from the Alpha Vantage `GLOBAL_QUOTE` endpoint.
pub struct AlphaVantageSource {
    base_url: String,
    api_key: String,
    client: Client,
}

impl AlphaVantageSource {
    pub fn new(base_url: &str, api_key: Option<&str>) -> Result<Self> {
        Ok(AlphaVantageSource {
            base_url: base_url.to_string(),
            api_key: api_key.unwrap_or(DEMO_KEY).to_string(),
            client: http_client()?,
        })
    }
}

#[derive(Deserialize, Debug)]
struct GlobalQuoteResponse {
    #[serde(rename = "Global Quote")]
    global_quote: Option<GlobalQuote>,
}

#[derive(Deserialize, Debug)]
struct GlobalQuote {
    #[serde(rename = "05. price")]
    price: Option<Value>,
}

#[async_trait]
impl IndicatorSource for AlphaVantageSource {
    #[instrument(name = "AlphaVantageFetch", skip(self), fields(symbol = %query.identifier()))]
    async fn fetch_value(&self, query: &SourceQuery) -> Result<f64, FetchError> {
        let SourceQuery::AlphaVantage { symbol } = query else {
            return Err(FetchError::UnsupportedQuery {
                provider: ProviderKind::AlphaVantage,
                identifier: query.identifier().to_string(),
            });
        };

        let url = build_url(
            &self.base_url,
            "query",
            &[
                ("function", "GLOBAL_QUOTE"),
                ("symbol", symbol.as_str()),
                ("apikey", self.api_key.as_str()),
            ],
        )?;
        debug!("Requesting quote for {}", symbol);

        let response = self.client.get(url).send().await?;
        let data: GlobalQuoteResponse = read_json(response).await?;

        let price = data
            .global_quote
            .ok_or(FetchError::MissingField("Global Quote"))?
            .price
            .ok_or(FetchError::MissingField("05. price"))?;
        finite_value(&price)
    }
}
