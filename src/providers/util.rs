use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::core::error::FetchError;

const USER_AGENT: &str = "oracle-indicators/1.0";

/// Builds the HTTP client shared by every request of one provider.
pub fn http_client() -> anyhow::Result<Client> {
    Ok(Client::builder().user_agent(USER_AGENT).build()?)
}

/// Joins `base_url` and `path`, then appends the query pairs percent-encoded.
pub fn build_url(base_url: &str, path: &str, params: &[(&str, &str)]) -> Result<Url, FetchError> {
    let raw = format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'));
    Url::parse_with_params(&raw, params).map_err(|e| FetchError::InvalidUrl(e.to_string()))
}

/// Rejects non-2xx responses, then parses the body as `T`.
pub async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, FetchError> {
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status(status));
    }

    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|e| FetchError::Parse(e.to_string()))
}

/// Accepts a JSON number or a numeric string; anything non-finite is rejected.
pub fn finite_value(value: &Value) -> Result<f64, FetchError> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    parsed
        .filter(|v| v.is_finite())
        .ok_or_else(|| FetchError::NotANumber(value.to_string()))
}
