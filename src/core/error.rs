use std::time::Duration;
use thiserror::Error;

use crate::core::source::ProviderKind;

/// Reasons a single indicator read produced no value. The fetcher drops the
/// indicator on any of these; they never reach the HTTP response.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP error: {0}")]
    Status(reqwest::StatusCode),

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Missing field: {0}")]
    MissingField(&'static str),

    #[error("Not a finite number: {0}")]
    NotANumber(String),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("No source configured for provider {0}")]
    NoSource(ProviderKind),

    #[error("Provider {provider} cannot serve query for {identifier}")]
    UnsupportedQuery {
        provider: ProviderKind,
        identifier: String,
    },
}

/// Failure of the aggregation pipeline itself, as opposed to missing data.
#[derive(Error, Debug)]
pub enum AggregationError {
    #[error("Fetch task for {key} failed: {reason}")]
    TaskFailed { key: String, reason: String },
}
