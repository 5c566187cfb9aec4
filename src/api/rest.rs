use axum::{
    Json, Router,
    extract::{Query, State},
    http::{Method, header},
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::aggregator::{Aggregate, AggregationResult, DataStatus};
use crate::core::indicator::{Indicator, IndicatorKey};

const NO_DATA_MESSAGE: &str = "External data sources unavailable";
const ERROR_MESSAGE: &str = "Failed to retrieve indicator data";

pub struct ApiState {
    pub aggregator: Arc<dyn Aggregate>,
    pub default_country: String,
}

pub fn create_router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route(
            "/indicators/breakdown",
            get(indicators_breakdown).post(indicators_breakdown),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
        .with_state(state)
}

/// Any origin may call in; preflight requests are answered here with an
/// empty 200 and never reach a handler.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

async fn health_check() -> &'static str {
    "OK"
}

#[derive(Deserialize, Debug)]
struct BreakdownParams {
    country: Option<String>,
}

/// JSON body of `/indicators/breakdown`.
#[derive(Serialize, Debug)]
pub struct BreakdownResponse {
    pub country: String,
    pub indicators_breakdown: BTreeMap<IndicatorKey, Indicator>,
    pub overall_score: f64,
    pub timestamp: DateTime<Utc>,
    pub data_status: DataStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sources: Option<SourcesInfo>,
}

/// Where a LIVE breakdown came from. Groups with no live indicator are omitted.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SourcesInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commodities: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub electricity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pmi: Option<String>,
    pub last_update: DateTime<Utc>,
}

impl SourcesInfo {
    fn from_indicators(
        indicators: &BTreeMap<IndicatorKey, Indicator>,
        last_update: DateTime<Utc>,
    ) -> Self {
        let mut commodities: Vec<&str> = indicators
            .iter()
            .filter(|(key, _)| key.is_commodity())
            .map(|(_, indicator)| indicator.source.as_str())
            .collect();
        commodities.sort_unstable();
        commodities.dedup();
        let source_of =
            |key: IndicatorKey| indicators.get(&key).map(|indicator| indicator.source.clone());

        SourcesInfo {
            commodities: (!commodities.is_empty()).then(|| commodities.join(", ")),
            electricity: source_of(IndicatorKey::Electricity),
            pmi: source_of(IndicatorKey::Pmi),
            last_update,
        }
    }
}

/// Trimmed `requested` country, or `default` when it is missing or blank.
pub fn resolve_country(requested: Option<&str>, default: &str) -> String {
    requested
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(default)
        .to_string()
}

impl BreakdownResponse {
    pub fn new(country: String, result: AggregationResult) -> Self {
        let sources = result
            .is_live()
            .then(|| SourcesInfo::from_indicators(&result.indicators, result.timestamp));
        let (error, message) = match result.status {
            DataStatus::Live => (None, None),
            DataStatus::NoData => (None, Some(NO_DATA_MESSAGE.to_string())),
            DataStatus::Error => (
                result.error.or_else(|| Some(ERROR_MESSAGE.to_string())),
                Some(ERROR_MESSAGE.to_string()),
            ),
        };

        BreakdownResponse {
            country,
            indicators_breakdown: result.indicators,
            overall_score: result.overall_score,
            timestamp: result.timestamp,
            data_status: result.status,
            error,
            message,
            sources,
        }
    }
}

// Always 200: NO_DATA and ERROR are reported in the body so clients have one
// parsing path.
async fn indicators_breakdown(
    State(state): State<Arc<ApiState>>,
    Query(params): Query<BreakdownParams>,
) -> Json<BreakdownResponse> {
    let country = resolve_country(params.country.as_deref(), &state.default_country);
    debug!(%country, "Indicator breakdown requested");

    let result = state.aggregator.aggregate().await;
    Json(BreakdownResponse::new(country, result))
}
