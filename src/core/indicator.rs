//! Indicator types and the threshold classifier

use serde::{Deserialize, Serialize};
use std::fmt::Display;

use crate::core::config::IndicatorSpec;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorKey {
    Copper,
    Oil,
    Gold,
    Silver,
    NaturalGas,
    Pmi,
    Electricity,
}

impl IndicatorKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndicatorKey::Copper => "copper",
            IndicatorKey::Oil => "oil",
            IndicatorKey::Gold => "gold",
            IndicatorKey::Silver => "silver",
            IndicatorKey::NaturalGas => "natural_gas",
            IndicatorKey::Pmi => "pmi",
            IndicatorKey::Electricity => "electricity",
        }
    }

    /// Market-priced keys, as opposed to the macro series.
    pub fn is_commodity(&self) -> bool {
        !matches!(self, IndicatorKey::Pmi | IndicatorKey::Electricity)
    }
}

impl Display for IndicatorKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Positive,
    Negative,
    Neutral,
}

impl Impact {
    /// Contribution of this impact before weighting: 1, 0.5 or 0.
    pub fn unit_score(&self) -> f64 {
        match self {
            Impact::Positive => 1.0,
            Impact::Neutral => 0.5,
            Impact::Negative => 0.0,
        }
    }
}

impl Display for Impact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Impact::Positive => "positive",
                Impact::Negative => "negative",
                Impact::Neutral => "neutral",
            }
        )
    }
}

impl Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Trend::Up => "up",
                Trend::Down => "down",
            }
        )
    }
}

/// A classified reading of one indicator, built fresh for every aggregation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Indicator {
    #[serde(skip_serializing)]
    pub key: IndicatorKey,
    pub current_value: f64,
    pub weight: f64,
    pub confidence: f64,
    pub trend: Trend,
    pub impact: Impact,
    pub unit: String,
    pub source: String,
}

impl Indicator {
    pub fn from_reading(spec: &IndicatorSpec, value: f64) -> Self {
        let (trend, impact) = classify(spec, value);
        Indicator {
            key: spec.key,
            current_value: value,
            weight: spec.weight,
            confidence: spec.confidence,
            trend,
            impact,
            unit: spec.unit.clone(),
            source: spec.source.clone(),
        }
    }
}

/// Maps a finite reading to its trend and impact. A value equal to the
/// threshold is `Down`.
pub fn classify(spec: &IndicatorSpec, value: f64) -> (Trend, Impact) {
    if value > spec.threshold {
        (Trend::Up, spec.impact_above)
    } else {
        (Trend::Down, spec.impact_below)
    }
}
