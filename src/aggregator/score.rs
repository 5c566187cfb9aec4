use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::core::indicator::Indicator;

const SCORE_DECIMALS: u32 = 3;

/// Weighted average of unit impacts, each discounted by its confidence and
/// normalised by the total weight of the indicators present. Absent
/// indicators count towards neither sum. `None` when nothing is present.
pub fn composite_score<'a, I>(indicators: I) -> Option<f64>
where
    I: IntoIterator<Item = &'a Indicator>,
{
    // Summed in key order so float rounding cannot depend on arrival order.
    let mut ordered: Vec<&Indicator> = indicators.into_iter().collect();
    ordered.sort_by_key(|indicator| indicator.key);

    let (score_sum, weight_sum) = ordered.into_iter().fold(
        (0.0_f64, 0.0_f64),
        |(score, weight), indicator| {
            (
                score + indicator.impact.unit_score() * indicator.weight * indicator.confidence,
                weight + indicator.weight,
            )
        },
    );

    if weight_sum > 0.0 {
        Some(round_score(score_sum / weight_sum))
    } else {
        None
    }
}

/// Rounds half away from zero to three decimals.
pub fn round_score(raw: f64) -> f64 {
    Decimal::from_f64(raw)
        .map(|d| d.round_dp_with_strategy(SCORE_DECIMALS, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|d| d.to_f64())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::default_indicators;
    use crate::core::indicator::IndicatorKey;

    /// One reading above every threshold.
    fn above_thresholds() -> Vec<Indicator> {
        let readings = [
            (IndicatorKey::Copper, 9000.0),
            (IndicatorKey::Oil, 82.0),
            (IndicatorKey::Gold, 2400.0),
            (IndicatorKey::Silver, 30.0),
            (IndicatorKey::NaturalGas, 3.9),
            (IndicatorKey::Pmi, 52.0),
            (IndicatorKey::Electricity, 120.0),
        ];
        let specs = default_indicators();
        readings
            .iter()
            .map(|(key, value)| {
                let spec = specs.iter().find(|s| s.key == *key).unwrap();
                Indicator::from_reading(spec, *value)
            })
            .collect()
    }

    #[test]
    fn test_all_indicators_above_threshold() {
        let indicators = above_thresholds();
        let score = composite_score(&indicators).unwrap();

        // Oil and gas invert, the rest are positive:
        // (0.184 + 0.045 + 0.0425 + 0.18 + 0.225) / 1.0 = 0.6765 before rounding
        assert!((score - 0.6765).abs() <= 0.0005 + 1e-9, "score was {score}");
        assert!(score > 0.5 && score < 1.0);
    }

    #[test]
    fn test_single_positive_indicator() {
        let specs = default_indicators();
        let pmi = specs.iter().find(|s| s.key == IndicatorKey::Pmi).unwrap();
        let indicators = vec![Indicator::from_reading(pmi, 52.0)];

        // Weighted average over one indicator leaves its confidence: 1 * 0.9
        assert_eq!(composite_score(&indicators), Some(0.9));
    }

    #[test]
    fn test_empty_set_has_no_score() {
        assert_eq!(composite_score(&Vec::<Indicator>::new()), None);
    }

    #[test]
    fn test_order_independent() {
        let indicators = above_thresholds();
        let forward = composite_score(&indicators);

        let mut reversed = indicators.clone();
        reversed.reverse();
        let mut rotated = indicators.clone();
        rotated.rotate_left(3);

        assert_eq!(forward, composite_score(&reversed));
        assert_eq!(forward, composite_score(&rotated));
        assert_eq!(forward, composite_score(&indicators));
    }

    #[test]
    fn test_score_stays_in_unit_interval() {
        let specs = default_indicators();
        for low in [true, false] {
            let indicators: Vec<Indicator> = specs
                .iter()
                .map(|spec| {
                    let value = if low {
                        spec.threshold - 1.0
                    } else {
                        spec.threshold + 1.0
                    };
                    Indicator::from_reading(spec, value)
                })
                .collect();
            let score = composite_score(&indicators).unwrap();
            assert!((0.0..=1.0).contains(&score), "score was {score}");
        }
    }

    #[test]
    fn test_round_score() {
        assert_eq!(round_score(0.67649), 0.676);
        assert_eq!(round_score(0.67651), 0.677);
        assert_eq!(round_score(0.12345), 0.123);
        assert_eq!(round_score(0.99961), 1.0);
        assert_eq!(round_score(0.0), 0.0);
        assert_eq!(round_score(1.0), 1.0);
    }
}
