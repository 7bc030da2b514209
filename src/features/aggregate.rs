//! Per-winter summary statistics merged with the chill flag.

use std::collections::BTreeMap;

use log::{debug, warn};
use rayon::prelude::*;

use crate::domain::{DailyWeatherSummary, WinterFeature, WinterKey};
use crate::features::chill::{ChillOutcome, group_by_winter};

/// Arithmetic mean and sample variance (`n - 1` denominator).
///
/// Returns `None` for an empty slice; the variance is `None` below two values.
pub fn mean_and_sample_variance(values: &[f64]) -> Option<(f64, Option<f64>)> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    if values.len() < 2 {
        return Some((mean, None));
    }
    let ss: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
    Some((mean, Some(ss / (n - 1.0))))
}

/// Build one `WinterFeature` per winter present in `days`.
///
/// A winter with no chill outcome (should not happen when both come from the
/// same daily table) is recorded as not satisfied.
pub fn aggregate_winter_features(
    days: &[DailyWeatherSummary],
    chill: &BTreeMap<WinterKey, ChillOutcome>,
) -> Vec<WinterFeature> {
    let groups: Vec<(WinterKey, Vec<&DailyWeatherSummary>)> = group_by_winter(days).into_iter().collect();

    let features: Vec<WinterFeature> = groups
        .into_par_iter()
        .filter_map(|(key, group)| {
            let mins: Vec<f64> = group.iter().map(|d| d.min_temp).collect();
            let (mean_min_temp, var_min_temp) = mean_and_sample_variance(&mins)?;
            let outcome = chill.get(&key);
            if outcome.is_none() {
                warn!("No chill outcome for winter {key}; recording as not satisfied.");
            }
            Some(WinterFeature {
                n_days: mins.len(),
                mean_min_temp,
                var_min_temp,
                chill_satisfied: outcome.is_some_and(|o| o.satisfied),
                chill_reached_on: outcome.and_then(|o| o.reached_on),
                location: key.location,
                bloom_year: key.bloom_year,
            })
        })
        .collect();

    debug!("Feature aggregation: {} winters", features.len());
    features
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ChillRule;
    use crate::features::chill::detect_chill;
    use chrono::{Duration, NaiveDate};

    fn day(location: &str, bloom_year: i32, offset: i64, min_temp: f64) -> DailyWeatherSummary {
        let date = NaiveDate::from_ymd_opt(bloom_year - 1, 12, 1).unwrap() + Duration::days(offset);
        DailyWeatherSummary {
            location: location.to_string(),
            date,
            month: chrono::Datelike::month(&date),
            calendar_year: chrono::Datelike::year(&date),
            bloom_year,
            winter_month_index: 3,
            min_temp,
            max_temp: min_temp + 12.0,
            min_humidity: 40.0,
            max_humidity: 70.0,
            min_pressure: 1005.0,
            max_pressure: 1020.0,
        }
    }

    #[test]
    fn mean_and_variance_match_hand_computation() {
        let (mean, var) = mean_and_sample_variance(&[30.0, 35.0, 40.0]).unwrap();
        assert!((mean - 35.0).abs() < 1e-12);
        assert!((var.unwrap() - 25.0).abs() < 1e-12);
    }

    #[test]
    fn single_value_has_no_variance() {
        assert_eq!(mean_and_sample_variance(&[12.5]), Some((12.5, None)));
        assert_eq!(mean_and_sample_variance(&[]), None);
    }

    #[test]
    fn features_are_keyed_and_merged_with_chill() {
        let mut days = vec![
            day("kyoto", 2001, 0, 30.0),
            day("kyoto", 2001, 1, 35.0),
            day("kyoto", 2001, 2, 40.0),
            day("liestal", 2001, 0, 20.0),
        ];
        days.extend((0..5).map(|i| day("kyoto", 2002, i, 10.0)));

        let rule = ChillRule {
            threshold: 41.0,
            streak_days: 3,
        };
        let chill = detect_chill(&days, rule).unwrap();
        let features = aggregate_winter_features(&days, &chill);

        assert_eq!(features.len(), 3);
        let keys: Vec<(&str, i32)> = features.iter().map(|f| (f.location.as_str(), f.bloom_year)).collect();
        assert_eq!(keys, vec![("kyoto", 2001), ("kyoto", 2002), ("liestal", 2001)]);

        let k01 = &features[0];
        assert_eq!(k01.n_days, 3);
        assert!((k01.mean_min_temp - 35.0).abs() < 1e-12);
        assert!((k01.var_min_temp.unwrap() - 25.0).abs() < 1e-12);
        assert!(k01.chill_satisfied);
        assert_eq!(k01.chill_reached_on, Some(days[2].date));

        let l01 = &features[2];
        assert_eq!(l01.var_min_temp, None);
        assert!(!l01.chill_satisfied);
    }

    #[test]
    fn missing_chill_outcome_defaults_to_not_satisfied() {
        let days = vec![day("kyoto", 2001, 0, 30.0), day("kyoto", 2001, 1, 31.0)];
        let features = aggregate_winter_features(&days, &BTreeMap::new());
        assert_eq!(features.len(), 1);
        assert!(!features[0].chill_satisfied);
        assert_eq!(features[0].chill_reached_on, None);
    }
}
