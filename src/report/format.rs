//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the feature/fitting code stays clean and testable
//! - output changes are localized

use crate::domain::{FitReport, ModeledRow, PipelineConfig, WinterFeature};
use crate::fit::BloomModel;

/// Format the run header (configuration + table sizes).
pub fn format_run_header(config: &PipelineConfig, n_bloom: usize, n_features: usize, n_modeled: usize) -> String {
    let mut out = String::new();
    out.push_str("=== bloom - winter chill bloom model ===\n");
    out.push_str(&format!(
        "Chill rule: min_temp <= {:.1} for {} cumulative days\n",
        config.chill.threshold, config.chill.streak_days
    ));
    match config.year_cutoff {
        Some(y) => out.push_str(&format!("Years: > {y}\n")),
        None => out.push_str("Years: all\n"),
    }
    out.push_str(&format!(
        "Tables: bloom records={n_bloom} | winters={n_features} | modeled rows={n_modeled}\n"
    ));
    out
}

/// Format the regression summary (coefficients + fit quality).
pub fn format_fit_report(report: &FitReport) -> String {
    let mut out = String::new();
    let features: Vec<&str> = report.features.iter().map(|f| f.column_name()).collect();
    out.push_str(&format!(
        "\nModel: {} ~ location + {}\n",
        report.response,
        if features.is_empty() { "(none)".to_string() } else { features.join(" + ") }
    ));
    out.push_str(&format!("Reference site: {}\n\n", report.reference_location));

    out.push_str(&format!(
        "{:<26} {:>12} {:>10} {:>9}\n",
        "term", "estimate", "std.err", "t"
    ));
    for c in &report.coefficients {
        out.push_str(&format!(
            "{:<26} {:>12.4} {:>10.4} {:>9}\n",
            truncate(&c.name, 26),
            c.estimate,
            c.std_error,
            c.t_value.map(|t| format!("{t:.3}")).unwrap_or_else(|| "-".to_string())
        ));
    }

    let q = &report.quality;
    out.push_str(&format!(
        "\nn={} p={} df={} | R²={:.4} adj.R²={:.4} | RMSE={:.3} days | SSE={:.3}\n",
        q.n, q.n_params, q.df_resid, q.r_squared, q.adj_r_squared, q.rmse, q.sse
    ));
    out
}

/// Format coefficient and fit-quality changes from a saved `baseline` report to `current`.
///
/// Terms are matched by name; a term present in only one report shows `-` on the other side.
pub fn format_report_comparison(baseline: &FitReport, current: &FitReport) -> String {
    let mut out = String::from("\nChange vs saved report:\n");
    out.push_str(&format!(
        "{:<26} {:>12} {:>12} {:>10}\n",
        "term", "saved", "current", "delta"
    ));

    let mut names: Vec<&str> = current.coefficients.iter().map(|c| c.name.as_str()).collect();
    for c in &baseline.coefficients {
        if !names.contains(&c.name.as_str()) {
            names.push(&c.name);
        }
    }

    let estimate = |report: &FitReport, name: &str| {
        report.coefficients.iter().find(|c| c.name == name).map(|c| c.estimate)
    };
    let cell = |v: Option<f64>| v.map(|v| format!("{v:.4}")).unwrap_or_else(|| "-".to_string());
    for name in names {
        let (old, new) = (estimate(baseline, name), estimate(current, name));
        let delta = old.zip(new).map(|(o, n)| format!("{:+.4}", n - o)).unwrap_or_else(|| "-".to_string());
        out.push_str(&format!(
            "{:<26} {:>12} {:>12} {:>10}\n",
            truncate(name, 26),
            cell(old),
            cell(new),
            delta
        ));
    }

    let (b, c) = (&baseline.quality, &current.quality);
    out.push_str(&format!(
        "\nR² {:.4} -> {:.4} | RMSE {:.3} -> {:.3} days | n {} -> {}\n",
        b.r_squared, c.r_squared, b.rmse, c.rmse, b.n, c.n
    ));
    out
}

/// Format the first `top_n` winter features as a table.
pub fn format_feature_table(features: &[WinterFeature], top_n: usize) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<14} {:>6} {:>6} {:>9} {:>9} {:>6} {:>11}\n",
        "location", "year", "days", "mean_min", "var_min", "chill", "reached_on"
    ));
    for f in features.iter().take(top_n) {
        out.push_str(&format!(
            "{:<14} {:>6} {:>6} {:>9.2} {:>9} {:>6} {:>11}\n",
            truncate(&f.location, 14),
            f.bloom_year,
            f.n_days,
            f.mean_min_temp,
            f.var_min_temp.map(|v| format!("{v:.2}")).unwrap_or_else(|| "-".to_string()),
            if f.chill_satisfied { "yes" } else { "no" },
            f.chill_reached_on.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string()),
        ));
    }
    if features.len() > top_n {
        out.push_str(&format!("... {} more\n", features.len() - top_n));
    }
    out
}

/// Format the in-sample residual extremes (largest over- and under-predictions).
pub fn format_residual_extremes(model: &BloomModel, rows: &[ModeledRow], top_n: usize) -> String {
    let mut residuals: Vec<(&ModeledRow, f64)> = rows
        .iter()
        .filter_map(|r| model.predict(r).ok().map(|p| (r, f64::from(r.bloom_doy) - p)))
        .collect();
    residuals.sort_by(|a, b| b.1.abs().partial_cmp(&a.1.abs()).unwrap_or(std::cmp::Ordering::Equal));

    let mut out = String::from("\nLargest residuals (observed - fitted, days):\n");
    for (r, res) in residuals.iter().take(top_n) {
        out.push_str(&format!(
            "  {:<14} {:>6} doy={:>3} residual={:>+7.2}\n",
            truncate(&r.location, 14),
            r.year,
            r.bloom_doy,
            res
        ));
    }
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut t: String = s.chars().take(max.saturating_sub(1)).collect();
    t.push('…');
    t
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Coefficient, FeatureKind, FitQuality};
    use chrono::NaiveDate;

    fn sample_report() -> FitReport {
        FitReport {
            response: "bloom_doy".to_string(),
            reference_location: "kyoto".to_string(),
            features: vec![FeatureKind::MeanMinTemp],
            coefficients: vec![
                Coefficient {
                    name: "(intercept)".to_string(),
                    estimate: 180.0,
                    std_error: 4.0,
                    t_value: Some(45.0),
                },
                Coefficient {
                    name: "mean_min_temp".to_string(),
                    estimate: -2.5,
                    std_error: 0.1,
                    t_value: Some(-25.0),
                },
            ],
            quality: FitQuality {
                n: 120,
                n_params: 4,
                df_resid: 116,
                sse: 1000.0,
                rmse: 2.89,
                r_squared: 0.9,
                adj_r_squared: 0.897,
            },
        }
    }

    #[test]
    fn fit_report_lists_every_term() {
        let s = format_fit_report(&sample_report());
        assert!(s.contains("bloom_doy ~ location + mean_min_temp"));
        assert!(s.contains("(intercept)"));
        assert!(s.contains("R²=0.9000"));
    }

    #[test]
    fn comparison_matches_terms_by_name() {
        let baseline = sample_report();
        let mut current = sample_report();
        current.coefficients[1].estimate = -2.0;
        current.coefficients.push(Coefficient {
            name: "chill_satisfied".to_string(),
            estimate: 3.0,
            std_error: 1.0,
            t_value: Some(3.0),
        });
        current.quality.r_squared = 0.95;

        let s = format_report_comparison(&baseline, &current);
        let slope = s.lines().find(|l| l.starts_with("mean_min_temp")).unwrap();
        assert!(slope.contains("-2.5000") && slope.contains("+0.5000"));
        let added = s.lines().find(|l| l.starts_with("chill_satisfied")).unwrap();
        assert!(added.contains("3.0000") && added.trim_end().ends_with('-'));
        assert!(s.contains("R² 0.9000 -> 0.9500"));
    }

    #[test]
    fn feature_table_marks_missing_variance_and_truncates() {
        let features: Vec<WinterFeature> = (0..3)
            .map(|i| WinterFeature {
                location: "washingtondc".to_string(),
                bloom_year: 2000 + i,
                n_days: 1,
                mean_min_temp: 30.0,
                var_min_temp: None,
                chill_satisfied: i == 0,
                chill_reached_on: (i == 0).then(|| NaiveDate::from_ymd_opt(1999, 12, 30).unwrap()),
            })
            .collect();
        let s = format_feature_table(&features, 2);
        assert!(s.contains("1999-12-30"));
        assert!(s.contains("... 1 more"));
        assert_eq!(s.lines().count(), 4);
    }
}
