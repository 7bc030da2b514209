//! Export pipeline tables to CSV and the fit report to JSON.
//!
//! The exports are meant to be easy to consume in spreadsheets, plotting
//! scripts, or a later reporting step. Missing values are written as empty
//! CSV fields and `null` in JSON.

use std::fs::File;
use std::path::Path;

use serde::Serialize;

use crate::domain::{FitReport, ModeledRow, WinterFeature};
use crate::error::AppError;

/// Write the winter feature table.
pub fn write_features_csv(path: &Path, features: &[WinterFeature]) -> Result<(), AppError> {
    write_csv(path, features)
}

/// Write the modeled-row table (bloom records joined to features).
pub fn write_modeled_csv(path: &Path, rows: &[ModeledRow]) -> Result<(), AppError> {
    write_csv(path, rows)
}

fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::io(format!("Failed to create export CSV '{}': {e}", path.display())))?;
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| AppError::io(format!("Failed to write export CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::io(format!("Failed to flush export CSV '{}': {e}", path.display())))?;
    Ok(())
}

/// Write the fit report as pretty JSON.
pub fn write_report_json(path: &Path, report: &FitReport) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create report JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, report)
        .map_err(|e| AppError::io(format!("Failed to write report JSON: {e}")))?;
    Ok(())
}

/// Read a fit report back (for comparisons between runs).
pub fn read_report_json(path: &Path) -> Result<FitReport, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::io(format!("Failed to open report JSON '{}': {e}", path.display())))?;
    serde_json::from_reader(file).map_err(|e| AppError::io(format!("Invalid report JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Coefficient, FeatureKind, FitQuality};

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("bloom_chill_{}_{name}", std::process::id()))
    }

    #[test]
    fn features_csv_has_header_and_empty_missing_fields() {
        let path = temp_path("features.csv");
        let features = vec![WinterFeature {
            location: "kyoto".to_string(),
            bloom_year: 2001,
            n_days: 1,
            mean_min_temp: 33.5,
            var_min_temp: None,
            chill_satisfied: false,
            chill_reached_on: None,
        }];
        write_features_csv(&path, &features).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();

        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "location,bloom_year,n_days,mean_min_temp,var_min_temp,chill_satisfied,chill_reached_on"
        );
        assert_eq!(lines.next().unwrap(), "kyoto,2001,1,33.5,,false,");
    }

    #[test]
    fn modeled_csv_writes_one_line_per_row() {
        let path = temp_path("rows.csv");
        let rows: Vec<ModeledRow> = (0..4)
            .map(|i| ModeledRow {
                location: "liestal".to_string(),
                year: 1990 + i,
                bloom_doy: 100,
                altitude: 350.0,
                mean_min_temp: Some(30.0),
                var_min_temp: Some(12.0),
                chill_satisfied: Some(true),
            })
            .collect();
        write_modeled_csv(&path, &rows).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(text.lines().count(), 5);
    }

    #[test]
    fn report_json_round_trips() {
        let path = temp_path("report.json");
        let report = FitReport {
            response: "bloom_doy".to_string(),
            reference_location: "kyoto".to_string(),
            features: vec![FeatureKind::MeanMinTemp, FeatureKind::ChillSatisfied],
            coefficients: vec![Coefficient {
                name: "(intercept)".to_string(),
                estimate: 150.0,
                std_error: 2.0,
                t_value: Some(75.0),
            }],
            quality: FitQuality {
                n: 10,
                n_params: 1,
                df_resid: 9,
                sse: 4.0,
                rmse: 0.63,
                r_squared: 0.5,
                adj_r_squared: 0.5,
            },
        };
        write_report_json(&path, &report).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let back = read_report_json(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert!(text.contains("\"chill_satisfied\""));
        assert_eq!(back.features, report.features);
        assert_eq!(back.coefficients[0].name, "(intercept)");
        assert_eq!(back.quality.n, 10);
    }
}
