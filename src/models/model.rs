//! Design-matrix layout for the bloom-DOY regression.
//!
//! The fitter relies on two primitive operations:
//! - build a design row for a modeled row (for OLS)
//! - predict bloom DOY given coefficients (for residuals and new rows)
//!
//! Column order is fixed: intercept, one indicator per non-reference site,
//! then the selected winter features in `FeatureKind` order.

use serde::{Deserialize, Serialize};

use crate::domain::{FeatureKind, ModeledRow};
use crate::error::AppError;

pub const INTERCEPT: &str = "(intercept)";

/// Dummy-encoding layout derived from the training rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignSpec {
    /// Site absorbed into the intercept (alphabetically first).
    pub reference_location: String,
    /// Sites that get their own indicator column.
    pub dummy_locations: Vec<String>,
    pub features: Vec<FeatureKind>,
}

impl DesignSpec {
    /// Build a layout from the distinct sites in `rows`.
    ///
    /// Fails with `RankDeficientModel` when fewer than two sites are present,
    /// since the site effect cannot be estimated.
    pub fn from_rows(rows: &[ModeledRow], features: &[FeatureKind]) -> Result<Self, AppError> {
        let mut levels: Vec<&str> = rows.iter().map(|r| r.location.as_str()).collect();
        levels.sort_unstable();
        levels.dedup();

        let Some((reference, rest)) = levels.split_first() else {
            return Err(AppError::insufficient("No rows to fit."));
        };
        if rest.is_empty() {
            return Err(AppError::rank_deficient(
                "location",
                format!("all rows share the single site '{reference}'"),
            ));
        }

        Ok(Self {
            reference_location: reference.to_string(),
            dummy_locations: rest.iter().map(|s| s.to_string()).collect(),
            features: features.to_vec(),
        })
    }

    pub fn n_columns(&self) -> usize {
        1 + self.dummy_locations.len() + self.features.len()
    }

    pub fn column_names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.n_columns());
        names.push(INTERCEPT.to_string());
        names.extend(self.dummy_locations.iter().map(|l| format!("location[{l}]")));
        names.extend(self.features.iter().map(|f| f.column_name().to_string()));
        names
    }

    /// Fill a design row for `row`.
    ///
    /// # Errors
    /// - `InsufficientData` if the row's site was not seen during fitting
    /// - `InsufficientData` if a selected feature is missing for the row
    ///
    /// # Panics
    /// Panics if `out` does not have length `n_columns()`.
    pub fn fill_design_row(&self, row: &ModeledRow, out: &mut [f64]) -> Result<(), AppError> {
        out.fill(0.0);
        out[0] = 1.0;

        if row.location != self.reference_location {
            let Some(pos) = self.dummy_locations.iter().position(|l| *l == row.location) else {
                return Err(AppError::insufficient(format!(
                    "No training rows for site '{}' (requested {}/{}).",
                    row.location, row.location, row.year
                )));
            };
            out[1 + pos] = 1.0;
        }

        let offset = 1 + self.dummy_locations.len();
        for (k, feature) in self.features.iter().enumerate() {
            let Some(v) = feature.value(row) else {
                return Err(AppError::insufficient(format!(
                    "Row {}/{} has no {}; drop or impute rows without winter data before fitting.",
                    row.location,
                    row.year,
                    feature.column_name()
                )));
            };
            out[offset + k] = v;
        }
        Ok(())
    }

    /// Predict bloom DOY for `row` from fitted coefficients.
    pub fn predict(&self, betas: &[f64], row: &ModeledRow) -> Result<f64, AppError> {
        let mut x = vec![0.0; self.n_columns()];
        self.fill_design_row(row, &mut x)?;
        Ok(x.iter().zip(betas).map(|(a, b)| a * b).sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn row(location: &str, mean: Option<f64>, chill: Option<bool>) -> ModeledRow {
        ModeledRow {
            location: location.to_string(),
            year: 2000,
            bloom_doy: 95,
            altitude: 0.0,
            mean_min_temp: mean,
            var_min_temp: None,
            chill_satisfied: chill,
        }
    }

    #[test]
    fn reference_level_is_alphabetically_first() {
        let rows = vec![row("washingtondc", Some(1.0), None), row("kyoto", Some(2.0), None), row("liestal", Some(3.0), None)];
        let spec = DesignSpec::from_rows(&rows, &[FeatureKind::MeanMinTemp]).unwrap();
        assert_eq!(spec.reference_location, "kyoto");
        assert_eq!(
            spec.column_names(),
            vec!["(intercept)", "location[liestal]", "location[washingtondc]", "mean_min_temp"]
        );
    }

    #[test]
    fn design_row_sets_indicator_and_features() {
        let rows = vec![row("kyoto", Some(1.0), Some(true)), row("liestal", Some(2.0), Some(false))];
        let spec = DesignSpec::from_rows(&rows, &[FeatureKind::MeanMinTemp, FeatureKind::ChillSatisfied]).unwrap();
        let mut out = vec![0.0; spec.n_columns()];
        spec.fill_design_row(&row("liestal", Some(33.5), Some(true)), &mut out).unwrap();
        assert_eq!(out, vec![1.0, 1.0, 33.5, 1.0]);

        spec.fill_design_row(&row("kyoto", Some(30.0), Some(false)), &mut out).unwrap();
        assert_eq!(out, vec![1.0, 0.0, 30.0, 0.0]);
    }

    #[test]
    fn single_site_is_rank_deficient() {
        let rows = vec![row("kyoto", Some(1.0), None), row("kyoto", Some(2.0), None)];
        let err = DesignSpec::from_rows(&rows, &[FeatureKind::MeanMinTemp]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RankDeficientModel);
    }

    #[test]
    fn unknown_site_and_missing_feature_are_insufficient_data() {
        let rows = vec![row("kyoto", Some(1.0), None), row("liestal", Some(2.0), None)];
        let spec = DesignSpec::from_rows(&rows, &[FeatureKind::MeanMinTemp]).unwrap();

        let err = spec.predict(&[0.0; 3], &row("vancouver", Some(1.0), None)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientData);

        let err = spec.predict(&[0.0; 3], &row("kyoto", None, None)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientData);
        assert!(err.to_string().contains("mean_min_temp"));
    }
}
