//! Fit and evaluate the bloom-DOY regression.
//!
//! Model:
//!
//! ```text
//! bloom_doy ~ 1 + location dummies + selected winter features
//! ```
//!
//! Fit quality is in-sample only: R², adjusted R², and RMSE over the
//! training rows.

use log::{debug, info};
use nalgebra::{DMatrix, DVector};

use crate::domain::{Coefficient, FeatureSet, FitQuality, FitReport, ModeledRow};
use crate::error::{AppError, ErrorKind};
use crate::math::{first_dependent_column, ols};
use crate::models::DesignSpec;

/// A fitted model that can score new rows.
#[derive(Debug, Clone)]
pub struct BloomModel {
    pub design: DesignSpec,
    pub betas: Vec<f64>,
    pub report: FitReport,
}

impl BloomModel {
    /// Predicted bloom DOY for `row`.
    pub fn predict(&self, row: &ModeledRow) -> Result<f64, AppError> {
        self.design.predict(&self.betas, row)
    }
}

/// Keep rows that have every selected feature; returns the rows and the number dropped.
pub fn complete_cases(rows: &[ModeledRow], features: &FeatureSet) -> (Vec<ModeledRow>, usize) {
    let kept: Vec<ModeledRow> = rows
        .iter()
        .filter(|r| features.kinds().iter().all(|f| f.value(r).is_some()))
        .cloned()
        .collect();
    let dropped = rows.len() - kept.len();
    (kept, dropped)
}

/// Fit `bloom_doy` on site identity plus `features` by ordinary least squares.
pub fn fit_bloom_model(rows: &[ModeledRow], features: &FeatureSet) -> Result<BloomModel, AppError> {
    if rows.is_empty() {
        return Err(AppError::insufficient("No modeled rows to fit."));
    }

    let design = DesignSpec::from_rows(rows, features.kinds())?;
    let n = rows.len();
    let p = design.n_columns();
    if n <= p {
        return Err(AppError::insufficient(format!(
            "Underdetermined: n={n} rows for p={p} parameters."
        )));
    }

    let mut x = DMatrix::<f64>::zeros(n, p);
    let mut y = DVector::<f64>::zeros(n);
    let mut buf = vec![0.0; p];
    for (i, row) in rows.iter().enumerate() {
        design.fill_design_row(row, &mut buf)?;
        for (j, v) in buf.iter().enumerate() {
            x[(i, j)] = *v;
        }
        y[i] = f64::from(row.bloom_doy);
    }

    let names = design.column_names();
    if let Some(j) = first_dependent_column(&x) {
        return Err(AppError::rank_deficient(
            &names[j],
            "column is a linear combination of the preceding predictors",
        ));
    }

    let sol = ols(&x, &y).ok_or_else(|| {
        AppError::new(
            ErrorKind::RankDeficientModel,
            "Least squares solve failed: design matrix is numerically singular.",
        )
    })?;

    let r_squared = if sol.sst > 0.0 {
        1.0 - sol.sse / sol.sst
    } else if sol.sse == 0.0 {
        1.0
    } else {
        0.0
    };
    let adj_r_squared = 1.0 - (1.0 - r_squared) * (n as f64 - 1.0) / sol.df_resid as f64;
    let quality = FitQuality {
        n,
        n_params: p,
        df_resid: sol.df_resid,
        sse: sol.sse,
        rmse: (sol.sse / n as f64).sqrt(),
        r_squared,
        adj_r_squared,
    };

    let coefficients: Vec<Coefficient> = names
        .into_iter()
        .enumerate()
        .map(|(j, name)| {
            let estimate = sol.beta[j];
            let std_error = sol.std_errors[j];
            let t_value = (std_error > 0.0).then(|| estimate / std_error);
            Coefficient {
                name,
                estimate,
                std_error,
                t_value,
            }
        })
        .collect();

    debug!("OLS: n={n}, p={p}, SSE={:.3}", sol.sse);
    info!(
        "Fitted bloom model: R²={:.3}, RMSE={:.2} days over {n} rows",
        quality.r_squared, quality.rmse
    );

    let report = FitReport {
        response: "bloom_doy".to_string(),
        reference_location: design.reference_location.clone(),
        features: features.kinds().to_vec(),
        coefficients,
        quality,
    };

    Ok(BloomModel {
        design,
        betas: sol.beta.iter().copied().collect(),
        report,
    })
}
