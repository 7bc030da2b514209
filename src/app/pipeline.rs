//! Shared pipeline logic used by every CLI subcommand.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! window -> daily -> chill -> features -> join -> fit
//!
//! Each stage takes a fully materialized table and returns a new one; nothing
//! is mutated after it is produced.

use log::{debug, warn};

use crate::domain::{BloomRecord, DailyWeatherSummary, ModeledRow, PipelineConfig, WeatherObservation, WinterFeature};
use crate::error::AppError;
use crate::features::{aggregate_daily, aggregate_winter_features, assign_winter_window, detect_chill, join_bloom_features};
use crate::fit::{BloomModel, complete_cases, fit_bloom_model};

/// Engineered tables, before any model is fit.
#[derive(Debug, Clone)]
pub struct FeatureTables {
    pub daily: Vec<DailyWeatherSummary>,
    pub features: Vec<WinterFeature>,
    pub modeled: Vec<ModeledRow>,
}

/// All computed outputs of a single run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub tables: FeatureTables,
    /// Rows that actually entered the regression.
    pub training_rows: Vec<ModeledRow>,
    pub model: BloomModel,
}

/// Validate inputs and build the daily, winter-feature and modeled tables.
pub fn build_features(
    blooms: &[BloomRecord],
    weather: &[WeatherObservation],
    config: &PipelineConfig,
) -> Result<FeatureTables, AppError> {
    config.chill.validate()?;
    for b in blooms {
        b.validate()?;
    }
    for w in weather {
        w.validate()?;
    }

    let windowed = assign_winter_window(weather);
    debug!(
        "Winter window: {} of {} readings fall in Oct-Feb",
        windowed.len(),
        weather.len()
    );

    let daily = aggregate_daily(&windowed);
    let chill = detect_chill(&daily, config.chill)?;
    let features = aggregate_winter_features(&daily, &chill);
    let modeled = join_bloom_features(blooms, &features, config.year_cutoff, config.chill_missing);

    Ok(FeatureTables {
        daily,
        features,
        modeled,
    })
}

/// Execute the full pipeline and fit the bloom model.
pub fn run_pipeline(
    blooms: &[BloomRecord],
    weather: &[WeatherObservation],
    config: &PipelineConfig,
) -> Result<RunOutput, AppError> {
    let tables = build_features(blooms, weather, config)?;

    let (training_rows, dropped) = complete_cases(&tables.modeled, &config.features);
    if dropped > 0 {
        warn!(
            "Dropped {dropped} of {} modeled rows missing selected features.",
            tables.modeled.len()
        );
    }

    let model = fit_bloom_model(&training_rows, &config.features)?;

    Ok(RunOutput {
        tables,
        training_rows,
        model,
    })
}
