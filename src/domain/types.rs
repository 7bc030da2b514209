//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory as pipeline tables
//! - exported to CSV/JSON for downstream plotting
//! - compared row-for-row in determinism tests

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Default chill threshold (°F; must match the input temperature scale).
pub const DEFAULT_CHILL_THRESHOLD: f64 = 41.0;

/// Default number of cumulative cold days a winter needs.
pub const DEFAULT_CHILL_STREAK_DAYS: u32 = 30;

/// An observed peak-bloom date for one site and year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BloomRecord {
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    pub year: i32,
    pub bloom_date: NaiveDate,
    pub bloom_doy: u32,
}

impl BloomRecord {
    /// Build a record whose `year` and `bloom_doy` are derived from `bloom_date`.
    pub fn from_date(
        location: impl Into<String>,
        latitude: f64,
        longitude: f64,
        altitude: f64,
        bloom_date: NaiveDate,
    ) -> Self {
        Self {
            location: location.into(),
            latitude,
            longitude,
            altitude,
            year: bloom_date.year(),
            bloom_date,
            bloom_doy: bloom_date.ordinal(),
        }
    }

    /// Check that `year` and `bloom_doy` agree with `bloom_date`.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.location.trim().is_empty() {
            return Err(AppError::malformed("Bloom record has an empty location."));
        }
        if self.bloom_date.year() != self.year {
            return Err(AppError::malformed(format!(
                "Bloom record {}/{}: bloom_date {} is not in year {}.",
                self.location, self.year, self.bloom_date, self.year
            )));
        }
        if !(1..=366).contains(&self.bloom_doy) || self.bloom_doy != self.bloom_date.ordinal() {
            return Err(AppError::malformed(format!(
                "Bloom record {}/{}: bloom_doy {} does not match bloom_date {} (day {}).",
                self.location,
                self.year,
                self.bloom_doy,
                self.bloom_date,
                self.bloom_date.ordinal()
            )));
        }
        Ok(())
    }
}

/// One raw weather reading. Sub-daily readings are allowed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherObservation {
    pub location: String,
    pub timestamp: NaiveDateTime,
    pub temp_min: f64,
    pub temp_max: f64,
    pub pressure: f64,
    pub humidity: f64,
}

impl WeatherObservation {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.location.trim().is_empty() {
            return Err(AppError::malformed(format!(
                "Weather observation at {} has an empty location.",
                self.timestamp
            )));
        }
        let fields = [
            ("temp_min", self.temp_min),
            ("temp_max", self.temp_max),
            ("pressure", self.pressure),
            ("humidity", self.humidity),
        ];
        if let Some((name, _)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(AppError::malformed(format!(
                "Weather observation {}@{}: non-finite {name}.",
                self.location, self.timestamp
            )));
        }
        Ok(())
    }
}

/// A weather reading tagged with its place in the winter window.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowedObservation {
    pub location: String,
    pub date: NaiveDate,
    pub month: u32,
    pub calendar_year: i32,
    pub bloom_year: i32,
    pub winter_month_index: u8,
    pub temp_min: f64,
    pub temp_max: f64,
    pub pressure: f64,
    pub humidity: f64,
}

/// One row per (location, date) inside the winter window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyWeatherSummary {
    pub location: String,
    pub date: NaiveDate,
    pub month: u32,
    pub calendar_year: i32,
    pub bloom_year: i32,
    pub winter_month_index: u8,
    pub min_temp: f64,
    pub max_temp: f64,
    pub min_humidity: f64,
    pub max_humidity: f64,
    pub min_pressure: f64,
    pub max_pressure: f64,
}

impl DailyWeatherSummary {
    pub fn winter_key(&self) -> WinterKey {
        WinterKey::new(&self.location, self.bloom_year)
    }
}

/// Grouping key for everything computed per winter.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WinterKey {
    pub location: String,
    pub bloom_year: i32,
}

impl WinterKey {
    pub fn new(location: &str, bloom_year: i32) -> Self {
        Self {
            location: location.to_string(),
            bloom_year,
        }
    }
}

impl std::fmt::Display for WinterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.location, self.bloom_year)
    }
}

/// Engineered features for one (location, bloom_year) winter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WinterFeature {
    pub location: String,
    pub bloom_year: i32,
    pub n_days: usize,
    pub mean_min_temp: f64,
    /// Sample variance; `None` for winters with fewer than two days.
    pub var_min_temp: Option<f64>,
    pub chill_satisfied: bool,
    pub chill_reached_on: Option<NaiveDate>,
}

/// A bloom record with its winter features attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeledRow {
    pub location: String,
    pub year: i32,
    pub bloom_doy: u32,
    pub altitude: f64,
    pub mean_min_temp: Option<f64>,
    pub var_min_temp: Option<f64>,
    pub chill_satisfied: Option<bool>,
}

/// Winter features that can enter the regression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ValueEnum)]
pub enum FeatureKind {
    #[serde(rename = "mean_min_temp")]
    #[value(name = "mean_min_temp", alias = "mean")]
    MeanMinTemp,
    #[serde(rename = "var_min_temp")]
    #[value(name = "var_min_temp", alias = "var")]
    VarMinTemp,
    #[serde(rename = "chill_satisfied")]
    #[value(name = "chill_satisfied", alias = "chill")]
    ChillSatisfied,
}

impl FeatureKind {
    pub fn column_name(self) -> &'static str {
        match self {
            FeatureKind::MeanMinTemp => "mean_min_temp",
            FeatureKind::VarMinTemp => "var_min_temp",
            FeatureKind::ChillSatisfied => "chill_satisfied",
        }
    }

    /// Numeric value of this feature for a row, if present.
    pub fn value(self, row: &ModeledRow) -> Option<f64> {
        match self {
            FeatureKind::MeanMinTemp => row.mean_min_temp,
            FeatureKind::VarMinTemp => row.var_min_temp,
            FeatureKind::ChillSatisfied => row.chill_satisfied.map(|c| if c { 1.0 } else { 0.0 }),
        }
    }
}

/// Ordered, de-duplicated set of features entering the regression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSet(Vec<FeatureKind>);

impl FeatureSet {
    pub fn new(kinds: impl IntoIterator<Item = FeatureKind>) -> Self {
        let mut kinds: Vec<FeatureKind> = kinds.into_iter().collect();
        kinds.sort();
        kinds.dedup();
        Self(kinds)
    }

    pub fn kinds(&self) -> &[FeatureKind] {
        &self.0
    }

    pub fn contains(&self, kind: FeatureKind) -> bool {
        self.0.contains(&kind)
    }
}

impl Default for FeatureSet {
    fn default() -> Self {
        Self::new([FeatureKind::MeanMinTemp])
    }
}

/// What the joiner records for `chill_satisfied` when a bloom year has no winter data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ChillMissingPolicy {
    /// Treat "no winter found" as "no qualifying streak".
    ///
    /// Only sound when the caller has restricted the bloom records to years
    /// where weather coverage is expected.
    DefaultFalse,
    /// Leave the flag missing, like the continuous features.
    LeaveMissing,
}

/// Chill accumulation rule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChillRule {
    /// A day is cold when its minimum temperature is at or below this value.
    pub threshold: f64,
    /// Number of cumulative cold days that satisfies the requirement.
    pub streak_days: u32,
}

impl ChillRule {
    pub fn validate(&self) -> Result<(), AppError> {
        if !self.threshold.is_finite() {
            return Err(AppError::config("Chill threshold must be finite."));
        }
        if self.streak_days == 0 {
            return Err(AppError::config("Required chill streak must be at least one day."));
        }
        Ok(())
    }
}

impl Default for ChillRule {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_CHILL_THRESHOLD,
            streak_days: DEFAULT_CHILL_STREAK_DAYS,
        }
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags / environment (plus defaults).
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub chill: ChillRule,
    /// Keep only bloom records with `year > year_cutoff`.
    pub year_cutoff: Option<i32>,
    pub features: FeatureSet,
    pub chill_missing: ChillMissingPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            chill: ChillRule::default(),
            year_cutoff: None,
            features: FeatureSet::default(),
            chill_missing: ChillMissingPolicy::DefaultFalse,
        }
    }
}

/// One estimated coefficient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coefficient {
    pub name: String,
    pub estimate: f64,
    pub std_error: f64,
    /// `None` when the standard error is zero.
    pub t_value: Option<f64>,
}

/// Fit quality diagnostics (in-sample).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitQuality {
    pub n: usize,
    pub n_params: usize,
    pub df_resid: usize,
    pub sse: f64,
    pub rmse: f64,
    pub r_squared: f64,
    pub adj_r_squared: f64,
}

/// Structured summary of a bloom-DOY regression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitReport {
    pub response: String,
    pub reference_location: String,
    pub features: Vec<FeatureKind>,
    pub coefficients: Vec<Coefficient>,
    pub quality: FitQuality,
}
