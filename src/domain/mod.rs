//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - input tables (`BloomRecord`, `WeatherObservation`)
//! - derived tables (`DailyWeatherSummary`, `WinterFeature`, `ModeledRow`)
//! - run configuration (`PipelineConfig`, `ChillRule`, `FeatureSet`)
//! - fit outputs (`FitReport`, `Coefficient`, `FitQuality`)

pub mod types;

pub use types::*;
