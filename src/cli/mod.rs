//! Command-line parsing for the bloom-chill pipeline.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the feature/modeling code. Pipeline options can also be set
//! through `BLOOM_*` environment variables (a `.env` file is loaded first).

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{
    ChillMissingPolicy, DEFAULT_CHILL_STREAK_DAYS, DEFAULT_CHILL_THRESHOLD, FeatureKind,
};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "bloom", version, about = "Cherry bloom day-of-year model from winter chill features")]
pub struct Cli {
    /// Enable debug logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build winter features, fit the bloom model, print the fit report, and optionally export.
    Fit(RunArgs),
    /// Build and print the winter feature table only (no model fit).
    Features(RunArgs),
}

/// Options shared by all subcommands.
#[derive(Debug, Args, Clone)]
pub struct RunArgs {
    /// A day is cold when its minimum temperature is at or below this value.
    #[arg(long, env = "BLOOM_CHILL_THRESHOLD", default_value_t = DEFAULT_CHILL_THRESHOLD)]
    pub chill_threshold: f64,

    /// Cumulative cold days required to satisfy the chill requirement.
    #[arg(long, env = "BLOOM_CHILL_STREAK_DAYS", default_value_t = DEFAULT_CHILL_STREAK_DAYS)]
    pub chill_streak_days: u32,

    /// Keep only bloom years strictly after this year.
    #[arg(long, env = "BLOOM_YEAR_CUTOFF")]
    pub year_cutoff: Option<i32>,

    /// Winter features entering the regression (comma-separated).
    #[arg(
        long,
        env = "BLOOM_FEATURES",
        value_enum,
        value_delimiter = ',',
        default_value = "mean_min_temp"
    )]
    pub features: Vec<FeatureKind>,

    /// Chill flag for bloom years without winter weather.
    #[arg(long, value_enum, default_value_t = ChillMissingPolicy::DefaultFalse)]
    pub chill_missing: ChillMissingPolicy,

    /// Random seed for the synthetic sample.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// First bloom year of the synthetic sample.
    #[arg(long, default_value_t = 1981)]
    pub start_year: i32,

    /// Number of bloom years per site in the synthetic sample.
    #[arg(long, default_value_t = 40)]
    pub years: usize,

    /// Show at most this many rows of the feature table.
    #[arg(long, default_value_t = 20)]
    pub top: usize,

    /// Export the winter feature table to CSV.
    #[arg(long = "export-features")]
    pub export_features: Option<PathBuf>,

    /// Export the modeled rows (bloom records joined to features) to CSV.
    #[arg(long = "export-rows")]
    pub export_rows: Option<PathBuf>,

    /// Export the fit report to JSON.
    #[arg(long = "export-report")]
    pub export_report: Option<PathBuf>,

    /// Compare the fit against a report saved earlier with `--export-report`.
    #[arg(long = "compare-report")]
    pub compare_report: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_feature_list_and_defaults() {
        let cli = Cli::try_parse_from(["bloom", "fit", "--features", "mean_min_temp,chill_satisfied"]).unwrap();
        let Command::Fit(args) = cli.command else {
            panic!("expected fit");
        };
        assert_eq!(args.features, vec![FeatureKind::MeanMinTemp, FeatureKind::ChillSatisfied]);
        assert_eq!(args.chill_streak_days, 30);
        assert_eq!(args.chill_missing, ChillMissingPolicy::DefaultFalse);
    }

    #[test]
    fn parses_compare_report_path() {
        let cli = Cli::try_parse_from(["bloom", "fit", "--compare-report", "baseline.json"]).unwrap();
        let Command::Fit(args) = cli.command else {
            panic!("expected fit");
        };
        assert_eq!(args.compare_report, Some(PathBuf::from("baseline.json")));
        assert_eq!(args.export_report, None);
    }

    #[test]
    fn rejects_unknown_feature() {
        assert!(Cli::try_parse_from(["bloom", "fit", "--features", "altitude"]).is_err());
    }
}
