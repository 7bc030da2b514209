//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - generates the synthetic input tables
//! - runs the feature pipeline and (for `fit`) the regression
//! - prints reports
//! - writes optional exports

use clap::Parser;
use log::{debug, info};

use crate::cli::{Command, RunArgs};
use crate::data::{SampleConfig, SampleData, generate_sample};
use crate::domain::{ChillRule, FeatureSet, PipelineConfig};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `bloom` binary.
pub fn run() -> Result<(), AppError> {
    // Environment first so `BLOOM_*` variables from `.env` feed clap's `env` fallbacks.
    dotenvy::dotenv().ok();
    let cli = crate::cli::Cli::parse();
    crate::logging::init(cli.verbose);

    match cli.command {
        Command::Fit(args) => handle_fit(&args),
        Command::Features(args) => handle_features(&args),
    }
}

fn handle_fit(args: &RunArgs) -> Result<(), AppError> {
    let config = pipeline_config_from_args(args);
    let data = sample_from_args(args)?;
    let run = pipeline::run_pipeline(&data.blooms, &data.weather, &config)?;

    println!(
        "{}",
        crate::report::format_run_header(
            &config,
            data.blooms.len(),
            run.tables.features.len(),
            run.tables.modeled.len()
        )
    );
    println!("{}", crate::report::format_fit_report(&run.model.report));
    println!(
        "{}",
        crate::report::format_residual_extremes(&run.model, &run.training_rows, 5)
    );

    if let Some(path) = &args.compare_report {
        let baseline = crate::io::read_report_json(path)?;
        info!("Comparing against saved report {}", path.display());
        println!("{}", crate::report::format_report_comparison(&baseline, &run.model.report));
    }

    write_table_exports(args, &run.tables)?;
    if let Some(path) = &args.export_report {
        crate::io::write_report_json(path, &run.model.report)?;
        info!("Wrote fit report to {}", path.display());
    }

    Ok(())
}

fn handle_features(args: &RunArgs) -> Result<(), AppError> {
    let config = pipeline_config_from_args(args);
    let data = sample_from_args(args)?;
    let tables = pipeline::build_features(&data.blooms, &data.weather, &config)?;

    println!(
        "{}",
        crate::report::format_run_header(&config, data.blooms.len(), tables.features.len(), tables.modeled.len())
    );
    println!("{}", crate::report::format_feature_table(&tables.features, args.top));

    write_table_exports(args, &tables)
}

fn write_table_exports(args: &RunArgs, tables: &pipeline::FeatureTables) -> Result<(), AppError> {
    if let Some(path) = &args.export_features {
        crate::io::write_features_csv(path, &tables.features)?;
        info!("Wrote {} winter features to {}", tables.features.len(), path.display());
    }
    if let Some(path) = &args.export_rows {
        crate::io::write_modeled_csv(path, &tables.modeled)?;
        info!("Wrote {} modeled rows to {}", tables.modeled.len(), path.display());
    }
    Ok(())
}

fn sample_from_args(args: &RunArgs) -> Result<SampleData, AppError> {
    let config = SampleConfig {
        seed: args.seed,
        start_year: args.start_year,
        n_years: args.years,
        ..SampleConfig::default()
    };
    debug!("Sample config: {config:?}");
    generate_sample(&config)
}

pub fn pipeline_config_from_args(args: &RunArgs) -> PipelineConfig {
    PipelineConfig {
        chill: ChillRule {
            threshold: args.chill_threshold,
            streak_days: args.chill_streak_days,
        },
        year_cutoff: args.year_cutoff,
        features: FeatureSet::new(args.features.iter().copied()),
        chill_missing: args.chill_missing,
    }
}
