//! Input data for the pipeline.
//!
//! Real bloom and weather tables arrive from an external ingestion step; this
//! module provides a seeded synthetic equivalent for the CLI and tests.

pub mod sample;

pub use sample::*;
