//! `bloom-chill` library crate.
//!
//! Winter-chill feature engineering and bloom day-of-year regression for
//! cherry bloom records. The binary (`bloom`) is a thin wrapper around this
//! library so that:
//!
//! - every pipeline stage is testable without spawning processes
//! - the tables can be reused by other front-ends (notebooks, exports)

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod features;
pub mod fit;
pub mod io;
pub mod logging;
pub mod math;
pub mod models;
pub mod report;
