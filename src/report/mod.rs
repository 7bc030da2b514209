//! Reporting utilities: fit summaries and feature tables for the terminal.

pub mod format;

pub use format::*;
