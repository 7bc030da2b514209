//! Regression fitting.
//!
//! Responsibilities:
//!
//! - drop rows that lack selected features (`complete_cases`)
//! - fit OLS with site dummies and report coefficients, R², RMSE
//! - refuse rank-deficient or underdetermined designs with a named cause

pub mod regression;

pub use regression::*;
