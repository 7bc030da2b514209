//! Bloom-DOY linear model layout.
//!
//! The design is kept as a small, serializable description so fitting and
//! prediction share one encoding of sites and features.

pub mod model;

pub use model::*;
