//! Output helpers.
//!
//! - winter feature / modeled-row CSV exports
//! - fit report JSON read/write

pub mod export;

pub use export::*;
