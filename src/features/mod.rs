//! Winter feature engineering.
//!
//! Stages, in order:
//!
//! - tag readings with bloom year and winter month (`window`)
//! - collapse to one row per site and day (`daily`)
//! - detect the chill streak per winter (`chill`)
//! - summarize each winter (`aggregate`)
//! - attach features to bloom records (`join`)

pub mod aggregate;
pub mod chill;
pub mod daily;
pub mod join;
pub mod window;

pub use aggregate::*;
pub use chill::*;
pub use daily::*;
pub use join::*;
pub use window::*;
