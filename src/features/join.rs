//! Attach winter features to bloom records.
//!
//! This is a left join on `(location, year = bloom_year)`: every bloom record
//! that survives the year filter yields exactly one `ModeledRow`.
//!
//! Missing-data policy, per field:
//! - `mean_min_temp` / `var_min_temp`: left missing. The trainer refuses rows
//!   without them, so the caller must drop or impute first.
//! - `chill_satisfied`: governed by `ChillMissingPolicy`.

use std::collections::HashMap;

use log::{debug, info};

use crate::domain::{BloomRecord, ChillMissingPolicy, ModeledRow, WinterFeature};

/// Whether a bloom record passes the `year > cutoff` filter.
pub fn passes_year_cutoff(record: &BloomRecord, year_cutoff: Option<i32>) -> bool {
    year_cutoff.is_none_or(|cutoff| record.year > cutoff)
}

/// Left-join bloom records to winter features, preserving bloom-record order.
pub fn join_bloom_features(
    blooms: &[BloomRecord],
    features: &[WinterFeature],
    year_cutoff: Option<i32>,
    chill_missing: ChillMissingPolicy,
) -> Vec<ModeledRow> {
    let index: HashMap<(&str, i32), &WinterFeature> = features
        .iter()
        .map(|f| ((f.location.as_str(), f.bloom_year), f))
        .collect();

    let mut unmatched = 0usize;
    let rows: Vec<ModeledRow> = blooms
        .iter()
        .filter(|b| passes_year_cutoff(b, year_cutoff))
        .map(|b| match index.get(&(b.location.as_str(), b.year)) {
            Some(f) => ModeledRow {
                location: b.location.clone(),
                year: b.year,
                bloom_doy: b.bloom_doy,
                altitude: b.altitude,
                mean_min_temp: Some(f.mean_min_temp),
                var_min_temp: f.var_min_temp,
                chill_satisfied: Some(f.chill_satisfied),
            },
            None => {
                unmatched += 1;
                ModeledRow {
                    location: b.location.clone(),
                    year: b.year,
                    bloom_doy: b.bloom_doy,
                    altitude: b.altitude,
                    mean_min_temp: None,
                    var_min_temp: None,
                    chill_satisfied: match chill_missing {
                        ChillMissingPolicy::DefaultFalse => Some(false),
                        ChillMissingPolicy::LeaveMissing => None,
                    },
                }
            }
        })
        .collect();

    debug!(
        "Join: {} bloom records -> {} rows after year filter {:?}",
        blooms.len(),
        rows.len(),
        year_cutoff
    );
    if unmatched > 0 {
        info!(
            "{unmatched} bloom row(s) have no winter weather; chill flag policy: {:?}",
            chill_missing
        );
    }
    rows
}
