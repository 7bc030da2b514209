//! Chill streak detection.
//!
//! For each winter we walk the days in date order with a per-winter streak
//! counter:
//!
//! - a cold day (`min_temp <= threshold`) extends the streak
//! - a warm day resets it to zero
//! - the first time the streak reaches `streak_days` the winter is satisfied
//!   and the scan stops
//!
//! Only the first qualifying streak matters. Winters with fewer than
//! `streak_days` days can never qualify.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use log::debug;
use rayon::prelude::*;

use crate::domain::{ChillRule, DailyWeatherSummary, WinterKey};
use crate::error::AppError;

/// Result of scanning one winter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChillOutcome {
    pub satisfied: bool,
    /// Date on which the streak first reached the required length.
    pub reached_on: Option<NaiveDate>,
    /// Number of days examined before the scan stopped.
    pub days_scanned: usize,
}

/// Streak state for a single winter. Never shared between winters.
#[derive(Debug)]
struct StreakScan {
    rule: ChillRule,
    streak: u32,
    scanned: usize,
}

impl StreakScan {
    fn new(rule: ChillRule) -> Self {
        Self {
            rule,
            streak: 0,
            scanned: 0,
        }
    }

    /// Feed one day; returns `true` once the requirement is met.
    fn push(&mut self, min_temp: f64) -> bool {
        self.scanned += 1;
        if min_temp <= self.rule.threshold {
            self.streak += 1;
        } else {
            self.streak = 0;
        }
        self.streak >= self.rule.streak_days
    }
}

/// Scan one winter's days, which must already be in chronological order.
pub fn scan_winter<'a, I>(days: I, rule: ChillRule) -> ChillOutcome
where
    I: IntoIterator<Item = &'a DailyWeatherSummary>,
{
    let mut scan = StreakScan::new(rule);
    for day in days {
        if scan.push(day.min_temp) {
            return ChillOutcome {
                satisfied: true,
                reached_on: Some(day.date),
                days_scanned: scan.scanned,
            };
        }
    }
    ChillOutcome {
        satisfied: false,
        reached_on: None,
        days_scanned: scan.scanned,
    }
}

/// Group daily rows by winter, each group sorted by date.
pub fn group_by_winter(days: &[DailyWeatherSummary]) -> BTreeMap<WinterKey, Vec<&DailyWeatherSummary>> {
    let mut groups: BTreeMap<WinterKey, Vec<&DailyWeatherSummary>> = BTreeMap::new();
    for day in days {
        groups.entry(day.winter_key()).or_default().push(day);
    }
    for group in groups.values_mut() {
        group.sort_by_key(|d| d.date);
    }
    groups
}

/// Evaluate the chill requirement for every winter present in `days`.
///
/// Winters are scanned in parallel; the result map is keyed and therefore
/// independent of scheduling.
pub fn detect_chill(
    days: &[DailyWeatherSummary],
    rule: ChillRule,
) -> Result<BTreeMap<WinterKey, ChillOutcome>, AppError> {
    rule.validate()?;

    let groups: Vec<(WinterKey, Vec<&DailyWeatherSummary>)> = group_by_winter(days).into_iter().collect();

    let outcomes: Vec<(WinterKey, ChillOutcome)> = groups
        .into_par_iter()
        .map(|(key, group)| {
            let outcome = scan_winter(group.iter().copied(), rule);
            (key, outcome)
        })
        .collect();

    let satisfied = outcomes.iter().filter(|(_, o)| o.satisfied).count();
    debug!(
        "Chill detection (threshold={}, streak={}): {satisfied}/{} winters satisfied",
        rule.threshold,
        rule.streak_days,
        outcomes.len()
    );

    Ok(outcomes.into_iter().collect())
}
