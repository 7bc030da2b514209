//! Collapse sub-daily readings into one row per (location, date).

use std::collections::BTreeMap;

use chrono::NaiveDate;
use log::debug;

use crate::domain::{DailyWeatherSummary, WindowedObservation};

/// Reduce windowed readings to daily extremes.
///
/// Output is sorted by `(location, date)` and has exactly one row per
/// observed pair.
pub fn aggregate_daily(rows: &[WindowedObservation]) -> Vec<DailyWeatherSummary> {
    let mut days: BTreeMap<(&str, NaiveDate), DailyWeatherSummary> = BTreeMap::new();

    for row in rows {
        days.entry((row.location.as_str(), row.date))
            .and_modify(|day| {
                day.min_temp = day.min_temp.min(row.temp_min);
                day.max_temp = day.max_temp.max(row.temp_max);
                day.min_humidity = day.min_humidity.min(row.humidity);
                day.max_humidity = day.max_humidity.max(row.humidity);
                day.min_pressure = day.min_pressure.min(row.pressure);
                day.max_pressure = day.max_pressure.max(row.pressure);
            })
            .or_insert_with(|| DailyWeatherSummary {
                location: row.location.clone(),
                date: row.date,
                month: row.month,
                calendar_year: row.calendar_year,
                bloom_year: row.bloom_year,
                winter_month_index: row.winter_month_index,
                min_temp: row.temp_min,
                max_temp: row.temp_max,
                min_humidity: row.humidity,
                max_humidity: row.humidity,
                min_pressure: row.pressure,
                max_pressure: row.pressure,
            });
    }

    debug!("Daily aggregation: {} readings -> {} days", rows.len(), days.len());
    days.into_values().collect()
}
