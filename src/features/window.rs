//! Winter window assignment.
//!
//! A winter runs from October of year `Y` through February of `Y + 1` and is
//! credited to bloom year `Y + 1`. Readings from March through September are
//! outside every window and are dropped.

use chrono::Datelike;

use crate::domain::{WeatherObservation, WindowedObservation};

/// Position of a calendar month inside the winter window.
///
/// Returns `(bloom_year_offset, winter_month_index)` or `None` for months
/// outside the window.
pub fn winter_position(month: u32) -> Option<(i32, u8)> {
    match month {
        10 => Some((1, 1)),
        11 => Some((1, 2)),
        12 => Some((1, 3)),
        1 => Some((0, 4)),
        2 => Some((0, 5)),
        _ => None,
    }
}

/// Tag a single observation with its bloom year and winter month index.
pub fn window_observation(obs: &WeatherObservation) -> Option<WindowedObservation> {
    let date = obs.timestamp.date();
    let month = date.month();
    let calendar_year = date.year();
    let (offset, winter_month_index) = winter_position(month)?;

    Some(WindowedObservation {
        location: obs.location.clone(),
        date,
        month,
        calendar_year,
        bloom_year: calendar_year + offset,
        winter_month_index,
        temp_min: obs.temp_min,
        temp_max: obs.temp_max,
        pressure: obs.pressure,
        humidity: obs.humidity,
    })
}

/// Tag every in-window observation, preserving input order.
pub fn assign_winter_window(observations: &[WeatherObservation]) -> Vec<WindowedObservation> {
    observations.iter().filter_map(window_observation).collect()
}
