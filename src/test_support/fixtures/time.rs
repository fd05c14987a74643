// Time helpers shared by unit tests.

use crate::core::occupancy::sample::OccupancySample;
use crate::core::occupancy::working_hours::WorkingHours;
use chrono::{Duration, NaiveDate, NaiveDateTime};

pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, 0))
        .unwrap()
}

/// A rasterized-looking series: every window hour of `days` consecutive days, weekends
/// included, starting on the date of `first_hour`.
pub fn hourly_history(
    first_hour: NaiveDateTime,
    days: u32,
    window: WorkingHours,
    occupied: impl Fn(NaiveDateTime) -> bool,
) -> Vec<OccupancySample> {
    let first_day = first_hour.date();
    (0..days as i64)
        .map(|offset| first_day + Duration::days(offset))
        .flat_map(|day| (window.start_hour()..window.end_hour()).map(move |hour| day.and_hms_opt(hour, 0, 0).unwrap()))
        .map(|hour| OccupancySample::new(hour, occupied(hour)))
        .collect()
}
