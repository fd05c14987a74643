// Future timestamps a room is forecast for.
//
// Responsibilities
// - Step hourly for `horizon_days * 24` hours starting right after the last observed hour.
// - Keep only working hours on weekdays (Monday to Friday).
// - Stop at the last representable hour instead of overflowing.

use crate::core::occupancy::working_hours::WorkingHours;
use chrono::{Datelike, NaiveDateTime, TimeDelta};

pub fn future_hours(last_observed: NaiveDateTime, horizon_days: u32, window: WorkingHours) -> Vec<NaiveDateTime> {
    (1..=i64::from(horizon_days) * 24)
        .map_while(|step| last_observed.checked_add_signed(TimeDelta::hours(step)))
        .filter(|hour| window.contains(*hour) && is_weekday(*hour))
        .collect()
}

pub fn is_weekday(at: NaiveDateTime) -> bool {
    at.weekday().num_days_from_monday() < 5
}
