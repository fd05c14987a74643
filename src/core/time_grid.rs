// Hour and day arithmetic on naive wall-clock timestamps.
//
// All timestamps in this crate are naive local time, matching the DATETIME columns of
// the booking store. Rounding never fails: it only manipulates whole hours and days.

use chrono::{NaiveDateTime, NaiveTime, TimeDelta, Timelike};

pub const ONE_HOUR: TimeDelta = TimeDelta::hours(1);

pub fn floor_to_day(at: NaiveDateTime) -> NaiveDateTime {
    at.date().and_time(NaiveTime::MIN)
}

pub fn floor_to_hour(at: NaiveDateTime) -> NaiveDateTime {
    floor_to_day(at) + TimeDelta::hours(i64::from(at.hour()))
}

pub fn ceil_to_hour(at: NaiveDateTime) -> NaiveDateTime {
    let floor = floor_to_hour(at);
    if floor == at { floor } else { floor + ONE_HOUR }
}

/// Every top-of-hour timestamp in `[from, to]`, ascending. `from` must already be on an hour.
pub fn hours_between(from: NaiveDateTime, to: NaiveDateTime) -> impl Iterator<Item = NaiveDateTime> {
    std::iter::successors(Some(from), |hour| Some(*hour + ONE_HOUR)).take_while(move |hour| *hour <= to)
}
