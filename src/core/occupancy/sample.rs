use chrono::NaiveDateTime;
use std::collections::BTreeMap;

pub const FREE: f64 = 0.0;
pub const OCCUPIED: f64 = 1.0;

/// One working hour of one room: `occupied` is 1.0 when any booking touches the hour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OccupancySample {
    pub hour: NaiveDateTime,
    pub occupied: f64,
}

impl OccupancySample {
    pub fn new(hour: NaiveDateTime, occupied: bool) -> Self {
        Self {
            hour,
            occupied: if occupied { OCCUPIED } else { FREE },
        }
    }
}

/// Hourly series per room, ascending by hour. Ordered by room id so iteration is deterministic.
pub type OccupancyByRoom = BTreeMap<String, Vec<OccupancySample>>;
