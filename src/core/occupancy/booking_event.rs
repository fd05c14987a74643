// A room booking as read from the booking store.
//
// Purpose
// - Carry the raw interval that the rasterizer turns into hourly occupancy.
//
// Boundaries
// - Read-only. Events are fetched once per run and never written back.

use chrono::NaiveDateTime;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingEvent {
    pub room_id: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl BookingEvent {
    pub fn new(room_id: impl Into<String>, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            room_id: room_id.into(),
            start,
            end,
        }
    }

    /// Zero-length and reversed bookings occupy nothing.
    pub fn has_duration(&self) -> bool {
        self.start < self.end
    }
}
