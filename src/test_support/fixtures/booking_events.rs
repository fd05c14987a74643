// Shared test fixtures for booking events.
// The default event is read from json/booking_event.json.

use crate::core::occupancy::booking_event::BookingEvent;
use chrono::{Datelike, Duration, NaiveDateTime, Weekday};
use serde::Deserialize;
use std::fs;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// JSON -> DTO (transport shape)
#[derive(Debug, Clone, Deserialize)]
pub struct BookingEventDto {
    pub room_id: String,
    pub start: String,
    pub end: String,
}

pub struct BookingEventBuilder {
    inner: BookingEvent,
}

impl Default for BookingEventBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(dead_code)]
impl BookingEventBuilder {
    pub fn new() -> Self {
        let json_str = fs::read_to_string("./src/test_support/fixtures/json/booking_event.json").unwrap();
        let dto: BookingEventDto = serde_json::from_str(&json_str).unwrap();

        Self {
            inner: BookingEvent {
                room_id: dto.room_id,
                start: NaiveDateTime::parse_from_str(&dto.start, TIMESTAMP_FORMAT).unwrap(),
                end: NaiveDateTime::parse_from_str(&dto.end, TIMESTAMP_FORMAT).unwrap(),
            },
        }
    }

    pub fn room_id(mut self, v: impl Into<String>) -> Self {
        self.inner.room_id = v.into();
        self
    }

    pub fn start(mut self, v: NaiveDateTime) -> Self {
        self.inner.start = v;
        self
    }

    pub fn end(mut self, v: NaiveDateTime) -> Self {
        self.inner.end = v;
        self
    }

    pub fn build(self) -> BookingEvent {
        self.inner
    }
}

/// One booking from `start_hour` to `end_hour` on every weekday of `days` consecutive days.
pub fn weekday_bookings(
    room_id: &str,
    first_day: NaiveDateTime,
    days: u32,
    start_hour: u32,
    end_hour: u32,
) -> Vec<BookingEvent> {
    let first_day = first_day.date();
    (0..days as i64)
        .map(|offset| first_day + Duration::days(offset))
        .filter(|day| !matches!(day.weekday(), Weekday::Sat | Weekday::Sun))
        .map(|day| {
            BookingEventBuilder::new()
                .room_id(room_id)
                .start(day.and_hms_opt(start_hour, 0, 0).unwrap())
                .end(day.and_hms_opt(end_hour, 0, 0).unwrap())
                .build()
        })
        .collect()
}
