// Shared fixtures for the integration tests.
// Each test binary includes this module with `mod fixtures;`, so not every helper is used everywhere.
#![allow(dead_code)]

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Weekday};
use room_forecast::core::forecast::point::Prediction;
use room_forecast::core::occupancy::booking_event::BookingEvent;
use room_forecast::core::occupancy::sample::OccupancySample;
use room_forecast::core::ports::{FittedModel, ModelError, SeasonalModel};
use serde::Deserialize;
use std::fs;

// JSON -> DTO (transport shape)
#[derive(Debug, Clone, Deserialize)]
pub struct BookingHistoryDto {
    pub first_day: String,
    pub days: u32,
    pub rooms: Vec<RoomScheduleDto>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RoomScheduleDto {
    pub room_id: String,
    pub start_hour: u32,
    pub end_hour: u32,
}

/// Daily weekday bookings for every room in json/booking_history.json.
pub fn booking_history() -> Vec<BookingEvent> {
    let json_str = fs::read_to_string("./tests/fixtures/json/booking_history.json").unwrap();
    let dto: BookingHistoryDto = serde_json::from_str(&json_str).unwrap();
    let first_day = NaiveDate::parse_from_str(&dto.first_day, "%Y-%m-%d").unwrap();

    dto.rooms
        .iter()
        .flat_map(|room| weekday_bookings(&room.room_id, first_day, dto.days, room.start_hour, room.end_hour))
        .collect()
}

pub fn weekday_bookings(
    room_id: &str,
    first_day: NaiveDate,
    days: u32,
    start_hour: u32,
    end_hour: u32,
) -> Vec<BookingEvent> {
    (0..days as i64)
        .map(|offset| first_day + Duration::days(offset))
        .filter(|day| !matches!(day.weekday(), Weekday::Sat | Weekday::Sun))
        .map(|day| {
            BookingEvent::new(
                room_id,
                day.and_hms_opt(start_hour, 0, 0).unwrap(),
                day.and_hms_opt(end_hour, 0, 0).unwrap(),
            )
        })
        .collect()
}

pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, 0))
        .unwrap()
}

/// Predicts half occupancy everywhere.
pub struct HalfModel;

pub struct FittedHalf;

impl SeasonalModel for HalfModel {
    type Fitted = FittedHalf;

    fn fit(&self, _history: &[OccupancySample]) -> Result<FittedHalf, ModelError> {
        Ok(FittedHalf)
    }
}

impl FittedModel for FittedHalf {
    fn predict(&self, at: &[NaiveDateTime]) -> Result<Vec<Prediction>, ModelError> {
        Ok(vec![
            Prediction {
                mean: 0.5,
                lower: 0.2,
                upper: 0.8,
            };
            at.len()
        ])
    }
}
