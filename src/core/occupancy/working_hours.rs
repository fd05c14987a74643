// The part of each day that counts for occupancy, as a half-open hour range.

use chrono::{NaiveDateTime, Timelike};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WindowError {
    #[error("start hour {0} is outside 0..=23")]
    StartOutOfRange(u32),

    #[error("end hour {0} is outside 1..=24")]
    EndOutOfRange(u32),

    #[error("start hour {start} must be before end hour {end}")]
    Empty { start: u32, end: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkingHours {
    start_hour: u32,
    end_hour: u32,
}

impl WorkingHours {
    pub fn new(start_hour: u32, end_hour: u32) -> Result<Self, WindowError> {
        if start_hour > 23 {
            return Err(WindowError::StartOutOfRange(start_hour));
        }
        if end_hour == 0 || end_hour > 24 {
            return Err(WindowError::EndOutOfRange(end_hour));
        }
        if start_hour >= end_hour {
            return Err(WindowError::Empty {
                start: start_hour,
                end: end_hour,
            });
        }
        Ok(Self { start_hour, end_hour })
    }

    pub fn start_hour(&self) -> u32 {
        self.start_hour
    }

    pub fn end_hour(&self) -> u32 {
        self.end_hour
    }

    pub fn hours_per_day(&self) -> u32 {
        self.end_hour - self.start_hour
    }

    pub fn contains(&self, at: NaiveDateTime) -> bool {
        (self.start_hour..self.end_hour).contains(&at.hour())
    }
}

impl Default for WorkingHours {
    fn default() -> Self {
        Self {
            start_hour: 8,
            end_hour: 18,
        }
    }
}
