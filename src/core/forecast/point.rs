// Forecast values for one room and one future hour.
//
// Purpose
// - Prediction: raw model output (mean and interval bounds), unbounded.
// - ForecastPoint: a prediction tagged with room and hour, clamped to [0, 1].
// - PersistedForecastRow: the stored counterpart with creation and update times.
//
// Notes
// - Each bound is clamped on its own. Extreme raw output can leave lower above mean;
//   consumers already tolerate that, so it is not reordered.

use chrono::NaiveDateTime;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub mean: f64,
    pub lower: f64,
    pub upper: f64,
}

impl Prediction {
    pub fn clamped_to_unit(self) -> Self {
        Self {
            mean: self.mean.clamp(0.0, 1.0),
            lower: self.lower.clamp(0.0, 1.0),
            upper: self.upper.clamp(0.0, 1.0),
        }
    }

    pub fn is_nan(&self) -> bool {
        self.mean.is_nan() || self.lower.is_nan() || self.upper.is_nan()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastPoint {
    pub room_id: String,
    pub hour: NaiveDateTime,
    pub mean: f64,
    pub lower: f64,
    pub upper: f64,
}

impl ForecastPoint {
    pub fn from_prediction(room_id: impl Into<String>, hour: NaiveDateTime, prediction: Prediction) -> Self {
        let clamped = prediction.clamped_to_unit();
        Self {
            room_id: room_id.into(),
            hour,
            mean: clamped.mean,
            lower: clamped.lower,
            upper: clamped.upper,
        }
    }

    pub fn key(&self) -> (String, NaiveDateTime) {
        (self.room_id.clone(), self.hour)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PersistedForecastRow {
    pub room_id: String,
    pub hour: NaiveDateTime,
    pub mean: f64,
    pub lower: f64,
    pub upper: f64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl PersistedForecastRow {
    pub fn inserted(point: &ForecastPoint, at: NaiveDateTime) -> Self {
        Self {
            room_id: point.room_id.clone(),
            hour: point.hour,
            mean: point.mean,
            lower: point.lower,
            upper: point.upper,
            created_at: at,
            updated_at: at,
        }
    }

    /// Overwrites the values and refreshes `updated_at`; `created_at` is kept.
    pub fn overwrite(&mut self, point: &ForecastPoint, at: NaiveDateTime) {
        self.mean = point.mean;
        self.lower = point.lower;
        self.upper = point.upper;
        self.updated_at = at;
    }
}
