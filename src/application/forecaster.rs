// Per-room forecaster with the history gate.
//
// Purpose
// - Turn each room's rasterized history into clamped forecast points for future working hours.
//
// Responsibilities
// - Skip rooms with fewer samples than `min_history_days * hours_per_day`.
// - Fit the seasonal model per room and predict the weekday working hours of the horizon.
// - Convert every per-room failure into a skip with a warning; never fail the run.
//
// Concurrency
// - Rooms share nothing, so they are fanned out over rayon. Output stays ordered by room
//   id and hour, so the result does not depend on scheduling.

use crate::core::forecast::horizon::future_hours;
use crate::core::forecast::point::ForecastPoint;
use crate::core::occupancy::sample::{OccupancyByRoom, OccupancySample};
use crate::core::occupancy::working_hours::WorkingHours;
use crate::core::ports::{FittedModel, ModelError, SeasonalModel};
use rayon::prelude::*;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForecastSettings {
    pub horizon_days: u32,
    pub window: WorkingHours,
    pub min_history_days: u32,
}

impl ForecastSettings {
    pub fn points_needed(&self) -> usize {
        self.min_history_days as usize * self.window.hours_per_day() as usize
    }
}

impl Default for ForecastSettings {
    fn default() -> Self {
        Self {
            horizon_days: 7,
            window: WorkingHours::default(),
            min_history_days: 14,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum SkipReason {
    #[error("not enough history ({available} hours < {needed})")]
    InsufficientHistory { available: usize, needed: usize },

    #[error("no weekday working hours in the forecast horizon")]
    EmptyHorizon,

    #[error("model failed: {0}")]
    Model(#[from] ModelError),
}

#[derive(Debug, PartialEq)]
pub enum RoomOutcome {
    Forecast(Vec<ForecastPoint>),
    Skipped(SkipReason),
}

#[derive(Debug, Default, PartialEq)]
pub struct ForecastReport {
    pub points: Vec<ForecastPoint>,
    pub forecast_rooms: Vec<String>,
    pub skipped_rooms: Vec<(String, SkipReason)>,
}

pub struct RoomForecaster<'a, TModel>
where
    TModel: SeasonalModel,
{
    model: &'a TModel,
    settings: ForecastSettings,
}

impl<'a, TModel> RoomForecaster<'a, TModel>
where
    TModel: SeasonalModel,
{
    pub fn new(model: &'a TModel, settings: ForecastSettings) -> Self {
        Self { model, settings }
    }

    pub fn forecast(&self, occupancy: &OccupancyByRoom) -> ForecastReport {
        let rooms: Vec<(&String, &Vec<OccupancySample>)> = occupancy.iter().collect();
        let outcomes: Vec<(&String, RoomOutcome)> = rooms
            .into_par_iter()
            .map(|(room_id, samples)| (room_id, self.forecast_room(room_id, samples)))
            .collect();

        let mut report = ForecastReport::default();
        for (room_id, outcome) in outcomes {
            match outcome {
                RoomOutcome::Forecast(points) => {
                    report.points.extend(points);
                    report.forecast_rooms.push(room_id.clone());
                }
                RoomOutcome::Skipped(reason) => {
                    warn!(room_id = %room_id, %reason, "room skipped");
                    report.skipped_rooms.push((room_id.clone(), reason));
                }
            }
        }
        report
    }

    pub fn forecast_room(&self, room_id: &str, samples: &[OccupancySample]) -> RoomOutcome {
        match self.try_forecast_room(room_id, samples) {
            Ok(points) => RoomOutcome::Forecast(points),
            Err(reason) => RoomOutcome::Skipped(reason),
        }
    }

    fn try_forecast_room(&self, room_id: &str, samples: &[OccupancySample]) -> Result<Vec<ForecastPoint>, SkipReason> {
        let needed = self.settings.points_needed();
        if samples.len() < needed {
            return Err(SkipReason::InsufficientHistory {
                available: samples.len(),
                needed,
            });
        }
        let last_observed = samples
            .last()
            .map(|sample| sample.hour)
            .ok_or(SkipReason::Model(ModelError::InsufficientData { needed: 1, actual: 0 }))?;

        let hours = future_hours(last_observed, self.settings.horizon_days, self.settings.window);
        if hours.is_empty() {
            return Err(SkipReason::EmptyHorizon);
        }

        let fitted = self.model.fit(samples)?;
        let predictions = fitted.predict(&hours)?;
        if predictions.len() != hours.len() {
            return Err(SkipReason::Model(ModelError::Numeric(format!(
                "expected {} predictions, got {}",
                hours.len(),
                predictions.len()
            ))));
        }
        if predictions.iter().any(|prediction| prediction.is_nan()) {
            return Err(SkipReason::Model(ModelError::Numeric("prediction is NaN".into())));
        }

        Ok(hours
            .into_iter()
            .zip(predictions)
            .map(|(hour, prediction)| ForecastPoint::from_prediction(room_id, hour, prediction))
            .collect())
    }
}

#[cfg(test)]
mod room_forecaster_tests {
    use super::*;
    use crate::core::forecast::point::Prediction;
    use crate::test_support::fixtures::logs::LogCapture;
    use crate::test_support::fixtures::models::{ConstantModel, FailingModel};
    use crate::test_support::fixtures::time::{at, hourly_history};
    use chrono::{Datelike, Timelike};
    use rstest::{fixture, rstest};

    const ROOM: &str = "sala-norte@example.com";

    #[fixture]
    fn settings() -> ForecastSettings {
        ForecastSettings::default()
    }

    #[fixture]
    fn model() -> ConstantModel {
        ConstantModel::new(Prediction {
            mean: 0.5,
            lower: 0.2,
            upper: 0.8,
        })
    }

    fn occupancy_of(room_id: &str, samples: Vec<OccupancySample>) -> OccupancyByRoom {
        OccupancyByRoom::from([(room_id.to_string(), samples)])
    }

    #[rstest]
    fn it_should_skip_a_room_one_sample_short_of_the_gate(settings: ForecastSettings, model: ConstantModel) {
        // 14 days of 10 working hours minus one.
        let samples = hourly_history(at(2025, 2, 24, 8, 0), 14, settings.window, |_| false);
        let samples = samples[1..].to_vec();
        let forecaster = RoomForecaster::new(&model, settings);

        let report = forecaster.forecast(&occupancy_of(ROOM, samples));

        assert!(report.points.is_empty());
        assert_eq!(
            report.skipped_rooms,
            vec![(
                ROOM.to_string(),
                SkipReason::InsufficientHistory {
                    available: 139,
                    needed: 140
                }
            )]
        );
        assert_eq!(model.fit_calls(), 0);
    }

    #[rstest]
    fn it_should_warn_once_with_the_counts_when_a_room_is_skipped(settings: ForecastSettings, model: ConstantModel) {
        let logs = LogCapture::default();
        let _guard = tracing::subscriber::set_default(logs.subscriber());
        let samples = hourly_history(at(2025, 2, 24, 8, 0), 14, settings.window, |_| false);
        let samples = samples[1..].to_vec();
        let forecaster = RoomForecaster::new(&model, settings);

        let report = forecaster.forecast(&occupancy_of(ROOM, samples));

        assert!(report.points.is_empty());
        let warnings = logs.lines_at("WARN");
        assert_eq!(warnings.len(), 1, "{warnings:?}");
        assert!(warnings[0].contains("room skipped"), "{}", warnings[0]);
        assert!(warnings[0].contains("room_id=sala-norte@example.com"), "{}", warnings[0]);
        assert!(warnings[0].contains("139 hours < 140"), "{}", warnings[0]);
    }

    #[rstest]
    fn it_should_forecast_a_room_exactly_at_the_gate(settings: ForecastSettings, model: ConstantModel) {
        let samples = hourly_history(at(2025, 2, 24, 8, 0), 14, settings.window, |_| false);
        assert_eq!(samples.len(), 140);
        let forecaster = RoomForecaster::new(&model, settings);

        let report = forecaster.forecast(&occupancy_of(ROOM, samples));

        assert!(report.skipped_rooms.is_empty());
        assert_eq!(report.forecast_rooms, vec![ROOM.to_string()]);
        assert!(!report.points.is_empty());
        assert_eq!(model.fit_calls(), 1);
    }

    #[rstest]
    fn it_should_only_emit_weekday_working_hours(settings: ForecastSettings, model: ConstantModel) {
        let samples = hourly_history(at(2025, 2, 24, 8, 0), 15, settings.window, |_| false);
        let forecaster = RoomForecaster::new(&model, settings);

        let report = forecaster.forecast(&occupancy_of(ROOM, samples));

        assert_eq!(report.points.len(), 50);
        for point in &report.points {
            assert_eq!(point.room_id, ROOM);
            assert!((8..18).contains(&point.hour.hour()));
            assert!(point.hour.weekday().num_days_from_monday() < 5);
        }
        assert!(report.points.windows(2).all(|pair| pair[0].hour < pair[1].hour));
    }

    #[rstest]
    fn it_should_clamp_arbitrarily_large_model_output(settings: ForecastSettings) {
        let model = ConstantModel::new(Prediction {
            mean: 42.0,
            lower: -1e9,
            upper: f64::INFINITY,
        });
        let samples = hourly_history(at(2025, 2, 24, 8, 0), 14, settings.window, |_| true);
        let forecaster = RoomForecaster::new(&model, settings);

        let report = forecaster.forecast(&occupancy_of(ROOM, samples));

        assert!(!report.points.is_empty());
        for point in &report.points {
            assert_eq!(point.mean, 1.0);
            assert_eq!(point.lower, 0.0);
            assert_eq!(point.upper, 1.0);
        }
    }

    #[rstest]
    fn it_should_skip_a_room_whose_horizon_has_no_weekday_hours(model: ConstantModel) {
        let settings = ForecastSettings {
            horizon_days: 1,
            min_history_days: 12,
            ..ForecastSettings::default()
        };
        // Ends Friday 2025-03-07 17:00, so one day ahead is Friday evening and Saturday.
        let samples = hourly_history(at(2025, 2, 24, 8, 0), 12, settings.window, |_| false);
        assert_eq!(samples.last().unwrap().hour, at(2025, 3, 7, 17, 0));
        let forecaster = RoomForecaster::new(&model, settings);

        let outcome = forecaster.forecast_room(ROOM, &samples);

        assert_eq!(outcome, RoomOutcome::Skipped(SkipReason::EmptyHorizon));
    }

    #[rstest]
    fn it_should_skip_only_the_room_whose_model_fails(settings: ForecastSettings) {
        let model = FailingModel::for_room_with_first_hour(at(2025, 2, 24, 8, 0));
        let mut occupancy = OccupancyByRoom::new();
        occupancy.insert(
            "a@example.com".to_string(),
            hourly_history(at(2025, 2, 24, 8, 0), 14, settings.window, |_| false),
        );
        occupancy.insert(
            "b@example.com".to_string(),
            hourly_history(at(2025, 2, 25, 8, 0), 14, settings.window, |_| false),
        );
        let forecaster = RoomForecaster::new(&model, settings);

        let report = forecaster.forecast(&occupancy);

        assert_eq!(report.forecast_rooms, vec!["b@example.com".to_string()]);
        assert_eq!(report.skipped_rooms.len(), 1);
        assert_eq!(report.skipped_rooms[0].0, "a@example.com");
        assert!(matches!(report.skipped_rooms[0].1, SkipReason::Model(ModelError::Degenerate(_))));
        assert!(report.points.iter().all(|point| point.room_id == "b@example.com"));
    }

    #[rstest]
    fn it_should_skip_a_room_with_nan_predictions(settings: ForecastSettings) {
        let model = ConstantModel::new(Prediction {
            mean: f64::NAN,
            lower: 0.0,
            upper: 1.0,
        });
        let samples = hourly_history(at(2025, 2, 24, 8, 0), 14, settings.window, |_| false);
        let forecaster = RoomForecaster::new(&model, settings);

        let outcome = forecaster.forecast_room(ROOM, &samples);

        assert!(matches!(outcome, RoomOutcome::Skipped(SkipReason::Model(ModelError::Numeric(_)))));
    }

    #[rstest]
    fn it_should_report_rooms_in_id_order_on_every_run(settings: ForecastSettings, model: ConstantModel) {
        let mut occupancy = OccupancyByRoom::new();
        for index in 0..16 {
            occupancy.insert(
                format!("room-{index:02}@example.com"),
                hourly_history(at(2025, 2, 24, 8, 0), 14, settings.window, |_| false),
            );
        }
        let forecaster = RoomForecaster::new(&model, settings);

        let first = forecaster.forecast(&occupancy);
        let second = forecaster.forecast(&occupancy);

        assert_eq!(first, second);
        assert_eq!(first.forecast_rooms.len(), 16);
        let rooms_in_point_order: Vec<&str> = first.points.iter().map(|point| point.room_id.as_str()).collect();
        let mut sorted = rooms_in_point_order.clone();
        sorted.sort();
        assert_eq!(rooms_in_point_order, sorted);
    }
}
