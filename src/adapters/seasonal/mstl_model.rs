// Seasonal model adapter backed by augurs.
//
// Purpose
// - Implement the SeasonalModel port with MSTL: the hourly series is decomposed into a daily and a
//   weekly seasonal component plus a trend, and the trend is forecast with AutoETS.
//
// Sampling
// - Rasterized history holds every working hour of every day, so it is a regular series whose step
//   is one working hour. The daily period is the number of working hours per day and the weekly
//   period seven times that. A timestamp maps to the number of steps after the last observation.
// - A seasonal period is only used once the history covers two full cycles of it. Without any
//   seasonal period the trend model forecasts on its own.
//
// Notes
// - A history with a single repeated value is forecast as that value; the trend model has nothing
//   to estimate there.

use crate::core::forecast::point::Prediction;
use crate::core::occupancy::sample::OccupancySample;
use crate::core::ports::{FittedModel, ModelError, SeasonalModel};
use augurs::{
    ets::AutoETS,
    forecaster::{Forecaster, transforms::LinearInterpolator},
    mstl::MSTLModel,
};
use chrono::{NaiveDateTime, Timelike};
use std::collections::BTreeSet;

pub const DEFAULT_INTERVAL_WIDTH: f64 = 0.8;

const CYCLES_NEEDED: usize = 2;
const DAYS_PER_WEEK: usize = 7;

/// Yearly seasonality is never modelled: the lookback window is far shorter than two years.
#[derive(Debug, Clone, PartialEq)]
pub struct MstlSeasonalModel {
    pub daily_seasonality: bool,
    pub weekly_seasonality: bool,
    pub interval_width: f64,
}

impl Default for MstlSeasonalModel {
    fn default() -> Self {
        Self {
            daily_seasonality: true,
            weekly_seasonality: true,
            interval_width: DEFAULT_INTERVAL_WIDTH,
        }
    }
}

impl MstlSeasonalModel {
    /// Seasonal periods, in samples, that the history is long enough to estimate.
    pub fn periods(&self, samples_per_day: usize, history_len: usize) -> Vec<usize> {
        let daily = (self.daily_seasonality && samples_per_day > 1).then_some(samples_per_day);
        let weekly = self.weekly_seasonality.then_some(samples_per_day * DAYS_PER_WEEK);
        [daily, weekly]
            .into_iter()
            .flatten()
            .filter(|period| history_len >= CYCLES_NEEDED * period)
            .collect()
    }

    fn validate(&self) -> Result<(), ModelError> {
        if !(self.interval_width > 0.0 && self.interval_width < 1.0) {
            return Err(ModelError::Degenerate(format!(
                "interval width {} must be inside (0, 1)",
                self.interval_width
            )));
        }
        Ok(())
    }
}

type SeriesPredictor = Box<dyn Fn(usize, f64) -> Result<augurs::Forecast, String>>;

fn interpolated() -> Vec<Box<dyn augurs::forecaster::Transformer>> {
    vec![Box::new(LinearInterpolator::default())]
}

fn fit_error(error: impl std::fmt::Display) -> ModelError {
    ModelError::Numeric(format!("fit failed: {error}"))
}

impl SeasonalModel for MstlSeasonalModel {
    type Fitted = FittedMstlModel;

    fn fit(&self, history: &[OccupancySample]) -> Result<FittedMstlModel, ModelError> {
        self.validate()?;
        if history.len() < 2 {
            return Err(ModelError::InsufficientData {
                needed: 2,
                actual: history.len(),
            });
        }
        let grid = WorkingHourGrid::from_history(history)?;

        let values: Vec<f64> = history.iter().map(|sample| sample.occupied).collect();
        if values.iter().any(|value| !value.is_finite()) {
            return Err(ModelError::Numeric("observations are not finite".into()));
        }
        if values.iter().all(|value| *value == values[0]) {
            return Ok(FittedMstlModel {
                grid,
                interval_width: self.interval_width,
                series: FittedSeries::Constant(values[0]),
            });
        }

        let periods = self.periods(grid.samples_per_day(), values.len());
        let predictor: SeriesPredictor = if periods.is_empty() {
            let mut forecaster = Forecaster::new(AutoETS::non_seasonal()).with_transformers(interpolated());
            forecaster.fit(values.as_slice()).map_err(fit_error)?;
            Box::new(move |horizon: usize, level: f64| forecaster.predict(horizon, level).map_err(|e| e.to_string()))
        } else {
            let trend = AutoETS::non_seasonal().into_trend_model();
            let mut forecaster =
                Forecaster::new(MSTLModel::new(periods.clone(), trend)).with_transformers(interpolated());
            forecaster.fit(values.as_slice()).map_err(fit_error)?;
            Box::new(move |horizon: usize, level: f64| forecaster.predict(horizon, level).map_err(|e| e.to_string()))
        };

        Ok(FittedMstlModel {
            grid,
            interval_width: self.interval_width,
            series: FittedSeries::Forecast { predictor, periods },
        })
    }
}

enum FittedSeries {
    Constant(f64),
    Forecast {
        predictor: SeriesPredictor,
        periods: Vec<usize>,
    },
}

pub struct FittedMstlModel {
    grid: WorkingHourGrid,
    interval_width: f64,
    series: FittedSeries,
}

impl FittedMstlModel {
    /// Seasonal periods used by the fit; empty for a constant history or a trend-only fit.
    pub fn periods(&self) -> &[usize] {
        match &self.series {
            FittedSeries::Constant(_) => &[],
            FittedSeries::Forecast { periods, .. } => periods,
        }
    }
}

impl FittedModel for FittedMstlModel {
    fn predict(&self, at: &[NaiveDateTime]) -> Result<Vec<Prediction>, ModelError> {
        let steps = at
            .iter()
            .map(|hour| {
                self.grid
                    .steps_after_last(*hour)
                    .ok_or_else(|| ModelError::Degenerate(format!("{hour} is not a working hour after the history")))
            })
            .collect::<Result<Vec<usize>, ModelError>>()?;
        let Some(horizon) = steps.iter().copied().max() else {
            return Ok(Vec::new());
        };

        let predictor = match &self.series {
            FittedSeries::Constant(value) => {
                let prediction = Prediction {
                    mean: *value,
                    lower: *value,
                    upper: *value,
                };
                return Ok(vec![prediction; steps.len()]);
            }
            FittedSeries::Forecast { predictor, .. } => predictor,
        };

        let forecast = predictor(horizon, self.interval_width).map_err(ModelError::Numeric)?;
        if forecast.point.len() < horizon {
            return Err(ModelError::Numeric(format!(
                "expected {horizon} forecast steps, got {}",
                forecast.point.len()
            )));
        }

        Ok(steps
            .into_iter()
            .map(|step| {
                let index = step - 1;
                let mean = forecast.point[index];
                let (lower, upper) = match &forecast.intervals {
                    Some(intervals) => (
                        intervals.lower.get(index).copied().unwrap_or(mean),
                        intervals.upper.get(index).copied().unwrap_or(mean),
                    ),
                    None => (mean, mean),
                };
                Prediction { mean, lower, upper }
            })
            .collect())
    }
}

/// The working hours that make up each day of a rasterized history.
#[derive(Debug, Clone, PartialEq)]
struct WorkingHourGrid {
    hours: Vec<u32>,
    last: NaiveDateTime,
}

impl WorkingHourGrid {
    fn from_history(history: &[OccupancySample]) -> Result<Self, ModelError> {
        let (first, last) = match (history.first(), history.last()) {
            (Some(first), Some(last)) => (first.hour, last.hour),
            _ => {
                return Err(ModelError::InsufficientData {
                    needed: 2,
                    actual: 0,
                });
            }
        };
        if history.iter().any(|sample| sample.hour.minute() != 0 || sample.hour.second() != 0) {
            return Err(ModelError::Degenerate("history is not aligned to whole hours".into()));
        }

        let hours: BTreeSet<u32> = history.iter().map(|sample| sample.hour.hour()).collect();
        let grid = Self {
            hours: hours.into_iter().collect(),
            last,
        };

        let regular = history
            .windows(2)
            .all(|pair| grid.steps_between(pair[0].hour, pair[1].hour) == Some(1));
        if !regular {
            return Err(ModelError::Degenerate(format!(
                "history from {first} to {last} is not a regular working-hour series"
            )));
        }
        Ok(grid)
    }

    fn samples_per_day(&self) -> usize {
        self.hours.len()
    }

    fn slot(&self, at: NaiveDateTime) -> Option<i64> {
        if at.minute() != 0 || at.second() != 0 {
            return None;
        }
        self.hours.binary_search(&at.hour()).ok().map(|slot| slot as i64)
    }

    fn steps_between(&self, from: NaiveDateTime, to: NaiveDateTime) -> Option<i64> {
        let days = (to.date() - from.date()).num_days();
        Some(days * self.hours.len() as i64 + self.slot(to)? - self.slot(from)?)
    }

    fn steps_after_last(&self, at: NaiveDateTime) -> Option<usize> {
        let steps = self.steps_between(self.last, at)?;
        (steps >= 1).then_some(steps as usize)
    }
}
