// Stub seasonal models for forecaster and pipeline tests.

use crate::core::forecast::point::Prediction;
use crate::core::occupancy::sample::OccupancySample;
use crate::core::ports::{FittedModel, ModelError, SeasonalModel};
use chrono::NaiveDateTime;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::Receiver;
use std::time::Duration;

/// Predicts the same value for every hour and counts how often it was fitted.
pub struct ConstantModel {
    prediction: Prediction,
    fit_calls: AtomicUsize,
}

impl ConstantModel {
    pub fn new(prediction: Prediction) -> Self {
        Self {
            prediction,
            fit_calls: AtomicUsize::new(0),
        }
    }

    pub fn fit_calls(&self) -> usize {
        self.fit_calls.load(Ordering::SeqCst)
    }
}

pub struct FittedConstant {
    prediction: Prediction,
}

impl SeasonalModel for ConstantModel {
    type Fitted = FittedConstant;

    fn fit(&self, _history: &[OccupancySample]) -> Result<FittedConstant, ModelError> {
        self.fit_calls.fetch_add(1, Ordering::SeqCst);
        Ok(FittedConstant {
            prediction: self.prediction,
        })
    }
}

impl FittedModel for FittedConstant {
    fn predict(&self, at: &[NaiveDateTime]) -> Result<Vec<Prediction>, ModelError> {
        Ok(vec![self.prediction; at.len()])
    }
}

/// Fails to fit any series that starts at `failing_first_hour`; behaves like a constant model otherwise.
pub struct FailingModel {
    failing_first_hour: NaiveDateTime,
    fallback: ConstantModel,
}

impl FailingModel {
    pub fn for_room_with_first_hour(failing_first_hour: NaiveDateTime) -> Self {
        Self {
            failing_first_hour,
            fallback: ConstantModel::new(Prediction {
                mean: 0.5,
                lower: 0.25,
                upper: 0.75,
            }),
        }
    }
}

impl SeasonalModel for FailingModel {
    type Fitted = FittedConstant;

    fn fit(&self, history: &[OccupancySample]) -> Result<FittedConstant, ModelError> {
        if history.first().map(|sample| sample.hour) == Some(self.failing_first_hour) {
            return Err(ModelError::Degenerate("stub failure".into()));
        }
        self.fallback.fit(history)
    }
}

/// Fits only after a signal arrives on `gate`, giving up after `patience`.
pub struct GatedModel {
    gate: Mutex<Receiver<()>>,
    patience: Duration,
    inner: ConstantModel,
}

impl GatedModel {
    pub fn new(gate: Receiver<()>, patience: Duration, prediction: Prediction) -> Self {
        Self {
            gate: Mutex::new(gate),
            patience,
            inner: ConstantModel::new(prediction),
        }
    }
}

impl SeasonalModel for GatedModel {
    type Fitted = FittedConstant;

    fn fit(&self, history: &[OccupancySample]) -> Result<FittedConstant, ModelError> {
        self.gate
            .lock()
            .unwrap()
            .recv_timeout(self.patience)
            .map_err(|_| ModelError::Degenerate("gate never opened".into()))?;
        self.inner.fit(history)
    }
}
