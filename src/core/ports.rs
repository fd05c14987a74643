// Ports define what the core needs from the outside world, without implementing it.
//
// Purpose
// - Describe the booking store, the forecast store, the seasonal model and the clock as traits.
//
// Responsibilities
// - Keep the core independent of MySQL and of any fitting procedure by coding against traits.
//
// Boundaries
// - No concrete input or output here. Adapters implement these traits in the adapters layer.
//
// Testing guidance
// - The in-memory booking store, a fixed clock and stub models cover tests and local development.

use crate::core::forecast::point::{ForecastPoint, Prediction};
use crate::core::occupancy::booking_event::BookingEvent;
use crate::core::occupancy::sample::OccupancySample;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("connection failed: {0}")]
    Connection(String),

    #[error("backend error: {0}")]
    Backend(String),

    #[error("store connection already closed")]
    Closed,
}

#[async_trait]
pub trait BookingEventSource: Send + Sync {
    /// Bookings starting at or after `since`, ordered by room then start.
    async fn fetch_events(&self, since: NaiveDateTime) -> Result<Vec<BookingEvent>, StoreError>;
}

#[async_trait]
pub trait ForecastRepository: Send + Sync {
    /// Creates the forecast table when it does not exist yet.
    async fn ensure_schema(&self) -> Result<(), StoreError>;

    /// Writes or replaces every point by (room, hour) in one batch and returns how many
    /// points were written. An empty slice never reaches the backend.
    async fn upsert(&self, points: &[ForecastPoint]) -> Result<u64, StoreError>;
}

#[async_trait]
pub trait BookingStore: BookingEventSource + ForecastRepository {
    /// Releases the underlying connection. Called exactly once per run.
    async fn close(&self) -> Result<(), StoreError>;
}

#[async_trait]
pub trait StoreConnector: Send + Sync {
    type Store: BookingStore;

    async fn connect(&self) -> Result<Self::Store, StoreError>;
}

#[derive(Debug, Error, PartialEq)]
pub enum ModelError {
    #[error("not enough observations: need {needed}, got {actual}")]
    InsufficientData { needed: usize, actual: usize },

    #[error("degenerate history: {0}")]
    Degenerate(String),

    #[error("numeric failure: {0}")]
    Numeric(String),
}

/// Fits a seasonal model on an hourly (timestamp, observation) series.
pub trait SeasonalModel: Send + Sync {
    type Fitted: FittedModel;

    fn fit(&self, history: &[OccupancySample]) -> Result<Self::Fitted, ModelError>;
}

pub trait FittedModel {
    /// One prediction per timestamp, in the order given.
    fn predict(&self, at: &[NaiveDateTime]) -> Result<Vec<Prediction>, ModelError>;
}

pub trait Clock: Send + Sync {
    /// Current naive local wall time.
    fn now(&self) -> NaiveDateTime;
}

#[async_trait]
impl<T: BookingEventSource + ?Sized> BookingEventSource for Arc<T> {
    async fn fetch_events(&self, since: NaiveDateTime) -> Result<Vec<BookingEvent>, StoreError> {
        (**self).fetch_events(since).await
    }
}

#[async_trait]
impl<T: ForecastRepository + ?Sized> ForecastRepository for Arc<T> {
    async fn ensure_schema(&self) -> Result<(), StoreError> {
        (**self).ensure_schema().await
    }

    async fn upsert(&self, points: &[ForecastPoint]) -> Result<u64, StoreError> {
        (**self).upsert(points).await
    }
}

#[async_trait]
impl<T: BookingStore + ?Sized> BookingStore for Arc<T> {
    async fn close(&self) -> Result<(), StoreError> {
        (**self).close().await
    }
}
