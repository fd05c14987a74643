// Forecast pipeline orchestrates one run end to end.
//
// Responsibilities
// - Connect, ensure the forecast table, fetch the lookback window of bookings.
// - Rasterize, forecast every room on the blocking pool, and upsert the resulting points in one batch.
// - Always close the store connection, whatever happened before.
//
// Failure contract
// - A failed connection aborts before any other stage and maps to its own exit status.
// - A failed store stage is reported once and maps to the generic failure status.
// - A failed close is logged and never changes the outcome.

use crate::application::errors::{PipelineError, Stage};
use crate::application::forecaster::{ForecastSettings, RoomForecaster};
use crate::core::occupancy::rasterize::rasterize;
use crate::core::ports::{BookingEventSource, BookingStore, Clock, ForecastRepository, SeasonalModel, StoreConnector};
use chrono::{Months, NaiveDateTime};
use std::sync::Arc;
use tracing::{Instrument, Span, info, info_span, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    pub forecast: ForecastSettings,
    pub lookback_months: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            forecast: ForecastSettings::default(),
            lookback_months: 6,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    NothingToProcess,
    Persisted {
        rows: u64,
        rooms_forecast: usize,
        rooms_skipped: usize,
    },
}

pub struct ForecastPipeline<TConnector, TModel, TClock>
where
    TConnector: StoreConnector,
    TModel: SeasonalModel + 'static,
    TClock: Clock,
{
    connector: TConnector,
    model: Arc<TModel>,
    clock: TClock,
    config: PipelineConfig,
}

impl<TConnector, TModel, TClock> ForecastPipeline<TConnector, TModel, TClock>
where
    TConnector: StoreConnector,
    TModel: SeasonalModel + 'static,
    TClock: Clock,
{
    pub fn new(connector: TConnector, model: TModel, clock: TClock, config: PipelineConfig) -> Self {
        Self {
            connector,
            model: Arc::new(model),
            clock,
            config,
        }
    }

    pub async fn run(&self) -> Result<RunOutcome, PipelineError> {
        let span = info_span!("forecast_run", run_id = %Uuid::now_v7());
        self.run_scoped().instrument(span).await
    }

    async fn run_scoped(&self) -> Result<RunOutcome, PipelineError> {
        let store = self.connector.connect().await.map_err(PipelineError::Connection)?;

        let outcome = self.run_stages(&store).await;

        if let Err(error) = store.close().await {
            warn!(%error, "failed to close the store connection");
        }
        outcome
    }

    async fn run_stages(&self, store: &TConnector::Store) -> Result<RunOutcome, PipelineError> {
        store.ensure_schema().await.map_err(PipelineError::at(Stage::EnsureSchema))?;

        let now = self.clock.now();
        let since = lookback_start(now, self.config.lookback_months);
        let events = store
            .fetch_events(since)
            .await
            .map_err(PipelineError::at(Stage::FetchHistory))?;
        info!(events = events.len(), %since, "fetched booking history");

        let occupancy = rasterize(&events, self.config.forecast.window, now);
        if occupancy.is_empty() {
            info!("no events to process");
            return Ok(RunOutcome::NothingToProcess);
        }

        let model = Arc::clone(&self.model);
        let settings = self.config.forecast;
        let span = Span::current();
        let report = tokio::task::spawn_blocking(move || {
            let _entered = span.enter();
            RoomForecaster::new(model.as_ref(), settings).forecast(&occupancy)
        })
        .await
        .map_err(|e| PipelineError::ForecastTask(e.to_string()))?;

        let rows = store
            .upsert(&report.points)
            .await
            .map_err(PipelineError::at(Stage::Persist))?;
        info!(
            rows,
            rooms_forecast = report.forecast_rooms.len(),
            rooms_skipped = report.skipped_rooms.len(),
            "saved or updated hourly forecast rows"
        );

        Ok(RunOutcome::Persisted {
            rows,
            rooms_forecast: report.forecast_rooms.len(),
            rooms_skipped: report.skipped_rooms.len(),
        })
    }
}

/// Start of the trailing history window. Falls back to the earliest date when subtracting overflows.
pub fn lookback_start(now: NaiveDateTime, months: u32) -> NaiveDateTime {
    now.checked_sub_months(Months::new(months)).unwrap_or(NaiveDateTime::MIN)
}
