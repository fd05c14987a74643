// MySQL implementation of the booking store ports.
//
// Purpose
// - Read bookings from `events` and write forecasts to `room_hourly_forecasts`.
//
// Responsibilities
// - Hold the single connection of a run; release it exactly once on close.
// - Create the forecast table when missing.
// - Upsert forecasts in one transaction with multi-row INSERT ... ON DUPLICATE KEY UPDATE,
//   chunked below the prepared-statement placeholder limit.

use crate::adapters::mysql::mysql_config::DbConfig;
use crate::core::forecast::point::ForecastPoint;
use crate::core::occupancy::booking_event::BookingEvent;
use crate::core::ports::{BookingEventSource, BookingStore, ForecastRepository, StoreConnector, StoreError};
use chrono::NaiveDateTime;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::{Connection, MySql, QueryBuilder};
use tokio::sync::Mutex;
use tracing::debug;

const CREATE_FORECAST_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS room_hourly_forecasts (
  id INT AUTO_INCREMENT PRIMARY KEY,
  roomEmail VARCHAR(255) NOT NULL,
  date DATETIME NOT NULL,
  occupancyPredicted FLOAT NOT NULL,
  lower FLOAT NULL,
  upper FLOAT NULL,
  createdAt DATETIME DEFAULT CURRENT_TIMESTAMP,
  updatedAt DATETIME DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP,
  UNIQUE KEY uniq_room_datetime (roomEmail, date)
) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4
"#;

const SELECT_EVENTS_SINCE: &str = r#"
SELECT roomEmail AS room_id, startTime AS start_time, endTime AS end_time
FROM events
WHERE startTime >= ?
  AND startTime IS NOT NULL AND endTime IS NOT NULL
ORDER BY roomEmail, startTime
"#;

const INSERT_FORECASTS: &str =
    "INSERT INTO room_hourly_forecasts (roomEmail, date, occupancyPredicted, lower, upper, createdAt, updatedAt) ";

const ON_DUPLICATE_UPDATE: &str = " ON DUPLICATE KEY UPDATE \
     occupancyPredicted = VALUES(occupancyPredicted), \
     lower = VALUES(lower), \
     upper = VALUES(upper), \
     updatedAt = NOW()";

// Five placeholders per row; MySQL allows 65535 per prepared statement.
const ROWS_PER_STATEMENT: usize = 1_000;

#[derive(Debug, sqlx::FromRow)]
struct EventRow {
    room_id: String,
    start_time: NaiveDateTime,
    end_time: NaiveDateTime,
}

impl From<EventRow> for BookingEvent {
    fn from(row: EventRow) -> Self {
        BookingEvent::new(row.room_id, row.start_time, row.end_time)
    }
}

pub struct MySqlConnector {
    options: MySqlConnectOptions,
}

impl MySqlConnector {
    pub fn new(config: &DbConfig) -> Self {
        Self {
            options: config.connect_options(),
        }
    }
}

#[async_trait::async_trait]
impl StoreConnector for MySqlConnector {
    type Store = MySqlBookingStore;

    async fn connect(&self) -> Result<MySqlBookingStore, StoreError> {
        let connection = MySqlConnection::connect_with(&self.options)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        Ok(MySqlBookingStore {
            connection: Mutex::new(Some(connection)),
        })
    }
}

pub struct MySqlBookingStore {
    connection: Mutex<Option<MySqlConnection>>,
}

fn backend(error: sqlx::Error) -> StoreError {
    StoreError::Backend(error.to_string())
}

#[async_trait::async_trait]
impl BookingEventSource for MySqlBookingStore {
    async fn fetch_events(&self, since: NaiveDateTime) -> Result<Vec<BookingEvent>, StoreError> {
        let mut guard = self.connection.lock().await;
        let connection = guard.as_mut().ok_or(StoreError::Closed)?;
        let rows: Vec<EventRow> = sqlx::query_as(SELECT_EVENTS_SINCE)
            .bind(since)
            .fetch_all(&mut *connection)
            .await
            .map_err(backend)?;
        Ok(rows.into_iter().map(BookingEvent::from).collect())
    }
}

#[async_trait::async_trait]
impl ForecastRepository for MySqlBookingStore {
    async fn ensure_schema(&self) -> Result<(), StoreError> {
        let mut guard = self.connection.lock().await;
        let connection = guard.as_mut().ok_or(StoreError::Closed)?;
        sqlx::query(CREATE_FORECAST_TABLE)
            .execute(&mut *connection)
            .await
            .map_err(backend)?;
        Ok(())
    }

    async fn upsert(&self, points: &[ForecastPoint]) -> Result<u64, StoreError> {
        if points.is_empty() {
            return Ok(0);
        }
        let mut guard = self.connection.lock().await;
        let connection = guard.as_mut().ok_or(StoreError::Closed)?;

        let mut transaction = connection.begin().await.map_err(backend)?;
        for chunk in points.chunks(ROWS_PER_STATEMENT) {
            let mut query: QueryBuilder<MySql> = QueryBuilder::new(INSERT_FORECASTS);
            query.push_values(chunk, |mut row, point| {
                row.push_bind(point.room_id.clone())
                    .push_bind(point.hour)
                    .push_bind(point.mean)
                    .push_bind(point.lower)
                    .push_bind(point.upper)
                    .push("NOW()")
                    .push("NOW()");
            });
            query.push(ON_DUPLICATE_UPDATE);
            let result = query.build().execute(&mut *transaction).await.map_err(backend)?;
            debug!(rows = chunk.len(), affected = result.rows_affected(), "upserted forecast chunk");
        }
        transaction.commit().await.map_err(backend)?;

        Ok(points.len() as u64)
    }
}

#[async_trait::async_trait]
impl BookingStore for MySqlBookingStore {
    async fn close(&self) -> Result<(), StoreError> {
        let connection = self.connection.lock().await.take().ok_or(StoreError::Closed)?;
        connection.close().await.map_err(backend)
    }
}
