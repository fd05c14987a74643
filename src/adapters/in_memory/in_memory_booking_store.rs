// In memory implementation of the booking store ports.
//
// Purpose
// - Run the pipeline in tests and local development without a database.
//
// Responsibilities
// - Serve seeded booking events filtered and ordered like the SQL query.
// - Keep forecast rows keyed by (room, hour) with the same upsert contract as MySQL:
//   values overwritten, created_at kept, updated_at refreshed.
// - Simulate an offline backend, rejected writes, refused connections and failing closes.

use crate::core::forecast::point::{ForecastPoint, PersistedForecastRow};
use crate::core::occupancy::booking_event::BookingEvent;
use crate::core::ports::{BookingEventSource, BookingStore, ForecastRepository, StoreConnector, StoreError};
use chrono::{Local, NaiveDateTime};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;

type RowKey = (String, NaiveDateTime);

#[derive(Default)]
pub struct InMemoryBookingStore {
    events: RwLock<Vec<BookingEvent>>,
    rows: RwLock<BTreeMap<RowKey, PersistedForecastRow>>,
    schema_ready: AtomicBool,
    write_batches: AtomicUsize,
    close_count: AtomicUsize,
    is_offline: bool,
    rejects_writes: bool,
    fails_close: bool,
}

impl InMemoryBookingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_events(events: Vec<BookingEvent>) -> Self {
        Self {
            events: RwLock::new(events),
            ..Self::default()
        }
    }

    pub fn toggle_offline(&mut self) {
        self.is_offline = !self.is_offline;
    }

    pub fn toggle_reject_writes(&mut self) {
        self.rejects_writes = !self.rejects_writes;
    }

    pub fn toggle_failing_close(&mut self) {
        self.fails_close = !self.fails_close;
    }

    pub async fn add_events(&self, events: impl IntoIterator<Item = BookingEvent>) {
        self.events.write().await.extend(events);
    }

    pub async fn rows(&self) -> Vec<PersistedForecastRow> {
        self.rows.read().await.values().cloned().collect()
    }

    pub async fn row(&self, room_id: &str, hour: NaiveDateTime) -> Option<PersistedForecastRow> {
        self.rows.read().await.get(&(room_id.to_string(), hour)).cloned()
    }

    pub fn schema_ready(&self) -> bool {
        self.schema_ready.load(Ordering::SeqCst)
    }

    pub fn write_batches(&self) -> usize {
        self.write_batches.load(Ordering::SeqCst)
    }

    pub fn close_count(&self) -> usize {
        self.close_count.load(Ordering::SeqCst)
    }

    fn ensure_online(&self) -> Result<(), StoreError> {
        if self.is_offline {
            return Err(StoreError::Backend("Booking store offline".into()));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl BookingEventSource for InMemoryBookingStore {
    async fn fetch_events(&self, since: NaiveDateTime) -> Result<Vec<BookingEvent>, StoreError> {
        self.ensure_online()?;
        let mut events: Vec<BookingEvent> = self
            .events
            .read()
            .await
            .iter()
            .filter(|event| event.start >= since)
            .cloned()
            .collect();
        events.sort_by(|a, b| a.room_id.cmp(&b.room_id).then(a.start.cmp(&b.start)));
        Ok(events)
    }
}

#[async_trait::async_trait]
impl ForecastRepository for InMemoryBookingStore {
    async fn ensure_schema(&self) -> Result<(), StoreError> {
        self.ensure_online()?;
        self.schema_ready.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn upsert(&self, points: &[ForecastPoint]) -> Result<u64, StoreError> {
        if points.is_empty() {
            return Ok(0);
        }
        self.ensure_online()?;
        if self.rejects_writes {
            return Err(StoreError::Backend("Forecast writes rejected".into()));
        }
        if !self.schema_ready() {
            return Err(StoreError::Backend("Forecast table does not exist".into()));
        }

        let written_at = Local::now().naive_local();
        let mut guard = self.rows.write().await;
        for point in points {
            guard
                .entry(point.key())
                .and_modify(|row| row.overwrite(point, written_at))
                .or_insert_with(|| PersistedForecastRow::inserted(point, written_at));
        }
        self.write_batches.fetch_add(1, Ordering::SeqCst);
        Ok(points.len() as u64)
    }
}

#[async_trait::async_trait]
impl BookingStore for InMemoryBookingStore {
    async fn close(&self) -> Result<(), StoreError> {
        self.close_count.fetch_add(1, Ordering::SeqCst);
        if self.fails_close {
            return Err(StoreError::Backend("Booking store failed to close".into()));
        }
        Ok(())
    }
}

/// Hands out the same shared store on every connection so tests can inspect it afterwards.
pub struct InMemoryConnector {
    store: Arc<InMemoryBookingStore>,
    refuses_connections: bool,
}

impl InMemoryConnector {
    pub fn new(store: Arc<InMemoryBookingStore>) -> Self {
        Self {
            store,
            refuses_connections: false,
        }
    }

    pub fn refusing(store: Arc<InMemoryBookingStore>) -> Self {
        Self {
            store,
            refuses_connections: true,
        }
    }
}

#[async_trait::async_trait]
impl StoreConnector for InMemoryConnector {
    type Store = Arc<InMemoryBookingStore>;

    async fn connect(&self) -> Result<Self::Store, StoreError> {
        if self.refuses_connections {
            return Err(StoreError::Connection("Booking store refused the connection".into()));
        }
        Ok(self.store.clone())
    }
}
