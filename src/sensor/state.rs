/// Shared latest-known-good snapshot, written by the poll loop and read
/// by characteristic query handlers.
use std::sync::RwLock;
use time::OffsetDateTime;

use crate::models::SensorReading;
use crate::sensor::fetcher::{FetchError, FetchErrorKind};

/// Record of the most recent failed fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct LastError {
    pub kind: FetchErrorKind,
    pub message: String,
    pub at: OffsetDateTime,
}

#[derive(Debug)]
struct StoreInner {
    reading: SensorReading,
    last_updated: Option<OffsetDateTime>,
    last_error: Option<LastError>,
}

/// Single-writer, multi-reader store for the latest reading.
///
/// The poll loop is the only writer. Readers get a cloned copy, so a query
/// arriving while a fetch is in flight returns the previous snapshot
/// immediately instead of waiting on network I/O. A failed fetch never
/// discards the previous good reading.
#[derive(Debug)]
pub struct StateStore {
    inner: RwLock<StoreInner>,
}

impl StateStore {
    /// Starts out holding the neutral all-zero reading.
    pub fn new() -> Self {
        StateStore {
            inner: RwLock::new(StoreInner {
                reading: SensorReading::default(),
                last_updated: None,
                last_error: None,
            }),
        }
    }

    /// Atomically replace the snapshot with a fresh successful reading.
    pub fn update(&self, reading: SensorReading) {
        let mut inner = self.inner.write().expect("state store lock poisoned");
        inner.reading = reading;
        inner.last_updated = Some(OffsetDateTime::now_utc());
        inner.last_error = None;
    }

    /// Record a failed fetch, keeping the previous good snapshot intact.
    pub fn record_error(&self, err: &FetchError) {
        let mut inner = self.inner.write().expect("state store lock poisoned");
        inner.last_error = Some(LastError {
            kind: err.kind(),
            message: err.to_string(),
            at: OffsetDateTime::now_utc(),
        });
    }

    /// Copy of the current snapshot.
    pub fn snapshot(&self) -> SensorReading {
        self.inner
            .read()
            .expect("state store lock poisoned")
            .reading
            .clone()
    }

    pub fn last_updated(&self) -> Option<OffsetDateTime> {
        self.inner
            .read()
            .expect("state store lock poisoned")
            .last_updated
    }

    pub fn last_error(&self) -> Option<LastError> {
        self.inner
            .read()
            .expect("state store lock poisoned")
            .last_error
            .clone()
    }
}

impl Default for StateStore {
    fn default() -> Self {
        StateStore::new()
    }
}
