//! In-memory implementation of the `EventLog` trait.
//!
//! Keeps encoded records in global append order, the same shape the
//! `PostgreSQL` log stores, so reads go through the codec exactly as they do
//! against a database. Used for local runs (`memory://`) and tests.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use storefront_core::codec::{self, EncodedEvent, RecordedEvent};
use storefront_core::error::DomainError;
use storefront_core::event::DomainEvent;
use storefront_core::event_log::EventLog;

/// Event log held entirely in process memory.
#[derive(Debug, Default)]
pub struct InMemoryEventLog {
    records: Mutex<Vec<RecordedEvent>>,
}

impl InMemoryEventLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an already encoded record to `stream_id` without going
    /// through the codec. Lets callers place log bookkeeping (`$`-typed)
    /// records in the feed. Returns the revision assigned.
    pub fn append_encoded(&self, stream_id: &str, encoded: EncodedEvent) -> i64 {
        let mut records = self.lock();
        let revision = next_revision(&records, stream_id);
        records.push(RecordedEvent {
            stream_id: stream_id.to_owned(),
            revision,
            event_type: encoded.event_type,
            body: encoded.body,
        });
        revision
    }

    /// Total number of records, system records included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if nothing has been appended.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<RecordedEvent>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_where<F>(&self, keep: F) -> Result<Vec<DomainEvent>, DomainError>
    where
        F: Fn(&RecordedEvent) -> bool,
    {
        let records = self.lock();
        codec::decode_feed(records.iter().filter(|&record| keep(record)))
    }
}

#[allow(clippy::cast_possible_wrap)]
fn next_revision(records: &[RecordedEvent], stream_id: &str) -> i64 {
    records.iter().filter(|r| r.stream_id == stream_id).count() as i64
}

#[async_trait]
impl EventLog for InMemoryEventLog {
    async fn append_to_stream(
        &self,
        stream_id: &str,
        event: &DomainEvent,
    ) -> Result<String, DomainError> {
        let encoded = codec::encode(event)?;
        let revision = self.append_encoded(stream_id, encoded);
        tracing::debug!(stream_id, revision, "appended event");
        Ok(stream_id.to_owned())
    }

    async fn get_stream(&self, stream_id: &str) -> Result<Vec<DomainEvent>, DomainError> {
        self.read_where(|record| record.stream_id == stream_id)
    }

    async fn get_stream_at(
        &self,
        stream_id: &str,
        revision: i64,
    ) -> Result<Vec<DomainEvent>, DomainError> {
        self.read_where(|record| record.stream_id == stream_id && record.revision <= revision)
    }

    async fn get_all_stream(&self) -> Result<Vec<DomainEvent>, DomainError> {
        self.read_where(|_| true)
    }
}
