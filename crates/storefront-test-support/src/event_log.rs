//! Test event logs: mock `EventLog` implementations for tests.

use std::sync::Mutex;

use async_trait::async_trait;
use storefront_core::error::DomainError;
use storefront_core::event::DomainEvent;
use storefront_core::event_log::EventLog;

/// An event log that records every `append_to_stream` call and answers every
/// read with the configured events, whatever stream is asked for.
#[derive(Debug, Default)]
pub struct RecordingEventLog {
    read_result: Mutex<Vec<DomainEvent>>,
    appended: Mutex<Vec<(String, DomainEvent)>>,
}

impl RecordingEventLog {
    /// Create a recording log whose reads return `read_result`.
    #[must_use]
    pub fn new(read_result: Vec<DomainEvent>) -> Self {
        Self {
            read_result: Mutex::new(read_result),
            appended: Mutex::new(Vec::new()),
        }
    }

    /// Returns a snapshot of all `(stream_id, event)` pairs appended.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn appended_events(&self) -> Vec<(String, DomainEvent)> {
        self.appended.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventLog for RecordingEventLog {
    async fn append_to_stream(
        &self,
        stream_id: &str,
        event: &DomainEvent,
    ) -> Result<String, DomainError> {
        self.appended
            .lock()
            .unwrap()
            .push((stream_id.to_owned(), event.clone()));
        Ok(stream_id.to_owned())
    }

    async fn get_stream(&self, _stream_id: &str) -> Result<Vec<DomainEvent>, DomainError> {
        Ok(self.read_result.lock().unwrap().clone())
    }

    async fn get_stream_at(
        &self,
        _stream_id: &str,
        _revision: i64,
    ) -> Result<Vec<DomainEvent>, DomainError> {
        Ok(self.read_result.lock().unwrap().clone())
    }

    async fn get_all_stream(&self) -> Result<Vec<DomainEvent>, DomainError> {
        Ok(self.read_result.lock().unwrap().clone())
    }
}

/// An event log that returns an infrastructure error. Reads always fail;
/// appends fail once the configured number of successful appends is used up.
/// Useful for testing error-handling paths.
#[derive(Debug)]
pub struct FailingEventLog {
    successful_appends: usize,
    appended: Mutex<Vec<(String, DomainEvent)>>,
}

impl FailingEventLog {
    /// A log on which every call fails.
    #[must_use]
    pub fn new() -> Self {
        Self::after_appends(0)
    }

    /// A log that accepts the first `n` appends and fails every call after.
    #[must_use]
    pub fn after_appends(n: usize) -> Self {
        Self {
            successful_appends: n,
            appended: Mutex::new(Vec::new()),
        }
    }

    /// Returns the appends that succeeded before the log started failing.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn appended_events(&self) -> Vec<(String, DomainEvent)> {
        self.appended.lock().unwrap().clone()
    }
}

impl Default for FailingEventLog {
    fn default() -> Self {
        Self::new()
    }
}

fn connection_refused() -> DomainError {
    DomainError::Infrastructure("connection refused".into())
}

#[async_trait]
impl EventLog for FailingEventLog {
    async fn append_to_stream(
        &self,
        stream_id: &str,
        event: &DomainEvent,
    ) -> Result<String, DomainError> {
        let mut appended = self.appended.lock().unwrap();
        if appended.len() >= self.successful_appends {
            return Err(connection_refused());
        }
        appended.push((stream_id.to_owned(), event.clone()));
        Ok(stream_id.to_owned())
    }

    async fn get_stream(&self, _stream_id: &str) -> Result<Vec<DomainEvent>, DomainError> {
        Err(connection_refused())
    }

    async fn get_stream_at(
        &self,
        _stream_id: &str,
        _revision: i64,
    ) -> Result<Vec<DomainEvent>, DomainError> {
        Err(connection_refused())
    }

    async fn get_all_stream(&self) -> Result<Vec<DomainEvent>, DomainError> {
        Err(connection_refused())
    }
}
