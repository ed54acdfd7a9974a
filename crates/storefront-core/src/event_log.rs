//! Event log client abstraction.

use async_trait::async_trait;

use crate::error::DomainError;
use crate::event::DomainEvent;

/// Client of an append-only, stream-partitioned event log.
///
/// Reads return `Ok(vec![])` for a stream that has no records and `Err` when
/// the read itself failed; implementations never collapse a failure into an
/// empty result.
#[async_trait]
pub trait EventLog: Send + Sync {
    /// Appends `event` as the next record of `stream_id` and returns the
    /// stream id. Sequential appends to one stream are stored in call order.
    async fn append_to_stream(
        &self,
        stream_id: &str,
        event: &DomainEvent,
    ) -> Result<String, DomainError>;

    /// Reads a whole stream forward from its first record.
    async fn get_stream(&self, stream_id: &str) -> Result<Vec<DomainEvent>, DomainError>;

    /// Reads revisions `0..=revision` of a stream, in forward order. A
    /// negative revision reads nothing.
    async fn get_stream_at(
        &self,
        stream_id: &str,
        revision: i64,
    ) -> Result<Vec<DomainEvent>, DomainError>;

    /// Reads every domain record of every stream in global storage order.
    /// System records are skipped.
    async fn get_all_stream(&self) -> Result<Vec<DomainEvent>, DomainError>;
}
