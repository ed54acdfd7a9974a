//! Domain error types.

use thiserror::Error;

/// Top-level domain error type.
#[derive(Debug, Error)]
pub enum DomainError {
    /// The event log could not be configured (bad connection string).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// An event could not be encoded or a stored record could not be decoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A stored record carries a discriminator no event variant answers to.
    #[error("unknown event type {event_type:?} in stream {stream_id}")]
    UnknownEventType {
        /// The stream the record was read from.
        stream_id: String,
        /// The unrecognized discriminator.
        event_type: String,
    },

    /// An aggregate was handed an event it cannot apply.
    #[error("replay error: {0}")]
    Replay(String),

    /// A validation error in domain logic.
    #[error("validation error: {0}")]
    Validation(String),

    /// Optimistic concurrency conflict: another writer stored `revision`
    /// first.
    #[error("concurrency conflict on stream {stream_id}: revision {revision} already written")]
    ConcurrencyConflict {
        /// The stream that had the conflict.
        stream_id: String,
        /// The revision both writers tried to claim.
        revision: i64,
    },

    /// An infrastructure/persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
