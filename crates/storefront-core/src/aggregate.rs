//! Aggregate root abstraction.

use crate::error::DomainError;
use crate::event::DomainEvent;

/// Separates the entity type from the entity id in a stream id.
pub const STREAM_SEPARATOR: char = '.';

/// Builds the stream id `"<entity_type>.<aggregate_id>"`.
#[must_use]
pub fn stream_id_for(entity_type: &str, aggregate_id: &str) -> String {
    format!("{entity_type}{STREAM_SEPARATOR}{aggregate_id}")
}

/// Recovers the aggregate id from a stream id of the given entity type.
///
/// Returns `None` when the stream does not belong to `entity_type` or the
/// trailing segment is empty.
#[must_use]
pub fn aggregate_id_from_stream<'a>(entity_type: &str, stream_id: &'a str) -> Option<&'a str> {
    let id = stream_id
        .strip_prefix(entity_type)?
        .strip_prefix(STREAM_SEPARATOR)?;
    (!id.is_empty() && !id.contains(STREAM_SEPARATOR)).then_some(id)
}

/// Trait for aggregate roots whose state is a left fold over their stream.
pub trait AggregateRoot: Send + Sync + Sized {
    /// Logical type name, used for stream addressing and feed filtering.
    const ENTITY_TYPE: &'static str;

    /// Creates an empty replay target bound to a known identity.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the id cannot address a stream.
    fn shell(aggregate_id: &str) -> Result<Self, DomainError>;

    /// Returns the aggregate identifier.
    fn aggregate_id(&self) -> &str;

    /// Returns the stream this aggregate is persisted to.
    fn stream_id(&self) -> String {
        stream_id_for(Self::ENTITY_TYPE, self.aggregate_id())
    }

    /// Returns the current version: the number of events applied, so one
    /// more than the revision of the last event in the stream.
    fn version(&self) -> i64;

    /// Applies one recorded event without causing new ones.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Replay` if the event cannot be applied to this
    /// aggregate.
    fn mutate(&mut self, event: &DomainEvent) -> Result<(), DomainError>;

    /// Returns events caused since the last clear, in emission order.
    fn uncommitted_events(&self) -> &[DomainEvent];

    /// Clears uncommitted events after persistence.
    fn clear_uncommitted_events(&mut self);
}
