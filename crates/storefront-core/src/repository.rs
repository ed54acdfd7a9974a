//! Event-sourced aggregate repository.
//!
//! The only bridge between stream-identity space and aggregate space: saving
//! drains an aggregate's pending events into the [`EventLog`], loading folds a
//! stream back into a fresh shell through [`AggregateRoot::mutate`].

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::aggregate::{AggregateRoot, aggregate_id_from_stream, stream_id_for};
use crate::error::DomainError;
use crate::event::DomainEvent;
use crate::event_log::EventLog;

/// Folds `events` in order into a fresh shell of `A`.
///
/// # Errors
///
/// Returns `DomainError::Validation` if `aggregate_id` is not a valid identity
/// and `DomainError::Replay` if any event cannot be applied.
pub fn rehydrate<A: AggregateRoot>(
    aggregate_id: &str,
    events: &[DomainEvent],
) -> Result<A, DomainError> {
    let mut aggregate = A::shell(aggregate_id)?;
    for event in events {
        aggregate.mutate(event)?;
    }
    Ok(aggregate)
}

/// Keeps the events of `entity_type` and groups them by stream.
///
/// Each group keeps the feed's relative order of its own events. Groups are
/// returned in order of first appearance.
#[must_use]
pub fn group_by_stream(
    entity_type: &str,
    events: Vec<DomainEvent>,
) -> Vec<(String, Vec<DomainEvent>)> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(String, Vec<DomainEvent>)> = Vec::new();

    for event in events {
        if event.entity_type() != entity_type {
            continue;
        }
        match positions.get(event.stream_id()) {
            Some(&index) => groups[index].1.push(event),
            None => {
                let stream_id = event.stream_id().to_owned();
                positions.insert(stream_id.clone(), groups.len());
                groups.push((stream_id, vec![event]));
            }
        }
    }

    groups
}

/// Repository persisting aggregates of type `A` to an event log.
pub struct EventSourcedRepository<A> {
    log: Arc<dyn EventLog>,
    _aggregate: PhantomData<fn() -> A>,
}

impl<A> Clone for EventSourcedRepository<A> {
    fn clone(&self) -> Self {
        Self {
            log: Arc::clone(&self.log),
            _aggregate: PhantomData,
        }
    }
}

impl<A: AggregateRoot> EventSourcedRepository<A> {
    /// Creates a repository over the given event log.
    #[must_use]
    pub fn new(log: Arc<dyn EventLog>) -> Self {
        Self {
            log,
            _aggregate: PhantomData,
        }
    }

    /// Appends every pending event of `aggregate`, in emission order, to the
    /// event's own stream. Returns the last stream written, or `None` when
    /// nothing was pending.
    ///
    /// The pending list is left untouched; callers clear it once the save has
    /// succeeded.
    ///
    /// # Errors
    ///
    /// Propagates the first append failure. Events before it are durable,
    /// events from it onwards were not written.
    pub async fn save(&self, aggregate: &A) -> Result<Option<String>, DomainError> {
        let mut last_stream = None;
        for (index, event) in aggregate.uncommitted_events().iter().enumerate() {
            let stream_id = self
                .log
                .append_to_stream(event.stream_id(), event)
                .await
                .inspect_err(|e| {
                    tracing::warn!(
                        stream_id = event.stream_id(),
                        appended = index,
                        error = %e,
                        "append failed; pending events kept"
                    );
                })?;
            last_stream = Some(stream_id);
        }

        if let Some(stream_id) = &last_stream {
            tracing::debug!(
                stream_id = %stream_id,
                events = aggregate.uncommitted_events().len(),
                "saved {}", A::ENTITY_TYPE
            );
        }
        Ok(last_stream)
    }

    /// Loads the aggregate by replaying its whole stream. An id with no
    /// stream yields an aggregate with nothing set.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is invalid, the read fails, or replay fails.
    pub async fn find_by(&self, aggregate_id: &str) -> Result<A, DomainError> {
        let stream_id = stream_id_for(A::ENTITY_TYPE, aggregate_id);
        let events = self
            .log
            .get_stream(&stream_id)
            .await
            .inspect_err(|e| tracing::warn!(%stream_id, error = %e, "stream read failed"))?;
        tracing::debug!(%stream_id, events = events.len(), "replaying stream");
        rehydrate(aggregate_id, &events)
    }

    /// Loads the aggregate as of the 0-based `revision` of its stream. The
    /// loaded aggregate reports `version() == revision + 1` when the stream
    /// reaches that far.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is invalid, the read fails, or replay fails.
    pub async fn find_by_version(
        &self,
        aggregate_id: &str,
        revision: i64,
    ) -> Result<A, DomainError> {
        let stream_id = stream_id_for(A::ENTITY_TYPE, aggregate_id);
        let events = self
            .log
            .get_stream_at(&stream_id, revision)
            .await
            .inspect_err(|e| {
                tracing::warn!(%stream_id, revision, error = %e, "bounded stream read failed");
            })?;
        rehydrate(aggregate_id, &events)
    }

    /// Materializes every aggregate of type `A` found in the global feed.
    ///
    /// # Errors
    ///
    /// Returns an error if the feed read fails, a stream id does not address
    /// an `A`, or replay fails.
    pub async fn find_all(&self) -> Result<Vec<A>, DomainError> {
        let feed = self
            .log
            .get_all_stream()
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "global feed read failed"))?;

        let groups = group_by_stream(A::ENTITY_TYPE, feed);
        tracing::debug!(streams = groups.len(), "materializing {}", A::ENTITY_TYPE);

        groups
            .iter()
            .map(|(stream_id, events)| {
                let aggregate_id =
                    aggregate_id_from_stream(A::ENTITY_TYPE, stream_id).ok_or_else(|| {
                        DomainError::Replay(format!(
                            "stream {stream_id} does not address a {}",
                            A::ENTITY_TYPE
                        ))
                    })?;
                rehydrate(aggregate_id, events)
            })
            .collect()
    }
}
