//! Wire encoding of domain events.
//!
//! Every persisted record carries a type discriminator and a JSON body with
//! `eventType`, `streamId`, `entityType`, `timestamp` and, for attribute
//! updates, `name` and `value`. Log adapters store [`EncodedEvent`]s and hand
//! back [`RecordedEvent`]s; this module converts between those and
//! [`DomainEvent`].

use std::fmt;

use serde::Deserializer;
use serde::de::{self, Unexpected, Visitor};
use serde_json::Value;

use crate::error::DomainError;
use crate::event::{ATTRIBUTE_UPDATED, DomainEvent, ENTITY_CREATED};

/// Records whose type starts with this prefix are log bookkeeping.
pub const SYSTEM_RECORD_PREFIX: &str = "$";

const DISCRIMINATOR_FIELD: &str = "eventType";

/// An event ready to be appended to a stream.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedEvent {
    /// Type discriminator naming the event variant.
    pub event_type: String,
    /// Serialized event body.
    pub body: Value,
}

/// A record as read back from the event log.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedEvent {
    /// Stream the record belongs to.
    pub stream_id: String,
    /// Zero-based position of the record inside its stream.
    pub revision: i64,
    /// Type discriminator.
    pub event_type: String,
    /// Serialized event body.
    pub body: Value,
}

/// Returns `true` for log bookkeeping records that are not domain events.
#[must_use]
pub fn is_system_record(event_type: &str) -> bool {
    event_type.starts_with(SYSTEM_RECORD_PREFIX)
}

/// Encodes an event for appending.
///
/// # Errors
///
/// Returns `DomainError::Serialization` if the event cannot be serialized.
pub fn encode(event: &DomainEvent) -> Result<EncodedEvent, DomainError> {
    Ok(EncodedEvent {
        event_type: event.event_type().to_owned(),
        body: serde_json::to_value(event)?,
    })
}

/// Decodes a stored record into its concrete event variant.
///
/// # Errors
///
/// Returns `DomainError::UnknownEventType` if the discriminator names no known
/// variant, and `DomainError::Serialization` if the body is malformed or
/// disagrees with the record's discriminator.
pub fn decode(record: &RecordedEvent) -> Result<DomainEvent, DomainError> {
    if !matches!(record.event_type.as_str(), ENTITY_CREATED | ATTRIBUTE_UPDATED) {
        return Err(DomainError::UnknownEventType {
            stream_id: record.stream_id.clone(),
            event_type: record.event_type.clone(),
        });
    }

    let Value::Object(mut body) = record.body.clone() else {
        return Err(DomainError::Serialization(format!(
            "record {}@{} has a non-object body",
            record.stream_id, record.revision
        )));
    };

    match body.get(DISCRIMINATOR_FIELD).map(Value::as_str) {
        None => {
            body.insert(
                DISCRIMINATOR_FIELD.to_owned(),
                Value::String(record.event_type.clone()),
            );
        }
        Some(Some(tag)) if tag == record.event_type => {}
        Some(tag) => {
            return Err(DomainError::Serialization(format!(
                "record {}@{} is typed {} but its body says {tag:?}",
                record.stream_id, record.revision, record.event_type
            )));
        }
    }

    Ok(serde_json::from_value(Value::Object(body))?)
}

/// Decodes a run of records, dropping system records.
///
/// # Errors
///
/// Fails on the first record that does not decode; no record is skipped
/// silently.
pub fn decode_feed<'a, I>(records: I) -> Result<Vec<DomainEvent>, DomainError>
where
    I: IntoIterator<Item = &'a RecordedEvent>,
{
    records
        .into_iter()
        .filter(|record| !is_system_record(&record.event_type))
        .map(decode)
        .collect()
}

/// Accepts epoch timestamps written as integers, integral floats or digit
/// strings.
pub(crate) fn integer_like<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    struct IntegerLike;

    impl Visitor<'_> for IntegerLike {
        type Value = i64;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("an integer-like epoch millisecond timestamp")
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<i64, E> {
            Ok(v)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<i64, E> {
            i64::try_from(v).map_err(|_| E::invalid_value(Unexpected::Unsigned(v), &self))
        }

        #[allow(clippy::cast_possible_truncation)]
        fn visit_f64<E: de::Error>(self, v: f64) -> Result<i64, E> {
            if v.is_finite() && v.fract() == 0.0 {
                Ok(v as i64)
            } else {
                Err(E::invalid_value(Unexpected::Float(v), &self))
            }
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<i64, E> {
            v.trim()
                .parse()
                .map_err(|_| E::invalid_value(Unexpected::Str(v), &self))
        }
    }

    deserializer.deserialize_any(IntegerLike)
}
