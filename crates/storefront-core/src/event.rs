//! Domain event taxonomy.
//!
//! Events are immutable records of something that happened to one entity
//! instance. Fields are private and only readable through accessors, so a
//! constructed event can never change its stream or timestamp.

use serde::{Deserialize, Serialize};

use crate::codec::integer_like;

/// Discriminator of [`EntityCreated`] records.
pub const ENTITY_CREATED: &str = "storefront.core.event.EntityCreated";

/// Discriminator of [`AttributeUpdated`] records.
pub const ATTRIBUTE_UPDATED: &str = "storefront.core.event.AttributeUpdated";

/// Marks the genesis of a stream. Carries no payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityCreated {
    stream_id: String,
    entity_type: String,
    #[serde(deserialize_with = "integer_like")]
    timestamp: i64,
}

impl EntityCreated {
    /// Creates a new `EntityCreated` event.
    #[must_use]
    pub fn new(
        stream_id: impl Into<String>,
        entity_type: impl Into<String>,
        timestamp: i64,
    ) -> Self {
        Self {
            stream_id: stream_id.into(),
            entity_type: entity_type.into(),
            timestamp,
        }
    }
}

/// Records a new value for one named attribute of an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeUpdated {
    stream_id: String,
    entity_type: String,
    #[serde(deserialize_with = "integer_like")]
    timestamp: i64,
    name: String,
    value: AttributeValue,
}

impl AttributeUpdated {
    /// Creates a new `AttributeUpdated` event.
    #[must_use]
    pub fn new(
        stream_id: impl Into<String>,
        entity_type: impl Into<String>,
        timestamp: i64,
        name: impl Into<String>,
        value: impl Into<AttributeValue>,
    ) -> Self {
        Self {
            stream_id: stream_id.into(),
            entity_type: entity_type.into(),
            timestamp,
            name: name.into(),
            value: value.into(),
        }
    }

    /// The attribute being changed.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The new value of the attribute.
    #[must_use]
    pub fn value(&self) -> &AttributeValue {
        &self.value
    }
}

/// A scalar attribute value as it travels on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// A boolean flag.
    Flag(bool),
    /// Any JSON number.
    Number(serde_json::Number),
    /// A text value.
    Text(String),
}

impl AttributeValue {
    /// Returns the text, if this is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Returns the flag, if this is a boolean value.
    #[must_use]
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(flag) => Some(*flag),
            _ => None,
        }
    }

    /// Short name of the value kind, for error messages.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Flag(_) => "boolean",
            Self::Number(_) => "number",
            Self::Text(_) => "text",
        }
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

/// Domain events understood by every aggregate.
///
/// Serialized with an `eventType` discriminator naming the variant so that
/// stored records can be turned back into the concrete variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "eventType")]
pub enum DomainEvent {
    /// A stream has been started.
    #[serde(rename = "storefront.core.event.EntityCreated")]
    EntityCreated(EntityCreated),
    /// An attribute of the entity has changed.
    #[serde(rename = "storefront.core.event.AttributeUpdated")]
    AttributeUpdated(AttributeUpdated),
}

impl DomainEvent {
    /// Returns the event type discriminator.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::EntityCreated(_) => ENTITY_CREATED,
            Self::AttributeUpdated(_) => ATTRIBUTE_UPDATED,
        }
    }

    /// Identifier of the stream this event belongs to.
    #[must_use]
    pub fn stream_id(&self) -> &str {
        match self {
            Self::EntityCreated(event) => &event.stream_id,
            Self::AttributeUpdated(event) => &event.stream_id,
        }
    }

    /// Logical type name of the owning aggregate.
    #[must_use]
    pub fn entity_type(&self) -> &str {
        match self {
            Self::EntityCreated(event) => &event.entity_type,
            Self::AttributeUpdated(event) => &event.entity_type,
        }
    }

    /// Creation time in epoch milliseconds.
    #[must_use]
    pub fn timestamp(&self) -> i64 {
        match self {
            Self::EntityCreated(event) => event.timestamp,
            Self::AttributeUpdated(event) => event.timestamp,
        }
    }
}

impl From<EntityCreated> for DomainEvent {
    fn from(event: EntityCreated) -> Self {
        Self::EntityCreated(event)
    }
}

impl From<AttributeUpdated> for DomainEvent {
    fn from(event: AttributeUpdated) -> Self {
        Self::AttributeUpdated(event)
    }
}
