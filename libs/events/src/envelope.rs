//! Event envelope - the common wrapper for all events.

use std::any::Any;

use chrono::{DateTime, Utc};
use mkg_id::{EventId, TenantId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::EventError;

/// Default schema version for newly constructed events.
pub const DEFAULT_EVENT_VERSION: &str = "1.0";

fn default_version() -> String {
    DEFAULT_EVENT_VERSION.to_string()
}

fn default_source() -> String {
    crate::types::KERNEL_SOURCE.to_string()
}

/// Metadata associated with an event.
///
/// Optional contextual information that can be attached to any event for
/// tracing, debugging, or audit purposes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EventMetadata {
    /// Correlation ID for request tracing across services.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,

    /// ID of the event that caused this event.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub causation_id: Option<String>,

    /// ID of the user who triggered this event.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    /// Original API request ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,

    /// Free-form context carried alongside the tracing fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Map<String, Value>>,
}

impl EventMetadata {
    /// Creates empty metadata.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the correlation ID.
    #[must_use]
    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    /// Sets the causation ID.
    #[must_use]
    pub fn with_causation_id(mut self, id: impl Into<String>) -> Self {
        self.causation_id = Some(id.into());
        self
    }

    /// Sets the user ID.
    #[must_use]
    pub fn with_user_id(mut self, id: impl Into<String>) -> Self {
        self.user_id = Some(id.into());
        self
    }

    /// Sets the request ID.
    #[must_use]
    pub fn with_request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }

    /// Sets the free-form context map.
    #[must_use]
    pub fn with_context(mut self, context: Map<String, Value>) -> Self {
        self.context = Some(context);
        self
    }
}

/// The common envelope every platform event carries.
///
/// Concrete schemas embed an `EventCore` (flattened on the wire) and add
/// their domain fields on top. `EventCore` is also usable on its own as a
/// loosely-typed generic event whose payload lives entirely in `data`.
///
/// Field defaults mirror producer behavior: a payload arriving without
/// `event_id`, `timestamp`, `version`, or `source` is reconstructed with a
/// fresh ID, the current UTC time, the default version, and the kernel
/// source respectively. `tenant_id` and `event_type` have no defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventCore {
    /// Unique identifier for this event instance.
    #[serde(default = "EventId::new")]
    pub event_id: EventId,

    /// Event type tag for routing (e.g., "entity.created").
    pub event_type: String,

    /// Service that produced this event (e.g., "mkg-kernel").
    #[serde(default = "default_source")]
    pub source: String,

    /// Tenant identifier for multi-tenant isolation. Never empty.
    pub tenant_id: TenantId,

    /// UTC timestamp when the event was created.
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,

    /// Schema version for backward compatibility.
    #[serde(default = "default_version")]
    pub version: String,

    /// Event-specific payload data for loosely-typed consumers.
    #[serde(default)]
    pub data: Map<String, Value>,

    /// Optional metadata for tracing and debugging.
    #[serde(default)]
    pub metadata: EventMetadata,
}

impl EventCore {
    /// Creates a new event core builder.
    pub fn builder() -> EventCoreBuilder {
        EventCoreBuilder::new()
    }

    /// Checks the envelope-level field constraints.
    ///
    /// Constructed cores satisfy these by construction; this is the gate for
    /// cores reconstructed from raw payloads.
    pub fn validate_fields(&self) -> Result<(), EventError> {
        if self.event_type.is_empty() {
            return Err(EventError::Validation(
                "event_type cannot be empty".to_string(),
            ));
        }
        if self.source.is_empty() {
            return Err(EventError::Validation("source cannot be empty".to_string()));
        }
        if self.version.is_empty() {
            return Err(EventError::Validation("version cannot be empty".to_string()));
        }
        Ok(())
    }
}

/// Builder for constructing event cores.
///
/// `build()` validates required fields and returns an error instead of
/// panicking; defaults are generated for everything the caller omits.
#[derive(Debug, Default)]
pub struct EventCoreBuilder {
    event_id: Option<EventId>,
    event_type: Option<String>,
    source: Option<String>,
    tenant_id: Option<TenantId>,
    timestamp: Option<DateTime<Utc>>,
    version: Option<String>,
    data: Option<Map<String, Value>>,
    metadata: Option<EventMetadata>,
}

impl EventCoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn event_id(mut self, id: EventId) -> Self {
        self.event_id = Some(id);
        self
    }

    pub fn event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = Some(event_type.into());
        self
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn tenant_id(mut self, tenant_id: TenantId) -> Self {
        self.tenant_id = Some(tenant_id);
        self
    }

    pub fn timestamp(mut self, ts: DateTime<Utc>) -> Self {
        self.timestamp = Some(ts);
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn data(mut self, data: Map<String, Value>) -> Self {
        self.data = Some(data);
        self
    }

    pub fn metadata(mut self, metadata: EventMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Builds the event core.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::Validation`] if `event_type`, `source`, or
    /// `tenant_id` is missing, or if a provided field is empty.
    pub fn build(self) -> Result<EventCore, EventError> {
        let event_type = self
            .event_type
            .ok_or_else(|| EventError::Validation("event_type is required".to_string()))?;
        let source = self
            .source
            .ok_or_else(|| EventError::Validation("source is required".to_string()))?;
        let tenant_id = self
            .tenant_id
            .ok_or_else(|| EventError::Validation("tenant_id is required".to_string()))?;

        let core = EventCore {
            event_id: self.event_id.unwrap_or_else(EventId::new),
            event_type,
            source,
            tenant_id,
            timestamp: self.timestamp.unwrap_or_else(Utc::now),
            version: self.version.unwrap_or_else(default_version),
            data: self.data.unwrap_or_default(),
            metadata: self.metadata.unwrap_or_default(),
        };
        core.validate_fields()?;
        Ok(core)
    }
}

/// The shared capability set of all platform events.
///
/// Every concrete schema implements this trait; [`EventRegistry`] returns
/// events as `Box<dyn Event>`, downcastable to the concrete type via
/// [`Event::as_any`].
///
/// [`EventRegistry`]: crate::EventRegistry
pub trait Event: std::fmt::Debug + Send + Sync {
    /// The common envelope fields.
    fn core(&self) -> &EventCore;

    /// Checks all schema invariants, including the fixed-tag rule for typed
    /// schemas. Run on every registry deserialization.
    fn validate(&self) -> Result<(), EventError>;

    /// Serializes the full event (envelope and domain fields, flat) to JSON.
    fn to_json(&self) -> Result<Value, EventError>;

    /// Upcast for downcasting registry output to the concrete schema.
    fn as_any(&self) -> &dyn Any;

    /// The wire tag identifying this event's schema.
    fn event_type(&self) -> &str {
        &self.core().event_type
    }

    /// The unique identifier of this event instance.
    fn event_id(&self) -> EventId {
        self.core().event_id
    }

    /// The tenant this event is scoped to.
    fn tenant_id(&self) -> &TenantId {
        &self.core().tenant_id
    }

    /// The service that produced this event.
    fn source(&self) -> &str {
        &self.core().source
    }

    /// Converts the event to an EventBridge `PutEvents` entry.
    ///
    /// Serializes the full validated event as the entry's `Detail` body and
    /// wraps it with the event's source, its tag as `DetailType`, and the
    /// target bus name. Performs no I/O; delivery belongs to the transport
    /// client.
    fn to_eventbridge_entry(&self, event_bus_name: &str) -> Result<EventBridgeEntry, EventError> {
        let detail = serde_json::to_string(&self.to_json()?)?;
        Ok(EventBridgeEntry {
            event_bus_name: event_bus_name.to_string(),
            source: self.core().source.clone(),
            detail_type: self.core().event_type.clone(),
            detail,
        })
    }
}

impl Event for EventCore {
    fn core(&self) -> &EventCore {
        self
    }

    fn validate(&self) -> Result<(), EventError> {
        self.validate_fields()
    }

    fn to_json(&self) -> Result<Value, EventError> {
        Ok(serde_json::to_value(self)?)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// An AWS EventBridge `PutEvents` request entry.
///
/// Field names follow the EventBridge API (PascalCase on the wire).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EventBridgeEntry {
    /// Name of the target event bus.
    pub event_bus_name: String,

    /// The event's source service.
    pub source: String,

    /// The event's type tag.
    pub detail_type: String,

    /// The full serialized event as a JSON string.
    pub detail: String,
}

impl EventBridgeEntry {
    /// Parses the `Detail` body back into a JSON value.
    pub fn parse_detail(&self) -> Result<Value, EventError> {
        serde_json::from_str(&self.detail).map_err(|e| EventError::Serialization(e.to_string()))
    }
}
