//! Concrete event schemas published by the kernel.
//!
//! Each schema embeds the common [`EventCore`] envelope (flattened on the
//! wire) and adds its domain fields. Constructors fix the event type tag and
//! source, validate domain fields, and populate the loosely-typed `data`
//! projection. A payload whose `event_type` disagrees with a schema's fixed
//! tag fails validation.

use chrono::{DateTime, Utc};
use mkg_id::{EntityId, SchemaId, TenantId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::envelope::{Event, EventCore, EventMetadata};
use crate::error::EventError;

/// Default source service for kernel-produced events.
pub const KERNEL_SOURCE: &str = "mkg-kernel";

/// All event type tags as constants.
pub mod event_types {
    // Entity lifecycle
    pub const ENTITY_CREATED: &str = "entity.created";
    pub const ENTITY_UPDATED: &str = "entity.updated";
    pub const ENTITY_DELETED: &str = "entity.deleted";

    // Entity type schemas
    pub const SCHEMA_CREATED: &str = "schema.created";
    pub const SCHEMA_UPDATED: &str = "schema.updated";
}

fn default_soft_delete() -> bool {
    true
}

/// Implements the [`Event`] capability set and the envelope override
/// methods for a concrete schema with a fixed tag.
macro_rules! impl_event {
    ($name:ident, $tag:expr) => {
        impl $name {
            /// The fixed wire tag for this schema.
            pub const EVENT_TYPE: &'static str = $tag;

            /// Replaces the event metadata.
            #[must_use]
            pub fn with_metadata(mut self, metadata: EventMetadata) -> Self {
                self.core.metadata = metadata;
                self
            }

            /// Overrides the producing service name.
            #[must_use]
            pub fn with_source(mut self, source: impl Into<String>) -> Self {
                self.core.source = source.into();
                self
            }

            /// Overrides the construction timestamp.
            #[must_use]
            pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
                self.core.timestamp = timestamp;
                self
            }

            /// Overrides the schema version.
            #[must_use]
            pub fn with_version(mut self, version: impl Into<String>) -> Self {
                self.core.version = version.into();
                self
            }

            /// Replaces the loosely-typed `data` projection.
            #[must_use]
            pub fn with_data(mut self, data: Map<String, Value>) -> Self {
                self.core.data = data;
                self
            }
        }

        impl Event for $name {
            fn core(&self) -> &EventCore {
                &self.core
            }

            fn validate(&self) -> Result<(), EventError> {
                if self.core.event_type != Self::EVENT_TYPE {
                    return Err(EventError::Validation(format!(
                        "event_type '{}' does not match the fixed tag '{}' of {}",
                        self.core.event_type,
                        Self::EVENT_TYPE,
                        stringify!($name),
                    )));
                }
                self.core.validate_fields()?;
                self.validate_domain()
            }

            fn to_json(&self) -> Result<Value, EventError> {
                Ok(serde_json::to_value(self)?)
            }

            fn as_any(&self) -> &dyn std::any::Any {
                self
            }
        }
    };
}

// =============================================================================
// Entity Events
// =============================================================================

/// Event published when a new entity is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityCreated {
    #[serde(flatten)]
    pub core: EventCore,

    /// Unique identifier of the created entity.
    pub entity_id: EntityId,

    /// Type of the entity (e.g., "Article", "Asset").
    pub entity_type: String,

    /// Initial attribute values of the entity.
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

impl EntityCreated {
    /// Creates a validated `entity.created` event.
    pub fn new(
        tenant_id: TenantId,
        entity_id: EntityId,
        entity_type: impl Into<String>,
        attributes: Map<String, Value>,
    ) -> Result<Self, EventError> {
        let core = EventCore::builder()
            .event_type(Self::EVENT_TYPE)
            .source(KERNEL_SOURCE)
            .tenant_id(tenant_id)
            .build()?;

        let mut event = Self {
            core,
            entity_id,
            entity_type: entity_type.into(),
            attributes,
        };
        event.validate_domain()?;
        if event.core.data.is_empty() {
            event.core.data = event.data_projection();
        }
        Ok(event)
    }

    fn data_projection(&self) -> Map<String, Value> {
        let mut data = Map::new();
        data.insert(
            "entity_id".to_string(),
            Value::String(self.entity_id.to_string()),
        );
        data.insert(
            "entity_type".to_string(),
            Value::String(self.entity_type.clone()),
        );
        data.insert(
            "attributes".to_string(),
            Value::Object(self.attributes.clone()),
        );
        data
    }

    fn validate_domain(&self) -> Result<(), EventError> {
        if self.entity_type.is_empty() {
            return Err(EventError::Validation(
                "entity_type cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl_event!(EntityCreated, event_types::ENTITY_CREATED);

/// Event published when an entity is updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityUpdated {
    #[serde(flatten)]
    pub core: EventCore,

    /// Unique identifier of the updated entity.
    pub entity_id: EntityId,

    /// Type of the entity.
    pub entity_type: String,

    /// Names of the attributes that were modified.
    #[serde(default)]
    pub changed_attributes: Vec<String>,

    /// Previous values of the changed attributes.
    #[serde(default)]
    pub previous_values: Map<String, Value>,

    /// New values of the changed attributes.
    #[serde(default)]
    pub new_values: Map<String, Value>,
}

impl EntityUpdated {
    /// Creates a validated `entity.updated` event.
    pub fn new(
        tenant_id: TenantId,
        entity_id: EntityId,
        entity_type: impl Into<String>,
        changed_attributes: Vec<String>,
        previous_values: Map<String, Value>,
        new_values: Map<String, Value>,
    ) -> Result<Self, EventError> {
        let core = EventCore::builder()
            .event_type(Self::EVENT_TYPE)
            .source(KERNEL_SOURCE)
            .tenant_id(tenant_id)
            .build()?;

        let mut event = Self {
            core,
            entity_id,
            entity_type: entity_type.into(),
            changed_attributes,
            previous_values,
            new_values,
        };
        event.validate_domain()?;
        if event.core.data.is_empty() {
            event.core.data = event.data_projection();
        }
        Ok(event)
    }

    fn data_projection(&self) -> Map<String, Value> {
        let mut data = Map::new();
        data.insert(
            "entity_id".to_string(),
            Value::String(self.entity_id.to_string()),
        );
        data.insert(
            "entity_type".to_string(),
            Value::String(self.entity_type.clone()),
        );
        data.insert(
            "changed_attributes".to_string(),
            Value::Array(
                self.changed_attributes
                    .iter()
                    .map(|name| Value::String(name.clone()))
                    .collect(),
            ),
        );
        data.insert(
            "previous_values".to_string(),
            Value::Object(self.previous_values.clone()),
        );
        data.insert(
            "new_values".to_string(),
            Value::Object(self.new_values.clone()),
        );
        data
    }

    fn validate_domain(&self) -> Result<(), EventError> {
        if self.entity_type.is_empty() {
            return Err(EventError::Validation(
                "entity_type cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl_event!(EntityUpdated, event_types::ENTITY_UPDATED);

/// Event published when an entity is deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDeleted {
    #[serde(flatten)]
    pub core: EventCore,

    /// Unique identifier of the deleted entity.
    pub entity_id: EntityId,

    /// Type of the entity.
    pub entity_type: String,

    /// Whether this is a soft delete (recoverable).
    #[serde(default = "default_soft_delete")]
    pub is_soft_delete: bool,
}

impl EntityDeleted {
    /// Creates a validated `entity.deleted` event.
    pub fn new(
        tenant_id: TenantId,
        entity_id: EntityId,
        entity_type: impl Into<String>,
        is_soft_delete: bool,
    ) -> Result<Self, EventError> {
        let core = EventCore::builder()
            .event_type(Self::EVENT_TYPE)
            .source(KERNEL_SOURCE)
            .tenant_id(tenant_id)
            .build()?;

        let mut event = Self {
            core,
            entity_id,
            entity_type: entity_type.into(),
            is_soft_delete,
        };
        event.validate_domain()?;
        if event.core.data.is_empty() {
            event.core.data = event.data_projection();
        }
        Ok(event)
    }

    fn data_projection(&self) -> Map<String, Value> {
        let mut data = Map::new();
        data.insert(
            "entity_id".to_string(),
            Value::String(self.entity_id.to_string()),
        );
        data.insert(
            "entity_type".to_string(),
            Value::String(self.entity_type.clone()),
        );
        data.insert(
            "is_soft_delete".to_string(),
            Value::Bool(self.is_soft_delete),
        );
        data
    }

    fn validate_domain(&self) -> Result<(), EventError> {
        if self.entity_type.is_empty() {
            return Err(EventError::Validation(
                "entity_type cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl_event!(EntityDeleted, event_types::ENTITY_DELETED);

// =============================================================================
// Schema Events
// =============================================================================

/// Event published when a new entity type schema is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaCreated {
    #[serde(flatten)]
    pub core: EventCore,

    /// Unique identifier of the created schema.
    pub schema_id: SchemaId,

    /// Name of the entity type the schema describes.
    pub entity_type: String,

    /// Attribute definitions.
    #[serde(default)]
    pub attributes: Vec<Map<String, Value>>,
}

impl SchemaCreated {
    /// Creates a validated `schema.created` event.
    pub fn new(
        tenant_id: TenantId,
        schema_id: SchemaId,
        entity_type: impl Into<String>,
        attributes: Vec<Map<String, Value>>,
    ) -> Result<Self, EventError> {
        let core = EventCore::builder()
            .event_type(Self::EVENT_TYPE)
            .source(KERNEL_SOURCE)
            .tenant_id(tenant_id)
            .build()?;

        let mut event = Self {
            core,
            schema_id,
            entity_type: entity_type.into(),
            attributes,
        };
        event.validate_domain()?;
        if event.core.data.is_empty() {
            event.core.data = event.data_projection();
        }
        Ok(event)
    }

    fn data_projection(&self) -> Map<String, Value> {
        let mut data = Map::new();
        data.insert(
            "schema_id".to_string(),
            Value::String(self.schema_id.to_string()),
        );
        data.insert(
            "entity_type".to_string(),
            Value::String(self.entity_type.clone()),
        );
        data.insert(
            "attributes".to_string(),
            Value::Array(self.attributes.iter().cloned().map(Value::Object).collect()),
        );
        data
    }

    fn validate_domain(&self) -> Result<(), EventError> {
        if self.entity_type.is_empty() {
            return Err(EventError::Validation(
                "entity_type cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl_event!(SchemaCreated, event_types::SCHEMA_CREATED);

/// Event published when an entity type schema is updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaUpdated {
    #[serde(flatten)]
    pub core: EventCore,

    /// Unique identifier of the updated schema.
    pub schema_id: SchemaId,

    /// Name of the entity type the schema describes.
    pub entity_type: String,

    /// New attributes added to the schema.
    #[serde(default)]
    pub added_attributes: Vec<Map<String, Value>>,

    /// Names of attributes removed from the schema.
    #[serde(default)]
    pub removed_attributes: Vec<String>,

    /// Attributes that were modified.
    #[serde(default)]
    pub modified_attributes: Vec<Map<String, Value>>,
}

impl SchemaUpdated {
    /// Creates a validated `schema.updated` event.
    pub fn new(
        tenant_id: TenantId,
        schema_id: SchemaId,
        entity_type: impl Into<String>,
        added_attributes: Vec<Map<String, Value>>,
        removed_attributes: Vec<String>,
        modified_attributes: Vec<Map<String, Value>>,
    ) -> Result<Self, EventError> {
        let core = EventCore::builder()
            .event_type(Self::EVENT_TYPE)
            .source(KERNEL_SOURCE)
            .tenant_id(tenant_id)
            .build()?;

        let mut event = Self {
            core,
            schema_id,
            entity_type: entity_type.into(),
            added_attributes,
            removed_attributes,
            modified_attributes,
        };
        event.validate_domain()?;
        if event.core.data.is_empty() {
            event.core.data = event.data_projection();
        }
        Ok(event)
    }

    fn data_projection(&self) -> Map<String, Value> {
        let mut data = Map::new();
        data.insert(
            "schema_id".to_string(),
            Value::String(self.schema_id.to_string()),
        );
        data.insert(
            "entity_type".to_string(),
            Value::String(self.entity_type.clone()),
        );
        data.insert(
            "added_attributes".to_string(),
            Value::Array(
                self.added_attributes
                    .iter()
                    .cloned()
                    .map(Value::Object)
                    .collect(),
            ),
        );
        data.insert(
            "removed_attributes".to_string(),
            Value::Array(
                self.removed_attributes
                    .iter()
                    .map(|name| Value::String(name.clone()))
                    .collect(),
            ),
        );
        data.insert(
            "modified_attributes".to_string(),
            Value::Array(
                self.modified_attributes
                    .iter()
                    .cloned()
                    .map(Value::Object)
                    .collect(),
            ),
        );
        data
    }

    fn validate_domain(&self) -> Result<(), EventError> {
        if self.entity_type.is_empty() {
            return Err(EventError::Validation(
                "entity_type cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl_event!(SchemaUpdated, event_types::SCHEMA_UPDATED);

// =============================================================================
// Tests
// =============================================================================
