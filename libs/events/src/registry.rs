//! Event type registry for type-directed deserialization.
//!
//! The registry maps wire tags (e.g. `"entity.created"`) to concrete schema
//! types and decodes raw payloads into fully validated events of the exact
//! registered type. Registration is explicit: the builtin table is assembled
//! by [`EventRegistry::with_builtin_events`] rather than by import-order side
//! effects, and external schemas register through [`EventRegistry::register`]
//! (or [`register_event`] for the process-wide instance).
//!
//! Per tag the registry has two observable states, unregistered and
//! registered, with a single one-way transition; there is no unregister.
//! The map sits behind an `RwLock` so late registrations take an exclusive
//! lock while deserialization reads stay concurrent.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{OnceLock, PoisonError, RwLock};

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::envelope::Event;
use crate::error::EventError;
use crate::types::{
    event_types, EntityCreated, EntityDeleted, EntityUpdated, SchemaCreated, SchemaUpdated,
};

type DecodeFn = Box<dyn Fn(Value) -> Result<Box<dyn Event>, EventError> + Send + Sync>;

struct Registration {
    schema: TypeId,
    schema_name: &'static str,
    decode: DecodeFn,
}

impl Registration {
    fn of<E>() -> Self
    where
        E: Event + DeserializeOwned + 'static,
    {
        Self {
            schema: TypeId::of::<E>(),
            schema_name: std::any::type_name::<E>(),
            decode: Box::new(|payload| {
                let event: E = serde_json::from_value(payload)
                    .map_err(|e| EventError::Validation(e.to_string()))?;
                event.validate()?;
                Ok(Box::new(event) as Box<dyn Event>)
            }),
        }
    }
}

/// Registry mapping event type tags to concrete schema types.
pub struct EventRegistry {
    entries: RwLock<HashMap<String, Registration>>,
}

impl EventRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Creates a registry with the kernel's builtin schemas registered.
    #[must_use]
    pub fn with_builtin_events() -> Self {
        let registry = Self::new();
        {
            let mut entries = registry.write();
            entries.insert(
                event_types::ENTITY_CREATED.to_string(),
                Registration::of::<EntityCreated>(),
            );
            entries.insert(
                event_types::ENTITY_UPDATED.to_string(),
                Registration::of::<EntityUpdated>(),
            );
            entries.insert(
                event_types::ENTITY_DELETED.to_string(),
                Registration::of::<EntityDeleted>(),
            );
            entries.insert(
                event_types::SCHEMA_CREATED.to_string(),
                Registration::of::<SchemaCreated>(),
            );
            entries.insert(
                event_types::SCHEMA_UPDATED.to_string(),
                Registration::of::<SchemaUpdated>(),
            );
        }
        registry
    }

    /// The process-wide registry, initialized once with the builtin schemas.
    pub fn global() -> &'static EventRegistry {
        static GLOBAL: OnceLock<EventRegistry> = OnceLock::new();
        GLOBAL.get_or_init(EventRegistry::with_builtin_events)
    }

    /// Registers schema type `E` under `event_type`.
    ///
    /// Re-registering the same schema type under the same tag is an
    /// idempotent no-op. Registering a different type under an occupied tag
    /// fails with [`EventError::DuplicateRegistration`], so externally
    /// registered kinds cannot shadow builtin ones.
    pub fn register<E>(&self, event_type: &str) -> Result<(), EventError>
    where
        E: Event + DeserializeOwned + 'static,
    {
        if event_type.is_empty() {
            return Err(EventError::Validation(
                "event type tag cannot be empty".to_string(),
            ));
        }

        let mut entries = self.write();
        if let Some(existing) = entries.get(event_type) {
            if existing.schema == TypeId::of::<E>() {
                return Ok(());
            }
            return Err(EventError::DuplicateRegistration {
                event_type: event_type.to_string(),
                existing: existing.schema_name,
                attempted: std::any::type_name::<E>(),
            });
        }

        entries.insert(event_type.to_string(), Registration::of::<E>());
        Ok(())
    }

    /// Deserializes a raw payload into the registered concrete event type.
    ///
    /// Looks up the payload's `event_type`, decodes the registered schema,
    /// and runs its validation. Unknown keys in the payload are ignored.
    ///
    /// # Errors
    ///
    /// - [`EventError::Validation`] if the payload has no string `event_type`
    ///   or its fields fail schema validation.
    /// - [`EventError::UnknownEventType`] if the tag has no registered
    ///   schema. Callers that need forward compatibility with unknown tags
    ///   catch this explicitly.
    pub fn deserialize(&self, payload: &Value) -> Result<Box<dyn Event>, EventError> {
        let event_type = payload
            .get("event_type")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                EventError::Validation("event payload must carry an 'event_type' field".to_string())
            })?;

        let entries = self.read();
        let registration = entries
            .get(event_type)
            .ok_or_else(|| EventError::UnknownEventType(event_type.to_string()))?;

        (registration.decode)(payload.clone())
    }

    /// Returns true if `event_type` has a registered schema.
    #[must_use]
    pub fn contains(&self, event_type: &str) -> bool {
        self.read().contains_key(event_type)
    }

    /// Lists all registered event type tags, sorted.
    #[must_use]
    pub fn event_types(&self) -> Vec<String> {
        let mut tags: Vec<String> = self.read().keys().cloned().collect();
        tags.sort();
        tags
    }

    /// Number of registered event types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Returns true if no event types are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, Registration>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, Registration>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for EventRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Registers schema type `E` under `event_type` in the process-wide registry.
pub fn register_event<E>(event_type: &str) -> Result<(), EventError>
where
    E: Event + DeserializeOwned + 'static,
{
    EventRegistry::global().register::<E>(event_type)
}

/// Deserializes a raw payload against the process-wide registry.
pub fn deserialize_event(payload: &Value) -> Result<Box<dyn Event>, EventError> {
    EventRegistry::global().deserialize(payload)
}
