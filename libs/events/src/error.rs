//! Error types for event construction, registration, and deserialization.

use thiserror::Error;

/// Errors that can occur when constructing or handling events.
#[derive(Debug, Error, Clone)]
pub enum EventError {
    /// A field violated its type, required, or constraint rule.
    #[error("validation failed: {0}")]
    Validation(String),

    /// An event type tag was registered twice with conflicting schema types.
    #[error("event type '{event_type}' is already registered to {existing}, refusing {attempted}")]
    DuplicateRegistration {
        event_type: String,
        existing: &'static str,
        attempted: &'static str,
    },

    /// The event type tag has no registered schema.
    #[error("unknown event type: {0}")]
    UnknownEventType(String),

    /// Serialization error while producing the wire form.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for EventError {
    fn from(err: serde_json::Error) -> Self {
        EventError::Serialization(err.to_string())
    }
}
