//! # mkg-events
//!
//! Event schemas, registry, and EventBridge envelope conversion for the
//! MKG platform.
//!
//! ## Design Principles
//!
//! - Events are immutable, validated records scoped to exactly one tenant
//! - Every event carries the common envelope (id, tag, source, tenant,
//!   timestamp, version, data, metadata); concrete schemas add domain fields
//! - Events are versioned for schema evolution
//! - The core constructs and converts in-memory representations only;
//!   delivery, retry, and dispatch belong to the transport layer
//!
//! ## Event Envelope
//!
//! All events share the [`EventCore`] envelope with:
//! - Identity (`event_id`, generated at construction)
//! - Routing (`event_type`, `source`)
//! - Tenant isolation (`tenant_id`, mandatory and never empty)
//! - Ordering and evolution (`timestamp`, `version`)
//! - Correlation (`metadata`)
//!
//! ## Deserialization
//!
//! [`EventRegistry`] maps wire tags to concrete schema types. Payloads
//! deserialize to the exact registered type and are validated on the way
//! in; unknown tags and conflicting registrations fail loudly.
//!
//! ## EventBridge
//!
//! [`Event::to_eventbridge_entry`] renders any event as a `PutEvents`
//! entry (`Source` / `DetailType` / `Detail` / `EventBusName`). The entry
//! round-trips: feeding its parsed `Detail` back through the registry
//! reconstructs an equal event.

mod envelope;
mod error;
mod registry;
mod types;
mod validator;

pub use envelope::{
    Event, EventBridgeEntry, EventCore, EventCoreBuilder, EventMetadata, DEFAULT_EVENT_VERSION,
};
pub use error::EventError;
pub use registry::{deserialize_event, register_event, EventRegistry};
pub use types::*;
pub use validator::{field_rule, EventValidator, ValidationReport, ValidationRule};
