//! # mkg-id
//!
//! Typed ID types, parsing, and validation for the MKG platform.
//!
//! ## Design Principles
//!
//! - IDs are stable and system-generated; names are user-controlled labels
//! - All IDs have a canonical string representation with strict parsing
//! - IDs support roundtrip serialization (parse → format → parse)
//! - IDs are typed to prevent mixing different resource types
//!
//! ## ID Format
//!
//! Resource IDs are UUIDs rendered in canonical hyphenated form, which is
//! also how they appear on the wire:
//!
//! - `550e8400-e29b-41d4-a716-446655440000`
//!
//! Tenant IDs are opaque, caller-assigned strings. The only invariant is
//! that a tenant ID is never empty — every event on the platform is scoped
//! to exactly one tenant, and [`TenantId`] enforces that boundary at parse
//! and deserialization time.

mod error;
mod macros;
mod types;

pub use error::IdError;
pub use types::*;

/// Re-export uuid for consumers that need raw UUID operations
pub use uuid::Uuid;
