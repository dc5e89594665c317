//! Typed ID definitions for platform resources.
//!
//! UUID-backed IDs are system-generated and render in canonical hyphenated
//! form. Tenant IDs are caller-assigned opaque strings, validated non-empty.

use crate::define_id;

// =============================================================================
// Events and Entities
// =============================================================================

define_id!(EventId);
define_id!(EntityId);
define_id!(SchemaId);

// =============================================================================
// Tenants
// =============================================================================

/// Identifier of the tenant that owns a resource or event.
///
/// Tenant IDs are opaque strings assigned by the platform's tenancy layer,
/// not UUIDs. The isolation invariant is that a tenant ID is never empty:
/// parsing and deserialization both reject the empty string, so a value of
/// this type always names exactly one tenant.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TenantId(String);

impl TenantId {
    /// Creates a tenant ID from a string, rejecting empty input.
    pub fn new(id: impl Into<String>) -> Result<Self, crate::IdError> {
        let id = id.into();
        if id.is_empty() {
            return Err(crate::IdError::Empty);
        }
        Ok(Self(id))
    }

    /// Returns the tenant ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the ID, returning the inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for TenantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TenantId {
    type Err = crate::IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for TenantId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for TenantId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for TenantId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Tests
// =============================================================================
