//! Macros for defining typed ID types.

/// Macro to define a typed ID backed by a UUID.
///
/// This generates a newtype wrapper around UUID with:
/// - `new()` to generate a fresh random (v4) ID
/// - `parse()` to parse from canonical string form
/// - `Display` and `FromStr` implementations
/// - `Serialize` and `Deserialize` implementations (canonical string form)
/// - `Ord`, `Hash`, and other standard traits
///
/// # Example
///
/// ```ignore
/// define_id!(EntityId);
/// define_id!(SchemaId);
///
/// let entity_id = EntityId::new();
/// let parsed: EntityId = "550e8400-e29b-41d4-a716-446655440000".parse()?;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        /// A typed ID for this resource type.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name($crate::Uuid);

        impl $name {
            /// Creates a new ID with a fresh random UUID.
            #[must_use]
            pub fn new() -> Self {
                Self($crate::Uuid::new_v4())
            }

            /// Creates an ID from a raw UUID.
            #[must_use]
            pub const fn from_uuid(uuid: $crate::Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the underlying UUID.
            #[must_use]
            pub const fn uuid(&self) -> $crate::Uuid {
                self.0
            }

            /// Parses an ID from a string.
            ///
            /// The string must parse as a UUID; the canonical hyphenated
            /// form is what the platform emits.
            pub fn parse(s: &str) -> Result<Self, $crate::IdError> {
                if s.is_empty() {
                    return Err($crate::IdError::Empty);
                }

                let uuid = s
                    .parse::<$crate::Uuid>()
                    .map_err(|e| $crate::IdError::InvalidUuid(e.to_string()))?;

                Ok(Self(uuid))
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0.hyphenated())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(&self.to_string())
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                Self::parse(&s).map_err(serde::de::Error::custom)
            }
        }

        impl AsRef<$crate::Uuid> for $name {
            fn as_ref(&self) -> &$crate::Uuid {
                &self.0
            }
        }
    };
}
