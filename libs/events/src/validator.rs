//! Pre-flight validation of raw event payloads against policy rules.
//!
//! The validator is a reporting surface: it accumulates every problem it
//! finds into a [`ValidationReport`] instead of failing fast, so producers
//! can see all policy violations at once before handing a payload to the
//! transport. Construction-path enforcement stays with the schemas and the
//! registry, which reject invalid events with [`EventError`].
//!
//! [`EventError`]: crate::EventError

use std::collections::HashSet;

use serde_json::Value;

use crate::envelope::Event;
use crate::registry::EventRegistry;

/// Result of validating a payload or event.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    /// Whether the payload passed every check.
    pub is_valid: bool,

    /// The payload's event type tag, if present.
    pub event_type: Option<String>,

    /// Violations that make the payload invalid.
    pub errors: Vec<String>,

    /// Non-fatal observations (e.g. an unregistered tag).
    pub warnings: Vec<String>,
}

/// A custom validation rule: returns the error messages it finds.
pub type ValidationRule = Box<dyn Fn(&Value) -> Vec<String> + Send + Sync>;

/// Validates event payloads against schema registration and policy rules.
///
/// ```
/// use mkg_events::{EventRegistry, EventValidator};
/// use serde_json::json;
///
/// let registry = EventRegistry::with_builtin_events();
/// let validator = EventValidator::new()
///     .allow_sources(["mkg-kernel", "mkg-extension-search"]);
///
/// let report = validator.validate(
///     &registry,
///     &json!({
///         "event_type": "entity.created",
///         "source": "mkg-kernel",
///         "tenant_id": "tenant-123",
///         "entity_id": "550e8400-e29b-41d4-a716-446655440000",
///         "entity_type": "Article",
///     }),
/// );
/// assert!(report.is_valid);
/// ```
#[derive(Default)]
pub struct EventValidator {
    require_correlation_id: bool,
    allowed_sources: Option<HashSet<String>>,
    allowed_event_types: Option<HashSet<String>>,
    allowed_tenants: Option<HashSet<String>>,
    custom_rules: Vec<ValidationRule>,
}

impl EventValidator {
    /// Creates a validator with no policy restrictions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires `metadata.correlation_id` to be present and non-empty.
    #[must_use]
    pub fn require_correlation_id(mut self) -> Self {
        self.require_correlation_id = true;
        self
    }

    /// Restricts the accepted `source` values.
    #[must_use]
    pub fn allow_sources<I, S>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_sources = Some(sources.into_iter().map(Into::into).collect());
        self
    }

    /// Restricts the accepted `event_type` tags.
    #[must_use]
    pub fn allow_event_types<I, S>(mut self, event_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_event_types = Some(event_types.into_iter().map(Into::into).collect());
        self
    }

    /// Restricts the accepted `tenant_id` values.
    #[must_use]
    pub fn allow_tenants<I, S>(mut self, tenants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_tenants = Some(tenants.into_iter().map(Into::into).collect());
        self
    }

    /// Adds a custom validation rule.
    #[must_use]
    pub fn rule(mut self, rule: ValidationRule) -> Self {
        self.custom_rules.push(rule);
        self
    }

    /// Validates a raw payload against the registry and the policy rules.
    pub fn validate(&self, registry: &EventRegistry, payload: &Value) -> ValidationReport {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        let Some(event_type) = payload.get("event_type").and_then(Value::as_str) else {
            return ValidationReport {
                is_valid: false,
                event_type: None,
                errors: vec!["missing required field: event_type".to_string()],
                warnings,
            };
        };

        let registered = registry.contains(event_type);
        if !registered {
            warnings.push(format!(
                "event type '{event_type}' is not registered in the registry"
            ));
        }

        if let Some(allowed) = &self.allowed_event_types {
            if !allowed.contains(event_type) {
                errors.push(format!("event type '{event_type}' not in allowed types"));
            }
        }

        match payload.get("tenant_id").and_then(Value::as_str) {
            None | Some("") => errors.push("missing required field: tenant_id".to_string()),
            Some(tenant) => {
                if let Some(allowed) = &self.allowed_tenants {
                    if !allowed.contains(tenant) {
                        errors.push(format!("tenant '{tenant}' not in allowed tenants"));
                    }
                }
            }
        }

        if let Some(source) = payload.get("source").and_then(Value::as_str) {
            if let Some(allowed) = &self.allowed_sources {
                if !allowed.contains(source) {
                    errors.push(format!("source '{source}' not in allowed sources"));
                }
            }
        }

        if self.require_correlation_id {
            let correlation_id = payload
                .get("metadata")
                .and_then(|m| m.get("correlation_id"))
                .and_then(Value::as_str);
            if correlation_id.is_none_or(str::is_empty) {
                errors.push("missing required field: metadata.correlation_id".to_string());
            }
        }

        // Schema validation only once the payload passes the cheap checks,
        // mirroring the construction path the consumer will take.
        if registered && errors.is_empty() {
            if let Err(err) = registry.deserialize(payload) {
                errors.push(format!("schema validation error: {err}"));
            }
        }

        for rule in &self.custom_rules {
            errors.extend(rule(payload));
        }

        ValidationReport {
            is_valid: errors.is_empty(),
            event_type: Some(event_type.to_string()),
            errors,
            warnings,
        }
    }

    /// Validates an already-constructed event against the policy rules.
    pub fn validate_event(&self, event: &dyn Event) -> ValidationReport {
        let mut errors = Vec::new();
        let core = event.core();

        if let Some(allowed) = &self.allowed_event_types {
            if !allowed.contains(&core.event_type) {
                errors.push(format!(
                    "event type '{}' not in allowed types",
                    core.event_type
                ));
            }
        }

        if let Some(allowed) = &self.allowed_tenants {
            if !allowed.contains(core.tenant_id.as_str()) {
                errors.push(format!(
                    "tenant '{}' not in allowed tenants",
                    core.tenant_id
                ));
            }
        }

        if let Some(allowed) = &self.allowed_sources {
            if !allowed.contains(&core.source) {
                errors.push(format!("source '{}' not in allowed sources", core.source));
            }
        }

        if self.require_correlation_id
            && core
                .metadata
                .correlation_id
                .as_deref()
                .is_none_or(str::is_empty)
        {
            errors.push("missing required field: metadata.correlation_id".to_string());
        }

        ValidationReport {
            is_valid: errors.is_empty(),
            event_type: Some(core.event_type.clone()),
            errors,
            warnings: Vec::new(),
        }
    }
}

/// Builds a rule that checks a single top-level field when it is present.
pub fn field_rule(
    field: &str,
    predicate: impl Fn(&Value) -> bool + Send + Sync + 'static,
    message: &str,
) -> ValidationRule {
    let field = field.to_string();
    let message = message.to_string();
    Box::new(move |payload| match payload.get(&field) {
        Some(value) if !predicate(value) => vec![message.clone()],
        _ => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mkg_id::EntityId;
    use serde_json::json;

    fn valid_payload() -> Value {
        json!({
            "event_type": "entity.created",
            "source": "mkg-kernel",
            "tenant_id": "tenant-123",
            "entity_id": EntityId::new().to_string(),
            "entity_type": "Article",
        })
    }

    #[test]
    fn test_valid_payload_passes() {
        let registry = EventRegistry::with_builtin_events();
        let report = EventValidator::new().validate(&registry, &valid_payload());

        assert!(report.is_valid);
        assert_eq!(report.event_type.as_deref(), Some("entity.created"));
        assert!(report.errors.is_empty());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_missing_event_type_is_invalid() {
        let registry = EventRegistry::with_builtin_events();
        let report = EventValidator::new().validate(&registry, &json!({"tenant_id": "t1"}));

        assert!(!report.is_valid);
        assert!(report.event_type.is_none());
        assert_eq!(report.errors, vec!["missing required field: event_type"]);
    }

    #[test]
    fn test_missing_tenant_is_invalid() {
        let registry = EventRegistry::with_builtin_events();
        let mut payload = valid_payload();
        payload.as_object_mut().unwrap().remove("tenant_id");

        let report = EventValidator::new().validate(&registry, &payload);
        assert!(!report.is_valid);
        assert!(report
            .errors
            .iter()
            .any(|e| e.contains("tenant_id")));
    }

    #[test]
    fn test_unregistered_tag_is_a_warning() {
        let registry = EventRegistry::with_builtin_events();
        let payload = json!({
            "event_type": "audit.archived",
            "source": "mkg-kernel",
            "tenant_id": "tenant-123",
        });

        let report = EventValidator::new().validate(&registry, &payload);
        assert!(report.is_valid);
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_source_allow_list() {
        let registry = EventRegistry::with_builtin_events();
        let validator = EventValidator::new().allow_sources(["mkg-kernel"]);

        assert!(validator.validate(&registry, &valid_payload()).is_valid);

        let mut payload = valid_payload();
        payload["source"] = json!("rogue-service");
        let report = validator.validate(&registry, &payload);
        assert!(!report.is_valid);
        assert!(report.errors[0].contains("rogue-service"));
    }

    #[test]
    fn test_tenant_allow_list() {
        let registry = EventRegistry::with_builtin_events();
        let validator = EventValidator::new().allow_tenants(["tenant-123"]);

        assert!(validator.validate(&registry, &valid_payload()).is_valid);

        let mut payload = valid_payload();
        payload["tenant_id"] = json!("tenant-999");
        assert!(!validator.validate(&registry, &payload).is_valid);
    }

    #[test]
    fn test_require_correlation_id() {
        let registry = EventRegistry::with_builtin_events();
        let validator = EventValidator::new().require_correlation_id();

        let report = validator.validate(&registry, &valid_payload());
        assert!(!report.is_valid);

        let mut payload = valid_payload();
        payload["metadata"] = json!({"correlation_id": "corr-123"});
        assert!(validator.validate(&registry, &payload).is_valid);
    }

    #[test]
    fn test_schema_errors_surface_in_report() {
        let registry = EventRegistry::with_builtin_events();
        let mut payload = valid_payload();
        payload["entity_id"] = json!("not-a-uuid");

        let report = EventValidator::new().validate(&registry, &payload);
        assert!(!report.is_valid);
        assert!(report.errors[0].contains("schema validation error"));
    }

    #[test]
    fn test_custom_field_rule() {
        let registry = EventRegistry::with_builtin_events();
        let validator = EventValidator::new().rule(field_rule(
            "entity_type",
            |v| v.as_str() == Some("Article"),
            "entity_type must be 'Article'",
        ));

        assert!(validator.validate(&registry, &valid_payload()).is_valid);

        let mut payload = valid_payload();
        payload["entity_type"] = json!("Asset");
        let report = validator.validate(&registry, &payload);
        assert_eq!(report.errors, vec!["entity_type must be 'Article'"]);
    }

    #[test]
    fn test_validate_event_applies_policy() {
        let tenant = mkg_id::TenantId::new("tenant-123").unwrap();
        let event = crate::types::EntityCreated::new(
            tenant,
            EntityId::new(),
            "Article",
            serde_json::Map::new(),
        )
        .unwrap();

        let strict = EventValidator::new().allow_tenants(["tenant-999"]);
        let report = strict.validate_event(&event);
        assert!(!report.is_valid);

        let open = EventValidator::new();
        assert!(open.validate_event(&event).is_valid);
    }
}
