//! End-to-end tests for the wire contract: EventBridge entry conversion,
//! registry-driven reconstruction, and the round-trip property.

use mkg_events::{
    register_event, EntityCreated, EntityDeleted, EntityUpdated, Event, EventCore, EventError,
    EventMetadata, EventRegistry, SchemaCreated, SchemaUpdated,
};
use mkg_id::{EntityId, SchemaId, TenantId};
use proptest::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

fn tenant(id: &str) -> TenantId {
    TenantId::new(id).unwrap()
}

fn attributes() -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("name".to_string(), json!("Widget"));
    map.insert("sku".to_string(), json!("WDG-001"));
    map
}

/// Serializes an event to an EventBridge entry, parses the detail body, and
/// reconstructs it through the registry.
fn roundtrip(registry: &EventRegistry, event: &dyn Event) -> Box<dyn Event> {
    let entry = event.to_eventbridge_entry("mkg-events").unwrap();
    let detail = entry.parse_detail().unwrap();
    registry.deserialize(&detail).unwrap()
}

#[test]
fn entity_created_roundtrips() {
    let registry = EventRegistry::with_builtin_events();
    let event = EntityCreated::new(tenant("tenant-123"), EntityId::new(), "Article", attributes())
        .unwrap()
        .with_metadata(
            EventMetadata::new()
                .with_correlation_id("corr-789")
                .with_user_id("user-42"),
        );

    let decoded = roundtrip(&registry, &event);
    let decoded = decoded.as_any().downcast_ref::<EntityCreated>().unwrap();
    assert_eq!(decoded, &event);
}

#[test]
fn entity_updated_roundtrips() {
    let registry = EventRegistry::with_builtin_events();
    let mut previous = Map::new();
    previous.insert("price".to_string(), json!(10.0));
    let mut new_values = Map::new();
    new_values.insert("price".to_string(), json!(15.0));

    let event = EntityUpdated::new(
        tenant("tenant-123"),
        EntityId::new(),
        "Article",
        vec!["price".to_string()],
        previous,
        new_values,
    )
    .unwrap();

    let decoded = roundtrip(&registry, &event);
    let decoded = decoded.as_any().downcast_ref::<EntityUpdated>().unwrap();
    assert_eq!(decoded, &event);
}

#[test]
fn entity_deleted_roundtrips() {
    let registry = EventRegistry::with_builtin_events();
    let event = EntityDeleted::new(tenant("tenant-123"), EntityId::new(), "Article", false).unwrap();

    let decoded = roundtrip(&registry, &event);
    let decoded = decoded.as_any().downcast_ref::<EntityDeleted>().unwrap();
    assert_eq!(decoded, &event);
}

#[test]
fn schema_created_roundtrips() {
    let registry = EventRegistry::with_builtin_events();
    let mut attribute = Map::new();
    attribute.insert("name".to_string(), json!("sku"));
    attribute.insert("type".to_string(), json!("string"));
    attribute.insert("required".to_string(), json!(true));

    let event =
        SchemaCreated::new(tenant("tenant-123"), SchemaId::new(), "Article", vec![attribute])
            .unwrap();

    let decoded = roundtrip(&registry, &event);
    let decoded = decoded.as_any().downcast_ref::<SchemaCreated>().unwrap();
    assert_eq!(decoded, &event);
}

#[test]
fn schema_updated_roundtrips() {
    let registry = EventRegistry::with_builtin_events();
    let mut modified = Map::new();
    modified.insert("name".to_string(), json!("price"));
    modified.insert("type".to_string(), json!("decimal"));

    let event = SchemaUpdated::new(
        tenant("tenant-123"),
        SchemaId::new(),
        "Article",
        vec![],
        vec!["obsolete".to_string()],
        vec![modified],
    )
    .unwrap();

    let decoded = roundtrip(&registry, &event);
    let decoded = decoded.as_any().downcast_ref::<SchemaUpdated>().unwrap();
    assert_eq!(decoded, &event);
}

#[test]
fn entry_shape_matches_the_bus_contract() {
    let entity_id = EntityId::parse("550e8400-e29b-41d4-a716-446655440000").unwrap();
    let event = EntityCreated::new(tenant("t1"), entity_id, "Article", Map::new()).unwrap();

    let entry = event.to_eventbridge_entry("mkg-events").unwrap();
    assert_eq!(entry.detail_type, "entity.created");
    assert_eq!(entry.event_bus_name, "mkg-events");
    assert_eq!(entry.source, "mkg-kernel");

    let detail = entry.parse_detail().unwrap();
    assert_eq!(detail["tenant_id"], "t1");
    assert_eq!(detail["entity_id"], "550e8400-e29b-41d4-a716-446655440000");

    let wire = serde_json::to_value(&entry).unwrap();
    assert!(wire.get("DetailType").is_some());
    assert!(wire.get("EventBusName").is_some());
}

// An externally defined event kind, registered without touching the crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct WorkflowTransitioned {
    #[serde(flatten)]
    core: EventCore,
    entity_id: String,
    from_status: String,
    to_status: String,
}

impl WorkflowTransitioned {
    const EVENT_TYPE: &'static str = "workflow.transitioned";
}

impl Event for WorkflowTransitioned {
    fn core(&self) -> &EventCore {
        &self.core
    }

    fn validate(&self) -> Result<(), EventError> {
        if self.core.event_type != Self::EVENT_TYPE {
            return Err(EventError::Validation(format!(
                "event_type '{}' does not match the fixed tag '{}'",
                self.core.event_type,
                Self::EVENT_TYPE
            )));
        }
        self.core.validate_fields()
    }

    fn to_json(&self) -> Result<Value, EventError> {
        Ok(serde_json::to_value(self)?)
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

#[test]
fn externally_registered_kind_deserializes_to_its_own_type() {
    register_event::<WorkflowTransitioned>(WorkflowTransitioned::EVENT_TYPE).unwrap();

    let payload = json!({
        "event_type": "workflow.transitioned",
        "tenant_id": "t1",
        "entity_id": "e1",
        "from_status": "draft",
        "to_status": "published",
    });

    let event = mkg_events::deserialize_event(&payload).unwrap();
    let transitioned = event
        .as_any()
        .downcast_ref::<WorkflowTransitioned>()
        .unwrap();

    assert_eq!(transitioned.entity_id, "e1");
    assert_eq!(transitioned.from_status, "draft");
    assert_eq!(transitioned.to_status, "published");

    // and it round-trips through the bus entry like a builtin kind
    let decoded = mkg_events::deserialize_event(
        &event
            .to_eventbridge_entry("mkg-events")
            .unwrap()
            .parse_detail()
            .unwrap(),
    )
    .unwrap();
    assert_eq!(
        decoded.as_any().downcast_ref::<WorkflowTransitioned>(),
        Some(transitioned)
    );
}

fn attributes_strategy() -> impl Strategy<Value = Map<String, Value>> {
    proptest::collection::btree_map("[a-z]{1,8}", "[A-Za-z0-9 -]{0,12}", 0..4)
        .prop_map(|entries| {
            entries
                .into_iter()
                .map(|(k, v)| (k, Value::String(v)))
                .collect()
        })
}

proptest! {
    #[test]
    fn any_valid_entity_created_roundtrips(
        tenant_id in "[a-z][a-z0-9-]{0,19}",
        entity_type in "[A-Z][A-Za-z0-9]{0,11}",
        attributes in attributes_strategy(),
        correlation_id in proptest::option::of("[a-z0-9-]{1,16}"),
    ) {
        let registry = EventRegistry::with_builtin_events();

        let mut metadata = EventMetadata::new();
        if let Some(correlation_id) = correlation_id {
            metadata = metadata.with_correlation_id(correlation_id);
        }

        let event = EntityCreated::new(
            tenant(&tenant_id),
            EntityId::new(),
            entity_type,
            attributes,
        )
        .unwrap()
        .with_metadata(metadata);

        let decoded = roundtrip(&registry, &event);
        let decoded = decoded.as_any().downcast_ref::<EntityCreated>().unwrap();
        prop_assert_eq!(decoded, &event);
    }

    #[test]
    fn any_non_empty_tenant_is_accepted(tenant_id in "[!-~]{1,32}") {
        let event = EntityCreated::new(
            tenant(&tenant_id),
            EntityId::new(),
            "Article",
            Map::new(),
        );
        prop_assert!(event.is_ok());
    }
}
