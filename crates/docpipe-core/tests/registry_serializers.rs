//! Integration tests for the registry and the structural serializers
//!
//! These exercise the public API the query layer relies on: registering
//! member-mapped serializers, looking them up by type, walking members and
//! items, and narrowing erased serializers back to typed ones.

use docpipe_core::{
    AnySerializer, ArraySerializer, DocumentSerializer, LookupError, SerdeSerializer,
    SerializationError, Serializer, SerializerRegistry, SerializerRegistryExt, TypeRegistry,
    TypeRegistryBuilder, TypeTag,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Line {
    sku: String,
    qty: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Order {
    id: i64,
    lines: Vec<Line>,
}

fn registry() -> TypeRegistry {
    let defaults = TypeRegistry::with_defaults();

    let lines = DocumentSerializer::<Line>::builder()
        .map_member_default::<String>("Sku", "sku", &defaults)
        .and_then(|b| b.map_member_default::<i32>("Qty", "qty", &defaults))
        .unwrap()
        .build();
    let lines = AnySerializer::new(lines);

    let orders = DocumentSerializer::<Order>::builder()
        .map_member_default::<i64>("Id", "_id", &defaults)
        .unwrap()
        .map_member(
            "Lines",
            "lines",
            ArraySerializer::from_arc(lines.downcast::<Line>().unwrap()),
        )
        .build();

    TypeRegistryBuilder::new()
        .with_defaults()
        .with_any(lines)
        .with_serializer(orders)
        .build()
}

#[test]
fn test_walk_members_and_items() {
    let registry = registry();
    let orders = registry.lookup(&TypeTag::of::<Order>()).unwrap();

    let lines = orders.member("Lines").unwrap();
    assert_eq!(lines.element_name, "lines");
    assert!(lines.serializer.is_for::<Vec<Line>>());

    let line = lines.serializer.item().unwrap();
    assert!(line.is_for::<Line>());

    let qty = line.member("Qty").unwrap();
    assert_eq!(qty.element_name, "qty");
    assert!(qty.serializer.is_for::<i32>());
    assert!(qty.serializer.member("anything").is_none());
    assert!(qty.serializer.item().is_none());
}

#[test]
fn test_typed_lookup_round_trip() {
    let registry = registry();
    let orders = registry.get_serializer::<Order>().unwrap();
    let order = Order {
        id: 7,
        lines: vec![Line {
            sku: "A-1".into(),
            qty: 2,
        }],
    };

    let wire = orders.serialize(&order).unwrap();
    assert_eq!(wire, json!({ "id": 7, "lines": [{ "sku": "A-1", "qty": 2 }] }));
    assert_eq!(orders.deserialize(&wire).unwrap(), order);
}

#[test]
fn test_erased_serializer_narrows_only_to_its_type() {
    let registry = registry();
    let lines = registry.lookup(&TypeTag::of::<Line>()).unwrap();

    assert!(lines.downcast::<Line>().is_some());
    assert!(lines.downcast::<Order>().is_none());
    assert_eq!(lines.value_type(), TypeTag::of::<Line>());
    assert_eq!(lines.value_type().to_string(), "Line");
}

#[test]
fn test_lookup_through_shared_trait_object() {
    let registry: std::sync::Arc<dyn SerializerRegistry> = std::sync::Arc::new(registry());

    assert!(registry.get_serializer::<String>().is_ok());
    assert_eq!(
        registry.get_serializer::<u8>().err(),
        Some(LookupError::NotRegistered {
            value_type: TypeTag::of::<u8>()
        })
    );
}

#[test]
fn test_document_serializer_rejects_scalars() {
    let registry = registry();
    let orders = registry.get_serializer::<Order>().unwrap();

    let err = orders.deserialize(&json!(42)).unwrap_err();
    assert!(matches!(
        err,
        SerializationError::UnexpectedShape { expected: "object", ref found } if found == "number"
    ));
}

#[test]
fn test_array_serializer_debug_names_item() {
    let lines = ArraySerializer::new(SerdeSerializer::<Line>::new());
    let debug = format!("{:?}", lines);

    assert!(debug.starts_with("ArraySerializer"));
    assert!(debug.contains("SerdeSerializer"));
}

#[test]
fn test_plain_serde_serializer_has_no_structure() {
    let plain = AnySerializer::new(SerdeSerializer::<Order>::new());

    assert!(plain.member("Lines").is_none());
    assert!(plain.item().is_none());
}
