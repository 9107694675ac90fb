//! Shared fixtures for the integration tests

#![allow(dead_code)]

use docpipe_core::{
    AnySerializer, ArraySerializer, DocumentSerializer, SerdeSerializer, SerializationResult,
    Serializer,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub city: String,
    pub zip: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub name: String,
    pub age: i64,
    pub address: Address,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NameOnly {
    pub name: String,
}

/// Serializer for `String` that upper-cases on the wire, to tell it apart
/// from the serde default in assertions.
pub struct Shouting;

impl Serializer<String> for Shouting {
    fn serialize(&self, value: &String) -> SerializationResult<Value> {
        Ok(Value::String(value.to_uppercase()))
    }

    fn deserialize(&self, value: &Value) -> SerializationResult<String> {
        Ok(value.as_str().unwrap_or_default().to_lowercase())
    }

    fn name(&self) -> &'static str {
        "Shouting"
    }
}

pub fn address_serializer() -> AnySerializer {
    AnySerializer::new(
        DocumentSerializer::<Address>::builder()
            .map_member("City", "city", SerdeSerializer::<String>::new())
            .map_member("Zip", "zip", SerdeSerializer::<String>::new())
            .build(),
    )
}

/// Maps `Name`, `Age`, `Address` and `Tags` to their lower-case element names.
pub fn person_serializer() -> AnySerializer {
    AnySerializer::new(
        DocumentSerializer::<Person>::builder()
            .map_member("Name", "name", SerdeSerializer::<String>::new())
            .map_member("Age", "age", SerdeSerializer::<i64>::new())
            .map_member_with("Address", "address", address_serializer())
            .map_member(
                "Tags",
                "tags",
                ArraySerializer::new(SerdeSerializer::<String>::new()),
            )
            .build(),
    )
}

pub fn ada() -> Person {
    Person {
        name: "Ada".into(),
        age: 36,
        address: Address {
            city: "London".into(),
            zip: "W1".into(),
        },
        tags: vec!["math".into(), "engines".into()],
    }
}
