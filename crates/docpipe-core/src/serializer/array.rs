//! Serializer for homogeneous arrays

use super::{AnySerializer, Serializer};
use crate::error::{SerializationError, SerializationResult};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Serializer for `Vec<T>` that encodes each item with an item serializer.
///
/// Exposes the item serializer through [`Serializer::item`], which is what
/// lets an indexed field reference (`doc.tags[0]`) resolve to `"tags.0"`.
pub struct ArraySerializer<T> {
    item: Arc<dyn Serializer<T>>,
}

impl<T: 'static> ArraySerializer<T> {
    pub fn new(item: impl Serializer<T>) -> Self {
        Self {
            item: Arc::new(item),
        }
    }

    pub fn from_arc(item: Arc<dyn Serializer<T>>) -> Self {
        Self { item }
    }
}

impl<T> Clone for ArraySerializer<T> {
    fn clone(&self) -> Self {
        Self {
            item: Arc::clone(&self.item),
        }
    }
}

impl<T: 'static> fmt::Debug for ArraySerializer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArraySerializer")
            .field("item", &self.item.name())
            .finish()
    }
}

impl<T: 'static> Serializer<Vec<T>> for ArraySerializer<T> {
    fn serialize(&self, value: &Vec<T>) -> SerializationResult<Value> {
        value
            .iter()
            .enumerate()
            .map(|(index, item)| {
                self.item
                    .serialize(item)
                    .map_err(|source| SerializationError::Item {
                        index,
                        source: Box::new(source),
                    })
            })
            .collect::<SerializationResult<Vec<_>>>()
            .map(Value::Array)
    }

    fn deserialize(&self, value: &Value) -> SerializationResult<Vec<T>> {
        let Value::Array(items) = value else {
            return Err(SerializationError::unexpected_shape("array", value));
        };
        items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                self.item
                    .deserialize(item)
                    .map_err(|source| SerializationError::Item {
                        index,
                        source: Box::new(source),
                    })
            })
            .collect()
    }

    fn item(&self) -> Option<AnySerializer> {
        Some(AnySerializer::from_arc(Arc::clone(&self.item)))
    }
}
