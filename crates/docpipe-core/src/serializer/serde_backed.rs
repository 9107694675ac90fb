//! Default serializer for any serde-compatible type

use super::Serializer;
use crate::error::SerializationResult;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;

/// Serializer that delegates to the type's serde implementation.
///
/// This is the serializer the default registry hands out for scalars and for
/// any type without a member map. It carries no structural information, so
/// fields below a value it encodes cannot be addressed.
pub struct SerdeSerializer<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> SerdeSerializer<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for SerdeSerializer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for SerdeSerializer<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for SerdeSerializer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerdeSerializer")
            .field("type", &std::any::type_name::<T>())
            .finish()
    }
}

impl<T> Serializer<T> for SerdeSerializer<T>
where
    T: Serialize + DeserializeOwned + 'static,
{
    fn serialize(&self, value: &T) -> SerializationResult<Value> {
        Ok(serde_json::to_value(value)?)
    }

    fn deserialize(&self, value: &Value) -> SerializationResult<T> {
        Ok(T::deserialize(value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SerializationError;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Point {
        x: i64,
        y: i64,
    }

    #[test]
    fn test_scalars() {
        let strings = SerdeSerializer::<String>::new();
        assert_eq!(strings.serialize(&"a".to_string()).unwrap(), json!("a"));
        assert_eq!(strings.deserialize(&json!("b")).unwrap(), "b");

        let ints = SerdeSerializer::<i64>::new();
        assert_eq!(ints.serialize(&42).unwrap(), json!(42));
        assert_eq!(ints.deserialize(&json!(-7)).unwrap(), -7);
    }

    #[test]
    fn test_struct() {
        let points = SerdeSerializer::<Point>::new();
        let value = points.serialize(&Point { x: 1, y: 2 }).unwrap();

        assert_eq!(value, json!({ "x": 1, "y": 2 }));
        assert_eq!(points.deserialize(&value).unwrap(), Point { x: 1, y: 2 });
    }

    #[test]
    fn test_wrong_shape_is_json_error() {
        let ints = SerdeSerializer::<i64>::new();
        let err = ints.deserialize(&json!("not a number")).unwrap_err();

        assert!(matches!(err, SerializationError::Json(_)));
    }
}
