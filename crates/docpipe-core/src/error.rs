//! Error types for serializers and registry lookups

use crate::type_tag::TypeTag;
use thiserror::Error;

/// Errors raised while converting between host values and wire values
#[derive(Error, Debug)]
pub enum SerializationError {
    /// serde_json failed to convert the value
    #[error("JSON conversion error: {0}")]
    Json(#[from] serde_json::Error),

    /// The wire value does not have the shape the serializer expects
    #[error("expected {expected} wire value, found {found}")]
    UnexpectedShape {
        expected: &'static str,
        found: String,
    },

    /// An array item failed to convert
    #[error("array item {index}: {source}")]
    Item {
        index: usize,
        #[source]
        source: Box<SerializationError>,
    },
}

/// Result type for serializer operations
pub type SerializationResult<T> = Result<T, SerializationError>;

impl SerializationError {
    pub(crate) fn unexpected_shape(expected: &'static str, found: &serde_json::Value) -> Self {
        let found = match found {
            serde_json::Value::Null => "null",
            serde_json::Value::Bool(_) => "boolean",
            serde_json::Value::Number(_) => "number",
            serde_json::Value::String(_) => "string",
            serde_json::Value::Array(_) => "array",
            serde_json::Value::Object(_) => "object",
        };
        Self::UnexpectedShape {
            expected,
            found: found.to_string(),
        }
    }
}

/// Registry lookup failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// No serializer is registered for the requested type
    #[error("no serializer registered for type {value_type}")]
    NotRegistered { value_type: TypeTag },
}
