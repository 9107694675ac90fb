//! Serializer registry.
//!
//! The registry maps a static host type to its default serializer. It is
//! passed explicitly to everything that needs a lookup; there is no global
//! instance.

use crate::error::LookupError;
use crate::serializer::{AnySerializer, SerdeSerializer, Serializer};
use crate::type_tag::TypeTag;
use crate::Document;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Lookup of default serializers by host type.
pub trait SerializerRegistry: Send + Sync {
    /// The default serializer for `value_type`, if one is registered.
    fn lookup(&self, value_type: &TypeTag) -> Option<AnySerializer>;
}

/// Typed lookups on any registry.
pub trait SerializerRegistryExt {
    /// The default serializer for `T`.
    fn get_serializer<T: 'static>(&self) -> Result<Arc<dyn Serializer<T>>, LookupError>;
}

impl<R: SerializerRegistry + ?Sized> SerializerRegistryExt for R {
    fn get_serializer<T: 'static>(&self) -> Result<Arc<dyn Serializer<T>>, LookupError> {
        let value_type = TypeTag::of::<T>();
        self.lookup(&value_type)
            .and_then(|serializer| serializer.downcast::<T>())
            .ok_or(LookupError::NotRegistered { value_type })
    }
}

/// Registry backed by a map from [`TypeTag`] to serializer.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    serializers: HashMap<TypeTag, AnySerializer>,
}

impl TypeRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with serde serializers for the common scalar and document types
    pub fn with_defaults() -> Self {
        TypeRegistryBuilder::new().with_defaults().build()
    }

    /// Register a serializer under its value type (replaces any previous one)
    pub fn register(&mut self, serializer: AnySerializer) {
        let value_type = serializer.value_type();
        if let Some(previous) = self.serializers.insert(value_type, serializer) {
            debug!(
                value_type = %value_type,
                previous = previous.name(),
                "replaced registered serializer"
            );
        }
    }

    /// Register a typed serializer for `T`
    pub fn register_serializer<T: 'static>(&mut self, serializer: impl Serializer<T>) {
        self.register(AnySerializer::new(serializer));
    }

    /// Whether a serializer is registered for `T`
    pub fn contains<T: 'static>(&self) -> bool {
        self.serializers.contains_key(&TypeTag::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.serializers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.serializers.is_empty()
    }
}

impl SerializerRegistry for TypeRegistry {
    fn lookup(&self, value_type: &TypeTag) -> Option<AnySerializer> {
        self.serializers.get(value_type).cloned()
    }
}

/// Builder for ergonomic registry construction
#[derive(Default)]
pub struct TypeRegistryBuilder {
    serializers: Vec<AnySerializer>,
}

impl TypeRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add serde serializers for `String`, `bool`, `i32`, `i64`, `f64`,
    /// [`Document`] and [`Value`].
    pub fn with_defaults(self) -> Self {
        self.with_serializer(SerdeSerializer::<String>::new())
            .with_serializer(SerdeSerializer::<bool>::new())
            .with_serializer(SerdeSerializer::<i32>::new())
            .with_serializer(SerdeSerializer::<i64>::new())
            .with_serializer(SerdeSerializer::<f64>::new())
            .with_serializer(SerdeSerializer::<Document>::new())
            .with_serializer(SerdeSerializer::<Value>::new())
    }

    /// Add a serializer (later additions win for the same type)
    pub fn with_serializer<T: 'static>(mut self, serializer: impl Serializer<T>) -> Self {
        self.serializers.push(AnySerializer::new(serializer));
        self
    }

    /// Add an already erased serializer
    pub fn with_any(mut self, serializer: AnySerializer) -> Self {
        self.serializers.push(serializer);
        self
    }

    /// Build the registry
    pub fn build(self) -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        for serializer in self.serializers {
            registry.register(serializer);
        }
        registry
    }
}
