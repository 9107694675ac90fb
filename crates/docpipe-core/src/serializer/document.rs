//! Member-mapped serializer for document-shaped host types.
//!
//! Encoding and decoding go through serde; the member map records how each
//! host member appears on the wire so that typed field references can be
//! turned into element names.

use super::{AnySerializer, MemberSerializationInfo, Serializer};
use crate::error::{LookupError, SerializationError, SerializationResult};
use crate::registry::{SerializerRegistry, SerializerRegistryExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;

#[derive(Debug, Clone)]
struct MemberMap {
    member_name: String,
    info: MemberSerializationInfo,
}

/// Serializer for a document type `T` with a known member map.
///
/// # Example
///
/// ```rust
/// use docpipe_core::{AnySerializer, DocumentSerializer, SerdeSerializer};
/// # #[derive(serde::Serialize, serde::Deserialize)]
/// # struct Person { name: String, age: i64 }
///
/// let people = DocumentSerializer::<Person>::builder()
///     .map_member("Name", "name", SerdeSerializer::<String>::new())
///     .map_member("Age", "age", SerdeSerializer::<i64>::new())
///     .build();
///
/// let serializer = AnySerializer::new(people);
/// assert_eq!(serializer.member("Name").unwrap().element_name, "name");
/// ```
pub struct DocumentSerializer<T> {
    members: Vec<MemberMap>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> DocumentSerializer<T> {
    pub fn builder() -> DocumentSerializerBuilder<T> {
        DocumentSerializerBuilder::new()
    }

    /// Host member names in mapping order
    pub fn member_names(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(|m| m.member_name.as_str())
    }
}

impl<T> Clone for DocumentSerializer<T> {
    fn clone(&self) -> Self {
        Self {
            members: self.members.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for DocumentSerializer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentSerializer")
            .field("type", &std::any::type_name::<T>())
            .field("members", &self.members)
            .finish()
    }
}

impl<T> Serializer<T> for DocumentSerializer<T>
where
    T: Serialize + DeserializeOwned + 'static,
{
    fn serialize(&self, value: &T) -> SerializationResult<Value> {
        let encoded = serde_json::to_value(value)?;
        if !encoded.is_object() {
            return Err(SerializationError::unexpected_shape("object", &encoded));
        }
        Ok(encoded)
    }

    fn deserialize(&self, value: &Value) -> SerializationResult<T> {
        if !value.is_object() {
            return Err(SerializationError::unexpected_shape("object", value));
        }
        Ok(T::deserialize(value)?)
    }

    fn member(&self, member: &str) -> Option<MemberSerializationInfo> {
        self.members
            .iter()
            .find(|m| m.member_name == member)
            .map(|m| m.info.clone())
    }
}

/// Builder for [`DocumentSerializer`].
pub struct DocumentSerializerBuilder<T> {
    members: Vec<MemberMap>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Default for DocumentSerializerBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> DocumentSerializerBuilder<T> {
    pub fn new() -> Self {
        Self {
            members: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Map a host member to a wire element with an explicit serializer.
    pub fn map_member<F: 'static>(
        self,
        member: impl Into<String>,
        element_name: impl Into<String>,
        serializer: impl Serializer<F>,
    ) -> Self {
        self.map_member_with(member, element_name, AnySerializer::new(serializer))
    }

    /// Map a host member to a wire element with an already erased serializer.
    ///
    /// Mapping the same member twice replaces the earlier mapping.
    pub fn map_member_with(
        mut self,
        member: impl Into<String>,
        element_name: impl Into<String>,
        serializer: AnySerializer,
    ) -> Self {
        let member_name = member.into();
        let info = MemberSerializationInfo::new(element_name, serializer);
        match self.members.iter_mut().find(|m| m.member_name == member_name) {
            Some(existing) => existing.info = info,
            None => self.members.push(MemberMap { member_name, info }),
        }
        self
    }

    /// Map a host member using the registry's default serializer for `F`.
    pub fn map_member_default<F: 'static>(
        self,
        member: impl Into<String>,
        element_name: impl Into<String>,
        registry: &dyn SerializerRegistry,
    ) -> Result<Self, LookupError> {
        let serializer = registry.get_serializer::<F>()?;
        Ok(self.map_member_with(member, element_name, AnySerializer::from_arc(serializer)))
    }

    pub fn build(self) -> DocumentSerializer<T> {
        DocumentSerializer {
            members: self.members,
            _marker: PhantomData,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::TypeRegistry;
    use crate::serializer::SerdeSerializer;
    use crate::type_tag::TypeTag;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Person {
        name: String,
        age: i64,
    }

    fn people() -> DocumentSerializer<Person> {
        DocumentSerializer::builder()
            .map_member("Name", "name", SerdeSerializer::<String>::new())
            .map_member("Age", "age", SerdeSerializer::<i64>::new())
            .build()
    }

    #[test]
    fn test_member_lookup() {
        let serializer = people();

        let name = serializer.member("Name").unwrap();
        assert_eq!(name.element_name, "name");
        assert_eq!(name.serializer.value_type(), TypeTag::of::<String>());

        let age = serializer.member("Age").unwrap();
        assert_eq!(age.element_name, "age");
        assert!(age.serializer.is_for::<i64>());

        assert!(serializer.member("Email").is_none());
    }

    #[test]
    fn test_member_names_keep_mapping_order() {
        let names: Vec<_> = people().member_names().map(str::to_string).collect();
        assert_eq!(names, vec!["Name", "Age"]);
    }

    #[test]
    fn test_remapping_replaces() {
        let serializer = DocumentSerializer::<Person>::builder()
            .map_member("Name", "name", SerdeSerializer::<String>::new())
            .map_member("Name", "full_name", SerdeSerializer::<String>::new())
            .build();

        assert_eq!(serializer.member_names().count(), 1);
        assert_eq!(serializer.member("Name").unwrap().element_name, "full_name");
    }

    #[test]
    fn test_map_member_default_uses_registry() {
        let registry = TypeRegistry::with_defaults();
        let serializer = DocumentSerializer::<Person>::builder()
            .map_member_default::<String>("Name", "name", &registry)
            .unwrap()
            .build();

        assert!(serializer.member("Name").unwrap().serializer.is_for::<String>());
    }

    #[test]
    fn test_map_member_default_unregistered_type() {
        let registry = TypeRegistry::new();
        let result = DocumentSerializer::<Person>::builder()
            .map_member_default::<Person>("Spouse", "spouse", &registry);

        assert!(matches!(
            result.map(|_| ()),
            Err(LookupError::NotRegistered { .. })
        ));
    }

    #[test]
    fn test_round_trip_through_serde() {
        let serializer = people();
        let person = Person {
            name: "Ada".into(),
            age: 36,
        };

        let value = serializer.serialize(&person).unwrap();
        assert_eq!(value, json!({ "name": "Ada", "age": 36 }));
        assert_eq!(serializer.deserialize(&value).unwrap(), person);
    }

    #[test]
    fn test_rejects_non_object() {
        let err = people().deserialize(&json!([1, 2])).unwrap_err();
        assert!(matches!(
            err,
            SerializationError::UnexpectedShape { expected: "object", .. }
        ));
    }
}
