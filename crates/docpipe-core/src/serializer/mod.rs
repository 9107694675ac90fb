//! Serializers between host values and wire values.
//!
//! [`Serializer<T>`] is the typed codec. Code that only knows a serializer
//! at runtime (the output of a pipeline stage, a document member) holds an
//! [`AnySerializer`], which erases `T` but remembers it as a [`TypeTag`] and
//! can be narrowed back with [`AnySerializer::downcast`].

mod array;
mod document;
mod serde_backed;

pub use array::ArraySerializer;
pub use document::{DocumentSerializer, DocumentSerializerBuilder};
pub use serde_backed::SerdeSerializer;

use crate::error::SerializationResult;
use crate::type_tag::TypeTag;
use serde_json::Value;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Codec between host values of type `T` and wire values.
///
/// Besides encoding and decoding, a serializer may describe the structure of
/// the values it handles:
/// - document-shaped values answer [`member`](Serializer::member) with the
///   wire element name and serializer of a host member
/// - array-shaped values answer [`item`](Serializer::item) with the item serializer
///
/// Scalar serializers keep the defaults (`None`), so nothing below a scalar
/// can be addressed as a wire field.
pub trait Serializer<T>: Send + Sync + 'static {
    /// Encode a host value.
    fn serialize(&self, value: &T) -> SerializationResult<Value>;

    /// Decode a wire value.
    fn deserialize(&self, value: &Value) -> SerializationResult<T>;

    /// Serialization info for a host member of a document-shaped value.
    fn member(&self, _member: &str) -> Option<MemberSerializationInfo> {
        None
    }

    /// Serializer for the items of an array-shaped value.
    fn item(&self) -> Option<AnySerializer> {
        None
    }

    /// Name for diagnostics
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Wire element name and serializer of one host member.
#[derive(Debug, Clone)]
pub struct MemberSerializationInfo {
    pub element_name: String,
    pub serializer: AnySerializer,
}

impl MemberSerializationInfo {
    pub fn new(element_name: impl Into<String>, serializer: AnySerializer) -> Self {
        Self {
            element_name: element_name.into(),
            serializer,
        }
    }
}

/// Object-safe view of a `Serializer<T>` with `T` erased.
trait ErasedSerializer: Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn serializer_name(&self) -> &'static str;
    fn member(&self, member: &str) -> Option<MemberSerializationInfo>;
    fn item(&self) -> Option<AnySerializer>;
}

struct Erased<T: 'static> {
    serializer: Arc<dyn Serializer<T>>,
}

impl<T: 'static> ErasedSerializer for Erased<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn serializer_name(&self) -> &'static str {
        self.serializer.name()
    }

    fn member(&self, member: &str) -> Option<MemberSerializationInfo> {
        self.serializer.member(member)
    }

    fn item(&self) -> Option<AnySerializer> {
        self.serializer.item()
    }
}

/// A shared, type-erased serializer.
///
/// Cloning is cheap (one `Arc`). The erased value type is kept as a
/// [`TypeTag`] so callers can check compatibility before narrowing.
#[derive(Clone)]
pub struct AnySerializer {
    value_type: TypeTag,
    inner: Arc<dyn ErasedSerializer>,
}

impl AnySerializer {
    /// Erase a serializer for `T`.
    pub fn new<T: 'static>(serializer: impl Serializer<T>) -> Self {
        Self::from_arc(Arc::new(serializer) as Arc<dyn Serializer<T>>)
    }

    /// Erase an already shared serializer for `T`.
    pub fn from_arc<T: 'static>(serializer: Arc<dyn Serializer<T>>) -> Self {
        Self {
            value_type: TypeTag::of::<T>(),
            inner: Arc::new(Erased { serializer }),
        }
    }

    /// The host type this serializer handles.
    pub fn value_type(&self) -> TypeTag {
        self.value_type
    }

    /// Name of the concrete serializer
    pub fn name(&self) -> &'static str {
        self.inner.serializer_name()
    }

    /// See [`Serializer::member`].
    pub fn member(&self, member: &str) -> Option<MemberSerializationInfo> {
        self.inner.member(member)
    }

    /// See [`Serializer::item`].
    pub fn item(&self) -> Option<AnySerializer> {
        self.inner.item()
    }

    /// Narrow back to a typed serializer. `None` when the value type is not `T`.
    pub fn downcast<T: 'static>(&self) -> Option<Arc<dyn Serializer<T>>> {
        self.inner
            .as_any()
            .downcast_ref::<Erased<T>>()
            .map(|erased| Arc::clone(&erased.serializer))
    }

    /// Whether this serializer produces values of type `T`.
    pub fn is_for<T: 'static>(&self) -> bool {
        self.value_type.is::<T>()
    }

    /// Whether both handles point at the same serializer instance.
    pub fn ptr_eq(&self, other: &AnySerializer) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for AnySerializer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnySerializer")
            .field("value_type", &self.value_type)
            .field("serializer", &self.name())
            .finish()
    }
}
