//! docpipe-core: wire documents, type tags and serializers.
//!
//! This crate holds the pieces the query layer consumes but does not own:
//!
//! - [`Document`] -- the wire-level document (an ordered JSON object)
//! - [`TypeTag`] -- nominal identity of a static host type
//! - [`Serializer`] / [`AnySerializer`] -- typed and type-erased codecs between
//!   host values and wire values
//! - [`SerializerRegistry`] / [`TypeRegistry`] -- default serializer lookup by type
//!
//! Serializers are looked up and shared, never owned by the code that renders
//! queries. Everything here is `Send + Sync` so rendering can run on any thread.

pub mod error;
pub mod registry;
pub mod serializer;
pub mod type_tag;

/// A wire-level document: an insertion-ordered JSON object.
pub type Document = serde_json::Map<String, serde_json::Value>;

// ── Convenience re-exports ───────────────────────────────────────────

pub use error::{LookupError, SerializationError, SerializationResult};
pub use registry::{SerializerRegistry, SerializerRegistryExt, TypeRegistry, TypeRegistryBuilder};
pub use serializer::{
    AnySerializer, ArraySerializer, DocumentSerializer, DocumentSerializerBuilder,
    MemberSerializationInfo, SerdeSerializer, Serializer,
};
pub use type_tag::TypeTag;
