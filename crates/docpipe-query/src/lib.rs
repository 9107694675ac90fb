//! Typed aggregation pipelines and field name resolution for docpipe
//!
//! This crate turns typed, caller-built query descriptions into the wire
//! documents a document database understands.
//!
//! ## Architecture
//!
//! - **Stages** ([`Stage`], [`TypedStage`]): one transformation step each,
//!   with declared input and output types
//! - **Pipelines** ([`Pipeline`]): a stage chain validated once at
//!   construction, so a `Pipeline<I, O>` always takes `I` to `O`
//! - **Rendering** ([`PipelineRenderer`]): threads serializers through the
//!   stages and emits one document per stage plus the output serializer
//! - **Field references** ([`FieldName`], [`TypedFieldName`]): a literal
//!   element name or a selector such as `doc => doc.Name`, resolved to the
//!   element name (`"name"`) through the document serializer's member map
//!
//! Serializers and the registry come from `docpipe-core`. Nothing here keeps
//! global state; the registry is always passed in.
//!
//! ## Usage
//!
//! ```rust
//! use docpipe_core::{AnySerializer, DocumentSerializer, SerdeSerializer, TypeRegistry};
//! use docpipe_query::stages::{LimitStage, MatchStage, SortStage};
//! use docpipe_query::{shared, Pipeline, Selector};
//! # #[derive(serde::Serialize, serde::Deserialize)]
//! # struct Person { name: String, age: i64 }
//!
//! let people = AnySerializer::new(
//!     DocumentSerializer::<Person>::builder()
//!         .map_member("Name", "name", SerdeSerializer::<String>::new())
//!         .map_member("Age", "age", SerdeSerializer::<i64>::new())
//!         .build(),
//! );
//!
//! let pipeline = Pipeline::<Person, Person>::new(vec![
//!     shared(MatchStage::new().gte(Selector::<Person, i64>::new(|d| d.member("Age")), 18)),
//!     shared(SortStage::<Person>::new().ascending_by(|d| d.member::<String>("Name"))),
//!     shared(LimitStage::<Person>::new(10)),
//! ])?;
//!
//! let rendered = pipeline.render(&people, &TypeRegistry::with_defaults())?;
//! assert_eq!(
//!     rendered.to_string(),
//!     r#"[{"$match":{"age":{"$gte":18}}},{"$sort":{"name":1}},{"$limit":10}]"#
//! );
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod bind;
pub mod config;
pub mod error;
pub mod expr;
pub mod field;
pub mod pipeline;
pub mod render;
pub mod stage;
pub mod stages;

// Re-exports
pub use bind::{ExpressionBinder, SerializationBinder};
pub use config::RenderConfig;
pub use error::{ConfigError, PipelineError, RenderError, RenderResult, ResolutionError};
pub use expr::{Expr, Selector, TypedExpr, UntypedSelector};
pub use field::{FieldName, RenderedFieldName, TypedFieldName, TypedRenderedFieldName};
pub use pipeline::Pipeline;
pub use render::{OutputSerializerStrategy, PipelineRenderer, RenderedPipeline};
pub use stage::{shared, RenderedStage, SharedStage, Stage, TypedStage};
