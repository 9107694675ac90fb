//! Pipeline stage traits.
//!
//! A stage is one opaque transformation step. It declares the static types it
//! consumes and produces and knows how to render itself into a single wire
//! document given the serializer of its input.
//!
//! Stage authors implement [`TypedStage`], naming input and output as
//! associated types. Every `TypedStage` is a [`Stage`], the object-safe form
//! pipelines store and validate.

use crate::error::RenderError;
use docpipe_core::{AnySerializer, Document, SerializerRegistry, TypeTag};
use std::sync::Arc;

/// Output of rendering one stage.
#[derive(Debug, Clone)]
pub struct RenderedStage {
    /// The stage's wire document, e.g. `{"$limit": 10}`
    pub document: Document,
    /// Serializer for the documents this stage emits
    pub output_serializer: AnySerializer,
}

impl RenderedStage {
    pub fn new(document: Document, output_serializer: AnySerializer) -> Self {
        Self {
            document,
            output_serializer,
        }
    }

    /// Single-operator document `{operator: value}`.
    pub fn operator(
        operator: &str,
        value: serde_json::Value,
        output_serializer: AnySerializer,
    ) -> Self {
        let mut document = Document::new();
        document.insert(operator.to_string(), value);
        Self::new(document, output_serializer)
    }
}

/// Type-erased stage, as stored in a pipeline.
pub trait Stage: Send + Sync {
    /// Operator or other short name for diagnostics
    fn name(&self) -> &str;

    /// Static type of the documents this stage consumes
    fn input_type(&self) -> TypeTag;

    /// Static type of the documents this stage produces
    fn output_type(&self) -> TypeTag;

    /// Render into one wire document.
    fn render(
        &self,
        input_serializer: &AnySerializer,
        registry: &dyn SerializerRegistry,
    ) -> Result<RenderedStage, RenderError>;
}

/// Stage with statically known input and output types.
pub trait TypedStage: Send + Sync + 'static {
    type Input: 'static;
    type Output: 'static;

    /// Operator name, e.g. `$match`
    fn operator(&self) -> &str;

    /// Render into one wire document.
    fn render_stage(
        &self,
        input_serializer: &AnySerializer,
        registry: &dyn SerializerRegistry,
    ) -> Result<RenderedStage, RenderError>;
}

impl<S: TypedStage> Stage for S {
    fn name(&self) -> &str {
        self.operator()
    }

    fn input_type(&self) -> TypeTag {
        TypeTag::of::<S::Input>()
    }

    fn output_type(&self) -> TypeTag {
        TypeTag::of::<S::Output>()
    }

    fn render(
        &self,
        input_serializer: &AnySerializer,
        registry: &dyn SerializerRegistry,
    ) -> Result<RenderedStage, RenderError> {
        self.render_stage(input_serializer, registry)
    }
}

/// A shared reference to a type-erased stage.
pub type SharedStage = Arc<dyn Stage>;

/// Share a stage for use in a pipeline.
pub fn shared<S: Stage + 'static>(stage: S) -> SharedStage {
    Arc::new(stage)
}
