use super::stage_error;
use crate::error::RenderError;
use crate::expr::TypedExpr;
use crate::field::FieldName;
use crate::stage::{RenderedStage, TypedStage};
use docpipe_core::{AnySerializer, Document, Serializer, SerializerRegistry, SerializerRegistryExt};
use serde_json::Value;
use std::sync::Arc;

/// `{"$project": {field: 1, ...}}` reshaping `I` documents into `O`.
///
/// Only inclusion projections are rendered. `_id` is kept unless
/// [`exclude_id`](Self::exclude_id) is set. The output serializer is the
/// one given with [`with_output_serializer`](Self::with_output_serializer),
/// or the registry default for `O`.
pub struct ProjectStage<I, O> {
    fields: Vec<FieldName<I>>,
    exclude_id: bool,
    output_serializer: Option<Arc<dyn Serializer<O>>>,
}

impl<I: 'static, O: 'static> ProjectStage<I, O> {
    pub fn new() -> Self {
        Self {
            fields: Vec::new(),
            exclude_id: false,
            output_serializer: None,
        }
    }

    pub fn include(mut self, field: impl Into<FieldName<I>>) -> Self {
        self.fields.push(field.into());
        self
    }

    pub fn include_by<F: 'static>(self, build: impl FnOnce(TypedExpr<I>) -> TypedExpr<F>) -> Self {
        self.include(FieldName::expression(build))
    }

    /// Render `_id: 0` after the included fields.
    pub fn exclude_id(mut self) -> Self {
        self.exclude_id = true;
        self
    }

    pub fn with_output_serializer(mut self, serializer: impl Serializer<O>) -> Self {
        self.output_serializer = Some(Arc::new(serializer) as Arc<dyn Serializer<O>>);
        self
    }
}

impl<I: 'static, O: 'static> Default for ProjectStage<I, O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: 'static, O: 'static> TypedStage for ProjectStage<I, O> {
    type Input = I;
    type Output = O;

    fn operator(&self) -> &str {
        "$project"
    }

    fn render_stage(
        &self,
        input_serializer: &AnySerializer,
        registry: &dyn SerializerRegistry,
    ) -> Result<RenderedStage, RenderError> {
        if self.fields.is_empty() {
            return Err(stage_error("$project", "no fields to include"));
        }

        let mut projection = Document::new();
        for field in &self.fields {
            let rendered = field.render(input_serializer, registry)?;
            projection.insert(rendered.into_field_name(), Value::from(1));
        }
        if self.exclude_id {
            projection.insert("_id".to_string(), Value::from(0));
        }

        let output_serializer = match &self.output_serializer {
            Some(serializer) => AnySerializer::from_arc(Arc::clone(serializer)),
            None => AnySerializer::from_arc(registry.get_serializer::<O>()?),
        };

        Ok(RenderedStage::operator(
            "$project",
            Value::Object(projection),
            output_serializer,
        ))
    }
}
