use super::stage_error;
use crate::error::RenderError;
use crate::stage::{RenderedStage, TypedStage};
use docpipe_core::{AnySerializer, Document, SerdeSerializer, SerializerRegistry, TypeTag};
use serde_json::Value;
use std::marker::PhantomData;

/// `{"$count": field}`: replaces the input with a single [`Document`]
/// holding the number of input documents under `field`.
pub struct CountStage<T> {
    field: String,
    _marker: PhantomData<fn(T)>,
}

impl<T> CountStage<T> {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            _marker: PhantomData,
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }
}

impl<T: 'static> TypedStage for CountStage<T> {
    type Input = T;
    type Output = Document;

    fn operator(&self) -> &str {
        "$count"
    }

    fn render_stage(
        &self,
        _input_serializer: &AnySerializer,
        registry: &dyn SerializerRegistry,
    ) -> Result<RenderedStage, RenderError> {
        if self.field.is_empty() {
            return Err(stage_error("$count", "field name must not be empty"));
        }
        if self.field.starts_with('$') || self.field.contains('.') {
            return Err(stage_error(
                "$count",
                format!("invalid field name {:?}", self.field),
            ));
        }

        let output_serializer = registry
            .lookup(&TypeTag::of::<Document>())
            .unwrap_or_else(|| AnySerializer::new(SerdeSerializer::<Document>::new()));

        Ok(RenderedStage::operator(
            "$count",
            Value::String(self.field.clone()),
            output_serializer,
        ))
    }
}
