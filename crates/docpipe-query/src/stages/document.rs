use super::stage_error;
use crate::error::RenderError;
use crate::stage::{RenderedStage, TypedStage};
use docpipe_core::{AnySerializer, Document, Serializer, SerializerRegistry, SerializerRegistryExt};
use std::marker::PhantomData;
use std::sync::Arc;

/// A stage given as a raw wire document, with declared input and output types.
///
/// The document is emitted as is; it must hold exactly one `$`-prefixed
/// operator key. The output serializer is the explicit one if set, else the
/// input serializer when it is already for `O`, else the registry default
/// for `O`.
pub struct DocumentStage<I, O> {
    operator: String,
    document: Document,
    output_serializer: Option<Arc<dyn Serializer<O>>>,
    _marker: PhantomData<fn(I) -> O>,
}

impl<I: 'static, O: 'static> DocumentStage<I, O> {
    pub fn new(document: Document) -> Self {
        let operator = document.keys().next().cloned().unwrap_or_default();
        Self {
            operator,
            document,
            output_serializer: None,
            _marker: PhantomData,
        }
    }

    /// Parse the stage from JSON text.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    pub fn with_output_serializer(mut self, serializer: impl Serializer<O>) -> Self {
        self.output_serializer = Some(Arc::new(serializer) as Arc<dyn Serializer<O>>);
        self
    }

    pub fn document(&self) -> &Document {
        &self.document
    }
}

impl<I: 'static, O: 'static> TypedStage for DocumentStage<I, O> {
    type Input = I;
    type Output = O;

    fn operator(&self) -> &str {
        &self.operator
    }

    fn render_stage(
        &self,
        input_serializer: &AnySerializer,
        registry: &dyn SerializerRegistry,
    ) -> Result<RenderedStage, RenderError> {
        if self.document.len() != 1 || !self.operator.starts_with('$') {
            return Err(stage_error(
                &self.operator,
                format!(
                    "a stage document needs exactly one operator, found keys {:?}",
                    self.document.keys().collect::<Vec<_>>()
                ),
            ));
        }

        let output_serializer = match &self.output_serializer {
            Some(serializer) => AnySerializer::from_arc(Arc::clone(serializer)),
            None if input_serializer.is_for::<O>() => input_serializer.clone(),
            None => AnySerializer::from_arc(registry.get_serializer::<O>()?),
        };

        Ok(RenderedStage::new(self.document.clone(), output_serializer))
    }
}
