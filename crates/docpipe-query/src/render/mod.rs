//! Pipeline rendering.
//!
//! Rendering threads a serializer through the stages of a validated
//! [`Pipeline`]: the input serializer goes into the first stage, each stage's
//! output serializer goes into the next. Every stage contributes exactly one
//! wire document. The pipeline's output serializer is then chosen by
//! [`OutputSerializerStrategy`] in priority order.

mod output;

pub use output::{resolve_output_serializer, OutputSerializerStrategy};

use crate::config::RenderConfig;
use crate::error::RenderError;
use crate::pipeline::Pipeline;
use docpipe_core::{AnySerializer, Document, Serializer, SerializerRegistry};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// Output from rendering a pipeline
pub struct RenderedPipeline<O> {
    documents: Vec<Document>,
    output_serializer: Arc<dyn Serializer<O>>,
}

impl<O> RenderedPipeline<O> {
    pub fn new(documents: Vec<Document>, output_serializer: Arc<dyn Serializer<O>>) -> Self {
        Self {
            documents,
            output_serializer,
        }
    }

    /// One document per stage, in stage order
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Serializer for decoding the pipeline's results
    pub fn output_serializer(&self) -> &Arc<dyn Serializer<O>> {
        &self.output_serializer
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// The documents as a JSON array, ready to send
    pub fn to_value(&self) -> Value {
        Value::Array(
            self.documents
                .iter()
                .cloned()
                .map(Value::Object)
                .collect(),
        )
    }

    pub fn into_parts(self) -> (Vec<Document>, Arc<dyn Serializer<O>>) {
        (self.documents, self.output_serializer)
    }
}

impl<O> Clone for RenderedPipeline<O> {
    fn clone(&self) -> Self {
        Self {
            documents: self.documents.clone(),
            output_serializer: Arc::clone(&self.output_serializer),
        }
    }
}

impl<O: 'static> fmt::Debug for RenderedPipeline<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderedPipeline")
            .field("documents", &self.documents)
            .field("output_serializer", &self.output_serializer.name())
            .finish()
    }
}

impl<O> fmt::Display for RenderedPipeline<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_value())
    }
}

/// Renders pipelines into wire documents.
#[derive(Debug, Clone, Default)]
pub struct PipelineRenderer {
    config: RenderConfig,
}

impl PipelineRenderer {
    /// Create a renderer with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a renderer with custom configuration
    pub fn with_config(config: RenderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Render `pipeline`, feeding `input_serializer` to its first stage.
    pub fn render<I: 'static, O: 'static>(
        &self,
        pipeline: &Pipeline<I, O>,
        input_serializer: &AnySerializer,
        registry: &dyn SerializerRegistry,
    ) -> Result<RenderedPipeline<O>, RenderError> {
        if let Some(max) = self.config.max_stages {
            if pipeline.len() > max {
                return Err(RenderError::TooManyStages {
                    count: pipeline.len(),
                    max,
                });
            }
        }

        let mut documents = Vec::with_capacity(pipeline.len());
        let mut current = input_serializer.clone();

        for (index, stage) in pipeline.stages().iter().enumerate() {
            debug!(
                index,
                stage = stage.name(),
                input = %current.value_type(),
                "rendering stage"
            );
            let rendered = stage.render(&current, registry)?;
            if self.config.trace_documents {
                let document = Value::Object(rendered.document.clone());
                trace!(index, %document, "rendered stage");
            }
            documents.push(rendered.document);
            current = rendered.output_serializer;
        }

        let output_serializer =
            resolve_output_serializer(pipeline.output_serializer(), &current, registry)?;

        Ok(RenderedPipeline::new(documents, output_serializer))
    }
}
