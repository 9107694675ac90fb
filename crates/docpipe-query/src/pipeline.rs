//! Typed aggregation pipelines.
//!
//! A [`Pipeline<I, O>`] is an ordered list of stages taking `I` documents to
//! `O` documents. The stage chain is validated once, when the pipeline is
//! built: each stage's declared input must be the previous stage's declared
//! output, starting from `I` and ending at `O`. Comparison is by type tag
//! only; serializers are not compared.

use crate::error::{PipelineError, RenderError};
use crate::render::{PipelineRenderer, RenderedPipeline};
use crate::stage::SharedStage;
use docpipe_core::{AnySerializer, Serializer, SerializerRegistry, TypeTag};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::debug;

/// Check that `stages` chain from `input` to `output`.
pub fn validate_stage_chain(
    input: TypeTag,
    output: TypeTag,
    stages: &[SharedStage],
) -> Result<(), PipelineError> {
    let mut expected = input;
    for (index, stage) in stages.iter().enumerate() {
        let actual = stage.input_type();
        if actual != expected {
            return Err(PipelineError::StageInputMismatch {
                index,
                stage: stage.name().to_string(),
                expected,
                actual,
            });
        }
        expected = stage.output_type();
    }

    if expected != output {
        return Err(PipelineError::OutputMismatch {
            expected: output,
            actual: expected,
        });
    }
    Ok(())
}

/// A validated stage chain from `I` to `O`.
pub struct Pipeline<I, O> {
    stages: Vec<SharedStage>,
    output_serializer: Option<Arc<dyn Serializer<O>>>,
    _marker: PhantomData<fn(I) -> O>,
}

impl<I: 'static, O: 'static> Pipeline<I, O> {
    /// Build a pipeline, validating the stage chain.
    pub fn new(stages: impl IntoIterator<Item = SharedStage>) -> Result<Self, PipelineError> {
        let stages: Vec<SharedStage> = stages.into_iter().collect();
        if let Err(err) = validate_stage_chain(TypeTag::of::<I>(), TypeTag::of::<O>(), &stages) {
            debug!(error = %err, stages = stages.len(), "rejected pipeline");
            return Err(err);
        }
        Ok(Self {
            stages,
            output_serializer: None,
            _marker: PhantomData,
        })
    }

    /// A pipeline with no stages. Requires `I` and `O` to be the same type.
    pub fn empty() -> Result<Self, PipelineError> {
        Self::new(Vec::new())
    }

    /// Use `serializer` for the pipeline's output, whatever the stages produce.
    pub fn with_output_serializer(self, serializer: impl Serializer<O>) -> Self {
        self.with_output_serializer_arc(Arc::new(serializer))
    }

    pub fn with_output_serializer_arc(mut self, serializer: Arc<dyn Serializer<O>>) -> Self {
        self.output_serializer = Some(serializer);
        self
    }

    /// A new pipeline with `stage` appended, producing `O2`.
    ///
    /// The explicit output serializer, being for `O`, is not carried over.
    pub fn append_stage<O2: 'static>(
        &self,
        stage: SharedStage,
    ) -> Result<Pipeline<I, O2>, PipelineError> {
        let mut stages = self.stages.clone();
        stages.push(stage);
        Pipeline::new(stages)
    }

    /// A new pipeline with `stage` prepended, consuming `I2`.
    pub fn prepend_stage<I2: 'static>(
        &self,
        stage: SharedStage,
    ) -> Result<Pipeline<I2, O>, PipelineError> {
        let stages = std::iter::once(stage).chain(self.stages.iter().cloned());
        let pipeline = Pipeline::new(stages)?;
        Ok(match &self.output_serializer {
            Some(serializer) => pipeline.with_output_serializer_arc(Arc::clone(serializer)),
            None => pipeline,
        })
    }

    /// Render with a default [`PipelineRenderer`].
    pub fn render(
        &self,
        input_serializer: &AnySerializer,
        registry: &dyn SerializerRegistry,
    ) -> Result<RenderedPipeline<O>, RenderError> {
        PipelineRenderer::new().render(self, input_serializer, registry)
    }
}

impl<I, O> Pipeline<I, O> {
    pub fn stages(&self) -> &[SharedStage] {
        &self.stages
    }

    pub fn output_serializer(&self) -> Option<&Arc<dyn Serializer<O>>> {
        self.output_serializer.as_ref()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

impl<I, O> Clone for Pipeline<I, O> {
    fn clone(&self) -> Self {
        Self {
            stages: self.stages.clone(),
            output_serializer: self.output_serializer.clone(),
            _marker: PhantomData,
        }
    }
}

impl<I, O> fmt::Debug for Pipeline<I, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("input", &std::any::type_name::<I>())
            .field("output", &std::any::type_name::<O>())
            .field(
                "stages",
                &self.stages.iter().map(|s| s.name()).collect::<Vec<_>>(),
            )
            .field("explicit_output_serializer", &self.output_serializer.is_some())
            .finish()
    }
}
