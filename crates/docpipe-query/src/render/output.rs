//! Output serializer resolution.
//!
//! Stages do not always know the shape the caller wants back (a projection
//! may emit a serializer for its own view rather than the caller's type), so
//! the pipeline picks its output serializer from an ordered list of
//! strategies. The first one that yields a serializer wins:
//!
//! 1. [`Explicit`](OutputSerializerStrategy::Explicit) -- set on the pipeline
//! 2. [`LastStage`](OutputSerializerStrategy::LastStage) -- the serializer the
//!    last stage returned (the input serializer for an empty pipeline), if it
//!    is for the pipeline's output type
//! 3. [`Registry`](OutputSerializerStrategy::Registry) -- the registry default
//!    for the output type

use crate::error::RenderError;
use docpipe_core::{
    AnySerializer, LookupError, Serializer, SerializerRegistry, SerializerRegistryExt, TypeTag,
};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// One way of finding a pipeline's output serializer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputSerializerStrategy {
    Explicit,
    LastStage,
    Registry,
}

impl OutputSerializerStrategy {
    /// Strategies in the order they are tried
    pub const PRIORITY: [OutputSerializerStrategy; 3] = [
        OutputSerializerStrategy::Explicit,
        OutputSerializerStrategy::LastStage,
        OutputSerializerStrategy::Registry,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            OutputSerializerStrategy::Explicit => "explicit",
            OutputSerializerStrategy::LastStage => "last_stage",
            OutputSerializerStrategy::Registry => "registry",
        }
    }

    /// Try this strategy alone.
    pub fn resolve<O: 'static>(
        &self,
        explicit: Option<&Arc<dyn Serializer<O>>>,
        last_stage: &AnySerializer,
        registry: &dyn SerializerRegistry,
    ) -> Option<Arc<dyn Serializer<O>>> {
        match self {
            OutputSerializerStrategy::Explicit => explicit.cloned(),
            OutputSerializerStrategy::LastStage => {
                if last_stage.value_type() == TypeTag::of::<O>() {
                    last_stage.downcast::<O>()
                } else {
                    None
                }
            }
            OutputSerializerStrategy::Registry => registry.get_serializer::<O>().ok(),
        }
    }
}

impl fmt::Display for OutputSerializerStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Walk [`OutputSerializerStrategy::PRIORITY`] and return the first hit.
pub fn resolve_output_serializer<O: 'static>(
    explicit: Option<&Arc<dyn Serializer<O>>>,
    last_stage: &AnySerializer,
    registry: &dyn SerializerRegistry,
) -> Result<Arc<dyn Serializer<O>>, RenderError> {
    OutputSerializerStrategy::PRIORITY
        .iter()
        .find_map(|strategy| {
            let serializer = strategy.resolve(explicit, last_stage, registry)?;
            debug!(
                strategy = strategy.name(),
                output = %TypeTag::of::<O>(),
                "resolved output serializer"
            );
            Some(serializer)
        })
        .ok_or_else(|| {
            RenderError::Lookup(LookupError::NotRegistered {
                value_type: TypeTag::of::<O>(),
            })
        })
}
