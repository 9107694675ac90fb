//! Error types for pipeline construction, field resolution and rendering

use docpipe_core::{LookupError, SerializationError, TypeTag};
use thiserror::Error;

/// A pipeline whose stages do not chain.
///
/// Raised by [`Pipeline::new`](crate::Pipeline::new) before anything is rendered.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// A stage's declared input does not match the preceding output
    #[error("stage {index} ({stage}) takes {actual} but the preceding output is {expected}")]
    StageInputMismatch {
        index: usize,
        stage: String,
        expected: TypeTag,
        actual: TypeTag,
    },

    /// The last stage's output does not match the pipeline's declared output
    #[error("pipeline declares output {expected} but its stages produce {actual}")]
    OutputMismatch { expected: TypeTag, actual: TypeTag },
}

/// A field reference that cannot be mapped to a wire field.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    /// The selector does not address a field of the document
    #[error("unable to determine the wire field for expression {expression}")]
    Unbindable { expression: String },

    /// The discovered serializer is not for the declared field type
    #[error("expression {expression} resolved to a serializer for {actual}, expected {expected}")]
    SerializerTypeMismatch {
        expression: String,
        expected: TypeTag,
        actual: TypeTag,
    },

    /// No serializer is registered for a literal field's type
    #[error(transparent)]
    Lookup(#[from] LookupError),
}

/// Rendering failures
#[derive(Error, Debug)]
pub enum RenderError {
    /// A serializer lookup failed
    #[error(transparent)]
    Lookup(#[from] LookupError),

    /// A stage could not resolve one of its field references
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// A stage could not encode a value
    #[error("serialization error: {0}")]
    Serialization(#[from] SerializationError),

    /// Stage-specific failure
    #[error("stage {stage} failed to render: {message}")]
    Stage { stage: String, message: String },

    /// Pipeline is longer than the configured maximum
    #[error("pipeline has {count} stages, more than the configured maximum of {max}")]
    TooManyStages { count: usize, max: usize },
}

/// Result type for rendering
pub type RenderResult<T> = Result<T, RenderError>;

/// Render configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}
