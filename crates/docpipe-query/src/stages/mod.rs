//! Built-in aggregation stages.
//!
//! Each stage renders to a single-operator document such as
//! `{"$limit": 10}`. Stages that reference fields take [`FieldName`] or
//! [`TypedFieldName`] values and resolve them against the serializer of the
//! documents flowing into the stage.
//!
//! [`FieldName`]: crate::FieldName
//! [`TypedFieldName`]: crate::TypedFieldName

mod count;
mod document;
mod filter;
mod paging;
mod project;
mod sort;

pub use count::CountStage;
pub use document::DocumentStage;
pub use filter::{Comparison, MatchStage};
pub use paging::{LimitStage, SkipStage};
pub use project::ProjectStage;
pub use sort::{SortDirection, SortStage};

use crate::error::RenderError;

fn stage_error(stage: &str, message: impl Into<String>) -> RenderError {
    RenderError::Stage {
        stage: stage.to_string(),
        message: message.into(),
    }
}
