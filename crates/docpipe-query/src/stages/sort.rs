use super::stage_error;
use crate::error::RenderError;
use crate::expr::TypedExpr;
use crate::field::FieldName;
use crate::stage::{RenderedStage, TypedStage};
use docpipe_core::{AnySerializer, Document, SerializerRegistry};
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    /// Wire value: `1` or `-1`
    pub fn as_i32(&self) -> i32 {
        match self {
            SortDirection::Ascending => 1,
            SortDirection::Descending => -1,
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Ascending => write!(f, "asc"),
            SortDirection::Descending => write!(f, "desc"),
        }
    }
}

/// `{"$sort": {field: 1 | -1, ...}}`, keys in the order they were added.
pub struct SortStage<T> {
    keys: Vec<(FieldName<T>, SortDirection)>,
}

impl<T: 'static> SortStage<T> {
    pub fn new() -> Self {
        Self { keys: Vec::new() }
    }

    /// Add a sort key. Each wire field may appear once; rendering fails when
    /// two keys resolve to the same field.
    pub fn by(mut self, field: impl Into<FieldName<T>>, direction: SortDirection) -> Self {
        self.keys.push((field.into(), direction));
        self
    }

    pub fn ascending(self, field: impl Into<FieldName<T>>) -> Self {
        self.by(field, SortDirection::Ascending)
    }

    pub fn descending(self, field: impl Into<FieldName<T>>) -> Self {
        self.by(field, SortDirection::Descending)
    }

    /// Sort by a selected member, e.g. `.ascending_by(|d| d.member::<i64>("Age"))`
    pub fn ascending_by<F: 'static>(
        self,
        build: impl FnOnce(TypedExpr<T>) -> TypedExpr<F>,
    ) -> Self {
        self.by(FieldName::expression(build), SortDirection::Ascending)
    }

    pub fn descending_by<F: 'static>(
        self,
        build: impl FnOnce(TypedExpr<T>) -> TypedExpr<F>,
    ) -> Self {
        self.by(FieldName::expression(build), SortDirection::Descending)
    }

    pub fn keys(&self) -> &[(FieldName<T>, SortDirection)] {
        &self.keys
    }
}

impl<T: 'static> Default for SortStage<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> TypedStage for SortStage<T> {
    type Input = T;
    type Output = T;

    fn operator(&self) -> &str {
        "$sort"
    }

    fn render_stage(
        &self,
        input_serializer: &AnySerializer,
        registry: &dyn SerializerRegistry,
    ) -> Result<RenderedStage, RenderError> {
        if self.keys.is_empty() {
            return Err(stage_error("$sort", "at least one sort key is required"));
        }

        let mut keys = Document::new();
        for (field, direction) in &self.keys {
            let name = field.render(input_serializer, registry)?.into_field_name();
            if keys.contains_key(&name) {
                return Err(stage_error(
                    "$sort",
                    format!("field `{}` is used as a sort key more than once", name),
                ));
            }
            keys.insert(name, Value::from(direction.as_i32()));
        }

        Ok(RenderedStage::operator(
            "$sort",
            Value::Object(keys),
            input_serializer.clone(),
        ))
    }
}
