//! Field references and their resolution to wire element names.
//!
//! A field reference is either a literal wire name or a typed selector. Two
//! shapes exist:
//!
//! - [`FieldName<D>`] resolves to a name only ([`RenderedFieldName`])
//! - [`TypedFieldName<D, F>`] resolves to a name and a serializer for `F`
//!   ([`TypedRenderedFieldName`])
//!
//! Literal references are returned unchanged. Selector references are bound
//! against the document serializer (see [`crate::bind`]).

use crate::bind::{bind_field, ExpressionBinder, SerializationBinder};
use crate::error::ResolutionError;
use crate::expr::{Selector, TypedExpr, UntypedSelector};
use docpipe_core::{AnySerializer, Serializer, SerializerRegistry, SerializerRegistryExt, TypeTag};
use std::fmt;
use std::sync::Arc;

/// Resolved name of an untyped field reference.
#[derive(Debug, Clone)]
pub struct RenderedFieldName {
    field_name: String,
    field_serializer: Option<AnySerializer>,
}

impl RenderedFieldName {
    pub fn new(field_name: impl Into<String>, field_serializer: Option<AnySerializer>) -> Self {
        Self {
            field_name: field_name.into(),
            field_serializer,
        }
    }

    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    /// Serializer discovered while binding; `None` for literal names.
    pub fn field_serializer(&self) -> Option<&AnySerializer> {
        self.field_serializer.as_ref()
    }

    pub fn into_field_name(self) -> String {
        self.field_name
    }
}

/// Resolved name and serializer of a typed field reference.
pub struct TypedRenderedFieldName<F> {
    field_name: String,
    field_serializer: Arc<dyn Serializer<F>>,
}

impl<F> TypedRenderedFieldName<F> {
    pub fn new(field_name: impl Into<String>, field_serializer: Arc<dyn Serializer<F>>) -> Self {
        Self {
            field_name: field_name.into(),
            field_serializer,
        }
    }

    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    pub fn field_serializer(&self) -> &Arc<dyn Serializer<F>> {
        &self.field_serializer
    }

    pub fn into_parts(self) -> (String, Arc<dyn Serializer<F>>) {
        (self.field_name, self.field_serializer)
    }
}

impl<F> Clone for TypedRenderedFieldName<F> {
    fn clone(&self) -> Self {
        Self {
            field_name: self.field_name.clone(),
            field_serializer: Arc::clone(&self.field_serializer),
        }
    }
}

impl<F: 'static> fmt::Debug for TypedRenderedFieldName<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedRenderedFieldName")
            .field("field_name", &self.field_name)
            .field("field_serializer", &self.field_serializer.name())
            .finish()
    }
}

/// Reference to a field of document `D` whose value type is not tracked.
pub enum FieldName<D> {
    /// Raw wire element name
    Literal(String),
    /// Selector bound against the document serializer
    Expression(UntypedSelector<D>),
}

impl<D: 'static> FieldName<D> {
    pub fn literal(name: impl Into<String>) -> Self {
        FieldName::Literal(name.into())
    }

    /// Reference built from a selector.
    pub fn expression<F: 'static>(build: impl FnOnce(TypedExpr<D>) -> TypedExpr<F>) -> Self {
        FieldName::Expression(UntypedSelector::new(build))
    }

    /// Resolve to a wire element name using the default binder.
    pub fn render(
        &self,
        document_serializer: &AnySerializer,
        registry: &dyn SerializerRegistry,
    ) -> Result<RenderedFieldName, ResolutionError> {
        self.render_with(document_serializer, registry, &SerializationBinder)
    }

    /// Resolve to a wire element name using `binder`.
    pub fn render_with(
        &self,
        document_serializer: &AnySerializer,
        registry: &dyn SerializerRegistry,
        binder: &dyn ExpressionBinder,
    ) -> Result<RenderedFieldName, ResolutionError> {
        match self {
            FieldName::Literal(name) => Ok(RenderedFieldName::new(name.clone(), None)),
            FieldName::Expression(selector) => {
                let bound = bind_field(
                    selector.parameter(),
                    selector.body(),
                    TypeTag::of::<D>(),
                    document_serializer,
                    registry,
                    binder,
                    selector,
                )?;
                Ok(RenderedFieldName::new(
                    bound.element_name,
                    Some(bound.serializer),
                ))
            }
        }
    }
}

impl<D, F> From<Selector<D, F>> for FieldName<D>
where
    D: 'static,
    F: 'static,
{
    fn from(selector: Selector<D, F>) -> Self {
        FieldName::Expression(selector.untyped())
    }
}

impl<D> Clone for FieldName<D> {
    fn clone(&self) -> Self {
        match self {
            FieldName::Literal(name) => FieldName::Literal(name.clone()),
            FieldName::Expression(selector) => FieldName::Expression(selector.clone()),
        }
    }
}

impl<D> fmt::Debug for FieldName<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldName::Literal(name) => f.debug_tuple("Literal").field(name).finish(),
            FieldName::Expression(selector) => f.debug_tuple("Expression").field(selector).finish(),
        }
    }
}

impl<D> fmt::Display for FieldName<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldName::Literal(name) => f.write_str(name),
            FieldName::Expression(selector) => write!(f, "{}", selector),
        }
    }
}

/// Reference to a field of document `D` with value type `F`.
pub enum TypedFieldName<D, F> {
    /// Raw wire element name, optionally with the serializer to use for it
    Literal {
        name: String,
        serializer: Option<Arc<dyn Serializer<F>>>,
    },
    /// Selector bound against the document serializer
    Expression(Selector<D, F>),
}

impl<D: 'static, F: 'static> TypedFieldName<D, F> {
    /// Literal name; the field serializer comes from the registry.
    pub fn literal(name: impl Into<String>) -> Self {
        TypedFieldName::Literal {
            name: name.into(),
            serializer: None,
        }
    }

    /// Literal name with an explicit field serializer.
    pub fn literal_with_serializer(name: impl Into<String>, serializer: impl Serializer<F>) -> Self {
        TypedFieldName::Literal {
            name: name.into(),
            serializer: Some(Arc::new(serializer) as Arc<dyn Serializer<F>>),
        }
    }

    /// Reference built from a selector.
    pub fn expression(build: impl FnOnce(TypedExpr<D>) -> TypedExpr<F>) -> Self {
        TypedFieldName::Expression(Selector::new(build))
    }

    /// Resolve to a wire element name and field serializer using the default binder.
    pub fn render(
        &self,
        document_serializer: &AnySerializer,
        registry: &dyn SerializerRegistry,
    ) -> Result<TypedRenderedFieldName<F>, ResolutionError> {
        self.render_with(document_serializer, registry, &SerializationBinder)
    }

    /// Resolve to a wire element name and field serializer using `binder`.
    pub fn render_with(
        &self,
        document_serializer: &AnySerializer,
        registry: &dyn SerializerRegistry,
        binder: &dyn ExpressionBinder,
    ) -> Result<TypedRenderedFieldName<F>, ResolutionError> {
        match self {
            TypedFieldName::Literal { name, serializer } => {
                let serializer = match serializer {
                    Some(serializer) => Arc::clone(serializer),
                    None => registry.get_serializer::<F>()?,
                };
                Ok(TypedRenderedFieldName::new(name.clone(), serializer))
            }
            TypedFieldName::Expression(selector) => {
                let bound = bind_field(
                    selector.parameter(),
                    selector.body(),
                    TypeTag::of::<D>(),
                    document_serializer,
                    registry,
                    binder,
                    selector,
                )?;
                let serializer = bound.serializer.downcast::<F>().ok_or_else(|| {
                    ResolutionError::SerializerTypeMismatch {
                        expression: selector.to_string(),
                        expected: TypeTag::of::<F>(),
                        actual: bound.serializer.value_type(),
                    }
                })?;
                Ok(TypedRenderedFieldName::new(bound.element_name, serializer))
            }
        }
    }

    /// Forget the field type.
    pub fn untyped(&self) -> FieldName<D> {
        match self {
            TypedFieldName::Literal { name, .. } => FieldName::Literal(name.clone()),
            TypedFieldName::Expression(selector) => FieldName::Expression(selector.clone().untyped()),
        }
    }
}

impl<D, F> From<Selector<D, F>> for TypedFieldName<D, F> {
    fn from(selector: Selector<D, F>) -> Self {
        TypedFieldName::Expression(selector)
    }
}

impl<D, F> Clone for TypedFieldName<D, F> {
    fn clone(&self) -> Self {
        match self {
            TypedFieldName::Literal { name, serializer } => TypedFieldName::Literal {
                name: name.clone(),
                serializer: serializer.clone(),
            },
            TypedFieldName::Expression(selector) => TypedFieldName::Expression(selector.clone()),
        }
    }
}

impl<D, F: 'static> fmt::Debug for TypedFieldName<D, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypedFieldName::Literal { name, serializer } => f
                .debug_struct("Literal")
                .field("name", name)
                .field("serializer", &serializer.as_ref().map(|s| s.name()))
                .finish(),
            TypedFieldName::Expression(selector) => {
                f.debug_tuple("Expression").field(selector).finish()
            }
        }
    }
}

impl<D, F> fmt::Display for TypedFieldName<D, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypedFieldName::Literal { name, .. } => f.write_str(name),
            TypedFieldName::Expression(selector) => write!(f, "{}", selector),
        }
    }
}
