//! Binding of selector expressions to serialization metadata.
//!
//! Binding turns `doc => doc.Address.City` into the wire element name
//! `"address.city"` plus the serializer of `City`:
//!
//! 1. the selector parameter is replaced by an [`Expr::Serialized`] root
//!    carrying the document serializer
//! 2. an [`ExpressionBinder`] rewrites the tree bottom-up into [`BoundExpr`]
//!    nodes, each carrying the [`SerializationInfo`] it could resolve
//! 3. the outermost node must carry a wire element name
//!
//! Anything the binder cannot map to a single wire field (computed values,
//! members of scalars, references to other parameters) leaves the outermost
//! node without metadata and binding fails.

use crate::error::ResolutionError;
use crate::expr::Expr;
use docpipe_core::{AnySerializer, SerializerRegistry, TypeTag};
use tracing::debug;

/// Serialization metadata attached to a bound node.
#[derive(Debug, Clone)]
pub struct SerializationInfo {
    /// Dotted wire path; `None` for the document root itself
    pub element_name: Option<String>,
    pub serializer: AnySerializer,
}

impl SerializationInfo {
    fn root(serializer: AnySerializer) -> Self {
        Self {
            element_name: None,
            serializer,
        }
    }

    fn child(&self, element: &str, serializer: AnySerializer) -> Self {
        let element_name = match &self.element_name {
            Some(parent) => format!("{}.{}", parent, element),
            None => element.to_string(),
        };
        Self {
            element_name: Some(element_name),
            serializer,
        }
    }
}

/// A rewritten expression node: the original node, its bound operands and
/// whatever serialization metadata could be resolved for it.
#[derive(Debug, Clone)]
pub struct BoundExpr {
    pub expr: Expr,
    pub operands: Vec<BoundExpr>,
    pub serialization: Option<SerializationInfo>,
}

impl BoundExpr {
    pub fn ty(&self) -> TypeTag {
        self.expr.ty()
    }

    /// Wire element name, when this node addresses a wire field.
    pub fn element_name(&self) -> Option<&str> {
        self.serialization
            .as_ref()
            .and_then(|info| info.element_name.as_deref())
    }
}

/// Rewrites an expression tree into serialization-aware nodes.
pub trait ExpressionBinder: Send + Sync {
    fn bind(&self, expr: &Expr, registry: &dyn SerializerRegistry) -> BoundExpr;
}

/// Default binder: resolves member access through document serializers and
/// indexing through array serializers.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerializationBinder;

impl ExpressionBinder for SerializationBinder {
    fn bind(&self, expr: &Expr, registry: &dyn SerializerRegistry) -> BoundExpr {
        let operands: Vec<BoundExpr> = expr
            .children()
            .into_iter()
            .map(|child| self.bind(child, registry))
            .collect();

        let serialization = match expr {
            Expr::Serialized { serializer, .. } => Some(SerializationInfo::root(serializer.clone())),
            Expr::Member { member, .. } => operands[0].serialization.as_ref().and_then(|parent| {
                parent
                    .serializer
                    .member(member)
                    .map(|info| parent.child(&info.element_name, info.serializer))
            }),
            Expr::Index { index, .. } => operands[0].serialization.as_ref().and_then(|parent| {
                parent
                    .serializer
                    .item()
                    .map(|item| parent.child(&index.to_string(), item))
            }),
            Expr::Parameter { .. } | Expr::Call { .. } | Expr::Constant { .. } => None,
        };

        BoundExpr {
            expr: expr.clone(),
            operands,
            serialization,
        }
    }
}

/// Resolved wire field of a selector.
#[derive(Debug, Clone)]
pub struct BoundField {
    pub element_name: String,
    pub serializer: AnySerializer,
}

/// Bind a selector body against a document serializer.
///
/// `parameter` is the selector's parameter name and `document_type` the static
/// type it stands for. `display` names the selector in errors.
pub fn bind_field(
    parameter: &str,
    body: &Expr,
    document_type: TypeTag,
    document_serializer: &AnySerializer,
    registry: &dyn SerializerRegistry,
    binder: &dyn ExpressionBinder,
    display: &dyn std::fmt::Display,
) -> Result<BoundField, ResolutionError> {
    let root = Expr::Serialized {
        serializer: document_serializer.clone(),
        ty: document_type,
    };
    let substituted = body.substitute(parameter, &root);
    let bound = binder.bind(&substituted, registry);

    match bound.serialization {
        Some(SerializationInfo {
            element_name: Some(element_name),
            serializer,
        }) => Ok(BoundField {
            element_name,
            serializer,
        }),
        _ => {
            let expression = display.to_string();
            debug!(%expression, "selector does not address a wire field");
            Err(ResolutionError::Unbindable { expression })
        }
    }
}
