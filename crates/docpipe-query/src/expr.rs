//! Portable typed expression trees for field selectors.
//!
//! A selector such as `doc => doc.Address.City` is built as an [`Expr`] tree
//! through the typed handle [`TypedExpr<T>`], which tracks the static type of
//! each sub-expression. The type parameter only exists at compile time; every
//! node also records its [`TypeTag`] so the tree can be inspected and rewritten
//! without generics.
//!
//! ```rust
//! use docpipe_query::Selector;
//! # struct Person;
//! # struct Address;
//!
//! let city = Selector::<Person, String>::new(|doc| {
//!     doc.member::<Address>("Address").member::<String>("City")
//! });
//! assert_eq!(city.to_string(), "doc => doc.Address.City");
//! ```

use docpipe_core::{AnySerializer, TypeTag};
use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;

/// Name given to a selector's parameter unless one is chosen explicitly.
pub const DEFAULT_PARAMETER: &str = "doc";

/// One node of an expression tree.
#[derive(Debug, Clone)]
pub enum Expr {
    /// Reference to a selector parameter
    Parameter { name: String, ty: TypeTag },

    /// Member access: `target.member`
    Member {
        target: Box<Expr>,
        member: String,
        ty: TypeTag,
    },

    /// Array indexing: `target[index]`
    Index {
        target: Box<Expr>,
        index: usize,
        ty: TypeTag,
    },

    /// Method call or computation: `target.method(args..)`
    Call {
        target: Box<Expr>,
        method: String,
        args: Vec<Expr>,
        ty: TypeTag,
    },

    /// Literal value
    Constant { value: Value, ty: TypeTag },

    /// A value whose serializer is known, standing in for a parameter
    /// during binding
    Serialized { serializer: AnySerializer, ty: TypeTag },
}

impl Expr {
    /// Static type of the value this node produces.
    pub fn ty(&self) -> TypeTag {
        match self {
            Expr::Parameter { ty, .. }
            | Expr::Member { ty, .. }
            | Expr::Index { ty, .. }
            | Expr::Call { ty, .. }
            | Expr::Constant { ty, .. }
            | Expr::Serialized { ty, .. } => *ty,
        }
    }

    /// Direct children, in evaluation order.
    pub fn children(&self) -> Vec<&Expr> {
        match self {
            Expr::Parameter { .. } | Expr::Constant { .. } | Expr::Serialized { .. } => Vec::new(),
            Expr::Member { target, .. } | Expr::Index { target, .. } => vec![target.as_ref()],
            Expr::Call { target, args, .. } => {
                let mut children = vec![target.as_ref()];
                children.extend(args.iter());
                children
            }
        }
    }

    /// A new tree with every reference to `parameter` replaced by `replacement`.
    ///
    /// The original tree is left untouched.
    pub fn substitute(&self, parameter: &str, replacement: &Expr) -> Expr {
        match self {
            Expr::Parameter { name, .. } if name == parameter => replacement.clone(),
            Expr::Parameter { .. } | Expr::Constant { .. } | Expr::Serialized { .. } => self.clone(),
            Expr::Member { target, member, ty } => Expr::Member {
                target: Box::new(target.substitute(parameter, replacement)),
                member: member.clone(),
                ty: *ty,
            },
            Expr::Index { target, index, ty } => Expr::Index {
                target: Box::new(target.substitute(parameter, replacement)),
                index: *index,
                ty: *ty,
            },
            Expr::Call {
                target,
                method,
                args,
                ty,
            } => Expr::Call {
                target: Box::new(target.substitute(parameter, replacement)),
                method: method.clone(),
                args: args
                    .iter()
                    .map(|arg| arg.substitute(parameter, replacement))
                    .collect(),
                ty: *ty,
            },
        }
    }

    /// Whether `parameter` occurs anywhere in the tree.
    pub fn references(&self, parameter: &str) -> bool {
        match self {
            Expr::Parameter { name, .. } => name == parameter,
            _ => self.children().iter().any(|c| c.references(parameter)),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Parameter { name, .. } => f.write_str(name),
            Expr::Member { target, member, .. } => write!(f, "{}.{}", target, member),
            Expr::Index { target, index, .. } => write!(f, "{}[{}]", target, index),
            Expr::Call {
                target,
                method,
                args,
                ..
            } => {
                write!(f, "{}.{}(", target, method)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                f.write_str(")")
            }
            Expr::Constant { value, .. } => write!(f, "{}", value),
            Expr::Serialized { ty, .. } => write!(f, "<{}>", ty),
        }
    }
}

/// An [`Expr`] whose value type is `T`.
pub struct TypedExpr<T> {
    expr: Expr,
    _marker: PhantomData<fn() -> T>,
}

impl<T: 'static> TypedExpr<T> {
    fn wrap(expr: Expr) -> Self {
        Self {
            expr,
            _marker: PhantomData,
        }
    }

    /// Reference to a parameter of type `T`.
    pub fn parameter(name: impl Into<String>) -> Self {
        Self::wrap(Expr::Parameter {
            name: name.into(),
            ty: TypeTag::of::<T>(),
        })
    }

    /// Literal value of type `T`.
    pub fn constant(value: Value) -> Self {
        Self::wrap(Expr::Constant {
            value,
            ty: TypeTag::of::<T>(),
        })
    }

    /// Access member `member` of type `F`.
    pub fn member<F: 'static>(self, member: impl Into<String>) -> TypedExpr<F> {
        TypedExpr::wrap(Expr::Member {
            target: Box::new(self.expr),
            member: member.into(),
            ty: TypeTag::of::<F>(),
        })
    }

    /// Call `method` with `args`, producing an `R`.
    pub fn call<R: 'static>(self, method: impl Into<String>, args: Vec<Expr>) -> TypedExpr<R> {
        TypedExpr::wrap(Expr::Call {
            target: Box::new(self.expr),
            method: method.into(),
            args,
            ty: TypeTag::of::<R>(),
        })
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    pub fn into_expr(self) -> Expr {
        self.expr
    }
}

impl<T: 'static> TypedExpr<Vec<T>> {
    /// Element `index` of an array.
    pub fn at(self, index: usize) -> TypedExpr<T> {
        TypedExpr::wrap(Expr::Index {
            target: Box::new(self.expr),
            index,
            ty: TypeTag::of::<T>(),
        })
    }
}

impl<T> Clone for TypedExpr<T> {
    fn clone(&self) -> Self {
        Self {
            expr: self.expr.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for TypedExpr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedExpr")
            .field("type", &std::any::type_name::<T>())
            .field("expr", &self.expr)
            .finish()
    }
}

/// A single-parameter selector from a document `D` to a field value `F`.
pub struct Selector<D, F> {
    parameter: String,
    body: Expr,
    _marker: PhantomData<fn(D) -> F>,
}

impl<D: 'static, F: 'static> Selector<D, F> {
    /// Build a selector whose parameter is named [`DEFAULT_PARAMETER`].
    pub fn new(build: impl FnOnce(TypedExpr<D>) -> TypedExpr<F>) -> Self {
        Self::with_parameter(DEFAULT_PARAMETER, build)
    }

    /// Build a selector with an explicit parameter name.
    pub fn with_parameter(
        parameter: impl Into<String>,
        build: impl FnOnce(TypedExpr<D>) -> TypedExpr<F>,
    ) -> Self {
        let parameter = parameter.into();
        let body = build(TypedExpr::parameter(parameter.clone())).into_expr();
        Self {
            parameter,
            body,
            _marker: PhantomData,
        }
    }

    /// Forget the field type.
    pub fn untyped(self) -> UntypedSelector<D> {
        UntypedSelector {
            parameter: self.parameter,
            body: self.body,
            _marker: PhantomData,
        }
    }
}

impl<D, F> Selector<D, F> {
    pub fn parameter(&self) -> &str {
        &self.parameter
    }

    pub fn body(&self) -> &Expr {
        &self.body
    }
}

impl<D, F> Clone for Selector<D, F> {
    fn clone(&self) -> Self {
        Self {
            parameter: self.parameter.clone(),
            body: self.body.clone(),
            _marker: PhantomData,
        }
    }
}

impl<D, F> fmt::Debug for Selector<D, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Selector")
            .field("parameter", &self.parameter)
            .field("body", &self.body)
            .finish()
    }
}

impl<D, F> fmt::Display for Selector<D, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} => {}", self.parameter, self.body)
    }
}

/// A selector from a document `D` to a field of unknown type.
pub struct UntypedSelector<D> {
    parameter: String,
    body: Expr,
    _marker: PhantomData<fn(D)>,
}

impl<D: 'static> UntypedSelector<D> {
    /// Build a selector and forget its field type.
    pub fn new<F: 'static>(build: impl FnOnce(TypedExpr<D>) -> TypedExpr<F>) -> Self {
        Selector::<D, F>::new(build).untyped()
    }
}

impl<D> UntypedSelector<D> {
    pub fn parameter(&self) -> &str {
        &self.parameter
    }

    pub fn body(&self) -> &Expr {
        &self.body
    }
}

impl<D> Clone for UntypedSelector<D> {
    fn clone(&self) -> Self {
        Self {
            parameter: self.parameter.clone(),
            body: self.body.clone(),
            _marker: PhantomData,
        }
    }
}

impl<D> fmt::Debug for UntypedSelector<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UntypedSelector")
            .field("parameter", &self.parameter)
            .field("body", &self.body)
            .finish()
    }
}

impl<D> fmt::Display for UntypedSelector<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} => {}", self.parameter, self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docpipe_core::SerdeSerializer;
    use serde_json::json;

    struct Person;
    struct Address;

    #[test]
    fn test_member_chain_types() {
        let selector = Selector::<Person, String>::new(|doc| {
            doc.member::<Address>("Address").member::<String>("City")
        });

        assert_eq!(selector.parameter(), "doc");
        assert_eq!(selector.body().ty(), TypeTag::of::<String>());
        assert_eq!(selector.to_string(), "doc => doc.Address.City");

        let Expr::Member { target, .. } = selector.body() else {
            panic!("expected member access");
        };
        assert_eq!(target.ty(), TypeTag::of::<Address>());
    }

    #[test]
    fn test_index_and_call_display() {
        let first_tag = Selector::<Person, String>::with_parameter("p", |p| {
            p.member::<Vec<String>>("Tags").at(0)
        });
        assert_eq!(first_tag.to_string(), "p => p.Tags[0]");

        let padded = Selector::<Person, String>::new(|doc| {
            doc.member::<String>("Name").call::<String>(
                "PadLeft",
                vec![TypedExpr::<i64>::constant(json!(10)).into_expr()],
            )
        });
        assert_eq!(padded.to_string(), "doc => doc.Name.PadLeft(10)");
    }

    #[test]
    fn test_substitute_replaces_parameter_only() {
        let selector = Selector::<Person, i64>::new(|doc| {
            doc.member::<String>("Name").member::<i64>("Length")
        });
        let replacement = Expr::Serialized {
            serializer: docpipe_core::AnySerializer::new(SerdeSerializer::<String>::new()),
            ty: TypeTag::of::<Person>(),
        };

        let substituted = selector.body().substitute("doc", &replacement);

        assert!(!substituted.references("doc"));
        assert_eq!(substituted.to_string(), "<Person>.Name.Length");
        // original untouched
        assert!(selector.body().references("doc"));
        assert_eq!(selector.to_string(), "doc => doc.Name.Length");
    }

    #[test]
    fn test_substitute_leaves_other_parameters() {
        let outer = TypedExpr::<Person>::parameter("other").member::<String>("Name");
        let replacement = TypedExpr::<Person>::constant(json!(null)).into_expr();

        let substituted = outer.expr().substitute("doc", &replacement);

        assert!(substituted.references("other"));
    }

    #[test]
    fn test_untyped_keeps_body() {
        let untyped = UntypedSelector::<Person>::new(|doc| doc.member::<i64>("Age"));

        assert_eq!(untyped.to_string(), "doc => doc.Age");
        assert_eq!(untyped.body().ty(), TypeTag::of::<i64>());
    }
}
