//! Syntactic type references.
//!
//! Every [`TypeExpr`] carries a [`NodeId`] so the type resolver can memoize
//! its result per node.

use tern_core::{NodeId, Span};

use crate::ast::expr::Expr;

/// An identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ident<'ast> {
    pub name: &'ast str,
    pub span: Span,
}

impl<'ast> Ident<'ast> {
    pub fn new(name: &'ast str, span: Span) -> Self {
        Self { name, span }
    }
}

/// One segment of a qualified path, e.g. `Map<K, V>` in `std::Map<K, V>`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathSegment<'ast> {
    pub ident: Ident<'ast>,
    /// Explicit generic arguments.
    pub generics: &'ast [TypeExpr<'ast>],
}

/// A possibly qualified name: `A`, `A::B`, `A::B<C>`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Path<'ast> {
    /// Never empty.
    pub segments: &'ast [PathSegment<'ast>],
    pub span: Span,
}

impl<'ast> Path<'ast> {
    /// The final segment.
    pub fn last(&self) -> Option<&PathSegment<'ast>> {
        self.segments.last()
    }

    /// Whether this is a plain, unqualified name.
    pub fn is_simple(&self) -> bool {
        self.segments.len() == 1
    }
}

/// A syntactic type reference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TypeExpr<'ast> {
    pub id: NodeId,
    pub kind: TypeExprKind<'ast>,
    pub span: Span,
}

/// The forms a type reference can take.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TypeExprKind<'ast> {
    /// `T`, `A::B<C>`
    Named(Path<'ast>),
    /// `&T`
    Reference(&'ast TypeExpr<'ast>),
    /// `func(A, B, ...) -> R`
    Function(FunctionTypeExpr<'ast>),
    /// `typeof(expr)`
    TypeOf(&'ast Expr<'ast>),
}

/// A function type reference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FunctionTypeExpr<'ast> {
    pub params: &'ast [TypeExpr<'ast>],
    /// `None` for `void`.
    pub ret: Option<&'ast TypeExpr<'ast>>,
    pub is_variadic: bool,
}
