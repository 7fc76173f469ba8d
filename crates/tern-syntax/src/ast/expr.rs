//! Expression AST nodes.
//!
//! Provides nodes for:
//! - Literals (integers, floats, booleans, strings)
//! - Names: identifiers, `Base::member` paths and `value.member` access
//! - Calls and `new T(args)` construction
//! - Binary and unary operators
//! - Explicit casts (`expr as T`)

use tern_core::Span;

use crate::ast::types::{Ident, TypeExpr};
use crate::ast::{BinaryOp, UnaryOp};

/// An expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Expr<'ast> {
    /// Literal value
    Literal(LiteralExpr<'ast>),
    /// Identifier reference, possibly with generic arguments
    Ident(IdentExpr<'ast>),
    /// Qualified access (`Base::member`)
    Path(&'ast PathExpr<'ast>),
    /// Member access (`value.member`)
    Member(&'ast MemberExpr<'ast>),
    /// Function call
    Call(&'ast CallExpr<'ast>),
    /// Object construction
    New(&'ast NewExpr<'ast>),
    /// Binary operation
    Binary(&'ast BinaryExpr<'ast>),
    /// Unary prefix operation
    Unary(&'ast UnaryExpr<'ast>),
    /// Explicit cast
    Cast(&'ast CastExpr<'ast>),
}

impl<'ast> Expr<'ast> {
    /// Get the span of this expression.
    pub fn span(&self) -> Span {
        match self {
            Self::Literal(e) => e.span,
            Self::Ident(e) => e.span,
            Self::Path(e) => e.span,
            Self::Member(e) => e.span,
            Self::Call(e) => e.span,
            Self::New(e) => e.span,
            Self::Binary(e) => e.span,
            Self::Unary(e) => e.span,
            Self::Cast(e) => e.span,
        }
    }
}

/// A literal value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiteralExpr<'ast> {
    pub kind: LiteralKind<'ast>,
    pub span: Span,
}

/// The kind of literal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LiteralKind<'ast> {
    /// Integer literal, typed `i32`
    Int(i64),
    /// Float literal, typed `f64`
    Float(f64),
    Bool(bool),
    /// String literal, typed as the prelude `String` class
    Str(&'ast str),
}

/// An identifier expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IdentExpr<'ast> {
    pub ident: Ident<'ast>,
    /// Explicit generic arguments (`make<i32>`)
    pub generics: &'ast [TypeExpr<'ast>],
    pub span: Span,
}

/// `base::member<generics>`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathExpr<'ast> {
    /// Identifier or nested path naming a module or type
    pub base: &'ast Expr<'ast>,
    pub member: Ident<'ast>,
    pub generics: &'ast [TypeExpr<'ast>],
    pub span: Span,
}

/// `base.member<generics>`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemberExpr<'ast> {
    /// An expression producing a value
    pub base: &'ast Expr<'ast>,
    pub member: Ident<'ast>,
    pub generics: &'ast [TypeExpr<'ast>],
    pub span: Span,
}

/// A function call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CallExpr<'ast> {
    /// The function being called (can be any expression)
    pub callee: &'ast Expr<'ast>,
    pub args: &'ast [Expr<'ast>],
    pub span: Span,
}

/// `new T(args)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewExpr<'ast> {
    pub ty: TypeExpr<'ast>,
    pub args: &'ast [Expr<'ast>],
    pub span: Span,
}

/// A binary operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinaryExpr<'ast> {
    pub left: &'ast Expr<'ast>,
    pub op: BinaryOp,
    pub right: &'ast Expr<'ast>,
    pub span: Span,
}

/// A unary prefix operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnaryExpr<'ast> {
    pub op: UnaryOp,
    pub operand: &'ast Expr<'ast>,
    pub span: Span,
}

/// `expr as T`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CastExpr<'ast> {
    pub expr: &'ast Expr<'ast>,
    pub target: TypeExpr<'ast>,
    pub span: Span,
}
