//! Statement AST nodes.

use tern_core::{Privacy, Span};

use crate::ast::expr::Expr;
use crate::ast::types::{Ident, TypeExpr};

/// A statement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stmt<'ast> {
    /// Variable declaration
    Var(VarDecl<'ast>),
    /// Expression statement
    Expr(ExprStmt<'ast>),
    /// Return statement
    Return(ReturnStmt<'ast>),
    /// Nested block
    Block(Block<'ast>),
    /// If statement
    If(&'ast IfStmt<'ast>),
    /// While loop
    While(&'ast WhileStmt<'ast>),
}

impl<'ast> Stmt<'ast> {
    /// Get the span of this statement.
    pub fn span(&self) -> Span {
        match self {
            Self::Var(s) => s.span,
            Self::Expr(s) => s.span,
            Self::Return(s) => s.span,
            Self::Block(s) => s.span,
            Self::If(s) => s.span,
            Self::While(s) => s.span,
        }
    }
}

/// A variable declaration, local or global.
///
/// At least one of `ty` and `init` is present.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VarDecl<'ast> {
    pub name: Ident<'ast>,
    pub ty: Option<TypeExpr<'ast>>,
    pub init: Option<&'ast Expr<'ast>>,
    pub is_mutable: bool,
    /// Only meaningful for globals.
    pub privacy: Privacy,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExprStmt<'ast> {
    pub expr: &'ast Expr<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReturnStmt<'ast> {
    pub value: Option<&'ast Expr<'ast>>,
    pub span: Span,
}

/// A block of statements with its own scope.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Block<'ast> {
    pub stmts: &'ast [Stmt<'ast>],
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IfStmt<'ast> {
    pub condition: &'ast Expr<'ast>,
    pub then_block: Block<'ast>,
    pub else_block: Option<Block<'ast>>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WhileStmt<'ast> {
    pub condition: &'ast Expr<'ast>,
    pub body: Block<'ast>,
    pub span: Span,
}
