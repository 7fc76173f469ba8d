//! Declaration AST nodes.
//!
//! Provides nodes for:
//! - Functions and methods
//! - Classes and structs
//! - Type aliases
//! - Nested modules and imports
//! - Global variables

use tern_core::{Privacy, Span};

use crate::ast::expr::Expr;
use crate::ast::stmt::{Block, VarDecl};
use crate::ast::types::{Ident, TypeExpr};

/// A compilation unit: one module's worth of items.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceUnit<'ast> {
    pub name: &'ast str,
    pub items: &'ast [Item<'ast>],
}

/// A top-level or module-level item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Item<'ast> {
    /// Function declaration
    Function(FunctionDecl<'ast>),
    /// Class or struct declaration
    Class(ClassDecl<'ast>),
    /// Type alias
    Alias(AliasDecl<'ast>),
    /// Nested module
    Module(ModuleDecl<'ast>),
    /// Import of another module
    Import(ImportDecl<'ast>),
    /// Global variable
    Var(VarDecl<'ast>),
}

impl<'ast> Item<'ast> {
    /// Get the span of this item.
    pub fn span(&self) -> Span {
        match self {
            Self::Function(d) => d.span,
            Self::Class(d) => d.span,
            Self::Alias(d) => d.span,
            Self::Module(d) => d.span,
            Self::Import(d) => d.span,
            Self::Var(d) => d.span,
        }
    }
}

/// Declaration modifiers of a function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FuncModifiers {
    pub is_static: bool,
    pub is_virtual: bool,
    pub is_constructor: bool,
}

/// A function, method or constructor declaration.
///
/// Examples:
/// - `func add(a: i32, b: i32 = 5) -> i32 { ... }`
/// - `virtual func area() -> f64;`
/// - `func first<T>(items: &T) -> T { ... }`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FunctionDecl<'ast> {
    pub name: Ident<'ast>,
    /// Generic parameter names
    pub generics: &'ast [Ident<'ast>],
    pub params: &'ast [Param<'ast>],
    /// Accepts extra trailing arguments
    pub is_variadic: bool,
    /// `None` means `void`
    pub return_type: Option<TypeExpr<'ast>>,
    /// `None` for declarations without implementation
    pub body: Option<Block<'ast>>,
    pub modifiers: FuncModifiers,
    pub privacy: Privacy,
    /// Linkage name override (`[[export("name")]]`)
    pub external_name: Option<&'ast str>,
    pub span: Span,
}

impl<'ast> FunctionDecl<'ast> {
    pub fn is_generic(&self) -> bool {
        !self.generics.is_empty()
    }
}

/// A function parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Param<'ast> {
    pub name: Ident<'ast>,
    pub ty: TypeExpr<'ast>,
    /// Evaluated in the declaring scope when the argument is omitted
    pub default: Option<&'ast Expr<'ast>>,
    pub span: Span,
}

/// A class or struct declaration.
///
/// Example:
/// ```text
/// class Circle<T> : Shape {
///     radius: T;
///     override func area() -> f64 { ... }
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassDecl<'ast> {
    pub name: Ident<'ast>,
    pub generics: &'ast [Ident<'ast>],
    /// Single parent class
    pub parent: Option<TypeExpr<'ast>>,
    pub members: &'ast [ClassMember<'ast>],
    pub is_struct: bool,
    /// `[[extends]]`: may only add non-virtual methods
    pub extends: bool,
    pub privacy: Privacy,
    pub span: Span,
}

impl<'ast> ClassDecl<'ast> {
    pub fn is_generic(&self) -> bool {
        !self.generics.is_empty()
    }
}

/// A class member.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClassMember<'ast> {
    Field(FieldDecl<'ast>),
    Method(FunctionDecl<'ast>),
    Alias(AliasDecl<'ast>),
}

/// A field declaration in a class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldDecl<'ast> {
    pub name: Ident<'ast>,
    pub ty: TypeExpr<'ast>,
    /// Initial value, evaluated in the class scope.
    pub default: Option<&'ast Expr<'ast>>,
    pub is_static: bool,
    pub is_mutable: bool,
    pub privacy: Privacy,
    pub span: Span,
}

/// `type Name = Target;`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AliasDecl<'ast> {
    pub name: Ident<'ast>,
    pub target: TypeExpr<'ast>,
    pub privacy: Privacy,
    pub span: Span,
}

/// `module name { items }`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModuleDecl<'ast> {
    pub name: Ident<'ast>,
    pub items: &'ast [Item<'ast>],
    pub privacy: Privacy,
    pub span: Span,
}

/// `import a::b [as c];`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImportDecl<'ast> {
    pub path: &'ast [Ident<'ast>],
    pub alias: Option<Ident<'ast>>,
    pub span: Span,
}

impl<'ast> ImportDecl<'ast> {
    /// The name the imported module is bound to.
    pub fn binding(&self) -> Option<Ident<'ast>> {
        self.alias.or_else(|| self.path.last().copied())
    }
}
