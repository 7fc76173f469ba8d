//! Programmatic AST construction.
//!
//! [`AstBuilder`] allocates nodes in an arena, assigns every type node a
//! fresh [`NodeId`] and gives every node a distinct synthetic [`Span`]
//! (one line per node) unless an explicit one is supplied with `at`.
//!
//! ```
//! use bumpalo::Bump;
//! use tern_syntax::AstBuilder;
//!
//! let arena = Bump::new();
//! let b = AstBuilder::new(&arena);
//! let f = b
//!     .function("add")
//!     .param("a", b.ty("i32"))
//!     .param_with_default("b", b.ty("i32"), b.int(5))
//!     .returns(b.ty("i32"))
//!     .body(&[b.ret(Some(b.binary(b.name("a"), tern_syntax::ast::BinaryOp::Add, b.name("b"))))])
//!     .build();
//! assert_eq!(f.params.len(), 2);
//! ```

use std::cell::Cell;

use bumpalo::Bump;
use tern_core::{NodeId, Privacy, Span};

use crate::ast::*;

/// Arena-backed factory for AST nodes.
pub struct AstBuilder<'ast> {
    arena: &'ast Bump,
    next_node: Cell<u32>,
    next_line: Cell<u32>,
}

impl<'ast> AstBuilder<'ast> {
    pub fn new(arena: &'ast Bump) -> Self {
        Self {
            arena,
            next_node: Cell::new(0),
            next_line: Cell::new(1),
        }
    }

    pub fn arena(&self) -> &'ast Bump {
        self.arena
    }

    // ========================================================================
    // Allocation
    // ========================================================================

    pub fn alloc<T>(&self, value: T) -> &'ast T {
        self.arena.alloc(value)
    }

    pub fn slice<T: Copy>(&self, items: &[T]) -> &'ast [T] {
        self.arena.alloc_slice_copy(items)
    }

    pub fn str(&self, s: &str) -> &'ast str {
        self.arena.alloc_str(s)
    }

    /// A fresh node identity.
    pub fn node_id(&self) -> NodeId {
        let id = self.next_node.get();
        self.next_node.set(id + 1);
        NodeId::new(id)
    }

    /// A fresh synthetic span.
    pub fn span(&self, len: usize) -> Span {
        let line = self.next_line.get();
        self.next_line.set(line + 1);
        Span::new(line, 1, len as u32)
    }

    pub fn ident(&self, name: &str) -> Ident<'ast> {
        Ident::new(self.str(name), self.span(name.len()))
    }

    // ========================================================================
    // Types
    // ========================================================================

    fn type_expr(&self, kind: TypeExprKind<'ast>, span: Span) -> TypeExpr<'ast> {
        TypeExpr {
            id: self.node_id(),
            kind,
            span,
        }
    }

    /// A plain type name: `T`.
    pub fn ty(&self, name: &str) -> TypeExpr<'ast> {
        self.generic_ty(name, &[])
    }

    /// A generic type name: `Box<T>`.
    pub fn generic_ty(&self, name: &str, generics: &[TypeExpr<'ast>]) -> TypeExpr<'ast> {
        self.path_ty(&[(name, generics)])
    }

    /// A qualified type name: `a::b::T<G>`.
    pub fn path_ty(&self, segments: &[(&str, &[TypeExpr<'ast>])]) -> TypeExpr<'ast> {
        let segments: Vec<PathSegment<'ast>> = segments
            .iter()
            .map(|(name, generics)| PathSegment {
                ident: self.ident(name),
                generics: self.slice(generics),
            })
            .collect();
        let span = segments[0].ident.span;
        let path = Path {
            segments: self.slice(&segments),
            span,
        };
        self.type_expr(TypeExprKind::Named(path), span)
    }

    /// `&T`
    pub fn ref_ty(&self, pointee: TypeExpr<'ast>) -> TypeExpr<'ast> {
        let span = self.span(1);
        self.type_expr(TypeExprKind::Reference(self.alloc(pointee)), span)
    }

    /// `func(params...) -> ret`
    pub fn fn_ty(
        &self,
        params: &[TypeExpr<'ast>],
        ret: Option<TypeExpr<'ast>>,
        is_variadic: bool,
    ) -> TypeExpr<'ast> {
        let span = self.span(4);
        let function = FunctionTypeExpr {
            params: self.slice(params),
            ret: ret.map(|ret| self.alloc(ret)),
            is_variadic,
        };
        self.type_expr(TypeExprKind::Function(function), span)
    }

    /// `typeof(expr)`
    pub fn typeof_ty(&self, expr: Expr<'ast>) -> TypeExpr<'ast> {
        let span = self.span(6);
        self.type_expr(TypeExprKind::TypeOf(self.alloc(expr)), span)
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn literal(&self, kind: LiteralKind<'ast>) -> Expr<'ast> {
        Expr::Literal(LiteralExpr {
            kind,
            span: self.span(1),
        })
    }

    pub fn int(&self, value: i64) -> Expr<'ast> {
        self.literal(LiteralKind::Int(value))
    }

    pub fn float(&self, value: f64) -> Expr<'ast> {
        self.literal(LiteralKind::Float(value))
    }

    pub fn boolean(&self, value: bool) -> Expr<'ast> {
        self.literal(LiteralKind::Bool(value))
    }

    pub fn string(&self, value: &str) -> Expr<'ast> {
        self.literal(LiteralKind::Str(self.str(value)))
    }

    /// An identifier expression.
    pub fn name(&self, name: &str) -> Expr<'ast> {
        self.generic_name(name, &[])
    }

    /// An identifier with explicit generic arguments: `make<i32>`.
    pub fn generic_name(&self, name: &str, generics: &[TypeExpr<'ast>]) -> Expr<'ast> {
        let ident = self.ident(name);
        Expr::Ident(IdentExpr {
            ident,
            generics: self.slice(generics),
            span: ident.span,
        })
    }

    /// `base::member`
    pub fn path(&self, base: Expr<'ast>, member: &str) -> Expr<'ast> {
        self.generic_path(base, member, &[])
    }

    pub fn generic_path(
        &self,
        base: Expr<'ast>,
        member: &str,
        generics: &[TypeExpr<'ast>],
    ) -> Expr<'ast> {
        let member = self.ident(member);
        Expr::Path(self.alloc(PathExpr {
            base: self.alloc(base),
            member,
            generics: self.slice(generics),
            span: base.span().merge(member.span),
        }))
    }

    /// `base.member`
    pub fn member(&self, base: Expr<'ast>, member: &str) -> Expr<'ast> {
        self.generic_member(base, member, &[])
    }

    pub fn generic_member(
        &self,
        base: Expr<'ast>,
        member: &str,
        generics: &[TypeExpr<'ast>],
    ) -> Expr<'ast> {
        let member = self.ident(member);
        Expr::Member(self.alloc(MemberExpr {
            base: self.alloc(base),
            member,
            generics: self.slice(generics),
            span: base.span().merge(member.span),
        }))
    }

    pub fn call(&self, callee: Expr<'ast>, args: &[Expr<'ast>]) -> Expr<'ast> {
        Expr::Call(self.alloc(CallExpr {
            callee: self.alloc(callee),
            args: self.slice(args),
            span: callee.span(),
        }))
    }

    /// `new T(args)`
    pub fn new_object(&self, ty: TypeExpr<'ast>, args: &[Expr<'ast>]) -> Expr<'ast> {
        Expr::New(self.alloc(NewExpr {
            ty,
            args: self.slice(args),
            span: ty.span,
        }))
    }

    pub fn binary(&self, left: Expr<'ast>, op: BinaryOp, right: Expr<'ast>) -> Expr<'ast> {
        Expr::Binary(self.alloc(BinaryExpr {
            left: self.alloc(left),
            op,
            right: self.alloc(right),
            span: left.span(),
        }))
    }

    pub fn unary(&self, op: UnaryOp, operand: Expr<'ast>) -> Expr<'ast> {
        Expr::Unary(self.alloc(UnaryExpr {
            op,
            operand: self.alloc(operand),
            span: operand.span(),
        }))
    }

    /// `expr as T`
    pub fn cast(&self, expr: Expr<'ast>, target: TypeExpr<'ast>) -> Expr<'ast> {
        Expr::Cast(self.alloc(CastExpr {
            expr: self.alloc(expr),
            target,
            span: expr.span(),
        }))
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn var_decl(
        &self,
        name: &str,
        ty: Option<TypeExpr<'ast>>,
        init: Option<Expr<'ast>>,
        is_mutable: bool,
    ) -> VarDecl<'ast> {
        let name = self.ident(name);
        VarDecl {
            name,
            ty,
            init: init.map(|init| self.alloc(init)),
            is_mutable,
            privacy: Privacy::Public,
            span: name.span,
        }
    }

    /// `let name: ty = init;`
    pub fn let_(
        &self,
        name: &str,
        ty: Option<TypeExpr<'ast>>,
        init: Option<Expr<'ast>>,
    ) -> Stmt<'ast> {
        Stmt::Var(self.var_decl(name, ty, init, false))
    }

    /// `let mut name: ty = init;`
    pub fn let_mut(
        &self,
        name: &str,
        ty: Option<TypeExpr<'ast>>,
        init: Option<Expr<'ast>>,
    ) -> Stmt<'ast> {
        Stmt::Var(self.var_decl(name, ty, init, true))
    }

    pub fn expr_stmt(&self, expr: Expr<'ast>) -> Stmt<'ast> {
        Stmt::Expr(ExprStmt {
            expr: self.alloc(expr),
            span: expr.span(),
        })
    }

    pub fn ret(&self, value: Option<Expr<'ast>>) -> Stmt<'ast> {
        Stmt::Return(ReturnStmt {
            value: value.map(|value| self.alloc(value)),
            span: self.span(6),
        })
    }

    pub fn block(&self, stmts: &[Stmt<'ast>]) -> Block<'ast> {
        Block {
            stmts: self.slice(stmts),
            span: self.span(1),
        }
    }

    pub fn block_stmt(&self, stmts: &[Stmt<'ast>]) -> Stmt<'ast> {
        Stmt::Block(self.block(stmts))
    }

    pub fn if_(
        &self,
        condition: Expr<'ast>,
        then_stmts: &[Stmt<'ast>],
        else_stmts: Option<&[Stmt<'ast>]>,
    ) -> Stmt<'ast> {
        Stmt::If(self.alloc(IfStmt {
            condition: self.alloc(condition),
            then_block: self.block(then_stmts),
            else_block: else_stmts.map(|stmts| self.block(stmts)),
            span: condition.span(),
        }))
    }

    pub fn while_(&self, condition: Expr<'ast>, body: &[Stmt<'ast>]) -> Stmt<'ast> {
        Stmt::While(self.alloc(WhileStmt {
            condition: self.alloc(condition),
            body: self.block(body),
            span: condition.span(),
        }))
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    pub fn function<'b>(&'b self, name: &str) -> FunctionBuilder<'b, 'ast> {
        FunctionBuilder::new(self, self.ident(name))
    }

    /// A constructor; registered under the reserved constructor name.
    pub fn constructor<'b>(&'b self) -> FunctionBuilder<'b, 'ast> {
        let mut builder = FunctionBuilder::new(self, self.ident("constructor"));
        builder.modifiers.is_constructor = true;
        builder
    }

    pub fn class<'b>(&'b self, name: &str) -> ClassBuilder<'b, 'ast> {
        ClassBuilder::new(self, self.ident(name))
    }

    /// `type name = target;`
    pub fn alias(&self, name: &str, target: TypeExpr<'ast>) -> AliasDecl<'ast> {
        let name = self.ident(name);
        AliasDecl {
            name,
            target,
            privacy: Privacy::Public,
            span: name.span,
        }
    }

    pub fn module(&self, name: &str, items: &[Item<'ast>]) -> ModuleDecl<'ast> {
        let name = self.ident(name);
        ModuleDecl {
            name,
            items: self.slice(items),
            privacy: Privacy::Public,
            span: name.span,
        }
    }

    pub fn import(&self, path: &[&str]) -> ImportDecl<'ast> {
        let path: Vec<Ident<'ast>> = path.iter().map(|segment| self.ident(segment)).collect();
        ImportDecl {
            path: self.slice(&path),
            alias: None,
            span: path[0].span,
        }
    }

    /// A global variable.
    pub fn global(
        &self,
        name: &str,
        ty: Option<TypeExpr<'ast>>,
        init: Option<Expr<'ast>>,
    ) -> VarDecl<'ast> {
        self.var_decl(name, ty, init, false)
    }

    pub fn unit(&self, name: &str, items: &[Item<'ast>]) -> SourceUnit<'ast> {
        SourceUnit {
            name: self.str(name),
            items: self.slice(items),
        }
    }
}

/// Fluent construction of a [`FunctionDecl`].
pub struct FunctionBuilder<'b, 'ast> {
    ast: &'b AstBuilder<'ast>,
    name: Ident<'ast>,
    generics: Vec<Ident<'ast>>,
    params: Vec<Param<'ast>>,
    is_variadic: bool,
    return_type: Option<TypeExpr<'ast>>,
    body: Option<Block<'ast>>,
    modifiers: FuncModifiers,
    privacy: Privacy,
    external_name: Option<&'ast str>,
    span: Span,
}

impl<'b, 'ast> FunctionBuilder<'b, 'ast> {
    fn new(ast: &'b AstBuilder<'ast>, name: Ident<'ast>) -> Self {
        Self {
            ast,
            name,
            generics: Vec::new(),
            params: Vec::new(),
            is_variadic: false,
            return_type: None,
            body: None,
            modifiers: FuncModifiers::default(),
            privacy: Privacy::Public,
            external_name: None,
            span: name.span,
        }
    }

    pub fn generic(mut self, name: &str) -> Self {
        self.generics.push(self.ast.ident(name));
        self
    }

    pub fn param(self, name: &str, ty: TypeExpr<'ast>) -> Self {
        self.push_param(name, ty, None)
    }

    pub fn param_with_default(self, name: &str, ty: TypeExpr<'ast>, default: Expr<'ast>) -> Self {
        self.push_param(name, ty, Some(default))
    }

    fn push_param(mut self, name: &str, ty: TypeExpr<'ast>, default: Option<Expr<'ast>>) -> Self {
        let name = self.ast.ident(name);
        self.params.push(Param {
            name,
            ty,
            default: default.map(|default| self.ast.alloc(default)),
            span: name.span,
        });
        self
    }

    pub fn variadic(mut self) -> Self {
        self.is_variadic = true;
        self
    }

    pub fn returns(mut self, ty: TypeExpr<'ast>) -> Self {
        self.return_type = Some(ty);
        self
    }

    pub fn body(mut self, stmts: &[Stmt<'ast>]) -> Self {
        self.body = Some(self.ast.block(stmts));
        self
    }

    pub fn static_(mut self) -> Self {
        self.modifiers.is_static = true;
        self
    }

    pub fn virtual_(mut self) -> Self {
        self.modifiers.is_virtual = true;
        self
    }

    pub fn private(mut self) -> Self {
        self.privacy = Privacy::Private;
        self
    }

    pub fn external(mut self, name: &str) -> Self {
        self.external_name = Some(self.ast.str(name));
        self
    }

    pub fn at(mut self, span: Span) -> Self {
        self.span = span;
        self.name.span = span;
        self
    }

    pub fn build(self) -> FunctionDecl<'ast> {
        FunctionDecl {
            name: self.name,
            generics: self.ast.slice(&self.generics),
            params: self.ast.slice(&self.params),
            is_variadic: self.is_variadic,
            return_type: self.return_type,
            body: self.body,
            modifiers: self.modifiers,
            privacy: self.privacy,
            external_name: self.external_name,
            span: self.span,
        }
    }

    pub fn item(self) -> Item<'ast> {
        Item::Function(self.build())
    }

    pub fn member(self) -> ClassMember<'ast> {
        ClassMember::Method(self.build())
    }
}

/// Fluent construction of a [`ClassDecl`].
pub struct ClassBuilder<'b, 'ast> {
    ast: &'b AstBuilder<'ast>,
    name: Ident<'ast>,
    generics: Vec<Ident<'ast>>,
    parent: Option<TypeExpr<'ast>>,
    members: Vec<ClassMember<'ast>>,
    is_struct: bool,
    extends: bool,
    privacy: Privacy,
    span: Span,
}

impl<'b, 'ast> ClassBuilder<'b, 'ast> {
    fn new(ast: &'b AstBuilder<'ast>, name: Ident<'ast>) -> Self {
        Self {
            ast,
            name,
            generics: Vec::new(),
            parent: None,
            members: Vec::new(),
            is_struct: false,
            extends: false,
            privacy: Privacy::Public,
            span: name.span,
        }
    }

    pub fn generic(mut self, name: &str) -> Self {
        self.generics.push(self.ast.ident(name));
        self
    }

    pub fn parent(mut self, ty: TypeExpr<'ast>) -> Self {
        self.parent = Some(ty);
        self
    }

    pub fn field(self, name: &str, ty: TypeExpr<'ast>) -> Self {
        self.push_field(name, ty, None, false, true)
    }

    /// A mutable instance field with an initial value.
    pub fn field_with_default(self, name: &str, ty: TypeExpr<'ast>, default: Expr<'ast>) -> Self {
        self.push_field(name, ty, Some(default), false, true)
    }

    pub fn static_field(self, name: &str, ty: TypeExpr<'ast>, is_mutable: bool) -> Self {
        self.push_field(name, ty, None, true, is_mutable)
    }

    fn push_field(
        mut self,
        name: &str,
        ty: TypeExpr<'ast>,
        default: Option<Expr<'ast>>,
        is_static: bool,
        is_mutable: bool,
    ) -> Self {
        let name = self.ast.ident(name);
        self.members.push(ClassMember::Field(FieldDecl {
            name,
            ty,
            default: default.map(|default| self.ast.alloc(default)),
            is_static,
            is_mutable,
            privacy: Privacy::Public,
            span: name.span,
        }));
        self
    }

    pub fn method(mut self, decl: FunctionDecl<'ast>) -> Self {
        self.members.push(ClassMember::Method(decl));
        self
    }

    pub fn alias(mut self, name: &str, target: TypeExpr<'ast>) -> Self {
        self.members.push(ClassMember::Alias(self.ast.alias(name, target)));
        self
    }

    pub fn extends(mut self) -> Self {
        self.extends = true;
        self
    }

    pub fn struct_(mut self) -> Self {
        self.is_struct = true;
        self
    }

    pub fn private(mut self) -> Self {
        self.privacy = Privacy::Private;
        self
    }

    pub fn at(mut self, span: Span) -> Self {
        self.span = span;
        self.name.span = span;
        self
    }

    pub fn build(self) -> ClassDecl<'ast> {
        ClassDecl {
            name: self.name,
            generics: self.ast.slice(&self.generics),
            parent: self.parent,
            members: self.ast.slice(&self.members),
            is_struct: self.is_struct,
            extends: self.extends,
            privacy: self.privacy,
            span: self.span,
        }
    }

    pub fn item(self) -> Item<'ast> {
        Item::Class(self.build())
    }
}
