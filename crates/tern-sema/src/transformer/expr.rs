//! Expressions.
//!
//! Identifiers and `::` paths resolve through the scope stack and module
//! exports; `.` accesses resolve fields on the value's class. Operators on
//! numeric operands become [`Callee::Operator`] calls, operators on class
//! operands call the reserved operator method (`$op_add`, ...) of the left
//! operand's class.

use ordered_float::OrderedFloat;
use tern_core::{CompilationError, Result, Span, Type, TypeId};
use tern_registry::ir::{Call, Callee, Constant, Operator, Value, ValueKind};
use tern_syntax::ast::{
    BinaryExpr, BinaryOp, CastExpr, Expr, IdentExpr, LiteralExpr, LiteralKind, MemberExpr,
    PathExpr, TypeExpr, UnaryExpr, UnaryOp,
};

use super::Transformer;
use crate::scope::Item;

impl<'a, 'ast> Transformer<'a, 'ast> {
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn transform_expr(&mut self, expr: &Expr<'ast>) -> Result<Value> {
        match expr {
            Expr::Literal(literal) => self.literal(literal),
            Expr::Ident(ident) => self.ident_value(ident),
            Expr::Path(path) => self.path_value(path),
            Expr::Member(member) => self.member_value(member),
            Expr::Call(call) => self.transform_call(call),
            Expr::New(new) => self.transform_new(new),
            Expr::Binary(binary) => self.binary(binary),
            Expr::Unary(unary) => self.unary(unary),
            Expr::Cast(cast) => self.cast(cast),
        }
    }

    fn literal(&self, literal: &LiteralExpr<'ast>) -> Result<Value> {
        let span = literal.span;
        let (constant, ty) = match literal.kind {
            LiteralKind::Int(value) => (Constant::Int(value), Type::i32()),
            LiteralKind::Float(value) => (Constant::Float(OrderedFloat(value)), Type::f64()),
            LiteralKind::Bool(value) => (Constant::Bool(value), Type::bool()),
            LiteralKind::Str(value) => {
                let ty = self
                    .ctx
                    .string_type
                    .clone()
                    .ok_or_else(|| CompilationError::Undeclared {
                        name: crate::prelude::STRING_CLASS.to_string(),
                        span,
                    })?;
                (Constant::Str(value.to_string()), ty)
            }
        };
        Ok(Value::constant(constant, ty, span))
    }

    // ========================================================================
    // Names and paths
    // ========================================================================

    fn ident_value(&mut self, ident: &IdentExpr<'ast>) -> Result<Value> {
        let name = ident.ident.name;
        let item = self
            .ctx
            .lookup(name)
            .cloned()
            .ok_or_else(|| CompilationError::Undeclared {
                name: name.to_string(),
                span: ident.span,
            })?;
        self.item_value(item, name, ident.generics, ident.span)
    }

    /// The value an item stands for.
    fn item_value(
        &mut self,
        item: Item,
        name: &str,
        generics: &'ast [TypeExpr<'ast>],
        span: Span,
    ) -> Result<Value> {
        match item {
            Item::Value(value) if generics.is_empty() => Ok(Value { span, ..value }),
            Item::Value(_) => Err(CompilationError::GenericArity {
                name: name.to_string(),
                expected: 0,
                got: generics.len(),
                span,
            }),
            Item::Functions(set) => {
                let candidates = self.function_candidates(&set, name, generics, span)?;
                let func = self.single_function(name, &candidates, span)?;
                Ok(self.function_value(func, span))
            }
            other => Err(CompilationError::WrongKind {
                name: name.to_string(),
                required: "value",
                found: other.kind_name(),
                span,
            }),
        }
    }

    fn path_value(&mut self, path: &PathExpr<'ast>) -> Result<Value> {
        let name = path.member.name;
        match self.path_base(path.base)? {
            Item::Type(ty) => {
                let Some(class) = ty.as_defined().map(|defined| defined.id) else {
                    return Err(self.unknown_member(&ty, name, path.span));
                };
                if let Some((owner, index)) = self.ctx.registry.lookup_field(class, name) {
                    let field = &self.ctx.registry.defined(owner).fields[index];
                    if !field.is_static {
                        return Err(CompilationError::NonStaticAccess {
                            name: name.to_string(),
                            span: path.span,
                        });
                    }
                    return Ok(Value::new(
                        ValueKind::StaticField { owner, index },
                        field.ty.clone(),
                        path.span,
                    ));
                }

                let methods = self.method_candidates(class, name, path.generics, path.span)?;
                if !methods.is_empty() {
                    let statics: Vec<_> = methods
                        .into_iter()
                        .filter(|&method| self.ctx.registry.func(method).is_static())
                        .collect();
                    if statics.is_empty() {
                        return Err(CompilationError::NonStaticAccess {
                            name: name.to_string(),
                            span: path.span,
                        });
                    }
                    let func = self.single_function(name, &statics, path.span)?;
                    return Ok(self.function_value(func, path.span));
                }

                if self.ctx.registry.lookup_alias(class, name).is_some() {
                    return Err(CompilationError::WrongKind {
                        name: name.to_string(),
                        required: "value",
                        found: "type",
                        span: path.span,
                    });
                }
                Err(self.unknown_member(&ty, name, path.span))
            }
            base => {
                let item = self.path_member(&base, name, path.member.span)?;
                self.item_value(item, name, path.generics, path.span)
            }
        }
    }

    /// Resolve the left side of `::` to a module or type.
    pub(crate) fn path_base(&mut self, expr: &Expr<'ast>) -> Result<Item> {
        let (item, name, span) = match expr {
            Expr::Ident(ident) => {
                let name = ident.ident.name;
                let item = self
                    .ctx
                    .lookup(name)
                    .cloned()
                    .ok_or_else(|| CompilationError::Undeclared {
                        name: name.to_string(),
                        span: ident.span,
                    })?;
                let item = self.apply_generics(item, name, ident.generics, ident.span)?;
                (item, name, ident.span)
            }
            Expr::Path(path) => {
                let base = self.path_base(path.base)?;
                let name = path.member.name;
                let item = self.path_member(&base, name, path.member.span)?;
                let item = self.apply_generics(item, name, path.generics, path.span)?;
                (item, name, path.span)
            }
            other => {
                return Err(CompilationError::WrongKind {
                    name: "expression".to_string(),
                    required: "module or type",
                    found: "value",
                    span: other.span(),
                });
            }
        };

        match item {
            Item::Module(_) | Item::Type(_) => Ok(item),
            other => Err(CompilationError::WrongKind {
                name: name.to_string(),
                required: "module or type",
                found: other.kind_name(),
                span,
            }),
        }
    }

    fn member_value(&mut self, member: &MemberExpr<'ast>) -> Result<Value> {
        let base = self.transform_expr(member.base)?;
        let name = member.member.name;
        let Some(class) = class_of(&base.ty) else {
            return Err(self.unknown_member(&base.ty, name, member.span));
        };

        if let Some((owner, index)) = self.ctx.registry.lookup_field(class, name) {
            let field = &self.ctx.registry.defined(owner).fields[index];
            if field.is_static {
                return Err(CompilationError::StaticAccess {
                    name: name.to_string(),
                    span: member.span,
                });
            }
            let ty = field.ty.clone();
            return Ok(Value::new(
                ValueKind::Field {
                    base: Box::new(base),
                    owner,
                    index,
                },
                ty,
                member.span,
            ));
        }

        if !self.ctx.registry.lookup_methods(class, name).is_empty() {
            return Err(CompilationError::WrongKind {
                name: name.to_string(),
                required: "field",
                found: "method",
                span: member.span,
            });
        }
        Err(self.unknown_member(&base.ty, name, member.span))
    }

    pub(crate) fn function_value(&self, func: tern_core::FuncId, span: Span) -> Value {
        let ty = self.ctx.registry.func(func).signature_type();
        Value::new(ValueKind::Function(func), ty, span)
    }

    pub(crate) fn unknown_member(&self, owner: &Type, member: &str, span: Span) -> CompilationError {
        CompilationError::UnknownMember {
            owner: self.pretty(owner),
            member: member.to_string(),
            span,
        }
    }

    // ========================================================================
    // Operators
    // ========================================================================

    fn binary(&mut self, binary: &BinaryExpr<'ast>) -> Result<Value> {
        let left = self.transform_expr(binary.left)?;
        let right = self.transform_expr(binary.right)?;
        let span = binary.span;
        let op = binary.op;

        if let Some(class) = class_of(&left.ty) {
            return self.operator_method(class, op.method_name(), left, vec![right], span);
        }

        let mismatch = |t: &Self, left: &Value, right: &Value| CompilationError::NoMatchingOverload {
            name: op.to_string(),
            args: t.ctx.registry.pretty_list(&[left.ty.clone(), right.ty.clone()]),
            span,
        };

        let (Some(left_kind), Some(right_kind)) = (left.ty.as_numeric(), right.ty.as_numeric()) else {
            return Err(mismatch(self, &left, &right));
        };

        if op.is_logical() {
            if !left_kind.is_bool() || !right_kind.is_bool() {
                return Err(mismatch(self, &left, &right));
            }
            return Ok(operator_call(Operator::Binary(op), vec![left, right], Type::bool(), span));
        }

        let equality = matches!(op, BinaryOp::Eq | BinaryOp::Ne);
        if (left_kind.is_bool() || right_kind.is_bool()) && !(equality && left_kind == right_kind) {
            return Err(mismatch(self, &left, &right));
        }
        if op.is_integer_only() && (left_kind.is_float() || right_kind.is_float()) {
            return Err(mismatch(self, &left, &right));
        }

        // Unequal numeric operands: the right one is cast toward the left.
        let right = if left_kind == right_kind {
            right
        } else if left_kind.can_cast_to(right_kind) || right_kind.can_cast_to(left_kind) {
            right.cast_to(left.ty.clone())
        } else {
            return Err(mismatch(self, &left, &right));
        };

        let ty = if op.is_comparison() {
            Type::bool()
        } else {
            left.ty.clone()
        };
        Ok(operator_call(Operator::Binary(op), vec![left, right], ty, span))
    }

    fn unary(&mut self, unary: &UnaryExpr<'ast>) -> Result<Value> {
        let operand = self.transform_expr(unary.operand)?;
        let span = unary.span;
        let op = unary.op;

        if let Some(class) = class_of(&operand.ty) {
            return self.operator_method(class, op.method_name(), operand, Vec::new(), span);
        }

        let legal = match (op, operand.ty.as_numeric()) {
            (UnaryOp::Not, Some(kind)) => kind.is_bool(),
            (UnaryOp::Neg, Some(kind)) => !kind.is_bool(),
            (UnaryOp::BitNot, Some(kind)) => !kind.is_bool() && !kind.is_float(),
            (_, None) => false,
        };
        if !legal {
            return Err(CompilationError::NoMatchingOverload {
                name: op.to_string(),
                args: self.pretty(&operand.ty),
                span,
            });
        }
        let ty = operand.ty.clone();
        Ok(operator_call(Operator::Unary(op), vec![operand], ty, span))
    }

    /// Call the operator method `name` on the receiver's class.
    fn operator_method(
        &mut self,
        class: TypeId,
        name: &str,
        receiver: Value,
        args: Vec<Value>,
        span: Span,
    ) -> Result<Value> {
        let candidates: Vec<_> = self
            .ctx
            .registry
            .lookup_methods(class, name)
            .into_iter()
            .filter(|&method| !self.ctx.registry.func(method).is_static())
            .collect();
        if candidates.is_empty() {
            let mut types = vec![receiver.ty.clone()];
            types.extend(args.iter().map(|arg| arg.ty.clone()));
            return Err(CompilationError::NoMatchingOverload {
                name: name.to_string(),
                args: self.ctx.registry.pretty_list(&types),
                span,
            });
        }
        let (func, args) = self.select_overload(name, &candidates, Some(receiver), args, span)?;
        let ret = self.ctx.registry.func(func).ret.clone();
        Ok(Value::call(
            Call {
                callee: Callee::Function(func),
                args,
                is_initialization: false,
            },
            ret,
            span,
        ))
    }

    // ========================================================================
    // Casts
    // ========================================================================

    fn cast(&mut self, cast: &CastExpr<'ast>) -> Result<Value> {
        let value = self.transform_expr(cast.expr)?;
        let target = self.resolve_type(&cast.target)?;
        if value.ty.is(&target) {
            return Ok(value);
        }
        if self.ctx.registry.cast_chain(&value.ty, &target).is_some() {
            return Ok(Value {
                span: cast.span,
                ..value.cast_to(target)
            });
        }
        Err(CompilationError::InvalidCast {
            from: self.pretty(&value.ty),
            to: self.pretty(&target),
            span: cast.span,
        })
    }
}

/// The class a value of type `ty` gives access to, looking through one
/// reference.
pub(crate) fn class_of(ty: &Type) -> Option<TypeId> {
    match ty.unalias() {
        Type::Defined(defined) => Some(defined.id),
        Type::Reference(inner) => inner.as_defined().map(|defined| defined.id),
        _ => None,
    }
}

fn operator_call(operator: Operator, args: Vec<Value>, ty: Type, span: Span) -> Value {
    Value::call(
        Call {
            callee: Callee::Operator(operator),
            args,
            is_initialization: false,
        },
        ty,
        span,
    )
}


#[cfg(test)]
mod tests {
    use crate::test_support::*;
    use tern_core::{CompilationError, ErrorKind, NumericKind, Type};
    use tern_registry::ir::{Callee, Operator, Stmt, Value, ValueKind};
    use tern_syntax::ast::{BinaryOp, Expr, Item, UnaryOp};

    fn value_of<'ast>(ast: &AstBuilder<'ast>, items: &[Item<'ast>], expr: Expr<'ast>) -> tern_core::Result<Value> {
        let mut all = items.to_vec();
        all.push(ast.function("sample").body(&[ast.expr_stmt(expr)]).item());
        let mut ctx = context();
        transform(&mut ctx, &ast.unit("main", &all))?;
        let sample = funcs_named(&ctx, "sample")[0];
        match &ctx.registry.func(sample).body.as_ref().unwrap().stmts[0] {
            Stmt::Expr(value) => Ok(value.clone()),
            other => panic!("unexpected statement {:?}", other),
        }
    }

    #[test]
    fn literal_types() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        assert!(value_of(&ast, &[], ast.int(1)).unwrap().ty.is(&Type::i32()));
        assert!(value_of(&ast, &[], ast.float(1.0)).unwrap().ty.is(&Type::f64()));
        assert!(value_of(&ast, &[], ast.boolean(true)).unwrap().ty.is(&Type::bool()));
        let string = value_of(&ast, &[], ast.string("s")).unwrap();
        assert!(string.ty.as_defined().is_some());
    }

    #[test]
    fn mixed_numeric_operands_cast_right_toward_left() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let value = value_of(&ast, &[], ast.binary(ast.float(1.0), BinaryOp::Add, ast.int(2))).unwrap();
        assert!(value.ty.is(&Type::f64()));
        let call = value.as_call().unwrap();
        assert_eq!(call.callee, Callee::Operator(Operator::Binary(BinaryOp::Add)));
        assert!(!call.args[0].is_cast());
        assert!(call.args[1].is_cast());
        assert!(call.args[1].ty.is(&Type::f64()));
    }

    #[test]
    fn comparisons_yield_bool() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let value = value_of(&ast, &[], ast.binary(ast.int(1), BinaryOp::Lt, ast.int(2))).unwrap();
        assert!(value.ty.is(&Type::bool()));
        let value = value_of(&ast, &[], ast.binary(ast.boolean(true), BinaryOp::Eq, ast.boolean(false))).unwrap();
        assert!(value.ty.is(&Type::bool()));
    }

    #[test]
    fn operator_operand_rules() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let cases = [
            ast.binary(ast.int(1), BinaryOp::And, ast.boolean(true)),
            ast.binary(ast.boolean(true), BinaryOp::Add, ast.boolean(true)),
            ast.binary(ast.float(1.0), BinaryOp::Mod, ast.int(2)),
            ast.unary(UnaryOp::Not, ast.int(1)),
            ast.unary(UnaryOp::Neg, ast.boolean(true)),
            ast.unary(UnaryOp::BitNot, ast.float(1.0)),
        ];
        for expr in cases {
            let err = value_of(&ast, &[], expr).unwrap_err();
            assert!(matches!(err, CompilationError::NoMatchingOverload { .. }), "{:?}", err);
        }
        let value = value_of(&ast, &[], ast.unary(UnaryOp::Neg, ast.float(1.0))).unwrap();
        assert!(value.ty.is(&Type::f64()));
    }

    #[test]
    fn class_operands_call_operator_methods() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let value = value_of(&ast, &[], ast.binary(ast.string("a"), BinaryOp::Add, ast.string("b"))).unwrap();
        let call = value.as_call().unwrap();
        assert!(matches!(call.callee, Callee::Function(_)));
        assert_eq!(call.args.len(), 2);
        assert!(value.ty.as_defined().is_some());

        let err = value_of(&ast, &[], ast.binary(ast.string("a"), BinaryOp::Mul, ast.string("b"))).unwrap_err();
        assert!(matches!(err, CompilationError::NoMatchingOverload { ref name, .. } if name == "$op_mul"));
    }

    #[test]
    fn explicit_casts() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let value = value_of(&ast, &[], ast.cast(ast.float(1.5), ast.ty("i64"))).unwrap();
        assert!(value.is_cast());
        assert!(value.ty.is(&Type::numeric(NumericKind::I64)));

        let same = value_of(&ast, &[], ast.cast(ast.int(1), ast.ty("i32"))).unwrap();
        assert!(!same.is_cast());

        let err = value_of(&ast, &[], ast.cast(ast.int(1), ast.ty("bool"))).unwrap_err();
        assert!(matches!(err, CompilationError::InvalidCast { .. }));
        assert_eq!(err.kind(), ErrorKind::TypeError);
    }

    #[test]
    fn upcast_through_the_hierarchy() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let a = ast.class("A").item();
        let b = ast.class("B").parent(ast.ty("A")).item();
        let c = ast.class("C").parent(ast.ty("B")).item();
        let value = Item::Var(ast.global("c", Some(ast.ty("C")), None));
        let items = [a, b, c, value];

        let up = value_of(&ast, &items, ast.cast(ast.name("c"), ast.ty("A"))).unwrap();
        assert!(up.is_cast());

        let a = Item::Var(ast.global("a", Some(ast.ty("A")), None));
        let err = value_of(&ast, &[items[0], items[1], a], ast.cast(ast.name("a"), ast.ty("B"))).unwrap_err();
        assert!(matches!(err, CompilationError::InvalidCast { .. }));
    }

    #[test]
    fn field_access() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let point = ast
            .class("Point")
            .field("x", ast.ty("f64"))
            .static_field("origin", ast.ty("i32"), false)
            .method(ast.function("len").returns(ast.ty("f64")).build())
            .item();
        let p = Item::Var(ast.global("p", Some(ast.ty("Point")), None));
        let items = [point, p];

        let x = value_of(&ast, &items, ast.member(ast.name("p"), "x")).unwrap();
        assert!(matches!(x.kind, ValueKind::Field { index: 0, .. }));
        assert!(x.ty.is(&Type::f64()));

        let origin = value_of(&ast, &items, ast.path(ast.name("Point"), "origin")).unwrap();
        assert!(matches!(origin.kind, ValueKind::StaticField { index: 1, .. }));

        let err = value_of(&ast, &items, ast.path(ast.name("Point"), "x")).unwrap_err();
        assert!(matches!(err, CompilationError::NonStaticAccess { .. }));

        let err = value_of(&ast, &items, ast.member(ast.name("p"), "origin")).unwrap_err();
        assert!(matches!(err, CompilationError::StaticAccess { .. }));

        let err = value_of(&ast, &items, ast.member(ast.name("p"), "len")).unwrap_err();
        assert!(matches!(err, CompilationError::WrongKind { required: "field", found: "method", .. }));

        let err = value_of(&ast, &items, ast.member(ast.name("p"), "z")).unwrap_err();
        assert!(matches!(err, CompilationError::UnknownMember { ref member, .. } if member == "z"));
        assert_eq!(err.kind(), ErrorKind::VariableError);
    }

    #[test]
    fn static_methods_as_values() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let math = ast
            .class("Math")
            .method(ast.function("twice").static_().param("x", ast.ty("i32")).returns(ast.ty("i32")).build())
            .item();
        let value = value_of(&ast, &[math], ast.path(ast.name("Math"), "twice")).unwrap();
        assert!(matches!(value.kind, ValueKind::Function(_)));
        assert!(value.ty.is(&Type::function(vec![Type::i32()], Type::i32(), false)));
    }

    #[test]
    fn value_base_is_rejected_for_paths() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let x = Item::Var(ast.global("x", None, Some(ast.int(1))));
        let err = value_of(&ast, &[x], ast.path(ast.name("x"), "y")).unwrap_err();
        assert!(matches!(
            err,
            CompilationError::WrongKind { required: "module or type", found: "value", .. }
        ));
    }

    #[test]
    fn types_are_not_values() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let shape = ast.class("Shape").item();
        let err = value_of(&ast, &[shape], ast.name("Shape")).unwrap_err();
        assert!(matches!(err, CompilationError::WrongKind { required: "value", found: "type", .. }));
    }
}
