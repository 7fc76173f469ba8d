//! Module-level items: nested modules, imports, aliases, globals and free
//! functions.

use tern_core::{
    CONSTRUCTOR_NAME, CompilationError, FuncId, Result, Type, TypeId, Uuid, VarId,
};
use tern_registry::ir::{self, GlobalVar, Value, ValueKind};
use tern_registry::{AliasDef, Func, FuncFlags, Param};
use tern_syntax::ast::{AliasDecl, FunctionDecl, ImportDecl, Item as AstItem, ModuleDecl, VarDecl};

use super::Transformer;
use crate::scope::{FunctionSet, Item};
use crate::template::{Template, TemplateId, TemplateKind};

impl<'a, 'ast> Transformer<'a, 'ast> {
    pub(crate) fn transform_items(&mut self, items: &'ast [AstItem<'ast>]) -> Result<()> {
        for item in items {
            self.transform_item(item)?;
        }
        Ok(())
    }

    fn transform_item(&mut self, item: &'ast AstItem<'ast>) -> Result<()> {
        match item {
            AstItem::Function(decl) => self.declare_function(decl),
            AstItem::Class(decl) => self.declare_class(decl),
            AstItem::Alias(decl) => self.declare_alias(decl),
            AstItem::Module(decl) => self.transform_module(decl),
            AstItem::Import(decl) => self.transform_import(decl),
            AstItem::Var(decl) => self.transform_global(decl),
        }
    }

    // ========================================================================
    // Modules
    // ========================================================================

    fn transform_module(&mut self, decl: &'ast ModuleDecl<'ast>) -> Result<()> {
        let parent = self.ctx.module();
        let module = self
            .ctx
            .registry
            .add_module(Some(parent), decl.name.name, decl.privacy);
        self.ctx
            .declare(decl.name.name, Item::Module(module), decl.name.span)?;

        self.ctx.push_scope();
        self.ctx.state.module = module;
        let result = self.transform_items(decl.items);
        self.ctx.state.module = parent;
        let scope = self.ctx.pop_scope();
        result?;

        if let Some(scope) = scope {
            self.ctx.set_module_scope(module, scope);
        }
        Ok(())
    }

    fn transform_import(&mut self, decl: &'ast ImportDecl<'ast>) -> Result<()> {
        let path: Vec<&str> = decl.path.iter().map(|segment| segment.name).collect();
        let target = self
            .ctx
            .registry
            .modules()
            .get_path(path.as_slice())
            .filter(|&module| self.ctx.module_scope(module).is_some())
            .ok_or_else(|| CompilationError::Undeclared {
                name: path.join("::"),
                span: decl.span,
            })?;
        let Some(binding) = decl.binding() else {
            return Err(CompilationError::Syntax {
                message: "empty import path".to_string(),
                span: decl.span,
            });
        };

        self.ctx
            .declare(binding.name, Item::Module(target), binding.span)?;
        let module = self.ctx.module();
        self.ctx.registry.add_import(module, target);
        Ok(())
    }

    // ========================================================================
    // Aliases and globals
    // ========================================================================

    fn declare_alias(&mut self, decl: &'ast AliasDecl<'ast>) -> Result<()> {
        let target = self.resolve_type(&decl.target)?;
        let module = self.ctx.module();
        let uuid = Uuid::for_alias(&self.ctx.registry.module_path(module), decl.name.name, decl.span);
        let alias = self.ctx.registry.add_alias(AliasDef {
            uuid,
            name: decl.name.name.to_string(),
            module,
            target,
            privacy: decl.privacy,
            span: decl.span,
        });
        let ty = self.ctx.registry.alias_type(alias);
        self.ctx.declare(decl.name.name, Item::Type(ty), decl.name.span)
    }

    fn transform_global(&mut self, decl: &'ast VarDecl<'ast>) -> Result<()> {
        let (ty, init) = self.typed_initializer(decl)?;
        let id = self.ctx.fresh_var();
        self.declare_variable(decl, id, ty.clone(), true)?;
        self.ir.globals.push(GlobalVar {
            id,
            name: decl.name.name.to_string(),
            ty,
            init,
            is_mutable: decl.is_mutable,
            privacy: decl.privacy,
            span: decl.span,
        });
        Ok(())
    }

    /// Type and converted initializer of a variable declaration.
    pub(crate) fn typed_initializer(&mut self, decl: &'ast VarDecl<'ast>) -> Result<(Type, Option<Value>)> {
        let declared = match decl.ty.as_ref() {
            Some(ty) => Some(self.resolve_type(ty)?),
            None => None,
        };
        let init = match decl.init {
            Some(init) => Some(self.transform_expr(init)?),
            None => None,
        };

        match (declared, init) {
            (Some(ty), Some(init)) => {
                let init = self.coerce(init, &ty)?;
                Ok((ty, Some(init)))
            }
            (Some(ty), None) => Ok((ty, None)),
            (None, Some(init)) if init.ty.is_void() => Err(CompilationError::TypeMismatch {
                expected: "a value".to_string(),
                found: "void".to_string(),
                span: init.span,
            }),
            (None, Some(init)) => Ok((init.ty.clone(), Some(init))),
            (None, None) => Err(CompilationError::Syntax {
                message: format!("variable '{}' needs a type or an initializer", decl.name.name),
                span: decl.span,
            }),
        }
    }

    pub(crate) fn declare_variable(
        &mut self,
        decl: &VarDecl<'_>,
        id: VarId,
        ty: Type,
        is_global: bool,
    ) -> Result<()> {
        let name = decl.name.name.to_string();
        let kind = if is_global {
            ValueKind::Global { id, name }
        } else {
            ValueKind::Local { id, name }
        };
        self.ctx.declare(
            decl.name.name,
            Item::Value(Value::new(kind, ty, decl.name.span)),
            decl.name.span,
        )
    }

    // ========================================================================
    // Functions
    // ========================================================================

    pub(crate) fn declare_function(&mut self, decl: &'ast FunctionDecl<'ast>) -> Result<()> {
        check_free_function_modifiers(decl)?;

        if decl.is_generic() {
            let uuid = self.function_uuid(decl, None);
            let template = self.add_function_template(decl, uuid, None);
            self.ctx.declare(
                decl.name.name,
                Item::Functions(FunctionSet::template(template)),
                decl.name.span,
            )?;
            let state = self.ctx.snapshot();
            self.ctx.cache.template_mut(template).state = state;
            return Ok(());
        }

        let uuid = self.function_uuid(decl, None);
        let func = self.register_signature(decl, None, Vec::new(), uuid)?;
        if let Some(Item::Functions(existing)) = self.ctx.current_scope().get(decl.name.name) {
            let added = self.ctx.registry.func(func);
            let clash = existing
                .funcs
                .iter()
                .find(|&&other| self.ctx.registry.func(other).same_signature(added));
            if let Some(&clash) = clash {
                return Err(CompilationError::Redeclaration {
                    name: decl.name.name.to_string(),
                    span: decl.span,
                    previous: self.ctx.registry.func(clash).span,
                });
            }
        }
        self.ctx.declare(
            decl.name.name,
            Item::Functions(FunctionSet::single(func)),
            decl.name.span,
        )?;
        let state = self.ctx.snapshot();
        self.ctx.record_function(func, decl, state);
        self.transform_body(func, decl)
    }

    /// Store a generic function or method for later instantiation. The
    /// declaration state is filled in by the caller once the name is
    /// visible.
    pub(crate) fn add_function_template(
        &mut self,
        decl: &'ast FunctionDecl<'ast>,
        uuid: Uuid,
        parent: Option<TypeId>,
    ) -> TemplateId {
        let template = Template {
            uuid,
            name: decl.name.name.to_string(),
            kind: TemplateKind::Function(decl),
            module: self.ctx.module(),
            parent,
            privacy: decl.privacy,
            state: self.ctx.snapshot(),
            span: decl.span,
        };
        self.ctx.cache.add_template(template)
    }

    /// Resolve the signature of `decl` in the current scope and register the
    /// function. Instance methods get the receiver as `self`.
    pub(crate) fn register_signature(
        &mut self,
        decl: &'ast FunctionDecl<'ast>,
        parent: Option<TypeId>,
        generics: Vec<Type>,
        uuid: Uuid,
    ) -> Result<FuncId> {
        let class_ty = parent.map(|parent| self.ctx.registry.type_of(parent));
        let is_constructor = decl.modifiers.is_constructor;

        let (name, ret) = match (&class_ty, is_constructor) {
            (Some(class_ty), true) => (CONSTRUCTOR_NAME, class_ty.clone()),
            _ => {
                let ret = match decl.return_type.as_ref() {
                    Some(ty) => self.resolve_type(ty)?,
                    None => Type::Void,
                };
                (decl.name.name, ret)
            }
        };

        let mut func = Func::new(uuid, name, self.ctx.module(), ret, decl.span);
        func.parent = parent;
        func.generics = generics;
        func.privacy = decl.privacy;
        func.external_name = decl.external_name.map(str::to_string);
        if decl.modifiers.is_static || is_constructor {
            func.flags |= FuncFlags::STATIC;
        }
        if is_constructor {
            func.flags |= FuncFlags::CONSTRUCTOR;
        }
        if decl.is_variadic {
            func.flags |= FuncFlags::VARIADIC;
        }

        if let Some(class_ty) = class_ty
            && !func.is_static()
        {
            func.params.push(Param::new("self", class_ty, decl.name.span));
        }
        for param in decl.params {
            let ty = self.resolve_type(&param.ty)?;
            let resolved = Param::new(param.name.name, ty, param.span);
            func.params.push(if param.default.is_some() {
                resolved.with_default()
            } else {
                resolved
            });
        }

        let id = self.ctx.registry.add_func(func);
        self.ir.functions.push(id);
        Ok(id)
    }

    /// Transform the body of `func` with its parameters in scope.
    pub(crate) fn transform_body(&mut self, func: FuncId, decl: &'ast FunctionDecl<'ast>) -> Result<()> {
        let Some(body) = decl.body.as_ref() else {
            return Ok(());
        };

        let saved = self.ctx.state.function.replace(func);
        let result = self.scoped(|t| t.function_body(func, body));
        self.ctx.state.function = saved;

        let block = result?;
        self.ctx.registry.func_mut(func).body = Some(block);
        Ok(())
    }

    fn function_body(&mut self, func: FuncId, body: &'ast tern_syntax::ast::Block<'ast>) -> Result<ir::Block> {
        let (params, is_constructor, ret) = {
            let func = self.ctx.registry.func(func);
            (func.params.clone(), func.is_constructor(), func.ret.clone())
        };
        for (index, param) in params.into_iter().enumerate() {
            let value = Value::new(
                ValueKind::Param {
                    index,
                    name: param.name.clone(),
                },
                param.ty,
                param.span,
            );
            self.ctx.declare(&param.name, Item::Value(value), param.span)?;
        }

        let mut stmts = Vec::new();
        if is_constructor {
            let id = self.ctx.fresh_var();
            let value = Value::new(
                ValueKind::Local {
                    id,
                    name: "self".to_string(),
                },
                ret.clone(),
                body.span,
            );
            self.ctx.declare("self", Item::Value(value), body.span)?;
            stmts.push(ir::Stmt::Let {
                id,
                name: "self".to_string(),
                ty: ret,
                init: None,
                is_mutable: true,
            });
        }

        let block = self.transform_stmts(body)?;
        stmts.extend(block.stmts);
        Ok(ir::Block {
            stmts,
            span: body.span,
        })
    }
}

fn check_free_function_modifiers(decl: &FunctionDecl<'_>) -> Result<()> {
    let reason = if decl.modifiers.is_constructor {
        Some("constructors must be declared inside a class")
    } else if decl.modifiers.is_virtual {
        Some("only methods can be virtual")
    } else if decl.modifiers.is_static {
        Some("only methods can be static")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(CompilationError::InvalidModifier {
            name: decl.name.name.to_string(),
            reason,
            span: decl.span,
        }),
        None => Ok(()),
    }
}


#[cfg(test)]
mod tests {
    use crate::test_support::*;
    use tern_core::{CompilationError, ErrorKind, Type};
    use tern_registry::ir::Stmt;
    use tern_syntax::ast::Item;

    #[test]
    fn nested_module_members_are_reached_by_path() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let area = ast
            .function("area")
            .returns(ast.ty("f64"))
            .body(&[ast.ret(Some(ast.float(1.0)))])
            .item();
        let point = ast.class("Point").field("x", ast.ty("f64")).item();
        let geo = Item::Module(ast.module("geo", &[area, point]));
        let origin = Item::Var(ast.global(
            "origin",
            Some(ast.path_ty(&[("geo", &[]), ("Point", &[])])),
            None,
        ));
        let call = ast.call(ast.path(ast.name("geo"), "area"), &[]);
        let sample = ast
            .function("sample")
            .returns(ast.ty("f64"))
            .body(&[ast.ret(Some(call))])
            .item();
        let mut ctx = context();
        let ir = transform(&mut ctx, &ast.unit("main", &[geo, origin, sample])).unwrap();

        let area = ctx.registry.func(funcs_named(&ctx, "area")[0]);
        assert_eq!(ctx.registry.module_path(area.module), "main::geo");
        assert_eq!(ir.globals[0].ty.as_defined().unwrap().id, types_named(&ctx, "Point")[0]);
    }

    #[test]
    fn imports_bind_the_last_segment() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let twice = ast
            .function("twice")
            .param("x", ast.ty("i32"))
            .returns(ast.ty("i32"))
            .item();
        let mut ctx = context();
        transform(&mut ctx, &ast.unit("lib", &[twice])).unwrap();

        let import = Item::Import(ast.import(&["lib"]));
        let call = ast.call(ast.path(ast.name("lib"), "twice"), &[ast.int(2)]);
        let sample = ast.function("sample").body(&[ast.expr_stmt(call)]).item();
        transform(&mut ctx, &ast.unit("main", &[import, sample])).unwrap();

        let main = ctx.registry.modules().get_path(&["main"]).unwrap();
        let lib = ctx.registry.modules().get_path(&["lib"]).unwrap();
        assert_eq!(ctx.registry.modules().imports(main), vec![lib]);
    }

    #[test]
    fn unknown_import_is_undeclared() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let import = Item::Import(ast.import(&["missing", "deeper"]));
        let mut ctx = context();
        let err = transform(&mut ctx, &ast.unit("main", &[import])).unwrap_err();
        assert!(matches!(err, CompilationError::Undeclared { ref name, .. } if name == "missing::deeper"));
        assert_eq!(err.kind(), ErrorKind::VariableError);
    }

    #[test]
    fn aliases_stand_for_their_target() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let alias = Item::Alias(ast.alias("Num", ast.ty("f64")));
        let x = Item::Var(ast.global("x", Some(ast.ty("Num")), Some(ast.int(1))));
        let mut ctx = context();
        let ir = transform(&mut ctx, &ast.unit("main", &[alias, x])).unwrap();

        let global = &ir.globals[0];
        assert!(global.ty.is(&Type::f64()));
        assert!(global.init.as_ref().unwrap().is_cast());
    }

    #[test]
    fn globals_infer_their_type() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let x = Item::Var(ast.global("x", None, Some(ast.float(1.5))));
        let mut ctx = context();
        let ir = transform(&mut ctx, &ast.unit("main", &[x])).unwrap();
        assert!(ir.globals[0].ty.is(&Type::f64()));
    }

    #[test]
    fn globals_need_a_type_or_initializer() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let x = Item::Var(ast.global("x", None, None));
        let mut ctx = context();
        let err = transform(&mut ctx, &ast.unit("main", &[x])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SyntaxError);
    }

    #[test]
    fn void_initializer_is_rejected() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let nothing = ast.function("nothing").body(&[]).item();
        let x = Item::Var(ast.global("x", None, Some(ast.call(ast.name("nothing"), &[]))));
        let mut ctx = context();
        let err = transform(&mut ctx, &ast.unit("main", &[nothing, x])).unwrap_err();
        assert!(matches!(err, CompilationError::TypeMismatch { .. }));
    }

    #[test]
    fn free_function_modifiers() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let cases = [
            ast.function("f").static_().item(),
            ast.function("f").virtual_().item(),
            ast.constructor().item(),
        ];
        for item in cases {
            let mut ctx = context();
            let err = transform(&mut ctx, &ast.unit("main", &[item])).unwrap_err();
            assert!(matches!(err, CompilationError::InvalidModifier { .. }), "{:?}", err);
            assert_eq!(err.kind(), ErrorKind::ArgumentError);
        }
    }

    #[test]
    fn overloads_share_a_name_but_not_a_signature() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let by_int = ast.function("show").param("x", ast.ty("i32")).item();
        let by_float = ast.function("show").param("x", ast.ty("f64")).item();
        let mut ctx = context();
        transform(&mut ctx, &ast.unit("main", &[by_int, by_float])).unwrap();
        assert_eq!(funcs_named(&ctx, "show").len(), 2);

        let again = ast.function("show").param("y", ast.ty("i32")).returns(ast.ty("i32")).item();
        let mut ctx = context();
        let err = transform(&mut ctx, &ast.unit("main", &[by_int, again])).unwrap_err();
        assert!(matches!(err, CompilationError::Redeclaration { ref name, .. } if name == "show"));
    }

    #[test]
    fn functions_and_values_cannot_share_a_name() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let f = ast.function("f").item();
        let x = Item::Var(ast.global("f", None, Some(ast.int(1))));
        let mut ctx = context();
        let err = transform(&mut ctx, &ast.unit("main", &[f, x])).unwrap_err();
        assert!(matches!(err, CompilationError::Redeclaration { .. }));
    }

    #[test]
    fn external_functions_keep_their_link_name() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let puts = ast.function("puts").param("x", ast.ty("i32")).external("c_puts").item();
        let mut ctx = context();
        transform(&mut ctx, &ast.unit("main", &[puts])).unwrap();
        let func = ctx.registry.func(funcs_named(&ctx, "puts")[0]);
        assert_eq!(func.external_name.as_deref(), Some("c_puts"));
        assert!(func.body.is_none());
    }

    #[test]
    fn parameters_are_in_scope_in_the_body() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let f = ast
            .function("f")
            .param("x", ast.ty("i32"))
            .returns(ast.ty("i32"))
            .body(&[ast.ret(Some(ast.name("x")))])
            .item();
        let mut ctx = context();
        transform(&mut ctx, &ast.unit("main", &[f])).unwrap();
        let body = ctx.registry.func(funcs_named(&ctx, "f")[0]).body.as_ref().unwrap();
        assert!(matches!(body.stmts[0], Stmt::Return(Some(_))));
    }
}
