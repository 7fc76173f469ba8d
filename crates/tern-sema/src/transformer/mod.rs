//! AST to typed IR transformation.
//!
//! The [`Transformer`] walks one [`SourceUnit`] depth-first and produces an
//! [`IrModule`]. Resolution is spread over several `impl` blocks:
//!
//! - `items` - modules, imports, aliases, globals and free functions
//! - `stmt` - statements and return checking
//! - `expr` - expressions, operators and casts
//! - [`crate::type_resolver`] - type expressions
//! - [`crate::call`] - callee, overload and default argument resolution
//! - [`crate::class_builder`] - classes, fields, methods and vtables
//! - [`crate::template`] - generic instantiation
//!
//! Every failure aborts the unit: the error is returned and no IR is
//! produced.

mod expr;
mod items;
mod stmt;

pub(crate) use expr::class_of;

use tern_core::{CompilationError, Privacy, Result, Type, Uuid};
use tern_registry::ir::{IrModule, Value};
use tern_syntax::ast::{FunctionDecl, SourceUnit};

use crate::context::{Context, FunctionState};

/// Transforms units against a shared [`Context`].
pub struct Transformer<'a, 'ast> {
    pub(crate) ctx: &'a mut Context<'ast>,
    pub(crate) ir: IrModule,
}

impl<'a, 'ast> Transformer<'a, 'ast> {
    /// Transform a whole unit into a new top-level module.
    #[tracing::instrument(skip(ctx, unit), fields(module = unit.name))]
    pub fn transform_unit(ctx: &'a mut Context<'ast>, unit: &SourceUnit<'ast>) -> Result<IrModule> {
        let module = ctx.registry.add_module(None, unit.name, Privacy::Public);
        if unit.name == ctx.options.entry_module {
            ctx.registry.set_entry_module(module);
        }
        let state = FunctionState::new(module, ctx.module_stack());
        let mut transformer = Transformer {
            ctx,
            ir: IrModule::new(unit.name, module),
        };

        let exports = transformer.with_state(state, |t| {
            t.transform_items(unit.items)?;
            Ok(t.ctx.current_scope().clone())
        })?;
        transformer.ctx.set_module_scope(module, exports);

        tracing::debug!(
            functions = transformer.ir.functions.len(),
            types = transformer.ir.types.len(),
            globals = transformer.ir.globals.len(),
            "transformed unit"
        );
        Ok(transformer.ir)
    }

    /// Run `f` in `state`, restoring the current state afterwards.
    pub(crate) fn with_state<R>(
        &mut self,
        state: FunctionState,
        f: impl FnOnce(&mut Self) -> Result<R>,
    ) -> Result<R> {
        let saved = self.ctx.replace_state(state);
        let result = f(self);
        self.ctx.replace_state(saved);
        result
    }

    /// Run `f` inside a fresh innermost scope.
    pub(crate) fn scoped<R>(&mut self, f: impl FnOnce(&mut Self) -> Result<R>) -> Result<R> {
        self.ctx.push_scope();
        let result = f(self);
        self.ctx.pop_scope();
        result
    }

    /// Use `value` where `target` is required, inserting a cast when the
    /// cast chain allows one.
    pub(crate) fn coerce(&self, value: Value, target: &Type) -> Result<Value> {
        if value.ty.is(target) {
            return Ok(value);
        }
        if self.ctx.registry.cast_chain(&value.ty, target).is_some() {
            return Ok(value.cast_to(target.clone()));
        }
        Err(CompilationError::TypeMismatch {
            expected: self.pretty(target),
            found: self.pretty(&value.ty),
            span: value.span,
        })
    }

    pub(crate) fn pretty(&self, ty: &Type) -> String {
        self.ctx.registry.pretty(ty)
    }

    /// Declaration identity of a function or method.
    pub(crate) fn function_uuid(&self, decl: &FunctionDecl<'_>, parent: Option<tern_core::TypeId>) -> Uuid {
        let module = self.ctx.registry.module_path(self.ctx.module());
        let name = match parent {
            Some(parent) => format!("{}::{}", self.ctx.registry.defined(parent).name, decl.name.name),
            None => decl.name.name.to_string(),
        };
        Uuid::for_function(&module, &name, decl.span)
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::*;
    use tern_core::{CompilationError, ErrorKind};
    use tern_syntax::ast::Item;

    #[test]
    fn entry_module_is_registered() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let unit = ast.unit("main", &[]);
        let mut ctx = context();
        let ir = transform(&mut ctx, &unit).unwrap();

        assert_eq!(ir.name, "main");
        assert_eq!(ctx.registry.entry_module(), Some(ir.module));
        assert!(ctx.module_scope(ir.module).is_some());
    }

    #[test]
    fn failure_aborts_the_unit() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let unit = ast.unit("main", &[Item::Var(ast.global("x", None, Some(ast.name("missing"))))]);
        let mut ctx = context();
        let err = transform(&mut ctx, &unit).unwrap_err();

        assert!(matches!(err, CompilationError::Undeclared { ref name, .. } if name == "missing"));
        assert_eq!(err.kind(), ErrorKind::VariableError);
        assert!(ctx.module_scope(ctx.registry.modules().get_path(&["main"]).unwrap()).is_none());
    }

    #[test]
    fn state_is_restored_after_unit() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let unit = ast.unit("main", &[Item::Var(ast.global("x", None, Some(ast.int(1))))]);
        let mut ctx = context();
        let before = ctx.module();
        transform(&mut ctx, &unit).unwrap();

        assert_eq!(ctx.module(), before);
        assert!(ctx.lookup("x").is_none());
    }
}
