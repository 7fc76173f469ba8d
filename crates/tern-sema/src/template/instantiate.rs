//! Realizing templates for concrete generic arguments.

use tern_core::{CompilationError, FuncId, Result, Span, Type, TypeId, Uuid};
use tern_syntax::ast::{ClassDecl, FunctionDecl};

use super::{TemplateId, TemplateKind};
use crate::context::FunctionState;
use crate::scope::Item;
use crate::transformer::Transformer;

impl<'a, 'ast> Transformer<'a, 'ast> {
    /// The instance of a generic class for `args`, created on first use.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub(crate) fn instantiate_class(&mut self, template: TemplateId, args: Vec<Type>, span: Span) -> Result<Type> {
        let (decl, uuid, name, state) = self.class_template(template, span)?;
        check_arity(&name, decl.generics.len(), args.len(), span)?;
        if let Some(existing) = self.ctx.cache.find_type(uuid, &args) {
            return Ok(existing.clone());
        }

        self.enter_instantiation(&name, span)?;
        let result = self.with_state(state, |t| {
            t.ctx.enter_env();
            let id = t.register_class(decl, args.clone(), uuid);
            t.build_class_members(id, decl)?;
            Ok(t.ctx.registry.type_of(id))
        });
        self.ctx.depth -= 1;

        if result.is_err() {
            // A half-built instance must not satisfy later lookups.
            self.ctx.cache.remove_type(uuid, &args);
        }
        let ty = result?;
        tracing::debug!(
            template = %name,
            instance = %self.pretty(&ty),
            mangled = %self.ctx.registry.mangle(&ty),
            "instantiated class"
        );
        Ok(ty)
    }

    /// The instance of a generic function or method for `args`, created on
    /// first use. Method instances belong to the class that declared the
    /// template.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub(crate) fn instantiate_function(
        &mut self,
        template: TemplateId,
        args: Vec<Type>,
        span: Span,
    ) -> Result<FuncId> {
        let (decl, uuid, name, parent, state) = self.function_template(template, span)?;
        check_arity(&name, decl.generics.len(), args.len(), span)?;
        if let Some(existing) = self.ctx.cache.find_function(uuid, parent, &args) {
            return Ok(existing);
        }

        self.enter_instantiation(&name, span)?;
        let result = self.with_state(state, |t| {
            t.ctx.enter_env();
            t.scoped(|t| {
                for (param, ty) in decl.generics.iter().zip(&args) {
                    t.ctx.declare(param.name, Item::Type(ty.clone()), param.span)?;
                }
                let func = t.register_signature(decl, parent, args.clone(), uuid)?;
                t.ctx.cache.insert_function(uuid, parent, args.clone(), func);
                let state = t.ctx.snapshot();
                t.ctx.record_function(func, decl, state);
                t.transform_body(func, decl)?;
                Ok(func)
            })
        });
        self.ctx.depth -= 1;

        if result.is_err() {
            self.ctx.cache.remove_function(uuid, parent, &args);
        }
        let func = result?;
        tracing::debug!(
            template = %name,
            instance = %self.ctx.registry.pretty_func(func),
            mangled = %self.ctx.registry.mangled_func_name(func),
            "instantiated function"
        );
        Ok(func)
    }

    fn enter_instantiation(&mut self, name: &str, span: Span) -> Result<()> {
        let limit = self.ctx.options.max_instantiation_depth;
        if self.ctx.depth >= limit {
            return Err(CompilationError::InstantiationDepth {
                name: name.to_string(),
                limit,
                span,
            });
        }
        self.ctx.depth += 1;
        Ok(())
    }

    #[allow(clippy::type_complexity)]
    fn class_template(
        &self,
        template: TemplateId,
        span: Span,
    ) -> Result<(&'ast ClassDecl<'ast>, Uuid, String, FunctionState)> {
        let template = self.ctx.cache.template(template);
        match template.kind {
            TemplateKind::Class(decl) => Ok((decl, template.uuid, template.name.clone(), template.state.clone())),
            TemplateKind::Function(_) => Err(CompilationError::internal(
                format!("'{}' is not a class template", template.name),
                span,
            )),
        }
    }

    #[allow(clippy::type_complexity)]
    fn function_template(
        &self,
        template: TemplateId,
        span: Span,
    ) -> Result<(&'ast FunctionDecl<'ast>, Uuid, String, Option<TypeId>, FunctionState)> {
        let template = self.ctx.cache.template(template);
        match template.kind {
            TemplateKind::Function(decl) => Ok((
                decl,
                template.uuid,
                template.name.clone(),
                template.parent,
                template.state.clone(),
            )),
            TemplateKind::Class(_) => Err(CompilationError::internal(
                format!("'{}' is not a function template", template.name),
                span,
            )),
        }
    }
}

fn check_arity(name: &str, expected: usize, got: usize, span: Span) -> Result<()> {
    if expected == got {
        return Ok(());
    }
    Err(CompilationError::GenericArity {
        name: name.to_string(),
        expected,
        got,
        span,
    })
}
