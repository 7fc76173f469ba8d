//! Type resolution for converting AST type expressions to semantic types.
//!
//! Resolution is a method family on [`Transformer`] because `typeof(expr)`
//! needs the expression transformer and generic arguments need the
//! instantiation machinery.
//!
//! ## Features
//!
//! - Built-in types (`void`, `bool`, `i8`..`i64`, `u8`..`u64`, `f32`, `f64`)
//!   short-circuit before any lookup
//! - Per-node memo keyed by [`NodeId`](tern_core::NodeId) and generic
//!   environment
//! - Plain and qualified names (`lib::Vec`, `Shape::Unit`) through scopes,
//!   module exports and nested class aliases
//! - Reference and function types, composed recursively
//! - Generic instantiation through the instantiation cache, with exact arity
//! - Aliases replaced by their targets; they never escape the resolver
//! - Private types rejected outside their declaring module

use tern_core::{CompilationError, ModuleId, NumericKind, Result, Span, Type};
use tern_syntax::ast::{Path, TypeExpr, TypeExprKind};

use crate::scope::Item;
use crate::transformer::Transformer;

impl<'a, 'ast> Transformer<'a, 'ast> {
    /// Resolve a type expression.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn resolve_type(&mut self, expr: &TypeExpr<'ast>) -> Result<Type> {
        if let Some(ty) = builtin_type(expr) {
            return Ok(ty);
        }
        if let Some(ty) = self.ctx.memoized_type(expr.id) {
            return Ok(ty.clone());
        }

        let ty = match &expr.kind {
            TypeExprKind::TypeOf(value) => self.transform_expr(value)?.ty,
            TypeExprKind::Reference(pointee) => Type::reference(self.resolve_type(pointee)?),
            TypeExprKind::Function(function) => {
                let params = function
                    .params
                    .iter()
                    .map(|param| self.resolve_type(param))
                    .collect::<Result<Vec<_>>>()?;
                let ret = match function.ret {
                    Some(ret) => self.resolve_type(ret)?,
                    None => Type::Void,
                };
                Type::function(params, ret, function.is_variadic)
            }
            TypeExprKind::Named(path) => self.resolve_named(path)?,
        };

        let ty = ty.unalias().clone();
        self.ctx.memoize_type(expr.id, ty.clone());
        Ok(ty)
    }

    fn resolve_named(&mut self, path: &Path<'ast>) -> Result<Type> {
        let Some((first, rest)) = path.segments.split_first() else {
            return Err(CompilationError::internal("empty type path", path.span));
        };

        let name = first.ident.name;
        let item = self
            .ctx
            .lookup(name)
            .cloned()
            .ok_or_else(|| CompilationError::Undeclared {
                name: name.to_string(),
                span: first.ident.span,
            })?;
        let mut item = self.apply_generics(item, name, first.generics, first.ident.span)?;
        let mut last = first;

        for segment in rest {
            let member = self.path_member(&item, segment.ident.name, segment.ident.span)?;
            item = self.apply_generics(member, segment.ident.name, segment.generics, segment.ident.span)?;
            last = segment;
        }

        match item {
            Item::Type(ty) => Ok(ty),
            other => Err(CompilationError::WrongKind {
                name: last.ident.name.to_string(),
                required: "type",
                found: other.kind_name(),
                span: path.span,
            }),
        }
    }

    /// Bind generic arguments to a looked-up item: generic classes are
    /// instantiated, everything else must not receive arguments.
    pub(crate) fn apply_generics(
        &mut self,
        item: Item,
        name: &str,
        generics: &'ast [TypeExpr<'ast>],
        span: Span,
    ) -> Result<Item> {
        match item {
            Item::Template(template) => {
                if generics.is_empty() {
                    return Err(CompilationError::GenericArity {
                        name: name.to_string(),
                        expected: self.ctx.cache.template(template).arity(),
                        got: 0,
                        span,
                    });
                }
                let args = self.resolve_generic_args(generics)?;
                Ok(Item::Type(self.instantiate_class(template, args, span)?))
            }
            Item::Type(_) if !generics.is_empty() => Err(CompilationError::GenericArity {
                name: name.to_string(),
                expected: 0,
                got: generics.len(),
                span,
            }),
            other => Ok(other),
        }
    }

    pub(crate) fn resolve_generic_args(&mut self, generics: &'ast [TypeExpr<'ast>]) -> Result<Vec<Type>> {
        generics.iter().map(|arg| self.resolve_type(arg)).collect()
    }

    /// Look `name` up inside a module or type.
    pub(crate) fn path_member(&mut self, base: &Item, name: &str, span: Span) -> Result<Item> {
        match base {
            Item::Module(module) => {
                let module = *module;
                let Some(scope) = self.ctx.module_scope(module) else {
                    return Err(CompilationError::Undeclared {
                        name: self.ctx.registry.modules().qualified_name(module, name),
                        span,
                    });
                };
                let item = scope
                    .get(name)
                    .cloned()
                    .ok_or_else(|| CompilationError::UnknownMember {
                        owner: self.ctx.registry.module_path(module),
                        member: name.to_string(),
                        span,
                    })?;
                self.check_visibility(&item, module, name, span)?;
                Ok(item)
            }
            Item::Type(ty) => {
                let alias = ty
                    .as_defined()
                    .and_then(|defined| self.ctx.registry.lookup_alias(defined.id, name));
                match alias {
                    Some(alias) => Ok(Item::Type(self.ctx.registry.alias_type(alias))),
                    None => Err(self.unknown_member(ty, name, span)),
                }
            }
            other => Err(CompilationError::WrongKind {
                name: name.to_string(),
                required: "module or type",
                found: other.kind_name(),
                span,
            }),
        }
    }

    /// Reject private types reached through a module path from outside the
    /// declaring module.
    fn check_visibility(&self, item: &Item, owner: ModuleId, name: &str, span: Span) -> Result<()> {
        let registry = &self.ctx.registry;
        let is_private = match item {
            Item::Type(Type::Alias(alias)) => registry.alias(alias.id).privacy.is_private(),
            Item::Type(Type::Defined(defined)) => registry.defined(defined.id).privacy.is_private(),
            Item::Template(template) => self.ctx.cache.template(*template).privacy.is_private(),
            _ => false,
        };
        if is_private && !registry.can_access_private(owner, self.ctx.module()) {
            tracing::debug!(name, module = %registry.module_path(owner), "rejected private type");
            return Err(CompilationError::PrivateType {
                name: name.to_string(),
                module: registry.module_path(owner),
                span,
            });
        }
        Ok(())
    }
}

/// Built-in scalar and void types, resolved without any lookup.
fn builtin_type(expr: &TypeExpr<'_>) -> Option<Type> {
    let TypeExprKind::Named(path) = &expr.kind else {
        return None;
    };
    let [segment] = path.segments else {
        return None;
    };
    if !segment.generics.is_empty() {
        return None;
    }
    match segment.ident.name {
        "void" => Some(Type::Void),
        name => NumericKind::from_name(name).map(Type::numeric),
    }
}
