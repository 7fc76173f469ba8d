//! Call resolution.
//!
//! Resolves the callee of a call expression to an overload set (or a
//! function-typed value), selects one overload and completes the argument
//! list.
//!
//! ## Algorithm
//!
//! 1. Collect candidates: the functions bound to the callee name, the
//!    methods visible on a class, or the constructors of a class; generic
//!    candidates are instantiated with the explicit generic arguments
//! 2. Drop candidates that cannot take the argument count
//! 3. Drop candidates whose parameters the arguments cannot reach by cast
//! 4. Rank the rest by cast count, see [`ranking`]
//! 5. Insert casts, then evaluate omitted default arguments in the scope
//!    the function was declared in

mod ranking;

pub use ranking::{ArgConversion, OverloadMatch};

use tern_core::{CONSTRUCTOR_NAME, CompilationError, FuncId, Result, Span, Type, TypeId};
use tern_registry::ir::{Call, Callee, Value};
use tern_syntax::ast::{CallExpr, Expr, NewExpr, TypeExpr};

use crate::scope::{FunctionSet, Item};
use crate::transformer::{Transformer, class_of};

impl<'a, 'ast> Transformer<'a, 'ast> {
    /// Transform a call expression.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub(crate) fn transform_call(&mut self, call: &CallExpr<'ast>) -> Result<Value> {
        match call.callee {
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
                self.call_item(item, name, ident.generics, ident.span, call)
            }
            Expr::Path(path) => {
                let name = path.member.name;
                match self.path_base(path.base)? {
                    Item::Type(ty) => self.call_static(&ty, name, path.generics, path.span, call),
                    base => {
                        let item = self.path_member(&base, name, path.member.span)?;
                        self.call_item(item, name, path.generics, path.span, call)
                    }
                }
            }
            Expr::Member(member) => {
                let name = member.member.name;
                let receiver = self.transform_expr(member.base)?;
                let Some(class) = class_of(&receiver.ty) else {
                    return Err(self.unknown_member(&receiver.ty, name, member.span));
                };
                if self.ctx.registry.lookup_field(class, name).is_some() {
                    let callee = self.transform_expr(call.callee)?;
                    return self.indirect_call(callee, call);
                }

                let methods = self.method_candidates(class, name, member.generics, member.span)?;
                if methods.is_empty() {
                    return Err(self.unknown_member(&receiver.ty, name, member.span));
                }
                let instance: Vec<_> = methods
                    .into_iter()
                    .filter(|&method| !self.ctx.registry.func(method).is_static())
                    .collect();
                if instance.is_empty() {
                    return Err(CompilationError::StaticAccess {
                        name: name.to_string(),
                        span: member.span,
                    });
                }
                let args = self.transform_args(call.args)?;
                self.direct_call(name, &instance, Some(receiver), args, call.span)
            }
            other => {
                let callee = self.transform_expr(other)?;
                self.indirect_call(callee, call)
            }
        }
    }

    /// Transform `new T(args)`: select a constructor of `T`.
    pub(crate) fn transform_new(&mut self, new: &NewExpr<'ast>) -> Result<Value> {
        let ty = self.resolve_type(&new.ty)?;
        let Some(class) = ty.as_defined().map(|defined| defined.id) else {
            return Err(CompilationError::NotCallable {
                name: self.pretty(&ty),
                found: ty.kind_name(),
                span: new.span,
            });
        };

        let name = self.pretty(&ty);
        let constructors = self.ctx.registry.own_methods(class, CONSTRUCTOR_NAME);
        let args = self.transform_args(new.args)?;
        if constructors.is_empty() {
            return Err(self.no_matching_overload(&name, None, &args, new.span));
        }
        let (func, args) = self.select_overload(&name, &constructors, None, args, new.span)?;
        Ok(Value::call(
            Call {
                callee: Callee::Function(func),
                args,
                is_initialization: true,
            },
            ty,
            new.span,
        ))
    }

    fn transform_args(&mut self, args: &'ast [Expr<'ast>]) -> Result<Vec<Value>> {
        args.iter().map(|arg| self.transform_expr(arg)).collect()
    }

    /// Call whatever a plain or module-qualified name resolved to.
    fn call_item(
        &mut self,
        item: Item,
        name: &str,
        generics: &'ast [TypeExpr<'ast>],
        span: Span,
        call: &CallExpr<'ast>,
    ) -> Result<Value> {
        match item {
            Item::Functions(set) => {
                let candidates = self.function_candidates(&set, name, generics, span)?;
                let args = self.transform_args(call.args)?;
                self.direct_call(name, &candidates, None, args, call.span)
            }
            Item::Value(value) if generics.is_empty() => self.indirect_call(Value { span, ..value }, call),
            Item::Value(_) => Err(CompilationError::GenericArity {
                name: name.to_string(),
                expected: 0,
                got: generics.len(),
                span,
            }),
            other => Err(CompilationError::NotCallable {
                name: name.to_string(),
                found: other.kind_name(),
                span,
            }),
        }
    }

    /// `Type::name(args)`: static methods, or a static field of function type.
    fn call_static(
        &mut self,
        ty: &Type,
        name: &str,
        generics: &'ast [TypeExpr<'ast>],
        span: Span,
        call: &CallExpr<'ast>,
    ) -> Result<Value> {
        let Some(class) = ty.as_defined().map(|defined| defined.id) else {
            return Err(self.unknown_member(ty, name, span));
        };
        if self.ctx.registry.lookup_field(class, name).is_some() {
            let callee = self.transform_expr(call.callee)?;
            return self.indirect_call(callee, call);
        }

        let methods = self.method_candidates(class, name, generics, span)?;
        if methods.is_empty() {
            return Err(self.unknown_member(ty, name, span));
        }
        let statics: Vec<_> = methods
            .into_iter()
            .filter(|&method| self.ctx.registry.func(method).is_static())
            .collect();
        if statics.is_empty() {
            return Err(CompilationError::NonStaticAccess {
                name: name.to_string(),
                span,
            });
        }
        let args = self.transform_args(call.args)?;
        self.direct_call(name, &statics, None, args, call.span)
    }

    fn direct_call(
        &mut self,
        name: &str,
        candidates: &[FuncId],
        receiver: Option<Value>,
        args: Vec<Value>,
        span: Span,
    ) -> Result<Value> {
        let (func, args) = self.select_overload(name, candidates, receiver, args, span)?;
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

    /// Call through a value of function type.
    fn indirect_call(&mut self, callee: Value, call: &CallExpr<'ast>) -> Result<Value> {
        let Some(signature) = callee.ty.as_function().cloned() else {
            return Err(CompilationError::NotCallable {
                name: self.pretty(&callee.ty),
                found: "value",
                span: callee.span,
            });
        };

        let args = self.transform_args(call.args)?;
        let count = args.len();
        let params = signature.params.len();
        if count < params || (!signature.is_variadic && count > params) {
            return Err(CompilationError::NoMatchingOverload {
                name: self.pretty(&callee.ty),
                args: self.ctx.registry.pretty_list(&arg_types(&args)),
                span: call.span,
            });
        }

        let args = args
            .into_iter()
            .enumerate()
            .map(|(index, arg)| match signature.params.get(index) {
                Some(param) => self.coerce(arg, param),
                None => Ok(arg),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Value::call(
            Call {
                callee: Callee::Indirect(Box::new(callee)),
                args,
                is_initialization: false,
            },
            signature.ret.clone(),
            call.span,
        ))
    }

    // ========================================================================
    // Candidates
    // ========================================================================

    /// Concrete candidates of an overload set. Explicit generic arguments
    /// select and instantiate the templates of matching arity.
    pub(crate) fn function_candidates(
        &mut self,
        set: &FunctionSet,
        name: &str,
        generics: &'ast [TypeExpr<'ast>],
        span: Span,
    ) -> Result<Vec<FuncId>> {
        if generics.is_empty() {
            if set.funcs.is_empty()
                && let Some(&template) = set.templates.first()
            {
                return Err(CompilationError::GenericArity {
                    name: name.to_string(),
                    expected: self.ctx.cache.template(template).arity(),
                    got: 0,
                    span,
                });
            }
            return Ok(set.funcs.clone());
        }

        let args = self.resolve_generic_args(generics)?;
        self.instantiate_matching(&set.templates, name, args, span)
    }

    /// Methods named `name` visible on `class`, with generic methods
    /// instantiated when generic arguments are given.
    pub(crate) fn method_candidates(
        &mut self,
        class: TypeId,
        name: &str,
        generics: &'ast [TypeExpr<'ast>],
        span: Span,
    ) -> Result<Vec<FuncId>> {
        let templates = self.ctx.method_templates(class, name);
        if generics.is_empty() {
            let methods = self.ctx.registry.lookup_methods(class, name);
            if methods.is_empty()
                && let Some(&template) = templates.first()
            {
                return Err(CompilationError::GenericArity {
                    name: name.to_string(),
                    expected: self.ctx.cache.template(template).arity(),
                    got: 0,
                    span,
                });
            }
            return Ok(methods);
        }

        if templates.is_empty() && self.ctx.registry.lookup_methods(class, name).is_empty() {
            return Ok(Vec::new());
        }
        let args = self.resolve_generic_args(generics)?;
        self.instantiate_matching(&templates, name, args, span)
    }

    fn instantiate_matching(
        &mut self,
        templates: &[crate::template::TemplateId],
        name: &str,
        args: Vec<Type>,
        span: Span,
    ) -> Result<Vec<FuncId>> {
        let mut instances = Vec::new();
        for &template in templates {
            if self.ctx.cache.template(template).arity() == args.len() {
                instances.push(self.instantiate_function(template, args.clone(), span)?);
            }
        }
        if instances.is_empty() {
            let expected = templates
                .first()
                .map(|&template| self.ctx.cache.template(template).arity())
                .unwrap_or(0);
            return Err(CompilationError::GenericArity {
                name: name.to_string(),
                expected,
                got: args.len(),
                span,
            });
        }
        Ok(instances)
    }

    /// The only candidate, for a function named without being called.
    pub(crate) fn single_function(&self, name: &str, candidates: &[FuncId], span: Span) -> Result<FuncId> {
        match candidates {
            [func] => Ok(*func),
            [] => Err(CompilationError::NoMatchingOverload {
                name: name.to_string(),
                args: String::new(),
                span,
            }),
            _ => Err(CompilationError::AmbiguousCall {
                name: name.to_string(),
                candidates: candidates
                    .iter()
                    .map(|&func| self.ctx.registry.pretty_func(func))
                    .collect::<Vec<_>>()
                    .join(" and "),
                span,
            }),
        }
    }

    // ========================================================================
    // Overload selection
    // ========================================================================

    /// Select the best candidate for the arguments and return it with the
    /// final argument list: receiver first, casts inserted, omitted
    /// defaults evaluated.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub(crate) fn select_overload(
        &mut self,
        name: &str,
        candidates: &[FuncId],
        receiver: Option<Value>,
        args: Vec<Value>,
        span: Span,
    ) -> Result<(FuncId, Vec<Value>)> {
        // The receiver is matched against `self` like any other argument.
        let mut types: Vec<Type> = receiver.iter().map(|receiver| receiver.ty.clone()).collect();
        types.extend(arg_types(&args));
        let viable: Vec<OverloadMatch> = candidates
            .iter()
            .filter_map(|&func| ranking::try_match(&self.ctx.registry, func, &types))
            .collect();

        if viable.is_empty() {
            let supplied = args.len() + usize::from(receiver.is_some());
            if let [func] = candidates
                && let Some(missing) = self.missing_param(*func, supplied)
            {
                return Err(CompilationError::MissingArgument {
                    function: self.ctx.registry.pretty_func(*func),
                    param: missing,
                    span,
                });
            }
            return Err(self.no_matching_overload(name, receiver.as_ref(), &args, span));
        }

        let best = ranking::find_best_match(&self.ctx.registry, name, viable, span)?;
        tracing::debug!(
            name,
            selected = %self.ctx.registry.pretty_func(best.func),
            casts = best.casts,
            "selected overload"
        );

        let mut supplied: Vec<Value> = receiver.into_iter().collect();
        supplied.extend(args);
        let finished = self.finish_args(&best, supplied, span)?;
        Ok((best.func, finished))
    }

    /// Name of the first parameter a call with `supplied` arguments leaves
    /// without value, when it has no default.
    fn missing_param(&self, func: FuncId, supplied: usize) -> Option<String> {
        let func = self.ctx.registry.func(func);
        if supplied >= func.required_arity() {
            return None;
        }
        func.params.get(supplied).map(|param| param.name.clone())
    }

    fn finish_args(&mut self, selected: &OverloadMatch, supplied: Vec<Value>, span: Span) -> Result<Vec<Value>> {
        let params = self.ctx.registry.func(selected.func).params.clone();
        let count = supplied.len();

        let mut args = Vec::with_capacity(params.len().max(count));
        for (index, arg) in supplied.into_iter().enumerate() {
            let arg = match (selected.conversions.get(index), params.get(index)) {
                (Some(ArgConversion::Cast(_)), Some(param)) => arg.cast_to(param.ty.clone()),
                _ => arg,
            };
            args.push(arg);
        }
        for index in count..params.len() {
            args.push(self.default_argument(selected.func, index, span)?);
        }
        Ok(args)
    }

    /// Evaluate the default value of parameter `index` of `func` in the
    /// scope the function was declared in.
    fn default_argument(&mut self, func: FuncId, index: usize, span: Span) -> Result<Value> {
        let function = self.ctx.registry.pretty_func(func);
        let (param, offset) = {
            let func = self.ctx.registry.func(func);
            (func.params[index].clone(), usize::from(func.has_receiver()))
        };
        let missing = || CompilationError::MissingArgument {
            function: function.clone(),
            param: param.name.clone(),
            span,
        };

        let default = self
            .ctx
            .function_decl(func)
            .and_then(|decl| decl.params.get(index.checked_sub(offset)?))
            .and_then(|decl_param| decl_param.default);
        let (Some(default), Some(state)) = (default, self.ctx.function_state(func).cloned()) else {
            return Err(missing());
        };

        let state = crate::context::FunctionState {
            function: None,
            ..state
        };
        let value = self.with_state(state, |t| t.transform_expr(default))?;
        if value.ty.is(&param.ty) {
            return Ok(value);
        }
        if self.ctx.registry.cast_chain(&value.ty, &param.ty).is_some() {
            return Ok(value.cast_to(param.ty));
        }
        Err(CompilationError::DefaultValueMismatch {
            function,
            param: param.name,
            expected: self.pretty(&param.ty),
            found: self.pretty(&value.ty),
            span: self.ctx.registry.func(func).span,
        })
    }

    fn no_matching_overload(&self, name: &str, receiver: Option<&Value>, args: &[Value], span: Span) -> CompilationError {
        let mut types: Vec<Type> = receiver.map(|receiver| receiver.ty.clone()).into_iter().collect();
        types.extend(arg_types(args));
        CompilationError::NoMatchingOverload {
            name: name.to_string(),
            args: self.ctx.registry.pretty_list(&types),
            span,
        }
    }
}

fn arg_types(args: &[Value]) -> Vec<Type> {
    args.iter().map(|arg| arg.ty.clone()).collect()
}
