//! Class registration and vtable construction.
//!
//! A class is registered before its members so members can refer to it.
//! Members are then processed in declaration order: aliases, fields and
//! method signatures first, every method body afterwards, so bodies see
//! every sibling.
//!
//! ## Virtual dispatch
//!
//! A class starts from a copy of its parent's vtable. An instance method
//! with the name and parameter types of an inherited vtable entry overrides
//! it and reuses its slot; a method declared `virtual` that overrides
//! nothing is appended. The first new slot of a class is therefore the size
//! of its parent's vtable. Codegen adds
//! [`VTABLE_RESERVED_SLOTS`](tern_core::VTABLE_RESERVED_SLOTS) to every slot.
//!
//! ## `extends` classes
//!
//! A class marked `extends` reopens an existing type: it may override and
//! add non-virtual methods but not declare fields, aliases or new virtual
//! methods.

use tern_core::{CONSTRUCTOR_NAME, CompilationError, FuncId, Result, Type, TypeId, Uuid};
use tern_registry::ir;
use tern_registry::{AliasDef, DefinedType, Field, Func, FuncFlags};
use tern_syntax::ast::{AliasDecl, ClassDecl, ClassMember, FieldDecl, FunctionDecl, TypeExpr};

use crate::scope::Item;
use crate::template::{Template, TemplateKind};
use crate::transformer::Transformer;

/// Special members seen while registering a class.
#[derive(Debug, Default, Clone, Copy)]
struct ClassTraits {
    /// Any user-declared constructor (suppresses the implicit one).
    has_constructor: bool,
}

impl<'a, 'ast> Transformer<'a, 'ast> {
    /// Declare a class in the current scope. Generic classes are stored as
    /// templates and realized on first use.
    pub(crate) fn declare_class(&mut self, decl: &'ast ClassDecl<'ast>) -> Result<()> {
        let module = self.ctx.module();
        let uuid = Uuid::for_type(&self.ctx.registry.module_path(module), decl.name.name, decl.span);

        if decl.is_generic() {
            let template = self.ctx.cache.add_template(Template {
                uuid,
                name: decl.name.name.to_string(),
                kind: TemplateKind::Class(decl),
                module,
                parent: None,
                privacy: decl.privacy,
                state: self.ctx.snapshot(),
                span: decl.span,
            });
            self.ctx
                .declare(decl.name.name, Item::Template(template), decl.name.span)?;
            let state = self.ctx.snapshot();
            self.ctx.cache.template_mut(template).state = state;
            return Ok(());
        }

        let id = self.register_class(decl, Vec::new(), uuid);
        let ty = self.ctx.registry.type_of(id);
        self.ctx.declare(decl.name.name, Item::Type(ty), decl.name.span)?;
        self.build_class_members(id, decl)
    }

    /// Add the registry entry of a class (or of one instantiation of a
    /// generic class) without any members.
    pub(crate) fn register_class(&mut self, decl: &ClassDecl<'ast>, generics: Vec<Type>, uuid: Uuid) -> TypeId {
        let mut defined = DefinedType::new(uuid, decl.name.name, self.ctx.module(), decl.span);
        defined.generics = generics;
        defined.is_struct = decl.is_struct;
        defined.privacy = decl.privacy;

        let id = self.ctx.registry.add_type(defined);
        self.ir.types.push(id);
        if decl.is_generic() {
            let ty = self.ctx.registry.type_of(id);
            self.ctx.cache.insert_type(ty);
        }
        id
    }

    /// Register the members of `id` and transform its method bodies.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub(crate) fn build_class_members(&mut self, id: TypeId, decl: &'ast ClassDecl<'ast>) -> Result<()> {
        let saved = self.ctx.state.class.replace(id);
        let result = self.scoped(|t| t.class_members(id, decl));
        self.ctx.state.class = saved;
        result?;

        let defined = self.ctx.registry.defined(id);
        tracing::debug!(
            class = %self.pretty(&self.ctx.registry.type_of(id)),
            fields = defined.fields.len(),
            methods = defined.methods.len(),
            vtable = defined.vtable.len(),
            "built class"
        );
        Ok(())
    }

    fn class_members(&mut self, id: TypeId, decl: &'ast ClassDecl<'ast>) -> Result<()> {
        let generics = self.ctx.registry.defined(id).generics.clone();
        for (param, ty) in decl.generics.iter().zip(generics) {
            self.ctx.declare(param.name, Item::Type(ty), param.span)?;
        }
        if let Some(parent) = decl.parent.as_ref() {
            self.set_parent(id, decl, parent)?;
        }

        let mut traits = ClassTraits::default();
        let mut pending = Vec::new();
        for member in decl.members {
            match member {
                ClassMember::Alias(alias) => self.class_alias(id, decl, alias)?,
                ClassMember::Field(field) => self.class_field(id, decl, field)?,
                ClassMember::Method(method) => {
                    traits.has_constructor |= method.modifiers.is_constructor;
                    if let Some(func) = self.register_method(id, decl, method)? {
                        pending.push((func, method));
                    }
                }
            }
        }
        if !traits.has_constructor {
            self.implicit_constructor(id, decl);
        }

        let state = self.ctx.snapshot();
        for &(func, method) in &pending {
            self.ctx.record_function(func, method, state.clone());
        }
        for (func, method) in pending {
            self.transform_body(func, method)?;
        }
        Ok(())
    }

    fn set_parent(&mut self, id: TypeId, decl: &ClassDecl<'ast>, parent: &TypeExpr<'ast>) -> Result<()> {
        let parent_ty = self.resolve_type(parent)?;
        let parent_id = match parent_ty.as_defined() {
            Some(defined) if defined.id != id && !self.ctx.registry.ancestry(defined.id).contains(&id) => {
                defined.id
            }
            _ => {
                return Err(CompilationError::InvalidParent {
                    name: self.pretty(&parent_ty),
                    span: parent.span,
                });
            }
        };

        let vtable = self.ctx.registry.defined(parent_id).vtable.clone();
        tracing::debug!(
            class = decl.name.name,
            parent = %self.pretty(&parent_ty),
            inherited_slots = vtable.len(),
            "resolved parent"
        );
        let defined = self.ctx.registry.defined_mut(id);
        defined.parent = Some(parent_ty);
        defined.vtable = vtable;
        Ok(())
    }

    fn class_alias(&mut self, id: TypeId, decl: &ClassDecl<'ast>, alias: &AliasDecl<'ast>) -> Result<()> {
        if decl.extends {
            return Err(extends_violation(decl, "type aliases", alias.span));
        }
        let target = self.resolve_type(&alias.target)?;
        let module = self.ctx.module();
        let qualified = format!("{}::{}", decl.name.name, alias.name.name);
        let alias_id = self.ctx.registry.add_alias(AliasDef {
            uuid: Uuid::for_alias(&self.ctx.registry.module_path(module), &qualified, alias.span),
            name: alias.name.name.to_string(),
            module,
            target,
            privacy: alias.privacy,
            span: alias.span,
        });
        self.ctx
            .registry
            .defined_mut(id)
            .aliases
            .push((alias.name.name.to_string(), alias_id));

        let ty = self.ctx.registry.alias_type(alias_id);
        self.ctx.declare(alias.name.name, Item::Type(ty), alias.name.span)
    }

    fn class_field(&mut self, id: TypeId, decl: &ClassDecl<'ast>, field: &FieldDecl<'ast>) -> Result<()> {
        if decl.extends {
            return Err(extends_violation(decl, "new fields", field.span));
        }
        if field.is_static && field.is_mutable {
            return Err(CompilationError::InvalidModifier {
                name: field.name.name.to_string(),
                reason: "a static field cannot be mutable",
                span: field.span,
            });
        }
        if let Some(index) = self.ctx.registry.defined(id).field_index(field.name.name) {
            return Err(CompilationError::Redeclaration {
                name: field.name.name.to_string(),
                span: field.span,
                previous: self.ctx.registry.defined(id).fields[index].span,
            });
        }

        let ty = self.resolve_type(&field.ty)?;
        let default = match field.default {
            Some(expr) => {
                let value = self.transform_expr(expr)?;
                Some(self.coerce(value, &ty)?)
            }
            None => None,
        };
        self.ctx.registry.defined_mut(id).fields.push(Field {
            name: field.name.name.to_string(),
            ty,
            default,
            is_static: field.is_static,
            is_mutable: field.is_mutable,
            privacy: field.privacy,
            span: field.span,
        });
        Ok(())
    }

    /// Register a method signature. Generic methods become templates and
    /// return `None`.
    fn register_method(
        &mut self,
        id: TypeId,
        decl: &ClassDecl<'ast>,
        method: &'ast FunctionDecl<'ast>,
    ) -> Result<Option<FuncId>> {
        check_method_modifiers(method)?;
        let uuid = self.function_uuid(method, Some(id));

        if method.is_generic() {
            let template = self.add_function_template(method, uuid, Some(id));
            let state = self.ctx.snapshot();
            self.ctx.cache.template_mut(template).state = state;
            self.ctx.add_method_template(id, template);
            return Ok(None);
        }

        let func = self.register_signature(method, Some(id), Vec::new(), uuid)?;
        let clash = {
            let registry = &self.ctx.registry;
            let added = registry.func(func);
            registry.defined(id).methods.iter().copied().find(|&other| {
                let other = registry.func(other);
                other.name == added.name && other.same_signature(added)
            })
        };
        if let Some(clash) = clash {
            return Err(CompilationError::Redeclaration {
                name: method.name.name.to_string(),
                span: method.span,
                previous: self.ctx.registry.func(clash).span,
            });
        }

        self.ctx.registry.defined_mut(id).methods.push(func);
        self.assign_slot(id, decl, func, method)?;
        Ok(Some(func))
    }

    /// Give an instance method its vtable slot when it overrides an
    /// inherited virtual or is declared virtual.
    fn assign_slot(
        &mut self,
        id: TypeId,
        decl: &ClassDecl<'ast>,
        func: FuncId,
        method: &FunctionDecl<'ast>,
    ) -> Result<()> {
        if self.ctx.registry.func(func).is_static() {
            return Ok(());
        }

        let overridden = {
            let registry = &self.ctx.registry;
            let added = registry.func(func);
            registry
                .defined(id)
                .vtable
                .iter()
                .position(|&entry| {
                    let entry = registry.func(entry);
                    entry.name == added.name && entry.same_signature(added)
                })
        };

        if let Some(slot) = overridden {
            let previous = self.ctx.registry.defined(id).vtable[slot];
            let expected = self.ctx.registry.func(previous).ret.clone();
            let found = self.ctx.registry.func(func).ret.clone();
            if !found.is(&expected) {
                return Err(CompilationError::OverrideReturnMismatch {
                    name: method.name.name.to_string(),
                    expected: self.pretty(&expected),
                    found: self.pretty(&found),
                    span: method.span,
                });
            }
            self.make_virtual(func, slot);
            self.ctx.registry.defined_mut(id).vtable[slot] = func;
            tracing::debug!(class = decl.name.name, method = method.name.name, slot, "override reuses slot");
            return Ok(());
        }

        if !method.modifiers.is_virtual {
            return Ok(());
        }
        if decl.extends {
            return Err(extends_violation(decl, "new virtual methods", method.span));
        }
        let slot = self.ctx.registry.defined(id).vtable.len();
        self.make_virtual(func, slot);
        self.ctx.registry.defined_mut(id).vtable.push(func);
        tracing::debug!(class = decl.name.name, method = method.name.name, slot, "appended vtable slot");
        Ok(())
    }

    fn make_virtual(&mut self, func: FuncId, slot: usize) {
        let func = self.ctx.registry.func_mut(func);
        func.flags |= FuncFlags::VIRTUAL;
        func.virtual_slot = Some(slot as u32);
    }

    /// The default constructor of a class that declares none.
    fn implicit_constructor(&mut self, id: TypeId, decl: &ClassDecl<'ast>) {
        let module = self.ctx.module();
        let class_ty = self.ctx.registry.type_of(id);
        let uuid = Uuid::for_function(
            &self.ctx.registry.module_path(module),
            &format!("{}::{}", decl.name.name, CONSTRUCTOR_NAME),
            decl.span,
        );

        let mut func = Func::new(uuid, CONSTRUCTOR_NAME, module, class_ty.clone(), decl.span);
        func.parent = Some(id);
        func.flags = FuncFlags::STATIC | FuncFlags::CONSTRUCTOR;
        func.body = Some(ir::Block {
            stmts: vec![ir::Stmt::Let {
                id: self.ctx.fresh_var(),
                name: "self".to_string(),
                ty: class_ty,
                init: None,
                is_mutable: true,
            }],
            span: decl.span,
        });

        let func = self.ctx.registry.add_func(func);
        self.ir.functions.push(func);
        self.ctx.registry.defined_mut(id).methods.push(func);
    }
}

fn check_method_modifiers(method: &FunctionDecl<'_>) -> Result<()> {
    let modifiers = method.modifiers;
    let reason = if modifiers.is_constructor && modifiers.is_virtual {
        Some("a constructor cannot be virtual")
    } else if modifiers.is_static && modifiers.is_virtual {
        Some("a static method cannot be virtual")
    } else if method.is_generic() && modifiers.is_virtual {
        Some("a generic method cannot be virtual")
    } else if method.is_generic() && modifiers.is_constructor {
        Some("a constructor cannot be generic")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(CompilationError::InvalidModifier {
            name: method.name.name.to_string(),
            reason,
            span: method.span,
        }),
        None => Ok(()),
    }
}

fn extends_violation(decl: &ClassDecl<'_>, what: &'static str, span: tern_core::Span) -> CompilationError {
    CompilationError::ExtendsViolation {
        class: decl.name.name.to_string(),
        what,
        span,
    }
}
