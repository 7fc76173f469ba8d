//! Built-in declarations visible from every module.
//!
//! The `core` module provides the `String` class, which is the type of string
//! literals. Its methods are implemented by the runtime and are linked by
//! their external names.

use tern_core::{CONSTRUCTOR_NAME, NumericKind, Privacy, Result, Span, Type, TypeId, Uuid};
use tern_registry::{DefinedType, Func, FuncFlags, Param};

use crate::context::Context;
use crate::scope::{Item, Scope};

pub const PRELUDE_MODULE: &str = "core";
pub const STRING_CLASS: &str = "String";

/// Register the `core` module and expose its names to every module.
pub fn install(ctx: &mut Context<'_>) -> Result<()> {
    let span = Span::default();
    let core = ctx.registry.add_module(None, PRELUDE_MODULE, Privacy::Public);
    let mut class = DefinedType::new(Uuid::builtin("core::String"), STRING_CLASS, core, span);
    class.is_struct = true;
    let string = ctx.registry.add_type(class);
    let string_ty = ctx.registry.type_of(string);

    builtin_method(ctx, string, CONSTRUCTOR_NAME, &[], string_ty.clone(), FuncFlags::STATIC | FuncFlags::CONSTRUCTOR, "tern_string_new");
    builtin_method(ctx, string, "len", &[], Type::numeric(NumericKind::I64), FuncFlags::empty(), "tern_string_len");
    builtin_method(ctx, string, "$op_add", &[("other", string_ty.clone())], string_ty.clone(), FuncFlags::empty(), "tern_string_concat");
    builtin_method(ctx, string, "$op_eq", &[("other", string_ty.clone())], Type::bool(), FuncFlags::empty(), "tern_string_eq");

    let mut exports = Scope::new();
    exports.declare(STRING_CLASS, Item::Type(string_ty.clone()), span)?;
    ctx.set_module_scope(core, exports);

    let globals = ctx.globals_mut();
    globals.declare(STRING_CLASS, Item::Type(string_ty.clone()), span)?;
    globals.declare(PRELUDE_MODULE, Item::Module(core), span)?;
    ctx.string_type = Some(string_ty);

    tracing::debug!(module = PRELUDE_MODULE, "installed prelude");
    Ok(())
}

fn builtin_method(
    ctx: &mut Context<'_>,
    owner: TypeId,
    name: &str,
    params: &[(&str, Type)],
    ret: Type,
    flags: FuncFlags,
    external: &str,
) {
    let module = ctx.registry.defined(owner).module;
    let mut func = Func::new(
        Uuid::builtin(&format!("core::String::{}", name)),
        name,
        module,
        ret,
        Span::default(),
    );
    func.parent = Some(owner);
    func.flags = flags;
    func.external_name = Some(external.to_string());
    if !flags.contains(FuncFlags::STATIC) {
        func.params
            .push(Param::new("self", ctx.registry.type_of(owner), Span::default()));
    }
    for (param, ty) in params {
        func.params.push(Param::new(*param, ty.clone(), Span::default()));
    }
    let id = ctx.registry.add_func(func);
    ctx.registry.defined_mut(owner).methods.push(id);
}
