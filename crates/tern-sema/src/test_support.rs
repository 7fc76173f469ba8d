//! Shared helpers for unit tests.

pub use bumpalo::Bump;
pub use tern_syntax::AstBuilder;

use tern_core::{FuncId, Result, TypeId};
use tern_registry::ir::IrModule;
use tern_syntax::ast::SourceUnit;

use crate::context::Context;
use crate::options::CompilerOptions;
use crate::transformer::Transformer;

pub fn context<'ast>() -> Context<'ast> {
    Context::new(CompilerOptions::default()).unwrap()
}

pub fn transform<'ast>(ctx: &mut Context<'ast>, unit: &SourceUnit<'ast>) -> Result<IrModule> {
    Transformer::transform_unit(ctx, unit)
}

/// Every function named `name`, in registration order.
pub fn funcs_named(ctx: &Context<'_>, name: &str) -> Vec<FuncId> {
    ctx.registry
        .funcs()
        .filter(|(_, func)| func.name == name)
        .map(|(id, _)| id)
        .collect()
}

/// Every type named `name`, in registration order.
pub fn types_named(ctx: &Context<'_>, name: &str) -> Vec<TypeId> {
    ctx.registry
        .types()
        .filter(|(_, ty)| ty.name == name)
        .map(|(id, _)| id)
        .collect()
}
