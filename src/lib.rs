//! Tern
//!
//! Semantic core of the Tern language: resolves names, types, overloads,
//! generic instantiations and class layouts, and turns parsed units into
//! typed IR for a code generator.
//!
//! ## Usage
//!
//! ```ignore
//! use tern::{AstBuilder, Bump, Compiler};
//!
//! let arena = Bump::new();
//! let ast = AstBuilder::new(&arena);
//! let unit = ast.unit("main", &[ast.function("main").body(&[]).item()]);
//!
//! let mut compiler = Compiler::new()?;
//! let ir = compiler.compile(&unit)?;
//! ```
//!
//! ## Crates
//!
//! - [`tern_core`]: spans, ids, the type model and errors
//! - [`tern_syntax`]: the AST and [`AstBuilder`]
//! - [`tern_registry`]: type and function arena, mangling, typed IR
//! - [`tern_sema`]: the transformer

pub use bumpalo::Bump;
pub use tern_core::{CompilationError, Diagnostic, ErrorKind, Result, Span, Type};
pub use tern_registry::Registry;
pub use tern_registry::ir::IrModule;
pub use tern_sema::{CompilerOptions, Context, Transformer};
pub use tern_syntax::AstBuilder;
pub use tern_syntax::ast::SourceUnit;

pub use tern_core as core;
pub use tern_registry as registry;
pub use tern_sema as sema;
pub use tern_syntax as syntax;

/// Compiles units against one shared registry.
///
/// Units are transformed in the order they are handed in; a unit can import
/// any unit compiled before it.
pub struct Compiler<'ast> {
    ctx: Context<'ast>,
}

impl<'ast> Compiler<'ast> {
    /// A compiler with default options.
    pub fn new() -> Result<Self> {
        Self::with_options(CompilerOptions::default())
    }

    pub fn with_options(options: CompilerOptions) -> Result<Self> {
        Ok(Self {
            ctx: Context::new(options)?,
        })
    }

    /// Transform one unit. On error nothing of the unit is returned, though
    /// declarations registered before the failure stay in the registry.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn compile(&mut self, unit: &SourceUnit<'ast>) -> Result<IrModule> {
        let result = Transformer::transform_unit(&mut self.ctx, unit);
        if let Err(error) = &result {
            tracing::debug!(unit = unit.name, kind = %error.kind(), %error, "unit failed");
        }
        result
    }

    /// Transform units in order, stopping at the first error.
    pub fn compile_all(&mut self, units: &[SourceUnit<'ast>]) -> Result<Vec<IrModule>> {
        units.iter().map(|unit| self.compile(unit)).collect()
    }

    pub fn registry(&self) -> &Registry {
        &self.ctx.registry
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.ctx.options
    }

    /// The underlying resolution context.
    pub fn context(&self) -> &Context<'ast> {
        &self.ctx
    }

    /// Hand the registry to a code generator.
    pub fn into_registry(self) -> Registry {
        self.ctx.registry
    }

    /// Render `error` against the source text it came from.
    pub fn report(error: CompilationError, source: &str) -> String {
        Diagnostic::from(error).render(source)
    }
}
