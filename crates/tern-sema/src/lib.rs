//! Tern semantic analysis
//!
//! Turns `tern-syntax` units into typed IR backed by a `tern-registry`
//! [`Registry`](tern_registry::Registry).
//!
//! ## Architecture
//!
//! A single depth-first pass per unit. Names become visible in traversal
//! order, except that class members are registered before any member body
//! is transformed. Generic declarations are stored as templates and realized
//! on demand through the instantiation cache.
//!
//! ## Modules
//!
//! - [`call`]: callee, overload and default argument resolution
//! - [`class_builder`]: classes, fields, methods and vtables
//! - [`context`]: shared resolution context and per-function state
//! - [`options`]: compiler configuration
//! - [`prelude`]: built-in declarations (`core::String`)
//! - [`scope`]: lexical scopes and resolved items
//! - [`template`]: generic templates and the instantiation cache
//! - [`transformer`]: AST to IR transformation
//! - [`type_resolver`]: type expressions to semantic types

pub mod call;
pub mod class_builder;
pub mod context;
pub mod options;
pub mod prelude;
pub mod scope;
pub mod template;
pub mod transformer;
pub mod type_resolver;

#[cfg(test)]
mod test_support;

pub use call::{ArgConversion, OverloadMatch};
pub use context::{Context, FunctionState};
pub use options::CompilerOptions;
pub use scope::{FunctionSet, Item, Scope, ScopeStack};
pub use template::{InstantiationCache, TemplateId};
pub use transformer::Transformer;

// Re-export CompilationError from core for convenience
pub use tern_core::CompilationError;
