//! Declaration registry for the Tern semantic core.
//!
//! This crate owns the results of semantic analysis:
//!
//! - [`Registry`]: arena of [`DefinedType`], [`Func`] and [`AliasDef`] entries
//!   plus the petgraph-backed [`ModuleTree`]
//! - castability ([`Registry::can_cast`], [`Registry::cast_chain`])
//! - mangled and pretty names
//! - the typed IR in [`ir`]

mod cast;
mod defined;
mod func;
pub mod ir;
mod mangle;
mod module_tree;
mod registry;

pub use defined::{AliasDef, DefinedType, Field};
pub use func::{Func, FuncFlags, Param};
pub use module_tree::{ModuleData, ModuleEdge, ModuleTree};
pub use registry::Registry;
