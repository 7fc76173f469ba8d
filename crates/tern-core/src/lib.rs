//! Core types for the Tern semantic core.
//!
//! This crate holds the vocabulary shared by every other crate of the
//! workspace:
//!
//! - [`Span`] source locations
//! - arena ids ([`ModuleId`], [`TypeId`], [`FuncId`], ...)
//! - [`Uuid`] declaration identities
//! - the [`Type`] model and [`NumericKind`]
//! - [`Privacy`]
//! - [`CompilationError`], [`ErrorKind`] and [`Diagnostic`]

mod error;
mod ids;
mod numeric;
mod privacy;
mod span;
pub mod types;
mod uuid;

pub use error::{CompilationError, Diagnostic, ErrorKind};
pub use ids::{AliasId, FuncId, ModuleId, NodeId, TypeId, VarId};
pub use numeric::NumericKind;
pub use privacy::Privacy;
pub use span::Span;
pub use types::{AliasType, DefinedRef, FunctionType, GenericPlaceholder, Type};
pub use uuid::{Uuid, hash_constants};

/// Result alias used throughout the semantic core.
pub type Result<T> = std::result::Result<T, CompilationError>;

/// Reserved method name of constructors.
pub const CONSTRUCTOR_NAME: &str = "$ctor";

/// Number of metadata slots preceding user slots in every vtable.
pub const VTABLE_RESERVED_SLOTS: u32 = 2;
