//! Deterministic declaration identity.
//!
//! A [`Uuid`] identifies a declaration site: the module path, the declared
//! name and the source position. Every instantiation of a generic declaration
//! shares its uuid, so "same type" is decided by uuid plus generic arguments.
//!
//! # Hash Computation
//!
//! Uses XXHash64 with domain-specific mixing constants so that a type and a
//! function declared with the same name at the same place never share a uuid.
//!
//! ```
//! use tern_core::{Span, Uuid};
//!
//! let a = Uuid::for_type("main", "Box", Span::new(1, 1, 3));
//! let b = Uuid::for_type("main", "Box", Span::new(1, 1, 3));
//! assert_eq!(a, b);
//! ```

use std::fmt;

use xxhash_rust::xxh64::xxh64;

use crate::Span;

/// Domain-specific mixing constants for uuid computation.
pub mod hash_constants {
    /// Separator constant for path components.
    pub const SEP: u64 = 0x4bc94d6bd06053ad;

    /// Domain marker for type declarations.
    pub const TYPE: u64 = 0x2fac10b63a6cc57c;

    /// Domain marker for function declarations.
    pub const FUNCTION: u64 = 0x5ea77ffbcdf5f302;

    /// Domain marker for alias declarations.
    pub const ALIAS: u64 = 0x1a095090689d4647;

    /// Domain marker for built-in declarations without a source position.
    pub const BUILTIN: u64 = 0x9a7f3d5e2b8c4601;
}

/// A deterministic 64-bit identity of a declaration site.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Uuid(pub u64);

impl Uuid {
    /// Identity of a class or struct declaration.
    pub fn for_type(module: &str, name: &str, span: Span) -> Self {
        Self::compute(hash_constants::TYPE, module, name, span)
    }

    /// Identity of a function or method declaration.
    pub fn for_function(module: &str, name: &str, span: Span) -> Self {
        Self::compute(hash_constants::FUNCTION, module, name, span)
    }

    /// Identity of a type alias declaration.
    pub fn for_alias(module: &str, name: &str, span: Span) -> Self {
        Self::compute(hash_constants::ALIAS, module, name, span)
    }

    /// Identity of a declaration the compiler provides itself.
    pub fn builtin(name: &str) -> Self {
        Uuid(hash_constants::BUILTIN ^ xxh64(name.as_bytes(), 0))
    }

    fn compute(domain: u64, module: &str, name: &str, span: Span) -> Self {
        let position = ((span.line as u64) << 32) | span.col as u64;
        let hash = domain
            ^ xxh64(module.as_bytes(), 0)
            ^ xxh64(name.as_bytes(), hash_constants::SEP)
            ^ xxh64(&position.to_le_bytes(), hash_constants::SEP.rotate_left(17));
        Uuid(hash)
    }

    /// Get the raw value.
    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for Uuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Uuid({:016x})", self.0)
    }
}

impl fmt::Display for Uuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}
