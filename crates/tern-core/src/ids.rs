//! Arena identifiers.
//!
//! The registry owns every module, type, function and alias; everything else
//! refers to them through these small copyable ids. [`NodeId`] identifies
//! AST type nodes for per-node memoization.

use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u32);

        impl $name {
            /// Create a new id with the given index.
            #[inline]
            pub const fn new(index: u32) -> Self {
                Self(index)
            }

            /// Get the underlying index.
            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "_{}"), self.0)
            }
        }

        impl From<u32> for $name {
            fn from(index: u32) -> Self {
                Self::new(index)
            }
        }
    };
}

define_id!(
    /// Index of a module in the registry's module tree.
    ModuleId,
    "module"
);
define_id!(
    /// Index of a `DefinedType` (one per realized instantiation).
    TypeId,
    "type"
);
define_id!(
    /// Index of a `Func` (one per realized instantiation).
    FuncId,
    "func"
);
define_id!(
    /// Index of a type alias.
    AliasId,
    "alias"
);
define_id!(
    /// Index of a local or global variable slot.
    VarId,
    "var"
);
define_id!(
    /// Identity of an AST node, assigned by the AST builder.
    NodeId,
    "node"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_creation() {
        let id = TypeId::new(42);
        assert_eq!(id.index(), 42);
        assert_eq!(TypeId::from(42), id);
    }

    #[test]
    fn id_display() {
        assert_eq!(format!("{}", FuncId::new(5)), "func_5");
        assert_eq!(format!("{}", NodeId::new(0)), "node_0");
    }

    #[test]
    fn id_equality() {
        let a = ModuleId::new(1);
        let b = ModuleId::new(1);
        let c = ModuleId::new(2);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
