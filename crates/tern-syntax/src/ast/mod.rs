//! Abstract Syntax Tree (AST) for Tern.
//!
//! Nodes are allocated in a [`bumpalo::Bump`] arena and borrow from it for
//! `'ast`; every node is `Copy`. A parser (or [`crate::AstBuilder`]) produces
//! them and the semantic core only reads them.

pub mod decl;
pub mod expr;
pub mod ops;
pub mod stmt;
pub mod types;

pub use decl::*;
pub use expr::*;
pub use ops::*;
pub use stmt::*;
pub use types::*;
