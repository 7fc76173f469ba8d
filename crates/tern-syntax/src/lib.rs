//! Tern syntax tree.
//!
//! This crate defines the AST the semantic core consumes. Lexing and parsing
//! happen elsewhere; producers (and tests) construct trees with
//! [`AstBuilder`].

pub mod ast;
mod builder;

pub use builder::{AstBuilder, ClassBuilder, FunctionBuilder};
