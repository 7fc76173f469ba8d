//! Generic declarations and their instances.
//!
//! A generic class or function is stored once as a [`Template`] together
//! with the scope it was declared in. Instantiating it replays the
//! declaration in that scope with the generic parameters bound, and the
//! [`InstantiationCache`] guarantees one canonical instance per argument
//! list.

mod cache;
mod instantiate;

pub use cache::{InstantiationCache, Template, TemplateId, TemplateKind};
