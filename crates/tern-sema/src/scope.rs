//! Lexical scope management.
//!
//! This module provides the [`ScopeStack`] used while transforming a unit.
//! It handles:
//! - Nested block scopes (function bodies, blocks, class bodies, modules)
//! - Shadowing: inner scopes hide outer names until popped
//! - Overload sets: functions declared under one name in the same scope
//!   accumulate instead of clashing
//!
//! Every other redeclaration in the same scope is an error that names the
//! previous declaration.

use rustc_hash::FxHashMap;
use tern_core::{CompilationError, FuncId, ModuleId, Result, Span, Type};
use tern_registry::ir::Value;

use crate::template::TemplateId;

// ============================================================================
// Items
// ============================================================================

/// Something a name can resolve to.
#[derive(Debug, Clone)]
pub enum Item {
    /// A parameter, local or global variable.
    Value(Value),
    /// A concrete type (class, alias, bound generic parameter).
    Type(Type),
    /// A generic class that still needs its arguments.
    Template(TemplateId),
    /// An overload set.
    Functions(FunctionSet),
    Module(ModuleId),
}

impl Item {
    /// Name of the item kind, used in kind-mismatch diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Item::Value(_) => "value",
            Item::Type(_) | Item::Template(_) => "type",
            Item::Functions(_) => "function",
            Item::Module(_) => "module",
        }
    }
}

/// Functions sharing a name: realized functions plus generic templates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FunctionSet {
    pub funcs: Vec<FuncId>,
    pub templates: Vec<TemplateId>,
}

impl FunctionSet {
    pub fn single(func: FuncId) -> Self {
        Self {
            funcs: vec![func],
            templates: Vec::new(),
        }
    }

    pub fn template(template: TemplateId) -> Self {
        Self {
            funcs: Vec::new(),
            templates: vec![template],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.funcs.is_empty() && self.templates.is_empty()
    }

    fn merge(&mut self, other: FunctionSet) {
        for func in other.funcs {
            if !self.funcs.contains(&func) {
                self.funcs.push(func);
            }
        }
        for template in other.templates {
            if !self.templates.contains(&template) {
                self.templates.push(template);
            }
        }
    }
}

// ============================================================================
// Scope
// ============================================================================

#[derive(Debug, Clone)]
struct Declared {
    item: Item,
    span: Span,
}

/// One level of the scope stack.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    items: FxHashMap<String, Declared>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `name` in this scope.
    pub fn declare(&mut self, name: &str, item: Item, span: Span) -> Result<()> {
        match self.items.get_mut(name) {
            None => {
                self.items.insert(name.to_string(), Declared { item, span });
                Ok(())
            }
            Some(existing) => match (&mut existing.item, item) {
                (Item::Functions(set), Item::Functions(added)) => {
                    set.merge(added);
                    Ok(())
                }
                _ => Err(CompilationError::Redeclaration {
                    name: name.to_string(),
                    span,
                    previous: existing.span,
                }),
            },
        }
    }

    pub fn get(&self, name: &str) -> Option<&Item> {
        self.items.get(name).map(|declared| &declared.item)
    }

    /// Where `name` was first declared in this scope.
    pub fn span_of(&self, name: &str) -> Option<Span> {
        self.items.get(name).map(|declared| declared.span)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// ============================================================================
// ScopeStack
// ============================================================================

/// Stack of scopes, innermost last.
#[derive(Debug, Clone)]
pub struct ScopeStack {
    scopes: Vec<Scope>,
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeStack {
    /// A stack holding one empty scope.
    pub fn new() -> Self {
        Self::with_base(Scope::new())
    }

    /// A stack whose outermost scope is `base`.
    pub fn with_base(base: Scope) -> Self {
        Self { scopes: vec![base] }
    }

    pub fn push(&mut self) {
        self.scopes.push(Scope::new());
    }

    /// Pop the innermost scope. The outermost scope is never popped.
    pub fn pop(&mut self) -> Option<Scope> {
        if self.scopes.len() > 1 {
            self.scopes.pop()
        } else {
            None
        }
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// The innermost scope.
    pub fn top(&self) -> &Scope {
        // The stack always holds at least its base scope.
        &self.scopes[self.scopes.len() - 1]
    }

    /// Declare `name` in the innermost scope.
    pub fn declare(&mut self, name: &str, item: Item, span: Span) -> Result<()> {
        let last = self.scopes.len() - 1;
        self.scopes[last].declare(name, item, span)
    }

    /// Look `name` up, innermost scope first.
    pub fn lookup(&self, name: &str) -> Option<&Item> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tern_core::VarId;
    use tern_registry::ir::ValueKind;

    fn local(name: &str, id: u32) -> Item {
        Item::Value(Value::new(
            ValueKind::Local {
                id: VarId::new(id),
                name: name.into(),
            },
            Type::i32(),
            Span::default(),
        ))
    }

    fn local_id(item: Option<&Item>) -> Option<VarId> {
        match item {
            Some(Item::Value(Value {
                kind: ValueKind::Local { id, .. },
                ..
            })) => Some(*id),
            _ => None,
        }
    }

    #[test]
    fn names_are_visible_in_nested_scopes() {
        let mut stack = ScopeStack::new();
        stack.declare("x", local("x", 0), Span::new(1, 1, 1)).unwrap();
        stack.push();
        assert_eq!(local_id(stack.lookup("x")), Some(VarId::new(0)));
    }

    #[test]
    fn inner_names_disappear_on_pop() {
        let mut stack = ScopeStack::new();
        stack.push();
        stack.declare("y", local("y", 1), Span::new(1, 1, 1)).unwrap();
        assert!(stack.lookup("y").is_some());
        stack.pop();
        assert!(stack.lookup("y").is_none());
    }

    #[test]
    fn shadowing_restores_outer_binding() {
        let mut stack = ScopeStack::new();
        stack.declare("x", local("x", 0), Span::new(1, 1, 1)).unwrap();
        stack.push();
        stack.declare("x", local("x", 1), Span::new(2, 1, 1)).unwrap();
        assert_eq!(local_id(stack.lookup("x")), Some(VarId::new(1)));
        stack.pop();
        assert_eq!(local_id(stack.lookup("x")), Some(VarId::new(0)));
    }

    #[test]
    fn redeclaration_names_previous_span() {
        let mut stack = ScopeStack::new();
        stack.declare("x", local("x", 0), Span::new(1, 5, 1)).unwrap();
        let err = stack
            .declare("x", local("x", 1), Span::new(3, 5, 1))
            .unwrap_err();
        assert_eq!(
            err,
            CompilationError::Redeclaration {
                name: "x".into(),
                span: Span::new(3, 5, 1),
                previous: Span::new(1, 5, 1),
            }
        );
    }

    #[test]
    fn functions_accumulate_into_overload_set() {
        let mut stack = ScopeStack::new();
        stack
            .declare("f", Item::Functions(FunctionSet::single(FuncId::new(0))), Span::new(1, 1, 1))
            .unwrap();
        stack
            .declare("f", Item::Functions(FunctionSet::single(FuncId::new(1))), Span::new(2, 1, 1))
            .unwrap();
        match stack.lookup("f") {
            Some(Item::Functions(set)) => {
                assert_eq!(set.funcs, vec![FuncId::new(0), FuncId::new(1)]);
            }
            other => panic!("expected overload set, got {:?}", other),
        }
        assert_eq!(stack.top().span_of("f"), Some(Span::new(1, 1, 1)));
    }

    #[test]
    fn function_and_value_clash() {
        let mut stack = ScopeStack::new();
        stack.declare("f", local("f", 0), Span::new(1, 1, 1)).unwrap();
        let err = stack
            .declare("f", Item::Functions(FunctionSet::single(FuncId::new(0))), Span::new(2, 1, 1))
            .unwrap_err();
        assert!(matches!(err, CompilationError::Redeclaration { .. }));
    }

    #[test]
    fn base_scope_is_never_popped() {
        let mut stack = ScopeStack::new();
        assert!(stack.pop().is_none());
        assert_eq!(stack.depth(), 1);
    }
}
