//! Resolution context.
//!
//! [`Context`] carries everything that outlives a single unit: the
//! [`Registry`], the instantiation cache, the exported scope of every
//! transformed module and the per-node type memo. The mutable
//! [`FunctionState`] (scope stack, current module, class and function) is
//! swapped in and out with [`Context::with_state`] whenever code has to run
//! where something was declared: default arguments and generic
//! instantiation.

use rustc_hash::FxHashMap;
use tern_core::{FuncId, ModuleId, NodeId, Result, Span, Type, TypeId, VarId};
use tern_registry::Registry;
use tern_syntax::ast::FunctionDecl;

use crate::options::CompilerOptions;
use crate::prelude;
use crate::scope::{Item, Scope, ScopeStack};
use crate::template::{InstantiationCache, TemplateId};

// ============================================================================
// Function state
// ============================================================================

/// Where code is being transformed.
#[derive(Debug, Clone)]
pub struct FunctionState {
    pub scopes: ScopeStack,
    pub module: ModuleId,
    pub class: Option<TypeId>,
    pub function: Option<FuncId>,
    /// Generic environment; each instantiation gets a fresh one so the
    /// per-node memo never leaks bindings between instances.
    pub env: u32,
}

impl FunctionState {
    pub fn new(module: ModuleId, scopes: ScopeStack) -> Self {
        Self {
            scopes,
            module,
            class: None,
            function: None,
            env: 0,
        }
    }
}

// ============================================================================
// Context
// ============================================================================

/// State shared across every unit of one compilation.
#[derive(Debug)]
pub struct Context<'ast> {
    pub registry: Registry,
    pub options: CompilerOptions,
    pub(crate) state: FunctionState,
    pub(crate) cache: InstantiationCache<'ast>,
    /// Instantiation nesting of the work in progress.
    pub(crate) depth: usize,
    /// The prelude `String` class, the type of string literals.
    pub(crate) string_type: Option<Type>,
    /// Names every module sees (the prelude).
    globals: Scope,
    /// Keyed by node, environment and resolving module.
    type_memo: FxHashMap<(NodeId, u32, ModuleId), Type>,
    func_states: FxHashMap<FuncId, FunctionState>,
    func_decls: FxHashMap<FuncId, &'ast FunctionDecl<'ast>>,
    module_scopes: FxHashMap<ModuleId, Scope>,
    method_templates: FxHashMap<TypeId, Vec<TemplateId>>,
    next_env: u32,
    next_var: u32,
}

impl<'ast> Context<'ast> {
    pub fn new(options: CompilerOptions) -> Result<Self> {
        let registry = Registry::new();
        let root = registry.modules().root();
        let mut ctx = Self {
            registry,
            options,
            state: FunctionState::new(root, ScopeStack::new()),
            cache: InstantiationCache::new(),
            depth: 0,
            string_type: None,
            globals: Scope::new(),
            type_memo: FxHashMap::default(),
            func_states: FxHashMap::default(),
            func_decls: FxHashMap::default(),
            module_scopes: FxHashMap::default(),
            method_templates: FxHashMap::default(),
            next_env: 1,
            next_var: 0,
        };
        if ctx.options.with_prelude {
            prelude::install(&mut ctx)?;
        }
        Ok(ctx)
    }

    // ========================================================================
    // State
    // ========================================================================

    pub fn module(&self) -> ModuleId {
        self.state.module
    }

    /// Templates and their realized instances.
    pub fn cache(&self) -> &InstantiationCache<'ast> {
        &self.cache
    }

    pub fn class(&self) -> Option<TypeId> {
        self.state.class
    }

    pub fn function(&self) -> Option<FuncId> {
        self.state.function
    }

    /// Copy of the current state, for later replay.
    pub fn snapshot(&self) -> FunctionState {
        self.state.clone()
    }

    /// Replace the current state, returning the previous one.
    pub fn replace_state(&mut self, state: FunctionState) -> FunctionState {
        std::mem::replace(&mut self.state, state)
    }

    /// Run `f` in `state`, restoring the current state afterwards whether or
    /// not `f` succeeds.
    pub fn with_state<R>(
        &mut self,
        state: FunctionState,
        f: impl FnOnce(&mut Self) -> Result<R>,
    ) -> Result<R> {
        let saved = self.replace_state(state);
        let result = f(self);
        self.replace_state(saved);
        result
    }

    /// Enter a fresh generic environment.
    pub fn enter_env(&mut self) {
        self.state.env = self.next_env;
        self.next_env += 1;
    }

    pub fn fresh_var(&mut self) -> VarId {
        let id = VarId::new(self.next_var);
        self.next_var += 1;
        id
    }

    // ========================================================================
    // Scopes
    // ========================================================================

    pub fn push_scope(&mut self) {
        self.state.scopes.push();
    }

    pub fn pop_scope(&mut self) -> Option<Scope> {
        self.state.scopes.pop()
    }

    pub fn declare(&mut self, name: &str, item: Item, span: Span) -> Result<()> {
        self.state.scopes.declare(name, item, span)
    }

    pub fn lookup(&self, name: &str) -> Option<&Item> {
        self.state.scopes.lookup(name)
    }

    /// The innermost scope.
    pub fn current_scope(&self) -> &Scope {
        self.state.scopes.top()
    }

    pub(crate) fn globals_mut(&mut self) -> &mut Scope {
        &mut self.globals
    }

    /// A scope stack for a new top-level module: the globals plus one empty
    /// module scope.
    pub fn module_stack(&self) -> ScopeStack {
        let mut scopes = ScopeStack::with_base(self.globals.clone());
        scopes.push();
        scopes
    }

    /// Exported names of a transformed module.
    pub fn module_scope(&self, module: ModuleId) -> Option<&Scope> {
        self.module_scopes.get(&module)
    }

    pub fn set_module_scope(&mut self, module: ModuleId, scope: Scope) {
        self.module_scopes.insert(module, scope);
    }

    // ========================================================================
    // Memo
    // ========================================================================

    pub fn memoized_type(&self, node: NodeId) -> Option<&Type> {
        self.type_memo.get(&(node, self.state.env, self.state.module))
    }

    pub fn memoize_type(&mut self, node: NodeId, ty: Type) {
        self.type_memo.insert((node, self.state.env, self.state.module), ty);
    }

    // ========================================================================
    // Functions
    // ========================================================================

    /// Remember the declaration and declaration-site state of `func`.
    pub fn record_function(&mut self, func: FuncId, decl: &'ast FunctionDecl<'ast>, state: FunctionState) {
        self.func_decls.insert(func, decl);
        self.func_states.insert(func, state);
    }

    pub fn function_decl(&self, func: FuncId) -> Option<&'ast FunctionDecl<'ast>> {
        self.func_decls.get(&func).copied()
    }

    pub fn function_state(&self, func: FuncId) -> Option<&FunctionState> {
        self.func_states.get(&func)
    }

    pub fn add_method_template(&mut self, class: TypeId, template: TemplateId) {
        self.method_templates.entry(class).or_default().push(template);
    }

    /// Generic method templates declared on `class` or its ancestors under
    /// `name`.
    pub fn method_templates(&self, class: TypeId, name: &str) -> Vec<TemplateId> {
        self.registry
            .ancestry(class)
            .into_iter()
            .filter_map(|owner| self.method_templates.get(&owner))
            .flatten()
            .copied()
            .filter(|&template| self.cache.template(template).name == name)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tern_core::Privacy;

    fn context() -> Context<'static> {
        Context::new(CompilerOptions::default().with_prelude(false)).unwrap()
    }

    #[test]
    fn with_state_restores_on_error() {
        let mut ctx = context();
        let lib = ctx.registry.add_module(None, "lib", Privacy::Public);
        let before = ctx.module();

        let result: Result<()> = ctx.with_state(FunctionState::new(lib, ScopeStack::new()), |ctx| {
            assert_eq!(ctx.module(), lib);
            Err(tern_core::CompilationError::internal("boom", Span::default()))
        });

        assert!(result.is_err());
        assert_eq!(ctx.module(), before);
    }

    #[test]
    fn memo_is_per_environment() {
        let mut ctx = context();
        let node = NodeId::new(4);
        ctx.memoize_type(node, Type::i32());
        assert!(ctx.memoized_type(node).is_some());

        ctx.enter_env();
        assert!(ctx.memoized_type(node).is_none());
        ctx.memoize_type(node, Type::f64());
        assert!(ctx.memoized_type(node).unwrap().is(&Type::f64()));
    }

    #[test]
    fn memo_is_per_module() {
        let mut ctx = context();
        let node = NodeId::new(9);
        ctx.memoize_type(node, Type::i32());

        let other = ctx.registry.add_module(None, "other", Privacy::Public);
        let seen = ctx.with_state(FunctionState::new(other, ScopeStack::new()), |ctx| {
            Ok(ctx.memoized_type(node).cloned())
        });
        assert!(seen.unwrap().is_none());
        assert!(ctx.memoized_type(node).is_some());
    }

    #[test]
    fn var_ids_are_unique() {
        let mut ctx = context();
        assert_ne!(ctx.fresh_var(), ctx.fresh_var());
    }

    #[test]
    fn module_stack_sees_globals() {
        let mut ctx = context();
        ctx.globals_mut()
            .declare("String", Item::Type(Type::bool()), Span::default())
            .unwrap();
        let stack = ctx.module_stack();
        assert_eq!(stack.depth(), 2);
        assert!(stack.lookup("String").is_some());
    }
}
