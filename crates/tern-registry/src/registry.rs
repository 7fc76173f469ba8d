//! The declaration arena.
//!
//! [`Registry`] is the canonical owner of every module, defined type,
//! function and alias. Everything else refers to entries by id. Ids are only
//! ever minted by the registry and entries are never removed, so indexing by
//! id cannot go out of bounds.

use tern_core::{AliasId, AliasType, FuncId, ModuleId, Privacy, Type, TypeId};

use crate::defined::{AliasDef, DefinedType};
use crate::func::Func;
use crate::module_tree::ModuleTree;

/// Arena of declarations for one compilation.
#[derive(Debug, Default)]
pub struct Registry {
    modules: ModuleTree,
    types: Vec<DefinedType>,
    funcs: Vec<Func>,
    aliases: Vec<AliasDef>,
    entry: Option<ModuleId>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Modules
    // ========================================================================

    pub fn modules(&self) -> &ModuleTree {
        &self.modules
    }

    /// Create (or reopen) a module under `parent`, or at the top level.
    pub fn add_module(&mut self, parent: Option<ModuleId>, name: &str, privacy: Privacy) -> ModuleId {
        let parent = parent.unwrap_or_else(|| self.modules.root());
        self.modules.get_or_create_child(parent, name, privacy)
    }

    pub fn add_import(&mut self, from: ModuleId, target: ModuleId) {
        self.modules.add_import(from, target);
    }

    /// The module whose names are printed unqualified.
    pub fn set_entry_module(&mut self, id: ModuleId) {
        self.entry = Some(id);
    }

    pub fn entry_module(&self) -> Option<ModuleId> {
        self.entry
    }

    /// `a::b` path of a module.
    pub fn module_path(&self, id: ModuleId) -> String {
        self.modules.path(id).join("::")
    }

    /// Whether code in `from` may see private declarations of `owner`.
    pub fn can_access_private(&self, owner: ModuleId, from: ModuleId) -> bool {
        self.modules.is_within(from, owner)
    }

    // ========================================================================
    // Types
    // ========================================================================

    pub fn add_type(&mut self, ty: DefinedType) -> TypeId {
        let id = TypeId::new(self.types.len() as u32);
        self.types.push(ty);
        id
    }

    pub fn defined(&self, id: TypeId) -> &DefinedType {
        &self.types[id.index()]
    }

    pub fn defined_mut(&mut self, id: TypeId) -> &mut DefinedType {
        &mut self.types[id.index()]
    }

    /// The [`Type`] naming a registry entry.
    pub fn type_of(&self, id: TypeId) -> Type {
        let defined = self.defined(id);
        Type::defined(id, defined.uuid, defined.generics.clone())
    }

    pub fn types(&self) -> impl Iterator<Item = (TypeId, &DefinedType)> {
        self.types
            .iter()
            .enumerate()
            .map(|(index, ty)| (TypeId::new(index as u32), ty))
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    /// `id` followed by its ancestors, nearest first.
    pub fn ancestry(&self, id: TypeId) -> Vec<TypeId> {
        let mut chain = vec![id];
        let mut current = self.defined(id).parent_id();
        while let Some(parent) = current {
            if chain.contains(&parent) {
                break;
            }
            chain.push(parent);
            current = self.defined(parent).parent_id();
        }
        chain
    }

    /// Find a field on `id` or an ancestor: (owner, index in owner's fields).
    pub fn lookup_field(&self, id: TypeId, name: &str) -> Option<(TypeId, usize)> {
        self.ancestry(id).into_iter().find_map(|owner| {
            self.defined(owner)
                .field_index(name)
                .map(|index| (owner, index))
        })
    }

    /// Methods named `name` visible on `id`. Methods overridden further down
    /// the hierarchy are hidden by their overrides.
    pub fn lookup_methods(&self, id: TypeId, name: &str) -> Vec<FuncId> {
        let mut found: Vec<FuncId> = Vec::new();
        for owner in self.ancestry(id) {
            for &method in &self.defined(owner).methods {
                let func = self.func(method);
                if func.name != name {
                    continue;
                }
                let hidden = found
                    .iter()
                    .any(|&existing| self.func(existing).same_signature(func));
                if !hidden {
                    found.push(method);
                }
            }
        }
        found
    }

    /// Methods named `name` declared on `id` itself (constructors are never
    /// inherited).
    pub fn own_methods(&self, id: TypeId, name: &str) -> Vec<FuncId> {
        self.defined(id)
            .methods
            .iter()
            .copied()
            .filter(|&method| self.func(method).name == name)
            .collect()
    }

    /// Find a nested alias on `id` or an ancestor.
    pub fn lookup_alias(&self, id: TypeId, name: &str) -> Option<AliasId> {
        self.ancestry(id)
            .into_iter()
            .find_map(|owner| self.defined(owner).alias(name))
    }

    // ========================================================================
    // Functions
    // ========================================================================

    pub fn add_func(&mut self, func: Func) -> FuncId {
        let id = FuncId::new(self.funcs.len() as u32);
        self.funcs.push(func);
        id
    }

    pub fn func(&self, id: FuncId) -> &Func {
        &self.funcs[id.index()]
    }

    pub fn func_mut(&mut self, id: FuncId) -> &mut Func {
        &mut self.funcs[id.index()]
    }

    pub fn funcs(&self) -> impl Iterator<Item = (FuncId, &Func)> {
        self.funcs
            .iter()
            .enumerate()
            .map(|(index, func)| (FuncId::new(index as u32), func))
    }

    pub fn func_count(&self) -> usize {
        self.funcs.len()
    }

    // ========================================================================
    // Aliases
    // ========================================================================

    pub fn add_alias(&mut self, alias: AliasDef) -> AliasId {
        let id = AliasId::new(self.aliases.len() as u32);
        self.aliases.push(alias);
        id
    }

    pub fn alias(&self, id: AliasId) -> &AliasDef {
        &self.aliases[id.index()]
    }

    /// The [`Type`] naming an alias; transparent to `is`.
    pub fn alias_type(&self, id: AliasId) -> Type {
        let alias = self.alias(id);
        Type::Alias(AliasType {
            id,
            uuid: alias.uuid,
            target: Box::new(alias.target.clone()),
        })
    }
}
