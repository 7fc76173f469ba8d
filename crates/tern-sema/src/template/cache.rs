//! Template store and instance cache.
//!
//! Instances are keyed by the declaration [`Uuid`] and compared by their
//! generic arguments with [`Type::is`]. The cache is append-only: an
//! instance is registered before its members are transformed, so a generic
//! type that mentions itself with the same arguments finds the entry
//! instead of recursing.

use std::fmt;

use rustc_hash::FxHashMap;
use tern_core::{FuncId, ModuleId, Privacy, Span, Type, TypeId, Uuid, types::generics_match};
use tern_syntax::ast::{ClassDecl, FunctionDecl};

use crate::context::FunctionState;

/// Index of a [`Template`] in the cache.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TemplateId(u32);

impl TemplateId {
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "template_{}", self.0)
    }
}

/// What a template declares.
#[derive(Debug, Clone, Copy)]
pub enum TemplateKind<'ast> {
    Class(&'ast ClassDecl<'ast>),
    Function(&'ast FunctionDecl<'ast>),
}

/// A generic declaration waiting for arguments.
#[derive(Debug, Clone)]
pub struct Template<'ast> {
    pub uuid: Uuid,
    pub name: String,
    pub kind: TemplateKind<'ast>,
    pub module: ModuleId,
    /// Owning class of a generic method.
    pub parent: Option<TypeId>,
    pub privacy: Privacy,
    /// Scope, module and class visible at the declaration.
    pub state: FunctionState,
    pub span: Span,
}

impl<'ast> Template<'ast> {
    /// Number of generic parameters.
    pub fn arity(&self) -> usize {
        match self.kind {
            TemplateKind::Class(decl) => decl.generics.len(),
            TemplateKind::Function(decl) => decl.generics.len(),
        }
    }

    pub fn is_class(&self) -> bool {
        matches!(self.kind, TemplateKind::Class(_))
    }
}

#[derive(Debug, Clone)]
struct FunctionInstance {
    parent: Option<TypeId>,
    generics: Vec<Type>,
    func: FuncId,
}

/// Templates and their realized instances for one compilation.
#[derive(Debug, Default)]
pub struct InstantiationCache<'ast> {
    templates: Vec<Template<'ast>>,
    /// Declaration uuid -> realized types
    types: FxHashMap<Uuid, Vec<Type>>,
    /// Declaration uuid -> realized functions
    functions: FxHashMap<Uuid, Vec<FunctionInstance>>,
}

impl<'ast> InstantiationCache<'ast> {
    pub fn new() -> Self {
        Self {
            templates: Vec::new(),
            types: FxHashMap::default(),
            functions: FxHashMap::default(),
        }
    }

    pub fn add_template(&mut self, template: Template<'ast>) -> TemplateId {
        let id = TemplateId::new(self.templates.len() as u32);
        self.templates.push(template);
        id
    }

    pub fn template(&self, id: TemplateId) -> &Template<'ast> {
        &self.templates[id.index()]
    }

    pub fn template_mut(&mut self, id: TemplateId) -> &mut Template<'ast> {
        &mut self.templates[id.index()]
    }

    /// Look up a realized type by declaration and arguments.
    pub fn find_type(&self, uuid: Uuid, generics: &[Type]) -> Option<&Type> {
        self.types.get(&uuid)?.iter().find(|instance| {
            instance
                .as_defined()
                .is_some_and(|defined| generics_match(&defined.generics, generics))
        })
    }

    /// Record a realized type. An existing instance with the same arguments
    /// is kept and `false` is returned.
    pub fn insert_type(&mut self, instance: Type) -> bool {
        let Some(defined) = instance.as_defined() else {
            return false;
        };
        if self.find_type(defined.uuid, &defined.generics).is_some() {
            return false;
        }
        self.types.entry(defined.uuid).or_default().push(instance);
        true
    }

    /// Every realized instance of a declaration, in creation order.
    pub fn type_instances(&self, uuid: Uuid) -> &[Type] {
        self.types.get(&uuid).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Forget the instance for `generics`, after its realization failed.
    pub fn remove_type(&mut self, uuid: Uuid, generics: &[Type]) -> bool {
        let Some(instances) = self.types.get_mut(&uuid) else {
            return false;
        };
        let before = instances.len();
        instances.retain(|instance| {
            !instance
                .as_defined()
                .is_some_and(|defined| generics_match(&defined.generics, generics))
        });
        before != instances.len()
    }

    /// Look up a realized function by declaration, owner and arguments.
    pub fn find_function(&self, uuid: Uuid, parent: Option<TypeId>, generics: &[Type]) -> Option<FuncId> {
        self.functions
            .get(&uuid)?
            .iter()
            .find(|instance| instance.parent == parent && generics_match(&instance.generics, generics))
            .map(|instance| instance.func)
    }

    /// Record a realized function. An existing instance is kept and `false`
    /// is returned.
    pub fn insert_function(
        &mut self,
        uuid: Uuid,
        parent: Option<TypeId>,
        generics: Vec<Type>,
        func: FuncId,
    ) -> bool {
        if self.find_function(uuid, parent, &generics).is_some() {
            return false;
        }
        self.functions.entry(uuid).or_default().push(FunctionInstance {
            parent,
            generics,
            func,
        });
        true
    }

    pub fn remove_function(&mut self, uuid: Uuid, parent: Option<TypeId>, generics: &[Type]) -> bool {
        let Some(instances) = self.functions.get_mut(&uuid) else {
            return false;
        };
        let before = instances.len();
        instances.retain(|instance| !(instance.parent == parent && generics_match(&instance.generics, generics)));
        before != instances.len()
    }

    pub fn type_instance_count(&self) -> usize {
        self.types.values().map(Vec::len).sum()
    }

    pub fn function_instance_count(&self) -> usize {
        self.functions.values().map(Vec::len).sum()
    }
}
