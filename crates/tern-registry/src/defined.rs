//! Classes, structs and type aliases.

use tern_core::{AliasId, FuncId, ModuleId, Privacy, Span, Type, TypeId, Uuid};

use crate::ir::Value;

/// A field of a defined type.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub ty: Type,
    /// Initial value, already converted to `ty`.
    pub default: Option<Value>,
    pub is_static: bool,
    pub is_mutable: bool,
    pub privacy: Privacy,
    pub span: Span,
}

/// A realized class or struct: one per declaration and generic argument list.
#[derive(Debug, Clone, PartialEq)]
pub struct DefinedType {
    /// Shared by every instantiation of the same declaration.
    pub uuid: Uuid,
    pub name: String,
    pub module: ModuleId,
    /// Bound generic arguments, in declaration order.
    pub generics: Vec<Type>,
    /// Single parent class.
    pub parent: Option<Type>,
    /// Fields in declaration order.
    pub fields: Vec<Field>,
    /// Every method, static method and constructor in declaration order.
    pub methods: Vec<FuncId>,
    /// Nested type aliases.
    pub aliases: Vec<(String, AliasId)>,
    /// Virtual functions in slot order.
    pub vtable: Vec<FuncId>,
    pub is_struct: bool,
    pub privacy: Privacy,
    pub span: Span,
}

impl DefinedType {
    pub fn new(uuid: Uuid, name: impl Into<String>, module: ModuleId, span: Span) -> Self {
        Self {
            uuid,
            name: name.into(),
            module,
            generics: Vec::new(),
            parent: None,
            fields: Vec::new(),
            methods: Vec::new(),
            aliases: Vec::new(),
            vtable: Vec::new(),
            is_struct: false,
            privacy: Privacy::Public,
            span,
        }
    }

    /// The parent's registry entry.
    pub fn parent_id(&self) -> Option<TypeId> {
        self.parent
            .as_ref()
            .and_then(|parent| parent.as_defined())
            .map(|parent| parent.id)
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.name == name)
    }

    pub fn alias(&self, name: &str) -> Option<AliasId> {
        self.aliases
            .iter()
            .find(|(alias_name, _)| alias_name == name)
            .map(|(_, id)| *id)
    }
}

/// A type alias.
#[derive(Debug, Clone, PartialEq)]
pub struct AliasDef {
    pub uuid: Uuid,
    pub name: String,
    pub module: ModuleId,
    pub target: Type,
    pub privacy: Privacy,
    pub span: Span,
}
