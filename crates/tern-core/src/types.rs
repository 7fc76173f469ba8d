//! The semantic type model.
//!
//! [`Type`] is a closed tagged union. Identity is structural: two defined
//! types are the same type when they come from the same declaration (same
//! [`Uuid`]) and carry pairwise identical generic arguments. Aliases are
//! transparent and compare by their target.
//!
//! Castability between defined types needs the registry (parents live
//! there) and is implemented in `tern-registry`.

use crate::{AliasId, NumericKind, TypeId, Uuid};

/// A resolved type.
#[derive(Debug, Clone)]
pub enum Type {
    /// The unit return type.
    Void,
    /// A built-in scalar.
    Numeric(NumericKind),
    /// A function signature.
    Function(Box<FunctionType>),
    /// A reference to another type.
    Reference(Box<Type>),
    /// A named alias of another type.
    Alias(AliasType),
    /// An unbound generic parameter of a generic declaration.
    Placeholder(GenericPlaceholder),
    /// A class or struct, possibly with bound generic arguments.
    Defined(DefinedRef),
}

/// Signature of a function type.
#[derive(Debug, Clone)]
pub struct FunctionType {
    pub params: Vec<Type>,
    pub ret: Type,
    pub is_variadic: bool,
}

/// An alias and the type it stands for.
#[derive(Debug, Clone)]
pub struct AliasType {
    pub id: AliasId,
    pub uuid: Uuid,
    pub target: Box<Type>,
}

/// A generic parameter such as `T` in `class Box<T>`.
#[derive(Debug, Clone)]
pub struct GenericPlaceholder {
    pub name: String,
    /// Position in the owner's generic parameter list.
    pub index: usize,
    /// The declaration that introduces the parameter.
    pub owner: Uuid,
}

/// A reference to a realized defined type in the registry.
#[derive(Debug, Clone)]
pub struct DefinedRef {
    /// The registry entry of this particular instantiation.
    pub id: TypeId,
    /// Declaration identity shared by every instantiation.
    pub uuid: Uuid,
    /// Bound generic arguments, empty for non-generic types.
    pub generics: Vec<Type>,
}

impl DefinedRef {
    pub fn new(id: TypeId, uuid: Uuid, generics: Vec<Type>) -> Self {
        Self { id, uuid, generics }
    }

    /// Same declaration and pairwise identical generic arguments.
    pub fn is(&self, other: &DefinedRef) -> bool {
        self.uuid == other.uuid && generics_match(&self.generics, &other.generics)
    }
}

impl FunctionType {
    pub fn is(&self, other: &FunctionType) -> bool {
        self.is_variadic == other.is_variadic
            && self.ret.is(&other.ret)
            && generics_match(&self.params, &other.params)
    }
}

/// Pairwise structural equality of two type lists of equal length.
pub fn generics_match(a: &[Type], b: &[Type]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.is(y))
}

impl Type {
    #[inline]
    pub fn numeric(kind: NumericKind) -> Self {
        Type::Numeric(kind)
    }

    #[inline]
    pub fn bool() -> Self {
        Type::Numeric(NumericKind::Bool)
    }

    #[inline]
    pub fn i32() -> Self {
        Type::Numeric(NumericKind::I32)
    }

    #[inline]
    pub fn f64() -> Self {
        Type::Numeric(NumericKind::F64)
    }

    pub fn reference(pointee: Type) -> Self {
        Type::Reference(Box::new(pointee))
    }

    pub fn function(params: Vec<Type>, ret: Type, is_variadic: bool) -> Self {
        Type::Function(Box::new(FunctionType {
            params,
            ret,
            is_variadic,
        }))
    }

    pub fn defined(id: TypeId, uuid: Uuid, generics: Vec<Type>) -> Self {
        Type::Defined(DefinedRef::new(id, uuid, generics))
    }

    /// Strip any number of alias layers.
    pub fn unalias(&self) -> &Type {
        let mut ty = self;
        while let Type::Alias(alias) = ty {
            ty = &alias.target;
        }
        ty
    }

    /// Structural identity.
    pub fn is(&self, other: &Type) -> bool {
        match (self.unalias(), other.unalias()) {
            (Type::Void, Type::Void) => true,
            (Type::Numeric(a), Type::Numeric(b)) => a == b,
            (Type::Function(a), Type::Function(b)) => a.is(b),
            (Type::Reference(a), Type::Reference(b)) => a.is(b),
            (Type::Placeholder(a), Type::Placeholder(b)) => {
                a.owner == b.owner && a.index == b.index
            }
            (Type::Defined(a), Type::Defined(b)) => a.is(b),
            _ => false,
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self.unalias(), Type::Void)
    }

    pub fn as_numeric(&self) -> Option<NumericKind> {
        match self.unalias() {
            Type::Numeric(kind) => Some(*kind),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.as_numeric().is_some_and(|kind| !kind.is_bool())
    }

    pub fn as_defined(&self) -> Option<&DefinedRef> {
        match self.unalias() {
            Type::Defined(defined) => Some(defined),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&FunctionType> {
        match self.unalias() {
            Type::Function(function) => Some(function),
            _ => None,
        }
    }

    /// Name of the variant, used in kind-mismatch diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Type::Void => "void type",
            Type::Numeric(_) => "numeric type",
            Type::Function(_) => "function type",
            Type::Reference(_) => "reference type",
            Type::Alias(_) => "type alias",
            Type::Placeholder(_) => "generic parameter",
            Type::Defined(_) => "defined type",
        }
    }
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        self.is(other)
    }
}

impl Eq for Type {}

#[cfg(test)]
mod tests {
    use super::*;

    fn defined(index: u32, uuid: u64, generics: Vec<Type>) -> Type {
        Type::defined(TypeId::new(index), Uuid(uuid), generics)
    }

    #[test]
    fn is_reflexive() {
        let types = [
            Type::Void,
            Type::i32(),
            Type::reference(Type::f64()),
            Type::function(vec![Type::i32()], Type::Void, false),
            defined(0, 7, vec![Type::i32()]),
        ];
        for ty in &types {
            assert!(ty.is(ty));
        }
    }

    #[test]
    fn defined_types_compare_generics_pairwise() {
        let a = defined(0, 7, vec![Type::i32()]);
        let b = defined(1, 7, vec![Type::i32()]);
        let c = defined(2, 7, vec![Type::f64()]);
        let d = defined(3, 7, vec![Type::i32(), Type::i32()]);
        assert!(a.is(&b));
        assert!(!a.is(&c));
        assert!(!a.is(&d));
    }

    #[test]
    fn uuid_discriminates_declarations() {
        let a = defined(0, 7, vec![]);
        let b = defined(0, 8, vec![]);
        assert!(!a.is(&b));
    }

    #[test]
    fn nested_generics_compare_recursively() {
        let inner_a = defined(0, 1, vec![Type::i32()]);
        let inner_b = defined(1, 1, vec![Type::i32()]);
        let inner_c = defined(2, 1, vec![Type::bool()]);
        let outer_a = defined(3, 2, vec![inner_a]);
        let outer_b = defined(4, 2, vec![inner_b]);
        let outer_c = defined(5, 2, vec![inner_c]);
        assert!(outer_a.is(&outer_b));
        assert!(!outer_a.is(&outer_c));
    }

    #[test]
    fn aliases_compare_by_target() {
        let alias = Type::Alias(AliasType {
            id: AliasId::new(0),
            uuid: Uuid(3),
            target: Box::new(Type::i32()),
        });
        assert!(alias.is(&Type::i32()));
        assert!(Type::i32().is(&alias));
        assert!(!alias.is(&Type::f64()));
    }

    #[test]
    fn function_types_compare_signature() {
        let a = Type::function(vec![Type::i32()], Type::Void, false);
        let b = Type::function(vec![Type::i32()], Type::Void, true);
        let c = Type::function(vec![Type::i32()], Type::i32(), false);
        assert!(!a.is(&b));
        assert!(!a.is(&c));
    }

    #[test]
    fn placeholders_compare_by_owner_and_index() {
        let t = Type::Placeholder(GenericPlaceholder {
            name: "T".into(),
            index: 0,
            owner: Uuid(1),
        });
        let u = Type::Placeholder(GenericPlaceholder {
            name: "U".into(),
            index: 1,
            owner: Uuid(1),
        });
        assert!(t.is(&t.clone()));
        assert!(!t.is(&u));
    }

    #[test]
    fn bool_is_not_numeric_for_arithmetic() {
        assert!(!Type::bool().is_numeric());
        assert!(Type::i32().is_numeric());
        assert_eq!(Type::bool().as_numeric(), Some(NumericKind::Bool));
    }
}
