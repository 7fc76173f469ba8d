//! Function declarations and instances.

use bitflags::bitflags;
use tern_core::{ModuleId, Privacy, Span, Type, TypeId, Uuid, VTABLE_RESERVED_SLOTS};

use crate::ir::Block;

bitflags! {
    /// Declaration flags of a [`Func`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FuncFlags: u8 {
        /// No receiver; callable through `Type::name`.
        const STATIC = 1 << 0;
        /// Reserved constructor; always static as well.
        const CONSTRUCTOR = 1 << 1;
        /// Accepts extra trailing arguments.
        const VARIADIC = 1 << 2;
        /// Dispatched through the vtable.
        const VIRTUAL = 1 << 3;
    }
}

/// A function parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: Type,
    pub has_default: bool,
    pub span: Span,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: Type, span: Span) -> Self {
        Self {
            name: name.into(),
            ty,
            has_default: false,
            span,
        }
    }

    pub fn with_default(mut self) -> Self {
        self.has_default = true;
        self
    }
}

/// A realized function: one per declaration and generic argument list.
///
/// Instance methods take the receiver as their first parameter, named
/// `self`.
#[derive(Debug, Clone, PartialEq)]
pub struct Func {
    pub uuid: Uuid,
    pub name: String,
    pub module: ModuleId,
    pub ret: Type,
    pub params: Vec<Param>,
    /// Owning class, if this is a method.
    pub parent: Option<TypeId>,
    /// Bound generic arguments.
    pub generics: Vec<Type>,
    pub privacy: Privacy,
    pub flags: FuncFlags,
    /// User vtable slot; absent for non-virtual functions.
    pub virtual_slot: Option<u32>,
    /// Absent for declarations without implementation.
    pub body: Option<Block>,
    /// Linkage name used verbatim instead of the mangled name.
    pub external_name: Option<String>,
    pub span: Span,
}

impl Func {
    pub fn new(uuid: Uuid, name: impl Into<String>, module: ModuleId, ret: Type, span: Span) -> Self {
        Self {
            uuid,
            name: name.into(),
            module,
            ret,
            params: Vec::new(),
            parent: None,
            generics: Vec::new(),
            privacy: Privacy::Public,
            flags: FuncFlags::empty(),
            virtual_slot: None,
            body: None,
            external_name: None,
            span,
        }
    }

    #[inline]
    pub fn is_static(&self) -> bool {
        self.flags.contains(FuncFlags::STATIC)
    }

    #[inline]
    pub fn is_constructor(&self) -> bool {
        self.flags.contains(FuncFlags::CONSTRUCTOR)
    }

    #[inline]
    pub fn is_variadic(&self) -> bool {
        self.flags.contains(FuncFlags::VARIADIC)
    }

    #[inline]
    pub fn is_virtual(&self) -> bool {
        self.flags.contains(FuncFlags::VIRTUAL)
    }

    /// Whether calls pass a receiver as the first argument.
    #[inline]
    pub fn has_receiver(&self) -> bool {
        self.parent.is_some() && !self.is_static()
    }

    /// Slot used by codegen, skipping the reserved metadata slots.
    pub fn dispatch_offset(&self) -> Option<u32> {
        self.virtual_slot.map(|slot| slot + VTABLE_RESERVED_SLOTS)
    }

    /// Parameters the caller must always pass: all but the trailing run of
    /// defaulted parameters.
    pub fn required_arity(&self) -> usize {
        let trailing_defaults = self
            .params
            .iter()
            .rev()
            .take_while(|param| param.has_default)
            .count();
        self.params.len() - trailing_defaults
    }

    /// Whether a call with `count` arguments can be completed.
    pub fn accepts_arity(&self, count: usize) -> bool {
        count >= self.required_arity() && (self.is_variadic() || count <= self.params.len())
    }

    /// Parameters excluding the receiver.
    pub fn explicit_params(&self) -> &[Param] {
        if self.has_receiver() {
            &self.params[1..]
        } else {
            &self.params
        }
    }

    /// Same explicit parameter types, ignoring the receiver and return type.
    pub fn same_signature(&self, other: &Func) -> bool {
        let a = self.explicit_params();
        let b = other.explicit_params();
        self.is_variadic() == other.is_variadic()
            && a.len() == b.len()
            && a.iter().zip(b).all(|(x, y)| x.ty.is(&y.ty))
    }

    /// The function type of this function used as a value.
    pub fn signature_type(&self) -> Type {
        Type::function(
            self.params.iter().map(|param| param.ty.clone()).collect(),
            self.ret.clone(),
            self.is_variadic(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn func(params: &[bool]) -> Func {
        let mut f = Func::new(Uuid(1), "f", ModuleId::new(0), Type::Void, Span::default());
        for (i, has_default) in params.iter().enumerate() {
            let param = Param::new(format!("p{}", i), Type::i32(), Span::default());
            f.params.push(if *has_default { param.with_default() } else { param });
        }
        f
    }

    #[test]
    fn trailing_defaults_are_optional() {
        let f = func(&[false, true, true]);
        assert_eq!(f.required_arity(), 1);
        assert!(f.accepts_arity(1));
        assert!(f.accepts_arity(3));
        assert!(!f.accepts_arity(0));
        assert!(!f.accepts_arity(4));
    }

    #[test]
    fn non_trailing_default_is_required() {
        let f = func(&[true, false]);
        assert_eq!(f.required_arity(), 2);
    }

    #[test]
    fn variadic_accepts_extra() {
        let mut f = func(&[false]);
        f.flags |= FuncFlags::VARIADIC;
        assert!(f.accepts_arity(5));
        assert!(!f.accepts_arity(0));
    }

    #[test]
    fn dispatch_offset_skips_reserved_slots() {
        let mut f = func(&[]);
        assert_eq!(f.dispatch_offset(), None);
        f.virtual_slot = Some(0);
        assert_eq!(f.dispatch_offset(), Some(2));
    }

    #[test]
    fn signature_ignores_receiver() {
        let mut a = func(&[false, false]);
        a.parent = Some(TypeId::new(0));
        a.params[0].ty = Type::defined(TypeId::new(0), Uuid(10), vec![]);
        let mut b = func(&[false, false]);
        b.parent = Some(TypeId::new(1));
        b.params[0].ty = Type::defined(TypeId::new(1), Uuid(11), vec![]);
        assert!(a.same_signature(&b));

        b.params[1].ty = Type::f64();
        assert!(!a.same_signature(&b));
    }
}
