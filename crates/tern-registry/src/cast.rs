//! Castability between types.
//!
//! [`Registry::can_cast`] is a single step: a defined type casts to its own
//! declared parent only, with identical generic bindings. Multi-level
//! upcasts go through [`Registry::cast_chain`], which repeats the single
//! step and reports how many steps were needed.

use tern_core::Type;

use crate::Registry;

impl Registry {
    /// One-step cast from `from` to `to`.
    ///
    /// Not symmetric: a child casts to its parent, never the reverse.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn can_cast(&self, from: &Type, to: &Type) -> bool {
        match (from.unalias(), to.unalias()) {
            (Type::Numeric(a), Type::Numeric(b)) => a.can_cast_to(*b),
            (Type::Reference(a), Type::Reference(b)) => self.can_cast(a, b),
            (Type::Defined(child), Type::Defined(_)) => self
                .defined(child.id)
                .parent
                .as_ref()
                .is_some_and(|parent| parent.is(to)),
            _ => false,
        }
    }

    /// Number of one-step casts needed to go from `from` to `to`: `Some(0)`
    /// when the types are identical, `None` when no chain exists.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn cast_chain(&self, from: &Type, to: &Type) -> Option<usize> {
        if from.is(to) {
            return Some(0);
        }
        match (from.unalias(), to.unalias()) {
            (Type::Reference(a), Type::Reference(b)) => self.cast_chain(a, b),
            (Type::Defined(_), Type::Defined(_)) => {
                let mut current = from.clone();
                let mut steps = 0;
                loop {
                    let Some(child) = current.as_defined() else {
                        return None;
                    };
                    let Some(parent) = self.defined(child.id).parent.clone() else {
                        return None;
                    };
                    steps += 1;
                    if parent.is(to) {
                        return Some(steps);
                    }
                    if steps > self.type_count() {
                        return None;
                    }
                    current = parent;
                }
            }
            _ => self.can_cast(from, to).then_some(1),
        }
    }
}
