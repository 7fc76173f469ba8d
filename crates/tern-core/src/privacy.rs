//! Privacy modifiers for declarations.

use std::fmt;

/// Whether a declaration is visible outside of its declaring module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Privacy {
    #[default]
    Public,
    Private,
}

impl Privacy {
    #[inline]
    pub fn from_public(is_public: bool) -> Self {
        if is_public {
            Privacy::Public
        } else {
            Privacy::Private
        }
    }

    #[inline]
    pub fn is_private(self) -> bool {
        self == Privacy::Private
    }
}

impl fmt::Display for Privacy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Privacy::Public => write!(f, "public"),
            Privacy::Private => write!(f, "private"),
        }
    }
}
