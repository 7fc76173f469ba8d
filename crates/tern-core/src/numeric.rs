//! Built-in numeric kinds.

use std::fmt;

/// The primitive scalar types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericKind {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
}

impl NumericKind {
    pub const ALL: [NumericKind; 11] = [
        NumericKind::Bool,
        NumericKind::I8,
        NumericKind::I16,
        NumericKind::I32,
        NumericKind::I64,
        NumericKind::U8,
        NumericKind::U16,
        NumericKind::U32,
        NumericKind::U64,
        NumericKind::F32,
        NumericKind::F64,
    ];

    /// Look up a built-in type by its source name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// The source name of this kind.
    pub fn name(self) -> &'static str {
        match self {
            NumericKind::Bool => "bool",
            NumericKind::I8 => "i8",
            NumericKind::I16 => "i16",
            NumericKind::I32 => "i32",
            NumericKind::I64 => "i64",
            NumericKind::U8 => "u8",
            NumericKind::U16 => "u16",
            NumericKind::U32 => "u32",
            NumericKind::U64 => "u64",
            NumericKind::F32 => "f32",
            NumericKind::F64 => "f64",
        }
    }

    /// Fixed mangling tag.
    pub fn mangle_tag(self) -> &'static str {
        match self {
            NumericKind::Bool => "b",
            NumericKind::I8 => "i8",
            NumericKind::I16 => "i16",
            NumericKind::I32 => "i32",
            NumericKind::I64 => "i64",
            NumericKind::U8 => "u8",
            NumericKind::U16 => "u16",
            NumericKind::U32 => "u32",
            NumericKind::U64 => "u64",
            NumericKind::F32 => "f32",
            NumericKind::F64 => "f64",
        }
    }

    pub fn bits(self) -> u32 {
        match self {
            NumericKind::Bool => 1,
            NumericKind::I8 | NumericKind::U8 => 8,
            NumericKind::I16 | NumericKind::U16 => 16,
            NumericKind::I32 | NumericKind::U32 | NumericKind::F32 => 32,
            NumericKind::I64 | NumericKind::U64 | NumericKind::F64 => 64,
        }
    }

    #[inline]
    pub fn is_float(self) -> bool {
        matches!(self, NumericKind::F32 | NumericKind::F64)
    }

    #[inline]
    pub fn is_signed(self) -> bool {
        matches!(
            self,
            NumericKind::I8 | NumericKind::I16 | NumericKind::I32 | NumericKind::I64
        ) || self.is_float()
    }

    #[inline]
    pub fn is_bool(self) -> bool {
        self == NumericKind::Bool
    }

    /// Numeric kinds convert freely into each other; `bool` never does.
    pub fn can_cast_to(self, target: NumericKind) -> bool {
        self != target && !self.is_bool() && !target.is_bool()
    }
}

impl fmt::Display for NumericKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
