//! Operator definitions for Tern expressions.
//!
//! Operators on class operands dispatch to operator methods on the left
//! operand's class; [`BinaryOp::method_name`] gives the reserved name.

use std::fmt;

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    // Logical
    /// `||`
    Or,
    /// `&&`
    And,

    // Bitwise
    /// `|`
    BitOr,
    /// `^`
    BitXor,
    /// `&`
    BitAnd,

    // Equality and relational
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,

    // Shifts
    /// `<<`
    Shl,
    /// `>>`
    Shr,

    // Arithmetic
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Mod,
}

impl BinaryOp {
    /// Whether this operator produces a `bool` from its operands.
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge
        )
    }

    /// Whether this operator takes and produces `bool`.
    pub fn is_logical(&self) -> bool {
        matches!(self, BinaryOp::Or | BinaryOp::And)
    }

    /// Whether this operator only accepts integer operands.
    pub fn is_integer_only(&self) -> bool {
        matches!(
            self,
            BinaryOp::BitOr
                | BinaryOp::BitXor
                | BinaryOp::BitAnd
                | BinaryOp::Shl
                | BinaryOp::Shr
                | BinaryOp::Mod
        )
    }

    /// Reserved name of the operator method a class implements.
    pub fn method_name(&self) -> &'static str {
        match self {
            BinaryOp::Or => "$op_or",
            BinaryOp::And => "$op_and",
            BinaryOp::BitOr => "$op_bitor",
            BinaryOp::BitXor => "$op_bitxor",
            BinaryOp::BitAnd => "$op_bitand",
            BinaryOp::Eq => "$op_eq",
            BinaryOp::Ne => "$op_neq",
            BinaryOp::Lt => "$op_lt",
            BinaryOp::Le => "$op_lteq",
            BinaryOp::Gt => "$op_gt",
            BinaryOp::Ge => "$op_gteq",
            BinaryOp::Shl => "$op_shl",
            BinaryOp::Shr => "$op_shr",
            BinaryOp::Add => "$op_add",
            BinaryOp::Sub => "$op_sub",
            BinaryOp::Mul => "$op_mul",
            BinaryOp::Div => "$op_div",
            BinaryOp::Mod => "$op_mod",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinaryOp::Or => "||",
            BinaryOp::And => "&&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::BitAnd => "&",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
        };
        write!(f, "{}", s)
    }
}

/// Unary prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// `-`
    Neg,
    /// `!`
    Not,
    /// `~`
    BitNot,
}

impl UnaryOp {
    pub fn method_name(&self) -> &'static str {
        match self {
            UnaryOp::Neg => "$op_neg",
            UnaryOp::Not => "$op_not",
            UnaryOp::BitNot => "$op_bitnot",
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
            UnaryOp::BitNot => "~",
        };
        write!(f, "{}", s)
    }
}
