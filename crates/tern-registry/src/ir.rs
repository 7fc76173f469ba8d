//! Typed intermediate representation.
//!
//! Every [`Value`] carries its resolved [`Type`]. Conversions are explicit
//! [`ValueKind::Cast`] nodes and calls carry their final argument lists, so
//! codegen never has to re-run resolution.

use ordered_float::OrderedFloat;
use tern_core::{FuncId, ModuleId, Privacy, Span, Type, TypeId, VarId};
use tern_syntax::ast::{BinaryOp, UnaryOp};

/// A typed value.
#[derive(Debug, Clone, PartialEq)]
pub struct Value {
    pub kind: ValueKind,
    pub ty: Type,
    pub span: Span,
}

/// What produces a value.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueKind {
    Constant(Constant),
    /// The `index`th parameter of the enclosing function.
    Param { index: usize, name: String },
    Local { id: VarId, name: String },
    Global { id: VarId, name: String },
    /// A function used as a value.
    Function(FuncId),
    /// Instance field read; `index` is the position in the owner's field list.
    Field {
        base: Box<Value>,
        owner: TypeId,
        index: usize,
    },
    /// Static field of a class.
    StaticField { owner: TypeId, index: usize },
    Call(Box<Call>),
    /// Conversion of the inner value to this value's type.
    Cast(Box<Value>),
}

/// A literal constant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Constant {
    Int(i64),
    Float(OrderedFloat<f64>),
    Bool(bool),
    Str(String),
}

/// A resolved call.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub callee: Callee,
    /// Final arguments after receiver, default and cast insertion.
    pub args: Vec<Value>,
    /// Set for `new T(args)`.
    pub is_initialization: bool,
}

/// The target of a call.
#[derive(Debug, Clone, PartialEq)]
pub enum Callee {
    Function(FuncId),
    /// A value of function type.
    Indirect(Box<Value>),
    /// A built-in numeric operator.
    Operator(Operator),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Binary(BinaryOp),
    Unary(UnaryOp),
}

impl Value {
    pub fn new(kind: ValueKind, ty: Type, span: Span) -> Self {
        Self { kind, ty, span }
    }

    pub fn constant(constant: Constant, ty: Type, span: Span) -> Self {
        Self::new(ValueKind::Constant(constant), ty, span)
    }

    pub fn call(call: Call, ty: Type, span: Span) -> Self {
        Self::new(ValueKind::Call(Box::new(call)), ty, span)
    }

    /// Wrap this value in an explicit conversion to `target`.
    pub fn cast_to(self, target: Type) -> Self {
        let span = self.span;
        Self::new(ValueKind::Cast(Box::new(self)), target, span)
    }

    pub fn as_call(&self) -> Option<&Call> {
        match &self.kind {
            ValueKind::Call(call) => Some(call),
            _ => None,
        }
    }

    pub fn as_constant(&self) -> Option<&Constant> {
        match &self.kind {
            ValueKind::Constant(constant) => Some(constant),
            _ => None,
        }
    }

    pub fn is_cast(&self) -> bool {
        matches!(self.kind, ValueKind::Cast(_))
    }
}

/// A statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Let {
        id: VarId,
        name: String,
        ty: Type,
        init: Option<Value>,
        is_mutable: bool,
    },
    Expr(Value),
    Return(Option<Value>),
    Block(Block),
    If {
        condition: Value,
        then_block: Block,
        else_block: Option<Block>,
    },
    While {
        condition: Value,
        body: Block,
    },
}

/// A scoped list of statements.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

/// A module-level variable.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalVar {
    pub id: VarId,
    pub name: String,
    pub ty: Type,
    pub init: Option<Value>,
    pub is_mutable: bool,
    pub privacy: Privacy,
    pub span: Span,
}

/// The output of transforming one module.
#[derive(Debug, Clone, PartialEq)]
pub struct IrModule {
    pub name: String,
    pub module: ModuleId,
    /// Every function realized while transforming, generic instances included.
    pub functions: Vec<FuncId>,
    pub globals: Vec<GlobalVar>,
    /// Every type realized while transforming, generic instances included.
    pub types: Vec<TypeId>,
}

impl IrModule {
    pub fn new(name: impl Into<String>, module: ModuleId) -> Self {
        Self {
            name: name.into(),
            module,
            functions: Vec::new(),
            globals: Vec::new(),
            types: Vec::new(),
        }
    }
}
