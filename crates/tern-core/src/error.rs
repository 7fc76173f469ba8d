//! Error types for the Tern semantic core.
//!
//! Every failure of the resolution and transformation phases is a
//! [`CompilationError`]. Each variant carries the offending [`Span`] and maps
//! onto one of the coarse [`ErrorKind`] categories reported to users.
//!
//! ## Error Hierarchy
//!
//! ```text
//! CompilationError
//! ├── ErrorKind::TypeError      - wrong kind, arity, cast and privacy failures
//! ├── ErrorKind::VariableError  - undeclared, redeclared or ambiguous names
//! ├── ErrorKind::ArgumentError  - illegal declaration modifier combinations
//! ├── ErrorKind::SyntaxError    - surfaced unmodified from the parser
//! └── ErrorKind::Internal       - compiler defects
//! ```
//!
//! [`Diagnostic`] is the reporting form: it adds the remediation text
//! (note/help/info) and renders a source excerpt.

use std::fmt;

use thiserror::Error;

use crate::Span;

// ============================================================================
// Error Kinds
// ============================================================================

/// Coarse category of a compilation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    TypeError,
    VariableError,
    ArgumentError,
    SyntaxError,
    Internal,
}

impl ErrorKind {
    /// Returns a human-readable name for this error kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::TypeError => "type error",
            ErrorKind::VariableError => "variable error",
            ErrorKind::ArgumentError => "argument error",
            ErrorKind::SyntaxError => "syntax error",
            ErrorKind::Internal => "internal compiler error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Compilation Errors
// ============================================================================

/// Errors that occur while resolving names, types and calls.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompilationError {
    /// A syntax error reported by the parser, carried through unchanged.
    #[error("at {span}: {message}")]
    Syntax { message: String, span: Span },

    /// A name that is not visible from the current scope.
    #[error("at {span}: '{name}' was not declared in this scope")]
    Undeclared { name: String, span: Span },

    /// A name declared twice in the same scope.
    #[error("at {span}: '{name}' is already declared in this scope (previous declaration at {previous})")]
    Redeclaration {
        name: String,
        span: Span,
        /// Where the first declaration lives.
        previous: Span,
    },

    /// A lookup found an item of the wrong kind.
    #[error("at {span}: expected a {required} but '{name}' is a {found}")]
    WrongKind {
        name: String,
        /// The kind the context needed ("type", "value", ...).
        required: &'static str,
        /// The kind actually found.
        found: &'static str,
        span: Span,
    },

    /// A private type referenced from outside its declaring module.
    #[error("at {span}: type '{name}' is private to module '{module}'")]
    PrivateType {
        name: String,
        module: String,
        span: Span,
    },

    /// A generic type or function used with the wrong number of arguments.
    #[error("at {span}: '{name}' expects {expected} generic argument(s) but {got} were given")]
    GenericArity {
        name: String,
        expected: usize,
        got: usize,
        span: Span,
    },

    /// No cast exists between two types.
    #[error("at {span}: cannot cast from '{from}' to '{to}'")]
    InvalidCast { from: String, to: String, span: Span },

    /// A value does not have the type the context requires.
    #[error("at {span}: type mismatch: expected '{expected}', found '{found}'")]
    TypeMismatch {
        expected: String,
        found: String,
        span: Span,
    },

    /// A call omitted a parameter that has no default value.
    #[error("at {span}: missing value for parameter '{param}' of '{function}'")]
    MissingArgument {
        function: String,
        param: String,
        span: Span,
    },

    /// A default value expression has an incompatible type.
    #[error("at {span}: default value of parameter '{param}' of '{function}' has type '{found}' but '{expected}' is required")]
    DefaultValueMismatch {
        function: String,
        param: String,
        expected: String,
        found: String,
        span: Span,
    },

    /// No candidate of an overload set accepts the arguments.
    #[error("at {span}: no matching overload for call to '{name}' with arguments ({args})")]
    NoMatchingOverload {
        name: String,
        /// Argument types, comma separated.
        args: String,
        span: Span,
    },

    /// Several candidates accept the arguments equally well.
    #[error("at {span}: call to '{name}' is ambiguous between {candidates}")]
    AmbiguousCall {
        name: String,
        candidates: String,
        span: Span,
    },

    /// An instance method called through a type path (`Type::method`).
    #[error("at {span}: cannot access non-static method '{name}' as if it was static")]
    NonStaticAccess { name: String, span: Span },

    /// A static method called through a value (`value.method`).
    #[error("at {span}: cannot access static method '{name}' through an instance")]
    StaticAccess { name: String, span: Span },

    /// The callee of a call is neither a function nor a function value.
    #[error("at {span}: '{name}' is a {found} and cannot be called")]
    NotCallable {
        name: String,
        found: &'static str,
        span: Span,
    },

    /// A member that does not exist on a type.
    #[error("at {span}: '{owner}' has no member named '{member}'")]
    UnknownMember {
        owner: String,
        member: String,
        span: Span,
    },

    /// An illegal combination of declaration modifiers.
    #[error("at {span}: invalid modifiers on '{name}': {reason}")]
    InvalidModifier {
        name: String,
        reason: &'static str,
        span: Span,
    },

    /// A class with the `extends` attribute declared something it may not.
    #[error("at {span}: class '{class}' extends an existing type and cannot declare {what}")]
    ExtendsViolation {
        class: String,
        /// What was declared ("new fields", ...).
        what: &'static str,
        span: Span,
    },

    /// An override whose return type differs from the overridden method.
    #[error("at {span}: override of '{name}' changes the return type from '{expected}' to '{found}'")]
    OverrideReturnMismatch {
        name: String,
        expected: String,
        found: String,
        span: Span,
    },

    /// A class inheriting from something that is not a class.
    #[error("at {span}: cannot inherit from '{name}' because it is not a class")]
    InvalidParent { name: String, span: Span },

    /// A `return` with a value outside of a function, or without one where
    /// a value is required.
    #[error("at {span}: invalid return: {reason}")]
    InvalidReturn { reason: &'static str, span: Span },

    /// Generic instantiation nested beyond the configured limit.
    #[error("at {span}: instantiation depth limit of {limit} exceeded while instantiating '{name}'")]
    InstantiationDepth {
        name: String,
        limit: usize,
        span: Span,
    },

    /// A broken internal invariant.
    #[error("at {span}: internal compiler error: {message}")]
    Internal { message: String, span: Span },
}

impl CompilationError {
    /// Get the span where this error occurred.
    pub fn span(&self) -> Span {
        match self {
            CompilationError::Syntax { span, .. }
            | CompilationError::Undeclared { span, .. }
            | CompilationError::Redeclaration { span, .. }
            | CompilationError::WrongKind { span, .. }
            | CompilationError::PrivateType { span, .. }
            | CompilationError::GenericArity { span, .. }
            | CompilationError::InvalidCast { span, .. }
            | CompilationError::TypeMismatch { span, .. }
            | CompilationError::MissingArgument { span, .. }
            | CompilationError::DefaultValueMismatch { span, .. }
            | CompilationError::NoMatchingOverload { span, .. }
            | CompilationError::AmbiguousCall { span, .. }
            | CompilationError::NonStaticAccess { span, .. }
            | CompilationError::StaticAccess { span, .. }
            | CompilationError::NotCallable { span, .. }
            | CompilationError::UnknownMember { span, .. }
            | CompilationError::InvalidModifier { span, .. }
            | CompilationError::ExtendsViolation { span, .. }
            | CompilationError::OverrideReturnMismatch { span, .. }
            | CompilationError::InvalidParent { span, .. }
            | CompilationError::InvalidReturn { span, .. }
            | CompilationError::InstantiationDepth { span, .. }
            | CompilationError::Internal { span, .. } => *span,
        }
    }

    /// The category this error is reported under.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CompilationError::Syntax { .. } => ErrorKind::SyntaxError,
            CompilationError::Undeclared { .. }
            | CompilationError::Redeclaration { .. }
            | CompilationError::NoMatchingOverload { .. }
            | CompilationError::AmbiguousCall { .. }
            | CompilationError::UnknownMember { .. } => ErrorKind::VariableError,
            CompilationError::InvalidModifier { .. } => ErrorKind::ArgumentError,
            CompilationError::WrongKind { .. }
            | CompilationError::PrivateType { .. }
            | CompilationError::GenericArity { .. }
            | CompilationError::InvalidCast { .. }
            | CompilationError::TypeMismatch { .. }
            | CompilationError::MissingArgument { .. }
            | CompilationError::DefaultValueMismatch { .. }
            | CompilationError::NonStaticAccess { .. }
            | CompilationError::StaticAccess { .. }
            | CompilationError::NotCallable { .. }
            | CompilationError::ExtendsViolation { .. }
            | CompilationError::OverrideReturnMismatch { .. }
            | CompilationError::InvalidParent { .. }
            | CompilationError::InvalidReturn { .. }
            | CompilationError::InstantiationDepth { .. } => ErrorKind::TypeError,
            CompilationError::Internal { .. } => ErrorKind::Internal,
        }
    }

    /// Shorthand for an internal invariant violation.
    pub fn internal(message: impl Into<String>, span: Span) -> Self {
        CompilationError::Internal {
            message: message.into(),
            span,
        }
    }
}

// ============================================================================
// Diagnostics
// ============================================================================

/// A user-facing report built from a [`CompilationError`].
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub kind: ErrorKind,
    pub message: String,
    pub span: Span,
    pub note: Option<String>,
    pub help: Option<String>,
    pub info: Option<String>,
}

impl Diagnostic {
    /// Create a diagnostic with no remediation text.
    pub fn new(kind: ErrorKind, message: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            message: message.into(),
            span,
            note: None,
            help: None,
            info: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn with_info(mut self, info: impl Into<String>) -> Self {
        self.info = Some(info.into());
        self
    }

    /// Format the diagnostic with a source excerpt and caret pointer.
    pub fn render(&self, source: &str) -> String {
        let mut output = String::new();
        let line = self.span.line;
        let column = self.span.col.max(1);

        output.push_str(&format!(
            "{} at {}:{}: {}\n",
            self.kind, line, column, self.message
        ));

        if let Some(line_text) = Self::get_line(source, line) {
            output.push_str("  |\n");
            output.push_str(&format!("{:>3} | {}\n", line, line_text));

            let indent = " ".repeat(column as usize - 1);
            let pointer = if self.span.len <= 1 {
                "^".to_string()
            } else {
                "^".to_string() + &"~".repeat((self.span.len - 1) as usize)
            };
            output.push_str(&format!("  | {}{}\n", indent, pointer));
        }

        for (label, text) in [
            ("note", &self.note),
            ("help", &self.help),
            ("info", &self.info),
        ] {
            if let Some(text) = text {
                output.push_str(&format!("  = {}: {}\n", label, text));
            }
        }

        output
    }

    /// Get the text of a specific line (1-indexed).
    fn get_line(source: &str, line_num: u32) -> Option<&str> {
        if line_num == 0 {
            return None;
        }
        source.lines().nth(line_num as usize - 1)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}: {}", self.kind, self.span, self.message)
    }
}

impl From<CompilationError> for Diagnostic {
    fn from(error: CompilationError) -> Self {
        let kind = error.kind();
        let span = error.span();
        let message = match &error {
            // The span is already part of the rendered header.
            CompilationError::Syntax { message, .. } => message.clone(),
            other => {
                let full = other.to_string();
                match full.split_once(": ") {
                    Some((_, rest)) => rest.to_string(),
                    None => full,
                }
            }
        };
        let diagnostic = Diagnostic::new(kind, message, span);

        match error {
            CompilationError::PrivateType { name, module, .. } => diagnostic
                .with_note(format!("'{}' is declared private inside '{}'", name, module))
                .with_help("declare the type as public or use it from inside its module")
                .with_info("private types are visible to their module and its submodules"),
            CompilationError::WrongKind {
                required, found, ..
            } => diagnostic.with_note(format!("a {} was required, a {} was found", required, found)),
            CompilationError::Redeclaration { previous, .. } => {
                diagnostic.with_note(format!("previously declared at {}", previous))
            }
            CompilationError::GenericArity { expected, .. } => diagnostic.with_help(format!(
                "provide exactly {} generic argument(s)",
                expected
            )),
            CompilationError::NonStaticAccess { .. } => {
                diagnostic.with_help("call the method through an instance using '.'")
            }
            CompilationError::StaticAccess { .. } => {
                diagnostic.with_help("call the method through its type using '::'")
            }
            CompilationError::MissingArgument { param, .. } => {
                diagnostic.with_help(format!("pass a value for '{}' or give it a default", param))
            }
            CompilationError::ExtendsViolation { .. } => diagnostic
                .with_note("classes marked 'extends' may only add non-virtual methods")
                .with_help("declare a subclass instead"),
            CompilationError::InstantiationDepth { .. } => diagnostic
                .with_info("generic expansion that never repeats its arguments cannot terminate"),
            CompilationError::Internal { .. } => {
                diagnostic.with_info("this is a compiler defect, please report it")
            }
            _ => diagnostic,
        }
    }
}
