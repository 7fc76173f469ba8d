//! Compiler configuration.

/// Options controlling one compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerOptions {
    /// Name of the module whose declarations print unqualified.
    pub entry_module: String,
    /// Register the built-in `core` module (the `String` class).
    pub with_prelude: bool,
    /// Maximum nesting of generic instantiations.
    pub max_instantiation_depth: usize,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            entry_module: "main".to_string(),
            with_prelude: true,
            max_instantiation_depth: 64,
        }
    }
}

impl CompilerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry_module(mut self, name: impl Into<String>) -> Self {
        self.entry_module = name.into();
        self
    }

    pub fn with_prelude(mut self, enabled: bool) -> Self {
        self.with_prelude = enabled;
        self
    }

    pub fn max_instantiation_depth(mut self, depth: usize) -> Self {
        self.max_instantiation_depth = depth;
        self
    }
}
