//! Linkage names and diagnostic names.
//!
//! # Mangling
//!
//! ```text
//! type      _T <module> & <len><name> Cv<uuid> [ClsGSt A1<arg> A2<arg> ... ClsE]
//! function  _T <module> & <len><name> Fv<uuid> [ClsGSt ... ClsE] [P<parent>] Fp <params> FnE
//! module    <len><segment> per path segment
//! ```
//!
//! Built-in types use fixed tags (`v`, `i32`, `R<inner>`, `Ft...E`, `Gp<n>`).
//! The uuid makes distinct declarations distinct even when they share a name;
//! the generic block makes distinct instantiations distinct.

use tern_core::{FuncId, ModuleId, Type, TypeId};

use crate::Registry;

impl Registry {
    /// Mangled form of any type.
    pub fn mangle(&self, ty: &Type) -> String {
        let mut out = String::new();
        self.mangle_into(ty, &mut out);
        out
    }

    /// Mangled name of a defined type.
    pub fn mangled_type_name(&self, id: TypeId) -> String {
        self.mangle(&self.type_of(id))
    }

    /// Linkage name of a function: its external name if set, else mangled.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn mangled_func_name(&self, id: FuncId) -> String {
        let func = self.func(id);
        if let Some(external) = &func.external_name {
            return external.clone();
        }

        let mut out = String::from("_T");
        self.mangle_module(func.module, &mut out);
        out.push('&');
        push_len_prefixed(&func.name, &mut out);
        out.push_str("Fv");
        out.push_str(&func.uuid.as_u64().to_string());
        self.mangle_generics(&func.generics, &mut out);
        if let Some(parent) = func.parent {
            out.push('P');
            out.push_str(&self.mangled_type_name(parent));
        }
        out.push_str("Fp");
        for param in &func.params {
            self.mangle_into(&param.ty, &mut out);
        }
        if func.is_variadic() {
            out.push_str("Va");
        }
        out.push_str("FnE");
        out
    }

    fn mangle_into(&self, ty: &Type, out: &mut String) {
        match ty {
            Type::Void => out.push('v'),
            Type::Numeric(kind) => out.push_str(kind.mangle_tag()),
            Type::Reference(inner) => {
                out.push('R');
                self.mangle_into(inner, out);
            }
            Type::Function(function) => {
                out.push_str("Ft");
                for param in &function.params {
                    self.mangle_into(param, out);
                }
                if function.is_variadic {
                    out.push_str("Va");
                }
                out.push_str("Rt");
                self.mangle_into(&function.ret, out);
                out.push('E');
            }
            Type::Alias(alias) => self.mangle_into(&alias.target, out),
            Type::Placeholder(placeholder) => {
                out.push_str("Gp");
                out.push_str(&placeholder.index.to_string());
            }
            Type::Defined(defined) => {
                let entry = self.defined(defined.id);
                out.push_str("_T");
                self.mangle_module(entry.module, out);
                out.push('&');
                push_len_prefixed(&entry.name, out);
                out.push_str("Cv");
                out.push_str(&defined.uuid.as_u64().to_string());
                self.mangle_generics(&defined.generics, out);
            }
        }
    }

    fn mangle_module(&self, module: ModuleId, out: &mut String) {
        for segment in self.modules().path(module) {
            push_len_prefixed(segment, out);
        }
    }

    fn mangle_generics(&self, generics: &[Type], out: &mut String) {
        if generics.is_empty() {
            return;
        }
        out.push_str("ClsGSt");
        // Ordinals count from one.
        for (ordinal, arg) in (1..).zip(generics) {
            out.push('A');
            out.push_str(&ordinal.to_string());
            self.mangle_into(arg, out);
        }
        out.push_str("ClsE");
    }

    // ========================================================================
    // Pretty names
    // ========================================================================

    /// Human-readable name of a type, for diagnostics only.
    pub fn pretty(&self, ty: &Type) -> String {
        match ty {
            Type::Void => "void".to_string(),
            Type::Numeric(kind) => kind.name().to_string(),
            Type::Reference(inner) => format!("&{}", self.pretty(inner)),
            Type::Function(function) => {
                let mut params: Vec<String> =
                    function.params.iter().map(|param| self.pretty(param)).collect();
                if function.is_variadic {
                    params.push("...".to_string());
                }
                format!("func({}) -> {}", params.join(", "), self.pretty(&function.ret))
            }
            Type::Alias(alias) => self.alias(alias.id).name.clone(),
            Type::Placeholder(placeholder) => placeholder.name.clone(),
            Type::Defined(defined) => {
                let entry = self.defined(defined.id);
                let mut name = self.qualify(entry.module, &entry.name);
                self.pretty_generics(&defined.generics, &mut name);
                name
            }
        }
    }

    /// Human-readable name of a function, for diagnostics only.
    pub fn pretty_func(&self, id: FuncId) -> String {
        let func = self.func(id);
        let mut name = match func.parent {
            Some(parent) => format!("{}::{}", self.pretty(&self.type_of(parent)), func.name),
            None => self.qualify(func.module, &func.name),
        };
        self.pretty_generics(&func.generics, &mut name);
        name
    }

    /// Comma separated list of type names.
    pub fn pretty_list(&self, types: &[Type]) -> String {
        types
            .iter()
            .map(|ty| self.pretty(ty))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn qualify(&self, module: ModuleId, name: &str) -> String {
        if self.entry_module() == Some(module) {
            name.to_string()
        } else {
            self.modules().qualified_name(module, name)
        }
    }

    fn pretty_generics(&self, generics: &[Type], out: &mut String) {
        if !generics.is_empty() {
            out.push('<');
            out.push_str(&self.pretty_list(generics));
            out.push('>');
        }
    }
}

fn push_len_prefixed(segment: &str, out: &mut String) {
    out.push_str(&segment.len().to_string());
    out.push_str(segment);
}
