//! Cast-count ranking for overload resolution.
//!
//! A candidate is viable when it accepts the argument count and every
//! argument is either the parameter type or castable to it. Viable
//! candidates are ranked by the total number of cast steps; ties go to the
//! candidate with more exact matches.

use tern_core::{CompilationError, FuncId, Result, Span, Type};
use tern_registry::Registry;

/// How one argument reaches its parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgConversion {
    /// Same type.
    Exact,
    /// Cast chain of the given length.
    Cast(usize),
    /// Extra argument of a variadic function, passed unchanged.
    Variadic,
}

impl ArgConversion {
    fn steps(self) -> usize {
        match self {
            ArgConversion::Cast(steps) => steps,
            ArgConversion::Exact | ArgConversion::Variadic => 0,
        }
    }

    fn is_exact(self) -> bool {
        matches!(self, ArgConversion::Exact)
    }
}

/// A viable candidate and what it costs to call it.
#[derive(Debug, Clone)]
pub struct OverloadMatch {
    pub func: FuncId,
    /// One entry per supplied argument.
    pub conversions: Vec<ArgConversion>,
    /// Total cast steps (lower is better).
    pub casts: usize,
}

/// Match the argument types against one candidate.
pub fn try_match(registry: &Registry, func: FuncId, arg_types: &[Type]) -> Option<OverloadMatch> {
    let candidate = registry.func(func);
    if !candidate.accepts_arity(arg_types.len()) {
        return None;
    }

    let mut conversions = Vec::with_capacity(arg_types.len());
    for (index, arg) in arg_types.iter().enumerate() {
        let conversion = match candidate.params.get(index) {
            Some(param) if arg.is(&param.ty) => ArgConversion::Exact,
            Some(param) => ArgConversion::Cast(registry.cast_chain(arg, &param.ty)?),
            None => ArgConversion::Variadic,
        };
        conversions.push(conversion);
    }

    let casts = conversions.iter().map(|conversion| conversion.steps()).sum();
    Some(OverloadMatch {
        func,
        conversions,
        casts,
    })
}

/// Select the cheapest viable candidate.
///
/// Every candidate with the lowest cast count stays in the running; of
/// those, the ones with the most exact matches win. More than one winner
/// is ambiguous.
pub fn find_best_match(
    registry: &Registry,
    name: &str,
    viable: Vec<OverloadMatch>,
    span: Span,
) -> Result<OverloadMatch> {
    let Some(fewest) = viable.iter().map(|m| m.casts).min() else {
        return Err(CompilationError::internal("no viable overload to rank", span));
    };
    let cheapest: Vec<OverloadMatch> = viable.into_iter().filter(|m| m.casts == fewest).collect();
    let most_exact = cheapest.iter().map(count_exact).max().unwrap_or(0);
    let mut best: Vec<OverloadMatch> = cheapest
        .into_iter()
        .filter(|m| count_exact(m) == most_exact)
        .collect();

    if best.len() == 1 {
        return Ok(best.remove(0));
    }
    Err(CompilationError::AmbiguousCall {
        name: name.to_string(),
        candidates: best
            .iter()
            .map(|m| registry.pretty_func(m.func))
            .collect::<Vec<_>>()
            .join(" and "),
        span,
    })
}

fn count_exact(m: &OverloadMatch) -> usize {
    m.conversions.iter().filter(|c| c.is_exact()).count()
}
