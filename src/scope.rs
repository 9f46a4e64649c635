//! Scope-resolution interface.
//!
//! The analyses only need one fact from scope resolution: whether a name refers
//! to a binding outside the function (module-level or an enclosing function).
//! Such names are excluded from the per-block definedness sets, since their
//! lifetime is not tracked by the function's local bookkeeping.

use std::collections::BTreeSet;

use crate::{
    ast::StmtKind,
    cfg::ControlFlowGraph,
};

/// Answers whether a name is bound outside the analysed function.
///
/// Implemented for closures, so ad-hoc resolvers can be passed directly:
///
/// ```rust
/// use bindscope::scope::ScopeInfo;
///
/// let scope = |name: &str| name == "print";
/// assert!(scope.refers_to_global("print"));
/// assert!(!scope.refers_to_global("x"));
/// ```
pub trait ScopeInfo {
    /// Returns `true` iff `name` is bound in an enclosing or module scope.
    fn refers_to_global(&self, name: &str) -> bool;
}

impl<F> ScopeInfo for F
where
    F: Fn(&str) -> bool,
{
    fn refers_to_global(&self, name: &str) -> bool {
        self(name)
    }
}

/// Scope information for a function in which every name is local.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LocalOnly;

impl ScopeInfo for LocalOnly {
    fn refers_to_global(&self, _name: &str) -> bool {
        false
    }
}

/// Scope information backed by an explicit set of non-local names.
///
/// # Examples
///
/// ```rust
/// use bindscope::scope::{DeclaredGlobals, ScopeInfo};
///
/// let scope = DeclaredGlobals::new(["counter"]).with_free(["outer"]);
/// assert!(scope.refers_to_global("counter"));
/// assert!(scope.refers_to_global("outer"));
/// assert!(!scope.refers_to_global("local"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeclaredGlobals {
    names: BTreeSet<String>,
}

impl DeclaredGlobals {
    /// Creates a scope whose non-local names are `names`.
    #[must_use]
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Collects the names listed in `global` statements anywhere in the function.
    #[must_use]
    pub fn from_cfg(cfg: &ControlFlowGraph) -> Self {
        let names = cfg
            .blocks()
            .iter()
            .flat_map(|block| &block.body)
            .filter_map(|stmt| match &stmt.kind {
                StmtKind::Global(names) => Some(names),
                _ => None,
            })
            .flatten()
            .cloned()
            .collect();

        Self { names }
    }

    /// Adds names bound in an enclosing function (free variables).
    #[must_use]
    pub fn with_free<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names.extend(names.into_iter().map(Into::into));
        self
    }

    /// Returns the non-local names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.names.iter().map(String::as_str)
    }
}

impl ScopeInfo for DeclaredGlobals {
    fn refers_to_global(&self, name: &str) -> bool {
        self.names.contains(name)
    }
}
