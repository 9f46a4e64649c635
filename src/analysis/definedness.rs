//! Definedness of local names.
//!
//! Forward data flow over a two-level certainty lattice answering, for every
//! block, whether a name is bound on every path reaching the block
//! ([`DefinitionLevel::Defined`]), on some but not all of them
//! ([`DefinitionLevel::PotentiallyDefined`]), or on none
//! ([`DefinitionLevel::Undefined`]).
//!
//! # Lattice
//!
//! A block state maps each name bound on at least one incoming path to its
//! level. A name missing from a reached state is unbound on every path so far;
//! `Undefined` is never stored, it is only what a lookup of a missing key
//! reports. Meeting two reached states:
//!
//! | left \ right | `Defined` | `PotentiallyDefined` | absent |
//! |---|---|---|---|
//! | `Defined` | `Defined` | `PotentiallyDefined` | `PotentiallyDefined` |
//! | `PotentiallyDefined` | `PotentiallyDefined` | `PotentiallyDefined` | `PotentiallyDefined` |
//! | absent | `PotentiallyDefined` | `PotentiallyDefined` | absent |
//!
//! A block not yet reached by any path has the state [`DefinednessState::Unreached`],
//! the identity of the meet.
//!
//! # Transfer
//!
//! Every name bound by a statement (assignment targets, `def`/`class` names,
//! import bindings) becomes `Defined`, regardless of its previous level. The
//! function parameters are `Defined` on entry to block 0.

use std::collections::{BTreeMap, BTreeSet};

use strum::{Display, EnumCount, EnumIter};
use tracing::debug;

use crate::{
    analysis::dataflow::{
        AnalysisResults, DataFlowAnalysis, DataFlowSolver, Direction, MeetSemiLattice,
    },
    ast::{walk_arguments, walk_stmt, Arguments, NameAccess, NameVisitor},
    cfg::{BlockId, CfgBlock, ControlFlowGraph},
    scope::ScopeInfo,
};

/// A set of local names, kept sorted.
pub type RequiredSet = BTreeSet<String>;

/// Binding certainty of a name at a program point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumCount)]
pub enum DefinitionLevel {
    /// No path reaching this point binds the name. Only ever a query result.
    Undefined,
    /// Some, but not all, paths reaching this point bind the name.
    PotentiallyDefined,
    /// Every path reaching this point binds the name.
    Defined,
}

impl DefinitionLevel {
    /// Joins the levels of two incoming paths.
    ///
    /// # Panics
    ///
    /// Panics if either operand is [`DefinitionLevel::Undefined`]; absence of a
    /// binding is represented by a missing key, never by a stored value.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        assert!(
            self != Self::Undefined && other != Self::Undefined,
            "Undefined can not be merged as a definition level ({self} / {other})"
        );

        if self == Self::Defined && other == Self::Defined {
            Self::Defined
        } else {
            Self::PotentiallyDefined
        }
    }

    /// Joins a level with a path that does not bind the name at all.
    ///
    /// # Panics
    ///
    /// Panics if `self` is [`DefinitionLevel::Undefined`].
    #[must_use]
    pub fn merge_absent(self) -> Self {
        assert!(
            self != Self::Undefined,
            "Undefined can not be merged as a definition level"
        );
        Self::PotentiallyDefined
    }
}

/// Definedness state at one program point.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DefinednessState {
    /// No path has reached this point yet.
    #[default]
    Unreached,
    /// Levels of every name bound on at least one path reaching this point.
    Reached(BTreeMap<String, DefinitionLevel>),
}

impl DefinednessState {
    /// A reached state in which nothing is bound.
    #[must_use]
    pub fn empty() -> Self {
        Self::Reached(BTreeMap::new())
    }

    /// Returns the level recorded for `name`, or `Undefined` if none is.
    #[must_use]
    pub fn level(&self, name: &str) -> DefinitionLevel {
        match self {
            Self::Unreached => DefinitionLevel::Undefined,
            Self::Reached(levels) => levels
                .get(name)
                .copied()
                .unwrap_or(DefinitionLevel::Undefined),
        }
    }

    /// Returns every name with a recorded level, in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        let levels = match self {
            Self::Unreached => None,
            Self::Reached(levels) => Some(levels),
        };
        levels.into_iter().flat_map(|levels| levels.keys().map(String::as_str))
    }

    /// Returns `true` if some path has reached this point.
    #[must_use]
    pub fn is_reached(&self) -> bool {
        matches!(self, Self::Reached(_))
    }
}

impl MeetSemiLattice for DefinednessState {
    fn meet(&self, other: &Self) -> Self {
        match (self, other) {
            (Self::Unreached, x) | (x, Self::Unreached) => x.clone(),
            (Self::Reached(left), Self::Reached(right)) => {
                let mut merged = BTreeMap::new();
                for (name, &level) in left {
                    let level = match right.get(name) {
                        Some(&other) => level.merge(other),
                        None => level.merge_absent(),
                    };
                    merged.insert(name.clone(), level);
                }
                for (name, &level) in right {
                    if !left.contains_key(name) {
                        merged.insert(name.clone(), level.merge_absent());
                    }
                }
                Self::Reached(merged)
            }
        }
    }
}

/// Marks every stored name as `Defined`.
struct Binder<'m>(&'m mut BTreeMap<String, DefinitionLevel>);

impl NameVisitor for Binder<'_> {
    fn visit_name(&mut self, name: &str, access: NameAccess) {
        if access == NameAccess::Store {
            self.0.insert(name.to_string(), DefinitionLevel::Defined);
        }
    }
}

/// The forward analysis driven by [`DataFlowSolver`].
struct DefinednessTransfer<'a> {
    args: &'a Arguments,
}

impl DataFlowAnalysis for DefinednessTransfer<'_> {
    type Lattice = DefinednessState;
    const DIRECTION: Direction = Direction::Forward;

    fn boundary(&self, _cfg: &ControlFlowGraph) -> DefinednessState {
        let mut levels = BTreeMap::new();
        walk_arguments(&mut Binder(&mut levels), self.args);
        DefinednessState::Reached(levels)
    }

    fn initial(&self, _cfg: &ControlFlowGraph) -> DefinednessState {
        DefinednessState::Unreached
    }

    fn transfer(&self, block: &CfgBlock, input: &DefinednessState) -> DefinednessState {
        let DefinednessState::Reached(levels) = input else {
            return DefinednessState::Unreached;
        };

        let mut levels = levels.clone();
        let mut binder = Binder(&mut levels);
        for stmt in &block.body {
            walk_stmt(&mut binder, stmt);
        }
        DefinednessState::Reached(levels)
    }
}

/// Per-block definedness of every local name in one function.
///
/// All results are computed eagerly by [`DefinednessAnalysis::new`] and are
/// read-only afterwards.
///
/// # Examples
///
/// ```rust
/// use bindscope::{
///     analysis::{DefinednessAnalysis, DefinitionLevel},
///     ast::{Arguments, Expr, Stmt},
///     cfg::CfgBuilder,
///     scope::LocalOnly,
/// };
///
/// // def f(a):
/// //     if a: x = 1
/// //     return x
/// let mut builder = CfgBuilder::new();
/// let entry = builder.add_block();
/// let then = builder.add_block_with(vec![Stmt::assign(Expr::name("x"), Expr::int(1))]);
/// let join = builder.add_block_with(vec![Stmt::ret(Some(Expr::name("x")))]);
/// builder.push(entry, Stmt::branch(Expr::name("a"), then, join));
/// builder.add_edge(entry, then).add_edge(entry, join).add_edge(then, join);
/// let cfg = builder.build()?;
///
/// let definedness = DefinednessAnalysis::new(&Arguments::positional(["a"]), &cfg, &LocalOnly);
/// assert_eq!(definedness.is_defined_at("a", entry), DefinitionLevel::Defined);
/// assert_eq!(definedness.is_defined_at("x", join), DefinitionLevel::PotentiallyDefined);
/// assert_eq!(definedness.is_defined_at("x", then), DefinitionLevel::Undefined);
/// # Ok::<(), bindscope::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DefinednessAnalysis {
    /// Solver output: block entry and exit states.
    results: AnalysisResults<DefinednessState>,
    /// Names with a recorded level at block entry, minus non-local names.
    defined: Vec<RequiredSet>,
}

impl DefinednessAnalysis {
    /// Computes definedness for every block of `cfg`.
    ///
    /// # Arguments
    ///
    /// * `args` - Formal parameters of the function, bound on entry
    /// * `cfg` - The function's control flow graph
    /// * `scope` - Resolves which names are bound outside the function
    #[must_use]
    pub fn new<S>(args: &Arguments, cfg: &ControlFlowGraph, scope: &S) -> Self
    where
        S: ScopeInfo + ?Sized,
    {
        let results = DataFlowSolver::new(DefinednessTransfer { args }).solve(cfg);

        let defined: Vec<RequiredSet> = results
            .in_states
            .iter()
            .map(|state| {
                state
                    .names()
                    .filter(|name| !scope.refers_to_global(name))
                    .map(str::to_string)
                    .collect()
            })
            .collect();

        debug!(
            blocks = cfg.block_count(),
            iterations = results.iterations,
            "definedness computed"
        );

        Self { results, defined }
    }

    /// Returns the level of `name` on entry to `block`.
    ///
    /// For block 0 this is the state after parameter binding; for any other
    /// block it is the merge of all predecessor exit states.
    ///
    /// # Panics
    ///
    /// Panics if `block` is out of range.
    #[must_use]
    pub fn is_defined_at(&self, name: &str, block: BlockId) -> DefinitionLevel {
        self.state_at(block).level(name)
    }

    /// Returns the level of `name` after the statements of `block`.
    ///
    /// # Panics
    ///
    /// Panics if `block` is out of range.
    #[must_use]
    pub fn is_defined_at_end(&self, name: &str, block: BlockId) -> DefinitionLevel {
        self.state_at_end(block).level(name)
    }

    /// Returns the local names with a recorded level on entry to `block`.
    ///
    /// # Panics
    ///
    /// Panics if `block` is out of range.
    #[must_use]
    pub fn get_defined_names_at(&self, block: BlockId) -> &RequiredSet {
        match self.defined.get(block.index()) {
            Some(names) => names,
            None => panic!("no definedness recorded for block {block}"),
        }
    }

    /// Returns the full state on entry to `block`.
    ///
    /// # Panics
    ///
    /// Panics if `block` is out of range.
    #[must_use]
    pub fn state_at(&self, block: BlockId) -> &DefinednessState {
        match self.results.in_state(block) {
            Some(state) => state,
            None => panic!("no definedness recorded for block {block}"),
        }
    }

    /// Returns the full state after the statements of `block`.
    ///
    /// # Panics
    ///
    /// Panics if `block` is out of range.
    #[must_use]
    pub fn state_at_end(&self, block: BlockId) -> &DefinednessState {
        match self.results.out_state(block) {
            Some(state) => state,
            None => panic!("no definedness recorded for block {block}"),
        }
    }

    /// Returns the number of block visits the fixpoint needed.
    #[must_use]
    pub fn iterations(&self) -> usize {
        self.results.iterations
    }
}
