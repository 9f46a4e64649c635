//! Binding analyses over one function's control flow graph.
//!
//! This module answers the questions a code generator asks before lowering a
//! function body with local names:
//!
//! - [`LivenessAnalysis`] - is a name read again after a block ends?
//! - [`DefinednessAnalysis`] - is a name bound, possibly bound, or unbound at a block?
//! - [`PhiAnalysis`] - which names need a value-selecting phi at each merge block?
//!
//! # Architecture
//!
//! - [`dataflow`] - Generic lattice traits and the worklist fixpoint solver
//! - `local` - Block-local read/write classification ([`BlockUsage`])
//! - `liveness` - On-demand liveness queries and the [`LiveNames`] fixpoint
//! - `definedness` - Forward definedness levels per block
//! - `phi` - Required phis at merge points
//!
//! All analyses are read-only over the graph. Independent functions can be
//! analysed in parallel with [`analyze_functions`].
//!
//! # Usage
//!
//! ```rust
//! use bindscope::{
//!     analysis::{compute_liveness_info, compute_required_phis},
//!     ast::{Arguments, Expr, Stmt},
//!     cfg::CfgBuilder,
//!     scope::LocalOnly,
//! };
//!
//! let mut builder = CfgBuilder::new();
//! let entry = builder.add_block();
//! let then = builder.add_block_with(vec![Stmt::assign(Expr::name("x"), Expr::int(1))]);
//! let join = builder.add_block_with(vec![Stmt::ret(Some(Expr::name("x")))]);
//! builder.add_edge(entry, then).add_edge(entry, join).add_edge(then, join);
//! let cfg = builder.build()?;
//!
//! let liveness = compute_liveness_info(&cfg);
//! let phis = compute_required_phis(&Arguments::default(), &cfg, &liveness, &LocalOnly);
//!
//! assert!(phis.is_required("x", join));
//! assert!(phis.is_potentially_undefined_after("x", then));
//! # Ok::<(), bindscope::Error>(())
//! ```

pub mod dataflow;

mod definedness;
mod liveness;
mod local;
mod phi;

pub use definedness::{DefinednessAnalysis, DefinednessState, DefinitionLevel, RequiredSet};
pub use liveness::{LiveNames, LiveSet, LivenessAnalysis};
pub use local::BlockUsage;
pub use phi::PhiAnalysis;

use std::fmt;

use rayon::prelude::*;
use tracing::debug;

use crate::{
    ast::Arguments,
    cfg::ControlFlowGraph,
    scope::{LocalOnly, ScopeInfo},
};

/// Creates the liveness oracle for `cfg`.
#[must_use]
pub fn compute_liveness_info(cfg: &ControlFlowGraph) -> LivenessAnalysis<'_> {
    LivenessAnalysis::new(cfg)
}

/// Computes definedness and the required phis of `cfg` in one step.
///
/// # Arguments
///
/// * `args` - Formal parameters of the function
/// * `cfg` - The function's control flow graph
/// * `liveness` - Liveness oracle over the same graph
/// * `scope` - Resolves which names are bound outside the function
#[must_use]
pub fn compute_required_phis<'a, S>(
    args: &Arguments,
    cfg: &'a ControlFlowGraph,
    liveness: &LivenessAnalysis<'_>,
    scope: &S,
) -> PhiAnalysis<'a>
where
    S: ScopeInfo + ?Sized,
{
    let definedness = DefinednessAnalysis::new(args, cfg, scope);
    PhiAnalysis::new(definedness, cfg, liveness)
}

/// The inputs needed to analyse one function.
pub struct FunctionUnit {
    /// Name of the function, used for logging and reporting.
    pub name: String,
    /// Formal parameters.
    pub args: Arguments,
    /// Control flow graph of the function body.
    pub cfg: ControlFlowGraph,
    /// Scope resolution for the function's names.
    pub scope: Box<dyn ScopeInfo + Send + Sync>,
}

impl FunctionUnit {
    /// Creates a unit in which every name is local.
    #[must_use]
    pub fn new(name: impl Into<String>, args: Arguments, cfg: ControlFlowGraph) -> Self {
        Self {
            name: name.into(),
            args,
            cfg,
            scope: Box::new(LocalOnly),
        }
    }

    /// Replaces the scope resolution of this unit.
    #[must_use]
    pub fn with_scope(mut self, scope: impl ScopeInfo + Send + Sync + 'static) -> Self {
        self.scope = Box::new(scope);
        self
    }
}

impl fmt::Debug for FunctionUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionUnit")
            .field("name", &self.name)
            .field("args", &self.args)
            .field("blocks", &self.cfg.block_count())
            .finish_non_exhaustive()
    }
}

/// Liveness, definedness and phi results for one function.
#[derive(Debug, Clone)]
pub struct FunctionAnalysis<'a> {
    unit: &'a FunctionUnit,
    liveness: LivenessAnalysis<'a>,
    phis: PhiAnalysis<'a>,
}

impl<'a> FunctionAnalysis<'a> {
    /// Runs every analysis over `unit`.
    #[must_use]
    pub fn compute(unit: &'a FunctionUnit) -> Self {
        let liveness = compute_liveness_info(&unit.cfg);
        let phis = compute_required_phis(&unit.args, &unit.cfg, &liveness, unit.scope.as_ref());

        debug!(
            function = %unit.name,
            blocks = unit.cfg.block_count(),
            merges = phis.merge_blocks().count(),
            "function analysed"
        );

        Self {
            unit,
            liveness,
            phis,
        }
    }

    /// Returns the function's name.
    #[must_use]
    pub fn name(&self) -> &'a str {
        &self.unit.name
    }

    /// Returns the unit the results were computed for.
    #[must_use]
    pub fn unit(&self) -> &'a FunctionUnit {
        self.unit
    }

    /// Returns the liveness oracle.
    #[must_use]
    pub fn liveness(&self) -> &LivenessAnalysis<'a> {
        &self.liveness
    }

    /// Returns the definedness results.
    #[must_use]
    pub fn definedness(&self) -> &DefinednessAnalysis {
        self.phis.definedness()
    }

    /// Returns the required phis.
    #[must_use]
    pub fn phis(&self) -> &PhiAnalysis<'a> {
        &self.phis
    }
}

/// Analyses independent functions in parallel.
///
/// Results are returned in the order of `units`.
#[must_use]
pub fn analyze_functions(units: &[FunctionUnit]) -> Vec<FunctionAnalysis<'_>> {
    let results: Vec<FunctionAnalysis<'_>> =
        units.par_iter().map(FunctionAnalysis::compute).collect();
    debug!(functions = results.len(), "batch analysed");
    results
}
