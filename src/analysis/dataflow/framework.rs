//! Data flow analysis framework trait and direction.
//!
//! This module defines the core abstraction for data flow analyses. Any
//! specific analysis (definedness, live names) implements the
//! [`DataFlowAnalysis`] trait to work with the solver.

use crate::{
    analysis::dataflow::lattice::MeetSemiLattice,
    cfg::{BlockId, CfgBlock, ControlFlowGraph},
};

/// Direction of data flow analysis.
///
/// The direction determines how information propagates through the CFG
/// and where values are combined with the meet operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Information flows forward, from entry to exit.
    ///
    /// At join points (blocks with multiple predecessors), values from
    /// all predecessors are combined using the meet operation.
    ///
    /// Examples: definedness, reaching definitions.
    Forward,

    /// Information flows backward, from exit to entry.
    ///
    /// At split points (blocks with multiple successors), values from
    /// all successors are combined.
    ///
    /// Examples: live variables.
    Backward,
}

/// A data flow analysis over a function's control flow graph.
///
/// Implementations provide the transfer function and boundary conditions; the
/// solver handles iteration to a fixpoint.
///
/// # Transfer Functions
///
/// For forward analyses: `out[B] = transfer(B, in[B])`
/// For backward analyses: `in[B] = transfer(B, out[B])`
///
/// # Example
///
/// ```rust,ignore
/// use bindscope::analysis::dataflow::{DataFlowAnalysis, Direction};
///
/// struct MyAnalysis;
///
/// impl DataFlowAnalysis for MyAnalysis {
///     type Lattice = MyLattice;
///     const DIRECTION: Direction = Direction::Forward;
///
///     fn boundary(&self, _cfg: &ControlFlowGraph) -> Self::Lattice {
///         MyLattice::at_entry()
///     }
///
///     fn initial(&self, _cfg: &ControlFlowGraph) -> Self::Lattice {
///         MyLattice::top()
///     }
///
///     fn transfer(&self, block: &CfgBlock, input: &Self::Lattice) -> Self::Lattice {
///         input.apply(block)
///     }
/// }
/// ```
pub trait DataFlowAnalysis {
    /// The lattice type for this analysis.
    type Lattice: MeetSemiLattice;

    /// The direction of this analysis.
    const DIRECTION: Direction;

    /// Returns the value at the boundary of the function.
    ///
    /// For forward analyses, this is the value at function entry.
    /// For backward analyses, this is the value at function exit(s).
    fn boundary(&self, cfg: &ControlFlowGraph) -> Self::Lattice;

    /// Returns the initial value for interior blocks.
    ///
    /// This must be the identity of the lattice's meet: a block whose state is
    /// still `initial` has not been reached by any path yet.
    fn initial(&self, cfg: &ControlFlowGraph) -> Self::Lattice;

    /// Computes the transfer function for a basic block.
    ///
    /// # Arguments
    ///
    /// * `block` - The block being processed
    /// * `input` - The state flowing into (forward) or out of (backward) the block
    ///
    /// # Returns
    ///
    /// The abstract state after flowing through the block.
    fn transfer(&self, block: &CfgBlock, input: &Self::Lattice) -> Self::Lattice;
}

/// Results of a data flow analysis.
///
/// This provides access to the computed abstract values at block boundaries.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResults<L> {
    /// Input state for each block (before transfer function).
    pub in_states: Vec<L>,
    /// Output state for each block (after transfer function).
    pub out_states: Vec<L>,
    /// Number of block visits the solver needed to converge.
    pub iterations: usize,
}

impl<L> AnalysisResults<L> {
    /// Creates new analysis results with the given states.
    #[must_use]
    pub fn new(in_states: Vec<L>, out_states: Vec<L>, iterations: usize) -> Self {
        Self {
            in_states,
            out_states,
            iterations,
        }
    }

    /// Returns the input state for a block, or `None` if the block is out of range.
    #[must_use]
    pub fn in_state(&self, block: BlockId) -> Option<&L> {
        self.in_states.get(block.index())
    }

    /// Returns the output state for a block, or `None` if the block is out of range.
    #[must_use]
    pub fn out_state(&self, block: BlockId) -> Option<&L> {
        self.out_states.get(block.index())
    }

    /// Returns the number of blocks.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.in_states.len()
    }
}
