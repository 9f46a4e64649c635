//! Worklist-based data flow solver.
//!
//! This module provides the iterative solver that computes fixpoints for
//! data flow analyses. It uses a worklist algorithm seeded in reverse postorder
//! (forward) or postorder (backward).
//!
//! # Algorithm
//!
//! 1. Initialize all blocks with the initial value
//! 2. Set the boundary value at entry (forward) or exits (backward)
//! 3. Add all reachable blocks to the worklist
//! 4. While the worklist is non-empty:
//!    a. Remove a block from the worklist
//!    b. Compute the input by meeting values from predecessors/successors
//!    c. Apply the transfer function to get the output
//!    d. If the output changed, add affected blocks to the worklist
//!
//! Blocks unreachable from the entry are never processed and keep the initial
//! value, which (being the meet identity) has no effect on reachable blocks.
//!
//! # Complexity
//!
//! The total work is O(n * h) block visits, where n is the number of blocks and
//! h the height of the lattice.

use std::collections::VecDeque;

use tracing::debug;

use crate::{
    analysis::dataflow::{
        framework::{AnalysisResults, DataFlowAnalysis, Direction},
        lattice::MeetSemiLattice,
    },
    cfg::{BlockId, ControlFlowGraph},
};

/// Worklist-based data flow solver.
///
/// # Usage
///
/// ```rust,ignore
/// use bindscope::analysis::dataflow::DataFlowSolver;
///
/// let results = DataFlowSolver::new(analysis).solve(&cfg);
/// let in_state = results.in_state(block);
/// ```
pub struct DataFlowSolver<A: DataFlowAnalysis> {
    /// The analysis being solved.
    analysis: A,
    /// Input state for each block.
    in_states: Vec<A::Lattice>,
    /// Output state for each block.
    out_states: Vec<A::Lattice>,
    /// Boundary value, kept for re-meeting at the boundary blocks.
    boundary: Option<A::Lattice>,
    /// Worklist of blocks to process.
    worklist: VecDeque<BlockId>,
    /// Whether each block is currently in the worklist (for deduplication).
    in_worklist: Vec<bool>,
    /// Number of iterations performed.
    iterations: usize,
}

impl<A: DataFlowAnalysis> DataFlowSolver<A> {
    /// Creates a new solver for the given analysis.
    #[must_use]
    pub fn new(analysis: A) -> Self {
        Self {
            analysis,
            in_states: Vec::new(),
            out_states: Vec::new(),
            boundary: None,
            worklist: VecDeque::new(),
            in_worklist: Vec::new(),
            iterations: 0,
        }
    }

    /// Returns the number of iterations performed.
    #[must_use]
    pub const fn iterations(&self) -> usize {
        self.iterations
    }

    /// Solves the data flow analysis to a fixpoint.
    ///
    /// Returns the input and output states for each basic block.
    pub fn solve(mut self, cfg: &ControlFlowGraph) -> AnalysisResults<A::Lattice> {
        self.initialize(cfg);
        self.iterate(cfg);

        debug!(
            blocks = cfg.block_count(),
            iterations = self.iterations,
            direction = ?A::DIRECTION,
            "data flow fixpoint reached"
        );

        AnalysisResults::new(self.in_states, self.out_states, self.iterations)
    }

    /// Initializes the solver state.
    fn initialize(&mut self, cfg: &ControlFlowGraph) {
        let num_blocks = cfg.block_count();
        let initial = self.analysis.initial(cfg);
        let boundary = self.analysis.boundary(cfg);

        self.in_states = vec![initial.clone(); num_blocks];
        self.out_states = vec![initial; num_blocks];
        self.in_worklist = vec![false; num_blocks];

        match A::DIRECTION {
            Direction::Forward => {
                self.in_states[cfg.entry().index()] = boundary.clone();
            }
            Direction::Backward => {
                for &exit in cfg.exits() {
                    self.out_states[exit.index()] = boundary.clone();
                }
            }
        }
        self.boundary = Some(boundary);

        let order = match A::DIRECTION {
            Direction::Forward => cfg.reverse_postorder(),
            Direction::Backward => cfg.postorder(),
        };

        for block in order {
            self.worklist.push_back(block);
            self.in_worklist[block.index()] = true;
        }
    }

    /// Main iteration loop.
    fn iterate(&mut self, cfg: &ControlFlowGraph) {
        while let Some(block) = self.worklist.pop_front() {
            self.in_worklist[block.index()] = false;
            self.iterations += 1;

            let changed = match A::DIRECTION {
                Direction::Forward => self.process_forward(block, cfg),
                Direction::Backward => self.process_backward(block, cfg),
            };

            if changed {
                self.add_affected_to_worklist(block, cfg);
            }
        }
    }

    /// Meets the states of `sources`, starting from `seed` when given.
    fn meet_all(
        states: &[A::Lattice],
        sources: &[BlockId],
        seed: Option<&A::Lattice>,
    ) -> Option<A::Lattice> {
        sources
            .iter()
            .map(|source| &states[source.index()])
            .chain(seed)
            .fold(None, |acc: Option<A::Lattice>, state| match acc {
                None => Some(state.clone()),
                Some(acc) => Some(acc.meet(state)),
            })
    }

    /// Processes a block in forward direction.
    ///
    /// Returns `true` if the output state changed.
    fn process_forward(&mut self, block: BlockId, cfg: &ControlFlowGraph) -> bool {
        let seed = if block == cfg.entry() {
            self.boundary.as_ref()
        } else {
            None
        };

        if let Some(input) = Self::meet_all(&self.out_states, cfg.predecessors(block), seed) {
            self.in_states[block.index()] = input;
        }

        let output = self
            .analysis
            .transfer(&cfg[block], &self.in_states[block.index()]);

        let changed = output != self.out_states[block.index()];
        self.out_states[block.index()] = output;

        changed
    }

    /// Processes a block in backward direction.
    ///
    /// Returns `true` if the input state changed.
    fn process_backward(&mut self, block: BlockId, cfg: &ControlFlowGraph) -> bool {
        let seed = if cfg.exits().contains(&block) {
            self.boundary.as_ref()
        } else {
            None
        };

        if let Some(output) = Self::meet_all(&self.in_states, cfg.successors(block), seed) {
            self.out_states[block.index()] = output;
        }

        let input = self
            .analysis
            .transfer(&cfg[block], &self.out_states[block.index()]);

        let changed = input != self.in_states[block.index()];
        self.in_states[block.index()] = input;

        changed
    }

    /// Adds affected blocks to the worklist after a change.
    fn add_affected_to_worklist(&mut self, block: BlockId, cfg: &ControlFlowGraph) {
        let affected = match A::DIRECTION {
            Direction::Forward => cfg.successors(block),
            Direction::Backward => cfg.predecessors(block),
        };

        for &next in affected {
            if !self.in_worklist[next.index()] {
                self.worklist.push_back(next);
                self.in_worklist[next.index()] = true;
            }
        }
    }
}
