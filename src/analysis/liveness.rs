//! Liveness of local names.
//!
//! A name is *live* at the end of a block if some path leaving the block reaches
//! a read of the name before any rebinding of it.
//!
//! Two implementations are provided:
//!
//! - [`LivenessAnalysis`] answers single `(name, block)` queries on demand with a
//!   forward graph search. Phi placement only asks about one predecessor per
//!   merge block, so the query volume stays small and nothing is cached.
//! - [`LiveNames`] is the textbook backward data flow formulation, computing
//!   live-in and live-out sets for every block at once:
//!
//!   - `USE[B]` = names read in B before any write ([`BlockUsage::loads`])
//!   - `DEF[B]` = names written in B before any read ([`BlockUsage::stores`])
//!   - `OUT[B]` = ∪{IN[S] | S is a successor of B}
//!   - `IN[B]` = USE[B] ∪ (OUT[B] - DEF[B])
//!
//! Both agree on every query; the second is used to cross-check the first.

use std::collections::{BTreeSet, VecDeque};

use tracing::trace;

use crate::{
    analysis::{
        dataflow::{AnalysisResults, DataFlowAnalysis, DataFlowSolver, Direction, MeetSemiLattice},
        BlockUsage,
    },
    cfg::{BlockId, CfgBlock, ControlFlowGraph},
};

/// On-demand liveness queries over one function's graph.
///
/// # Examples
///
/// ```rust
/// use bindscope::{analysis::LivenessAnalysis, ast::{Expr, Stmt}, cfg::CfgBuilder};
///
/// let mut builder = CfgBuilder::new();
/// let b0 = builder.add_block_with(vec![Stmt::assign(Expr::name("x"), Expr::int(1))]);
/// let b1 = builder.add_block_with(vec![Stmt::ret(Some(Expr::name("x")))]);
/// builder.add_edge(b0, b1);
/// let cfg = builder.build()?;
///
/// let liveness = LivenessAnalysis::new(&cfg);
/// assert!(liveness.is_live_at_end("x", b0));
/// assert!(!liveness.is_live_at_end("x", b1));
/// # Ok::<(), bindscope::Error>(())
/// ```
#[derive(Debug, Clone, Copy)]
pub struct LivenessAnalysis<'a> {
    cfg: &'a ControlFlowGraph,
}

impl<'a> LivenessAnalysis<'a> {
    /// Creates a liveness oracle for `cfg`.
    #[must_use]
    pub fn new(cfg: &'a ControlFlowGraph) -> Self {
        Self { cfg }
    }

    /// Returns the graph this oracle answers for.
    #[must_use]
    pub fn cfg(&self) -> &'a ControlFlowGraph {
        self.cfg
    }

    /// Returns `true` iff some path leaving `block` reads `name` before writing it.
    ///
    /// Exit blocks have nothing live at their end. Otherwise the successors are
    /// searched breadth-first: a block that exposes a read of `name` ends the
    /// search, a block that kills `name` ends that path, any other block passes
    /// the search on to its own successors. Each block is visited at most once,
    /// so loops terminate.
    ///
    /// # Panics
    ///
    /// Panics if `block` is out of range.
    #[must_use]
    pub fn is_live_at_end(&self, name: &str, block: BlockId) -> bool {
        let successors = self.cfg.successors(block);
        if successors.is_empty() {
            return false;
        }

        let mut visited = vec![false; self.cfg.block_count()];
        let mut queue: VecDeque<BlockId> = successors.iter().copied().collect();

        while let Some(current) = queue.pop_front() {
            if visited[current.index()] {
                continue;
            }
            visited[current.index()] = true;

            let usage = BlockUsage::of_block(&self.cfg[current]);
            if usage.is_exposed_load(name) {
                trace!(name, %block, reader = %current, "live at end");
                return true;
            }
            if !usage.kills(name) {
                queue.extend(self.cfg.successors(current).iter().copied());
            }
        }

        false
    }
}

/// Set of live names at a program point.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LiveSet(BTreeSet<String>);

impl LiveSet {
    /// Returns `true` if `name` is live.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    /// Returns the live names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.iter().map(String::as_str)
    }

    /// Returns the number of live names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no name is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl MeetSemiLattice for LiveSet {
    /// Meet is union (a name is live if it is live on ANY successor path).
    fn meet(&self, other: &Self) -> Self {
        LiveSet(self.0.union(&other.0).cloned().collect())
    }
}

/// Backward live-name analysis over the whole graph.
///
/// # Example
///
/// ```rust,ignore
/// let results = LiveNames::new(&cfg).solve(&cfg);
/// let live_out = results.out_state(block).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct LiveNames {
    /// Block-local classification, indexed by block.
    usage: Vec<BlockUsage>,
}

impl LiveNames {
    /// Classifies every block of `cfg`.
    #[must_use]
    pub fn new(cfg: &ControlFlowGraph) -> Self {
        Self {
            usage: cfg.blocks().iter().map(BlockUsage::of_block).collect(),
        }
    }

    /// Runs the analysis to its fixpoint.
    #[must_use]
    pub fn solve(self, cfg: &ControlFlowGraph) -> AnalysisResults<LiveSet> {
        DataFlowSolver::new(self).solve(cfg)
    }
}

impl DataFlowAnalysis for LiveNames {
    type Lattice = LiveSet;
    const DIRECTION: Direction = Direction::Backward;

    fn boundary(&self, _cfg: &ControlFlowGraph) -> LiveSet {
        // Nothing is read after the function returns.
        LiveSet::default()
    }

    fn initial(&self, _cfg: &ControlFlowGraph) -> LiveSet {
        LiveSet::default()
    }

    fn transfer(&self, block: &CfgBlock, output: &LiveSet) -> LiveSet {
        let usage = &self.usage[block.id.index()];
        let mut live: BTreeSet<String> = output
            .0
            .iter()
            .filter(|name| !usage.kills(name))
            .cloned()
            .collect();
        live.extend(usage.loads().iter().cloned());
        LiveSet(live)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ast::{Expr, Stmt},
        cfg::CfgBuilder,
    };

    fn read(name: &str) -> Stmt {
        Stmt::expr(Expr::name(name))
    }

    fn write(name: &str) -> Stmt {
        Stmt::assign(Expr::name(name), Expr::int(0))
    }

    #[test]
    fn test_exit_block_has_nothing_live() {
        let mut builder = CfgBuilder::new();
        let b0 = builder.add_block_with(vec![read("x")]);
        let cfg = builder.build().expect("valid graph");
        assert!(!LivenessAnalysis::new(&cfg).is_live_at_end("x", b0));
    }

    #[test]
    fn test_write_in_successor_blocks_liveness() {
        // b0 -> b1 (x = 0) -> b2 (read x)
        let mut builder = CfgBuilder::new();
        let b0 = builder.add_block();
        let b1 = builder.add_block_with(vec![write("x")]);
        let b2 = builder.add_block_with(vec![read("x")]);
        builder.add_edge(b0, b1).add_edge(b1, b2);
        let cfg = builder.build().expect("valid graph");

        let liveness = LivenessAnalysis::new(&cfg);
        assert!(!liveness.is_live_at_end("x", b0));
        assert!(liveness.is_live_at_end("x", b1));
    }

    #[test]
    fn test_read_on_one_branch_is_live() {
        // b0 -> b1 (x = 0), b0 -> b2 (read x)
        let mut builder = CfgBuilder::new();
        let b0 = builder.add_block();
        let b1 = builder.add_block_with(vec![write("x")]);
        let b2 = builder.add_block_with(vec![read("x")]);
        builder.add_edge(b0, b1).add_edge(b0, b2);
        let cfg = builder.build().expect("valid graph");

        assert!(LivenessAnalysis::new(&cfg).is_live_at_end("x", b0));
    }

    #[test]
    fn test_loop_terminates_and_finds_read() {
        // b0 -> b1 -> b2 -> b1, b1 -> b3 (read x)
        let mut builder = CfgBuilder::new();
        let b0 = builder.add_block();
        let b1 = builder.add_block();
        let b2 = builder.add_block();
        let b3 = builder.add_block_with(vec![read("x")]);
        builder
            .add_edge(b0, b1)
            .add_edge(b1, b2)
            .add_edge(b2, b1)
            .add_edge(b1, b3);
        let cfg = builder.build().expect("valid graph");

        let liveness = LivenessAnalysis::new(&cfg);
        assert!(liveness.is_live_at_end("x", b2));
        assert!(!liveness.is_live_at_end("y", b2));
    }

    #[test]
    fn test_read_after_write_in_same_block_is_not_exposed() {
        // b0 -> b1 (x = 0; read x)
        let mut builder = CfgBuilder::new();
        let b0 = builder.add_block();
        let b1 = builder.add_block_with(vec![write("x"), read("x")]);
        builder.add_edge(b0, b1);
        let cfg = builder.build().expect("valid graph");

        assert!(!LivenessAnalysis::new(&cfg).is_live_at_end("x", b0));
    }

    #[test]
    fn test_live_names_fixpoint() {
        // b0 (x = 0) -> b1 (read x; y = 0) -> b2 (read y)
        let mut builder = CfgBuilder::new();
        let b0 = builder.add_block_with(vec![write("x")]);
        let b1 = builder.add_block_with(vec![read("x"), write("y")]);
        let b2 = builder.add_block_with(vec![read("y")]);
        builder.add_edge(b0, b1).add_edge(b1, b2);
        let cfg = builder.build().expect("valid graph");

        let results = LiveNames::new(&cfg).solve(&cfg);
        let out0 = results.out_state(b0).expect("block exists");
        assert!(out0.contains("x"));
        assert!(!out0.contains("y"));

        let out1 = results.out_state(b1).expect("block exists");
        assert_eq!(out1.names().collect::<Vec<_>>(), vec!["y"]);

        assert!(results.out_state(b2).expect("block exists").is_empty());
        assert!(results.in_state(b0).expect("block exists").is_empty());
    }

    #[test]
    fn test_live_set_meet_is_union() {
        let a = LiveSet(["a", "b"].iter().map(|s| s.to_string()).collect());
        let b = LiveSet(["b", "c"].iter().map(|s| s.to_string()).collect());
        let merged = a.meet(&b);
        assert_eq!(merged.len(), 3);
        assert_eq!(merged, b.meet(&a));
        assert_eq!(merged.meet(&merged), merged);
    }
}
