//! Phi-node requirements at control flow merge points.
//!
//! A merge block (two or more predecessors) needs a phi for a local name when
//! the name has a recorded definedness level on entry to the block and its value
//! is still read afterwards. Liveness is checked at the end of the block's first
//! predecessor only. The graph is expected to have its critical edges split:
//! every predecessor of a merge block then has the merge block as its only
//! successor, so all predecessors agree on what is live at their end.
//!
//! The resulting sets, together with the definedness levels, tell the code
//! generator where to place value-selecting phis and where a read must be
//! guarded against an unbound name.

use std::collections::BTreeSet;

use tracing::debug;

use crate::{
    analysis::{
        definedness::{DefinednessAnalysis, DefinitionLevel, RequiredSet},
        liveness::LivenessAnalysis,
    },
    cfg::{BlockId, ControlFlowGraph},
};

static EMPTY: RequiredSet = BTreeSet::new();

/// Required phis per merge block of one function.
///
/// # Examples
///
/// ```rust
/// use bindscope::{
///     analysis::{DefinednessAnalysis, LivenessAnalysis, PhiAnalysis},
///     ast::{Arguments, Expr, Stmt},
///     cfg::CfgBuilder,
///     scope::LocalOnly,
/// };
///
/// // if c: x = 1
/// // else: x = 2
/// // return x
/// let mut builder = CfgBuilder::new();
/// let entry = builder.add_block();
/// let left = builder.add_block_with(vec![Stmt::assign(Expr::name("x"), Expr::int(1))]);
/// let right = builder.add_block_with(vec![Stmt::assign(Expr::name("x"), Expr::int(2))]);
/// let join = builder.add_block_with(vec![Stmt::ret(Some(Expr::name("x")))]);
/// builder
///     .add_edge(entry, left)
///     .add_edge(entry, right)
///     .add_edge(left, join)
///     .add_edge(right, join);
/// let cfg = builder.build()?;
///
/// let definedness = DefinednessAnalysis::new(&Arguments::positional(["c"]), &cfg, &LocalOnly);
/// let liveness = LivenessAnalysis::new(&cfg);
/// let phis = PhiAnalysis::new(definedness, &cfg, &liveness);
///
/// assert!(phis.is_required("x", join));
/// assert!(phis.is_required_after("x", left));
/// assert!(!phis.is_potentially_undefined_after("x", left));
/// # Ok::<(), bindscope::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct PhiAnalysis<'a> {
    cfg: &'a ControlFlowGraph,
    definedness: DefinednessAnalysis,
    /// `Some` exactly for blocks with two or more predecessors.
    required_phis: Vec<Option<RequiredSet>>,
}

impl<'a> PhiAnalysis<'a> {
    /// Computes the required phis of every merge block in `cfg`.
    ///
    /// # Arguments
    ///
    /// * `definedness` - Definedness computed over the same graph
    /// * `cfg` - The function's control flow graph
    /// * `liveness` - Liveness oracle over the same graph
    #[must_use]
    pub fn new(
        definedness: DefinednessAnalysis,
        cfg: &'a ControlFlowGraph,
        liveness: &LivenessAnalysis<'_>,
    ) -> Self {
        let required_phis: Vec<Option<RequiredSet>> = cfg
            .blocks()
            .iter()
            .map(|block| {
                let first_pred = match block.predecessors.as_slice() {
                    [first, _, ..] => *first,
                    _ => return None,
                };

                let required: RequiredSet = definedness
                    .get_defined_names_at(block.id)
                    .iter()
                    .filter(|name| liveness.is_live_at_end(name, first_pred))
                    .cloned()
                    .collect();
                Some(required)
            })
            .collect();

        debug!(
            merge_blocks = required_phis.iter().flatten().count(),
            phis = required_phis.iter().flatten().map(BTreeSet::len).sum::<usize>(),
            "phi requirements computed"
        );

        Self {
            cfg,
            definedness,
            required_phis,
        }
    }

    /// Returns `true` if `block` needs a phi for `name`.
    ///
    /// Always `false` for blocks with fewer than two predecessors.
    ///
    /// # Panics
    ///
    /// Panics if `block` is out of range.
    #[must_use]
    pub fn is_required(&self, name: &str, block: BlockId) -> bool {
        self.required_phis(block)
            .is_some_and(|required| required.contains(name))
    }

    /// Returns `true` if the edge leaving `block` needs a phi for `name`.
    ///
    /// Branch points never carry a phi requirement themselves; any merge need is
    /// recorded at the merge block. With exactly one successor the question is
    /// forwarded to that successor.
    ///
    /// # Panics
    ///
    /// Panics if `block` is out of range.
    #[must_use]
    pub fn is_required_after(&self, name: &str, block: BlockId) -> bool {
        match self.cfg[block].unique_successor() {
            Some(succ) => self.is_required(name, succ),
            None => false,
        }
    }

    /// Returns `true` if `name` may be unbound once control leaves `block`.
    ///
    /// Answers whether the code generator must guard reads of `name` in the
    /// (first) successor against an unbound name.
    ///
    /// # Panics
    ///
    /// Panics if `block` has no successor, or if the successor records no level
    /// for `name`: the caller must only ask about names that are at least
    /// potentially bound along the edge.
    #[must_use]
    pub fn is_potentially_undefined_after(&self, name: &str, block: BlockId) -> bool {
        let successors = self.cfg.successors(block);
        assert!(
            !successors.is_empty(),
            "block {block} has no successor to check '{name}' against"
        );

        let succ = successors[0];
        let level = self.definedness.is_defined_at(name, succ);
        assert!(
            level != DefinitionLevel::Undefined,
            "'{name}' is undefined on the edge {block} -> {succ}"
        );

        level == DefinitionLevel::PotentiallyDefined
    }

    /// Returns the required phis of the first successor of `block`.
    ///
    /// Empty for exit blocks and for successors that are not merge blocks.
    ///
    /// # Panics
    ///
    /// Panics if `block` is out of range.
    #[must_use]
    pub fn get_all_required_after(&self, block: BlockId) -> &RequiredSet {
        match self.cfg.successors(block).first() {
            Some(&succ) => self.required_phis(succ).unwrap_or(&EMPTY),
            None => &EMPTY,
        }
    }

    /// Returns the local names with a recorded definedness level on entry to `block`.
    ///
    /// # Panics
    ///
    /// Panics if `block` is out of range.
    #[must_use]
    pub fn get_all_defined_at(&self, block: BlockId) -> &RequiredSet {
        self.definedness.get_defined_names_at(block)
    }

    /// Returns the required phis of `block`, or `None` if it is not a merge block.
    ///
    /// # Panics
    ///
    /// Panics if `block` is out of range.
    #[must_use]
    pub fn required_phis(&self, block: BlockId) -> Option<&RequiredSet> {
        match self.required_phis.get(block.index()) {
            Some(required) => required.as_ref(),
            None => panic!("no phi requirements recorded for block {block}"),
        }
    }

    /// Iterates over every merge block and its required phis, in block order.
    pub fn merge_blocks(&self) -> impl Iterator<Item = (BlockId, &RequiredSet)> + '_ {
        self.required_phis
            .iter()
            .enumerate()
            .filter_map(|(index, required)| required.as_ref().map(|r| (BlockId::new(index), r)))
    }

    /// Returns the definedness results the phis were derived from.
    #[must_use]
    pub fn definedness(&self) -> &DefinednessAnalysis {
        &self.definedness
    }

    /// Returns the graph the phis were computed for.
    #[must_use]
    pub fn cfg(&self) -> &'a ControlFlowGraph {
        self.cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ast::{Arguments, Expr, Stmt},
        cfg::CfgBuilder,
        scope::{DeclaredGlobals, LocalOnly},
    };

    fn assign(name: &str) -> Stmt {
        Stmt::assign(Expr::name(name), Expr::int(1))
    }

    fn read(name: &str) -> Stmt {
        Stmt::expr(Expr::name(name))
    }

    fn analyse(cfg: &ControlFlowGraph) -> PhiAnalysis<'_> {
        let definedness = DefinednessAnalysis::new(&Arguments::default(), cfg, &LocalOnly);
        PhiAnalysis::new(definedness, cfg, &LivenessAnalysis::new(cfg))
    }

    /// b0 (x = 1) -> b1 (y = 1) -> b3, b0 -> b2 -> b3, b3 -> b4 (`tail`)
    fn diamond(tail: Vec<Stmt>) -> ControlFlowGraph {
        let mut builder = CfgBuilder::new();
        let b0 = builder.add_block_with(vec![assign("x")]);
        let b1 = builder.add_block_with(vec![assign("y")]);
        let b2 = builder.add_block();
        let b3 = builder.add_block();
        let b4 = builder.add_block_with(tail);
        builder
            .add_edge(b0, b1)
            .add_edge(b0, b2)
            .add_edge(b1, b3)
            .add_edge(b2, b3)
            .add_edge(b3, b4);
        builder.build().expect("valid graph")
    }

    #[test]
    fn test_phi_needed_for_live_name() {
        let cfg = diamond(vec![read("y")]);
        let phis = analyse(&cfg);
        let join = BlockId::new(3);

        assert!(phis.is_required("y", join));
        assert!(!phis.is_required("x", join));
        assert_eq!(
            phis.definedness().is_defined_at("y", join),
            DefinitionLevel::PotentiallyDefined
        );
        assert_eq!(
            phis.definedness().is_defined_at("x", join),
            DefinitionLevel::Defined
        );
    }

    #[test]
    fn test_no_phi_when_rebound_before_read() {
        let cfg = diamond(vec![assign("y"), read("y")]);
        let phis = analyse(&cfg);
        assert!(!phis.is_required("y", BlockId::new(3)));
        assert!(phis.required_phis(BlockId::new(3)).is_some_and(BTreeSet::is_empty));
    }

    #[test]
    fn test_only_merge_blocks_are_recorded() {
        let cfg = diamond(vec![read("x"), read("y")]);
        let phis = analyse(&cfg);

        let merges: Vec<_> = phis.merge_blocks().map(|(block, _)| block).collect();
        assert_eq!(merges, vec![BlockId::new(3)]);
        for index in [0, 1, 2, 4] {
            assert!(phis.required_phis(BlockId::new(index)).is_none());
        }
        assert!(!phis.is_required("x", BlockId::new(4)));
    }

    #[test]
    fn test_required_after_follows_unique_successor() {
        let cfg = diamond(vec![read("y")]);
        let phis = analyse(&cfg);

        assert!(phis.is_required_after("y", BlockId::new(1)));
        assert!(phis.is_required_after("y", BlockId::new(2)));
        // Branch point: two successors.
        assert!(!phis.is_required_after("y", BlockId::new(0)));
        // Exit block: no successor.
        assert!(!phis.is_required_after("y", BlockId::new(4)));
    }

    #[test]
    fn test_get_all_required_after() {
        let cfg = diamond(vec![read("x"), read("y")]);
        let phis = analyse(&cfg);

        let after: Vec<_> = phis.get_all_required_after(BlockId::new(1)).iter().cloned().collect();
        assert_eq!(after, vec!["x".to_string(), "y".to_string()]);
        assert!(phis.get_all_required_after(BlockId::new(4)).is_empty());
        // First successor of b0 is b1, which is not a merge block.
        assert!(phis.get_all_required_after(BlockId::new(0)).is_empty());
    }

    #[test]
    fn test_potentially_undefined_after() {
        let cfg = diamond(vec![read("y")]);
        let phis = analyse(&cfg);

        assert!(phis.is_potentially_undefined_after("y", BlockId::new(1)));
        assert!(!phis.is_potentially_undefined_after("x", BlockId::new(1)));
        assert!(!phis.is_potentially_undefined_after("x", BlockId::new(0)));
    }

    #[test]
    #[should_panic(expected = "has no successor")]
    fn test_potentially_undefined_after_exit_panics() {
        let cfg = diamond(vec![]);
        let phis = analyse(&cfg);
        let _ = phis.is_potentially_undefined_after("x", BlockId::new(4));
    }

    #[test]
    #[should_panic(expected = "is undefined on the edge")]
    fn test_potentially_undefined_after_unknown_name_panics() {
        let cfg = diamond(vec![]);
        let phis = analyse(&cfg);
        let _ = phis.is_potentially_undefined_after("never_bound", BlockId::new(1));
    }

    #[test]
    fn test_globals_never_need_phis() {
        let mut builder = CfgBuilder::new();
        let b0 = builder.add_block_with(vec![Stmt::global(["g"]), assign("g")]);
        let b1 = builder.add_block_with(vec![assign("g")]);
        let b2 = builder.add_block_with(vec![read("g")]);
        builder.add_edge(b0, b1).add_edge(b0, b2).add_edge(b1, b2);
        let cfg = builder.build().expect("valid graph");

        let scope = DeclaredGlobals::from_cfg(&cfg);
        let definedness = DefinednessAnalysis::new(&Arguments::default(), &cfg, &scope);
        let phis = PhiAnalysis::new(definedness, &cfg, &LivenessAnalysis::new(&cfg));

        assert!(!phis.is_required("g", b2));
        assert!(phis.get_all_defined_at(b2).is_empty());
    }

    #[test]
    fn test_loop_header_phi() {
        // i = 0; while i < n: i = i + 1; return i
        let mut builder = CfgBuilder::new();
        let entry = builder.add_block_with(vec![assign("i")]);
        let header = builder.add_block();
        let body = builder.add_block_with(vec![Stmt::assign(
            Expr::name("i"),
            Expr::add(Expr::name("i"), Expr::int(1)),
        )]);
        let exit = builder.add_block_with(vec![Stmt::ret(Some(Expr::name("i")))]);
        builder.push(header, Stmt::branch(Expr::lt(Expr::name("i"), Expr::name("n")), body, exit));
        builder
            .add_edge(entry, header)
            .add_edge(header, body)
            .add_edge(body, header)
            .add_edge(header, exit);
        let cfg = builder.build().expect("valid graph");

        let definedness =
            DefinednessAnalysis::new(&Arguments::positional(["n"]), &cfg, &LocalOnly);
        let phis = PhiAnalysis::new(definedness, &cfg, &LivenessAnalysis::new(&cfg));

        assert!(phis.is_required("i", header));
        // `n` is never rebound, but it is live and recorded at the header.
        assert!(phis.is_required("n", header));
        assert!(phis.is_required_after("i", body));
        assert!(!phis.is_potentially_undefined_after("i", body));
    }
}
