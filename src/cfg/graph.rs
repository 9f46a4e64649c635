//! Control Flow Graph implementation.

use std::{fmt::Write, ops::Index};

use tracing::debug;

use crate::{
    ast::Stmt,
    cfg::{BlockId, CfgBlock, ValidationConfig},
    utils::{escape_dot, left_justified_label},
    Error::{Empty, GraphError},
    Result,
};

/// A control flow graph of one function.
///
/// The graph exclusively owns its blocks; analyses refer to them by [`BlockId`]
/// only and keep their per-block results in flat vectors. Blocks and edges do not
/// change after construction.
///
/// # Construction
///
/// Graphs are produced by the CFG-construction stage, either as a list of fully
/// linked [`CfgBlock`]s ([`ControlFlowGraph::from_blocks`]) or incrementally
/// through [`crate::cfg::CfgBuilder`].
///
/// ```rust
/// use bindscope::cfg::CfgBuilder;
///
/// let mut builder = CfgBuilder::new();
/// let entry = builder.add_block();
/// let exit = builder.add_block();
/// builder.add_edge(entry, exit);
/// let cfg = builder.build()?;
///
/// assert_eq!(cfg.block_count(), 2);
/// assert_eq!(cfg.exits(), &[exit]);
/// # Ok::<(), bindscope::Error>(())
/// ```
///
/// # Thread Safety
///
/// `ControlFlowGraph` is [`Send`] and [`Sync`]; any number of analyses may read
/// the same graph concurrently.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlFlowGraph {
    /// Blocks, indexed by [`BlockId::index`].
    blocks: Vec<CfgBlock>,
    /// Blocks without successors, in index order.
    exits: Vec<BlockId>,
}

impl ControlFlowGraph {
    /// Creates a control flow graph from linked blocks with the default validation.
    ///
    /// # Errors
    ///
    /// See [`ControlFlowGraph::from_blocks_with_config`].
    pub fn from_blocks(blocks: Vec<CfgBlock>) -> Result<Self> {
        Self::from_blocks_with_config(blocks, ValidationConfig::default())
    }

    /// Creates a control flow graph from linked blocks.
    ///
    /// # Arguments
    ///
    /// * `blocks` - Blocks in index order; `blocks[i].id` must be `i`
    /// * `config` - Which structural checks to run
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The block list is empty ([`crate::Error::Empty`])
    /// - A block id does not match its position, or an edge points past the last block
    /// - An enabled check from `config` fails; edge validation also requires every
    ///   `Branch`/`Jump` target to be a successor of its block
    pub fn from_blocks_with_config(blocks: Vec<CfgBlock>, config: ValidationConfig) -> Result<Self> {
        if blocks.is_empty() {
            return Err(Empty);
        }

        let block_count = blocks.len();
        for (position, block) in blocks.iter().enumerate() {
            if block.id.index() != position {
                return Err(malformed_error!(
                    "Block at position {} carries id {}",
                    position,
                    block.id
                ));
            }

            for &target in block.successors.iter().chain(block.predecessors.iter()) {
                if target.index() >= block_count {
                    return Err(GraphError(format!(
                        "Block {} has an edge to {} which exceeds block count {}",
                        block.id, target, block_count
                    )));
                }
            }
        }

        if config.enable_edge_validation {
            Self::validate_edges(&blocks)?;
        }

        if config.enable_entry_validation && !blocks[0].predecessors.is_empty() {
            return Err(malformed_error!(
                "Entry block has {} predecessors",
                blocks[0].predecessors.len()
            ));
        }

        let exits: Vec<BlockId> = blocks
            .iter()
            .filter(|block| block.is_exit())
            .map(|block| block.id)
            .collect();

        if config.enable_exit_validation && exits.is_empty() {
            return Err(malformed_error!("Function has no exit block"));
        }

        let cfg = Self { blocks, exits };

        if config.enable_reachability_validation {
            let reachable = cfg.postorder().len();
            if reachable != block_count {
                return Err(malformed_error!(
                    "{} of {} blocks are unreachable from the entry",
                    block_count - reachable,
                    block_count
                ));
            }
        }

        debug!(
            blocks = block_count,
            exits = cfg.exits.len(),
            "control flow graph accepted"
        );

        Ok(cfg)
    }

    /// Checks that every successor edge is mirrored by a predecessor edge, and
    /// that branch and jump targets are successors of their block.
    fn validate_edges(blocks: &[CfgBlock]) -> Result<()> {
        let mut incoming: Vec<Vec<BlockId>> = vec![Vec::new(); blocks.len()];
        for block in blocks {
            for &succ in &block.successors {
                incoming[succ.index()].push(block.id);
            }
        }

        for (block, mut expected) in blocks.iter().zip(incoming) {
            let mut actual = block.predecessors.clone();
            actual.sort_unstable();
            expected.sort_unstable();
            if actual != expected {
                return Err(GraphError(format!(
                    "Predecessors of {} are {:?}, but edges come from {:?}",
                    block.id, block.predecessors, expected
                )));
            }

            for target in block.body.iter().flat_map(Stmt::branch_targets) {
                if !block.successors.contains(&target) {
                    return Err(GraphError(format!(
                        "Terminator of {} targets {}, which is not a successor",
                        block.id, target
                    )));
                }
            }
        }

        Ok(())
    }

    /// Returns the entry block id (always block 0).
    #[must_use]
    pub const fn entry(&self) -> BlockId {
        BlockId::ENTRY
    }

    /// Returns the blocks without successors.
    #[must_use]
    pub fn exits(&self) -> &[BlockId] {
        &self.exits
    }

    /// Returns the number of blocks.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Returns a block, or `None` if the id is out of range.
    #[must_use]
    pub fn block(&self, id: BlockId) -> Option<&CfgBlock> {
        self.blocks.get(id.index())
    }

    /// Returns all blocks in index order.
    #[must_use]
    pub fn blocks(&self) -> &[CfgBlock] {
        &self.blocks
    }

    /// Returns the ordered successor list of a block.
    ///
    /// # Panics
    ///
    /// Panics if `id` is out of range.
    #[must_use]
    pub fn successors(&self, id: BlockId) -> &[BlockId] {
        &self[id].successors
    }

    /// Returns the ordered predecessor list of a block.
    ///
    /// # Panics
    ///
    /// Panics if `id` is out of range.
    #[must_use]
    pub fn predecessors(&self, id: BlockId) -> &[BlockId] {
        &self[id].predecessors
    }

    /// Returns `true` if two or more edges enter the block.
    ///
    /// # Panics
    ///
    /// Panics if `id` is out of range.
    #[must_use]
    pub fn is_merge(&self, id: BlockId) -> bool {
        self[id].is_merge()
    }

    /// Returns the blocks reachable from the entry in postorder.
    ///
    /// Postorder is the iteration order for backward data flow.
    #[must_use]
    pub fn postorder(&self) -> Vec<BlockId> {
        #[derive(Clone, Copy)]
        enum State {
            Enter,
            Exit,
        }

        let mut visited = vec![false; self.blocks.len()];
        let mut result = Vec::with_capacity(self.blocks.len());
        let mut stack = vec![(self.entry(), State::Enter)];

        while let Some((block, state)) = stack.pop() {
            match state {
                State::Enter => {
                    if visited[block.index()] {
                        continue;
                    }
                    visited[block.index()] = true;

                    stack.push((block, State::Exit));

                    // Reversed so successors are entered in list order
                    for &succ in self.successors(block).iter().rev() {
                        if !visited[succ.index()] {
                            stack.push((succ, State::Enter));
                        }
                    }
                }
                State::Exit => result.push(block),
            }
        }

        result
    }

    /// Returns the blocks reachable from the entry in reverse postorder.
    ///
    /// Reverse postorder visits a block before its successors (outside of back
    /// edges), which is the preferred order for forward data flow.
    #[must_use]
    pub fn reverse_postorder(&self) -> Vec<BlockId> {
        let mut result = self.postorder();
        result.reverse();
        result
    }

    /// Generates a DOT representation of the graph for Graphviz.
    ///
    /// Each block is labelled with its id and the kind of every statement; the
    /// entry block is filled green and exit blocks red.
    ///
    /// # Arguments
    ///
    /// * `title` - Optional graph label, typically the function name
    #[must_use]
    pub fn to_dot(&self, title: Option<&str>) -> String {
        let mut dot = String::new();

        dot.push_str("digraph CFG {\n");
        if let Some(name) = title {
            let _ = writeln!(dot, "    label=\"CFG: {}\";", escape_dot(name));
        }
        dot.push_str("    labelloc=t;\n");
        dot.push_str("    node [shape=box, fontname=\"Courier\", fontsize=10];\n\n");

        for block in &self.blocks {
            let is_entry = block.id == self.entry();
            let is_exit = block.is_exit();

            let mut header = block.id.to_string();
            if is_entry {
                header.push_str(" (entry)");
            }
            if is_exit {
                header.push_str(" (exit)");
            }
            let label = left_justified_label(&header, block.body.iter().map(Stmt::kind_name));

            let style = if is_entry {
                ", style=filled, fillcolor=lightgreen"
            } else if is_exit {
                ", style=filled, fillcolor=lightcoral"
            } else {
                ""
            };

            let _ = writeln!(dot, "    {} [label=\"{label}\"{style}];", block.id);
        }

        dot.push('\n');

        for block in &self.blocks {
            for succ in &block.successors {
                let _ = writeln!(dot, "    {} -> {};", block.id, succ);
            }
        }

        dot.push_str("}\n");
        dot
    }
}

impl Index<BlockId> for ControlFlowGraph {
    type Output = CfgBlock;

    fn index(&self, id: BlockId) -> &CfgBlock {
        match self.blocks.get(id.index()) {
            Some(block) => block,
            None => panic!(
                "block {} is out of range for a graph of {} blocks",
                id,
                self.blocks.len()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ast::{Expr, Stmt},
        Error,
    };

    fn linked(edges: &[(usize, usize)], count: usize) -> Vec<CfgBlock> {
        let mut blocks: Vec<CfgBlock> = (0..count).map(|i| CfgBlock::new(BlockId::new(i))).collect();
        for &(from, to) in edges {
            blocks[from].successors.push(BlockId::new(to));
            blocks[to].predecessors.push(BlockId::new(from));
        }
        blocks
    }

    #[test]
    fn test_cfg_empty_rejected() {
        assert!(matches!(ControlFlowGraph::from_blocks(Vec::new()), Err(Error::Empty)));
    }

    #[test]
    fn test_cfg_diamond() {
        let cfg = ControlFlowGraph::from_blocks(linked(&[(0, 1), (0, 2), (1, 3), (2, 3)], 4))
            .expect("diamond is valid");

        assert_eq!(cfg.block_count(), 4);
        assert_eq!(cfg.exits(), &[BlockId::new(3)]);
        assert!(cfg.is_merge(BlockId::new(3)));
        assert!(!cfg.is_merge(BlockId::new(1)));
        assert_eq!(
            cfg.predecessors(BlockId::new(3)),
            &[BlockId::new(1), BlockId::new(2)]
        );

        let rpo = cfg.reverse_postorder();
        assert_eq!(rpo.first(), Some(&BlockId::new(0)));
        assert_eq!(rpo.last(), Some(&BlockId::new(3)));
    }

    #[test]
    fn test_cfg_postorder_with_loop() {
        // 0 -> 1 -> 2 -> 1, 1 -> 3
        let cfg = ControlFlowGraph::from_blocks(linked(&[(0, 1), (1, 2), (2, 1), (1, 3)], 4))
            .expect("loop is valid");
        let post = cfg.postorder();
        assert_eq!(post.len(), 4);
        assert_eq!(post.last(), Some(&BlockId::new(0)));
    }

    #[test]
    fn test_cfg_rejects_edge_out_of_range() {
        let mut blocks = linked(&[(0, 1)], 2);
        blocks[1].successors.push(BlockId::new(5));
        assert!(matches!(
            ControlFlowGraph::from_blocks(blocks),
            Err(Error::GraphError(_))
        ));
    }

    #[test]
    fn test_cfg_rejects_asymmetric_edges() {
        let mut blocks = linked(&[(0, 1)], 2);
        blocks[1].predecessors.clear();
        assert!(matches!(
            ControlFlowGraph::from_blocks(blocks.clone()),
            Err(Error::GraphError(_))
        ));
        assert!(ControlFlowGraph::from_blocks_with_config(blocks, ValidationConfig::disabled()).is_ok());
    }

    #[test]
    fn test_cfg_rejects_branch_target_without_edge() {
        let mut blocks = linked(&[(0, 2), (1, 2)], 3);
        blocks[0].body.push(Stmt::branch(Expr::name("c"), BlockId::new(1), BlockId::new(2)));
        let err = ControlFlowGraph::from_blocks(blocks.clone()).unwrap_err();
        assert!(matches!(err, Error::GraphError(ref message) if message.contains("bb1")));

        blocks[0].successors.insert(0, BlockId::new(1));
        blocks[1].predecessors.push(BlockId::new(0));
        assert!(ControlFlowGraph::from_blocks(blocks).is_ok());
    }

    #[test]
    fn test_cfg_rejects_entry_with_predecessor() {
        let blocks = linked(&[(0, 1), (1, 0), (1, 2)], 3);
        assert!(matches!(
            ControlFlowGraph::from_blocks(blocks),
            Err(Error::Malformed { .. })
        ));
    }

    #[test]
    fn test_cfg_rejects_missing_exit() {
        let blocks = linked(&[(0, 1), (1, 2), (2, 1)], 3);
        assert!(ControlFlowGraph::from_blocks(blocks.clone()).is_err());
        assert!(ControlFlowGraph::from_blocks_with_config(blocks, ValidationConfig::minimal()).is_ok());
    }

    #[test]
    fn test_cfg_rejects_wrong_block_id() {
        let mut blocks = linked(&[(0, 1)], 2);
        blocks[1].id = BlockId::new(4);
        assert!(matches!(
            ControlFlowGraph::from_blocks(blocks),
            Err(Error::Malformed { .. })
        ));
    }

    #[test]
    fn test_cfg_strict_rejects_unreachable() {
        let blocks = linked(&[(0, 1), (2, 1)], 3);
        assert!(ControlFlowGraph::from_blocks(blocks.clone()).is_ok());
        assert!(ControlFlowGraph::from_blocks_with_config(blocks, ValidationConfig::strict()).is_err());
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_cfg_index_out_of_range_panics() {
        let cfg = ControlFlowGraph::from_blocks(linked(&[], 1)).expect("single block");
        let _ = &cfg[BlockId::new(3)];
    }

    #[test]
    fn test_cfg_to_dot() {
        let mut blocks = linked(&[(0, 1)], 2);
        blocks[0].body.push(Stmt::assign(Expr::name("x"), Expr::int(1)));
        let cfg = ControlFlowGraph::from_blocks(blocks).expect("valid");

        let dot = cfg.to_dot(Some("f<T>"));
        assert!(dot.starts_with("digraph CFG {"));
        assert!(dot.contains("label=\"CFG: f\\<T\\>\""));
        assert!(dot.contains("bb0 [label=\"bb0 (entry)\\lassign\\l\""));
        assert!(dot.contains("bb0 -> bb1;"));
        assert!(dot.ends_with("}\n"));
    }
}
