//! Incremental construction of control flow graphs.

use crate::{
    ast::Stmt,
    cfg::{BlockId, CfgBlock, ControlFlowGraph, ValidationConfig},
    Result,
};

/// Builds a [`ControlFlowGraph`] block by block.
///
/// Edges are recorded once through [`CfgBuilder::add_edge`]; the builder keeps the
/// successor and predecessor lists consistent, in insertion order.
///
/// # Examples
///
/// ```rust
/// use bindscope::{ast::{Expr, Stmt}, cfg::CfgBuilder};
///
/// // if c: x = 1
/// // return x
/// let mut builder = CfgBuilder::new();
/// let entry = builder.add_block();
/// let then = builder.add_block();
/// let join = builder.add_block();
/// builder.push(entry, Stmt::branch(Expr::name("c"), then, join));
/// builder.push(then, Stmt::assign(Expr::name("x"), Expr::int(1)));
/// builder.push(join, Stmt::ret(Some(Expr::name("x"))));
/// builder.add_edge(entry, then).add_edge(entry, join).add_edge(then, join);
///
/// let cfg = builder.build()?;
/// assert!(cfg.is_merge(join));
/// # Ok::<(), bindscope::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct CfgBuilder {
    blocks: Vec<CfgBlock>,
    config: ValidationConfig,
}

impl CfgBuilder {
    /// Creates an empty builder using the default validation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the validation applied by [`CfgBuilder::build`].
    #[must_use]
    pub fn with_config(mut self, config: ValidationConfig) -> Self {
        self.config = config;
        self
    }

    /// Appends an empty block and returns its id. The first block is the entry.
    pub fn add_block(&mut self) -> BlockId {
        let id = BlockId::new(self.blocks.len());
        self.blocks.push(CfgBlock::new(id));
        id
    }

    /// Appends a block holding `body` and returns its id.
    pub fn add_block_with(&mut self, body: Vec<Stmt>) -> BlockId {
        let id = self.add_block();
        self.blocks[id.index()].body = body;
        id
    }

    /// Appends a statement to a block.
    ///
    /// # Panics
    ///
    /// Panics if `block` was not created by this builder.
    pub fn push(&mut self, block: BlockId, stmt: Stmt) -> &mut Self {
        self.block_mut(block).body.push(stmt);
        self
    }

    /// Adds a control flow edge.
    ///
    /// # Panics
    ///
    /// Panics if either block was not created by this builder.
    pub fn add_edge(&mut self, from: BlockId, to: BlockId) -> &mut Self {
        self.block_mut(to).predecessors.push(from);
        self.block_mut(from).successors.push(to);
        self
    }

    /// Validates and returns the finished graph.
    ///
    /// # Errors
    ///
    /// Returns an error if the graph fails validation, see
    /// [`ControlFlowGraph::from_blocks_with_config`].
    pub fn build(self) -> Result<ControlFlowGraph> {
        ControlFlowGraph::from_blocks_with_config(self.blocks, self.config)
    }

    fn block_mut(&mut self, block: BlockId) -> &mut CfgBlock {
        let count = self.blocks.len();
        match self.blocks.get_mut(block.index()) {
            Some(block) => block,
            None => panic!("block {block} was not created by this builder ({count} blocks)"),
        }
    }
}
