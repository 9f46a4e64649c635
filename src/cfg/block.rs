//! Basic blocks and their identifiers.

use std::fmt;

use crate::ast::Stmt;

/// A strongly-typed identifier for a basic block within one function's graph.
///
/// `BlockId` wraps the block's position in [`crate::cfg::ControlFlowGraph::blocks`].
/// Block 0 is always the function entry. Per-block analysis results are stored in
/// vectors indexed by [`BlockId::index`].
///
/// # Examples
///
/// ```rust
/// use bindscope::cfg::BlockId;
///
/// let block = BlockId::new(3);
/// assert_eq!(block.index(), 3);
/// assert_eq!(block.to_string(), "bb3");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockId(pub(crate) usize);

impl BlockId {
    /// The function entry block.
    pub const ENTRY: BlockId = BlockId(0);

    /// Creates a new `BlockId` from a raw index value.
    #[must_use]
    #[inline]
    pub const fn new(index: usize) -> Self {
        BlockId(index)
    }

    /// Returns the raw index value of this block identifier.
    #[must_use]
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Debug for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockId({})", self.0)
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bb{}", self.0)
    }
}

impl From<usize> for BlockId {
    #[inline]
    fn from(index: usize) -> Self {
        BlockId(index)
    }
}

impl From<BlockId> for usize {
    #[inline]
    fn from(block: BlockId) -> Self {
        block.0
    }
}

/// A basic block: a straight-line statement sequence with ordered edges.
///
/// Predecessor and successor order is significant. The phi analysis consults the
/// first predecessor of a merge block, and the `*_after` queries follow the first
/// successor.
#[derive(Debug, Clone, PartialEq)]
pub struct CfgBlock {
    /// Stable index of this block (0 = entry).
    pub id: BlockId,
    /// Statements in execution order.
    pub body: Vec<Stmt>,
    /// Blocks with an edge into this block.
    pub predecessors: Vec<BlockId>,
    /// Blocks this block may transfer control to.
    pub successors: Vec<BlockId>,
}

impl CfgBlock {
    /// Creates an empty block without edges.
    #[must_use]
    pub fn new(id: BlockId) -> Self {
        Self {
            id,
            body: Vec::new(),
            predecessors: Vec::new(),
            successors: Vec::new(),
        }
    }

    /// Returns `true` if control can not leave this block.
    #[must_use]
    pub fn is_exit(&self) -> bool {
        self.successors.is_empty()
    }

    /// Returns `true` if two or more edges enter this block.
    #[must_use]
    pub fn is_merge(&self) -> bool {
        self.predecessors.len() >= 2
    }

    /// Returns the single successor, or `None` for exits and branch points.
    #[must_use]
    pub fn unique_successor(&self) -> Option<BlockId> {
        match self.successors.as_slice() {
            [succ] => Some(*succ),
            _ => None,
        }
    }
}
