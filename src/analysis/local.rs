//! Block-local classification of name occurrences.
//!
//! A single left-to-right pass over a block decides, for every name it mentions,
//! whether the block exposes a read of the incoming value (the name is loaded
//! before any store in the block) or kills it (the name is stored before any
//! load). The first occurrence decides; later occurrences in the same block do
//! not change the class. This is the upward-exposed-use computation of classic
//! block liveness.

use std::collections::HashSet;

use crate::{
    ast::{walk_stmt, NameAccess, NameVisitor, Stmt},
    cfg::CfgBlock,
};

/// Locally exposed reads and locally killed names of one basic block.
///
/// The two sets are disjoint.
///
/// # Examples
///
/// ```rust
/// use bindscope::{analysis::BlockUsage, ast::{Expr, Stmt}};
///
/// // y = x; x = 1; y = 2
/// let usage = BlockUsage::of_statements(&[
///     Stmt::assign(Expr::name("y"), Expr::name("x")),
///     Stmt::assign(Expr::name("x"), Expr::int(1)),
///     Stmt::assign(Expr::name("y"), Expr::int(2)),
/// ]);
/// assert!(usage.is_exposed_load("x"));
/// assert!(usage.kills("y"));
/// assert!(!usage.kills("x"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockUsage {
    loads: HashSet<String>,
    stores: HashSet<String>,
}

impl BlockUsage {
    /// Classifies the statements of a block.
    #[must_use]
    pub fn of_block(block: &CfgBlock) -> Self {
        Self::of_statements(&block.body)
    }

    /// Classifies a statement sequence.
    #[must_use]
    pub fn of_statements(body: &[Stmt]) -> Self {
        let mut usage = Self::default();
        for stmt in body {
            walk_stmt(&mut usage, stmt);
        }
        usage
    }

    /// Names read before any write in the block.
    #[must_use]
    pub fn loads(&self) -> &HashSet<String> {
        &self.loads
    }

    /// Names written before any read in the block.
    #[must_use]
    pub fn stores(&self) -> &HashSet<String> {
        &self.stores
    }

    /// Returns `true` if the block reads the incoming value of `name`.
    #[must_use]
    pub fn is_exposed_load(&self, name: &str) -> bool {
        self.loads.contains(name)
    }

    /// Returns `true` if the block rebinds `name` before reading it.
    #[must_use]
    pub fn kills(&self, name: &str) -> bool {
        self.stores.contains(name)
    }

    fn do_load(&mut self, name: &str) {
        if self.stores.contains(name) {
            return;
        }
        self.loads.insert(name.to_string());
    }

    fn do_store(&mut self, name: &str) {
        if self.loads.contains(name) {
            return;
        }
        self.stores.insert(name.to_string());
    }
}

impl NameVisitor for BlockUsage {
    fn visit_name(&mut self, name: &str, access: NameAccess) {
        match access {
            NameAccess::Load => self.do_load(name),
            NameAccess::Store => self.do_store(name),
        }
    }
}
