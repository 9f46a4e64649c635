//! Validation configuration for control flow graph construction
//!
//! The analyses in this crate assume a well-shaped graph: an entry block without
//! predecessors, mirrored edge lists, at least one exit. This module controls how
//! much of that is checked when a graph is handed over by the construction stage.

/// Configuration for graph validation in [`crate::cfg::ControlFlowGraph::from_blocks_with_config`]
///
/// Block ids and edge targets are always checked since every analysis indexes
/// per-block vectors with them. The remaining checks can be toggled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct ValidationConfig {
    /// Predecessor lists must mirror successor lists (same multiset of edges)
    pub enable_edge_validation: bool,

    /// Block 0 must have no predecessors
    pub enable_entry_validation: bool,

    /// At least one block must have no successors
    pub enable_exit_validation: bool,

    /// Every block must be reachable from the entry block
    /// Off by default: lowering frequently leaves dead blocks behind `return`
    pub enable_reachability_validation: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            enable_edge_validation: true,
            enable_entry_validation: true,
            enable_exit_validation: true,
            enable_reachability_validation: false,
        }
    }
}

impl ValidationConfig {
    /// Creates a configuration that performs only the mandatory index checks
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enable_edge_validation: false,
            enable_entry_validation: false,
            enable_exit_validation: false,
            enable_reachability_validation: false,
        }
    }

    /// Creates a configuration with only the checks the analyses depend on
    ///
    /// Edge symmetry and the entry shape are required for correct phi placement;
    /// the exit check is skipped.
    #[must_use]
    pub fn minimal() -> Self {
        Self {
            enable_edge_validation: true,
            enable_entry_validation: true,
            enable_exit_validation: false,
            enable_reachability_validation: false,
        }
    }

    /// Creates a configuration with every check enabled
    #[must_use]
    pub fn strict() -> Self {
        Self {
            enable_edge_validation: true,
            enable_entry_validation: true,
            enable_exit_validation: true,
            enable_reachability_validation: true,
        }
    }
}
