//! # bindscope Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the bindscope library. Import this module to get quick access to everything
//! needed to build a control flow graph and run the analyses over it.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all bindscope operations
pub use crate::Error;

/// The result type used throughout bindscope
pub use crate::Result;

// ================================================================================================
// Function Bodies
// ================================================================================================

/// Statement and expression model
pub use crate::ast::{Alias, Arg, Arguments, Expr, ExprKind, Stmt, StmtKind};

/// Name occurrence walking
pub use crate::ast::{walk_stmt, NameAccess, NameVisitor};

// ================================================================================================
// Control Flow
// ================================================================================================

/// Graph, blocks and construction
pub use crate::cfg::{BlockId, CfgBlock, CfgBuilder, ControlFlowGraph, ValidationConfig};

/// Scope resolution
pub use crate::scope::{DeclaredGlobals, LocalOnly, ScopeInfo};

// ================================================================================================
// Analyses
// ================================================================================================

/// Per-function analyses
pub use crate::analysis::{
    DefinednessAnalysis, DefinitionLevel, LivenessAnalysis, PhiAnalysis, RequiredSet,
};

/// Batch driver and one-step helpers
pub use crate::analysis::{
    analyze_functions, compute_liveness_info, compute_required_phis, FunctionAnalysis,
    FunctionUnit,
};
