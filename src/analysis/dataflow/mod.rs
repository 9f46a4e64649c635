//! Data flow analysis framework.
//!
//! This module provides a generic framework for computing properties that
//! propagate along control flow edges. It supports both forward and backward
//! analyses using a worklist-based solver.
//!
//! # Architecture
//!
//! The framework is built around three core abstractions:
//!
//! - **Lattice**: Defines the domain of abstract values with a meet operation
//! - **Analysis**: Specifies transfer functions and boundary conditions
//! - **Solver**: Iteratively computes fixpoints using a worklist algorithm
//!
//! # Analyses Built On It
//!
//! - [`crate::analysis::DefinednessAnalysis`]: forward, "is this name bound here?"
//! - [`crate::analysis::LiveNames`]: backward, the classic live-variable sets
//!
//! # Thread Safety
//!
//! The solver owns its state exclusively; independent solvers may run on
//! different threads over the same (shared, immutable) graph.

mod framework;
mod lattice;
mod solver;

pub use framework::{AnalysisResults, DataFlowAnalysis, Direction};
pub use lattice::MeetSemiLattice;
pub use solver::DataFlowSolver;
