//! Lattice trait for data flow analysis.
//!
//! A lattice defines how abstract values combine where control flow paths meet.
//! For a forward analysis that is a block with several predecessors; for a
//! backward analysis a block with several successors.

use std::fmt::Debug;

/// A meet semi-lattice with a meet (greatest lower bound) operation.
///
/// The meet operation combines information from multiple control flow paths.
/// It must satisfy:
///
/// - **Idempotent**: `x.meet(x) = x`
/// - **Commutative**: `x.meet(y) = y.meet(x)`
/// - **Associative**: `x.meet(y.meet(z)) = (x.meet(y)).meet(z)`
///
/// These laws make the solver's result independent of the order in which it
/// visits blocks. Implementations must uphold them exactly; the solver does not
/// compensate for a non-commutative meet.
///
/// The `initial` value of an analysis (see
/// [`crate::analysis::dataflow::DataFlowAnalysis::initial`]) must be the identity
/// of `meet`, so that blocks not yet reached do not influence their successors.
///
/// # Examples
///
/// ```rust,ignore
/// use bindscope::analysis::dataflow::MeetSemiLattice;
///
/// impl MeetSemiLattice for ReachedSet {
///     fn meet(&self, other: &Self) -> Self {
///         ReachedSet(self.0.union(&other.0).cloned().collect())
///     }
/// }
/// ```
pub trait MeetSemiLattice: Clone + Debug + PartialEq {
    /// Computes the meet (greatest lower bound) of two lattice elements.
    ///
    /// The meet represents combining information from two paths that merge.
    #[must_use]
    fn meet(&self, other: &Self) -> Self;
}
