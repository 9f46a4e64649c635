// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # bindscope
//!
//! Liveness, definedness and phi placement for the local names of a Python-like
//! function, computed over its control flow graph.
//!
//! A compiler that lowers such a function to SSA form needs to know, at every
//! merge point, which names carry a value that is still going to be read, and
//! whether a read may observe an unbound name. `bindscope` answers exactly
//! these questions:
//!
//! - **Liveness** - is `name` read after `block` ends, before being rebound?
//! - **Definedness** - is `name` definitely, possibly, or not at all bound when
//!   control reaches `block`?
//! - **Phi requirements** - which names need a phi at each block with two or
//!   more predecessors?
//!
//! ## Quick Start
//!
//! ```rust
//! use bindscope::prelude::*;
//!
//! // def f(c):
//! //     if c:
//! //         x = 1
//! //     return x
//! let mut builder = CfgBuilder::new();
//! let entry = builder.add_block();
//! let then = builder.add_block_with(vec![Stmt::assign(Expr::name("x"), Expr::int(1))]);
//! let join = builder.add_block_with(vec![Stmt::ret(Some(Expr::name("x")))]);
//! builder.push(entry, Stmt::branch(Expr::name("c"), then, join));
//! builder.add_edge(entry, then).add_edge(entry, join).add_edge(then, join);
//! let cfg = builder.build()?;
//!
//! let unit = FunctionUnit::new("f", Arguments::positional(["c"]), cfg);
//! let analysis = FunctionAnalysis::compute(&unit);
//!
//! assert!(analysis.phis().is_required("x", join));
//! assert_eq!(
//!     analysis.definedness().is_defined_at("x", join),
//!     DefinitionLevel::PotentiallyDefined,
//! );
//! # Ok::<(), bindscope::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`ast`] - Statement and expression model, and the name walker that
//!   classifies every occurrence as a read or a write
//! - [`cfg`] - Basic blocks, the validated control flow graph and its builder
//! - [`scope`] - Resolution of names bound outside the function
//! - [`analysis`] - The data flow framework and the three analyses
//!
//! Construction of a [`cfg::ControlFlowGraph`] is the one place that reports
//! malformed input through [`Error`]. The analyses assume a well-formed graph
//! and panic on contract violations, naming the offending block and name.
//!
//! ## Logging
//!
//! The crate emits [`tracing`](https://docs.rs/tracing) events: `debug` for
//! graph construction and analysis summaries, `trace` for individual liveness
//! searches. No subscriber is installed by the library.
//!
//! ## Thread Safety
//!
//! All results are plain owned data over an immutable graph. Independent
//! functions can be analysed concurrently, see [`analysis::analyze_functions`].

#[macro_use]
pub(crate) mod error;
pub(crate) mod utils;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use bindscope::prelude::*;
///
/// let cfg = CfgBuilder::new().build();
/// assert!(matches!(cfg, Err(Error::Empty)));
/// ```
pub mod prelude;

/// Statement and expression model of a function body.
///
/// Every analysis consumes name occurrences through [`ast::NameVisitor`], so the
/// rules that decide what binds a name live in [`ast::walk_stmt`] and nowhere
/// else.
pub mod ast;

/// Control flow graphs of single functions.
pub mod cfg;

/// Resolution of names that refer outside the analysed function.
pub mod scope;

/// Liveness, definedness and phi analyses.
pub mod analysis;

/// `bindscope` Result type.
///
/// A type alias for `std::result::Result<T, Error>`.
pub use error::Result;

/// `bindscope` Error type.
///
/// Returned when a control flow graph fails validation.
///
/// # Example
///
/// ```rust
/// use bindscope::{cfg::ControlFlowGraph, Error};
///
/// match ControlFlowGraph::from_blocks(Vec::new()) {
///     Err(Error::Empty) => println!("no blocks"),
///     Err(e) => println!("invalid graph: {e}"),
///     Ok(_) => unreachable!(),
/// }
/// ```
pub use error::Error;
