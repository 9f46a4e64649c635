//! Control Flow Graph (CFG) representation.
//!
//! The graph is produced by the CFG-construction stage of the compiler and only
//! read by the analyses. Blocks are addressed by their stable [`BlockId`], with
//! block 0 as the entry; all per-block results are kept in vectors indexed by
//! that id.
//!
//! # Key Components
//!
//! - [`ControlFlowGraph`] - The validated, immutable graph
//! - [`CfgBlock`] - A basic block with ordered predecessor and successor lists
//! - [`CfgBuilder`] - Incremental construction with consistent edge lists
//! - [`ValidationConfig`] - Which structural checks construction performs
//!
//! # Shape
//!
//! - Block 0 is the only block without predecessors
//! - The graph may contain cycles (loops)
//! - Blocks without successors are function exits
//!
//! # Examples
//!
//! ```rust
//! use bindscope::cfg::{CfgBuilder, BlockId};
//!
//! let mut builder = CfgBuilder::new();
//! let entry = builder.add_block();
//! let header = builder.add_block();
//! let body = builder.add_block();
//! let exit = builder.add_block();
//! builder
//!     .add_edge(entry, header)
//!     .add_edge(header, body)
//!     .add_edge(body, header)
//!     .add_edge(header, exit);
//! let cfg = builder.build()?;
//!
//! assert_eq!(cfg.entry(), BlockId::new(0));
//! assert!(cfg.is_merge(header));
//! # Ok::<(), bindscope::Error>(())
//! ```

mod block;
mod builder;
mod config;
mod graph;

pub use block::{BlockId, CfgBlock};
pub use builder::CfgBuilder;
pub use config::ValidationConfig;
pub use graph::ControlFlowGraph;
