use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which covers every error this library can return.
///
/// Errors are only produced while accepting input from collaborators, i.e. when a
/// [`crate::cfg::ControlFlowGraph`] is assembled from blocks handed over by the
/// CFG-construction stage. Once a graph has been accepted, the analyses never return
/// errors: a broken contract inside an analysis (merging an `Undefined` level, asking
/// for the successor of an exit block, ...) means the compiler itself is inconsistent
/// and aborts with a panic instead.
///
/// # Error Categories
///
/// - [`Error::Empty`] - A graph without any blocks was provided
/// - [`Error::GraphError`] - The edge structure of the graph is inconsistent
/// - [`Error::Malformed`] - A block violates a structural requirement (entry shape, ids, ...)
///
/// # Examples
///
/// ```rust
/// use bindscope::{cfg::ControlFlowGraph, Error};
///
/// match ControlFlowGraph::from_blocks(Vec::new()) {
///     Err(Error::Empty) => println!("nothing to analyse"),
///     Err(e) => eprintln!("bad graph: {}", e),
///     Ok(_) => unreachable!(),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// Provided input was empty.
    ///
    /// A function always has at least its entry block, so an empty block list
    /// can not describe a valid control flow graph.
    #[error("Provided input was empty")]
    Empty,

    /// The graph is structurally damaged.
    ///
    /// The error includes the source location where the malformation was detected
    /// for debugging purposes.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// Edge-level inconsistency in a control flow graph.
    ///
    /// Raised for out-of-range edge targets and for predecessor lists that do not
    /// mirror the successor lists.
    #[error("{0}")]
    GraphError(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
