//! Error types for SSA construction.

use crate::cfg::BlockId;
use thiserror::Error;

/// A fatal defect in the input graph discovered during SSA construction.
///
/// Construction is all-or-nothing: any of these aborts the whole call, and
/// the graph may be left partially renamed. There is no partial-result or
/// retry semantics.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SsaError {
    /// A use of a variable was reached with no dominating definition on the
    /// version stack. The producing front end emitted a use without any
    /// prior definition on some path.
    #[error("use of variable `{name}` with no dominating definition")]
    UndefinedVariable {
        /// The variable name that was used before being defined.
        name: String,
    },

    /// A block was not listed in its successor's predecessor list while
    /// wiring a phi operand: the pred/succ mutual-inverse invariant is
    /// broken.
    #[error("block {from} is missing from the predecessor list of {to}")]
    InconsistentGraph {
        /// The block whose outgoing edge was being followed.
        from: BlockId,
        /// The successor whose predecessor list is inconsistent.
        to: BlockId,
    },
}
