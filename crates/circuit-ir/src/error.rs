//! Core error type: assertion failures ("IRInvariant" in the design notes)
//! raised by the IR data structures themselves, independent of anything a
//! caller fed them that was merely unsupported.
//!
//! These mark programmer errors in the compiler, not input errors -- a
//! well-formed lowering visitor should never trigger one. `sql2circuit`'s
//! `CompileError` wraps this via `#[from]` for the cases where user input
//! indirectly causes one (e.g. a genuinely out-of-range field index derived
//! from a malformed front-end tree).

use thiserror::Error;

use crate::id::OperatorId;

/// Structural invariant violations inside the IR.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CircuitError {
    /// A `FieldExpression` index fell outside the row's arity.
    #[error("field index {index} out of range for row of arity {arity}")]
    FieldIndexOutOfRange { index: usize, arity: usize },

    /// A second `ClosureExpression` was nested inside another.
    #[error("nested closure: closures must not contain closures")]
    NestedClosure,

    /// An operator's output binding name collided with one already
    /// registered in the circuit -- the `putNew`-fails-on-duplicate-key
    /// policy from the resource model.
    #[error("duplicate operator binding name: '{name}'")]
    DuplicateBinding { name: String },

    /// A relational node's operator was looked up in the node->operator map
    /// and was not present.
    #[error("no operator registered for node {node}")]
    NoOperatorForNode { node: String },

    /// An `OperatorId` referenced as an input does not exist in the circuit's
    /// arena.
    #[error("operator {0:?} not found in circuit")]
    OperatorNotFound(OperatorId),

    /// An operator was rendered without the input its operation requires --
    /// a null-operand assertion failure, e.g. a `Sink` or `RelProject` whose
    /// input list is empty.
    #[error("operator '{operator}' is missing its input binding")]
    MissingInput { operator: String },
}
