//! Compiler error types covering all compilation failure modes: constructs
//! the core recognizes but does not lower, constructs it explicitly rejects,
//! and structural invariant violations bubbled up from `circuit-ir`.

use circuit_ir::CircuitError;

/// Errors produced while compiling SQL statements into a [`circuit_ir::Circuit`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CompileError {
    /// A construct the core recognizes but does not yet lower: most SQL
    /// types beyond the primitives, most call kinds beyond basic
    /// arithmetic/comparison/logical/bitwise, aggregates, joins, scalar
    /// CAST/FLOOR/CEIL, and any relational node kind not named in §4.4.
    #[error("unimplemented: {construct}")]
    Unimplemented { construct: String },

    /// A construct the core explicitly rejects: top-level `ORDER BY` in a
    /// view, a non-column projection target, or a directly-nested closure.
    #[error("unsupported construct: {construct}")]
    UnsupportedConstruct { construct: &'static str },

    /// The DDL catalog (the "DDL simulator") rejected a statement: duplicate
    /// table name, or a reference to a table that was never declared.
    #[error("catalog error: {reason}")]
    Catalog { reason: String },

    /// An assertion failure inside the IR itself.
    #[error(transparent)]
    Ir(#[from] CircuitError),
}
