//! Front-end descriptor types standing in for the validated relational
//! trees a real SQL front end would hand the core: relational-algebra nodes
//! ([`RelNode`]) and scalar expressions ([`RelExpr`]).
//!
//! These are not part of the IR -- they are the input the lowering visitor
//! (`lowering.rs`) and expression compiler (`expr_compile.rs`) consume and
//! turn into `circuit_ir` nodes.

/// A scalar-expression call kind, §4.2. Lists exactly the kinds the
/// expression compiler dispatches on, plus the ones it explicitly rejects,
/// so the dispatch table has concrete variants to match against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Mul,
    Div,
    Rem,
    Add,
    Sub,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
    And,
    Or,
    Dot,
    Not,
    UnaryPlus,
    UnaryMinus,
    /// Collapses to the operand unchanged -- see the known-limitation note
    /// in §9 about nullable booleans.
    IsTrue,
    /// Collapses to the operand unchanged -- same caveat as `IsTrue`.
    IsNotFalse,
    BitAnd,
    BitOr,
    BitXor,
    /// Rejected: `Unimplemented`.
    IsNull,
    /// Rejected: `Unimplemented`.
    IsNotNull,
    /// Rejected: `Unimplemented`.
    Cast,
    /// Rejected: `Unimplemented`.
    Floor,
    /// Rejected: `Unimplemented`.
    Ceil,
    /// Any call kind not named above. Rejected: `Unimplemented`.
    Other(&'static str),
}

/// A validated scalar-expression tree node, standing in for what a real SQL
/// front end's relational-expression representation would hand the core.
#[derive(Debug, Clone, PartialEq)]
pub enum RelExpr {
    /// A column reference into the current row, by position.
    Column { index: usize, ty: crate::sql_type::SqlType },
    /// A literal, carrying its already-printed textual form.
    Literal { text: String, ty: crate::sql_type::SqlType },
    /// A call: an operator applied to its operands.
    Call {
        kind: CallKind,
        operands: Vec<RelExpr>,
        ty: crate::sql_type::SqlType,
    },
}

/// A validated relational-algebra tree node, standing in for what a real SQL
/// front end's logical plan would hand the core. Carries an `origin` (an
/// opaque id used only for diagnostics).
#[derive(Debug, Clone, PartialEq)]
pub enum RelNode {
    TableScan {
        origin: Option<u32>,
        table: String,
    },
    Project {
        origin: Option<u32>,
        input: Box<RelNode>,
        targets: Vec<RelExpr>,
    },
    Filter {
        origin: Option<u32>,
        input: Box<RelNode>,
        predicate: RelExpr,
    },
    Union {
        origin: Option<u32>,
        inputs: Vec<RelNode>,
        all: bool,
    },
    Minus {
        origin: Option<u32>,
        inputs: Vec<RelNode>,
        all: bool,
    },
    /// Present only so the lowering visitor can recognize and reject
    /// top-level `ORDER BY` (S7). Never lowered.
    Sort {
        origin: Option<u32>,
        input: Box<RelNode>,
    },
    /// Stand-in for relational node kinds genuinely out of scope (joins,
    /// aggregates -- see §1 Non-goals). Dispatch falls through to
    /// `Unimplemented` on this variant.
    Unhandled(String),
}

impl RelNode {
    pub fn origin(&self) -> Option<u32> {
        match self {
            RelNode::TableScan { origin, .. }
            | RelNode::Project { origin, .. }
            | RelNode::Filter { origin, .. }
            | RelNode::Union { origin, .. }
            | RelNode::Minus { origin, .. }
            | RelNode::Sort { origin, .. } => *origin,
            RelNode::Unhandled(_) => None,
        }
    }
}
