//! The expression IR used as the payload of stream operators.
//!
//! An expression tree is a strict tree -- no sharing -- rooted, for every
//! top-level compiled expression, in exactly one [`Expr::Closure`] binding
//! the implicit row variable `t`. Nested closures are rejected by
//! construction rather than by a later validation pass.

use serde::{Deserialize, Serialize};

use crate::error::CircuitError;
use crate::types::{Origin, Type};

/// Binary operators. `Dot` models the relational `.` call kind (nested field
/// projection through a row-closure, e.g. a struct-valued column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
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
    BitAnd,
    BitOr,
    BitXor,
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Not,
    Plus,
    Neg,
}

/// An expression evaluated over the implicit row variable `t`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Expr {
    /// Column reference into the implicit row `t`.
    Field {
        index: usize,
        ty: Type,
        origin: Origin,
    },
    /// A constant. The textual form is the literal's printed representation;
    /// the core does not interpret it.
    Literal {
        text: String,
        ty: Type,
        origin: Origin,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
        ty: Type,
        origin: Origin,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
        ty: Type,
        origin: Origin,
    },
    /// Binds the implicit row variable `t` in scope of `body`. Exactly one
    /// closure wraps each top-level compiled expression; closures never
    /// nest.
    Closure {
        body: Box<Expr>,
        ty: Type,
        origin: Origin,
    },
}

impl Expr {
    /// The result type of this expression.
    pub fn ty(&self) -> &Type {
        match self {
            Expr::Field { ty, .. }
            | Expr::Literal { ty, .. }
            | Expr::Unary { ty, .. }
            | Expr::Binary { ty, .. }
            | Expr::Closure { ty, .. } => ty,
        }
    }

    /// The opaque origin back-reference, for diagnostics.
    pub fn origin(&self) -> Origin {
        match self {
            Expr::Field { origin, .. }
            | Expr::Literal { origin, .. }
            | Expr::Unary { origin, .. }
            | Expr::Binary { origin, .. }
            | Expr::Closure { origin, .. } => *origin,
        }
    }

    /// A column reference into the implicit row. Fails with
    /// [`CircuitError::FieldIndexOutOfRange`] if `index` falls outside the
    /// row's arity.
    pub fn field(index: usize, row_arity: usize, ty: Type, origin: Origin) -> Result<Expr, CircuitError> {
        if index >= row_arity {
            return Err(CircuitError::FieldIndexOutOfRange {
                index,
                arity: row_arity,
            });
        }
        Ok(Expr::Field { index, ty, origin })
    }

    pub fn literal(text: impl Into<String>, ty: Type, origin: Origin) -> Expr {
        Expr::Literal {
            text: text.into(),
            ty,
            origin,
        }
    }

    pub fn unary(op: UnaryOp, operand: Expr, ty: Type, origin: Origin) -> Expr {
        Expr::Unary {
            op,
            operand: Box::new(operand),
            ty,
            origin,
        }
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr, ty: Type, origin: Origin) -> Expr {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
            ty,
            origin,
        }
    }

    /// Wraps `body` in a `Closure` over the row variable `t`. The closure's
    /// type equals the body's type. Fails with
    /// [`CircuitError::NestedClosure`] if `body` is, or contains, another
    /// closure.
    pub fn closure(body: Expr, origin: Origin) -> Result<Expr, CircuitError> {
        if body.contains_closure() {
            return Err(CircuitError::NestedClosure);
        }
        let ty = body.ty().clone();
        Ok(Expr::Closure {
            body: Box::new(body),
            ty,
            origin,
        })
    }

    fn contains_closure(&self) -> bool {
        match self {
            Expr::Closure { .. } => true,
            Expr::Field { .. } | Expr::Literal { .. } => false,
            Expr::Unary { operand, .. } => operand.contains_closure(),
            Expr::Binary { left, right, .. } => left.contains_closure() || right.contains_closure(),
        }
    }
}
